// src/middleware/auth.rs

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::{
    common::error::AppError,
    models::auth::{Role, SessionUser},
};

/// Sesión activa. Se lee una vez al iniciar el comando y se inyecta en el cliente de la API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<SessionUser>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.token.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Cargo 0 cuando no hay sesión.
    pub fn role(&self) -> Role {
        self.user.as_ref().map(SessionUser::role).unwrap_or_default()
    }

    pub fn require_token(&self) -> Result<&str, AppError> {
        self.token().ok_or(AppError::NotAuthenticated)
    }
}

/// Almacenamiento durable del registro `user` (archivo JSON).
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archivo ausente o ilegible equivale a una sesión anónima.
    pub async fn load(&self) -> SessionContext {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SessionContext::anonymous(),
            Err(e) => {
                tracing::warn!("⚠️ No se pudo leer la sesión en {}: {}", self.path.display(), e);
                return SessionContext::anonymous();
            }
        };

        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) if !user.token.is_empty() => SessionContext::authenticated(user),
            Ok(_) => SessionContext::anonymous(),
            Err(e) => {
                tracing::warn!("⚠️ Sesión corrupta en {}: {}", self.path.display(), e);
                SessionContext::anonymous()
            }
        }
    }

    pub async fn save(&self, user: &SessionUser) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string_pretty(user)?;

        // El archivo guarda el token: solo lo lee su dueño
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // `mode` solo aplica al crear; un archivo previo puede venir con 0644
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }
        file.write_all(raw.as_bytes()).await?;
        file.flush().await?;
        tracing::debug!("Sesión guardada en {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jefe() -> SessionUser {
        SessionUser {
            token: "abc123".into(),
            cargo: 2,
            nombre: "Ana".into(),
            apellido: "Rojas".into(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let session = store.load().await;
        assert_eq!(session.role(), Role::None);
        assert!(session.token().is_none());
        assert!(matches!(session.require_token(), Err(AppError::NotAuthenticated)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saved_token_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let store = SessionStore::new(path.clone());

        store.save(&jefe()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().await.token(), Some("abc123"));
    }

    #[tokio::test]
    async fn save_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&jefe()).await.unwrap();
        let session = store.load().await;
        assert_eq!(session.role(), Role::JefeBodega);
        assert_eq!(session.token(), Some("abc123"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await, SessionContext::anonymous());
        // borrar dos veces no es un error
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ no es json").unwrap();

        let session = SessionStore::new(path).load().await;
        assert_eq!(session, SessionContext::anonymous());
    }
}

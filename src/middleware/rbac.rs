// src/middleware/rbac.rs

use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::SessionContext,
    models::auth::Role,
};

/// 1. El trait que define qué cargos pueden entrar a un grupo de páginas
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
    fn label() -> &'static str;
}

/// 2. El guardián: se construye solo si la sesión tiene un cargo permitido
#[derive(Debug)]
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T: RoleDef> RequireRole<T> {
    pub fn check(session: &SessionContext) -> Result<Self, AppError> {
        // A. Sin sesión -> login
        if session.token().is_none() || session.role() == Role::None {
            return Err(AppError::NotAuthenticated);
        }

        // B. Cargo fuera del grupo
        let role = session.role();
        if !T::allowed().contains(&role) {
            tracing::warn!("🚫 Cargo '{}' sin acceso a {}", role, T::label());
            return Err(AppError::Forbidden(role));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LOS GRUPOS (TIPOS)
// ---

/// Acciones destructivas que el menú comparte con otros cargos pero solo el administrador ejecuta.
#[derive(Debug)]
pub struct AdministradorOnly;
impl RoleDef for AdministradorOnly {
    fn allowed() -> &'static [Role] { &[Role::Administrador] }
    fn label() -> &'static str { "/administrador" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::SessionUser;

    fn session(cargo: i64) -> SessionContext {
        SessionContext::authenticated(SessionUser {
            token: "t".into(),
            cargo,
            nombre: "N".into(),
            apellido: "A".into(),
        })
    }

    #[test]
    fn anonymous_session_requires_login() {
        let err = RequireRole::<AdministradorOnly>::check(&SessionContext::anonymous()).unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[test]
    fn cargo_zero_requires_login() {
        let err = RequireRole::<AdministradorOnly>::check(&session(0)).unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[test]
    fn wrong_cargo_is_forbidden() {
        let err = RequireRole::<AdministradorOnly>::check(&session(1)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(Role::Bodeguero)));
    }

    #[test]
    fn only_the_administrator_passes() {
        assert!(RequireRole::<AdministradorOnly>::check(&session(4)).is_ok());
        for cargo in 1..=3 {
            assert!(RequireRole::<AdministradorOnly>::check(&session(cargo)).is_err(), "cargo {}", cargo);
        }
    }
}

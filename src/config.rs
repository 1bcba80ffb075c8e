// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    api::{
        AuthApi, CrmApi, DashboardApi, HttpTransport, InventoryApi, OperationsApi, Transport, UserApi,
        client::{ApiClient, DEFAULT_BASE_URL},
    },
    middleware::auth::{SessionContext, SessionStore},
    services::{dashboards::DashboardService, document_service::DocumentService, list_view::RefreshPolicy},
};

pub const DEFAULT_RELOAD_DELAY_MS: u64 = 1500;

/// Configuración leída del entorno (`.env` incluido).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub export_dir: PathBuf,
    /// Espera antes de recargar tras registrar clientes, proveedores o conductores
    pub reload_delay: Duration,
    /// Qué muestran los listados si falla una recarga tras una acción
    pub refresh_policy: RefreshPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            session_file: default_session_file(),
            fonts_dir: PathBuf::from("./fonts"),
            font_family: "Roboto".to_string(),
            export_dir: PathBuf::from("."),
            reload_delay: Duration::from_millis(DEFAULT_RELOAD_DELAY_MS),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

fn default_session_file() -> PathBuf {
    let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".bodega").join("session.json")
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let reload_delay = match var("BODEGA_RELOAD_DELAY_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("⚠️ BODEGA_RELOAD_DELAY_MS inválido ('{}'), se usa {} ms", raw, DEFAULT_RELOAD_DELAY_MS);
                    defaults.reload_delay
                }
            },
            None => defaults.reload_delay,
        };

        let refresh_policy = match var("BODEGA_REFRESH_POLICY") {
            Some(raw) => raw.parse::<RefreshPolicy>().unwrap_or_else(|_| {
                tracing::warn!("⚠️ BODEGA_REFRESH_POLICY inválido ('{}'), se conservan las filas", raw);
                defaults.refresh_policy
            }),
            None => defaults.refresh_policy,
        };

        Self {
            api_url: var("BODEGA_API_URL").unwrap_or(defaults.api_url),
            session_file: var("BODEGA_SESSION_FILE").map(PathBuf::from).unwrap_or(defaults.session_file),
            fonts_dir: var("BODEGA_FONTS_DIR").map(PathBuf::from).unwrap_or(defaults.fonts_dir),
            font_family: var("BODEGA_FONT_FAMILY").unwrap_or(defaults.font_family),
            export_dir: var("BODEGA_EXPORT_DIR").map(PathBuf::from).unwrap_or(defaults.export_dir),
            reload_delay,
            refresh_policy,
        }
    }
}

/// Dependencias de un comando: sesión, APIs por dominio y exportador de PDF.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SessionStore,
    pub session: SessionContext,
    pub auth: AuthApi,
    pub crm: CrmApi,
    pub users: UserApi,
    pub inventory: InventoryApi,
    pub operations: OperationsApi,
    pub dashboards: DashboardService,
    pub documents: DocumentService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.api_url.clone())?);
        let store = SessionStore::new(config.session_file.clone());
        let session = store.load().await;

        tracing::debug!("API en {} (cargo {})", config.api_url, session.role().code());
        Ok(Self::with_transport(config, transport, store, session))
    }

    /// Arma el grafo de dependencias sobre un transporte dado.
    pub fn with_transport(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        store: SessionStore,
        session: SessionContext,
    ) -> Self {
        let client = ApiClient::new(transport, session.clone());
        let operations = OperationsApi::new(client.clone());
        let documents = DocumentService::new(&config.fonts_dir, &config.font_family, &config.export_dir);

        Self {
            auth: AuthApi::new(client.clone()),
            crm: CrmApi::new(client.clone()),
            users: UserApi::new(client.clone()),
            inventory: InventoryApi::new(client.clone()),
            dashboards: DashboardService::new(DashboardApi::new(client), operations.clone()),
            operations,
            documents,
            store,
            session,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_to_the_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8000/api/");
        assert_eq!(config.reload_delay, Duration::from_millis(1500));
        assert!(config.session_file.ends_with(".bodega/session.json"));
        assert_eq!(config.refresh_policy, RefreshPolicy::KeepPrevious);
    }

    #[test]
    fn refresh_policy_names() {
        assert_eq!("mantener".parse::<RefreshPolicy>(), Ok(RefreshPolicy::KeepPrevious));
        assert_eq!(" Error ".parse::<RefreshPolicy>(), Ok(RefreshPolicy::ShowError));
        assert!("otra".parse::<RefreshPolicy>().is_err());
    }
}

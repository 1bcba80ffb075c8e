// src/api/client.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{common::error::AppError, middleware::auth::SessionContext};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Una petición ya resuelta: ruta relativa a la base, token y cuerpo JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Intercambio HTTP. En producción es `reqwest`; en pruebas se reemplaza.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError>;
}

// =========================================================================
//  TRANSPORTE HTTP (reqwest)
// =========================================================================

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("bodega-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let url = format!("{}{}", self.base_url, request.path.trim_start_matches('/'));
        tracing::debug!("➡️ {} {}", request.method, url);

        let mut builder = self.client.request(request.method, url.as_str());
        if let Some(token) = &request.token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                // Un 500 de Django puede venir en HTML: se reporta como fallo declarado
                Err(_) if !(200..300).contains(&status) => Value::Null,
                Err(e) => return Err(AppError::MalformedResponse(e.to_string())),
            }
        };

        tracing::debug!("⬅️ {} {}", status, url);
        Ok(ApiResponse { status, body })
    }
}

// =========================================================================
//  CLIENTE DE LA API
// =========================================================================

/// Respuesta exitosa sin datos útiles más allá del mensaje.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub status: u16,
    pub message: Option<String>,
    pub body: Value,
}

impl Ack {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Ejecuta una petición y aplica el sobre `{success, message?, error?}`.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        authenticated: bool,
        fallback: &str,
    ) -> Result<ApiResponse, AppError> {
        let token = if authenticated {
            Some(self.session.require_token()?.to_string())
        } else {
            None
        };

        let response = self
            .transport
            .send(ApiRequest { method, path: path.to_string(), token, body })
            .await?;

        check_envelope(response, fallback)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, key: &str, fallback: &str) -> Result<T, AppError> {
        let response = self.call(Method::GET, path, None, true, fallback).await?;
        decode_key(&response.body, key)
    }

    /// GET cuyo cuerpo completo es el registro (comparaciones, historial paginado).
    pub async fn get_body<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, AppError> {
        let response = self.call(Method::GET, path, None, true, fallback).await?;
        serde_json::from_value(response.body).map_err(|source| AppError::Decode {
            context: path.to_string(),
            source,
        })
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<Ack, AppError> {
        let body = serde_json::to_value(body)?;
        let response = self.call(Method::POST, path, Some(body), true, fallback).await?;
        Ok(ack(response))
    }

    /// POST sin token (login y flujos de contraseña).
    pub async fn post_public<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<Ack, AppError> {
        let body = serde_json::to_value(body)?;
        let response = self.call(Method::POST, path, Some(body), false, fallback).await?;
        Ok(ack(response))
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<Ack, AppError> {
        let body = serde_json::to_value(body)?;
        let response = self.call(Method::PUT, path, Some(body), true, fallback).await?;
        Ok(ack(response))
    }

    pub async fn delete(&self, path: &str, fallback: &str) -> Result<Ack, AppError> {
        let response = self.call(Method::DELETE, path, None, true, fallback).await?;
        Ok(ack(response))
    }
}

fn ack(response: ApiResponse) -> Ack {
    let message = response
        .body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ack { status: response.status, message, body: response.body }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    })
}

/// Status no-2xx o `success: false` es un fallo declarado.
pub fn check_envelope(response: ApiResponse, fallback: &str) -> Result<ApiResponse, AppError> {
    let declared_failure = response.body.get("success").and_then(Value::as_bool) == Some(false);

    if !response.is_success() || declared_failure {
        let message = server_message(&response.body).unwrap_or_else(|| fallback.to_string());
        return Err(AppError::Api { status: response.status, message });
    }

    Ok(response)
}

pub fn decode_key<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, AppError> {
    let value = body.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| AppError::Decode {
        context: key.to_string(),
        source,
    })
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Transporte falso: responde en orden y guarda cada petición.
    #[derive(Default)]
    pub struct RecordingTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl RecordingTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, status: u16, body: Value) {
            self.responses
                .lock()
                .unwrap()
                .push_back(ApiResponse { status, body });
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.path).collect()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::MalformedResponse("sin respuesta preparada".into()))
        }
    }

    pub fn admin_session() -> SessionContext {
        session_with_cargo(4)
    }

    pub fn session_with_cargo(cargo: i64) -> SessionContext {
        SessionContext::authenticated(crate::models::auth::SessionUser {
            token: "tok-123".into(),
            cargo,
            nombre: "Paula".into(),
            apellido: "Soto".into(),
        })
    }

    pub fn client(transport: &Arc<RecordingTransport>, session: SessionContext) -> ApiClient {
        ApiClient::new(transport.clone(), session)
    }
}

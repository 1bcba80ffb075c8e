// src/common/error.rs

use thiserror::Error;

use crate::common::notice::Notice;
use crate::models::auth::Role;

pub const CONNECTION_ERROR: &str = "Error de conexión con el servidor. Intente nuevamente.";
pub const UNEXPECTED_ERROR: &str = "Ocurrió un error inesperado.";

#[derive(Debug, Error)]
pub enum AppError {
    // Fallo declarado por el backend: status no-2xx o `success: false`
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Error de conexión: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Respuesta inválida del servidor: {0}")]
    MalformedResponse(String),

    // La respuesta no tiene la forma esperada para el endpoint
    #[error("No se pudo interpretar '{context}': {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Debe iniciar sesión")]
    NotAuthenticated,

    #[error("Acceso denegado para el cargo {0}")]
    Forbidden(Role),

    #[error("No tienes permisos para {0}")]
    PermissionDenied(&'static str),

    #[error("Error de archivo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    FontNotFound(String),

    #[error("Error al generar el PDF: {0}")]
    Pdf(String),

    #[error("Error interno")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Mensaje para el usuario. Los errores internos no exponen detalles.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            AppError::Http(_) | AppError::MalformedResponse(_) => CONNECTION_ERROR.to_string(),
            AppError::Decode { .. } => UNEXPECTED_ERROR.to_string(),
            AppError::ValidationError(errors) => {
                let mut lines: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(m) => format!("{}: {}", field, m),
                            None => format!("{}: {}", field, e.code),
                        })
                    })
                    .collect();
                lines.sort();
                if lines.is_empty() {
                    "Uno o más campos son inválidos.".to_string()
                } else {
                    lines.join("\n")
                }
            }
            AppError::NotAuthenticated => "Debe iniciar sesión para continuar.".to_string(),
            AppError::Forbidden(_) => "No tiene acceso a esta sección.".to_string(),
            AppError::PermissionDenied(action) => format!("No tienes permisos para {}", action),
            AppError::FontNotFound(msg) => msg.clone(),
            AppError::Pdf(_) => "No se pudo generar el PDF.".to_string(),
            e => {
                tracing::error!("Error interno: {}", e);
                UNEXPECTED_ERROR.to_string()
            }
        }
    }

    /// Equivalente al toast de error de la consola web
    pub fn to_notice(&self) -> Notice {
        match self {
            AppError::Http(e) => tracing::error!("❌ Error de transporte: {}", e),
            AppError::Decode { context, source } => {
                tracing::error!("❌ Respuesta inesperada en '{}': {}", context, source)
            }
            AppError::Api { status, message } => {
                tracing::warn!("⚠️ El backend rechazó la operación ({}): {}", status, message)
            }
            _ => {}
        }
        Notice::error(self.user_message())
    }
}


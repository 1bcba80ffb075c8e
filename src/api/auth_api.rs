// src/api/auth_api.rs

use serde_json::json;

use crate::{
    api::client::{Ack, ApiClient},
    common::error::AppError,
    models::auth::{LoginPayload, RecoveryRequestPayload, SessionUser, SetPasswordPayload},
};

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Devuelve el registro de sesión; el llamador decide dónde guardarlo.
    pub async fn login(&self, payload: &LoginPayload) -> Result<SessionUser, AppError> {
        let ack = self
            .client
            .post_public("auth/login/", payload, "Error al iniciar sesión")
            .await?;

        let user: SessionUser = serde_json::from_value(ack.body).map_err(|source| AppError::Decode {
            context: "auth/login/".into(),
            source,
        })?;
        if user.token.is_empty() {
            return Err(AppError::Api { status: ack.status, message: "Credenciales inválidas".into() });
        }
        Ok(user)
    }

    pub async fn logout(&self) -> Result<Ack, AppError> {
        self.client
            .post("auth/logout/", &json!({}), "Error al cerrar sesión")
            .await
    }

    pub async fn request_password_recovery(&self, payload: &RecoveryRequestPayload) -> Result<Ack, AppError> {
        self.client
            .post_public(
                "auth/solicitar-recuperacion/",
                payload,
                "Error al solicitar la recuperación de contraseña",
            )
            .await
    }

    pub async fn reset_password(&self, payload: &SetPasswordPayload) -> Result<Ack, AppError> {
        self.client
            .post_public("auth/resetear-password/", payload, "Error al cambiar la contraseña")
            .await
    }

    /// Primera contraseña de un usuario recién registrado (enlace del correo).
    pub async fn create_password(&self, payload: &SetPasswordPayload) -> Result<Ack, AppError> {
        self.client
            .post_public("establecer-password/", payload, "Error al establecer la contraseña")
            .await
    }
}

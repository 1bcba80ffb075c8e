// src/api/user_api.rs

use serde_json::json;

use crate::{
    api::client::{Ack, ApiClient},
    common::error::AppError,
    models::users::{RegisterUserPayload, User},
};

#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.client
            .get("data/usuarios/", "usuarios", "Error al cargar los usuarios")
            .await
    }

    /// El backend envía el correo para que el usuario establezca su contraseña.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<Ack, AppError> {
        self.client
            .post("admin/usuarios/registrar/", payload, "Error al registrar el usuario")
            .await
    }

    pub async fn set_user_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        let action = if active { "activar" } else { "desactivar" };
        let path = format!("admin/usuarios/{}/{}/", id, action);
        self.client
            .post(&path, &json!({}), "Error al cambiar el estado del usuario")
            .await
    }
}

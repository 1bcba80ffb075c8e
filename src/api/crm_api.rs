// src/api/crm_api.rs

use serde_json::json;

use crate::{
    api::client::{Ack, ApiClient},
    common::error::AppError,
    models::crm::{Driver, DriverPayload, DriverRef, NamedRef, Partner, PartnerKind, PartnerPayload},
};

/// Clientes, proveedores y conductores.
#[derive(Clone)]
pub struct CrmApi {
    client: ApiClient,
}

impl CrmApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // =========================================================================
    //  CLIENTES / PROVEEDORES
    // =========================================================================

    pub async fn list_partners(&self, kind: PartnerKind) -> Result<Vec<Partner>, AppError> {
        let path = format!("admin/{}/", kind.segment());
        let fallback = format!("Error al cargar los {}", kind.segment());
        self.client.get(&path, kind.segment(), &fallback).await
    }

    /// Lista `{id, nombre}` para los selectores de los formularios.
    pub async fn partner_refs(&self, kind: PartnerKind) -> Result<Vec<NamedRef>, AppError> {
        let path = format!("data/{}/", kind.segment());
        let fallback = format!("Error al cargar los {}", kind.segment());
        self.client.get(&path, kind.segment(), &fallback).await
    }

    pub async fn register_partner(&self, kind: PartnerKind, payload: &PartnerPayload) -> Result<Ack, AppError> {
        let path = format!("admin/{}/registrar/", kind.segment());
        let fallback = format!("Error al registrar el {}", kind.singular());
        self.client.post(&path, payload, &fallback).await
    }

    pub async fn edit_partner(&self, kind: PartnerKind, id: i64, payload: &PartnerPayload) -> Result<Ack, AppError> {
        let path = format!("admin/{}/{}/editar/", kind.segment(), id);
        let fallback = format!("Error al actualizar el {}", kind.singular());
        self.client.put(&path, payload, &fallback).await
    }

    pub async fn set_partner_active(&self, kind: PartnerKind, id: i64, active: bool) -> Result<Ack, AppError> {
        let action = if active { "activar" } else { "desactivar" };
        let path = format!("admin/{}/{}/{}/", kind.segment(), id, action);
        let fallback = format!("Error al cambiar el estado del {}", kind.singular());
        self.client.put(&path, &json!({}), &fallback).await
    }

    // =========================================================================
    //  CONDUCTORES
    // =========================================================================

    pub async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        self.client
            .get("admin/conductores/", "conductores", "Error al cargar los conductores")
            .await
    }

    pub async fn driver_refs(&self) -> Result<Vec<DriverRef>, AppError> {
        self.client
            .get("data/conductores/", "conductores", "Error al cargar los conductores")
            .await
    }

    pub async fn register_driver(&self, payload: &DriverPayload) -> Result<Ack, AppError> {
        self.client
            .post("admin/conductores/registrar/", payload, "Error al registrar el conductor")
            .await
    }

    pub async fn edit_driver(&self, id: i64, payload: &DriverPayload) -> Result<Ack, AppError> {
        let path = format!("admin/conductores/{}/editar/", id);
        self.client.put(&path, payload, "Error al actualizar el conductor").await
    }

    pub async fn set_driver_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        let action = if active { "activar" } else { "desactivar" };
        let path = format!("admin/conductores/{}/{}/", id, action);
        self.client
            .put(&path, &json!({}), "Error al cambiar el estado del conductor")
            .await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    #[tokio::test]
    async fn partner_paths_follow_the_kind() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "proveedores": []}));
        transport.push(200, json!({"success": true}));
        transport.push(200, json!({"success": true}));
        let api = CrmApi::new(client(&transport, admin_session()));

        api.list_partners(PartnerKind::Proveedor).await.unwrap();
        api.set_partner_active(PartnerKind::Cliente, 7, false).await.unwrap();
        api.set_partner_active(PartnerKind::Cliente, 7, true).await.unwrap();

        assert_eq!(
            transport.paths(),
            vec![
                "admin/proveedores/",
                "admin/clientes/7/desactivar/",
                "admin/clientes/7/activar/",
            ]
        );
        assert_eq!(transport.requests()[1].method, Method::PUT);
    }
}

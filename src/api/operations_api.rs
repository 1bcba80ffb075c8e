// src/api/operations_api.rs

use serde_json::json;

use crate::{
    api::client::{Ack, ApiClient},
    common::error::AppError,
    models::{
        auth::Role,
        crm::NamedRef,
        operations::{
            Dispatch, DispatchPayload, Intake, IntakePayload, PendingShrinkage, Shrinkage,
            ShrinkagePayload,
        },
    },
};

/// Los registros de movimientos solo cuentan como exitosos con un 201.
fn created(ack: Ack, what: &str, fallback: &str) -> Result<Ack, AppError> {
    if ack.status != 201 {
        tracing::warn!("⚠️ {} respondido con status {}", what, ack.status);
        return Err(AppError::Api { status: ack.status, message: fallback.to_string() });
    }
    Ok(ack)
}

/// Ingresos, salidas y mermas.
#[derive(Clone)]
pub struct OperationsApi {
    client: ApiClient,
}

impl OperationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // =========================================================================
    //  INGRESOS
    // =========================================================================

    pub async fn list_intakes(&self) -> Result<Vec<Intake>, AppError> {
        self.client
            .get("data/ingresos/", "ingresos", "Error al cargar los ingresos")
            .await
    }

    /// El backend responde 201 cuando el ingreso queda registrado.
    pub async fn register_intake(&self, payload: &IntakePayload) -> Result<Ack, AppError> {
        let fallback = "Error al registrar el ingreso de productos";
        let ack = self.client.post("bodeguero/ingreso-producto/", payload, fallback).await?;
        created(ack, "Ingreso", fallback)
    }

    pub async fn delete_intake(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("admin/ingresos/{}/eliminar/", id);
        self.client.delete(&path, "Error al eliminar el ingreso").await
    }

    // =========================================================================
    //  SALIDAS
    // =========================================================================

    pub async fn list_dispatches(&self) -> Result<Vec<Dispatch>, AppError> {
        self.client
            .get("data/salidas/", "salidas", "Error al cargar las salidas")
            .await
    }

    /// Igual que el ingreso: solo un 201 cuenta como salida registrada.
    pub async fn register_dispatch(&self, payload: &DispatchPayload) -> Result<Ack, AppError> {
        let fallback = "Error al registrar la salida de productos";
        let ack = self.client.post("bodeguero/salida-producto/", payload, fallback).await?;
        created(ack, "Salida", fallback)
    }

    pub async fn delete_dispatch(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("admin/salidas/{}/eliminar/", id);
        self.client.delete(&path, "Error al eliminar la salida").await
    }

    // =========================================================================
    //  MERMAS
    // =========================================================================

    pub async fn list_shrinkage(&self) -> Result<Vec<Shrinkage>, AppError> {
        self.client
            .get("data/mermas/", "mermas", "Error al cargar las mermas")
            .await
    }

    pub async fn shrinkage_categories(&self) -> Result<Vec<NamedRef>, AppError> {
        self.client
            .get("data/categorias-merma/", "categorias", "Error al cargar las categorías de merma")
            .await
    }

    /// El jefe de bodega registra mermas ya aprobadas; el bodeguero las deja pendientes.
    pub async fn register_shrinkage(&self, role: Role, payload: &ShrinkagePayload) -> Result<Ack, AppError> {
        let path = match role {
            Role::JefeBodega => "jefe-bodega/registrar-merma-aprobada/",
            Role::Bodeguero => "bodeguero/registro-merma/",
            _ => return Err(AppError::PermissionDenied("registrar mermas")),
        };
        self.client.post(path, payload, "Error al registrar la merma").await
    }

    pub async fn delete_shrinkage(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("admin/mermas/{}/eliminar/", id);
        self.client.delete(&path, "Error al eliminar la merma").await
    }

    pub async fn pending_shrinkage(&self) -> Result<Vec<PendingShrinkage>, AppError> {
        self.client
            .get("jefe-bodega/mermas-pendientes/", "mermas_pendientes", "Error al cargar las mermas pendientes")
            .await
    }

    pub async fn approve_shrinkage(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("jefe-bodega/aprobar-merma/{}/", id);
        self.client.post(&path, &json!({}), "Error al aprobar la merma").await
    }

    pub async fn reject_shrinkage(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("jefe-bodega/rechazar-merma/{}/", id);
        self.client.post(&path, &json!({}), "Error al rechazar la merma").await
    }
}

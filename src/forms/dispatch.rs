// src/forms/dispatch.rs

use validator::{Validate, ValidationError};

use crate::{
    api::{CrmApi, InventoryApi, OperationsApi},
    common::error::AppError,
    forms::{Checks, LotLineDraft, Submission, filled, lot_lines, outcome, parse_id, selection},
    models::{
        crm::{DriverRef, NamedRef, PartnerKind},
        inventory::LotRef,
        operations::{DEFAULT_BODEGA_ID, DispatchLinePayload, DispatchPayload},
    },
};

/// Clientes, conductores y lotes se piden juntos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReferences {
    pub clientes: Vec<NamedRef>,
    pub conductores: Vec<DriverRef>,
    pub lotes: Vec<LotRef>,
}

impl DispatchReferences {
    pub async fn load(crm: &CrmApi, inventory: &InventoryApi) -> Result<Self, AppError> {
        let (clientes, conductores, lotes) = tokio::try_join!(
            crm.partner_refs(PartnerKind::Cliente),
            crm.driver_refs(),
            inventory.lots()
        )?;
        Ok(Self { clientes, conductores, lotes })
    }
}

fn selected_cliente(value: &str) -> Result<(), ValidationError> {
    selection(value, "Debe seleccionar un cliente")
}

fn selected_conductor(value: &str) -> Result<(), ValidationError> {
    selection(value, "Debe seleccionar un conductor")
}

fn described(value: &str) -> Result<(), ValidationError> {
    filled(value, "La descripción es requerida")
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct DispatchDraft {
    #[validate(custom(function = "selected_cliente"))]
    pub cliente_id: String,

    #[validate(custom(function = "selected_conductor"))]
    pub conductor_id: String,

    #[validate(custom(function = "described"))]
    pub descripcion: String,

    pub lineas: Vec<LotLineDraft>,
}

impl Default for DispatchDraft {
    fn default() -> Self {
        Self {
            cliente_id: String::new(),
            conductor_id: String::new(),
            descripcion: String::new(),
            lineas: vec![LotLineDraft::default()],
        }
    }
}

impl DispatchDraft {
    pub fn payload(&self, lots: &[LotRef]) -> Result<DispatchPayload, AppError> {
        let mut checks = Checks::from_derive(self.validate());
        let cliente_id = parse_id(&self.cliente_id);
        let conductor_id = parse_id(&self.conductor_id);
        let productos = lot_lines(&self.lineas, lots, &mut checks);

        checks.finish()?;
        match (cliente_id, conductor_id) {
            (Some(cliente_id), Some(conductor_id)) => Ok(DispatchPayload {
                bodega_id: DEFAULT_BODEGA_ID,
                cliente_id,
                conductor_id,
                descripcion: self.descripcion.trim().to_string(),
                productos: productos
                    .into_iter()
                    .map(|(lote_id, cantidad_lotes)| DispatchLinePayload { lote_id, cantidad_lotes })
                    .collect(),
            }),
            _ => Err(AppError::InternalServerError(anyhow::anyhow!("salida sin validar"))),
        }
    }

    /// Tras un éxito se recargan los lotes para mostrar el stock nuevo.
    pub async fn submit(
        &mut self,
        operations: &OperationsApi,
        inventory: &InventoryApi,
        refs: &mut DispatchReferences,
    ) -> Submission {
        let payload = match self.payload(&refs.lotes) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = operations.register_dispatch(&payload).await;
        let submission = outcome(result, "Salida de productos registrada exitosamente", None);
        if submission.succeeded() {
            *self = Self::default();
            match inventory.lots().await {
                Ok(lotes) => refs.lotes = lotes,
                Err(e) => tracing::warn!("⚠️ No se pudieron recargar los lotes: {}", e),
            }
        }
        submission
    }
}

// src/forms/shrinkage.rs

use validator::{Validate, ValidationError};

use crate::{
    api::{InventoryApi, OperationsApi},
    common::error::AppError,
    forms::{Checks, LotLineDraft, Submission, field_error, lot_lines, outcome, parse_id, selection},
    models::{
        auth::Role,
        crm::NamedRef,
        inventory::LotRef,
        operations::{ShrinkageLinePayload, ShrinkagePayload},
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShrinkageReferences {
    pub categorias: Vec<NamedRef>,
    pub lotes: Vec<LotRef>,
}

impl ShrinkageReferences {
    pub async fn load(operations: &OperationsApi, inventory: &InventoryApi) -> Result<Self, AppError> {
        let (categorias, lotes) = tokio::try_join!(operations.shrinkage_categories(), inventory.lots())?;
        Ok(Self { categorias, lotes })
    }
}

fn selected_categoria(value: &str) -> Result<(), ValidationError> {
    selection(value, "Debe seleccionar una categoría")
}

fn explained(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", "Las observaciones son requeridas"));
    }
    if value.chars().count() < 10 {
        return Err(field_error("length", "Las observaciones deben tener al menos 10 caracteres"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ShrinkageDraft {
    #[validate(custom(function = "selected_categoria"))]
    pub categoria_merma_id: String,

    #[validate(custom(function = "explained"))]
    pub observaciones: String,

    pub lineas: Vec<LotLineDraft>,
}

impl Default for ShrinkageDraft {
    fn default() -> Self {
        Self {
            categoria_merma_id: String::new(),
            observaciones: String::new(),
            lineas: vec![LotLineDraft::default()],
        }
    }
}

fn success_message(role: Role) -> &'static str {
    match role {
        Role::JefeBodega => "Merma registrada y aprobada exitosamente",
        _ => "Merma registrada a espera de aprobación",
    }
}

impl ShrinkageDraft {
    pub fn payload(&self, lots: &[LotRef]) -> Result<ShrinkagePayload, AppError> {
        let mut checks = Checks::from_derive(self.validate());
        let categoria_merma_id = parse_id(&self.categoria_merma_id);
        let observaciones = self.observaciones.trim();
        let productos = lot_lines(&self.lineas, lots, &mut checks);

        checks.finish()?;
        let categoria_merma_id = categoria_merma_id
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("merma sin validar")))?;
        Ok(ShrinkagePayload {
            categoria_merma_id,
            observaciones: observaciones.to_string(),
            productos: productos
                .into_iter()
                .map(|(lote_id, cantidad_merma)| ShrinkageLinePayload { lote_id, cantidad_merma })
                .collect(),
        })
    }

    /// El cargo decide el endpoint. Tras un éxito se recargan categorías y lotes.
    pub async fn submit(
        &mut self,
        operations: &OperationsApi,
        inventory: &InventoryApi,
        role: Role,
        refs: &mut ShrinkageReferences,
    ) -> Submission {
        if !matches!(role, Role::JefeBodega | Role::Bodeguero) {
            return Submission::rejected(AppError::PermissionDenied("registrar mermas"));
        }
        let payload = match self.payload(&refs.lotes) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = operations.register_shrinkage(role, &payload).await;
        let submission = outcome(result, success_message(role), None);
        if submission.succeeded() {
            *self = Self::default();
            match ShrinkageReferences::load(operations, inventory).await {
                Ok(fresh) => *refs = fresh,
                Err(e) => tracing::warn!("⚠️ No se pudieron recargar los lotes: {}", e),
            }
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn refs() -> ShrinkageReferences {
        ShrinkageReferences {
            categorias: vec![NamedRef { id: 1, nombre: "Vencimiento".into() }],
            lotes: vec![LotRef {
                id: 7,
                codigo_lote: "L-7".into(),
                cantidad: Decimal::new(10, 0),
                producto_nombre: "Yogurt".into(),
            }],
        }
    }

    fn valid() -> ShrinkageDraft {
        ShrinkageDraft {
            categoria_merma_id: "1".into(),
            observaciones: "  Producto vencido en cámara  ".into(),
            lineas: vec![LotLineDraft { lote_id: "7".into(), cantidad: "3".into() }],
        }
    }

    #[test]
    fn observations_are_trimmed_before_counting() {
        let mut draft = valid();
        draft.observaciones = "   corto    ".into();
        assert_eq!(
            draft.payload(&refs().lotes).unwrap_err().user_message(),
            "observaciones: Las observaciones deben tener al menos 10 caracteres"
        );
    }

    #[tokio::test]
    async fn auditor_is_refused_without_a_call() {
        let transport = RecordingTransport::new();
        let session = session_with_cargo(3);
        let operations = OperationsApi::new(client(&transport, session.clone()));
        let inventory = InventoryApi::new(client(&transport, session));
        let mut refs = refs();

        let submission = valid().submit(&operations, &inventory, Role::Auditor, &mut refs).await;

        assert_eq!(submission.notice.message, "No tienes permisos para registrar mermas");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn chief_registration_is_approved_and_lists_reload() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        transport.push(200, json!({"success": true, "categorias": [{"id": 1, "nombre": "Vencimiento"}]}));
        transport.push(200, json!({"success": true, "lotes": []}));
        let session = session_with_cargo(2);
        let operations = OperationsApi::new(client(&transport, session.clone()));
        let inventory = InventoryApi::new(client(&transport, session));
        let mut refs = refs();
        let mut draft = valid();

        let submission = draft.submit(&operations, &inventory, Role::JefeBodega, &mut refs).await;

        assert_eq!(submission.notice.message, "Merma registrada y aprobada exitosamente");
        assert_eq!(
            transport.paths(),
            vec!["jefe-bodega/registrar-merma-aprobada/", "data/categorias-merma/", "data/lotes/"]
        );
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["observaciones"], "Producto vencido en cámara");
        assert_eq!(body["productos"], json!([{"lote_id": 7, "cantidad_merma": 3}]));
        assert!(refs.lotes.is_empty());
        assert_eq!(draft, ShrinkageDraft::default());
    }

    #[tokio::test]
    async fn worker_registration_waits_for_approval() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        transport.push(200, json!({"success": true, "categorias": []}));
        transport.push(200, json!({"success": true, "lotes": []}));
        let session = session_with_cargo(1);
        let operations = OperationsApi::new(client(&transport, session.clone()));
        let inventory = InventoryApi::new(client(&transport, session));
        let mut refs = refs();

        let submission = valid().submit(&operations, &inventory, Role::Bodeguero, &mut refs).await;

        assert_eq!(submission.notice.message, "Merma registrada a espera de aprobación");
        assert_eq!(transport.paths()[0], "bodeguero/registro-merma/");
    }
}

// src/forms/intake.rs

use chrono::NaiveDate;
use validator::{Validate, ValidationError};

use crate::{
    api::{CrmApi, InventoryApi, OperationsApi},
    common::error::AppError,
    forms::{Checks, MAX_LINES, Submission, outcome, parse_count, parse_id, selection},
    models::{
        crm::{NamedRef, PartnerKind},
        inventory::ProductRef,
        operations::{IntakeLinePayload, IntakePayload},
    },
};

/// Proveedores y productos del formulario de ingreso.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeReferences {
    pub proveedores: Vec<NamedRef>,
    pub productos: Vec<ProductRef>,
}

impl IntakeReferences {
    pub async fn load(crm: &CrmApi, inventory: &InventoryApi) -> Result<Self, AppError> {
        let (proveedores, productos) =
            tokio::try_join!(crm.partner_refs(PartnerKind::Proveedor), inventory.product_refs())?;
        Ok(Self { proveedores, productos })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeLineDraft {
    pub producto_id: String,
    pub cantidad_lotes: String,
    pub codigo_lote: String,
    /// `YYYY-MM-DD`
    pub fecha_vencimiento: String,
}

impl IntakeLineDraft {
    fn is_blank(&self) -> bool {
        self.producto_id.trim().is_empty()
            && self.cantidad_lotes.trim().is_empty()
            && self.codigo_lote.trim().is_empty()
            && self.fecha_vencimiento.trim().is_empty()
    }

    /// Errores de la línea `n` (1-based). `None` si la línea se descarta.
    fn check(&self, n: usize, today: NaiveDate, checks: &mut Checks) -> Option<IntakeLinePayload> {
        let Some(producto_id) = parse_id(&self.producto_id) else {
            if !self.is_blank() {
                checks.add("productos", "required", format!("Línea {}: Debe seleccionar un producto", n));
            }
            return None;
        };

        let cantidad_lotes = match parse_count(&self.cantidad_lotes) {
            Ok(count) => Some(count),
            Err(message) => {
                checks.add("productos", "cantidad_lotes", format!("Línea {}: Cantidad de lotes: {}", n, message));
                None
            }
        };

        let codigo_lote = self.codigo_lote.trim();
        if codigo_lote.is_empty() {
            checks.add("productos", "codigo_lote", format!("Línea {}: El código de lote es requerido", n));
        }

        let fecha = self.fecha_vencimiento.trim();
        let vencimiento = if fecha.is_empty() {
            checks.add(
                "productos",
                "fecha_vencimiento",
                format!("Línea {}: La fecha de vencimiento es requerida", n),
            );
            None
        } else {
            match NaiveDate::parse_from_str(fecha, "%Y-%m-%d") {
                Ok(date) if date > today => Some(date),
                _ => {
                    checks.add(
                        "productos",
                        "fecha_vencimiento",
                        format!("Línea {}: La fecha de vencimiento debe ser posterior a hoy", n),
                    );
                    None
                }
            }
        };

        match (cantidad_lotes, vencimiento) {
            (Some(cantidad_lotes), Some(vencimiento)) if !codigo_lote.is_empty() => Some(IntakeLinePayload {
                producto_id,
                cantidad_lotes,
                codigo_lote: codigo_lote.to_string(),
                fecha_vencimiento: vencimiento.format("%Y-%m-%d").to_string(),
            }),
            _ => None,
        }
    }
}

fn selected_proveedor(value: &str) -> Result<(), ValidationError> {
    selection(value, "Debe seleccionar un proveedor")
}

/// Ingreso de productos: proveedor, descripción y de 1 a 10 líneas.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct IntakeDraft {
    #[validate(custom(function = "selected_proveedor"))]
    pub proveedor_id: String,
    pub descripcion: String,
    pub lineas: Vec<IntakeLineDraft>,
}

impl Default for IntakeDraft {
    fn default() -> Self {
        Self {
            proveedor_id: String::new(),
            descripcion: String::new(),
            lineas: vec![IntakeLineDraft::default()],
        }
    }
}

impl IntakeDraft {
    pub fn payload(&self, today: NaiveDate) -> Result<IntakePayload, AppError> {
        let mut checks = Checks::from_derive(self.validate());
        let proveedor_id = parse_id(&self.proveedor_id);

        if self.lineas.len() > MAX_LINES {
            checks.add("productos", "max", format!("Máximo {} productos por ingreso", MAX_LINES));
        }
        let productos: Vec<IntakeLinePayload> = self
            .lineas
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.check(i + 1, today, &mut checks))
            .collect();
        if productos.is_empty() && !checks.has("productos") {
            checks.add("productos", "required", "Debe agregar al menos un producto");
        }

        checks.finish()?;
        let proveedor_id = proveedor_id
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("ingreso sin validar")))?;
        Ok(IntakePayload {
            proveedor_id,
            descripcion: self.descripcion.trim().to_string(),
            productos,
        })
    }

    pub async fn submit(&mut self, api: &OperationsApi, today: NaiveDate) -> Submission {
        let payload = match self.payload(today) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.register_intake(&payload).await;
        let submission = outcome(result, "Ingreso de productos registrado exitosamente", None);
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn line(producto: &str, lotes: &str, codigo: &str, vence: &str) -> IntakeLineDraft {
        IntakeLineDraft {
            producto_id: producto.into(),
            cantidad_lotes: lotes.into(),
            codigo_lote: codigo.into(),
            fecha_vencimiento: vence.into(),
        }
    }

    #[test]
    fn blank_lines_are_dropped_and_partial_lines_need_a_product() {
        let draft = IntakeDraft {
            proveedor_id: "3".into(),
            descripcion: "Compra semanal".into(),
            lineas: vec![
                line("5", "2", "L-001", "2025-12-31"),
                IntakeLineDraft::default(),
            ],
        };
        let payload = draft.payload(today()).unwrap();
        assert_eq!(payload.productos.len(), 1);
        assert_eq!(payload.productos[0].cantidad_lotes, 2);

        let draft = IntakeDraft {
            lineas: vec![line("", "2", "", "")],
            ..draft
        };
        assert!(draft
            .payload(today())
            .unwrap_err()
            .user_message()
            .contains("productos: Línea 1: Debe seleccionar un producto"));
    }

    #[test]
    fn expiry_must_be_after_today() {
        let draft = IntakeDraft {
            proveedor_id: "3".into(),
            descripcion: String::new(),
            lineas: vec![line("5", "1", "L-9", "2025-06-15")],
        };
        let message = draft.payload(today()).unwrap_err().user_message();
        assert_eq!(message, "productos: Línea 1: La fecha de vencimiento debe ser posterior a hoy");
    }

    #[test]
    fn more_than_ten_lines_are_rejected() {
        let draft = IntakeDraft {
            proveedor_id: "3".into(),
            descripcion: String::new(),
            lineas: vec![line("5", "1", "L-1", "2026-01-01"); MAX_LINES + 1],
        };
        let message = draft.payload(today()).unwrap_err().user_message();
        assert_eq!(message, "productos: Máximo 10 productos por ingreso");
    }

    #[tokio::test]
    async fn missing_supplier_issues_no_call() {
        let transport = RecordingTransport::new();
        let api = OperationsApi::new(client(&transport, session_with_cargo(1)));
        let mut draft = IntakeDraft { lineas: vec![line("5", "1", "L-1", "2026-01-01")], ..Default::default() };

        let submission = draft.submit(&api, today()).await;

        assert_eq!(submission.notice.message, "proveedor_id: Debe seleccionar un proveedor");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn created_intake_resets_the_form() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        let api = OperationsApi::new(client(&transport, session_with_cargo(1)));
        let mut draft = IntakeDraft {
            proveedor_id: "3".into(),
            descripcion: "Reposición".into(),
            lineas: vec![line("5", "4", "L-77", "2026-03-01")],
        };

        let submission = draft.submit(&api, today()).await;

        assert_eq!(submission.notice.message, "Ingreso de productos registrado exitosamente");
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["proveedor_id"], 3);
        assert_eq!(body["productos"][0]["cantidad_lotes"], 4);
        assert_eq!(body["productos"][0]["fecha_vencimiento"], "2026-03-01");
        assert_eq!(draft, IntakeDraft::default());
    }

    #[tokio::test]
    async fn references_are_loaded_with_one_join() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "proveedores": [{"id": 3, "nombre": "Agrosur"}]}));
        transport.push(200, json!({"success": true, "productos": []}));
        let session = session_with_cargo(1);
        let crm = CrmApi::new(client(&transport, session.clone()));
        let inventory = InventoryApi::new(client(&transport, session));

        let refs = IntakeReferences::load(&crm, &inventory).await.unwrap();

        assert_eq!(refs.proveedores[0].nombre, "Agrosur");
        assert!(refs.productos.is_empty());
    }
}

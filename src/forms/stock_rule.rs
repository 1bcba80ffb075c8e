// src/forms/stock_rule.rs

use rust_decimal::Decimal;

use crate::{
    api::InventoryApi,
    common::error::AppError,
    forms::{Checks, Submission, outcome, parse_id, parse_positive},
    models::inventory::{ProductRef, StockRule, StockRulePayload, StockRuleUpdate},
};

/// Solo se ofrecen productos que todavía no tienen regla.
pub fn products_without_rule(products: &[ProductRef], rules: &[StockRule]) -> Vec<ProductRef> {
    products
        .iter()
        .filter(|p| !rules.iter().any(|r| r.producto_id == p.id))
        .cloned()
        .collect()
}

fn check_minimum(checks: &mut Checks, raw: &str) -> Option<Decimal> {
    if raw.trim().is_empty() {
        checks.add("cantidad_minima", "required", "La cantidad mínima es requerida");
        return None;
    }
    let value = parse_positive(raw);
    if value.is_none() {
        checks.add("cantidad_minima", "range", "La cantidad mínima debe ser un número mayor a 0");
    }
    value
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockRuleDraft {
    pub producto_id: String,
    pub cantidad_minima: String,
}

impl StockRuleDraft {
    /// Carga productos y reglas a la vez y deja los productos seleccionables.
    pub async fn options(api: &InventoryApi) -> Result<Vec<ProductRef>, AppError> {
        let (products, rules) = tokio::try_join!(api.product_refs(), api.list_stock_rules())?;
        Ok(products_without_rule(&products, &rules))
    }

    pub fn payload(&self, available: &[ProductRef]) -> Result<StockRulePayload, AppError> {
        let mut checks = Checks::new();

        let producto_id = parse_id(&self.producto_id);
        match producto_id {
            None => checks.add("producto_id", "required", "Debes seleccionar un producto"),
            Some(id) if !available.iter().any(|p| p.id == id) => {
                checks.add("producto_id", "taken", "El producto ya tiene una regla de stock mínimo")
            }
            Some(_) => {}
        }
        let cantidad_minima = check_minimum(&mut checks, &self.cantidad_minima);

        checks.finish()?;
        match (producto_id, cantidad_minima) {
            (Some(producto_id), Some(cantidad_minima)) => Ok(StockRulePayload { producto_id, cantidad_minima }),
            _ => Err(AppError::InternalServerError(anyhow::anyhow!("regla de stock sin validar"))),
        }
    }

    pub async fn submit(&mut self, api: &InventoryApi, available: &[ProductRef]) -> Submission {
        let payload = match self.payload(available) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.create_stock_rule(&payload).await;
        let submission = outcome(result, "Regla de stock creada correctamente", None);
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

/// Edición: solo cambia la cantidad mínima.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRuleEdit {
    pub id: i64,
    pub cantidad_minima: String,
}

impl From<&StockRule> for StockRuleEdit {
    fn from(rule: &StockRule) -> Self {
        Self { id: rule.id, cantidad_minima: rule.cantidad_minima.normalize().to_string() }
    }
}

impl StockRuleEdit {
    pub fn payload(&self) -> Result<StockRuleUpdate, AppError> {
        let mut checks = Checks::new();
        let cantidad_minima = check_minimum(&mut checks, &self.cantidad_minima);
        checks.finish()?;
        cantidad_minima
            .map(|cantidad_minima| StockRuleUpdate { cantidad_minima })
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("regla de stock sin validar")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn product(id: i64, nombre: &str) -> ProductRef {
        ProductRef {
            id,
            nombre: nombre.into(),
            cantidad_por_lote: Decimal::ONE,
            unidad_medida_abreviatura: None,
        }
    }

    fn rule(producto_id: i64) -> StockRule {
        StockRule {
            id: 100 + producto_id,
            producto_id,
            producto_nombre: String::new(),
            cantidad_minima: Decimal::new(5, 0),
            cantidad_por_lote: None,
            unidad_medida: None,
            unidad_medida_nombre: None,
        }
    }

    #[test]
    fn products_with_a_rule_are_not_offered() {
        let products = vec![product(1, "Harina"), product(2, "Azúcar"), product(3, "Sal")];
        let available = products_without_rule(&products, &[rule(2)]);
        let ids: Vec<i64> = available.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let draft = StockRuleDraft { producto_id: "2".into(), cantidad_minima: "4".into() };
        assert!(draft.payload(&available).is_err());
    }

    #[test]
    fn edit_requires_a_positive_minimum() {
        let mut edit = StockRuleEdit::from(&rule(1));
        assert_eq!(edit.cantidad_minima, "5");
        edit.cantidad_minima = "0".into();
        assert_eq!(
            edit.payload().unwrap_err().user_message(),
            "cantidad_minima: La cantidad mínima debe ser un número mayor a 0"
        );
    }

    #[tokio::test]
    async fn valid_rule_is_sent_once() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        let api = InventoryApi::new(client(&transport, admin_session()));
        let available = vec![product(1, "Harina")];
        let mut draft = StockRuleDraft { producto_id: "1".into(), cantidad_minima: "7,5".into() };

        let submission = draft.submit(&api, &available).await;

        assert!(submission.succeeded());
        assert_eq!(transport.paths(), vec!["admin/stocks-minimos/crear/"]);
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["producto_id"], 1);
        assert_eq!(body["cantidad_minima"], 7.5);
    }
}

// src/forms/product.rs

use rust_decimal::Decimal;

use crate::{
    api::InventoryApi,
    common::error::AppError,
    forms::{Checks, Submission, outcome, parse_id, parse_positive},
    models::{
        crm::NamedRef,
        inventory::{Product, ProductPayload, UnitOfMeasure, is_bulk_unit},
    },
};

/// Listas que alimentan los selectores de categoría y unidad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductReferences {
    pub categorias: Vec<NamedRef>,
    pub unidades: Vec<UnitOfMeasure>,
}

impl ProductReferences {
    pub async fn load(api: &InventoryApi) -> Result<Self, AppError> {
        let (categorias, unidades) = tokio::try_join!(api.categories(), api.units())?;
        Ok(Self { categorias, unidades })
    }

    fn unit(&self, id: i64) -> Option<&UnitOfMeasure> {
        self.unidades.iter().find(|u| u.id == id)
    }
}

/// Campos crudos compartidos por el registro y la edición.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFields {
    pub nombre: String,
    pub categoria_id: String,
    pub unidad_medida_id: String,
    pub cantidad_por_lote: String,
    pub precio_unitario: String,
}

impl ProductFields {
    /// Elegir una unidad a granel fija el lote en 1.
    pub fn select_unit(&mut self, unit: &UnitOfMeasure) {
        self.unidad_medida_id = unit.id.to_string();
        if is_bulk_unit(&unit.nombre) {
            self.cantidad_por_lote = "1".to_string();
        }
    }

    pub fn payload(&self, refs: &ProductReferences) -> Result<ProductPayload, AppError> {
        let mut checks = Checks::new();

        if self.nombre.trim().is_empty() {
            checks.add("nombre", "required", "El nombre del producto es requerido");
        }
        let categoria_id = parse_id(&self.categoria_id);
        if categoria_id.is_none() {
            checks.add("categoria_id", "required", "Debes seleccionar una categoría");
        }
        let unidad_medida_id = parse_id(&self.unidad_medida_id);
        if unidad_medida_id.is_none() {
            checks.add("unidad_medida_id", "required", "Debes seleccionar una unidad de medida");
        }

        let bulk = unidad_medida_id
            .and_then(|id| refs.unit(id))
            .is_some_and(|unit| is_bulk_unit(&unit.nombre));
        let cantidad_por_lote = if bulk { Some(Decimal::ONE) } else { parse_positive(&self.cantidad_por_lote) };
        if cantidad_por_lote.is_none() {
            checks.add("cantidad_por_lote", "range", "La cantidad por lote debe ser mayor a 0");
        }
        let precio_unitario = parse_positive(&self.precio_unitario);
        if precio_unitario.is_none() {
            checks.add("precio_unitario", "range", "El precio unitario debe ser mayor a 0");
        }

        checks.finish()?;
        match (categoria_id, unidad_medida_id, cantidad_por_lote, precio_unitario) {
            (Some(categoria_id), Some(unidad_medida_id), Some(cantidad_por_lote), Some(precio_unitario)) => {
                Ok(ProductPayload {
                    nombre: self.nombre.trim().to_string(),
                    categoria_id,
                    unidad_medida_id,
                    cantidad_por_lote,
                    precio_unitario,
                })
            }
            _ => Err(AppError::InternalServerError(anyhow::anyhow!("producto sin validar"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub fields: ProductFields,
}

impl ProductDraft {
    pub async fn submit(&mut self, api: &InventoryApi, refs: &ProductReferences) -> Submission {
        let payload = match self.fields.payload(refs) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.create_product(&payload).await;
        let submission = outcome(result, "Producto registrado correctamente", None);
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

/// El listado trae nombres de categoría y unidad; el diálogo busca sus ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEdit {
    pub id: i64,
    pub fields: ProductFields,
}

impl ProductEdit {
    pub fn new(product: &Product, refs: &ProductReferences) -> Self {
        let categoria_id = product
            .categoria
            .as_deref()
            .and_then(|nombre| refs.categorias.iter().find(|c| c.nombre == nombre))
            .map(|c| c.id.to_string())
            .unwrap_or_default();
        let unidad_medida_id = refs
            .unidades
            .iter()
            .find(|u| u.nombre == product.unidad_medida)
            .map(|u| u.id.to_string())
            .unwrap_or_default();

        Self {
            id: product.id,
            fields: ProductFields {
                nombre: product.nombre.clone(),
                categoria_id,
                unidad_medida_id,
                cantidad_por_lote: product.cantidad_por_lote.normalize().to_string(),
                precio_unitario: product.precio_unitario.normalize().to_string(),
            },
        }
    }

    pub fn payload(&self, refs: &ProductReferences) -> Result<ProductPayload, AppError> {
        self.fields.payload(refs)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn refs() -> ProductReferences {
        ProductReferences {
            categorias: vec![
                NamedRef { id: 1, nombre: "Bebidas".into() },
                NamedRef { id: 2, nombre: "Abarrotes".into() },
            ],
            unidades: vec![
                UnitOfMeasure { id: 1, nombre: "Unidades".into(), abreviatura: "un".into() },
                UnitOfMeasure { id: 2, nombre: "Litros".into(), abreviatura: "L".into() },
            ],
        }
    }

    #[test]
    fn bulk_unit_forces_lot_size_of_one() {
        let refs = refs();
        let mut fields = ProductFields {
            nombre: "Aceite maravilla".into(),
            categoria_id: "2".into(),
            cantidad_por_lote: "12".into(),
            precio_unitario: "2490".into(),
            ..Default::default()
        };
        fields.select_unit(&refs.unidades[1]);

        assert_eq!(fields.cantidad_por_lote, "1");
        assert_eq!(fields.payload(&refs).unwrap().cantidad_por_lote, Decimal::ONE);
    }

    #[test]
    fn edit_dialog_resolves_ids_by_name() {
        let product = Product {
            id: 9,
            nombre: "Agua mineral".into(),
            precio_unitario: Decimal::new(890, 0),
            cantidad_por_lote: Decimal::new(6, 0),
            activo: true,
            categoria: Some("Bebidas".into()),
            unidad_medida: "Unidades".into(),
        };
        let edit = ProductEdit::new(&product, &refs());
        assert_eq!(edit.fields.categoria_id, "1");
        assert_eq!(edit.fields.unidad_medida_id, "1");
        assert_eq!(edit.payload(&refs()).unwrap().precio_unitario, Decimal::new(890, 0));
    }

    #[tokio::test]
    async fn unselected_pickers_never_reach_the_network() {
        let transport = RecordingTransport::new();
        let api = InventoryApi::new(client(&transport, admin_session()));
        let mut draft = ProductDraft::default();
        draft.fields.nombre = "Arroz".into();

        let submission = draft.submit(&api, &refs()).await;

        let message = submission.notice.message;
        assert!(message.contains("categoria_id: Debes seleccionar una categoría"));
        assert!(message.contains("unidad_medida_id: Debes seleccionar una unidad de medida"));
        assert!(message.contains("precio_unitario: El precio unitario debe ser mayor a 0"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn valid_product_is_sent_with_numbers() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true, "message": "Producto creado"}));
        let api = InventoryApi::new(client(&transport, admin_session()));
        let mut draft = ProductDraft {
            fields: ProductFields {
                nombre: "Arroz grado 1".into(),
                categoria_id: "2".into(),
                unidad_medida_id: "1".into(),
                cantidad_por_lote: "10".into(),
                precio_unitario: "1290,5".into(),
            },
        };

        let submission = draft.submit(&api, &refs()).await;

        assert_eq!(submission.notice.message, "Producto creado");
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["categoria_id"], 2);
        assert_eq!(body["cantidad_por_lote"], 10.0);
        assert_eq!(body["precio_unitario"], 1290.5);
        assert_eq!(draft, ProductDraft::default());
    }

    #[tokio::test]
    async fn reference_lists_load_together() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "categorias": [{"id": 1, "nombre": "Bebidas"}]}));
        transport.push(200, json!({"success": true, "unidades_medida": [{"id": 2, "nombre": "Litros", "abreviatura": "L"}]}));
        let api = InventoryApi::new(client(&transport, admin_session()));

        let refs = ProductReferences::load(&api).await.unwrap();

        assert_eq!(refs.categorias.len(), 1);
        assert_eq!(refs.unidades[0].nombre, "Litros");
    }
}

// src/api/inventory_api.rs

use serde_json::json;

use crate::{
    api::client::{Ack, ApiClient},
    common::error::AppError,
    models::{
        crm::NamedRef,
        inventory::{
            InventoryLot, LotRef, Product, ProductPayload, ProductRef, StockRule, StockRulePayload,
            StockRuleUpdate, UnitOfMeasure,
        },
    },
};

/// Productos, lotes, unidades, categorías y reglas de stock mínimo.
#[derive(Clone)]
pub struct InventoryApi {
    client: ApiClient,
}

impl InventoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // --- Productos ---

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.client
            .get("data/productos-admin/", "productos", "Error al cargar los productos")
            .await
    }

    pub async fn product_refs(&self) -> Result<Vec<ProductRef>, AppError> {
        self.client
            .get("data/productos/", "productos", "Error al cargar los productos")
            .await
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Ack, AppError> {
        self.client
            .post("admin/productos/crear/", payload, "Error al registrar el producto")
            .await
    }

    pub async fn edit_product(&self, id: i64, payload: &ProductPayload) -> Result<Ack, AppError> {
        let path = format!("admin/productos/{}/editar/", id);
        self.client.put(&path, payload, "Error al actualizar el producto").await
    }

    pub async fn set_product_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        let action = if active { "activar" } else { "desactivar" };
        let path = format!("admin/productos/{}/{}/", id, action);
        self.client
            .post(&path, &json!({}), "Error al cambiar el estado del producto")
            .await
    }

    // --- Referencias ---

    pub async fn units(&self) -> Result<Vec<UnitOfMeasure>, AppError> {
        self.client
            .get("data/unidades-medida/", "unidades_medida", "Error al cargar las unidades de medida")
            .await
    }

    pub async fn categories(&self) -> Result<Vec<NamedRef>, AppError> {
        self.client
            .get("data/categorias/", "categorias", "Error al cargar las categorías")
            .await
    }

    pub async fn lots(&self) -> Result<Vec<LotRef>, AppError> {
        self.client.get("data/lotes/", "lotes", "Error al cargar los lotes").await
    }

    pub async fn inventory(&self) -> Result<Vec<InventoryLot>, AppError> {
        self.client
            .get("data/inventario/", "inventario", "Error al cargar el inventario")
            .await
    }

    // --- Reglas de stock mínimo ---

    pub async fn list_stock_rules(&self) -> Result<Vec<StockRule>, AppError> {
        self.client
            .get("admin/stocks-minimos/", "stocks", "Error al cargar las reglas de stock")
            .await
    }

    pub async fn create_stock_rule(&self, payload: &StockRulePayload) -> Result<Ack, AppError> {
        self.client
            .post("admin/stocks-minimos/crear/", payload, "Error al crear la regla de stock")
            .await
    }

    pub async fn edit_stock_rule(&self, id: i64, payload: &StockRuleUpdate) -> Result<Ack, AppError> {
        let path = format!("admin/stocks-minimos/{}/editar/", id);
        self.client.put(&path, payload, "Error al actualizar la regla de stock").await
    }

    pub async fn delete_stock_rule(&self, id: i64) -> Result<Ack, AppError> {
        let path = format!("admin/stocks-minimos/{}/eliminar/", id);
        self.client.delete(&path, "Error al eliminar la regla de stock").await
    }
}

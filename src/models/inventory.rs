// src/models/inventory.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// --- 1. Productos (vista de administración) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub nombre: String,
    pub precio_unitario: Decimal,
    pub cantidad_por_lote: Decimal,
    pub activo: bool,
    #[serde(default)]
    pub categoria: Option<String>,
    /// Nombre de la unidad ("Litros", "Unidades", ...)
    pub unidad_medida: String,
}

/// Unidades que se venden a granel: el lote siempre es de 1.
pub const BULK_UNITS: [&str; 2] = ["Litros", "Kilogramos"];

pub fn is_bulk_unit(nombre: &str) -> bool {
    BULK_UNITS.contains(&nombre)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub nombre: String,
    pub categoria_id: i64,
    pub unidad_medida_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cantidad_por_lote: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
}

// --- 2. Listas de referencia ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub nombre: String,
    pub cantidad_por_lote: Decimal,
    #[serde(default)]
    pub unidad_medida_abreviatura: Option<String>,
}

/// Lote disponible para salidas y mermas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotRef {
    pub id: i64,
    pub codigo_lote: String,
    pub cantidad: Decimal,
    pub producto_nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    pub id: i64,
    pub nombre: String,
    pub abreviatura: String,
}

// --- 3. Inventario (solo lectura) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLot {
    pub codigo_lote: String,
    pub cantidad: Decimal,
    pub producto_nombre: String,
    pub unidad_medida: String,
}

// --- 4. Reglas de stock mínimo ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRule {
    pub id: i64,
    pub producto_id: i64,
    pub producto_nombre: String,
    pub cantidad_minima: Decimal,
    #[serde(default)]
    pub cantidad_por_lote: Option<Decimal>,
    #[serde(default)]
    pub unidad_medida: Option<String>,
    #[serde(default)]
    pub unidad_medida_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRulePayload {
    pub producto_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cantidad_minima: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRuleUpdate {
    #[serde(with = "rust_decimal::serde::float")]
    pub cantidad_minima: Decimal,
}

// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Comparación mensual de mermas (mermas aprobadas de un año) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLoss {
    pub mes: String,
    pub mes_num: u32,
    pub total_mermas: i64,
    pub perdida_economica: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthWorstProduct {
    pub mes: String,
    pub mes_num: u32,
    pub producto: String,
    #[serde(default)]
    pub producto_id: Option<i64>,
    pub perdida_economica: Decimal,
    pub cantidad: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLoss {
    pub producto: String,
    #[serde(default)]
    pub producto_id: Option<i64>,
    pub perdida_economica: Decimal,
    pub cantidad: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub total_anual: Decimal,
    pub total_mermas: i64,
    pub promedio_mensual: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    pub year: i32,
    #[serde(rename = "año_minimo")]
    pub min_year: i32,
    pub datos_mensuales: Vec<MonthlyLoss>,
    #[serde(default)]
    pub productos_mayor_perdida_mes: Vec<MonthWorstProduct>,
    #[serde(rename = "top_productos_año", default)]
    pub top_products: Vec<ProductLoss>,
    pub resumen: YearSummary,
}

impl MonthlyComparison {
    /// Años seleccionables: desde el primer año con datos hasta el actual.
    pub fn selectable_years(&self, current_year: i32) -> Vec<i32> {
        let first = self.min_year.min(current_year);
        (first..=current_year).rev().collect()
    }
}

// --- Comparación entre dos categorías ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMonth {
    pub mes: String,
    pub mes_num: u32,
    #[serde(rename = "año")]
    pub year: i32,
    pub total_mermas: i64,
    pub perdida_economica: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub nombre: String,
    pub datos_mensuales: Vec<CategoryMonth>,
    pub total_perdida: Decimal,
    pub total_registros: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub categoria1: CategorySeries,
    pub categoria2: CategorySeries,
    /// Claves dinámicas por nombre de categoría; se usa solo para graficar.
    #[serde(default)]
    pub datos_comparativos: Vec<Value>,
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

impl CategoryComparison {
    /// Diferencia de pérdida total (categoría 1 menos categoría 2).
    pub fn loss_difference(&self) -> Decimal {
        self.categoria1.total_perdida - self.categoria2.total_perdida
    }
}

// --- Historial de trazabilidad (registro blockchain) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    #[serde(default)]
    pub producto: Option<i64>,
    #[serde(default)]
    pub producto_nombre: Option<String>,
    #[serde(default)]
    pub usuario: Option<i64>,
    #[serde(default)]
    pub usuario_nombre: Option<String>,
    pub tipo_movimiento: String,
    pub cantidad: Decimal,
    pub timestamp: String,
    #[serde(default)]
    pub tx_id_blockchain: Option<String>,
    #[serde(default)]
    pub detalle: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPage {
    pub count: u64,
    pub num_pages: u64,
    pub page: u64,
    pub results: Vec<LedgerEntry>,
}

/// Filtros del historial; los vacíos no se envían.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    pub producto_id: Option<i64>,
    pub tipo_movimiento: Option<String>,
    /// `YYYY-MM-DD`
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

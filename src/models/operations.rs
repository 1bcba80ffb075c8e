// src/models/operations.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// --- Líneas de movimiento (ingresos y salidas comparten forma) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLine {
    pub producto_nombre: String,
    pub unidad_medida: String,
    pub cantidad_total: Decimal,
    pub cantidad_lotes: Decimal,
    pub cantidad_por_lote: Decimal,
    pub codigo_lote: String,
    pub precio_compra: Decimal,
    pub valor_detalle: Decimal,
}

// --- Ingresos ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    pub id: i64,
    /// `dd/mm/yyyy`
    pub fecha_ingreso: String,
    pub hora_ingreso: String,
    pub proveedor: String,
    pub usuario_registro: String,
    #[serde(default)]
    pub descripcion: String,
    pub valor_total_ingreso: Decimal,
    #[serde(default)]
    pub productos: Vec<MovementLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeLinePayload {
    pub producto_id: i64,
    pub cantidad_lotes: i64,
    pub codigo_lote: String,
    /// `YYYY-MM-DD`
    pub fecha_vencimiento: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakePayload {
    pub proveedor_id: i64,
    pub descripcion: String,
    pub productos: Vec<IntakeLinePayload>,
}

// --- Salidas ---

/// La consola opera sobre una sola bodega.
pub const DEFAULT_BODEGA_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: i64,
    pub fecha_salida: String,
    pub hora_salida: String,
    pub cliente: String,
    pub conductor: String,
    pub usuario_registro: String,
    #[serde(default)]
    pub descripcion: String,
    pub valor_total_salida: Decimal,
    #[serde(default)]
    pub productos: Vec<MovementLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchLinePayload {
    pub lote_id: i64,
    pub cantidad_lotes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPayload {
    pub bodega_id: i64,
    pub cliente_id: i64,
    pub conductor_id: i64,
    pub descripcion: String,
    pub productos: Vec<DispatchLinePayload>,
}

// --- Mermas ---

/// Estado de una merma; lo decide el backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShrinkageState {
    Pendiente,
    Aprobado,
    Rechazado,
}

impl ShrinkageState {
    pub fn as_str(self) -> &'static str {
        match self {
            ShrinkageState::Pendiente => "pendiente",
            ShrinkageState::Aprobado => "aprobado",
            ShrinkageState::Rechazado => "rechazado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShrinkageLine {
    pub producto_nombre: String,
    pub unidad_medida: String,
    pub cantidad_merma: Decimal,
    pub codigo_lote: String,
    #[serde(default)]
    pub valor_merma: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shrinkage {
    pub id: i64,
    pub fecha_registro: String,
    pub hora_registro: String,
    #[serde(default)]
    pub fecha_aprobacion: Option<String>,
    #[serde(default)]
    pub hora_aprobacion: Option<String>,
    pub estado: ShrinkageState,
    #[serde(default)]
    pub observaciones: String,
    pub usuario_registro: String,
    #[serde(default)]
    pub usuario_aprobacion: Option<String>,
    pub categoria_merma: String,
    #[serde(default)]
    pub bodega: String,
    #[serde(default)]
    pub valor_total_merma: Decimal,
    #[serde(default)]
    pub productos: Vec<ShrinkageLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShrinkageLinePayload {
    pub lote_id: i64,
    pub cantidad_merma: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShrinkagePayload {
    pub categoria_merma_id: i64,
    pub observaciones: String,
    pub productos: Vec<ShrinkageLinePayload>,
}

// --- Mermas pendientes (bandeja del jefe de bodega) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub nombre: String,
    pub apellido: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingShrinkageLine {
    pub lote_codigo: String,
    pub producto_nombre: String,
    pub cantidad_merma: Decimal,
    #[serde(default)]
    pub valor_merma: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingShrinkage {
    pub id: i64,
    pub fecha: String,
    pub hora: String,
    pub categoria_merma: String,
    pub estado: ShrinkageState,
    #[serde(default)]
    pub observaciones_registro: String,
    pub usuario_registro: PersonName,
    #[serde(default)]
    pub detalles_merma: Vec<PendingShrinkageLine>,
    #[serde(default)]
    pub valor_total_merma: Decimal,
}

impl PendingShrinkage {
    pub fn registered_by(&self) -> String {
        format!("{} {}", self.usuario_registro.nombre, self.usuario_registro.apellido)
    }
}

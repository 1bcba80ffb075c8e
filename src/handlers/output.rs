// src/handlers/output.rs

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    common::{
        format::{format_clp, format_quantity, truncate},
        notice::{Notice, NoticeLevel},
    },
    models::{
        crm::{Driver, DriverRef, NamedRef, Partner},
        dashboard::LedgerEntry,
        inventory::{InventoryLot, LotRef, Product, ProductRef, StockRule, UnitOfMeasure},
        operations::{Dispatch, Intake, MovementLine, PendingShrinkage, Shrinkage, ShrinkageLine},
        users::User,
    },
    routes::MenuItem,
    services::filters::PageSlice,
};

/// Lo que un comando deja en la terminal.
#[derive(Debug)]
pub enum Output {
    Notice(Notice),
    Listing(Listing),
    /// Varias tablas seguidas (listas de referencia, comparaciones)
    Listings(Vec<Listing>),
    Text(String),
}

impl Output {
    /// Un aviso de error termina el proceso con código 1.
    pub fn is_failure(&self) -> bool {
        matches!(self, Output::Notice(notice) if notice.level == NoticeLevel::Error)
    }

    pub fn render(&self, json: bool) -> String {
        match self {
            Output::Notice(notice) if json => json!(notice).to_string(),
            Output::Notice(notice) => notice.to_string(),
            Output::Listing(listing) if json => listing.json.to_string(),
            Output::Listing(listing) => listing.to_string(),
            Output::Listings(listings) if json => {
                Value::Array(listings.iter().map(|l| json!({ "title": l.title, "data": l.json })).collect()).to_string()
            }
            Output::Listings(listings) => {
                listings.iter().map(|l| l.to_string()).collect::<Vec<_>>().join("\n\n")
            }
            Output::Text(text) if json => json!({ "message": text }).to_string(),
            Output::Text(text) => text.clone(),
        }
    }
}

impl From<Notice> for Output {
    fn from(notice: Notice) -> Self {
        Output::Notice(notice)
    }
}

/// Tabla con título y pie, más su versión JSON.
#[derive(Debug)]
pub struct Listing {
    pub title: String,
    pub table: Table,
    pub footer: Option<String>,
    pub json: Value,
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.table)?;
        if let Some(footer) = &self.footer {
            write!(f, "\n{}", footer)?;
        }
        Ok(())
    }
}

/// Fila de una tabla de la consola.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().copied());
    table
}

pub fn rows<T: TableRow + Serialize>(title: impl Into<String>, items: &[T]) -> Listing {
    let mut out = table(T::headers());
    for item in items {
        out.add_row(item.cells());
    }
    Listing {
        title: title.into(),
        table: out,
        footer: Some(format!("{} registros", items.len())),
        json: json!(items),
    }
}

/// Página visible de una vista de listado.
pub fn page<T: TableRow + Serialize>(title: impl Into<String>, slice: &PageSlice<T>) -> Listing {
    let mut listing = rows(title, &slice.rows);
    listing.footer = Some(if slice.total == 0 {
        "No se encontraron registros".to_string()
    } else {
        format!("Página {} de {} ({} registros)", slice.page, slice.page_count, slice.total)
    });
    listing.json = json!(slice);
    listing
}

/// Tabla libre (comparaciones, resúmenes).
pub fn grid(title: impl Into<String>, headers: &[&str], body: Vec<Vec<String>>, json: Value) -> Listing {
    let mut out = table(headers);
    for row in body {
        out.add_row(row);
    }
    Listing { title: title.into(), table: out, footer: None, json }
}

fn active(flag: bool) -> String {
    if flag { "Activo" } else { "Inactivo" }.to_string()
}

fn or_dash(value: &Option<String>) -> String {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

// =========================================================================
//  FILAS POR ENTIDAD
// =========================================================================

impl TableRow for Partner {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "RUT", "Teléfono", "Email", "Dirección", "Tipo", "Estado"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            self.rut.clone(),
            or_dash(&self.telefono),
            or_dash(&self.email),
            or_dash(&self.direccion),
            self.tipo_persona().to_string(),
            active(self.activo),
        ]
    }
}

impl TableRow for Driver {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "RUT", "Teléfono", "Nacimiento", "Estado"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name(),
            self.rut.clone(),
            or_dash(&self.telefono),
            or_dash(&self.fecha_nacimiento),
            active(self.activo),
        ]
    }
}

impl TableRow for User {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "RUT", "Email", "Cargo", "Registro", "Estado"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre_completo.clone(),
            self.rut.clone(),
            self.email.clone(),
            self.cargo.clone(),
            self.fecha_registro.clone(),
            active(self.activo),
        ]
    }
}

impl TableRow for Product {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "Categoría", "Unidad", "Por lote", "Precio", "Estado"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            or_dash(&self.categoria),
            self.unidad_medida.clone(),
            format_quantity(self.cantidad_por_lote),
            format_clp(self.precio_unitario),
            active(self.activo),
        ]
    }
}

impl TableRow for InventoryLot {
    fn headers() -> &'static [&'static str] {
        &["Lote", "Producto", "Cantidad", "Unidad"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.codigo_lote.clone(),
            self.producto_nombre.clone(),
            format_quantity(self.cantidad),
            self.unidad_medida.clone(),
        ]
    }
}

impl TableRow for StockRule {
    fn headers() -> &'static [&'static str] {
        &["ID", "Producto", "Cantidad mínima", "Unidad"]
    }
    fn cells(&self) -> Vec<String> {
        let unidad = self.unidad_medida_nombre.clone().or_else(|| self.unidad_medida.clone());
        vec![
            self.id.to_string(),
            self.producto_nombre.clone(),
            format_quantity(self.cantidad_minima),
            or_dash(&unidad),
        ]
    }
}

impl TableRow for Intake {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Hora", "Proveedor", "Registrado por", "Descripción", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.fecha_ingreso.clone(),
            self.hora_ingreso.clone(),
            self.proveedor.clone(),
            self.usuario_registro.clone(),
            truncate(&self.descripcion, 30),
            format_clp(self.valor_total_ingreso),
        ]
    }
}

impl TableRow for Dispatch {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Hora", "Cliente", "Conductor", "Registrado por", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.fecha_salida.clone(),
            self.hora_salida.clone(),
            self.cliente.clone(),
            self.conductor.clone(),
            self.usuario_registro.clone(),
            format_clp(self.valor_total_salida),
        ]
    }
}

impl TableRow for MovementLine {
    fn headers() -> &'static [&'static str] {
        &["Producto", "Lote", "Lotes", "Por lote", "Total", "Unidad", "Precio", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.producto_nombre.clone(),
            self.codigo_lote.clone(),
            format_quantity(self.cantidad_lotes),
            format_quantity(self.cantidad_por_lote),
            format_quantity(self.cantidad_total),
            self.unidad_medida.clone(),
            format_clp(self.precio_compra),
            format_clp(self.valor_detalle),
        ]
    }
}

impl TableRow for Shrinkage {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Categoría", "Estado", "Registrado por", "Aprobado por", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format!("{} {}", self.fecha_registro, self.hora_registro),
            self.categoria_merma.clone(),
            self.estado.as_str().to_string(),
            self.usuario_registro.clone(),
            or_dash(&self.usuario_aprobacion),
            format_clp(self.valor_total_merma),
        ]
    }
}

impl TableRow for ShrinkageLine {
    fn headers() -> &'static [&'static str] {
        &["Producto", "Lote", "Cantidad", "Unidad", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.producto_nombre.clone(),
            self.codigo_lote.clone(),
            format_quantity(self.cantidad_merma),
            self.unidad_medida.clone(),
            format_clp(self.valor_merma),
        ]
    }
}

impl TableRow for PendingShrinkage {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Categoría", "Registrado por", "Lotes", "Observaciones", "Valor"]
    }
    fn cells(&self) -> Vec<String> {
        let lotes: Vec<String> = self
            .detalles_merma
            .iter()
            .map(|d| format!("{} ({})", d.lote_codigo, format_quantity(d.cantidad_merma)))
            .collect();
        vec![
            self.id.to_string(),
            format!("{} {}", self.fecha, self.hora),
            self.categoria_merma.clone(),
            self.registered_by(),
            lotes.join(", "),
            truncate(&self.observaciones_registro, 40),
            format_clp(self.valor_total_merma),
        ]
    }
}

impl TableRow for LedgerEntry {
    fn headers() -> &'static [&'static str] {
        &["ID", "Fecha", "Tipo", "Producto", "Cantidad", "Usuario", "Transacción"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.timestamp.clone(),
            self.tipo_movimiento.clone(),
            or_dash(&self.producto_nombre),
            format_quantity(self.cantidad),
            or_dash(&self.usuario_nombre),
            self.tx_id_blockchain.as_deref().map(|tx| truncate(tx, 16)).unwrap_or_else(|| "-".into()),
        ]
    }
}

// Listas de referencia de los formularios

impl TableRow for NamedRef {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.nombre.clone()]
    }
}

impl TableRow for DriverRef {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nombre", "RUT"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), format!("{} {}", self.nombre, self.apellido), self.rut.clone()]
    }
}

impl TableRow for ProductRef {
    fn headers() -> &'static [&'static str] {
        &["ID", "Producto", "Por lote", "Unidad"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            format_quantity(self.cantidad_por_lote),
            or_dash(&self.unidad_medida_abreviatura),
        ]
    }
}

impl TableRow for LotRef {
    fn headers() -> &'static [&'static str] {
        &["ID", "Lote", "Producto", "Disponible"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.codigo_lote.clone(),
            self.producto_nombre.clone(),
            format_quantity(self.cantidad),
        ]
    }
}

impl TableRow for UnitOfMeasure {
    fn headers() -> &'static [&'static str] {
        &["ID", "Unidad", "Abreviatura"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.nombre.clone(), self.abreviatura.clone()]
    }
}

impl TableRow for MenuItem {
    fn headers() -> &'static [&'static str] {
        &["Título", "Ruta"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.title.to_string(), self.path.to_string()]
    }
}

// src/services/filters.rs

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    common::format::parse_display_date,
    models::{
        crm::{Driver, Partner},
        dashboard::LedgerEntry,
        inventory::{InventoryLot, Product, StockRule},
        operations::{Dispatch, Intake, PendingShrinkage, Shrinkage},
        users::User,
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Valor que se usa en los selectores para "sin filtro".
pub const ALL: &str = "todos";

// =========================================================================
//  CONSULTA (filtros + orden + paginación)
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

impl SortSpec {
    /// `columna` o `-columna` para orden descendente.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (column, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        if column.is_empty() {
            return None;
        }
        Some(Self { column: column.to_string(), descending })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<SortSpec>,
    /// Página desde 1
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            status: None,
            from: None,
            to: None,
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Sin paginar: lo que se exporta a PDF es todo lo filtrado.
    pub fn unpaged(&self) -> Self {
        Self { page: 1, page_size: usize::MAX, ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice<T> {
    pub rows: Vec<T>,
    /// Registros que pasan los filtros (antes de paginar)
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

// =========================================================================
//  VALORES ORDENABLES
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    Bool(bool),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Lo que una fila expone a los filtros de su vista.
pub trait Filterable {
    /// Campos en los que busca el texto libre.
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    /// Día calendario del registro para el rango de fechas.
    fn record_date(&self) -> Option<NaiveDate> {
        None
    }

    fn sort_value(&self, column: &str) -> Option<SortValue>;
}

fn picker_matches(query: Option<&str>, value: Option<&str>) -> bool {
    match query.map(str::trim) {
        None | Some("") => true,
        Some(q) if q.eq_ignore_ascii_case(ALL) => true,
        Some(q) => value.is_some_and(|v| v.to_lowercase() == q.to_lowercase()),
    }
}

fn matches<T: Filterable>(item: &T, query: &ListQuery, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let hit = item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle));
        if !hit {
            return false;
        }
    }

    if !picker_matches(query.category.as_deref(), item.category()) {
        return false;
    }
    if !picker_matches(query.status.as_deref(), item.status()) {
        return false;
    }

    // Rango inclusivo por día; sin fecha no entra si hay algún límite
    if query.from.is_some() || query.to.is_some() {
        let Some(date) = item.record_date() else {
            return false;
        };
        if query.from.is_some_and(|from| date < from) {
            return false;
        }
        if query.to.is_some_and(|to| date > to) {
            return false;
        }
    }

    true
}

/// Vista derivada: se recalcula completa en cada llamada.
pub fn apply<T: Filterable + Clone>(items: &[T], query: &ListQuery) -> PageSlice<T> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut filtered: Vec<&T> = items
        .iter()
        .filter(|item| matches(*item, query, needle.as_deref()))
        .collect();

    if let Some(sort) = &query.sort {
        // sort_by es estable; los valores ausentes quedan al final
        filtered.sort_by(|a, b| {
            let ord = match (a.sort_value(&sort.column), b.sort_value(&sort.column)) {
                (Some(x), Some(y)) => x.compare(&y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if sort.descending { ord.reverse() } else { ord }
        });
    }

    let total = filtered.len();
    let page_size = query.page_size.max(1);
    let page_count = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, page_count);
    let rows = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    PageSlice { rows, total, page, page_count }
}

fn active_label(active: bool) -> &'static str {
    if active { "activo" } else { "inactivo" }
}

// =========================================================================
//  FILTROS POR ENTIDAD
// =========================================================================

impl Filterable for Partner {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nombre.as_str(), self.rut.as_str(), self.email.as_deref().unwrap_or_default()]
    }
    fn category(&self) -> Option<&str> {
        Some(if self.es_persona_juridica { "juridica" } else { "natural" })
    }
    fn status(&self) -> Option<&str> {
        Some(active_label(self.activo))
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "nombre" => Some(SortValue::text(&self.nombre)),
            "rut" => Some(SortValue::text(&self.rut)),
            "email" => self.email.as_deref().map(SortValue::text),
            "activo" => Some(SortValue::Bool(self.activo)),
            _ => None,
        }
    }
}

impl Filterable for Driver {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nombre.as_str(), self.apellido.as_str(), self.rut.as_str()]
    }
    fn status(&self) -> Option<&str> {
        Some(active_label(self.activo))
    }
    fn record_date(&self) -> Option<NaiveDate> {
        self.fecha_nacimiento.as_deref().and_then(parse_display_date)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "nombre" => Some(SortValue::text(&self.nombre)),
            "apellido" => Some(SortValue::text(&self.apellido)),
            "rut" => Some(SortValue::text(&self.rut)),
            "fecha_nacimiento" => self.record_date().map(SortValue::Date),
            "activo" => Some(SortValue::Bool(self.activo)),
            _ => None,
        }
    }
}

impl Filterable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nombre_completo.as_str(), self.email.as_str(), self.rut.as_str()]
    }
    fn category(&self) -> Option<&str> {
        Some(self.cargo.as_str())
    }
    fn status(&self) -> Option<&str> {
        Some(active_label(self.activo))
    }
    fn record_date(&self) -> Option<NaiveDate> {
        parse_display_date(&self.fecha_registro)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "nombre_completo" | "nombre" => Some(SortValue::text(&self.nombre_completo)),
            "email" => Some(SortValue::text(&self.email)),
            "rut" => Some(SortValue::text(&self.rut)),
            "cargo" => Some(SortValue::text(&self.cargo)),
            "fecha_registro" => self.record_date().map(SortValue::Date),
            "activo" => Some(SortValue::Bool(self.activo)),
            _ => None,
        }
    }
}

impl Filterable for Product {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nombre.as_str()]
    }
    fn category(&self) -> Option<&str> {
        self.categoria.as_deref()
    }
    fn status(&self) -> Option<&str> {
        Some(active_label(self.activo))
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "nombre" => Some(SortValue::text(&self.nombre)),
            "precio_unitario" => Some(SortValue::Number(self.precio_unitario)),
            "cantidad_por_lote" => Some(SortValue::Number(self.cantidad_por_lote)),
            "categoria" => self.categoria.as_deref().map(SortValue::text),
            "unidad_medida" => Some(SortValue::text(&self.unidad_medida)),
            "activo" => Some(SortValue::Bool(self.activo)),
            _ => None,
        }
    }
}

impl Filterable for InventoryLot {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.producto_nombre.as_str(), self.codigo_lote.as_str()]
    }
    fn category(&self) -> Option<&str> {
        Some(self.unidad_medida.as_str())
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "codigo_lote" => Some(SortValue::text(&self.codigo_lote)),
            "producto_nombre" | "producto" => Some(SortValue::text(&self.producto_nombre)),
            "cantidad" => Some(SortValue::Number(self.cantidad)),
            "unidad_medida" => Some(SortValue::text(&self.unidad_medida)),
            _ => None,
        }
    }
}

impl Filterable for Intake {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.proveedor.as_str(), self.usuario_registro.as_str(), self.descripcion.as_str()]
    }
    fn record_date(&self) -> Option<NaiveDate> {
        parse_display_date(&self.fecha_ingreso)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "fecha_ingreso" | "fecha" => self.record_date().map(SortValue::Date),
            "proveedor" => Some(SortValue::text(&self.proveedor)),
            "usuario_registro" => Some(SortValue::text(&self.usuario_registro)),
            "valor_total_ingreso" | "valor" => Some(SortValue::Number(self.valor_total_ingreso)),
            _ => None,
        }
    }
}

impl Filterable for Dispatch {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.cliente.as_str(), self.conductor.as_str(), self.usuario_registro.as_str(), self.descripcion.as_str()]
    }
    fn record_date(&self) -> Option<NaiveDate> {
        parse_display_date(&self.fecha_salida)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "fecha_salida" | "fecha" => self.record_date().map(SortValue::Date),
            "cliente" => Some(SortValue::text(&self.cliente)),
            "conductor" => Some(SortValue::text(&self.conductor)),
            "usuario_registro" => Some(SortValue::text(&self.usuario_registro)),
            "valor_total_salida" | "valor" => Some(SortValue::Number(self.valor_total_salida)),
            _ => None,
        }
    }
}

impl Filterable for Shrinkage {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.categoria_merma.as_str(), self.usuario_registro.as_str(), self.observaciones.as_str()]
    }
    fn category(&self) -> Option<&str> {
        Some(self.categoria_merma.as_str())
    }
    fn status(&self) -> Option<&str> {
        Some(self.estado.as_str())
    }
    fn record_date(&self) -> Option<NaiveDate> {
        parse_display_date(&self.fecha_registro)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "fecha_registro" | "fecha" => self.record_date().map(SortValue::Date),
            "estado" => Some(SortValue::text(self.estado.as_str())),
            "categoria_merma" => Some(SortValue::text(&self.categoria_merma)),
            "usuario_registro" => Some(SortValue::text(&self.usuario_registro)),
            "valor_total_merma" | "valor" => Some(SortValue::Number(self.valor_total_merma)),
            _ => None,
        }
    }
}

impl Filterable for PendingShrinkage {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.categoria_merma.as_str(),
            self.usuario_registro.nombre.as_str(),
            self.usuario_registro.apellido.as_str(),
            self.observaciones_registro.as_str(),
        ]
    }
    fn category(&self) -> Option<&str> {
        Some(self.categoria_merma.as_str())
    }
    fn record_date(&self) -> Option<NaiveDate> {
        parse_display_date(&self.fecha)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "fecha" => self.record_date().map(SortValue::Date),
            "categoria_merma" => Some(SortValue::text(&self.categoria_merma)),
            "valor_total_merma" | "valor" => Some(SortValue::Number(self.valor_total_merma)),
            _ => None,
        }
    }
}

impl Filterable for StockRule {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.producto_nombre.as_str()]
    }
    fn category(&self) -> Option<&str> {
        self.unidad_medida_nombre.as_deref().or(self.unidad_medida.as_deref())
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "producto_nombre" | "producto" => Some(SortValue::text(&self.producto_nombre)),
            "cantidad_minima" => Some(SortValue::Number(self.cantidad_minima)),
            _ => None,
        }
    }
}

impl Filterable for LedgerEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.producto_nombre.as_deref().unwrap_or_default(),
            self.usuario_nombre.as_deref().unwrap_or_default(),
            self.tipo_movimiento.as_str(),
            self.tx_id_blockchain.as_deref().unwrap_or_default(),
        ]
    }
    fn category(&self) -> Option<&str> {
        Some(self.tipo_movimiento.as_str())
    }
    fn record_date(&self) -> Option<NaiveDate> {
        self.timestamp.get(..10).and_then(parse_display_date)
    }
    fn sort_value(&self, column: &str) -> Option<SortValue> {
        match column {
            "id" => Some(SortValue::Number(self.id.into())),
            "timestamp" | "fecha" => Some(SortValue::text(&self.timestamp)),
            "cantidad" => Some(SortValue::Number(self.cantidad)),
            "tipo_movimiento" => Some(SortValue::text(&self.tipo_movimiento)),
            _ => None,
        }
    }
}

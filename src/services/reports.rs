// src/services/reports.rs

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::{
    common::format::{fit, format_clp, format_quantity, percentage, truncate},
    models::{
        auth::Role,
        inventory::InventoryLot,
        operations::{Dispatch, Intake, Shrinkage, ShrinkageState},
        users::User,
    },
    services::report_layout::{Column, LaidOutReport, Orientation, ReportLayout},
};

// Umbrales de salto de página (mm desde el borde superior)
const LANDSCAPE_LIMIT: f64 = 180.0;
const PORTRAIT_LIMIT: f64 = 260.0;
const SHRINKAGE_LIMIT: f64 = 277.0;
const USERS_LIMIT: f64 = 270.0;

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn file_date(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d").to_string()
}

fn generated_on(now: NaiveDateTime) -> String {
    now.format("%d/%m/%Y").to_string()
}

/// Texto del backend como parte de un nombre de archivo: sin separadores de ruta ni espacios.
fn file_part(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// `dd/mm/yyyy` → `dd-mm-yyyy`
fn dashed(fecha: &str) -> String {
    file_part(fecha)
}

/// `hh:mm` → `hhmm`
fn compact_time(hora: &str) -> String {
    file_part(&hora.replace(':', ""))
}

// =========================================================================
//  INGRESOS
// =========================================================================

pub fn intakes_report(rows: &[Intake], now: NaiveDateTime) -> LaidOutReport {
    let total: Decimal = rows.iter().map(|i| i.valor_total_ingreso).sum();

    let mut layout = ReportLayout::new("Reporte de Ingresos", Orientation::Landscape, LANDSCAPE_LIMIT);
    layout
        .title("Reporte de Ingresos")
        .line(format!("Fecha de generación: {}", generated_on(now)))
        .line(format!("Total de ingresos: {}", rows.len()))
        .line(format!("Valor total: {}", format_clp(total)))
        .spacer(4.0)
        .table(vec![
            Column::new("Fecha", 30),
            Column::new("Hora", 20),
            Column::new("Proveedor", 40),
            Column::new("Usuario", 40),
            Column::truncated("Descripción", 60, 25),
            Column::new("Valor Total", 35),
        ]);

    for intake in rows {
        layout.row(&[
            intake.fecha_ingreso.clone(),
            intake.hora_ingreso.clone(),
            intake.proveedor.clone(),
            intake.usuario_registro.clone(),
            or_dash(&intake.descripcion).to_string(),
            format_clp(intake.valor_total_ingreso),
        ]);
    }

    layout.finish(format!("ingresos_{}.pdf", file_date(now)))
}

pub fn intake_detail(intake: &Intake) -> LaidOutReport {
    let mut layout = ReportLayout::new("Detalle de Ingreso", Orientation::Portrait, PORTRAIT_LIMIT);
    layout
        .title("Detalle de Ingreso")
        .field("Fecha", &intake.fecha_ingreso)
        .field("Hora", &intake.hora_ingreso)
        .field("Proveedor", &intake.proveedor)
        .field("Usuario", &intake.usuario_registro)
        .field("Descripción", or_dash(&intake.descripcion))
        .field("Valor Total", format_clp(intake.valor_total_ingreso))
        .spacer(4.0)
        .heading("Productos")
        .table(vec![
            Column::truncated("Producto", 45, 15),
            Column::new("U.M.", 15),
            Column::new("Cant. Lotes", 20),
            Column::new("Cant. Total", 20),
            Column::new("Código Lote", 25),
            Column::new("Precio Compra", 25),
            Column::new("Valor Total", 25),
        ]);

    for line in &intake.productos {
        layout.row(&[
            line.producto_nombre.clone(),
            line.unidad_medida.clone(),
            format_quantity(line.cantidad_lotes),
            format_quantity(line.cantidad_total),
            line.codigo_lote.clone(),
            format_clp(line.precio_compra),
            format_clp(line.valor_detalle),
        ]);
    }

    let file = format!(
        "ingreso_{}_{}.pdf",
        dashed(&intake.fecha_ingreso),
        compact_time(&intake.hora_ingreso)
    );
    layout.finish(file)
}

// =========================================================================
//  SALIDAS
// =========================================================================

pub fn dispatches_report(rows: &[Dispatch], now: NaiveDateTime) -> LaidOutReport {
    let total: Decimal = rows.iter().map(|d| d.valor_total_salida).sum();

    let mut layout = ReportLayout::new("Reporte de Salidas", Orientation::Landscape, LANDSCAPE_LIMIT);
    layout
        .title("Reporte de Salidas")
        .line(format!("Fecha de generación: {}", generated_on(now)))
        .line(format!("Total de salidas: {}", rows.len()))
        .line(format!("Valor total: {}", format_clp(total)))
        .spacer(4.0)
        .table(vec![
            Column::new("Fecha", 25),
            Column::new("Hora", 18),
            Column::truncated("Cliente", 35, 15),
            Column::truncated("Conductor", 35, 15),
            Column::truncated("Usuario", 35, 15),
            Column::truncated("Descripción", 50, 20),
            Column::new("Valor Total", 30),
        ]);

    for dispatch in rows {
        layout.row(&[
            dispatch.fecha_salida.clone(),
            dispatch.hora_salida.clone(),
            dispatch.cliente.clone(),
            dispatch.conductor.clone(),
            dispatch.usuario_registro.clone(),
            or_dash(&dispatch.descripcion).to_string(),
            format_clp(dispatch.valor_total_salida),
        ]);
    }

    layout.finish(format!("salidas_{}.pdf", file_date(now)))
}

pub fn dispatch_detail(dispatch: &Dispatch) -> LaidOutReport {
    let mut layout = ReportLayout::new("Detalle de Salida", Orientation::Portrait, PORTRAIT_LIMIT);
    layout
        .title("Detalle de Salida")
        .field("Fecha", &dispatch.fecha_salida)
        .field("Hora", &dispatch.hora_salida)
        .field("Cliente", &dispatch.cliente)
        .field("Conductor", &dispatch.conductor)
        .field("Usuario", &dispatch.usuario_registro)
        .field("Descripción", or_dash(&dispatch.descripcion))
        .field("Valor Total", format_clp(dispatch.valor_total_salida))
        .spacer(4.0)
        .heading("Productos")
        .table(vec![
            Column::truncated("Producto", 50, 18),
            Column::new("Cant. Lotes", 25),
            Column::new("Cant. Total", 25),
            Column::new("Código Lote", 25),
            Column::new("Precio Compra", 30),
            Column::new("Valor Total", 30),
        ]);

    for line in &dispatch.productos {
        layout.row(&[
            line.producto_nombre.clone(),
            format_quantity(line.cantidad_lotes),
            format!("{} {}", format_quantity(line.cantidad_total), line.unidad_medida),
            line.codigo_lote.clone(),
            format_clp(line.precio_compra),
            format_clp(line.valor_detalle),
        ]);
    }

    let file = format!(
        "salida_{}_{}.pdf",
        dashed(&dispatch.fecha_salida),
        compact_time(&dispatch.hora_salida)
    );
    layout.finish(file)
}

// =========================================================================
//  MERMAS
// =========================================================================

/// Cantidad y valor de las mermas en un estado.
fn state_totals(rows: &[Shrinkage], state: ShrinkageState) -> (usize, Decimal) {
    rows.iter()
        .filter(|m| m.estado == state)
        .fold((0, Decimal::ZERO), |(count, value), m| (count + 1, value + m.valor_total_merma))
}

pub fn shrinkage_report(rows: &[Shrinkage], now: NaiveDateTime) -> LaidOutReport {
    let total = rows.len();
    let total_value: Decimal = rows.iter().map(|m| m.valor_total_merma).sum();
    let (approved, approved_value) = state_totals(rows, ShrinkageState::Aprobado);
    let (rejected, rejected_value) = state_totals(rows, ShrinkageState::Rechazado);
    let (pending, pending_value) = state_totals(rows, ShrinkageState::Pendiente);

    let mut layout = ReportLayout::new("REPORTE GENERAL DE MERMAS", Orientation::Portrait, SHRINKAGE_LIMIT);
    layout
        .footer_note("Reporte generado automáticamente")
        .title("REPORTE GENERAL DE MERMAS")
        .line(format!("Documento generado el {}", generated_on(now)))
        .spacer(10.0)
        .heading("RESUMEN GENERAL")
        .line(format!("Total de mermas: {}", total))
        .line(format!("Aprobadas: {} ({}%)", approved, percentage(approved, total)))
        .line(format!("Rechazadas: {} ({}%)", rejected, percentage(rejected, total)))
        .line(format!("Pendientes: {} ({}%)", pending, percentage(pending, total)))
        .spacer(5.0)
        .heading("RESUMEN DE VALORES")
        .line(format!("Valor total de todas las mermas: {}", format_clp(total_value)))
        .line(format!("Valor total mermas aprobadas: {}", format_clp(approved_value)))
        .line(format!("Valor total mermas rechazadas: {}", format_clp(rejected_value)))
        .line(format!("Valor total mermas pendientes: {}", format_clp(pending_value)))
        .spacer(10.0)
        .rule()
        .heading("DETALLE DE MERMAS");

    for (index, merma) in rows.iter().enumerate() {
        layout
            .bold(format!("MERMA {}", index + 1))
            .small(format!(
                "{} | {} | {} | {}",
                merma.fecha_registro,
                merma.estado.as_str().to_uppercase(),
                merma.categoria_merma,
                merma.usuario_registro
            ))
            .bold(format!("Valor total merma: {}", format_clp(merma.valor_total_merma)))
            .small("Productos:");

        for line in &merma.productos {
            let info = format!(
                "• {} ({}): {} {} - {}",
                line.producto_nombre,
                line.codigo_lote,
                format_quantity(line.cantidad_merma),
                line.unidad_medida,
                format_clp(line.valor_merma)
            );
            layout.small(truncate(&info, 90));
        }

        layout
            .small(format!("Observaciones: {}", truncate(&merma.observaciones, 80)))
            .spacer(3.0);
    }

    layout.finish(format!("reporte_mermas_{}.pdf", file_date(now)))
}

pub fn shrinkage_detail(merma: &Shrinkage) -> LaidOutReport {
    let approval_date = match (&merma.fecha_aprobacion, &merma.hora_aprobacion) {
        (Some(fecha), Some(hora)) => format!("{} {}", fecha, hora),
        (Some(fecha), None) => fecha.clone(),
        _ => "-".to_string(),
    };

    let mut layout = ReportLayout::new("REPORTE DE MERMA", Orientation::Portrait, PORTRAIT_LIMIT);
    layout
        .title("REPORTE DE MERMA")
        .spacer(4.0)
        .heading("INFORMACIÓN GENERAL")
        .field("Fecha de Registro", format!("{} {}", merma.fecha_registro, merma.hora_registro))
        .field("Fecha de Aprobación", approval_date)
        .field("Estado", merma.estado.as_str().to_uppercase())
        .field("Categoría", &merma.categoria_merma)
        .field("Bodega", or_dash(&merma.bodega))
        .field("Valor Total Merma", format_clp(merma.valor_total_merma))
        .field("Registrado por", &merma.usuario_registro)
        .field("Aprobado por", merma.usuario_aprobacion.as_deref().unwrap_or("-"))
        .spacer(4.0)
        .heading("PRODUCTOS AFECTADOS")
        .table(vec![
            Column::truncated("Producto", 60, 20),
            Column::new("Código Lote", 35),
            Column::new("Cantidad", 25),
            Column::new("Unidad", 30),
            Column::new("Valor Merma", 30),
        ]);

    for line in &merma.productos {
        layout.row(&[
            line.producto_nombre.clone(),
            line.codigo_lote.clone(),
            format_quantity(line.cantidad_merma),
            line.unidad_medida.clone(),
            format_clp(line.valor_merma),
        ]);
    }

    layout.spacer(4.0).heading("OBSERVACIONES");
    for chunk in wrap(or_dash(&merma.observaciones), 80) {
        layout.line(chunk);
    }

    layout
        .spacer(15.0)
        .heading("FIRMAS")
        .spacer(10.0)
        .rule()
        .line("Responsable Registro")
        .spacer(10.0)
        .rule()
        .line("Responsable Aprobación");

    let file = format!(
        "merma_{}_{}.pdf",
        dashed(&merma.fecha_registro),
        file_part(&merma.categoria_merma)
    );
    layout.finish(file)
}

/// Parte el texto en trozos de `width` caracteres.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

// =========================================================================
//  INVENTARIO
// =========================================================================

pub fn inventory_report(rows: &[InventoryLot], now: NaiveDateTime) -> LaidOutReport {
    let unique_products: BTreeSet<&str> = rows.iter().map(|l| l.producto_nombre.as_str()).collect();
    let stock: Decimal = rows.iter().map(|l| l.cantidad).sum();

    let mut layout = ReportLayout::new("REPORTE DE INVENTARIO", Orientation::Portrait, PORTRAIT_LIMIT);
    layout
        .footer_note("Reporte de inventario generado automáticamente")
        .title("REPORTE DE INVENTARIO")
        .line(format!("Fecha de generación: {}", generated_on(now)))
        .spacer(6.0)
        .heading("RESUMEN GENERAL")
        .line(format!("Total de lotes: {}", rows.len()))
        .line(format!("Productos únicos: {}", unique_products.len()))
        .line(format!("Stock total (unidades): {}", format_quantity(stock)))
        .spacer(6.0)
        .heading("DETALLE DEL INVENTARIO")
        .table(vec![
            Column::new("Código Lote", 40),
            Column::truncated("Producto", 80, 30),
            Column::new("Cantidad", 30),
            Column::new("Unidad", 40),
        ]);

    for lot in rows {
        layout.row(&[
            lot.codigo_lote.clone(),
            lot.producto_nombre.clone(),
            format_quantity(lot.cantidad),
            lot.unidad_medida.clone(),
        ]);
    }

    layout.finish(format!("inventario_{}.pdf", file_date(now)))
}

// =========================================================================
//  USUARIOS
// =========================================================================

pub fn users_report(rows: &[User], now: NaiveDateTime) -> LaidOutReport {
    let active = rows.iter().filter(|u| u.activo).count();
    let by_role = |role: Role| rows.iter().filter(|u| u.role() == role).count();

    let mut layout = ReportLayout::new("Reporte de Usuarios", Orientation::Portrait, USERS_LIMIT);
    layout
        .title("Reporte de Usuarios")
        .line(format!("Fecha de generación: {}", generated_on(now)))
        .line(format!("Hora de generación: {}", now.format("%H:%M:%S")))
        .spacer(4.0)
        .heading("Estadísticas:")
        .line(format!("Total de usuarios: {}", rows.len()))
        .line(format!("Usuarios activos: {}", active))
        .line(format!("Usuarios inactivos: {}", rows.len() - active))
        .line(format!("Bodegueros: {}", by_role(Role::Bodeguero)))
        .line(format!("Jefes de bodega: {}", by_role(Role::JefeBodega)))
        .line(format!("Auditores: {}", by_role(Role::Auditor)))
        .line(format!("Administradores: {}", by_role(Role::Administrador)))
        .spacer(4.0)
        .heading("Lista de Usuarios:")
        .table(vec![
            Column::new("Nombre", 45),
            Column::new("Email", 55),
            Column::new("RUT", 30),
            Column::new("Cargo", 35),
            Column::new("Estado", 25),
        ]);

    for user in rows {
        layout.row(&[
            fit(&user.nombre_completo, 15),
            fit(&user.email, 20),
            user.rut.clone(),
            fit(&user.cargo, 12),
            if user.activo { "Activo" } else { "Inactivo" }.to_string(),
        ]);
    }

    layout.finish(format!("usuarios_{}.pdf", now.format("%Y-%m-%dT%H-%M-%S")))
}

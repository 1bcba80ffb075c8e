// src/handlers/dashboard.rs

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    cli::{ComparisonCommand, LedgerArgs},
    common::{error::AppError, format::format_clp},
    config::AppState,
    handlers::{Output, output, today},
    models::dashboard::{CategoryComparison, LedgerQuery, MonthlyComparison},
    routes::{self, Page},
    services::dashboards::{ComparisonQuery, worst_month},
};

pub async fn comparison(state: &AppState, cmd: ComparisonCommand) -> Result<Output, AppError> {
    routes::guard(&state.session, Page::ShrinkageComparison)?;

    match cmd {
        ComparisonCommand::Mensual { anio } => {
            let (monthly, categorias) = state.dashboards.monthly(anio).await?;
            let mut listings = monthly_listings(&monthly, today().year());
            listings.push(output::rows("Categorías de merma", &categorias));
            Ok(Output::Listings(listings))
        }
        ComparisonCommand::Categorias { categoria1, categoria2, desde, hasta } => {
            let query = ComparisonQuery { categoria1, categoria2, fecha_inicio: desde, fecha_fin: hasta };
            let result = state.dashboards.compare(&query).await?;
            Ok(Output::Listing(category_listing(&result)))
        }
    }
}

fn monthly_listings(data: &MonthlyComparison, current_year: i32) -> Vec<output::Listing> {
    let years: Vec<String> = data.selectable_years(current_year).iter().map(|y| y.to_string()).collect();

    let body = data
        .datos_mensuales
        .iter()
        .map(|m| vec![m.mes.clone(), m.total_mermas.to_string(), format_clp(m.perdida_economica)])
        .collect();
    let mut months = output::grid(
        format!("Mermas aprobadas {} (años: {})", data.year, years.join(", ")),
        &["Mes", "Mermas", "Pérdida"],
        body,
        json!(data),
    );
    let worst = worst_month(data)
        .map(|m| format!("Mes con mayor pérdida: {} ({})", m.mes, format_clp(m.perdida_economica)))
        .unwrap_or_else(|| "Sin mermas aprobadas en el año".to_string());
    months.footer = Some(format!(
        "Total anual: {} · {} mermas · Promedio mensual: {}\n{}",
        format_clp(data.resumen.total_anual),
        data.resumen.total_mermas,
        format_clp(data.resumen.promedio_mensual),
        worst
    ));

    let body = data
        .productos_mayor_perdida_mes
        .iter()
        .map(|p| vec![p.mes.clone(), p.producto.clone(), format_clp(p.perdida_economica)])
        .collect();
    let per_month = output::grid(
        "Producto con mayor pérdida por mes",
        &["Mes", "Producto", "Pérdida"],
        body,
        json!(data.productos_mayor_perdida_mes),
    );

    let body = data
        .top_products
        .iter()
        .enumerate()
        .map(|(i, p)| vec![(i + 1).to_string(), p.producto.clone(), format_clp(p.perdida_economica)])
        .collect();
    let top = output::grid("Top productos del año", &["#", "Producto", "Pérdida"], body, json!(data.top_products));

    vec![months, per_month, top]
}

/// Meses de ambas series alineados por (año, mes).
fn category_listing(result: &CategoryComparison) -> output::Listing {
    let (a, b) = (&result.categoria1, &result.categoria2);
    let mut months: BTreeMap<(i32, u32), (String, Decimal, Decimal)> = BTreeMap::new();
    for m in &a.datos_mensuales {
        months.entry((m.year, m.mes_num)).or_insert_with(|| (m.mes.clone(), Decimal::ZERO, Decimal::ZERO)).1 +=
            m.perdida_economica;
    }
    for m in &b.datos_mensuales {
        months.entry((m.year, m.mes_num)).or_insert_with(|| (m.mes.clone(), Decimal::ZERO, Decimal::ZERO)).2 +=
            m.perdida_economica;
    }

    let body = months
        .into_iter()
        .map(|((year, _), (mes, p1, p2))| vec![format!("{} {}", mes, year), format_clp(p1), format_clp(p2)])
        .collect();
    let mut listing = output::grid(
        format!("{} vs {} ({} a {})", a.nombre, b.nombre, result.fecha_inicio, result.fecha_fin),
        &["Mes", a.nombre.as_str(), b.nombre.as_str()],
        body,
        json!(result),
    );
    listing.footer = Some(format!(
        "{}: {} en {} registros · {}: {} en {} registros · Diferencia: {}",
        a.nombre,
        format_clp(a.total_perdida),
        a.total_registros,
        b.nombre,
        format_clp(b.total_perdida),
        b.total_registros,
        format_clp(result.loss_difference())
    ));
    listing
}

pub async fn ledger(state: &AppState, args: LedgerArgs) -> Result<Output, AppError> {
    let item = routes::guard(&state.session, Page::Ledger)?;

    // Con solo el producto se muestra su historial completo
    let only_product = args.tipo.is_none()
        && args.desde.is_none()
        && args.hasta.is_none()
        && args.pagina.is_none()
        && args.por_pagina.is_none();
    if let (Some(producto), true) = (args.producto, only_product) {
        let entries = state.dashboards.product_history(producto).await?;
        return Ok(Output::Listing(output::rows(format!("{} · producto {}", item.title, producto), &entries)));
    }

    let query = LedgerQuery {
        producto_id: args.producto,
        tipo_movimiento: args.tipo,
        fecha_desde: args.desde.map(|d| d.format("%Y-%m-%d").to_string()),
        fecha_hasta: args.hasta.map(|d| d.format("%Y-%m-%d").to_string()),
        page: args.pagina,
        page_size: args.por_pagina,
    };
    let page = state.dashboards.ledger(&query).await?;
    let mut listing = output::rows(item.title, &page.results);
    listing.footer = Some(format!("Página {} de {} ({} registros)", page.page, page.num_pages, page.count));
    listing.json = json!(page);
    Ok(Output::Listing(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{CategoryMonth, CategorySeries};

    fn month(mes: &str, mes_num: u32, perdida: i64) -> CategoryMonth {
        CategoryMonth {
            mes: mes.into(),
            mes_num,
            year: 2025,
            total_mermas: 1,
            perdida_economica: Decimal::from(perdida),
        }
    }

    #[test]
    fn category_months_are_aligned() {
        let result = CategoryComparison {
            categoria1: CategorySeries {
                nombre: "Vencimiento".into(),
                datos_mensuales: vec![month("Enero", 1, 1000), month("Marzo", 3, 500)],
                total_perdida: Decimal::from(1500),
                total_registros: 2,
            },
            categoria2: CategorySeries {
                nombre: "Rotura".into(),
                datos_mensuales: vec![month("Febrero", 2, 300)],
                total_perdida: Decimal::from(300),
                total_registros: 1,
            },
            datos_comparativos: vec![],
            fecha_inicio: "2025-01-01".into(),
            fecha_fin: "2025-03-31".into(),
        };

        let listing = category_listing(&result);

        assert_eq!(listing.table.row_iter().count(), 3);
        let text = listing.to_string();
        assert!(text.starts_with("Vencimiento vs Rotura (2025-01-01 a 2025-03-31)"));
        assert!(text.ends_with("Diferencia: $1.200"));
    }
}

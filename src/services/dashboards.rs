// src/services/dashboards.rs

use chrono::NaiveDate;

use crate::{
    api::{DashboardApi, OperationsApi},
    common::error::AppError,
    forms::parse_id,
    models::{
        crm::NamedRef,
        dashboard::{CategoryComparison, LedgerEntry, LedgerPage, LedgerQuery, MonthlyComparison, MonthlyLoss},
    },
};

/// Parámetros de la comparación entre dos categorías de merma, tal como se escriben.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonQuery {
    pub categoria1: String,
    pub categoria2: String,
    /// `YYYY-MM-DD`
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

/// Consulta ya validada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedComparison {
    pub categoria1: i64,
    pub categoria2: i64,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
}

fn incomplete() -> AppError {
    AppError::Api { status: 400, message: "Por favor completa todos los campos".into() }
}

impl ComparisonQuery {
    pub fn check(&self) -> Result<CheckedComparison, AppError> {
        let categoria1 = parse_id(&self.categoria1).ok_or_else(incomplete)?;
        let categoria2 = parse_id(&self.categoria2).ok_or_else(incomplete)?;
        let parse = |raw: &str| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok();
        let fecha_inicio = parse(&self.fecha_inicio).ok_or_else(incomplete)?;
        let fecha_fin = parse(&self.fecha_fin).ok_or_else(incomplete)?;

        if fecha_inicio > fecha_fin {
            return Err(AppError::Api {
                status: 400,
                message: "La fecha de inicio no puede ser posterior a la fecha de fin".into(),
            });
        }
        Ok(CheckedComparison { categoria1, categoria2, fecha_inicio, fecha_fin })
    }
}

/// Mes con mayor pérdida económica; ante empate gana el primero.
pub fn worst_month(data: &MonthlyComparison) -> Option<&MonthlyLoss> {
    data.datos_mensuales
        .iter()
        .filter(|m| m.total_mermas > 0)
        .fold(None, |best: Option<&MonthlyLoss>, m| match best {
            Some(b) if b.perdida_economica >= m.perdida_economica => Some(b),
            _ => Some(m),
        })
}

/// Comparaciones de mermas e historial de movimientos.
#[derive(Clone)]
pub struct DashboardService {
    api: DashboardApi,
    operations: OperationsApi,
}

impl DashboardService {
    pub fn new(api: DashboardApi, operations: OperationsApi) -> Self {
        Self { api, operations }
    }

    /// Comparación mensual y categorías de merma para el selector, en paralelo.
    pub async fn monthly(&self, year: Option<i32>) -> Result<(MonthlyComparison, Vec<NamedRef>), AppError> {
        let (monthly, categorias) =
            tokio::try_join!(self.api.monthly_comparison(year), self.operations.shrinkage_categories())?;
        tracing::info!("📊 Comparación mensual {} cargada", monthly.year);
        Ok((monthly, categorias))
    }

    /// Sin ambas categorías y ambas fechas no se consulta al backend.
    pub async fn compare(&self, query: &ComparisonQuery) -> Result<CategoryComparison, AppError> {
        let checked = query.check()?;
        self.api
            .category_comparison(
                checked.categoria1,
                checked.categoria2,
                &checked.fecha_inicio.format("%Y-%m-%d").to_string(),
                &checked.fecha_fin.format("%Y-%m-%d").to_string(),
            )
            .await
    }

    pub async fn ledger(&self, query: &LedgerQuery) -> Result<LedgerPage, AppError> {
        self.api.ledger(query).await
    }

    /// Historial completo de un producto, sin paginar.
    pub async fn product_history(&self, producto_id: i64) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = self.api.product_ledger(producto_id).await?;
        tracing::info!("📊 Historial del producto {}: {} movimientos", producto_id, entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;
    use crate::models::dashboard::YearSummary;

    fn service(transport: &std::sync::Arc<RecordingTransport>) -> DashboardService {
        let session = admin_session();
        DashboardService::new(
            DashboardApi::new(client(transport, session.clone())),
            OperationsApi::new(client(transport, session)),
        )
    }

    fn month(mes_num: u32, total: i64, perdida: i64) -> MonthlyLoss {
        MonthlyLoss {
            mes: format!("Mes {}", mes_num),
            mes_num,
            total_mermas: total,
            perdida_economica: Decimal::from(perdida),
        }
    }

    #[tokio::test]
    async fn comparison_needs_both_categories_and_dates() {
        let transport = RecordingTransport::new();
        let query = ComparisonQuery {
            categoria1: "1".into(),
            categoria2: String::new(),
            fecha_inicio: "2025-01-01".into(),
            fecha_fin: "2025-03-31".into(),
        };

        let err = service(&transport).compare(&query).await.unwrap_err();

        assert_eq!(err.user_message(), "Por favor completa todos los campos");
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = ComparisonQuery {
            categoria1: "1".into(),
            categoria2: "2".into(),
            fecha_inicio: "2025-04-01".into(),
            fecha_fin: "2025-03-31".into(),
        };
        assert!(query.check().is_err());
    }

    #[test]
    fn worst_month_skips_empty_months() {
        let data = MonthlyComparison {
            year: 2025,
            min_year: 2023,
            datos_mensuales: vec![month(1, 0, 0), month(2, 3, 15000), month(3, 1, 15000), month(4, 2, 9000)],
            productos_mayor_perdida_mes: vec![],
            top_products: vec![],
            resumen: YearSummary {
                total_anual: Decimal::from(39000),
                total_mermas: 6,
                promedio_mensual: Decimal::from(3250),
            },
        };
        assert_eq!(worst_month(&data).map(|m| m.mes_num), Some(2));
        assert_eq!(data.selectable_years(2025), vec![2025, 2024, 2023]);
    }

    #[tokio::test]
    async fn valid_comparison_sends_the_query_string() {
        let transport = RecordingTransport::new();
        transport.push(
            200,
            json!({
                "success": true,
                "categoria1": {"nombre": "Vencimiento", "datos_mensuales": [], "total_perdida": 1000, "total_registros": 2},
                "categoria2": {"nombre": "Rotura", "datos_mensuales": [], "total_perdida": 400, "total_registros": 1},
                "datos_comparativos": [],
                "fecha_inicio": "2025-01-01",
                "fecha_fin": "2025-03-31"
            }),
        );
        let query = ComparisonQuery {
            categoria1: "1".into(),
            categoria2: "2".into(),
            fecha_inicio: "2025-01-01".into(),
            fecha_fin: "2025-03-31".into(),
        };

        let result = service(&transport).compare(&query).await.unwrap();

        assert_eq!(result.loss_difference(), Decimal::from(600));
        assert_eq!(
            transport.paths(),
            vec!["admin/mermas/comparacion-categorias/?categoria1=1&categoria2=2&fecha_inicio=2025-01-01&fecha_fin=2025-03-31"]
        );
    }
}

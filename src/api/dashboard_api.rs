// src/api/dashboard_api.rs

use reqwest::Url;

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::dashboard::{CategoryComparison, LedgerEntry, LedgerPage, LedgerQuery, MonthlyComparison},
};

/// Comparaciones de mermas e historial de trazabilidad.
#[derive(Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

/// Arma `path?k=v&...` omitiendo los parámetros vacíos.
fn with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let present: Vec<(&str, &str)> = pairs
        .iter()
        .filter_map(|(k, v)| v.as_deref().filter(|v| !v.is_empty()).map(|v| (*k, v)))
        .collect();
    if present.is_empty() {
        return path.to_string();
    }

    // Solo se usa el serializador de la query de `Url`
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return path.to_string(),
    };
    url.query_pairs_mut().extend_pairs(present);
    format!("{}?{}", path, url.query().unwrap_or_default())
}

impl DashboardApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sin año, el backend usa el año en curso.
    pub async fn monthly_comparison(&self, year: Option<i32>) -> Result<MonthlyComparison, AppError> {
        let path = with_query(
            "admin/mermas/comparacion-mensual/",
            &[("year", year.map(|y| y.to_string()))],
        );
        self.client
            .get_body(&path, "Error al cargar la comparación de mermas")
            .await
    }

    pub async fn category_comparison(
        &self,
        categoria1: i64,
        categoria2: i64,
        fecha_inicio: &str,
        fecha_fin: &str,
    ) -> Result<CategoryComparison, AppError> {
        let path = with_query(
            "admin/mermas/comparacion-categorias/",
            &[
                ("categoria1", Some(categoria1.to_string())),
                ("categoria2", Some(categoria2.to_string())),
                ("fecha_inicio", Some(fecha_inicio.to_string())),
                ("fecha_fin", Some(fecha_fin.to_string())),
            ],
        );
        self.client
            .get_body(&path, "Error al cargar la comparación por categorías")
            .await
    }

    pub async fn ledger(&self, query: &LedgerQuery) -> Result<LedgerPage, AppError> {
        let path = with_query(
            "blockchain/historial/",
            &[
                ("producto_id", query.producto_id.map(|v| v.to_string())),
                ("tipo_movimiento", query.tipo_movimiento.clone()),
                ("fecha_desde", query.fecha_desde.clone()),
                ("fecha_hasta", query.fecha_hasta.clone()),
                ("page", query.page.map(|v| v.to_string())),
                ("page_size", query.page_size.map(|v| v.to_string())),
            ],
        );
        self.client
            .get_body(&path, "Error al cargar el historial")
            .await
    }

    pub async fn product_ledger(&self, producto_id: i64) -> Result<Vec<LedgerEntry>, AppError> {
        let path = format!("blockchain/historial/{}/", producto_id);
        self.client
            .get(&path, "historial", "Error al cargar el historial del producto")
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    #[test]
    fn query_skips_empty_values_and_encodes() {
        assert_eq!(with_query("a/", &[("x", None)]), "a/");
        assert_eq!(
            with_query("a/", &[("tipo_movimiento", Some("salida de producto".into())), ("page", Some("2".into()))]),
            "a/?tipo_movimiento=salida+de+producto&page=2"
        );
    }

    #[tokio::test]
    async fn ledger_decodes_decimal_strings() {
        let transport = RecordingTransport::new();
        transport.push(
            200,
            json!({
                "success": true, "count": 1, "num_pages": 1, "page": 1,
                "results": [{
                    "id": 9, "producto": 3, "producto_nombre": "Harina", "usuario": 2,
                    "usuario_nombre": "Ana Rojas", "tipo_movimiento": "INGRESO",
                    "cantidad": "12.50", "timestamp": "2025-01-10T12:00:00Z",
                    "tx_id_blockchain": "0xabc", "detalle": {"lote": "L-1"}
                }]
            }),
        );
        let api = DashboardApi::new(client(&transport, admin_session()));

        let page = api
            .ledger(&LedgerQuery { producto_id: Some(3), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(page.results[0].cantidad.to_string(), "12.50");
        assert_eq!(transport.paths(), vec!["blockchain/historial/?producto_id=3"]);
    }
}

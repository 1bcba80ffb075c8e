// src/services/list_view.rs

use async_trait::async_trait;

use crate::{
    api::Ack,
    common::{error::AppError, notice::Notice},
    services::filters::{self, Filterable, ListQuery, PageSlice},
};

// =========================================================================
//  FUENTES DE DATOS
// =========================================================================

/// De dónde sale la colección de una vista.
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Clone + Send + Sync;

    /// Nombre en plural para los logs ("productos", "clientes", ...).
    fn label(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<Self::Item>, AppError>;
}

/// Vistas con botón activar/desactivar.
#[async_trait]
pub trait ToggleSource: ListSource {
    fn item_id(item: &Self::Item) -> i64;
    fn is_active(item: &Self::Item) -> bool;

    /// "Producto", "Cliente", ...
    fn noun(&self) -> &'static str;

    async fn set_active(&self, id: i64, active: bool) -> Result<Ack, AppError>;

    fn toggled_message(&self, active: bool) -> String {
        let verb = if active { "activado" } else { "desactivado" };
        format!("{} {} correctamente", self.noun(), verb)
    }
}

#[async_trait]
pub trait DeleteSource: ListSource {
    fn deleted_message(&self) -> &'static str;

    async fn delete(&self, id: i64) -> Result<Ack, AppError>;
}

#[async_trait]
pub trait EditSource: ListSource {
    /// Cuerpo ya validado por el diálogo de edición.
    type Payload: Send + Sync;

    fn edited_message(&self) -> &'static str;

    async fn save(&self, id: i64, payload: &Self::Payload) -> Result<Ack, AppError>;
}

/// Bandeja de aprobación (mermas pendientes).
#[async_trait]
pub trait ReviewSource: ListSource {
    async fn approve(&self, id: i64) -> Result<Ack, AppError>;
    async fn reject(&self, id: i64) -> Result<Ack, AppError>;
}

// =========================================================================
//  ESTADO DE LA VISTA
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading { previous: Option<Vec<T>> },
    Ready(Vec<T>),
    Failed { message: String, stale: Option<Vec<T>> },
}

/// Qué se muestra si falla una recarga después de una carga exitosa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Se siguen mostrando las filas anteriores junto al error.
    #[default]
    KeepPrevious,
    /// Solo el error.
    ShowError,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = String;

    /// `mantener` o `error` (variable `BODEGA_REFRESH_POLICY`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mantener" => Ok(Self::KeepPrevious),
            "error" => Ok(Self::ShowError),
            other => Err(format!("política de recarga desconocida: {}", other)),
        }
    }
}

pub struct ListView<S: ListSource> {
    source: S,
    state: ViewState<S::Item>,
    policy: RefreshPolicy,
}

impl<S: ListSource> ListView<S> {
    pub fn new(source: S) -> Self {
        Self { source, state: ViewState::Idle, policy: RefreshPolicy::default() }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> &ViewState<S::Item> {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// La colección de la última carga exitosa (si la política la conserva).
    pub fn rows(&self) -> &[S::Item] {
        match &self.state {
            ViewState::Ready(rows) => rows,
            ViewState::Loading { previous: Some(rows) } => rows,
            ViewState::Failed { stale: Some(rows), .. } => rows,
            _ => &[],
        }
    }

    /// Carga o recarga. Una carga exitosa reemplaza por completo la colección.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let previous = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::Ready(rows) => Some(rows),
            ViewState::Loading { previous } => previous,
            ViewState::Failed { stale, .. } => stale,
            ViewState::Idle => None,
        };
        self.state = ViewState::Loading { previous };

        let result = self.source.fetch().await;
        let previous = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::Loading { previous } => previous,
            _ => None,
        };

        match result {
            Ok(rows) => {
                tracing::info!("✅ {} cargados: {}", self.source.label(), rows.len());
                self.state = ViewState::Ready(rows);
                Ok(())
            }
            Err(e) => {
                let notice = e.to_notice();
                let stale = match self.policy {
                    RefreshPolicy::KeepPrevious => previous,
                    RefreshPolicy::ShowError => None,
                };
                self.state = ViewState::Failed { message: notice.message, stale };
                Err(e)
            }
        }
    }

    /// Recarga tras una acción exitosa. Un fallo queda en el estado de la vista.
    async fn reload_after_action(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!("⚠️ La recarga de {} falló: {}", self.source.label(), e);
        }
    }

    /// Resultado de una acción: aviso de éxito y una sola recarga, o aviso de error sin tocar el estado.
    async fn finish(&mut self, result: Result<Ack, AppError>, fallback: String) -> Notice {
        match result {
            Ok(ack) => {
                let notice = Notice::success(ack.message_or(&fallback));
                self.reload_after_action().await;
                notice
            }
            Err(e) => e.to_notice(),
        }
    }
}

impl<S> ListView<S>
where
    S: ListSource,
    S::Item: Filterable,
{
    /// Vista derivada: búsqueda, filtros, orden y página.
    pub fn visible(&self, query: &ListQuery) -> PageSlice<S::Item> {
        filters::apply(self.rows(), query)
    }
}

impl<S: ToggleSource> ListView<S> {
    /// Activo → desactivar; inactivo → activar.
    pub async fn toggle(&mut self, id: i64) -> Notice {
        let Some(item) = self.rows().iter().find(|item| S::item_id(item) == id) else {
            return Notice::error(format!("No se encontró el registro {}", id));
        };
        let activate = !S::is_active(item);

        let result = self.source.set_active(id, activate).await;
        let fallback = self.source.toggled_message(activate);
        self.finish(result, fallback).await
    }
}

impl<S: DeleteSource> ListView<S> {
    pub async fn delete(&mut self, id: i64) -> Notice {
        let result = self.source.delete(id).await;
        let fallback = self.source.deleted_message().to_string();
        self.finish(result, fallback).await
    }
}

impl<S: EditSource> ListView<S> {
    pub async fn edit(&mut self, id: i64, payload: &S::Payload) -> Notice {
        let result = self.source.save(id, payload).await;
        let fallback = self.source.edited_message().to_string();
        self.finish(result, fallback).await
    }
}

impl<S: ReviewSource> ListView<S> {
    pub async fn approve(&mut self, id: i64) -> Notice {
        let result = self.source.approve(id).await;
        self.finish(result, "Merma aprobada correctamente".into()).await
    }

    pub async fn reject(&mut self, id: i64) -> Notice {
        let result = self.source.reject(id).await;
        self.finish(result, "Merma rechazada correctamente".into()).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::{Value, json};

    use super::*;
    use crate::api::InventoryApi;
    use crate::api::client::testing::*;
    use crate::common::notice::NoticeLevel;
    use crate::services::sources::{PendingShrinkageSource, ProductSource};
    use crate::api::OperationsApi;

    fn products(active: bool) -> Value {
        json!({
            "success": true,
            "productos": [
                {"id": 1, "nombre": "Arroz", "precio_unitario": 1200, "cantidad_por_lote": 10,
                 "activo": active, "categoria": "Abarrotes", "unidad_medida": "Unidades"},
                {"id": 2, "nombre": "Aceite", "precio_unitario": "3490.50", "cantidad_por_lote": 1,
                 "activo": true, "categoria": null, "unidad_medida": "Litros"}
            ]
        })
    }

    fn product_view(transport: &std::sync::Arc<RecordingTransport>) -> ListView<ProductSource> {
        ListView::new(ProductSource::new(InventoryApi::new(client(transport, admin_session()))))
    }

    #[tokio::test]
    async fn successful_fetch_shows_every_row() {
        let transport = RecordingTransport::new();
        transport.push(200, products(true));
        let mut view = product_view(&transport);

        view.load().await.unwrap();

        assert_eq!(view.rows().len(), 2);
        assert!(matches!(view.state(), ViewState::Ready(_)));
    }

    #[tokio::test]
    async fn first_fetch_failure_shows_no_rows() {
        let transport = RecordingTransport::new();
        transport.push(500, json!({"success": false, "error": "Error al obtener productos"}));
        let mut view = product_view(&transport);

        assert!(view.load().await.is_err());
        assert!(view.rows().is_empty());
        assert_eq!(view.error(), Some("Error al obtener productos"));
    }

    #[tokio::test]
    async fn toggle_on_active_row_deactivates_and_refetches_once() {
        let transport = RecordingTransport::new();
        transport.push(200, products(true));
        transport.push(200, json!({"success": true, "message": "Producto desactivado"}));
        transport.push(200, products(false));
        let mut view = product_view(&transport);
        view.load().await.unwrap();

        let notice = view.toggle(1).await;

        assert_eq!(notice, Notice::success("Producto desactivado"));
        assert_eq!(
            transport.paths(),
            vec!["data/productos-admin/", "admin/productos/1/desactivar/", "data/productos-admin/"]
        );
        assert_eq!(transport.requests()[1].method, Method::POST);
        assert!(!view.rows()[0].activo);
    }

    #[tokio::test]
    async fn toggle_on_inactive_row_activates() {
        let transport = RecordingTransport::new();
        transport.push(200, products(false));
        transport.push(200, json!({"success": true}));
        transport.push(200, products(true));
        let mut view = product_view(&transport);
        view.load().await.unwrap();

        let notice = view.toggle(1).await;

        assert_eq!(notice.message, "Producto activado correctamente");
        assert_eq!(transport.paths()[1], "admin/productos/1/activar/");
    }

    #[tokio::test]
    async fn failed_action_keeps_state_and_skips_refetch() {
        let transport = RecordingTransport::new();
        transport.push(200, products(true));
        transport.push(400, json!({"success": false, "message": "No se puede desactivar"}));
        let mut view = product_view(&transport);
        view.load().await.unwrap();

        let notice = view.toggle(1).await;

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "No se puede desactivar");
        assert_eq!(transport.requests().len(), 2);
        assert!(view.rows()[0].activo);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_previous_rows_by_default() {
        let transport = RecordingTransport::new();
        transport.push(200, products(true));
        transport.push(502, Value::Null);
        let mut view = product_view(&transport);
        view.load().await.unwrap();

        assert!(view.load().await.is_err());
        assert_eq!(view.rows().len(), 2);
        assert!(view.error().is_some());
    }

    #[tokio::test]
    async fn show_error_policy_hides_stale_rows() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "mermas_pendientes": [{
            "id": 4, "fecha": "10/05/2025", "hora": "09:30", "categoria_merma": "Vencimiento",
            "estado": "pendiente", "observaciones_registro": "Producto vencido en bodega",
            "usuario_registro": {"nombre": "Luis", "apellido": "Paz"},
            "detalles_merma": [], "valor_total_merma": 0
        }]}));
        transport.push(500, Value::Null);
        let api = OperationsApi::new(client(&transport, session_with_cargo(2)));
        let mut view = ListView::new(PendingShrinkageSource::new(api)).with_policy(RefreshPolicy::ShowError);
        view.load().await.unwrap();
        assert_eq!(view.rows().len(), 1);

        assert!(view.load().await.is_err());
        assert!(view.rows().is_empty());
    }

    #[tokio::test]
    async fn unknown_row_is_reported_without_network() {
        let transport = RecordingTransport::new();
        transport.push(200, products(true));
        let mut view = product_view(&transport);
        view.load().await.unwrap();

        let notice = view.toggle(99).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(transport.requests().len(), 1);
    }
}

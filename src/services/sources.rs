// src/services/sources.rs

use async_trait::async_trait;

use crate::{
    api::{Ack, CrmApi, InventoryApi, OperationsApi, UserApi},
    common::error::AppError,
    models::{
        crm::{Driver, DriverPayload, Partner, PartnerKind, PartnerPayload},
        inventory::{InventoryLot, Product, ProductPayload, StockRule, StockRuleUpdate},
        operations::{Dispatch, Intake, PendingShrinkage, Shrinkage},
        users::User,
    },
    services::list_view::{DeleteSource, EditSource, ListSource, ReviewSource, ToggleSource},
};

// =========================================================================
//  CLIENTES / PROVEEDORES
// =========================================================================

pub struct PartnerSource {
    api: CrmApi,
    kind: PartnerKind,
}

impl PartnerSource {
    pub fn new(api: CrmApi, kind: PartnerKind) -> Self {
        Self { api, kind }
    }

    pub fn kind(&self) -> PartnerKind {
        self.kind
    }
}

#[async_trait]
impl ListSource for PartnerSource {
    type Item = Partner;

    fn label(&self) -> &'static str {
        self.kind.segment()
    }

    async fn fetch(&self) -> Result<Vec<Partner>, AppError> {
        self.api.list_partners(self.kind).await
    }
}

#[async_trait]
impl ToggleSource for PartnerSource {
    fn item_id(item: &Partner) -> i64 {
        item.id
    }
    fn is_active(item: &Partner) -> bool {
        item.activo
    }
    fn noun(&self) -> &'static str {
        match self.kind {
            PartnerKind::Cliente => "Cliente",
            PartnerKind::Proveedor => "Proveedor",
        }
    }
    async fn set_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        self.api.set_partner_active(self.kind, id, active).await
    }
}

#[async_trait]
impl EditSource for PartnerSource {
    type Payload = PartnerPayload;

    fn edited_message(&self) -> &'static str {
        match self.kind {
            PartnerKind::Cliente => "Cliente actualizado correctamente",
            PartnerKind::Proveedor => "Proveedor actualizado correctamente",
        }
    }

    async fn save(&self, id: i64, payload: &PartnerPayload) -> Result<Ack, AppError> {
        self.api.edit_partner(self.kind, id, payload).await
    }
}

// =========================================================================
//  CONDUCTORES
// =========================================================================

pub struct DriverSource {
    api: CrmApi,
}

impl DriverSource {
    pub fn new(api: CrmApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for DriverSource {
    type Item = Driver;

    fn label(&self) -> &'static str {
        "conductores"
    }

    async fn fetch(&self) -> Result<Vec<Driver>, AppError> {
        self.api.list_drivers().await
    }
}

#[async_trait]
impl ToggleSource for DriverSource {
    fn item_id(item: &Driver) -> i64 {
        item.id
    }
    fn is_active(item: &Driver) -> bool {
        item.activo
    }
    fn noun(&self) -> &'static str {
        "Conductor"
    }
    async fn set_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        self.api.set_driver_active(id, active).await
    }
}

#[async_trait]
impl EditSource for DriverSource {
    type Payload = DriverPayload;

    fn edited_message(&self) -> &'static str {
        "Conductor actualizado correctamente"
    }

    async fn save(&self, id: i64, payload: &DriverPayload) -> Result<Ack, AppError> {
        self.api.edit_driver(id, payload).await
    }
}

// =========================================================================
//  USUARIOS
// =========================================================================

pub struct UserSource {
    api: UserApi,
}

impl UserSource {
    pub fn new(api: UserApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for UserSource {
    type Item = User;

    fn label(&self) -> &'static str {
        "usuarios"
    }

    async fn fetch(&self) -> Result<Vec<User>, AppError> {
        self.api.list_users().await
    }
}

#[async_trait]
impl ToggleSource for UserSource {
    fn item_id(item: &User) -> i64 {
        item.id
    }
    fn is_active(item: &User) -> bool {
        item.activo
    }
    fn noun(&self) -> &'static str {
        "Usuario"
    }
    async fn set_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        self.api.set_user_active(id, active).await
    }
}

// =========================================================================
//  PRODUCTOS, INVENTARIO Y STOCK MÍNIMO
// =========================================================================

pub struct ProductSource {
    api: InventoryApi,
}

impl ProductSource {
    pub fn new(api: InventoryApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for ProductSource {
    type Item = Product;

    fn label(&self) -> &'static str {
        "productos"
    }

    async fn fetch(&self) -> Result<Vec<Product>, AppError> {
        self.api.list_products().await
    }
}

#[async_trait]
impl ToggleSource for ProductSource {
    fn item_id(item: &Product) -> i64 {
        item.id
    }
    fn is_active(item: &Product) -> bool {
        item.activo
    }
    fn noun(&self) -> &'static str {
        "Producto"
    }
    async fn set_active(&self, id: i64, active: bool) -> Result<Ack, AppError> {
        self.api.set_product_active(id, active).await
    }
}

#[async_trait]
impl EditSource for ProductSource {
    type Payload = ProductPayload;

    fn edited_message(&self) -> &'static str {
        "Producto actualizado correctamente"
    }

    async fn save(&self, id: i64, payload: &ProductPayload) -> Result<Ack, AppError> {
        self.api.edit_product(id, payload).await
    }
}

pub struct InventorySource {
    api: InventoryApi,
}

impl InventorySource {
    pub fn new(api: InventoryApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for InventorySource {
    type Item = InventoryLot;

    fn label(&self) -> &'static str {
        "lotes"
    }

    async fn fetch(&self) -> Result<Vec<InventoryLot>, AppError> {
        self.api.inventory().await
    }
}

pub struct StockRuleSource {
    api: InventoryApi,
}

impl StockRuleSource {
    pub fn new(api: InventoryApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for StockRuleSource {
    type Item = StockRule;

    fn label(&self) -> &'static str {
        "reglas de stock"
    }

    async fn fetch(&self) -> Result<Vec<StockRule>, AppError> {
        self.api.list_stock_rules().await
    }
}

#[async_trait]
impl EditSource for StockRuleSource {
    type Payload = StockRuleUpdate;

    fn edited_message(&self) -> &'static str {
        "Regla de stock actualizada correctamente"
    }

    async fn save(&self, id: i64, payload: &StockRuleUpdate) -> Result<Ack, AppError> {
        self.api.edit_stock_rule(id, payload).await
    }
}

#[async_trait]
impl DeleteSource for StockRuleSource {
    fn deleted_message(&self) -> &'static str {
        "Regla de stock eliminada correctamente"
    }

    async fn delete(&self, id: i64) -> Result<Ack, AppError> {
        self.api.delete_stock_rule(id).await
    }
}

// =========================================================================
//  MOVIMIENTOS
// =========================================================================

pub struct IntakeSource {
    api: OperationsApi,
}

impl IntakeSource {
    pub fn new(api: OperationsApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for IntakeSource {
    type Item = Intake;

    fn label(&self) -> &'static str {
        "ingresos"
    }

    async fn fetch(&self) -> Result<Vec<Intake>, AppError> {
        self.api.list_intakes().await
    }
}

#[async_trait]
impl DeleteSource for IntakeSource {
    fn deleted_message(&self) -> &'static str {
        "Ingreso eliminado correctamente"
    }

    async fn delete(&self, id: i64) -> Result<Ack, AppError> {
        self.api.delete_intake(id).await
    }
}

pub struct DispatchSource {
    api: OperationsApi,
}

impl DispatchSource {
    pub fn new(api: OperationsApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for DispatchSource {
    type Item = Dispatch;

    fn label(&self) -> &'static str {
        "salidas"
    }

    async fn fetch(&self) -> Result<Vec<Dispatch>, AppError> {
        self.api.list_dispatches().await
    }
}

#[async_trait]
impl DeleteSource for DispatchSource {
    fn deleted_message(&self) -> &'static str {
        "Salida eliminada correctamente"
    }

    async fn delete(&self, id: i64) -> Result<Ack, AppError> {
        self.api.delete_dispatch(id).await
    }
}

pub struct ShrinkageSource {
    api: OperationsApi,
}

impl ShrinkageSource {
    pub fn new(api: OperationsApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for ShrinkageSource {
    type Item = Shrinkage;

    fn label(&self) -> &'static str {
        "mermas"
    }

    async fn fetch(&self) -> Result<Vec<Shrinkage>, AppError> {
        self.api.list_shrinkage().await
    }
}

#[async_trait]
impl DeleteSource for ShrinkageSource {
    fn deleted_message(&self) -> &'static str {
        "Merma eliminada correctamente"
    }

    async fn delete(&self, id: i64) -> Result<Ack, AppError> {
        self.api.delete_shrinkage(id).await
    }
}

pub struct PendingShrinkageSource {
    api: OperationsApi,
}

impl PendingShrinkageSource {
    pub fn new(api: OperationsApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for PendingShrinkageSource {
    type Item = PendingShrinkage;

    fn label(&self) -> &'static str {
        "mermas pendientes"
    }

    async fn fetch(&self) -> Result<Vec<PendingShrinkage>, AppError> {
        self.api.pending_shrinkage().await
    }
}

#[async_trait]
impl ReviewSource for PendingShrinkageSource {
    async fn approve(&self, id: i64) -> Result<Ack, AppError> {
        self.api.approve_shrinkage(id).await
    }

    async fn reject(&self, id: i64) -> Result<Ack, AppError> {
        self.api.reject_shrinkage(id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;
    use crate::services::list_view::ListView;

    #[tokio::test]
    async fn approving_refetches_the_queue_once() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "mermas_pendientes": []}));
        transport.push(200, json!({"success": true, "message": "Merma aprobada"}));
        transport.push(200, json!({"success": true, "mermas_pendientes": []}));
        let api = OperationsApi::new(client(&transport, session_with_cargo(2)));
        let mut view = ListView::new(PendingShrinkageSource::new(api));
        view.load().await.unwrap();

        let notice = view.approve(12).await;

        assert!(notice.is_success());
        assert_eq!(
            transport.paths(),
            vec!["jefe-bodega/mermas-pendientes/", "jefe-bodega/aprobar-merma/12/", "jefe-bodega/mermas-pendientes/"]
        );
    }

    #[tokio::test]
    async fn deleting_an_intake_refetches_once() {
        let transport = RecordingTransport::new();
        transport.push(200, json!({"success": true, "ingresos": []}));
        transport.push(200, json!({"success": true}));
        transport.push(200, json!({"success": true, "ingresos": []}));
        let api = OperationsApi::new(client(&transport, admin_session()));
        let mut view = ListView::new(IntakeSource::new(api));
        view.load().await.unwrap();

        let notice = view.delete(5).await;

        assert_eq!(notice.message, "Ingreso eliminado correctamente");
        assert_eq!(transport.requests()[1].method, reqwest::Method::DELETE);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn edit_shows_the_persisted_values_after_refetch() {
        let transport = RecordingTransport::new();
        let driver = |nombre: &str| {
            json!({"success": true, "conductores": [{
                "id": 3, "nombre": nombre, "apellido": "Muñoz", "rut": "12345678-5",
                "telefono": null, "fecha_nacimiento": "1990-04-02", "activo": true
            }]})
        };
        transport.push(200, driver("Pedro"));
        transport.push(200, json!({"success": true, "message": "Conductor actualizado"}));
        transport.push(200, driver("Pablo"));
        let api = CrmApi::new(client(&transport, admin_session()));
        let mut view = ListView::new(DriverSource::new(api));
        view.load().await.unwrap();

        let payload = DriverPayload {
            nombre: "Pablo".into(),
            apellido: "Muñoz".into(),
            rut: "12345678-5".into(),
            telefono: None,
            fecha_nacimiento: "1990-04-02".into(),
        };
        let notice = view.edit(3, &payload).await;

        assert_eq!(notice.message, "Conductor actualizado");
        assert_eq!(transport.paths()[1], "admin/conductores/3/editar/");
        assert_eq!(transport.requests()[1].body.as_ref().unwrap()["nombre"], "Pablo");
        assert_eq!(view.rows()[0].nombre, "Pablo");
    }
}

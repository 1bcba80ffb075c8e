// src/handlers.rs

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::{
    cli::Command,
    common::error::AppError,
    config::AppState,
    forms::Submission,
    models::crm::PartnerKind,
    services::list_view::{ListSource, ListView},
};

pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod documents;
pub mod inventory;
pub mod operations;
pub mod output;
pub mod users;

pub use output::Output;

/// Despacha un comando. Cada rama pasa por el guardián de rutas antes de tocar la red.
pub async fn run(command: Command, state: &AppState) -> Result<Output, AppError> {
    match command {
        Command::Login { rut, password } => auth::login(state, rut, password).await,
        Command::Logout => auth::logout(state).await,
        Command::Whoami => auth::whoami(state),
        Command::Menu => auth::menu(state),
        Command::Password(cmd) => auth::password(state, cmd).await,
        Command::Clientes(cmd) => crm::partners(state, PartnerKind::Cliente, cmd).await,
        Command::Proveedores(cmd) => crm::partners(state, PartnerKind::Proveedor, cmd).await,
        Command::Conductores(cmd) => crm::drivers(state, cmd).await,
        Command::Usuarios(cmd) => users::users(state, cmd).await,
        Command::Productos(cmd) => inventory::products(state, cmd).await,
        Command::Inventario(cmd) => inventory::inventory(state, cmd).await,
        Command::Reglas(cmd) => inventory::stock_rules(state, cmd).await,
        Command::Ingresos(cmd) => operations::intakes(state, cmd).await,
        Command::Salidas(cmd) => operations::dispatches(state, cmd).await,
        Command::Mermas(cmd) => operations::shrinkage(state, cmd).await,
        Command::Comparacion(cmd) => dashboard::comparison(state, cmd).await,
        Command::Historial(args) => dashboard::ledger(state, args).await,
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Abre una vista de listado con su primera carga, con la política de recarga configurada.
pub(crate) async fn loaded<S: ListSource>(state: &AppState, source: S) -> Result<ListView<S>, AppError> {
    let mut view = ListView::new(source).with_policy(state.config.refresh_policy);
    view.load().await?;
    Ok(view)
}

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::Api { status: 404, message: format!("No se encontró el registro {}", id) }
}

/// Algunos formularios recargan su listado tras un registro exitoso, con una pausa.
pub(crate) async fn settle<S: ListSource>(submission: Submission, source: S) -> Output {
    if let (true, Some(delay)) = (submission.succeeded(), submission.reload_after) {
        reload_later(delay, source).await;
    }
    Output::Notice(submission.notice)
}

async fn reload_later<S: ListSource>(delay: Duration, source: S) {
    tokio::time::sleep(delay).await;
    let mut view = ListView::new(source);
    if let Err(e) = view.load().await {
        tracing::warn!("⚠️ No se pudo recargar {}: {}", view.source().label(), e);
    }
}

/// `a:b:c` → campos recortados; los que faltan quedan vacíos.
pub(crate) fn split_line<const N: usize>(raw: &str) -> [String; N] {
    let mut parts = raw.splitn(N, ':').map(|p| p.trim().to_string());
    std::array::from_fn(|_| parts.next().unwrap_or_default())
}

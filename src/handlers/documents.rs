// src/handlers/documents.rs

use crate::{
    common::{error::AppError, notice::Notice},
    config::AppState,
    handlers::Output,
    services::report_layout::LaidOutReport,
};

/// Escribe el PDF en la carpeta de exportación y avisa la ruta.
pub async fn export(state: &AppState, report: LaidOutReport) -> Result<Output, AppError> {
    let path = state.documents.export(&report).await?;
    Ok(Notice::success(format!("PDF generado: {}", path.display())).into())
}

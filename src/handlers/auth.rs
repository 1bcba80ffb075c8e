// src/handlers/auth.rs

use crate::{
    cli::{NewPasswordArgs, PasswordCommand},
    common::{error::AppError, notice::Notice},
    config::AppState,
    forms::{LoginDraft, PasswordDraft, PasswordPurpose, RecoveryDraft},
    handlers::{Output, output},
    routes,
};

pub async fn login(state: &AppState, rut: String, password: String) -> Result<Output, AppError> {
    let draft = LoginDraft { rut, password };
    let user = draft.login(&state.auth, &state.store).await?;

    let role = user.role();
    Ok(Notice::success(format!(
        "Bienvenido {} ({}). Inicio: {}",
        user.full_name(),
        role,
        routes::landing_path(role)
    ))
    .into())
}

/// Avisa al backend si hay token y borra la sesión local de todos modos.
pub async fn logout(state: &AppState) -> Result<Output, AppError> {
    if state.session.token().is_none() {
        state.store.clear().await?;
        return Ok(Notice::info("No hay una sesión activa").into());
    }

    if let Err(e) = state.auth.logout().await {
        tracing::warn!("⚠️ El backend no confirmó el cierre de sesión: {}", e);
    }
    state.store.clear().await?;
    tracing::info!("✅ Sesión cerrada");
    Ok(Notice::success("Sesión cerrada").into())
}

pub fn whoami(state: &AppState) -> Result<Output, AppError> {
    let user = state.session.user().ok_or(AppError::NotAuthenticated)?;
    let role = user.role();
    Ok(Output::Text(format!("{} · {} · {}", user.full_name(), role, routes::landing_path(role))))
}

pub fn menu(state: &AppState) -> Result<Output, AppError> {
    state.session.require_token()?;
    let role = state.session.role();
    let group = routes::group_for(role).ok_or(AppError::NotAuthenticated)?;
    Ok(Output::Listing(output::rows(format!("Menú de {} ({})", role, group.base), group.items)))
}

pub async fn password(state: &AppState, cmd: PasswordCommand) -> Result<Output, AppError> {
    let submission = match cmd {
        PasswordCommand::Recuperar { rut } => RecoveryDraft { rut }.submit(&state.auth).await,
        PasswordCommand::Resetear(args) => draft(args).submit(&state.auth, PasswordPurpose::Reset).await,
        PasswordCommand::Crear(args) => draft(args).submit(&state.auth, PasswordPurpose::Create).await,
    };
    Ok(submission.notice.into())
}

fn draft(args: NewPasswordArgs) -> PasswordDraft {
    PasswordDraft { token: args.token, password: args.password, confirmacion: args.confirmar }
}

// src/handlers/users.rs

use crate::{
    cli::UserCommand,
    common::error::AppError,
    config::AppState,
    forms::UserDraft,
    handlers::{Output, documents, loaded, now, output, today},
    routes::{self, Page},
    services::{reports, sources::UserSource},
};

pub async fn users(state: &AppState, cmd: UserCommand) -> Result<Output, AppError> {
    let item = routes::guard(&state.session, Page::Users)?;
    let source = || UserSource::new(state.users.clone());

    match cmd {
        UserCommand::Listar(args) => {
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        UserCommand::Pdf(args) => {
            // El PDF lleva todo lo filtrado, no solo la página visible
            let view = loaded(state, source()).await?;
            let filtered = view.visible(&args.query().unpaged());
            documents::export(state, reports::users_report(&filtered.rows, now())).await
        }
        UserCommand::Toggle { id } => {
            let mut view = loaded(state, source()).await?;
            Ok(view.toggle(id).await.into())
        }
        UserCommand::Registrar(args) => {
            let mut draft = UserDraft {
                nombre: args.nombre,
                apellido: args.apellido,
                rut: args.rut,
                fecha_nacimiento: args.fecha_nacimiento,
                email: args.email,
                cargo: args.cargo,
            };
            Ok(draft.submit(&state.users, today()).await.notice.into())
        }
    }
}

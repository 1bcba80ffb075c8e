// src/handlers/crm.rs

use crate::{
    cli::{DriverArgs, DriverCommand, DriverEditArgs, PartnerArgs, PartnerCommand, PartnerEditArgs},
    common::error::AppError,
    config::AppState,
    forms::{DriverDraft, DriverEdit, PartnerDraft, PartnerEdit, TipoPersona},
    handlers::{Output, loaded, not_found, output, settle, today},
    models::crm::PartnerKind,
    routes::{self, Page},
    services::sources::{DriverSource, PartnerSource},
};

// --- 1. Clientes y proveedores ---

pub async fn partners(state: &AppState, kind: PartnerKind, cmd: PartnerCommand) -> Result<Output, AppError> {
    let page = match kind {
        PartnerKind::Cliente => Page::Clients,
        PartnerKind::Proveedor => Page::Suppliers,
    };
    let item = routes::guard(&state.session, page)?;
    let source = || PartnerSource::new(state.crm.clone(), kind);

    match cmd {
        PartnerCommand::Listar(args) => {
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        PartnerCommand::Toggle { id } => {
            let mut view = loaded(state, source()).await?;
            Ok(view.toggle(id).await.into())
        }
        PartnerCommand::Editar(args) => {
            let mut view = loaded(state, source()).await?;
            let row = view.rows().iter().find(|p| p.id == args.id).ok_or_else(|| not_found(args.id))?;
            let id = row.id;
            let edit = edit_partner(PartnerEdit::from(row), args)?;
            let payload = edit.payload()?;
            Ok(view.edit(id, &payload).await.into())
        }
        PartnerCommand::Registrar(args) => {
            let mut draft = partner_draft(args);
            let submission = draft.submit(&state.crm, kind, state.config.reload_delay).await;
            Ok(settle(submission, source()).await)
        }
    }
}

fn partner_draft(args: PartnerArgs) -> PartnerDraft {
    PartnerDraft {
        tipo_persona: TipoPersona::parse(&args.tipo),
        nombre: args.nombre,
        rut: args.rut,
        telefono: args.telefono,
        email: args.email,
        direccion: args.direccion,
        region: args.region,
    }
}

/// Solo se reemplazan los campos que vienen en la línea de comandos.
fn edit_partner(mut edit: PartnerEdit, args: PartnerEditArgs) -> Result<PartnerEdit, AppError> {
    if let Some(nombre) = args.nombre {
        edit.nombre = nombre;
    }
    if let Some(rut) = args.rut {
        edit.rut = rut;
    }
    if let Some(telefono) = args.telefono {
        edit.telefono = telefono;
    }
    if let Some(email) = args.email {
        edit.email = email;
    }
    if let Some(direccion) = args.direccion {
        edit.direccion = direccion;
    }
    if let Some(tipo) = args.tipo {
        let tipo = TipoPersona::parse(&tipo).ok_or_else(|| AppError::Api {
            status: 400,
            message: "Tipo de persona inválido (juridica o natural)".into(),
        })?;
        edit.es_persona_juridica = tipo == TipoPersona::Juridica;
    }
    Ok(edit)
}

// --- 2. Conductores ---

pub async fn drivers(state: &AppState, cmd: DriverCommand) -> Result<Output, AppError> {
    let item = routes::guard(&state.session, Page::Drivers)?;
    let source = || DriverSource::new(state.crm.clone());

    match cmd {
        DriverCommand::Listar(args) => {
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        DriverCommand::Toggle { id } => {
            let mut view = loaded(state, source()).await?;
            Ok(view.toggle(id).await.into())
        }
        DriverCommand::Editar(args) => {
            let mut view = loaded(state, source()).await?;
            let row = view.rows().iter().find(|d| d.id == args.id).ok_or_else(|| not_found(args.id))?;
            let id = row.id;
            let edit = edit_driver(DriverEdit::from(row), args);
            let payload = edit.payload(today())?;
            Ok(view.edit(id, &payload).await.into())
        }
        DriverCommand::Registrar(args) => {
            let mut draft = driver_draft(args);
            let submission = draft.submit(&state.crm, today(), state.config.reload_delay).await;
            Ok(settle(submission, source()).await)
        }
    }
}

fn driver_draft(args: DriverArgs) -> DriverDraft {
    DriverDraft {
        nombre: args.nombre,
        apellido: args.apellido,
        rut: args.rut,
        telefono: args.telefono,
        fecha_nacimiento: args.fecha_nacimiento,
    }
}

fn edit_driver(mut edit: DriverEdit, args: DriverEditArgs) -> DriverEdit {
    if let Some(nombre) = args.nombre {
        edit.nombre = nombre;
    }
    if let Some(apellido) = args.apellido {
        edit.apellido = apellido;
    }
    if let Some(rut) = args.rut {
        edit.rut = rut;
    }
    if let Some(telefono) = args.telefono {
        edit.telefono = telefono;
    }
    if let Some(fecha) = args.fecha_nacimiento {
        edit.fecha_nacimiento = fecha;
    }
    edit
}

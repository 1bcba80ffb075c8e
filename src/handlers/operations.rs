// src/handlers/operations.rs

use crate::{
    cli::{DispatchCommand, IntakeCommand, ShrinkageCommand},
    common::{error::AppError, format::format_clp},
    config::AppState,
    forms::{
        DispatchDraft, DispatchReferences, IntakeDraft, IntakeLineDraft, IntakeReferences, LotLineDraft,
        ShrinkageDraft, ShrinkageReferences,
    },
    handlers::{Output, documents, loaded, not_found, now, output, split_line, today},
    middleware::rbac::{AdministradorOnly, RequireRole},
    routes::{self, Page},
    services::{
        reports,
        sources::{DispatchSource, IntakeSource, PendingShrinkageSource, ShrinkageSource},
    },
};

/// `producto:lotes:codigo_lote:YYYY-MM-DD`
fn intake_line(raw: &str) -> IntakeLineDraft {
    let [producto_id, cantidad_lotes, codigo_lote, fecha_vencimiento] = split_line::<4>(raw);
    IntakeLineDraft { producto_id, cantidad_lotes, codigo_lote, fecha_vencimiento }
}

/// `lote:cantidad`
fn lot_line(raw: &str) -> LotLineDraft {
    let [lote_id, cantidad] = split_line::<2>(raw);
    LotLineDraft { lote_id, cantidad }
}

// --- 1. Ingresos ---

pub async fn intakes(state: &AppState, cmd: IntakeCommand) -> Result<Output, AppError> {
    let source = || IntakeSource::new(state.operations.clone());

    match cmd {
        IntakeCommand::Listar(args) => {
            let item = routes::guard(&state.session, Page::Intakes)?;
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        IntakeCommand::Pdf(args) => {
            routes::guard(&state.session, Page::Intakes)?;
            let view = loaded(state, source()).await?;
            let filtered = view.visible(&args.query().unpaged());
            documents::export(state, reports::intakes_report(&filtered.rows, now())).await
        }
        IntakeCommand::Detalle { id, pdf } => {
            routes::guard(&state.session, Page::Intakes)?;
            let view = loaded(state, source()).await?;
            let intake = view.rows().iter().find(|i| i.id == id).ok_or_else(|| not_found(id))?;
            if pdf {
                return documents::export(state, reports::intake_detail(intake)).await;
            }
            let mut listing = output::rows(
                format!("Ingreso #{} · {} {} · {}", intake.id, intake.fecha_ingreso, intake.hora_ingreso, intake.proveedor),
                &intake.productos,
            );
            listing.footer = Some(format!("Valor total: {}", format_clp(intake.valor_total_ingreso)));
            Ok(Output::Listing(listing))
        }
        IntakeCommand::Eliminar { id } => {
            routes::guard(&state.session, Page::Intakes)?;
            let mut view = loaded(state, source()).await?;
            Ok(view.delete(id).await.into())
        }
        IntakeCommand::Registrar(args) => {
            routes::guard(&state.session, Page::IntakeForm)?;
            let mut draft = IntakeDraft {
                proveedor_id: args.proveedor,
                descripcion: args.descripcion,
                lineas: args.lineas.iter().map(|l| intake_line(l)).collect(),
            };
            Ok(draft.submit(&state.operations, today()).await.notice.into())
        }
        IntakeCommand::Referencias => {
            routes::guard(&state.session, Page::IntakeForm)?;
            let refs = IntakeReferences::load(&state.crm, &state.inventory).await?;
            Ok(Output::Listings(vec![
                output::rows("Proveedores", &refs.proveedores),
                output::rows("Productos", &refs.productos),
            ]))
        }
    }
}

// --- 2. Salidas ---

pub async fn dispatches(state: &AppState, cmd: DispatchCommand) -> Result<Output, AppError> {
    let source = || DispatchSource::new(state.operations.clone());

    match cmd {
        DispatchCommand::Listar(args) => {
            let item = routes::guard(&state.session, Page::Dispatches)?;
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        DispatchCommand::Pdf(args) => {
            routes::guard(&state.session, Page::Dispatches)?;
            let view = loaded(state, source()).await?;
            let filtered = view.visible(&args.query().unpaged());
            documents::export(state, reports::dispatches_report(&filtered.rows, now())).await
        }
        DispatchCommand::Detalle { id, pdf } => {
            routes::guard(&state.session, Page::Dispatches)?;
            let view = loaded(state, source()).await?;
            let dispatch = view.rows().iter().find(|d| d.id == id).ok_or_else(|| not_found(id))?;
            if pdf {
                return documents::export(state, reports::dispatch_detail(dispatch)).await;
            }
            let mut listing = output::rows(
                format!(
                    "Salida #{} · {} {} · {} · {}",
                    dispatch.id, dispatch.fecha_salida, dispatch.hora_salida, dispatch.cliente, dispatch.conductor
                ),
                &dispatch.productos,
            );
            listing.footer = Some(format!("Valor total: {}", format_clp(dispatch.valor_total_salida)));
            Ok(Output::Listing(listing))
        }
        DispatchCommand::Eliminar { id } => {
            routes::guard(&state.session, Page::Dispatches)?;
            let mut view = loaded(state, source()).await?;
            Ok(view.delete(id).await.into())
        }
        DispatchCommand::Registrar(args) => {
            routes::guard(&state.session, Page::DispatchForm)?;
            let mut refs = DispatchReferences::load(&state.crm, &state.inventory).await?;
            let mut draft = DispatchDraft {
                cliente_id: args.cliente,
                conductor_id: args.conductor,
                descripcion: args.descripcion,
                lineas: args.lineas.iter().map(|l| lot_line(l)).collect(),
            };
            let submission = draft.submit(&state.operations, &state.inventory, &mut refs).await;
            Ok(submission.notice.into())
        }
        DispatchCommand::Referencias => {
            routes::guard(&state.session, Page::DispatchForm)?;
            let refs = DispatchReferences::load(&state.crm, &state.inventory).await?;
            Ok(Output::Listings(vec![
                output::rows("Clientes", &refs.clientes),
                output::rows("Conductores", &refs.conductores),
                output::rows("Lotes", &refs.lotes),
            ]))
        }
    }
}

// --- 3. Mermas ---

pub async fn shrinkage(state: &AppState, cmd: ShrinkageCommand) -> Result<Output, AppError> {
    let history = || ShrinkageSource::new(state.operations.clone());
    let pending = || PendingShrinkageSource::new(state.operations.clone());

    match cmd {
        ShrinkageCommand::Listar(args) => {
            let item = routes::guard(&state.session, Page::ShrinkageHistory)?;
            let view = loaded(state, history()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        ShrinkageCommand::Pdf(args) => {
            routes::guard(&state.session, Page::ShrinkageHistory)?;
            let view = loaded(state, history()).await?;
            let filtered = view.visible(&args.query().unpaged());
            documents::export(state, reports::shrinkage_report(&filtered.rows, now())).await
        }
        ShrinkageCommand::Detalle { id, pdf } => {
            routes::guard(&state.session, Page::ShrinkageHistory)?;
            let view = loaded(state, history()).await?;
            let merma = view.rows().iter().find(|m| m.id == id).ok_or_else(|| not_found(id))?;
            if pdf {
                return documents::export(state, reports::shrinkage_detail(merma)).await;
            }
            let mut listing = output::rows(
                format!(
                    "Merma #{} · {} {} · {} · {}",
                    merma.id,
                    merma.fecha_registro,
                    merma.hora_registro,
                    merma.categoria_merma,
                    merma.estado.as_str()
                ),
                &merma.productos,
            );
            listing.footer = Some(format!(
                "Valor total: {} · Observaciones: {}",
                format_clp(merma.valor_total_merma),
                merma.observaciones
            ));
            Ok(Output::Listing(listing))
        }
        ShrinkageCommand::Eliminar { id } => {
            // El jefe de bodega ve el historial pero no puede borrar
            routes::guard(&state.session, Page::ShrinkageHistory)?;
            RequireRole::<AdministradorOnly>::check(&state.session)?;
            let mut view = loaded(state, history()).await?;
            Ok(view.delete(id).await.into())
        }
        ShrinkageCommand::Registrar(args) => {
            routes::guard(&state.session, Page::ShrinkageForm)?;
            let mut refs = ShrinkageReferences::load(&state.operations, &state.inventory).await?;
            let mut draft = ShrinkageDraft {
                categoria_merma_id: args.categoria,
                observaciones: args.observaciones,
                lineas: args.lineas.iter().map(|l| lot_line(l)).collect(),
            };
            let submission = draft
                .submit(&state.operations, &state.inventory, state.session.role(), &mut refs)
                .await;
            Ok(submission.notice.into())
        }
        ShrinkageCommand::Referencias => {
            routes::guard(&state.session, Page::ShrinkageForm)?;
            let refs = ShrinkageReferences::load(&state.operations, &state.inventory).await?;
            Ok(Output::Listings(vec![
                output::rows("Categorías de merma", &refs.categorias),
                output::rows("Lotes", &refs.lotes),
            ]))
        }
        ShrinkageCommand::Pendientes(args) => {
            let item = routes::guard(&state.session, Page::PendingShrinkage)?;
            let view = loaded(state, pending()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        ShrinkageCommand::Aprobar { id } => {
            routes::guard(&state.session, Page::PendingShrinkage)?;
            let mut view = loaded(state, pending()).await?;
            Ok(view.approve(id).await.into())
        }
        ShrinkageCommand::Rechazar { id } => {
            routes::guard(&state.session, Page::PendingShrinkage)?;
            let mut view = loaded(state, pending()).await?;
            Ok(view.reject(id).await.into())
        }
    }
}

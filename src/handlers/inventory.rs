// src/handlers/inventory.rs

use crate::{
    cli::{InventoryCommand, ProductArgs, ProductCommand, ProductEditArgs, StockRuleCommand},
    common::error::AppError,
    config::AppState,
    forms::{ProductDraft, ProductEdit, ProductFields, ProductReferences, StockRuleDraft, StockRuleEdit},
    handlers::{Output, documents, loaded, not_found, now, output},
    routes::{self, Page},
    services::{
        reports,
        sources::{InventorySource, ProductSource, StockRuleSource},
    },
};

// =========================================================================
//  PRODUCTOS
// =========================================================================

pub async fn products(state: &AppState, cmd: ProductCommand) -> Result<Output, AppError> {
    let item = routes::guard(&state.session, Page::Products)?;
    let source = || ProductSource::new(state.inventory.clone());

    match cmd {
        ProductCommand::Listar(args) => {
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        ProductCommand::Toggle { id } => {
            let mut view = loaded(state, source()).await?;
            Ok(view.toggle(id).await.into())
        }
        ProductCommand::Editar(args) => {
            let (mut view, refs) =
                tokio::try_join!(loaded(state, source()), ProductReferences::load(&state.inventory))?;
            let row = view.rows().iter().find(|p| p.id == args.id).ok_or_else(|| not_found(args.id))?;
            let mut edit = ProductEdit::new(row, &refs);
            apply_edit(&mut edit.fields, args, &refs);
            let payload = edit.payload(&refs)?;
            Ok(view.edit(edit.id, &payload).await.into())
        }
        ProductCommand::Registrar(args) => {
            let refs = ProductReferences::load(&state.inventory).await?;
            let mut draft = ProductDraft { fields: product_fields(args, &refs) };
            Ok(draft.submit(&state.inventory, &refs).await.notice.into())
        }
        ProductCommand::Referencias => {
            let refs = ProductReferences::load(&state.inventory).await?;
            Ok(Output::Listings(vec![
                output::rows("Categorías", &refs.categorias),
                output::rows("Unidades de medida", &refs.unidades),
            ]))
        }
    }
}

/// Elegir la unidad va antes que la cantidad por lote: una unidad a granel la fija en 1.
fn choose_unit(fields: &mut ProductFields, raw: &str, refs: &ProductReferences) {
    match refs.unidades.iter().find(|u| u.id.to_string() == raw.trim()) {
        Some(unit) => fields.select_unit(unit),
        None => fields.unidad_medida_id = raw.to_string(),
    }
}

fn product_fields(args: ProductArgs, refs: &ProductReferences) -> ProductFields {
    let mut fields = ProductFields {
        nombre: args.nombre,
        categoria_id: args.categoria,
        cantidad_por_lote: args.cantidad_por_lote,
        precio_unitario: args.precio,
        ..ProductFields::default()
    };
    choose_unit(&mut fields, &args.unidad, refs);
    fields
}

fn apply_edit(fields: &mut ProductFields, args: ProductEditArgs, refs: &ProductReferences) {
    if let Some(nombre) = args.nombre {
        fields.nombre = nombre;
    }
    if let Some(categoria) = args.categoria {
        fields.categoria_id = categoria;
    }
    if let Some(cantidad) = args.cantidad_por_lote {
        fields.cantidad_por_lote = cantidad;
    }
    if let Some(unidad) = args.unidad {
        choose_unit(fields, &unidad, refs);
    }
    if let Some(precio) = args.precio {
        fields.precio_unitario = precio;
    }
}

// =========================================================================
//  INVENTARIO
// =========================================================================

pub async fn inventory(state: &AppState, cmd: InventoryCommand) -> Result<Output, AppError> {
    routes::guard(&state.session, Page::Home)?;
    let view = loaded(state, InventorySource::new(state.inventory.clone())).await?;

    match cmd {
        InventoryCommand::Listar(args) => Ok(Output::Listing(output::page("Inventario", &view.visible(&args.query())))),
        InventoryCommand::Pdf(args) => {
            let filtered = view.visible(&args.query().unpaged());
            documents::export(state, reports::inventory_report(&filtered.rows, now())).await
        }
    }
}

// =========================================================================
//  REGLAS DE STOCK MÍNIMO
// =========================================================================

pub async fn stock_rules(state: &AppState, cmd: StockRuleCommand) -> Result<Output, AppError> {
    let item = routes::guard(&state.session, Page::StockRules)?;
    let source = || StockRuleSource::new(state.inventory.clone());

    match cmd {
        StockRuleCommand::Listar(args) => {
            let view = loaded(state, source()).await?;
            Ok(Output::Listing(output::page(item.title, &view.visible(&args.query()))))
        }
        StockRuleCommand::Disponibles => {
            let available = StockRuleDraft::options(&state.inventory).await?;
            Ok(Output::Listing(output::rows("Productos sin regla de stock", &available)))
        }
        StockRuleCommand::Registrar { producto, cantidad_minima } => {
            let available = StockRuleDraft::options(&state.inventory).await?;
            let mut draft = StockRuleDraft { producto_id: producto, cantidad_minima };
            Ok(draft.submit(&state.inventory, &available).await.notice.into())
        }
        StockRuleCommand::Editar { id, cantidad_minima } => {
            let mut view = loaded(state, source()).await?;
            let rule = view.rows().iter().find(|r| r.id == id).ok_or_else(|| not_found(id))?;
            let mut edit = StockRuleEdit::from(rule);
            edit.cantidad_minima = cantidad_minima;
            let payload = edit.payload()?;
            Ok(view.edit(id, &payload).await.into())
        }
        StockRuleCommand::Eliminar { id } => {
            let mut view = loaded(state, source()).await?;
            Ok(view.delete(id).await.into())
        }
    }
}

// src/routes.rs

use serde::Serialize;

use crate::{
    common::error::AppError,
    middleware::auth::SessionContext,
    models::auth::Role,
};

/// Páginas que monta cada grupo de rutas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    Home,
    IntakeForm,
    DispatchForm,
    ShrinkageForm,
    PendingShrinkage,
    ShrinkageHistory,
    ShrinkageComparison,
    Users,
    Intakes,
    Dispatches,
    Products,
    Suppliers,
    Clients,
    Drivers,
    StockRules,
    Ledger,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub path: &'static str,
    pub page: Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteGroup {
    pub base: &'static str,
    #[serde(skip)]
    pub role: Role,
    pub items: &'static [MenuItem],
}

const fn item(title: &'static str, path: &'static str, page: Page) -> MenuItem {
    MenuItem { title, path, page }
}

pub const BODEGUERO: RouteGroup = RouteGroup {
    base: "/bodeguero",
    role: Role::Bodeguero,
    items: &[
        item("Inicio", "/bodeguero", Page::Home),
        item("Ingresar producto", "/bodeguero/IngresarProducto", Page::IntakeForm),
        item("Salida producto", "/bodeguero/SalidaProducto", Page::DispatchForm),
        item("Registrar merma", "/bodeguero/RegistrarMerma", Page::ShrinkageForm),
    ],
};

pub const JEFE_BODEGA: RouteGroup = RouteGroup {
    base: "/jefebodega",
    role: Role::JefeBodega,
    items: &[
        item("Inicio", "/jefebodega", Page::Home),
        item("Ingresar producto", "/jefebodega/IngresarProducto", Page::IntakeForm),
        item("Salida producto", "/jefebodega/SalidaProducto", Page::DispatchForm),
        item("Registrar merma", "/jefebodega/RegistrarMerma", Page::ShrinkageForm),
        item("Mermas pendientes", "/jefebodega/RegistrosMermas", Page::PendingShrinkage),
        item("Registro de mermas", "/jefebodega/RegistroMermas", Page::ShrinkageHistory),
        item("Comparación de mermas", "/jefebodega/ComparacionMermas", Page::ShrinkageComparison),
    ],
};

pub const ADMINISTRADOR: RouteGroup = RouteGroup {
    base: "/administrador",
    role: Role::Administrador,
    items: &[
        item("Inicio", "/administrador", Page::Home),
        item("Usuarios", "/administrador/Usuarios", Page::Users),
        item("Ingresos", "/administrador/Ingresos", Page::Intakes),
        item("Salidas", "/administrador/Salidas", Page::Dispatches),
        item("Mermas", "/administrador/Mermas", Page::ShrinkageHistory),
        item("Productos", "/administrador/Productos", Page::Products),
        item("Proveedores", "/administrador/Proveedores", Page::Suppliers),
        item("Clientes", "/administrador/Clientes", Page::Clients),
        item("Conductores", "/administrador/Conductores", Page::Drivers),
        item("Reglas de stock", "/administrador/ReglasStock", Page::StockRules),
        item("Comparación de mermas", "/administrador/ComparacionMermas", Page::ShrinkageComparison),
        item("Blockchain", "/administrador/Blockchain", Page::Ledger),
    ],
};

pub const AUDITOR: RouteGroup = RouteGroup {
    base: "/auditor",
    role: Role::Auditor,
    items: &[item("Inicio", "/auditor", Page::Dashboard)],
};

pub fn group_for(role: Role) -> Option<&'static RouteGroup> {
    match role {
        Role::Bodeguero => Some(&BODEGUERO),
        Role::JefeBodega => Some(&JEFE_BODEGA),
        Role::Administrador => Some(&ADMINISTRADOR),
        Role::Auditor => Some(&AUDITOR),
        Role::None => None,
    }
}

/// Destino después del login. Cualquier cargo desconocido cae en `/administrador`,
/// cuyo guardián lo devuelve al login.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Bodeguero => BODEGUERO.base,
        Role::JefeBodega => JEFE_BODEGA.base,
        Role::Auditor => AUDITOR.base,
        _ => ADMINISTRADOR.base,
    }
}

/// Guardián de cada comando: la página debe estar en el menú del cargo de la sesión.
pub fn guard(session: &SessionContext, page: Page) -> Result<MenuItem, AppError> {
    let role = session.role();
    if session.token().is_none() || role == Role::None {
        return Err(AppError::NotAuthenticated);
    }
    let group = group_for(role).ok_or(AppError::NotAuthenticated)?;
    match group.items.iter().find(|item| item.page == page) {
        Some(found) => Ok(*found),
        None => {
            tracing::warn!("🚫 {:?} no está en el menú de {}", page, group.base);
            Err(AppError::Forbidden(role))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::rbac::{AdministradorOnly, RequireRole, RoleDef};
    use crate::models::auth::SessionUser;

    fn session(cargo: i64) -> SessionContext {
        SessionContext::authenticated(SessionUser {
            token: "t".into(),
            cargo,
            nombre: "N".into(),
            apellido: "A".into(),
        })
    }

    #[test]
    fn landing_follows_cargo() {
        assert_eq!(landing_path(Role::Bodeguero), "/bodeguero");
        assert_eq!(landing_path(Role::JefeBodega), "/jefebodega");
        assert_eq!(landing_path(Role::Auditor), "/auditor");
        assert_eq!(landing_path(Role::Administrador), "/administrador");
        assert_eq!(landing_path(Role::None), "/administrador");
    }

    #[test]
    fn guard_uses_the_session_menu() {
        assert_eq!(guard(&session(2), Page::PendingShrinkage).unwrap().path, "/jefebodega/RegistrosMermas");
        assert_eq!(guard(&session(4), Page::ShrinkageHistory).unwrap().title, "Mermas");
        assert!(matches!(guard(&session(1), Page::Users), Err(AppError::Forbidden(Role::Bodeguero))));
        assert!(matches!(guard(&session(0), Page::Home), Err(AppError::NotAuthenticated)));
    }

    fn guard_matches_sidebar<T: RoleDef>(page: Page) {
        for cargo in 1..=4 {
            let s = session(cargo);
            let in_sidebar = group_for(s.role()).is_some_and(|g| g.items.iter().any(|i| i.page == page));
            assert_eq!(
                RequireRole::<T>::check(&s).is_ok(),
                in_sidebar,
                "cargo {} y página {:?}",
                cargo,
                page
            );
        }
    }

    #[test]
    fn guards_agree_with_sidebars() {
        guard_matches_sidebar::<AdministradorOnly>(Page::Users);
        guard_matches_sidebar::<AdministradorOnly>(Page::Ledger);
    }
}

// src/cli.rs

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::AppConfig,
    services::filters::{DEFAULT_PAGE_SIZE, ListQuery, SortSpec},
};

#[derive(Debug, Parser)]
#[command(name = "bodega", version, about = "Consola de administración de bodega")]
pub struct Cli {
    /// URL base de la API (sobrescribe BODEGA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Archivo de sesión (sobrescribe BODEGA_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Carpeta donde se guardan los PDF (sobrescribe BODEGA_EXPORT_DIR)
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Imprime JSON en vez de tablas
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Las opciones de la línea de comandos ganan sobre el entorno.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(path) = &self.session_file {
            config.session_file = path.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inicia sesión y guarda el token
    Login {
        #[arg(long)]
        rut: String,
        #[arg(long, env = "BODEGA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Cierra la sesión
    Logout,
    /// Usuario y cargo de la sesión actual
    Whoami,
    /// Menú lateral del cargo
    Menu,
    #[command(subcommand)]
    Password(PasswordCommand),
    #[command(subcommand)]
    Clientes(PartnerCommand),
    #[command(subcommand)]
    Proveedores(PartnerCommand),
    #[command(subcommand)]
    Conductores(DriverCommand),
    #[command(subcommand)]
    Usuarios(UserCommand),
    #[command(subcommand)]
    Productos(ProductCommand),
    #[command(subcommand)]
    Inventario(InventoryCommand),
    /// Reglas de stock mínimo
    #[command(subcommand)]
    Reglas(StockRuleCommand),
    #[command(subcommand)]
    Ingresos(IntakeCommand),
    #[command(subcommand)]
    Salidas(DispatchCommand),
    #[command(subcommand)]
    Mermas(ShrinkageCommand),
    /// Comparación de mermas
    #[command(subcommand)]
    Comparacion(ComparisonCommand),
    /// Historial de movimientos (registro blockchain)
    Historial(LedgerArgs),
}

// =========================================================================
//  FILTROS DE LISTADO
// =========================================================================

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Texto libre
    #[arg(long, short = 'b')]
    pub buscar: Option<String>,
    /// Categoría ("todos" = sin filtro)
    #[arg(long)]
    pub categoria: Option<String>,
    /// Estado ("todos" = sin filtro)
    #[arg(long)]
    pub estado: Option<String>,
    /// Desde (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub desde: Option<NaiveDate>,
    /// Hasta (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub hasta: Option<NaiveDate>,
    /// Columna de orden; `-columna` para descendente
    #[arg(long, allow_hyphen_values = true)]
    pub orden: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub pagina: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub por_pagina: usize,
}

impl ListArgs {
    pub fn query(&self) -> ListQuery {
        ListQuery {
            search: self.buscar.clone(),
            category: self.categoria.clone(),
            status: self.estado.clone(),
            from: self.desde,
            to: self.hasta,
            sort: self.orden.as_deref().and_then(SortSpec::parse),
            page: self.pagina,
            page_size: self.por_pagina,
        }
    }
}

// =========================================================================
//  CONTRASEÑAS
// =========================================================================

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Pide el correo de recuperación
    Recuperar {
        #[arg(long)]
        rut: String,
    },
    /// Cambia la contraseña con el token del correo de recuperación
    Resetear(NewPasswordArgs),
    /// Primera contraseña de un usuario nuevo
    Crear(NewPasswordArgs),
}

#[derive(Debug, Clone, Args)]
pub struct NewPasswordArgs {
    #[arg(long)]
    pub token: String,
    #[arg(long, env = "BODEGA_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long, env = "BODEGA_NEW_PASSWORD_CONFIRM", hide_env_values = true)]
    pub confirmar: String,
}

// =========================================================================
//  CLIENTES / PROVEEDORES / CONDUCTORES / USUARIOS
// =========================================================================

#[derive(Debug, Subcommand)]
pub enum PartnerCommand {
    Listar(ListArgs),
    /// Activa o desactiva según el estado actual
    Toggle { id: i64 },
    Editar(PartnerEditArgs),
    Registrar(PartnerArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct PartnerArgs {
    /// juridica | natural
    #[arg(long, default_value = "")]
    pub tipo: String,
    #[arg(long, default_value = "")]
    pub nombre: String,
    #[arg(long, default_value = "")]
    pub rut: String,
    #[arg(long, default_value = "")]
    pub telefono: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub direccion: String,
    #[arg(long, default_value = "")]
    pub region: String,
}

#[derive(Debug, Clone, Args)]
pub struct PartnerEditArgs {
    pub id: i64,
    #[arg(long)]
    pub nombre: Option<String>,
    #[arg(long)]
    pub rut: Option<String>,
    #[arg(long)]
    pub telefono: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub direccion: Option<String>,
    /// juridica | natural
    #[arg(long)]
    pub tipo: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    Listar(ListArgs),
    Toggle { id: i64 },
    Editar(DriverEditArgs),
    Registrar(DriverArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct DriverArgs {
    #[arg(long, default_value = "")]
    pub nombre: String,
    #[arg(long, default_value = "")]
    pub apellido: String,
    #[arg(long, default_value = "")]
    pub rut: String,
    #[arg(long, default_value = "")]
    pub telefono: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub fecha_nacimiento: String,
}

#[derive(Debug, Clone, Args)]
pub struct DriverEditArgs {
    pub id: i64,
    #[arg(long)]
    pub nombre: Option<String>,
    #[arg(long)]
    pub apellido: Option<String>,
    #[arg(long)]
    pub rut: Option<String>,
    #[arg(long)]
    pub telefono: Option<String>,
    #[arg(long)]
    pub fecha_nacimiento: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Listar(ListArgs),
    /// Exporta lo filtrado a PDF
    Pdf(ListArgs),
    Toggle { id: i64 },
    Registrar(UserArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct UserArgs {
    #[arg(long, default_value = "")]
    pub nombre: String,
    #[arg(long, default_value = "")]
    pub apellido: String,
    #[arg(long, default_value = "")]
    pub rut: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub fecha_nacimiento: String,
    #[arg(long, default_value = "")]
    pub email: String,
    /// 1 = Bodeguero, 2 = Jefe de bodega, 3 = Auditor
    #[arg(long, default_value = "")]
    pub cargo: String,
}

// =========================================================================
//  PRODUCTOS / INVENTARIO / REGLAS
// =========================================================================

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    Listar(ListArgs),
    Toggle { id: i64 },
    Editar(ProductEditArgs),
    Registrar(ProductArgs),
    /// Categorías y unidades de medida disponibles
    Referencias,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    #[arg(long, default_value = "")]
    pub nombre: String,
    /// Id de la categoría
    #[arg(long, default_value = "")]
    pub categoria: String,
    /// Id de la unidad de medida
    #[arg(long, default_value = "")]
    pub unidad: String,
    #[arg(long, default_value = "")]
    pub cantidad_por_lote: String,
    #[arg(long, default_value = "")]
    pub precio: String,
}

#[derive(Debug, Clone, Args)]
pub struct ProductEditArgs {
    pub id: i64,
    #[arg(long)]
    pub nombre: Option<String>,
    #[arg(long)]
    pub categoria: Option<String>,
    #[arg(long)]
    pub unidad: Option<String>,
    #[arg(long)]
    pub cantidad_por_lote: Option<String>,
    #[arg(long)]
    pub precio: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    Listar(ListArgs),
    Pdf(ListArgs),
}

#[derive(Debug, Subcommand)]
pub enum StockRuleCommand {
    Listar(ListArgs),
    /// Productos que aún no tienen regla
    Disponibles,
    Registrar {
        #[arg(long, default_value = "")]
        producto: String,
        #[arg(long, default_value = "")]
        cantidad_minima: String,
    },
    Editar {
        id: i64,
        #[arg(long, default_value = "")]
        cantidad_minima: String,
    },
    Eliminar { id: i64 },
}

// =========================================================================
//  MOVIMIENTOS
// =========================================================================

#[derive(Debug, Subcommand)]
pub enum IntakeCommand {
    Listar(ListArgs),
    Pdf(ListArgs),
    /// Detalle de un ingreso; con --pdf lo exporta
    Detalle {
        id: i64,
        #[arg(long)]
        pdf: bool,
    },
    Eliminar { id: i64 },
    Registrar(IntakeArgs),
    /// Proveedores y productos del formulario
    Referencias,
}

#[derive(Debug, Clone, Default, Args)]
pub struct IntakeArgs {
    #[arg(long, default_value = "")]
    pub proveedor: String,
    #[arg(long, default_value = "")]
    pub descripcion: String,
    /// producto:lotes:codigo_lote:YYYY-MM-DD (repetible, máximo 10)
    #[arg(long = "linea")]
    pub lineas: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum DispatchCommand {
    Listar(ListArgs),
    Pdf(ListArgs),
    Detalle {
        id: i64,
        #[arg(long)]
        pdf: bool,
    },
    Eliminar { id: i64 },
    Registrar(DispatchArgs),
    /// Clientes, conductores y lotes del formulario
    Referencias,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DispatchArgs {
    #[arg(long, default_value = "")]
    pub cliente: String,
    #[arg(long, default_value = "")]
    pub conductor: String,
    #[arg(long, default_value = "")]
    pub descripcion: String,
    /// lote:cantidad (repetible, máximo 10)
    #[arg(long = "linea")]
    pub lineas: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum ShrinkageCommand {
    Listar(ListArgs),
    Pdf(ListArgs),
    Detalle {
        id: i64,
        #[arg(long)]
        pdf: bool,
    },
    Eliminar { id: i64 },
    Registrar(ShrinkageArgs),
    /// Categorías de merma y lotes del formulario
    Referencias,
    /// Bandeja de mermas pendientes
    Pendientes(ListArgs),
    Aprobar { id: i64 },
    Rechazar { id: i64 },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShrinkageArgs {
    #[arg(long, default_value = "")]
    pub categoria: String,
    #[arg(long, default_value = "")]
    pub observaciones: String,
    /// lote:cantidad (repetible, máximo 10)
    #[arg(long = "linea")]
    pub lineas: Vec<String>,
}

// =========================================================================
//  COMPARACIONES E HISTORIAL
// =========================================================================

#[derive(Debug, Subcommand)]
pub enum ComparisonCommand {
    /// Mermas aprobadas mes a mes
    Mensual {
        #[arg(long)]
        anio: Option<i32>,
    },
    /// Dos categorías en un rango de fechas
    Categorias {
        #[arg(long, default_value = "")]
        categoria1: String,
        #[arg(long, default_value = "")]
        categoria2: String,
        #[arg(long, default_value = "")]
        desde: String,
        #[arg(long, default_value = "")]
        hasta: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LedgerArgs {
    /// Historial de un solo producto
    #[arg(long)]
    pub producto: Option<i64>,
    #[arg(long)]
    pub tipo: Option<String>,
    #[arg(long)]
    pub desde: Option<NaiveDate>,
    #[arg(long)]
    pub hasta: Option<NaiveDate>,
    #[arg(long)]
    pub pagina: Option<u64>,
    #[arg(long)]
    pub por_pagina: Option<u64>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_become_a_query() {
        let cli = Cli::parse_from([
            "bodega", "productos", "listar", "--buscar", "arroz", "--orden", "-precio_unitario", "--pagina", "2",
        ]);
        let Command::Productos(ProductCommand::Listar(args)) = cli.command else {
            panic!("comando inesperado");
        };
        let query = args.query();
        assert_eq!(query.search.as_deref(), Some("arroz"));
        assert_eq!(query.sort, SortSpec::parse("-precio_unitario"));
        assert_eq!(query.page, 2);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn global_flags_override_the_environment() {
        let cli = Cli::parse_from(["bodega", "whoami", "--api-url", "http://bodega.local/api/"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.api_url, "http://bodega.local/api/");
    }
}

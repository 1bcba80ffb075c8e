// src/forms.rs

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use validator::{ValidationError, ValidationErrors};

use crate::{
    api::Ack,
    common::{error::AppError, notice::Notice},
    models::inventory::LotRef,
};

pub mod dispatch;
pub mod driver;
pub mod intake;
pub mod partner;
pub mod password;
pub mod product;
pub mod shrinkage;
pub mod stock_rule;
pub mod user;

pub use dispatch::{DispatchDraft, DispatchReferences};
pub use driver::{DriverDraft, DriverEdit};
pub use intake::{IntakeDraft, IntakeLineDraft, IntakeReferences};
pub use partner::{PartnerDraft, PartnerEdit, REGIONES, TipoPersona};
pub use password::{LoginDraft, PasswordDraft, PasswordPurpose, RecoveryDraft};
pub use product::{ProductDraft, ProductEdit, ProductFields, ProductReferences};
pub use shrinkage::{ShrinkageDraft, ShrinkageReferences};
pub use stock_rule::{StockRuleDraft, StockRuleEdit};
pub use user::UserDraft;

/// Máximo de líneas de producto en ingresos, salidas y mermas.
pub const MAX_LINES: usize = 10;

// =========================================================================
//  PATRONES
// =========================================================================

pub static RUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9kK]$").expect("patrón de RUT"));
pub static USER_RUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{8}-[0-9kK]$").expect("patrón de RUT"));
pub static RECOVERY_RUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{7,8}-[\dkK]$").expect("patrón de RUT"));
pub static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\+?56)?[0-9]{9}$").expect("patrón de teléfono"));
pub static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("patrón de email"));

// =========================================================================
//  ERRORES POR CAMPO
// =========================================================================

pub(crate) fn field_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into().into());
    err
}

/// Acumula errores del derive y de las reglas que dependen del contexto.
pub(crate) struct Checks {
    errors: ValidationErrors,
}

impl Checks {
    pub fn new() -> Self {
        Self { errors: ValidationErrors::new() }
    }

    /// Parte de lo que dejó `Validate::validate()`.
    pub fn from_derive(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Self::new(),
            Err(errors) => Self { errors },
        }
    }

    pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.push(field, field_error(code, message));
    }

    pub fn push(&mut self, field: &'static str, error: ValidationError) {
        self.errors.add(field, error);
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.field_errors().keys().any(|k| *k == field)
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(self.errors))
        }
    }
}

/// Teléfono opcional: vacío o con el formato chileno.
pub(crate) fn optional_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || PHONE_RE.is_match(value.trim()) {
        return Ok(());
    }
    Err(field_error("regex", "Formato de teléfono inválido"))
}

fn name_rule(value: &str, label: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", format!("El {} es requerido", label)));
    }
    if value.chars().count() < 2 {
        return Err(field_error("length", format!("El {} debe tener al menos 2 caracteres", label)));
    }
    Ok(())
}

/// Nombre o apellido de persona: requerido y de al menos 2 caracteres.
pub(crate) fn person_name(checks: &mut Checks, field: &'static str, value: &str, label: &str) {
    if let Err(e) = name_rule(value, label) {
        checks.push(field, e);
    }
}

pub(crate) fn valid_nombre(value: &str) -> Result<(), ValidationError> {
    name_rule(value, "nombre")
}

pub(crate) fn valid_apellido(value: &str) -> Result<(), ValidationError> {
    name_rule(value, "apellido")
}

/// Selector obligatorio: un id positivo.
pub(crate) fn selection(value: &str, message: &'static str) -> Result<(), ValidationError> {
    match parse_id(value) {
        Some(_) => Ok(()),
        None => Err(field_error("required", message)),
    }
}

/// Texto obligatorio con su propio mensaje.
pub(crate) fn filled(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", message));
    }
    Ok(())
}

/// Número positivo escrito por el usuario.
pub(crate) fn parse_positive(raw: &str) -> Option<Decimal> {
    raw.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .ok()
        .filter(|v| *v > Decimal::ZERO)
}

/// Cantidad entera de lotes de una línea. El error es el texto que ve el usuario.
pub(crate) fn parse_count(raw: &str) -> Result<i64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Este campo es requerido");
    }
    let value = raw.replace(',', ".").parse::<Decimal>().map_err(|_| "Debe ser un número entero")?;
    if value <= Decimal::ZERO {
        return Err("Debe ser mayor a 0");
    }
    if !value.fract().is_zero() {
        return Err("Debe ser un número entero");
    }
    value.to_i64().ok_or("Debe ser un número entero")
}

/// Id de un selector; vacío o "0" es "sin seleccionar".
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

// =========================================================================
//  LÍNEAS POR LOTE (salidas y mermas)
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotLineDraft {
    pub lote_id: String,
    pub cantidad: String,
}

impl LotLineDraft {
    fn is_blank(&self) -> bool {
        self.lote_id.trim().is_empty() && self.cantidad.trim().is_empty()
    }

    /// Valida la línea `n` contra el stock de los lotes cargados.
    /// Devuelve `(lote_id, cantidad)` si es válida; las líneas vacías se ignoran.
    pub(crate) fn check(&self, n: usize, lots: &[LotRef], checks: &mut Checks) -> Option<(i64, i64)> {
        if self.is_blank() {
            return None;
        }
        let Some(lot) = parse_id(&self.lote_id).and_then(|id| lots.iter().find(|l| l.id == id)) else {
            checks.add("productos", "lote_id", format!("Línea {}: Debe seleccionar un lote", n));
            return None;
        };

        match parse_count(&self.cantidad) {
            Err(message) => {
                checks.add("productos", "cantidad", format!("Línea {}: {}", n, message));
                None
            }
            Ok(count) if Decimal::from(count) > lot.cantidad => {
                checks.add(
                    "productos",
                    "stock",
                    format!("Línea {}: No puede exceder el stock disponible ({})", n, lot.cantidad.normalize()),
                );
                None
            }
            Ok(count) => Some((lot.id, count)),
        }
    }
}

/// Líneas válidas de un formulario por lote; exige al menos una.
pub(crate) fn lot_lines(lines: &[LotLineDraft], lots: &[LotRef], checks: &mut Checks) -> Vec<(i64, i64)> {
    if lines.len() > MAX_LINES {
        checks.add("productos", "max", format!("Máximo {} productos", MAX_LINES));
    }
    let valid: Vec<(i64, i64)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.check(i + 1, lots, checks))
        .collect();
    if valid.is_empty() && !checks.has("productos") {
        checks.add("productos", "required", "Debe agregar al menos un producto");
    }
    valid
}

// =========================================================================
//  CONTROL DE FECHA
// =========================================================================

/// Selector de fecha con límites inclusivos. Lo que queda fuera del rango no se acepta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInput {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateInput {
    /// Nacimiento de un conductor: entre 100 y 18 años atrás.
    pub fn birth_date(today: NaiveDate) -> Self {
        let years_ago = |n: u32| today.checked_sub_months(Months::new(n * 12)).unwrap_or(NaiveDate::MIN);
        Self { min: years_ago(100), max: years_ago(18) }
    }

    pub fn accept(&self, raw: &str) -> Option<NaiveDate> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
        (self.min..=self.max).contains(&date).then_some(date)
    }
}

// =========================================================================
//  ENVÍO
// =========================================================================

/// Resultado de enviar un formulario.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub notice: Notice,
    /// Algunos formularios piden recargar la página después de un éxito
    pub reload_after: Option<Duration>,
}

impl Submission {
    pub fn succeeded(&self) -> bool {
        self.notice.is_success()
    }

    pub(crate) fn rejected(err: AppError) -> Self {
        Self { notice: err.to_notice(), reload_after: None }
    }
}

/// Aviso de éxito con el mensaje del backend o el de respaldo.
pub(crate) fn outcome(result: Result<Ack, AppError>, success: &str, reload_after: Option<Duration>) -> Submission {
    match result {
        Ok(ack) => {
            let notice = Notice::success(ack.message_or(success));
            tracing::info!("{}", notice);
            Submission { notice, reload_after }
        }
        Err(e) => Submission::rejected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birth_date_control_bounds_are_inclusive() {
        let today = day(2025, 6, 15);
        let input = DateInput::birth_date(today);

        assert_eq!(input.accept("2007-06-15"), Some(day(2007, 6, 15)));
        assert_eq!(input.accept("1925-06-15"), Some(day(1925, 6, 15)));
        // 18 años menos un día
        assert_eq!(input.accept("2007-06-16"), None);
        assert_eq!(input.accept("1925-06-14"), None);
        assert_eq!(input.accept("15/06/2000"), None);
    }

    #[test]
    fn patterns_match_the_console_rules() {
        assert!(RUT_RE.is_match("12345678-k"));
        assert!(!RUT_RE.is_match("12.345.678-9"));
        assert!(USER_RUT_RE.is_match("12345678-9"));
        assert!(!USER_RUT_RE.is_match("1234567-9"));
        assert!(RECOVERY_RUT_RE.is_match("1234567-K"));
        assert!(PHONE_RE.is_match("+56912345678"));
        assert!(PHONE_RE.is_match("912345678"));
        assert!(!PHONE_RE.is_match("12345"));
        assert!(EMAIL_RE.is_match("ana.rojas@Bodega.CL"));
        assert!(!EMAIL_RE.is_match("ana@bodega"));
    }

    #[test]
    fn positive_numbers_accept_comma_decimals() {
        assert_eq!(parse_positive("1,5"), Some(Decimal::new(15, 1)));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("7"), Some(7));
    }

    #[test]
    fn line_counts_must_be_positive_integers() {
        assert_eq!(parse_count("3"), Ok(3));
        assert_eq!(parse_count(""), Err("Este campo es requerido"));
        assert_eq!(parse_count("0"), Err("Debe ser mayor a 0"));
        assert_eq!(parse_count("-2"), Err("Debe ser mayor a 0"));
        assert_eq!(parse_count("1,5"), Err("Debe ser un número entero"));
    }
}

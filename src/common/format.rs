// src/common/format.rs

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Formato de moneda chilena: `$1.234.567` (sin decimales).
pub fn format_clp(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = group_thousands(&rounded.abs().trunc().to_string());
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Cantidades con separador de miles `.` y decimales con `,`.
pub fn format_quantity(value: Decimal) -> String {
    let normalized = value.normalize();
    let text = normalized.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let sign = if normalized.is_sign_negative() && !normalized.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{},{}", sign, group_thousands(&int_part), f),
        None => format!("{}{}", sign, group_thousands(&int_part)),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Fechas del backend: `dd/mm/yyyy` en los listados y `YYYY-MM-DD` en los registros de administración.
pub fn parse_display_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Corta a `max` caracteres y agrega `...` cuando el texto es más largo.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

/// Deja el texto en `width` caracteres como máximo, contando los `...`.
pub fn fit(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let cut: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

/// Porcentaje con un decimal, `0` cuando el total es cero.
pub fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    let value = Decimal::from(part as u64) * Decimal::from(100) / Decimal::from(total as u64);
    format!("{:.1}", value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

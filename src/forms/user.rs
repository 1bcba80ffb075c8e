// src/forms/user.rs

use chrono::{Datelike, NaiveDate};
use validator::{Validate, ValidationError};

use crate::{
    api::UserApi,
    common::error::AppError,
    forms::{Checks, EMAIL_RE, Submission, USER_RUT_RE, field_error, outcome, valid_apellido, valid_nombre},
    models::{auth::Role, users::RegisterUserPayload},
};

/// Cargos que se pueden asignar desde el registro (el administrador no).
pub const ASSIGNABLE_ROLES: [Role; 3] = [Role::Bodeguero, Role::JefeBodega, Role::Auditor];

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct UserDraft {
    #[validate(custom(function = "valid_nombre"))]
    pub nombre: String,

    #[validate(custom(function = "valid_apellido"))]
    pub apellido: String,

    #[validate(custom(function = "user_rut"))]
    pub rut: String,

    /// `YYYY-MM-DD`
    pub fecha_nacimiento: String,

    #[validate(custom(function = "user_email"))]
    pub email: String,

    /// Código numérico del cargo
    pub cargo: String,
}

fn user_rut(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", "El RUT es requerido"));
    }
    if !USER_RUT_RE.is_match(value) {
        return Err(field_error(
            "regex",
            "El RUT debe tener 8 dígitos, un guión y un dígito verificador (ej: 12345678-9)",
        ));
    }
    Ok(())
}

fn user_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(field_error("required", "El correo electrónico es requerido"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(field_error("regex", "Formato de correo electrónico inválido"));
    }
    Ok(())
}

/// Años cumplidos a la fecha `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

impl UserDraft {
    pub fn payload(&self, today: NaiveDate) -> Result<RegisterUserPayload, AppError> {
        // Reglas fijas por derive; la fecha y el cargo dependen del contexto
        let mut checks = Checks::from_derive(self.validate());

        let fecha = self.fecha_nacimiento.trim();
        let birth = if fecha.is_empty() {
            checks.add("fecha_nacimiento", "required", "La fecha de nacimiento es requerida");
            None
        } else {
            match NaiveDate::parse_from_str(fecha, "%Y-%m-%d") {
                Err(_) => {
                    checks.add("fecha_nacimiento", "invalid", "Fecha de nacimiento no válida");
                    None
                }
                Ok(birth) if birth >= today => {
                    checks.add("fecha_nacimiento", "past", "Debe ser una fecha pasada");
                    None
                }
                Ok(birth) if age_on(birth, today) < 18 => {
                    checks.add("fecha_nacimiento", "age", "Debe ser mayor de 18 años");
                    None
                }
                Ok(birth) if age_on(birth, today) > 120 => {
                    checks.add("fecha_nacimiento", "invalid", "Fecha de nacimiento no válida");
                    None
                }
                Ok(birth) => Some(birth),
            }
        };

        let cargo = self
            .cargo
            .trim()
            .parse::<i64>()
            .ok()
            .map(Role::from_code)
            .filter(|role| ASSIGNABLE_ROLES.contains(role));
        if cargo.is_none() {
            checks.add("cargo", "required", "El cargo es requerido");
        }

        checks.finish()?;
        match (birth, cargo) {
            (Some(birth), Some(cargo)) => Ok(RegisterUserPayload {
                nombre: self.nombre.trim().to_string(),
                apellido: self.apellido.trim().to_string(),
                fecha_nacimiento: birth.format("%Y-%m-%d").to_string(),
                rut: self.rut.trim().to_uppercase(),
                cargo: cargo.code(),
                email: self.email.trim().to_string(),
            }),
            _ => Err(AppError::InternalServerError(anyhow::anyhow!("registro de usuario sin validar"))),
        }
    }

    pub async fn submit(&mut self, api: &UserApi, today: NaiveDate) -> Submission {
        let payload = match self.payload(today) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.register_user(&payload).await;
        let submission = outcome(result, "Usuario registrado correctamente", None);
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn valid() -> UserDraft {
        UserDraft {
            nombre: "Camila".into(),
            apellido: "Reyes".into(),
            rut: "18765432-k".into(),
            fecha_nacimiento: "1995-11-03".into(),
            email: "camila.reyes@bodega.cl".into(),
            cargo: "2".into(),
        }
    }

    #[test]
    fn age_uses_birthday_arithmetic() {
        let birth = NaiveDate::from_ymd_opt(2007, 6, 16).unwrap();
        assert_eq!(age_on(birth, today()), 17);
        let birth = NaiveDate::from_ymd_opt(2007, 6, 15).unwrap();
        assert_eq!(age_on(birth, today()), 18);
    }

    #[test]
    fn birth_date_rules() {
        let mut draft = valid();
        draft.fecha_nacimiento = "2025-06-15".into();
        assert!(draft.payload(today()).unwrap_err().user_message().contains("Debe ser una fecha pasada"));

        draft.fecha_nacimiento = "2007-06-16".into();
        assert!(draft.payload(today()).unwrap_err().user_message().contains("Debe ser mayor de 18 años"));

        draft.fecha_nacimiento = "1900-01-01".into();
        assert!(draft.payload(today()).unwrap_err().user_message().contains("Fecha de nacimiento no válida"));
    }

    #[test]
    fn static_rules_come_from_the_derive() {
        let draft = UserDraft { nombre: "C".into(), rut: "1234567-9".into(), ..valid() };
        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(fields["nombre"][0].code, "length");
        assert_eq!(fields["rut"][0].code, "regex");
        assert!(!fields.contains_key("email"));

        let message = UserDraft::default().payload(today()).unwrap_err().user_message();
        assert!(message.contains("email: El correo electrónico es requerido"));
        assert!(message.contains("apellido: El apellido es requerido"));
        assert!(message.contains("fecha_nacimiento: La fecha de nacimiento es requerida"));
    }

    #[test]
    fn administrator_cannot_be_assigned() {
        let mut draft = valid();
        draft.cargo = "4".into();
        assert_eq!(draft.payload(today()).unwrap_err().user_message(), "cargo: El cargo es requerido");
    }

    #[tokio::test]
    async fn valid_user_is_sent_with_uppercase_rut_and_numeric_cargo() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        let api = UserApi::new(client(&transport, admin_session()));
        let mut draft = valid();

        let submission = draft.submit(&api, today()).await;

        assert_eq!(submission.notice.message, "Usuario registrado correctamente");
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["rut"], "18765432-K");
        assert_eq!(body["cargo"], 2);
        assert_eq!(draft, UserDraft::default());
    }

    #[tokio::test]
    async fn invalid_email_is_not_sent() {
        let transport = RecordingTransport::new();
        let api = UserApi::new(client(&transport, admin_session()));
        let mut draft = valid();
        draft.email = "camila@".into();

        let submission = draft.submit(&api, today()).await;

        assert_eq!(submission.notice.message, "email: Formato de correo electrónico inválido");
        assert!(transport.requests().is_empty());
        assert_eq!(draft.nombre, "Camila");
    }
}

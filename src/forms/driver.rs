// src/forms/driver.rs

use std::time::Duration;

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    api::CrmApi,
    common::error::AppError,
    forms::{Checks, DateInput, RUT_RE, Submission, optional_phone, outcome, person_name},
    models::crm::{Driver, DriverPayload},
};

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct DriverDraft {
    pub nombre: String,
    pub apellido: String,

    pub rut: String,

    #[validate(custom(function = "optional_phone"))]
    pub telefono: String,

    /// `YYYY-MM-DD`, acotada por el control de fecha
    pub fecha_nacimiento: String,
}

/// Reglas compartidas por el registro y el diálogo de edición.
fn check_driver(
    derived: Result<(), validator::ValidationErrors>,
    nombre: &str,
    apellido: &str,
    rut: &str,
    fecha_nacimiento: &str,
    today: NaiveDate,
) -> Result<NaiveDate, AppError> {
    let mut checks = Checks::from_derive(derived);
    person_name(&mut checks, "nombre", nombre, "nombre");
    person_name(&mut checks, "apellido", apellido, "apellido");

    if rut.trim().is_empty() {
        checks.add("rut", "required", "El RUT es requerido");
    } else if !RUT_RE.is_match(rut.trim()) {
        checks.add("rut", "regex", "Formato de RUT inválido (Ej: 12345678-9)");
    }

    let control = DateInput::birth_date(today);
    let fecha = if fecha_nacimiento.trim().is_empty() {
        checks.add("fecha_nacimiento", "required", "La fecha de nacimiento es requerida");
        None
    } else {
        let accepted = control.accept(fecha_nacimiento);
        if accepted.is_none() {
            checks.add(
                "fecha_nacimiento",
                "range",
                format!(
                    "La fecha debe estar entre {} y {}",
                    control.min.format("%d/%m/%Y"),
                    control.max.format("%d/%m/%Y")
                ),
            );
        }
        accepted
    };

    checks.finish()?;
    // Sin errores la fecha siempre fue aceptada
    fecha.ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("fecha de nacimiento sin validar")))
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl DriverDraft {
    pub fn payload(&self, today: NaiveDate) -> Result<DriverPayload, AppError> {
        let fecha = check_driver(
            self.validate(),
            &self.nombre,
            &self.apellido,
            &self.rut,
            &self.fecha_nacimiento,
            today,
        )?;
        Ok(DriverPayload {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            rut: self.rut.trim().to_string(),
            telefono: optional(&self.telefono),
            fecha_nacimiento: fecha.format("%Y-%m-%d").to_string(),
        })
    }

    pub async fn submit(&mut self, api: &CrmApi, today: NaiveDate, reload_delay: Duration) -> Submission {
        let payload = match self.payload(today) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.register_driver(&payload).await;
        let submission = outcome(result, "Conductor registrado correctamente", Some(reload_delay));
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

/// Copia local de un conductor para el diálogo de edición.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct DriverEdit {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,

    pub rut: String,

    #[validate(custom(function = "optional_phone"))]
    pub telefono: String,

    pub fecha_nacimiento: String,
}

impl From<&Driver> for DriverEdit {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            nombre: driver.nombre.clone(),
            apellido: driver.apellido.clone(),
            rut: driver.rut.clone(),
            telefono: driver.telefono.clone().unwrap_or_default(),
            fecha_nacimiento: driver.fecha_nacimiento.clone().unwrap_or_default(),
        }
    }
}

impl DriverEdit {
    pub fn payload(&self, today: NaiveDate) -> Result<DriverPayload, AppError> {
        let fecha = check_driver(
            self.validate(),
            &self.nombre,
            &self.apellido,
            &self.rut,
            &self.fecha_nacimiento,
            today,
        )?;
        Ok(DriverPayload {
            nombre: self.nombre.trim().to_string(),
            apellido: self.apellido.trim().to_string(),
            rut: self.rut.trim().to_string(),
            telefono: optional(&self.telefono),
            fecha_nacimiento: fecha.format("%Y-%m-%d").to_string(),
        })
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

    fn valid() -> DriverDraft {
        DriverDraft {
            nombre: "Jorge".into(),
            apellido: "Muñoz".into(),
            rut: "15678901-2".into(),
            telefono: String::new(),
            fecha_nacimiento: "1988-02-29".into(),
        }
    }

    #[test]
    fn birth_date_one_day_short_of_eighteen_is_rejected_by_the_control() {
        let mut draft = valid();
        draft.fecha_nacimiento = "2007-06-16".into();
        let err = draft.payload(today()).unwrap_err();
        assert!(err.user_message().contains("fecha_nacimiento: La fecha debe estar entre 15/06/1925 y 15/06/2007"));

        draft.fecha_nacimiento = "2007-06-15".into();
        assert_eq!(draft.payload(today()).unwrap().fecha_nacimiento, "2007-06-15");
    }

    #[test]
    fn names_report_required_before_length() {
        let mut draft = valid();
        draft.nombre = " ".into();
        draft.apellido = "M".into();
        let message = draft.payload(today()).unwrap_err().user_message();
        assert!(message.contains("nombre: El nombre es requerido"));
        assert!(message.contains("apellido: El apellido debe tener al menos 2 caracteres"));
    }

    #[tokio::test]
    async fn optional_phone_is_omitted_from_the_payload() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true}));
        let api = CrmApi::new(client(&transport, admin_session()));
        let mut draft = valid();

        let submission = draft.submit(&api, today(), Duration::from_millis(1500)).await;

        assert!(submission.succeeded());
        assert_eq!(submission.notice.message, "Conductor registrado correctamente");
        let body = transport.requests()[0].body.clone().unwrap();
        assert!(body.get("telefono").is_none());
        assert_eq!(body["fecha_nacimiento"], "1988-02-29");
        assert_eq!(draft, DriverDraft::default());
    }
}

// src/forms/partner.rs

use std::time::Duration;

use validator::{Validate, ValidationError};

use crate::{
    api::CrmApi,
    common::error::AppError,
    forms::{Checks, EMAIL_RE, PHONE_RE, RUT_RE, Submission, field_error, optional_phone, outcome},
    models::crm::{Partner, PartnerKind, PartnerPayload},
};

pub const REGIONES: [&str; 16] = [
    "Región de Arica y Parinacota",
    "Región de Tarapacá",
    "Región de Antofagasta",
    "Región de Atacama",
    "Región de Coquimbo",
    "Región de Valparaíso",
    "Región Metropolitana de Santiago",
    "Región del Libertador General Bernardo O'Higgins",
    "Región del Maule",
    "Región de Ñuble",
    "Región del Biobío",
    "Región de La Araucanía",
    "Región de Los Ríos",
    "Región de Los Lagos",
    "Región de Aysén del General Carlos Ibáñez del Campo",
    "Región de Magallanes y de la Antártica Chilena",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoPersona {
    Juridica,
    Natural,
}

impl TipoPersona {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "juridica" | "jurídica" => Some(TipoPersona::Juridica),
            "natural" => Some(TipoPersona::Natural),
            _ => None,
        }
    }
}

/// Formulario de registro de clientes y proveedores.
#[derive(Debug, Clone, Default, Validate)]
pub struct PartnerDraft {
    pub tipo_persona: Option<TipoPersona>,

    #[validate(length(min = 3, message = "El nombre debe tener al menos 3 caracteres"))]
    pub nombre: String,

    #[validate(regex(path = *RUT_RE, message = "Formato de RUT inválido (Ej: 12345678-9)"))]
    pub rut: String,

    #[validate(regex(path = *PHONE_RE, message = "Formato de teléfono inválido"))]
    pub telefono: String,

    #[validate(regex(path = *EMAIL_RE, message = "Email inválido"))]
    pub email: String,

    #[validate(length(min = 5, message = "La dirección debe tener al menos 5 caracteres"))]
    pub direccion: String,

    pub region: String,
}

impl PartnerDraft {
    pub fn check(&self) -> Result<(), AppError> {
        let mut checks = Checks::from_derive(self.validate());
        if self.tipo_persona.is_none() {
            checks.add("tipo_persona", "required", "Debes seleccionar el tipo de persona");
        }
        if !REGIONES.contains(&self.region.trim()) {
            checks.add("region", "required", "Debes seleccionar una región");
        }
        checks.finish()
    }

    /// La región viaja dentro de la dirección: `"<dirección>, <región>"`.
    pub fn payload(&self) -> Result<PartnerPayload, AppError> {
        self.check()?;
        Ok(PartnerPayload {
            nombre: self.nombre.trim().to_string(),
            rut: self.rut.trim().to_string(),
            telefono: self.telefono.trim().to_string(),
            email: self.email.trim().to_string(),
            direccion: format!("{}, {}", self.direccion.trim(), self.region.trim()),
            es_persona_juridica: self.tipo_persona == Some(TipoPersona::Juridica),
        })
    }

    pub async fn submit(&mut self, api: &CrmApi, kind: PartnerKind, reload_delay: Duration) -> Submission {
        let payload = match self.payload() {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let noun = match kind {
            PartnerKind::Cliente => "Cliente",
            PartnerKind::Proveedor => "Proveedor",
        };
        let result = api.register_partner(kind, &payload).await;
        let submission = outcome(result, &format!("{} registrado correctamente", noun), Some(reload_delay));
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

// --- Diálogo de edición ---

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || EMAIL_RE.is_match(value.trim()) {
        return Ok(());
    }
    Err(field_error("regex", "Email inválido"))
}

/// Copia local de los campos editables de un cliente o proveedor.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PartnerEdit {
    pub id: i64,

    #[validate(length(min = 3, message = "El nombre debe tener al menos 3 caracteres"))]
    pub nombre: String,

    #[validate(regex(path = *RUT_RE, message = "Formato de RUT inválido (Ej: 12345678-9)"))]
    pub rut: String,

    #[validate(custom(function = "optional_phone"))]
    pub telefono: String,

    pub direccion: String,

    #[validate(custom(function = "optional_email"))]
    pub email: String,

    pub es_persona_juridica: bool,
}

impl From<&Partner> for PartnerEdit {
    fn from(partner: &Partner) -> Self {
        Self {
            id: partner.id,
            nombre: partner.nombre.clone(),
            rut: partner.rut.clone(),
            telefono: partner.telefono.clone().unwrap_or_default(),
            direccion: partner.direccion.clone().unwrap_or_default(),
            email: partner.email.clone().unwrap_or_default(),
            es_persona_juridica: partner.es_persona_juridica,
        }
    }
}

impl PartnerEdit {
    pub fn payload(&self) -> Result<PartnerPayload, AppError> {
        self.validate()?;
        Ok(PartnerPayload {
            nombre: self.nombre.trim().to_string(),
            rut: self.rut.trim().to_string(),
            telefono: self.telefono.trim().to_string(),
            email: self.email.trim().to_string(),
            direccion: self.direccion.trim().to_string(),
            es_persona_juridica: self.es_persona_juridica,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::client::testing::*;

    fn valid() -> PartnerDraft {
        PartnerDraft {
            tipo_persona: Some(TipoPersona::Juridica),
            nombre: "Distribuidora Sur".into(),
            rut: "76543210-K".into(),
            telefono: "+56912345678".into(),
            email: "ventas@sur.cl".into(),
            direccion: "Av. Matta 1234".into(),
            region: "Región de Los Lagos".into(),
        }
    }

    #[tokio::test]
    async fn empty_form_never_reaches_the_network() {
        let transport = RecordingTransport::new();
        let api = CrmApi::new(client(&transport, admin_session()));
        let mut draft = PartnerDraft::default();

        let submission = draft.submit(&api, PartnerKind::Cliente, Duration::from_millis(1500)).await;

        assert!(!submission.succeeded());
        assert!(submission.notice.message.contains("nombre: El nombre debe tener al menos 3 caracteres"));
        assert!(submission.notice.message.contains("region: Debes seleccionar una región"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn valid_submit_sends_one_call_and_resets_the_draft() {
        let transport = RecordingTransport::new();
        transport.push(201, json!({"success": true, "message": "Proveedor registrado"}));
        let api = CrmApi::new(client(&transport, admin_session()));
        let mut draft = valid();

        let submission = draft.submit(&api, PartnerKind::Proveedor, Duration::from_millis(1500)).await;

        assert!(submission.succeeded());
        assert_eq!(submission.reload_after, Some(Duration::from_millis(1500)));
        assert_eq!(draft.nombre, "");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "admin/proveedores/registrar/");
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["direccion"], "Av. Matta 1234, Región de Los Lagos");
        assert_eq!(body["es_persona_juridica"], true);
    }

    #[test]
    fn edit_dialog_allows_missing_optional_contact_data() {
        let partner = Partner {
            id: 4,
            nombre: "Almacén Don Tito".into(),
            rut: "12345678-9".into(),
            telefono: None,
            direccion: None,
            email: None,
            es_persona_juridica: false,
            activo: true,
        };
        let mut edit = PartnerEdit::from(&partner);
        assert!(edit.payload().is_ok());

        edit.email = "no-es-correo".into();
        assert!(edit.payload().is_err());
    }
}

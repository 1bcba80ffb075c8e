// src/forms/password.rs

use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError};

use crate::{
    api::AuthApi,
    common::error::AppError,
    forms::{Checks, RECOVERY_RUT_RE, Submission, field_error, outcome},
    middleware::auth::SessionStore,
    models::auth::{LoginPayload, RecoveryRequestPayload, SessionUser, SetPasswordPayload},
};

static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).expect("patrón de caracteres especiales"));

// --- 1. Login ---

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoginDraft {
    #[validate(length(min = 1, message = "Este campo es requerido"))]
    pub rut: String,

    #[validate(length(min = 1, message = "Este campo es requerido"))]
    pub password: String,
}

impl LoginDraft {
    /// Inicia sesión y guarda el registro `user`. El llamador navega según el cargo.
    pub async fn login(&self, api: &AuthApi, store: &SessionStore) -> Result<SessionUser, AppError> {
        self.validate()?;

        let payload = LoginPayload { rut: self.rut.trim().to_string(), password: self.password.clone() };
        let user = api.login(&payload).await?;
        store.save(&user).await?;

        tracing::info!("✅ Sesión iniciada: {} ({})", user.full_name(), user.role());
        Ok(user)
    }
}

// --- 2. Solicitud de recuperación ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryDraft {
    pub rut: String,
}

impl RecoveryDraft {
    pub fn payload(&self) -> Result<RecoveryRequestPayload, AppError> {
        let mut checks = Checks::new();
        let rut = self.rut.trim();
        if rut.is_empty() {
            checks.add("rut", "required", "El RUT es requerido");
        } else if !RECOVERY_RUT_RE.is_match(rut) {
            checks.add("rut", "regex", "Formato de RUT inválido (ej: 12345678-9)");
        }
        checks.finish()?;
        Ok(RecoveryRequestPayload { rut: rut.to_string() })
    }

    pub async fn submit(&mut self, api: &AuthApi) -> Submission {
        let payload = match self.payload() {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let result = api.request_password_recovery(&payload).await;
        let submission = outcome(result, "Solicitud de recuperación enviada", None);
        if submission.succeeded() {
            *self = Self::default();
        }
        submission
    }
}

// --- 3. Nueva contraseña (reseteo o primera contraseña) ---

fn strong_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 8 {
        return Err(field_error("length", "La contraseña debe tener al menos 8 caracteres"));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(field_error("uppercase", "La contraseña debe contener al menos una letra mayúscula"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(field_error("digit", "La contraseña debe contener al menos un número"));
    }
    if !SPECIAL_RE.is_match(value) {
        return Err(field_error("special", "La contraseña debe contener al menos un carácter especial"));
    }
    Ok(())
}

/// Qué enlace del correo trajo al usuario hasta aquí.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPurpose {
    Reset,
    Create,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct PasswordDraft {
    /// Token del enlace
    pub token: String,

    #[validate(custom(function = "strong_password"))]
    pub password: String,

    pub confirmacion: String,
}

impl PasswordDraft {
    pub fn payload(&self, purpose: PasswordPurpose) -> Result<SetPasswordPayload, AppError> {
        if self.token.trim().is_empty() {
            let message = match purpose {
                PasswordPurpose::Reset => "Token de recuperación no válido",
                PasswordPurpose::Create => "Token no válido o expirado",
            };
            return Err(AppError::Api { status: 400, message: message.into() });
        }

        let mut checks = Checks::from_derive(self.validate());
        if self.confirmacion.is_empty() {
            checks.add("confirmacion", "required", "Debes confirmar la contraseña");
        } else if self.confirmacion != self.password {
            checks.add("confirmacion", "must_match", "Las contraseñas no coinciden");
        }
        checks.finish()?;

        Ok(SetPasswordPayload { token: self.token.trim().to_string(), password: self.password.clone() })
    }

    pub async fn submit(&mut self, api: &AuthApi, purpose: PasswordPurpose) -> Submission {
        let payload = match self.payload(purpose) {
            Ok(payload) => payload,
            Err(e) => return Submission::rejected(e),
        };

        let (result, success) = match purpose {
            PasswordPurpose::Reset => (api.reset_password(&payload).await, "Contraseña actualizada correctamente"),
            PasswordPurpose::Create => (
                api.create_password(&payload).await,
                "Contraseña creada exitosamente, redirigiendo al inicio de sesión...",
            ),
        };
        let submission = outcome(result, success, None);
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
    use crate::middleware::auth::SessionContext;
    use crate::models::auth::Role;

    #[test]
    fn password_strength_rules_in_order() {
        let cases = [
            ("Ab1!", "La contraseña debe tener al menos 8 caracteres"),
            ("abcdefg1!", "La contraseña debe contener al menos una letra mayúscula"),
            ("Abcdefgh!", "La contraseña debe contener al menos un número"),
            ("Abcdefgh1", "La contraseña debe contener al menos un carácter especial"),
        ];
        for (password, expected) in cases {
            let draft = PasswordDraft {
                token: "tk".into(),
                password: password.into(),
                confirmacion: password.into(),
            };
            let message = draft.payload(PasswordPurpose::Reset).unwrap_err().user_message();
            assert_eq!(message, format!("password: {}", expected));
        }
    }

    #[test]
    fn confirmation_must_match() {
        let draft = PasswordDraft {
            token: "tk".into(),
            password: "Bodega2025!".into(),
            confirmacion: "Bodega2025?".into(),
        };
        assert_eq!(
            draft.payload(PasswordPurpose::Create).unwrap_err().user_message(),
            "confirmacion: Las contraseñas no coinciden"
        );
    }

    #[test]
    fn recovery_rut_accepts_seven_or_eight_digits() {
        assert!(RecoveryDraft { rut: "7654321-k".into() }.payload().is_ok());
        assert!(RecoveryDraft { rut: "76.543.210-K".into() }.payload().is_err());
    }

    #[tokio::test]
    async fn missing_token_is_rejected_before_the_network() {
        let transport = RecordingTransport::new();
        let api = AuthApi::new(client(&transport, SessionContext::anonymous()));
        let mut draft = PasswordDraft { password: "Bodega2025!".into(), confirmacion: "Bodega2025!".into(), ..Default::default() };

        let submission = draft.submit(&api, PasswordPurpose::Reset).await;

        assert_eq!(submission.notice.message, "Token de recuperación no válido");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn login_saves_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let transport = RecordingTransport::new();
        transport.push(200, json!({"token": "tok-9", "cargo": 1, "nombre": "Pedro", "apellido": "Lagos"}));
        let api = AuthApi::new(client(&transport, SessionContext::anonymous()));

        let draft = LoginDraft { rut: " 12345678-9 ".into(), password: "secreta".into() };
        let user = draft.login(&api, &store).await.unwrap();

        assert_eq!(user.role(), Role::Bodeguero);
        assert_eq!(store.load().await.token(), Some("tok-9"));
        let request = &transport.requests()[0];
        assert_eq!(request.token, None);
        assert_eq!(request.body.as_ref().unwrap()["rut"], "12345678-9");
    }

    #[tokio::test]
    async fn empty_login_is_not_sent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let transport = RecordingTransport::new();
        let api = AuthApi::new(client(&transport, SessionContext::anonymous()));

        let err = LoginDraft::default().login(&api, &store).await.unwrap_err();

        assert_eq!(err.user_message(), "password: Este campo es requerido\nrut: Este campo es requerido");
        assert!(transport.requests().is_empty());
    }
}

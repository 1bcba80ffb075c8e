// src/models/auth.rs

use std::fmt;

use serde::{Deserialize, Serialize};

// --- Cargos ---

/// Cargo del usuario tal como lo entrega el login (código numérico).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    None,
    Bodeguero,
    JefeBodega,
    Auditor,
    Administrador,
}

impl Role {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Role::Bodeguero,
            2 => Role::JefeBodega,
            3 => Role::Auditor,
            4 => Role::Administrador,
            _ => Role::None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Role::None => 0,
            Role::Bodeguero => 1,
            Role::JefeBodega => 2,
            Role::Auditor => 3,
            Role::Administrador => 4,
        }
    }

    /// Nombre del cargo como aparece en el listado de usuarios.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::None => "Sin cargo asignado",
            Role::Bodeguero => "Bodeguero",
            Role::JefeBodega => "Jefe de bodega",
            Role::Auditor => "Auditor",
            Role::Administrador => "Administrador",
        }
    }

    pub fn from_display_name(name: &str) -> Self {
        match name {
            "Bodeguero" => Role::Bodeguero,
            "Jefe de bodega" => Role::JefeBodega,
            "Auditor" => Role::Auditor,
            "Administrador" => Role::Administrador,
            _ => Role::None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// --- Sesión ---

/// Registro `user` que se guarda al iniciar sesión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub token: String,
    pub cargo: i64,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
}

impl SessionUser {
    pub fn role(&self) -> Role {
        Role::from_code(self.cargo)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub rut: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryRequestPayload {
    pub rut: String,
}

/// Sirve tanto para el reseteo como para establecer la primera contraseña.
#[derive(Debug, Clone, Serialize)]
pub struct SetPasswordPayload {
    pub token: String,
    pub password: String,
}

// src/models/users.rs

use serde::{Deserialize, Serialize};

use crate::models::auth::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nombre_completo: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rut: String,
    /// `dd/mm/yyyy` o null
    #[serde(default)]
    pub fecha_nacimiento: Option<String>,
    pub fecha_registro: String,
    pub activo: bool,
    /// Nombre del cargo ("Bodeguero", "Jefe de bodega", ...)
    pub cargo: String,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_display_name(&self.cargo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterUserPayload {
    pub nombre: String,
    pub apellido: String,
    /// `YYYY-MM-DD`
    pub fecha_nacimiento: String,
    pub rut: String,
    pub cargo: i64,
    pub email: String,
}

// src/models/crm.rs

use serde::{Deserialize, Serialize};

// --- CLIENTES Y PROVEEDORES ---

/// Clientes y proveedores comparten forma y operaciones en el backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerKind {
    Cliente,
    Proveedor,
}

impl PartnerKind {
    /// Segmento de la ruta en la API de administración (`admin/<segmento>/`).
    pub fn segment(self) -> &'static str {
        match self {
            PartnerKind::Cliente => "clientes",
            PartnerKind::Proveedor => "proveedores",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            PartnerKind::Cliente => "cliente",
            PartnerKind::Proveedor => "proveedor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub es_persona_juridica: bool,
    pub activo: bool,
}

impl Partner {
    pub fn tipo_persona(&self) -> &'static str {
        if self.es_persona_juridica { "Jurídica" } else { "Natural" }
    }
}

/// Cuerpo de `registrar/` y `{id}/editar/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerPayload {
    pub nombre: String,
    pub rut: String,
    pub telefono: String,
    pub email: String,
    pub direccion: String,
    pub es_persona_juridica: bool,
}

// --- CONDUCTORES ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub telefono: Option<String>,
    /// `YYYY-MM-DD` o null
    #[serde(default)]
    pub fecha_nacimiento: Option<String>,
    pub activo: bool,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPayload {
    pub nombre: String,
    pub apellido: String,
    pub rut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    pub fecha_nacimiento: String,
}

// --- LISTAS DE REFERENCIA ---

/// Elemento `{id, nombre}` de los selectores (clientes, proveedores, categorías).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRef {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub rut: String,
}

// src/middleware.rs

pub mod auth;
pub use auth::{SessionContext, SessionStore};
pub mod rbac;

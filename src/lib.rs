// src/lib.rs

pub mod api;
pub mod cli;
pub mod common;
pub mod config;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

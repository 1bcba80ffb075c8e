// src/api.rs

pub mod client;
pub use client::{Ack, ApiClient, HttpTransport, Transport};
pub mod auth_api;
pub use auth_api::AuthApi;
pub mod crm_api;
pub use crm_api::CrmApi;
pub mod user_api;
pub use user_api::UserApi;
pub mod inventory_api;
pub use inventory_api::InventoryApi;
pub mod operations_api;
pub use operations_api::OperationsApi;
pub mod dashboard_api;
pub use dashboard_api::DashboardApi;

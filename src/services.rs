// src/services.rs

pub mod filters;
pub use filters::{Filterable, ListQuery, PageSlice, SortSpec};
pub mod list_view;
pub use list_view::{ListView, RefreshPolicy, ViewState};
pub mod sources;
pub mod report_layout;
pub use report_layout::{LaidOutReport, ReportLayout};
pub mod reports;
pub mod document_service;
pub use document_service::DocumentService;
pub mod dashboards;
pub use dashboards::{ComparisonQuery, DashboardService};

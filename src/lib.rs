//! Food donation dashboard: load the claims, food listings, providers and
//! receivers tables, filter them by category and aggregate them for display.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;

pub use config::DashboardConfig;
pub use dashboard::DashboardSession;
pub use error::{DashboardError, Result};

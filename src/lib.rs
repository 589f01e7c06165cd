//! Student performance metrics, chart rendering and the local record store
//! behind the ClassPulse dashboard.

pub mod chart;
pub mod error;
pub mod metrics;
pub mod models;
pub mod recommend;
pub mod report;
pub mod store;
pub mod views;

pub use error::{DashboardError, Result};

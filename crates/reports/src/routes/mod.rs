//! HTTP route handlers for the reports service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Reports
//! GET  /reports/sales          - Per-brand sales time series + summary
//! ```

pub mod sales;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the report routes router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/sales", get(sales::sales_report))
}

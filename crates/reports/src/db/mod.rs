//! Database access for the reports service.
//!
//! The reporting database is populated by the catalog and checkout services;
//! everything here is read-only.
//!
//! ## Tables
//!
//! - `brands` - Brand display names
//! - `products` - Catalog rows with both brand representations
//!   (`brand_id` referential / `brand_name` legacy string)
//! - `orders` / `order_items` - Order history with purchase-time price
//!   snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/reports/migrations/` and applied at
//! startup via `sqlx::migrate!`.

pub mod catalog;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

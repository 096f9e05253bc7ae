//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ReportsConfig;
use crate::db::{CatalogRepository, OrderRepository};

/// Application state shared across all handlers.
///
/// Cloning is cheap; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ReportsConfig,
    pool: PgPool,
    orders: OrderRepository,
    catalog: CatalogRepository,
}

impl AppState {
    #[must_use]
    pub fn new(config: ReportsConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orders: OrderRepository::new(pool.clone()),
                catalog: CatalogRepository::new(pool.clone()),
                config,
                pool,
            }),
        }
    }

    pub fn config(&self) -> &ReportsConfig {
        &self.inner.config
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    pub fn catalog(&self) -> &CatalogRepository {
        &self.inner.catalog
    }
}

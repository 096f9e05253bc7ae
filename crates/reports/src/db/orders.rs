//! Order history queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clementine_core::ProductId;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::report::ReportWindow;

/// An order as fetched for reporting: effective date, the two status
/// signals, and its purchased line items.
#[derive(Debug, Clone)]
pub struct SalesOrder {
    /// `placed_at` when present, otherwise the row's creation timestamp.
    pub effective_at: DateTime<Utc>,
    /// Free-form historical status text (pending, confirmed, ...).
    pub order_status: String,
    /// Free-form payment status text (unpaid, paid, ...).
    pub payment_status: String,
    pub items: Vec<SalesLineItem>,
}

/// One purchased line item with its purchase-time price snapshots.
#[derive(Debug, Clone)]
pub struct SalesLineItem {
    pub product_id: ProductId,
    /// Regular price snapshot; may be missing or zero on historical rows.
    pub unit_price: Option<Decimal>,
    /// Sale price override; wins over `unit_price` when positive.
    pub sale_price: Option<Decimal>,
    pub quantity: u32,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    effective_at: DateTime<Utc>,
    order_status: String,
    payment_status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    unit_price: Option<Decimal>,
    sale_price: Option<Decimal>,
    quantity: i32,
}

/// Read-only access to order history.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all orders whose effective date falls inside the report window,
    /// with their line items.
    ///
    /// Only the date restriction is pushed into SQL; the counted-status
    /// predicate is applied by the extraction stage, which stays the single
    /// authority on what counts as a sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn orders_in_window(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<SalesOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id,
                   COALESCE(placed_at, created_at) AS effective_at,
                   order_status,
                   payment_status
            FROM orders
            WHERE COALESCE(placed_at, created_at) BETWEEN $1 AND $2
            ORDER BY effective_at
            ",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, unit_price, sale_price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ",
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<Uuid, Vec<SalesLineItem>> = HashMap::new();
        for row in item_rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(SalesLineItem {
                    product_id: ProductId::new(row.product_id),
                    unit_price: row.unit_price,
                    sale_price: row.sale_price,
                    quantity: u32::try_from(row.quantity).unwrap_or(0),
                });
        }

        Ok(orders
            .into_iter()
            .map(|row| SalesOrder {
                effective_at: row.effective_at,
                order_status: row.order_status,
                payment_status: row.payment_status,
                items: items_by_order.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}

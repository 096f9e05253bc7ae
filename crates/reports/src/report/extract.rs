//! Order line extraction: counted orders to flat purchased line items.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use clementine_core::ProductId;
use rust_decimal::Decimal;

use super::query::ReportWindow;
use crate::db::orders::SalesOrder;

/// A flattened purchased line item, before brand and price resolution.
#[derive(Debug, Clone)]
pub(crate) struct OrderLine {
    pub effective_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub unit_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub quantity: u32,
}

/// Whether an order's status signals a completed sale.
///
/// The two signals are alternatives, not a conjunction: historical rows
/// carry "paid" in `order_status`, newer rows carry "confirmed" there and
/// "paid" in `payment_status`. Matching is exact; "PAID" or "paid " do not
/// count.
pub(crate) fn counts_toward_sales(order_status: &str, payment_status: &str) -> bool {
    matches!(order_status, "paid" | "confirmed") || payment_status == "paid"
}

/// Flatten counted orders into line items.
///
/// Drops orders outside the inclusive window, orders that do not count as
/// sales, zero-quantity items, and (when a scope is given) items whose
/// product is outside the scoped brand.
pub(crate) fn order_lines(
    orders: Vec<SalesOrder>,
    window: &ReportWindow,
    scope: Option<&HashSet<ProductId>>,
) -> Vec<OrderLine> {
    orders
        .into_iter()
        .filter(|order| order.effective_at >= window.start && order.effective_at <= window.end)
        .filter(|order| counts_toward_sales(&order.order_status, &order.payment_status))
        .flat_map(|order| {
            let effective_at = order.effective_at;
            order.items.into_iter().filter_map(move |item| {
                if item.quantity == 0 {
                    return None;
                }
                if scope.is_some_and(|products| !products.contains(&item.product_id)) {
                    return None;
                }
                Some(OrderLine {
                    effective_at,
                    product_id: item.product_id,
                    unit_price: item.unit_price,
                    sale_price: item.sale_price,
                    quantity: item.quantity,
                })
            })
        })
        .collect()
}

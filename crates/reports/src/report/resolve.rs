//! Brand and price resolution for extracted line items.
//!
//! Resolution never fails a request: every per-item ambiguity degrades to
//! the "Unknown" sentinel or a price fallback, and a line whose product has
//! vanished from the catalog contributes nothing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clementine_core::{BrandId, BrandRef, ProductId};
use rust_decimal::Decimal;

use super::extract::OrderLine;
use crate::db::catalog::CatalogProduct;

/// Display name for any line whose brand cannot be resolved.
pub(crate) const UNKNOWN_BRAND: &str = "Unknown";

/// A line item with its brand display name and effective unit price settled.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedLine {
    pub effective_at: DateTime<Utc>,
    pub brand_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Effective unit price: sale snapshot, then price snapshot, then the
/// catalog's current sale price, then its regular price. Zero and negative
/// values are treated as absent at every step except the last.
fn unit_price(line: &OrderLine, product: &CatalogProduct) -> Decimal {
    positive(line.sale_price)
        .or_else(|| positive(line.unit_price))
        .or_else(|| positive(product.sale_price))
        .or(product.price)
        .unwrap_or(Decimal::ZERO)
}

fn brand_name(product: &CatalogProduct, brand_names: &HashMap<BrandId, String>) -> String {
    match &product.brand {
        Some(BrandRef::Id(id)) => brand_names
            .get(id)
            .cloned()
            // Dangling reference: the brand row is gone.
            .unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
        // Legacy string brands are reported verbatim, never re-looked-up.
        Some(BrandRef::Legacy(name)) => name.clone(),
        None => UNKNOWN_BRAND.to_string(),
    }
}

pub(crate) fn resolve_lines(
    lines: Vec<OrderLine>,
    products: &HashMap<ProductId, CatalogProduct>,
    brand_names: &HashMap<BrandId, String>,
) -> Vec<ResolvedLine> {
    lines
        .into_iter()
        .filter_map(|line| {
            let product = products.get(&line.product_id)?;
            Some(ResolvedLine {
                effective_at: line.effective_at,
                brand_name: brand_name(product, brand_names),
                unit_price: unit_price(&line, product),
                quantity: line.quantity,
            })
        })
        .collect()
}

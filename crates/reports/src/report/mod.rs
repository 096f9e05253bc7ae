//! The sales report engine.
//!
//! A report request runs a four-stage pipeline:
//!
//! 1. Query normalization ([`query`]) - raw parameters to a canonical
//!    [`ReportWindow`].
//! 2. Line extraction ([`extract`]) - counted orders to flat purchased
//!    line items.
//! 3. Brand/price resolution ([`resolve`]) - each line gets a brand
//!    display name and an effective unit price; ambiguity degrades to
//!    fallbacks, never to a failed request.
//! 4. Bucketed aggregation ([`aggregate`]) - per-brand time series plus a
//!    global summary, revenue rounded to cents only at this boundary.
//!
//! Stages 2-4 are pure functions over fetched data, so the whole pipeline
//! is unit-testable without a database.

mod aggregate;
mod extract;
pub mod query;
mod resolve;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clementine_core::{BrandId, BrandRef, Granularity, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

pub use query::{QueryError, ReportQuery, ReportWindow};

use crate::db::{CatalogRepository, OrderRepository, RepositoryError};

/// Successful report envelope.
#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub success: bool,
    pub period: Granularity,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub series: Vec<BrandSeries>,
    pub summary: ReportSummary,
}

/// One brand's time series, buckets ascending.
#[derive(Debug, Serialize)]
pub struct BrandSeries {
    pub brand: String,
    pub data: Vec<ReportPoint>,
}

/// Units and revenue for one brand in one time bucket.
#[derive(Debug, Serialize)]
pub struct ReportPoint {
    pub t: DateTime<Utc>,
    pub qty: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Report-wide totals across all brands and buckets.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportSummary {
    pub qty: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Run the full pipeline for a normalized window.
///
/// `scope` restricts the report to products of one brand; an unknown brand
/// ID simply yields an empty report.
///
/// # Errors
///
/// Returns `RepositoryError` if any data store query fails.
pub async fn run(
    orders: &OrderRepository,
    catalog: &CatalogRepository,
    window: &ReportWindow,
    scope: Option<BrandId>,
    tz: Tz,
) -> Result<SalesReport, RepositoryError> {
    let scope_products = match scope {
        Some(brand) => Some(catalog.product_ids_for_brand(brand).await?),
        None => None,
    };

    let candidates = orders.orders_in_window(window).await?;
    let lines = extract::order_lines(candidates, window, scope_products.as_ref());

    let product_ids: Vec<ProductId> = lines
        .iter()
        .map(|line| line.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let products = catalog.products_by_ids(&product_ids).await?;

    let brand_ids: Vec<BrandId> = products
        .values()
        .filter_map(|product| match product.brand {
            Some(BrandRef::Id(id)) => Some(id),
            _ => None,
        })
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let brand_names = catalog.brand_names_by_ids(&brand_ids).await?;

    let resolved = resolve::resolve_lines(lines, &products, &brand_names);
    let (series, summary) = aggregate::aggregate(resolved, window.unit, tz);

    Ok(SalesReport {
        success: true,
        period: window.unit,
        start: window.start,
        end: window.end,
        series,
        summary,
    })
}

/// Convert a wall-clock time in the report zone to UTC.
///
/// Ambiguous times (DST fold) take the earlier instant; times inside a DST
/// gap are read as UTC.
pub(crate) fn local_instant(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive).earliest().map_or_else(
        || Utc.from_utc_datetime(&naive),
        |dt| dt.with_timezone(&Utc),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::too_many_lines)]
mod tests {
    use super::*;
    use crate::db::catalog::CatalogProduct;
    use crate::db::orders::{SalesLineItem, SalesOrder};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// Stages 2-4 over in-memory data, mirroring `run` after its fetches.
    fn run_pure(
        orders: Vec<SalesOrder>,
        products: &HashMap<ProductId, CatalogProduct>,
        brand_names: &HashMap<BrandId, String>,
        scope: Option<&HashSet<ProductId>>,
        window: &ReportWindow,
        tz: Tz,
    ) -> (Vec<BrandSeries>, ReportSummary) {
        let lines = extract::order_lines(orders, window, scope);
        let resolved = resolve::resolve_lines(lines, products, brand_names);
        aggregate::aggregate(resolved, window.unit, tz)
    }

    fn window(unit: Granularity, start: &str, end: &str) -> ReportWindow {
        ReportWindow {
            unit,
            start: utc(start),
            end: utc(end),
        }
    }

    fn item(product_id: ProductId, price: Decimal, quantity: u32) -> SalesLineItem {
        SalesLineItem {
            product_id,
            unit_price: Some(price),
            sale_price: None,
            quantity,
        }
    }

    fn paid_order(at: &str, items: Vec<SalesLineItem>) -> SalesOrder {
        SalesOrder {
            effective_at: utc(at),
            order_status: "confirmed".to_string(),
            payment_status: "paid".to_string(),
            items,
        }
    }

    struct Fixture {
        products: HashMap<ProductId, CatalogProduct>,
        brand_names: HashMap<BrandId, String>,
        acme: ProductId,
        zenith: ProductId,
    }

    /// Two referential brands plus one legacy string brand.
    fn fixture() -> Fixture {
        let acme_brand = BrandId::new(Uuid::new_v4());
        let zenith_brand = BrandId::new(Uuid::new_v4());
        let acme = ProductId::new(Uuid::new_v4());
        let zenith = ProductId::new(Uuid::new_v4());

        let products = [
            (
                acme,
                CatalogProduct {
                    price: Some(dec!(25)),
                    sale_price: None,
                    brand: Some(BrandRef::Id(acme_brand)),
                },
            ),
            (
                zenith,
                CatalogProduct {
                    price: Some(dec!(40)),
                    sale_price: None,
                    brand: Some(BrandRef::Id(zenith_brand)),
                },
            ),
        ]
        .into_iter()
        .collect();

        let brand_names = [
            (acme_brand, "Acme".to_string()),
            (zenith_brand, "Zenith".to_string()),
        ]
        .into_iter()
        .collect();

        Fixture {
            products,
            brand_names,
            acme,
            zenith,
        }
    }

    #[test]
    fn test_multi_brand_daily_report() {
        let f = fixture();
        let orders = vec![
            paid_order("2024-01-05T10:00:00Z", vec![item(f.acme, dec!(25), 2)]),
            paid_order("2024-01-05T14:00:00Z", vec![item(f.zenith, dec!(40), 1)]),
            paid_order("2024-01-06T09:00:00Z", vec![item(f.acme, dec!(25), 1)]),
        ];
        let w = window(Granularity::Day, "2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z");
        let (series, summary) = run_pure(orders, &f.products, &f.brand_names, None, &w, chrono_tz::UTC);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].brand, "Acme");
        assert_eq!(series[0].data.len(), 2);
        assert_eq!(series[0].data[0].t, utc("2024-01-05T00:00:00Z"));
        assert_eq!(series[0].data[0].qty, 2);
        assert_eq!(series[0].data[0].revenue, dec!(50.00));
        assert_eq!(series[0].data[1].qty, 1);
        assert_eq!(series[1].brand, "Zenith");
        assert_eq!(series[1].data.len(), 1);
        assert_eq!(series[1].data[0].revenue, dec!(40.00));

        assert_eq!(summary.qty, 4);
        assert_eq!(summary.revenue, dec!(115.00));
    }

    #[test]
    fn test_summary_matches_series_totals() {
        let f = fixture();
        let orders = vec![
            paid_order("2024-01-05T10:00:00Z", vec![item(f.acme, dec!(19.99), 3)]),
            paid_order("2024-02-11T10:00:00Z", vec![item(f.zenith, dec!(7.50), 2)]),
            paid_order("2024-02-20T10:00:00Z", vec![item(f.acme, dec!(19.99), 1)]),
        ];
        let w = window(Granularity::Month, "2024-01-01T00:00:00Z", "2024-12-31T23:59:59Z");
        let (series, summary) = run_pure(orders, &f.products, &f.brand_names, None, &w, chrono_tz::UTC);

        let qty_sum: u64 = series.iter().flat_map(|s| &s.data).map(|p| p.qty).sum();
        let revenue_sum: Decimal = series.iter().flat_map(|s| &s.data).map(|p| p.revenue).sum();
        assert_eq!(summary.qty, qty_sum);
        assert_eq!(summary.revenue, revenue_sum);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let f = fixture();
        let orders = || {
            vec![
                paid_order("2024-01-05T10:00:00Z", vec![item(f.acme, dec!(25), 2)]),
                paid_order("2024-01-06T10:00:00Z", vec![item(f.zenith, dec!(40), 1)]),
            ]
        };
        let w = window(Granularity::Week, "2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z");

        let (first, first_summary) =
            run_pure(orders(), &f.products, &f.brand_names, None, &w, chrono_tz::UTC);
        let (second, second_summary) =
            run_pure(orders(), &f.products, &f.brand_names, None, &w, chrono_tz::UTC);

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(first_summary.qty, second_summary.qty);
        assert_eq!(first_summary.revenue, second_summary.revenue);
    }

    #[test]
    fn test_brand_scope_limits_report() {
        let f = fixture();
        let orders = vec![
            paid_order("2024-01-05T10:00:00Z", vec![item(f.acme, dec!(25), 2)]),
            paid_order("2024-01-05T14:00:00Z", vec![item(f.zenith, dec!(40), 5)]),
        ];
        let scope: HashSet<ProductId> = [f.acme].into_iter().collect();
        let w = window(Granularity::Day, "2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z");
        let (series, summary) =
            run_pure(orders, &f.products, &f.brand_names, Some(&scope), &w, chrono_tz::UTC);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].brand, "Acme");
        assert_eq!(summary.qty, 2);
        assert_eq!(summary.revenue, dec!(50.00));
    }

    #[test]
    fn test_mixed_statuses_and_brand_forms() {
        // One counted order per brand form, one uncounted order, one order
        // with a dangling brand reference.
        let legacy = ProductId::new(Uuid::new_v4());
        let dangling = ProductId::new(Uuid::new_v4());
        let mut f = fixture();
        f.products.insert(
            legacy,
            CatalogProduct {
                price: Some(dec!(5)),
                sale_price: None,
                brand: Some(BrandRef::Legacy("acme outdoors".to_string())),
            },
        );
        f.products.insert(
            dangling,
            CatalogProduct {
                price: Some(dec!(8)),
                sale_price: None,
                brand: Some(BrandRef::Id(BrandId::new(Uuid::new_v4()))),
            },
        );

        let mut uncounted = paid_order("2024-01-05T11:00:00Z", vec![item(f.acme, dec!(25), 9)]);
        uncounted.order_status = "pending".to_string();
        uncounted.payment_status = "unpaid".to_string();

        let orders = vec![
            paid_order("2024-01-05T10:00:00Z", vec![item(f.acme, dec!(25), 1)]),
            paid_order("2024-01-05T12:00:00Z", vec![item(legacy, dec!(5), 2)]),
            paid_order("2024-01-05T13:00:00Z", vec![item(dangling, dec!(8), 1)]),
            uncounted,
        ];
        let w = window(Granularity::Day, "2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z");
        let (series, summary) = run_pure(orders, &f.products, &f.brand_names, None, &w, chrono_tz::UTC);

        let brands: Vec<_> = series.iter().map(|s| s.brand.as_str()).collect();
        // Legacy string verbatim; dangling reference under the sentinel.
        assert_eq!(brands, vec!["Acme", "acme outdoors", "Unknown"]);
        assert_eq!(summary.qty, 4);
        assert_eq!(summary.revenue, dec!(43.00));
    }

    #[test]
    fn test_empty_window_is_success_shaped() {
        let f = fixture();
        let w = window(Granularity::Day, "2030-01-01T00:00:00Z", "2030-01-31T23:59:59Z");
        let (series, summary) =
            run_pure(Vec::new(), &f.products, &f.brand_names, None, &w, chrono_tz::UTC);

        let report = SalesReport {
            success: true,
            period: w.unit,
            start: w.start,
            end: w.end,
            series,
            summary,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["period"], serde_json::json!("day"));
        assert!(json["series"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["qty"], serde_json::json!(0));
        assert_eq!(json["summary"]["revenue"], serde_json::json!(0.0));
    }

    #[test]
    fn test_report_envelope_shape() {
        let f = fixture();
        let orders = vec![paid_order(
            "2024-01-05T10:00:00Z",
            vec![item(f.acme, dec!(19.99), 2)],
        )];
        let w = window(Granularity::Day, "2024-01-01T00:00:00Z", "2024-01-31T23:59:59Z");
        let (series, summary) = run_pure(orders, &f.products, &f.brand_names, None, &w, chrono_tz::UTC);
        let report = SalesReport {
            success: true,
            period: w.unit,
            start: w.start,
            end: w.end,
            series,
            summary,
        };

        let json = serde_json::to_value(&report).unwrap();
        let point = &json["series"][0]["data"][0];
        assert_eq!(point["qty"], serde_json::json!(2));
        // Revenue serializes as a plain JSON number rounded to cents.
        assert_eq!(point["revenue"], serde_json::json!(39.98));
        assert_eq!(json["summary"]["revenue"], serde_json::json!(39.98));
    }

    #[test]
    fn test_dst_fold_takes_earlier_instant() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 2024-11-03 01:30 Eastern happens twice; the earlier is EDT (-04).
        let naive = chrono::NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(local_instant(naive, tz), utc("2024-11-03T05:30:00Z"));
    }
}

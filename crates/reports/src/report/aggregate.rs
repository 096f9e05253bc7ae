//! Bucketed aggregation of resolved line items into per-brand time series.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use clementine_core::{Granularity, round_to_cents};
use rust_decimal::Decimal;

use super::resolve::ResolvedLine;
use super::{BrandSeries, ReportPoint, ReportSummary, local_instant};

/// Truncate an instant to its bucket boundary in the report zone.
///
/// The boundary is local midnight of the day, the ISO week's Monday, the
/// first of the month, or January 1st, converted back to UTC.
pub(crate) fn truncate_to_bucket(ts: DateTime<Utc>, unit: Granularity, tz: Tz) -> DateTime<Utc> {
    let local = ts.with_timezone(&tz);
    let date = local.date_naive();
    let bucket_date = match unit {
        Granularity::Day => date,
        Granularity::Week => {
            date - Days::new(u64::from(local.weekday().num_days_from_monday()))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
        Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    };
    bucket_date
        .and_hms_opt(0, 0, 0)
        .map_or(ts, |naive| local_instant(naive, tz))
}

/// Fold resolved lines into per-brand series plus a global summary.
///
/// Brands appear in first-sale order; within a brand, buckets ascend
/// strictly. Revenue accumulates at full decimal precision and is rounded
/// to cents only when a point or the summary is emitted.
pub(crate) fn aggregate(
    lines: Vec<ResolvedLine>,
    unit: Granularity,
    tz: Tz,
) -> (Vec<BrandSeries>, ReportSummary) {
    let mut brand_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, BTreeMap<DateTime<Utc>, (u64, Decimal)>> = HashMap::new();

    for line in lines {
        let bucket = truncate_to_bucket(line.effective_at, unit, tz);
        if !groups.contains_key(&line.brand_name) {
            brand_order.push(line.brand_name.clone());
        }
        let cell = groups
            .entry(line.brand_name)
            .or_default()
            .entry(bucket)
            .or_insert((0, Decimal::ZERO));
        cell.0 += u64::from(line.quantity);
        cell.1 += line.unit_price * Decimal::from(line.quantity);
    }

    let mut total_qty: u64 = 0;
    let mut total_revenue = Decimal::ZERO;
    let mut series = Vec::with_capacity(brand_order.len());
    for brand in brand_order {
        let Some(buckets) = groups.remove(&brand) else {
            continue;
        };
        let data = buckets
            .into_iter()
            .map(|(t, (qty, revenue))| {
                total_qty += qty;
                total_revenue += revenue;
                ReportPoint {
                    t,
                    qty,
                    revenue: round_to_cents(revenue),
                }
            })
            .collect();
        series.push(BrandSeries { brand, data });
    }

    let summary = ReportSummary {
        qty: total_qty,
        revenue: round_to_cents(total_revenue),
    };
    (series, summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn resolved(at: &str, brand: &str, price: Decimal, quantity: u32) -> ResolvedLine {
        ResolvedLine {
            effective_at: utc(at),
            brand_name: brand.to_string(),
            unit_price: price,
            quantity,
        }
    }

    #[test]
    fn test_truncation_per_unit() {
        let ts = utc("2024-03-14T15:09:26Z");
        let tz = chrono_tz::UTC;
        assert_eq!(
            truncate_to_bucket(ts, Granularity::Day, tz),
            utc("2024-03-14T00:00:00Z")
        );
        // 2024-03-14 is a Thursday; the ISO week starts Monday the 11th.
        assert_eq!(
            truncate_to_bucket(ts, Granularity::Week, tz),
            utc("2024-03-11T00:00:00Z")
        );
        assert_eq!(
            truncate_to_bucket(ts, Granularity::Month, tz),
            utc("2024-03-01T00:00:00Z")
        );
        assert_eq!(
            truncate_to_bucket(ts, Granularity::Year, tz),
            utc("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_truncation_respects_report_zone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 03:00 UTC on the 14th is 22:00 Eastern on the 13th.
        let ts = utc("2024-03-14T03:00:00Z");
        assert_eq!(
            truncate_to_bucket(ts, Granularity::Day, tz),
            utc("2024-03-13T04:00:00Z")
        );
    }

    #[test]
    fn test_same_bucket_sales_collapse() {
        let lines = vec![
            resolved("2024-01-05T08:00:00Z", "Acme", dec!(10), 2),
            resolved("2024-01-05T19:30:00Z", "Acme", dec!(10), 3),
        ];
        let (series, summary) = aggregate(lines, Granularity::Day, chrono_tz::UTC);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].data.len(), 1);
        assert_eq!(series[0].data[0].qty, 5);
        assert_eq!(series[0].data[0].revenue, dec!(50.00));
        assert_eq!(summary.qty, 5);
        assert_eq!(summary.revenue, dec!(50.00));
    }

    #[test]
    fn test_buckets_ascend_strictly() {
        let lines = vec![
            resolved("2024-01-20T12:00:00Z", "Acme", dec!(1), 1),
            resolved("2024-01-05T12:00:00Z", "Acme", dec!(1), 1),
            resolved("2024-01-12T12:00:00Z", "Acme", dec!(1), 1),
        ];
        let (series, _) = aggregate(lines, Granularity::Day, chrono_tz::UTC);
        let stamps: Vec<_> = series[0].data.iter().map(|p| p.t).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stamps.len(), 3);
    }

    #[test]
    fn test_brands_keep_first_sale_order() {
        let lines = vec![
            resolved("2024-01-05T12:00:00Z", "Zenith", dec!(1), 1),
            resolved("2024-01-06T12:00:00Z", "Acme", dec!(1), 1),
            resolved("2024-01-07T12:00:00Z", "Zenith", dec!(1), 1),
        ];
        let (series, _) = aggregate(lines, Granularity::Day, chrono_tz::UTC);
        let brands: Vec<_> = series.iter().map(|s| s.brand.as_str()).collect();
        assert_eq!(brands, vec!["Zenith", "Acme"]);
    }

    #[test]
    fn test_rounding_only_at_output() {
        // Three times 0.333 is 0.999; per-line rounding would give 0.99.
        let lines = vec![
            resolved("2024-01-05T08:00:00Z", "Acme", dec!(0.333), 1),
            resolved("2024-01-05T09:00:00Z", "Acme", dec!(0.333), 1),
            resolved("2024-01-05T10:00:00Z", "Acme", dec!(0.333), 1),
        ];
        let (series, summary) = aggregate(lines, Granularity::Day, chrono_tz::UTC);
        assert_eq!(series[0].data[0].revenue, dec!(1.00));
        assert_eq!(summary.revenue, dec!(1.00));
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let (series, summary) = aggregate(Vec::new(), Granularity::Month, chrono_tz::UTC);
        assert!(series.is_empty());
        assert_eq!(summary.qty, 0);
        assert_eq!(summary.revenue, Decimal::ZERO);
    }
}

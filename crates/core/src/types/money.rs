//! Decimal money helpers.
//!
//! Revenue is carried as [`rust_decimal::Decimal`] through every intermediate
//! sum and rounded to currency-minor-unit precision only at the output
//! boundary, so rounding error never compounds.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to 2 decimal places (currency minor units).
///
/// Uses midpoint-away-from-zero, the conventional rounding for currency.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

//! Fixed-point decimal helpers for monetary amounts.
//!
//! All monetary fields in swapcore use [`rust_decimal::Decimal`] with
//! 8 fractional digits (cryptocurrency precision). Rounding is banker's
//! rounding (midpoint-nearest-even).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::AMOUNT_PRECISION;

/// Round a monetary amount to the canonical 8 decimal places.
#[must_use]
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_PRECISION, RoundingStrategy::MidpointNearestEven)
}

/// Quote-side value of a base amount at the given rate, rounded to
/// canonical precision: `round_amount(amount * rate)`.
#[must_use]
pub fn quote_value(amount: Decimal, rate: Decimal) -> Decimal {
    round_amount(amount * rate)
}

/// Returns `true` for amounts usable in ledger operations: strictly
/// positive and already at canonical precision.
#[must_use]
pub fn is_valid_amount(value: Decimal) -> bool {
    value > Decimal::ZERO && value == round_amount(value)
}

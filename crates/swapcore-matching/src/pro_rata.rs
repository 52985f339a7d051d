//! Pure pro-rata fill distribution for one price level.
//!
//! Every resting order at a level receives a share of the level fill in
//! proportion to its unfilled size, rounded to canonical precision — and
//! the last order iterated absorbs the rounding residual so the shares
//! sum exactly to the level fill. Callers pass orders in time priority
//! (earliest first), which makes the residual land on the most recent
//! order rather than biasing the earliest one.

use rust_decimal::Decimal;
use swapcore_types::numeric;

/// Distribute `fill` across the given unfilled sizes.
///
/// Returns one share per input, in input order. Shares never exceed the
/// corresponding unfilled size; inputs with nothing open receive zero.
/// `fill` must not exceed the sum of `unfilled` (callers clamp with
/// `min(remaining, total_available)`).
#[must_use]
pub fn distribute(unfilled: &[Decimal], fill: Decimal) -> Vec<Decimal> {
    let mut shares = vec![Decimal::ZERO; unfilled.len()];
    let total: Decimal = unfilled
        .iter()
        .copied()
        .filter(|open| *open > Decimal::ZERO)
        .sum();
    if total <= Decimal::ZERO || fill <= Decimal::ZERO {
        return shares;
    }

    let last = unfilled.len() - 1;
    let mut allocated = Decimal::ZERO;
    for (i, &open) in unfilled.iter().enumerate() {
        if open <= Decimal::ZERO {
            continue;
        }
        let share = if i == last {
            // Residual: whatever the rounded earlier shares left over.
            fill - allocated
        } else {
            numeric::round_amount(open / total * fill)
        };
        let share = share.min(open);
        if share > Decimal::ZERO {
            shares[i] = share;
            allocated += share;
        }
    }
    shares
}

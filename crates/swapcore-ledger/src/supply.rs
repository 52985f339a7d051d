//! Supply conservation tracking.
//!
//! Invariant checked on demand:
//! ```text
//! ∀ currency: Σ wallet.balance == Σ deposits − Σ withdrawals
//! ```
//! Transfers and settlements only move funds between wallets, so only
//! deposits and withdrawals may change a currency's total supply. A
//! mismatch means funds were minted or destroyed by a bug.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use swapcore_types::Currency;

/// Tracks per-currency deposit/withdrawal totals since construction.
pub struct SupplyTracker {
    deposits: Mutex<HashMap<Currency, Decimal>>,
    withdrawals: Mutex<HashMap<Currency, Decimal>>,
}

impl SupplyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            deposits: Mutex::new(HashMap::new()),
            withdrawals: Mutex::new(HashMap::new()),
        }
    }

    /// Record an external deposit.
    pub fn record_deposit(&self, currency: &str, amount: Decimal) {
        let mut deposits = self
            .deposits
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *deposits.entry(currency.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    /// Record an external withdrawal.
    pub fn record_withdrawal(&self, currency: &str, amount: Decimal) {
        let mut withdrawals = self
            .withdrawals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *withdrawals
            .entry(currency.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Expected total supply for a currency: deposits − withdrawals.
    #[must_use]
    pub fn expected(&self, currency: &str) -> Decimal {
        let deposited = self
            .deposits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let withdrawn = self
            .withdrawals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO);
        deposited - withdrawn
    }
}

impl Default for SupplyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let tracker = SupplyTracker::new();
        assert_eq!(tracker.expected("BTC"), Decimal::ZERO);
    }

    #[test]
    fn deposits_accumulate() {
        let tracker = SupplyTracker::new();
        tracker.record_deposit("BTC", Decimal::ONE);
        tracker.record_deposit("BTC", Decimal::TWO);
        assert_eq!(tracker.expected("BTC"), Decimal::new(3, 0));
    }

    #[test]
    fn withdrawals_reduce_expected() {
        let tracker = SupplyTracker::new();
        tracker.record_deposit("BTC", Decimal::TEN);
        tracker.record_withdrawal("BTC", Decimal::new(3, 0));
        assert_eq!(tracker.expected("BTC"), Decimal::new(7, 0));
    }

    #[test]
    fn currencies_are_independent() {
        let tracker = SupplyTracker::new();
        tracker.record_deposit("BTC", Decimal::ONE);
        tracker.record_deposit("ETH", Decimal::TEN);
        assert_eq!(tracker.expected("BTC"), Decimal::ONE);
        assert_eq!(tracker.expected("ETH"), Decimal::TEN);
    }
}

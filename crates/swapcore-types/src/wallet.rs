//! Wallet row model.
//!
//! Every wallet carries a total `balance` and a `reserved` portion that is
//! earmarked for open offers or in-flight settlements. The spendable
//! (available) amount is `balance - reserved`. The row invariant
//! `0 <= reserved <= balance` must hold after every mutation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, UserId, WalletId};

/// A single wallet row: one per (owner, currency).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub id: WalletId,
    pub owner: UserId,
    pub currency: Currency,
    /// Total funds held, including the reserved portion.
    pub balance: Decimal,
    /// Portion of `balance` earmarked and not spendable.
    pub reserved: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a fresh empty wallet for a (owner, currency) pair.
    #[must_use]
    pub fn new(owner: UserId, currency: impl Into<Currency>) -> Self {
        Self {
            id: WalletId::new(),
            owner,
            currency: currency.into(),
            balance: Decimal::ZERO,
            reserved: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Spendable funds: `balance - reserved`.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.balance - self.reserved
    }

    /// Row invariant: `0 <= reserved <= balance`.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.reserved >= Decimal::ZERO && self.reserved <= self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_wallet_is_empty() {
        let w = Wallet::new(UserId::new(), "BTC");
        assert_eq!(w.balance, Decimal::ZERO);
        assert_eq!(w.reserved, Decimal::ZERO);
        assert_eq!(w.available(), Decimal::ZERO);
        assert!(w.invariant_holds());
    }

    #[test]
    fn available_subtracts_reserved() {
        let mut w = Wallet::new(UserId::new(), "BTC");
        w.balance = Decimal::new(10, 1); // 1.0
        w.reserved = Decimal::new(6, 1); // 0.6
        assert_eq!(w.available(), Decimal::new(4, 1));
        assert!(w.invariant_holds());
    }

    #[test]
    fn invariant_detects_over_reservation() {
        let mut w = Wallet::new(UserId::new(), "BTC");
        w.balance = Decimal::ONE;
        w.reserved = Decimal::TWO;
        assert!(!w.invariant_holds());

        w.reserved = Decimal::NEGATIVE_ONE;
        assert!(!w.invariant_holds());
    }

    #[test]
    fn serde_roundtrip() {
        let w = Wallet::new(UserId::new(), "ETH");
        let json = serde_json::to_string(&w).unwrap();
        let back: Wallet = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}

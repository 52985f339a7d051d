//! # Reservation — the move-only earmark token
//!
//! A `Reservation` is minted by [`Ledger::reserve`] when funds are
//! earmarked on a wallet row, and is **redeemed by value exactly once** —
//! by [`Ledger::release`], [`Ledger::transfer_reserved`], or
//! [`Ledger::dual_settlement`]. The type is deliberately neither `Clone`
//! nor `Copy` and cannot be constructed outside this crate, so a consumed
//! reservation is gone at compile time: redeeming it twice is not a
//! runtime convention, it is a type error.
//!
//! A failed settlement hands its tokens back (see
//! [`SettlementRollback`](crate::SettlementRollback)) so the caller can
//! run the compensating release.
//!
//! [`Ledger::reserve`]: crate::Ledger::reserve
//! [`Ledger::release`]: crate::Ledger::release
//! [`Ledger::transfer_reserved`]: crate::Ledger::transfer_reserved
//! [`Ledger::dual_settlement`]: crate::Ledger::dual_settlement

use rust_decimal::Decimal;
use swapcore_types::WalletId;

/// Proof that `amount` is earmarked on `wallet`. Redeemable once.
#[derive(Debug)]
pub struct Reservation {
    wallet: WalletId,
    amount: Decimal,
}

impl Reservation {
    /// Only the ledger mints tokens, and only after the earmark committed.
    pub(crate) fn new(wallet: WalletId, amount: Decimal) -> Self {
        Self { wallet, amount }
    }

    /// The wallet row carrying the earmark.
    #[must_use]
    pub fn wallet(&self) -> WalletId {
        self.wallet
    }

    /// The earmarked amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

//! The wallet ledger: every balance mutation in the exchange goes
//! through one of these primitives.
//!
//! Each primitive runs as one all-or-nothing unit over the row-locked
//! wallet table: all participating rows are locked first (ascending
//! `WalletId`, the canonical order), every precondition and the
//! `0 <= reserved <= balance` post-invariant are validated on working
//! copies, and only then are the rows committed. A rejected operation
//! leaves no partial state, so no separate two-phase-commit layer is
//! needed.

use std::sync::Arc;

use rust_decimal::Decimal;
use swapcore_store::Store;
use swapcore_types::{
    numeric, Currency, Result, SwapcoreError, UserId, Wallet, WalletId,
};

use crate::{Reservation, SupplyTracker};

/// A failed dual settlement.
///
/// Both reservation tokens come back **unredeemed** so the caller can run
/// its compensating actions in reverse order: release the later
/// reservation, keep (or separately release) the earlier one. Nothing was
/// written to any wallet row.
#[derive(Debug)]
pub struct SettlementRollback {
    pub seller_base: Reservation,
    pub buyer_quote: Reservation,
    pub error: SwapcoreError,
}

/// The wallet ledger. Cheap to share: all state lives in the injected
/// store and the internal supply tracker.
pub struct Ledger {
    store: Arc<Store>,
    supply: SupplyTracker,
}

impl Ledger {
    /// Build a ledger over the injected store handle.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            supply: SupplyTracker::new(),
        }
    }

    // =================================================================
    // Wallet lifecycle / queries
    // =================================================================

    /// Explicitly create a wallet for (owner, currency).
    ///
    /// # Errors
    /// Returns `WalletExists` if the user already holds one for this
    /// currency.
    pub fn create_wallet(&self, owner: UserId, currency: &str) -> Result<WalletId> {
        self.store.wallets.insert(owner, currency)
    }

    /// Point-in-time copy of a wallet row.
    pub fn wallet(&self, id: WalletId) -> Result<Wallet> {
        self.store.wallets.snapshot(id)
    }

    /// The user's wallet for a currency, if any.
    #[must_use]
    pub fn wallet_for(&self, owner: UserId, currency: &str) -> Option<WalletId> {
        self.store.wallets.find(owner, currency)
    }

    // =================================================================
    // Deposits / withdrawals
    // =================================================================

    /// Credit external funds, creating the wallet on first deposit.
    pub fn deposit(&self, owner: UserId, currency: &str, amount: Decimal) -> Result<WalletId> {
        check_amount(amount)?;
        let wallet = self.store.wallets.get_or_create(owner, currency);
        self.store.wallets.with_rows(&[wallet], |rows| {
            rows[0].balance += amount;
            Ok(())
        })?;
        self.supply.record_deposit(currency, amount);
        Ok(wallet)
    }

    /// Debit spendable funds for an external withdrawal.
    ///
    /// # Errors
    /// Returns `InsufficientAvailable` if the amount exceeds
    /// `balance - reserved`.
    pub fn withdraw(&self, wallet: WalletId, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let currency: Currency = self.store.wallets.with_rows(&[wallet], |rows| {
            let row = &mut rows[0];
            if amount > row.available() {
                return Err(SwapcoreError::InsufficientAvailable {
                    needed: amount,
                    available: row.available(),
                });
            }
            row.balance -= amount;
            Ok(row.currency.clone())
        })?;
        self.supply.record_withdrawal(&currency, amount);
        Ok(())
    }

    // =================================================================
    // Reservations
    // =================================================================

    /// Earmark spendable funds and mint the reservation token.
    ///
    /// Succeeds iff `amount <= balance - reserved` at call time; on
    /// success `reserved` grows by exactly `amount` and the returned
    /// [`Reservation`] is the only way to spend or release the earmark.
    pub fn reserve(&self, wallet: WalletId, amount: Decimal) -> Result<Reservation> {
        check_amount(amount)?;
        self.store.wallets.with_rows(&[wallet], |rows| {
            let row = &mut rows[0];
            if amount > row.available() {
                return Err(SwapcoreError::InsufficientAvailable {
                    needed: amount,
                    available: row.available(),
                });
            }
            row.reserved += amount;
            Ok(())
        })?;
        tracing::debug!(wallet = %wallet, amount = %amount, "Funds reserved");
        Ok(Reservation::new(wallet, amount))
    }

    /// Redeem a token by returning its earmark to the spendable pool.
    ///
    /// # Errors
    /// Returns `InsufficientReserved` — a consistency error, logged
    /// critical and never clamped — if the row carries less reserved than
    /// the token claims. The wallet is left exactly as found.
    pub fn release(&self, reservation: Reservation) -> Result<()> {
        let (wallet, amount) = (reservation.wallet(), reservation.amount());
        let result = self.store.wallets.with_rows(&[wallet], |rows| {
            let row = &mut rows[0];
            if amount > row.reserved {
                return Err(SwapcoreError::InsufficientReserved {
                    needed: amount,
                    reserved: row.reserved,
                });
            }
            row.reserved -= amount;
            Ok(())
        });
        if let Err(err) = &result {
            tracing::error!(
                wallet = %wallet,
                amount = %amount,
                %err,
                "Release refused: reservation tracking is corrupted"
            );
        } else {
            tracing::debug!(wallet = %wallet, amount = %amount, "Reservation released");
        }
        result
    }

    // =================================================================
    // Transfers
    // =================================================================

    /// Move spendable funds between two same-currency wallets.
    ///
    /// Requires `amount <= from.available()`; the post-invariant
    /// `balance >= reserved` is re-validated on the debited row before
    /// commit. All-or-nothing.
    pub fn transfer(&self, from: WalletId, to: WalletId, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        self.store.wallets.with_rows(&[from, to], |rows| {
            let [src, dst] = rows else {
                return Err(SwapcoreError::Internal("transfer expects two rows".into()));
            };
            if src.currency != dst.currency {
                return Err(SwapcoreError::CurrencyMismatch {
                    expected: src.currency.clone(),
                    actual: dst.currency.clone(),
                });
            }
            if amount > src.available() {
                return Err(SwapcoreError::InsufficientAvailable {
                    needed: amount,
                    available: src.available(),
                });
            }
            src.balance -= amount;
            dst.balance += amount;
            Ok(())
        })
    }

    /// Move earmarked funds to another same-currency wallet, redeeming the
    /// token: the source row loses `amount` from both `balance` and
    /// `reserved` in the same commit.
    pub fn transfer_reserved(&self, reservation: Reservation, to: WalletId) -> Result<()> {
        let (from, amount) = (reservation.wallet(), reservation.amount());
        self.store.wallets.with_rows(&[from, to], |rows| {
            let [src, dst] = rows else {
                return Err(SwapcoreError::Internal("transfer expects two rows".into()));
            };
            if src.currency != dst.currency {
                return Err(SwapcoreError::CurrencyMismatch {
                    expected: src.currency.clone(),
                    actual: dst.currency.clone(),
                });
            }
            if amount > src.reserved {
                return Err(SwapcoreError::InsufficientReserved {
                    needed: amount,
                    reserved: src.reserved,
                });
            }
            src.balance -= amount;
            src.reserved -= amount;
            dst.balance += amount;
            Ok(())
        })
    }

    /// Move spendable funds from a wallet to a user's wallet of the same
    /// currency, creating the destination on demand. Used by trade
    /// execution, where the buyer may not hold the base currency yet.
    ///
    /// Returns the destination wallet id.
    pub fn transfer_to_user(
        &self,
        from: WalletId,
        to_user: UserId,
        amount: Decimal,
    ) -> Result<WalletId> {
        let currency = self.store.wallets.snapshot(from)?.currency;
        let to = self.store.wallets.get_or_create(to_user, &currency);
        self.transfer(from, to, amount)?;
        Ok(to)
    }

    // =================================================================
    // Dual settlement
    // =================================================================

    /// Atomically settle both legs of a direct trade: base currency
    /// seller → buyer and quote currency buyer → seller, redeeming both
    /// reservation tokens in one commit.
    ///
    /// All four rows are locked first; both reservation sufficiencies and
    /// both post-invariants are validated before any row is written.
    ///
    /// # Errors
    /// On any failure nothing is written and the tokens come back inside
    /// [`SettlementRollback`] for compensation.
    pub fn dual_settlement(
        &self,
        seller_base: Reservation,
        buyer_base: WalletId,
        buyer_quote: Reservation,
        seller_quote: WalletId,
    ) -> std::result::Result<(), Box<SettlementRollback>> {
        let base_amount = seller_base.amount();
        let quote_amount = buyer_quote.amount();
        let rows = [
            seller_base.wallet(),
            buyer_base,
            buyer_quote.wallet(),
            seller_quote,
        ];

        let applied = self.store.wallets.with_rows(&rows, |rows| {
            let [sb, bb, bq, sq] = rows else {
                return Err(SwapcoreError::Internal(
                    "dual settlement expects four rows".into(),
                ));
            };
            if sb.currency != bb.currency {
                return Err(SwapcoreError::CurrencyMismatch {
                    expected: sb.currency.clone(),
                    actual: bb.currency.clone(),
                });
            }
            if bq.currency != sq.currency {
                return Err(SwapcoreError::CurrencyMismatch {
                    expected: bq.currency.clone(),
                    actual: sq.currency.clone(),
                });
            }
            if sb.reserved < base_amount {
                return Err(SwapcoreError::InsufficientReserved {
                    needed: base_amount,
                    reserved: sb.reserved,
                });
            }
            if bq.reserved < quote_amount {
                return Err(SwapcoreError::InsufficientReserved {
                    needed: quote_amount,
                    reserved: bq.reserved,
                });
            }

            // Base leg: seller → buyer, consuming the seller's earmark.
            sb.balance -= base_amount;
            sb.reserved -= base_amount;
            bb.balance += base_amount;

            // Quote leg: buyer → seller, consuming the buyer's earmark.
            bq.balance -= quote_amount;
            bq.reserved -= quote_amount;
            sq.balance += quote_amount;

            Ok(())
        });

        match applied {
            Ok(()) => {
                tracing::info!(
                    seller_base = %rows[0],
                    buyer_base = %rows[1],
                    buyer_quote = %rows[2],
                    seller_quote = %rows[3],
                    base_amount = %base_amount,
                    quote_amount = %quote_amount,
                    "Dual settlement committed"
                );
                Ok(())
            }
            Err(error) => {
                if error.is_consistency() {
                    tracing::error!(%error, "Dual settlement refused");
                } else {
                    tracing::warn!(%error, "Dual settlement failed");
                }
                Err(Box::new(SettlementRollback {
                    seller_base,
                    buyer_quote,
                    error,
                }))
            }
        }
    }

    // =================================================================
    // Supply conservation
    // =================================================================

    /// Verify that the currency's total wallet balance equals deposits
    /// minus withdrawals. Transfers and settlements must never change it.
    pub fn verify_supply(&self, currency: &str) -> Result<()> {
        let actual = self.store.wallets.total_supply(currency);
        let expected = self.supply.expected(currency);
        if actual != expected {
            let err = SwapcoreError::SupplyViolation {
                reason: format!("{currency}: actual supply {actual} != expected {expected}"),
            };
            tracing::error!(%err, "Supply conservation check failed");
            return Err(err);
        }
        Ok(())
    }

    /// The injected store handle, for components layered on the ledger.
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

fn check_amount(amount: Decimal) -> Result<()> {
    if numeric::is_valid_amount(amount) {
        Ok(())
    } else {
        Err(SwapcoreError::InvalidAmount { amount })
    }
}

//! # swapcore-ledger
//!
//! The wallet ledger plane: every balance mutation in the exchange goes
//! through the primitives in this crate.
//!
//! ## Architecture
//!
//! 1. **Ledger**: `reserve` / `release` / `transfer` / `dual_settlement`
//!    plus deposits, withdrawals, and wallet lifecycle — each primitive is
//!    one all-or-nothing unit over the row-locked wallet table
//! 2. **Reservation**: the move-only earmark token minted by `reserve`
//!    and redeemed at most once (ownership-enforced)
//! 3. **SupplyTracker**: per-currency deposits − withdrawals, checked
//!    against the wallet table on demand
//!
//! ## Invariants
//!
//! - `0 <= reserved <= balance` on every wallet row after every commit
//! - a rejected primitive writes nothing (validate-then-commit)
//! - transfers and settlements never change a currency's total supply

pub mod ledger;
pub mod reservation;
pub mod supply;

pub use ledger::{Ledger, SettlementRollback};
pub use reservation::Reservation;
pub use supply::SupplyTracker;

//! # swapcore-types
//!
//! Shared types, errors, and configuration for the **swapcore** exchange.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`WalletId`], [`OrderId`], [`OfferId`], [`TradeId`], [`CurrencyPair`]
//! - **Wallet model**: [`Wallet`] with balance/reserved accounting
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderStatus`]
//! - **Offer model**: [`Offer`], [`PaymentMethod`]
//! - **Trade model**: [`Trade`], [`TradeStatus`], [`TradeSource`]
//! - **User model**: [`UserProfile`]
//! - **Configuration**: [`MarketConfig`]
//! - **Errors**: [`SwapcoreError`] with `SW_ERR_` prefix codes
//! - **Numeric helpers**: 8-decimal-place fixed-point rounding
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod offer;
pub mod order;
pub mod trade;
pub mod user;
pub mod wallet;

// Re-export all primary types at crate root for ergonomic imports:
//   use swapcore_types::{Wallet, Order, Offer, Trade, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use order::*;
pub use trade::*;
pub use user::*;
pub use wallet::*;

// Constants and numeric helpers are accessed via their modules
// (`swapcore_types::numeric::round_amount`) to keep call sites explicit.

//! # swapcore-offers
//!
//! The offer lifecycle plane: direct peer-to-peer offers with seller-side
//! reservations and atomic dual-currency settlement.
//!
//! ## Flow
//!
//! ```text
//! create  -> validate -> reserve seller base -> park token -> persist
//! accept  -> validate -> reserve buyer quote -> dual_settlement
//!         -> deactivate (no release) -> acceptance row -> trade + stats
//! deactivate -> flip inactive -> optionally release the parked token
//! ```
//!
//! Failure after the buyer's reservation runs explicit compensating
//! actions in reverse (saga-style), never a transactional rollback: the
//! buyer's token is released and the seller's returns to the vault.

pub mod manager;

pub use manager::{AcceptRequest, NewOffer, OfferManager};

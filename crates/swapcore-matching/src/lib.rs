//! # swapcore-matching
//!
//! The order book matching engine for the swapcore exchange.
//!
//! ## Architecture
//!
//! An incoming order flows through:
//!
//! ```text
//! submit -> validate -> persist -> [pair guard] fetch resting side
//!        -> price-cross filter -> group by level -> walk best-first
//!        -> pro-rata shares per level -> execute each fill atomically
//!        -> derive final order status
//! ```
//!
//! 1. **MatchingEngine**: the driver above, single-writer per currency
//!    pair
//! 2. **pro_rata**: the pure per-level distribution function —
//!    proportional shares, canonical rounding, last order absorbs the
//!    residual so every level sums exactly
//!
//! Only the base currency moves in order-book trades; the quote leg is
//! settled off-platform and recorded on the trade as `quote_amount`.

pub mod engine;
pub mod pro_rata;

pub use engine::{MatchOutcome, MatchingEngine, NewOrder};

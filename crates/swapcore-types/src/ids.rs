//! Globally unique identifiers used throughout swapcore.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a user / trading account.
    UserId
}

uuid_id! {
    /// Unique wallet row identifier. Multi-wallet ledger operations lock
    /// rows in ascending `WalletId` order, so the `Ord` impl doubles as
    /// the canonical lock order.
    WalletId
}

uuid_id! {
    /// Globally unique order identifier.
    OrderId
}

uuid_id! {
    /// Globally unique offer identifier.
    OfferId
}

uuid_id! {
    /// Globally unique trade identifier.
    TradeId
}

// ---------------------------------------------------------------------------
// Currency / CurrencyPair
// ---------------------------------------------------------------------------

/// Type alias for currency codes (e.g., "BTC", "ETH", "USDT").
pub type Currency = String;

/// A trading pair: the base currency being bought/sold and the quote
/// currency it is priced in (e.g., BTC/USDT).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    #[must_use]
    pub fn new(base: impl Into<Currency>, quote: impl Into<Currency>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Returns the pair symbol (e.g., "BTC/USDT").
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// A pair is well-formed only when its two legs differ.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.base.is_empty() && !self.quote.is_empty() && self.base != self.quote
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

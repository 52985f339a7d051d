//! Market configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, CurrencyPair};

/// Per-market configuration consumed by the matching engine.
///
/// When the engine is constructed with a market list, incoming orders for
/// unlisted pairs are rejected and the per-market minimum size is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub pair: CurrencyPair,
    /// Minimum order size in base currency.
    pub min_order_size: Decimal,
}

impl MarketConfig {
    #[must_use]
    pub fn new(pair: CurrencyPair) -> Self {
        let (mantissa, scale) = constants::DEFAULT_MIN_ORDER_SIZE;
        Self {
            pair,
            min_order_size: Decimal::new(mantissa, scale),
        }
    }

    #[must_use]
    pub fn with_min_order_size(mut self, min: Decimal) -> Self {
        self.min_order_size = min;
        self
    }

    /// Create a default BTC/USDT market config.
    #[must_use]
    pub fn btc_usdt() -> Self {
        Self::new(CurrencyPair::new("BTC", "USDT")).with_min_order_size(Decimal::new(1, 5))
    }

    /// Create a default ETH/USDT market config.
    #[must_use]
    pub fn eth_usdt() -> Self {
        Self::new(CurrencyPair::new("ETH", "USDT")).with_min_order_size(Decimal::new(1, 4))
    }
}

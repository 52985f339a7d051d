//! Trade records: the immutable result of a fill or an offer acceptance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CurrencyPair, OfferId, OrderId, PaymentMethod, TradeId, UserId};

/// Settlement state of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Awaiting off-platform settlement of the quote leg.
    Pending,
    /// Fully settled. Terminal.
    Completed,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// What produced a trade: a matched order pair or an accepted offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSource {
    /// Produced by the matching engine from two crossing orders.
    Orders { buy: OrderId, sell: OrderId },
    /// Produced by direct acceptance of an offer.
    Offer(OfferId),
}

/// An executed trade. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub buyer: UserId,
    pub seller: UserId,
    pub pair: CurrencyPair,
    /// Executed size in base currency.
    pub amount: Decimal,
    /// Execution price in quote currency per base unit.
    pub rate: Decimal,
    /// Quote-side value: `round8(amount * rate)`.
    pub quote_amount: Decimal,
    /// How the quote leg settles. `None` for order-book trades, whose
    /// quote leg is arranged off-platform.
    pub payment_method: Option<PaymentMethod>,
    pub status: TradeStatus,
    pub source: TradeSource,
    pub executed_at: DateTime<Utc>,
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} @ {} = {}",
            self.id, self.pair, self.amount, self.rate, self.quote_amount,
        )
    }
}

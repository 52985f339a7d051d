//! Order model for the order-book matching engine.
//!
//! Order lifecycle is strictly monotonic:
//!
//! ```text
//!   PENDING ──▶ PARTIAL ──▶ COMPLETED
//!      └────────────────────────▲
//! ```
//!
//! `filled_amount` never decreases, and there is no cancellation path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CurrencyPair, OrderId, UserId};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side an incoming order matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Resting, untouched by any fill.
    Pending,
    /// Partially filled; `0 < filled_amount < amount`.
    Partial,
    /// Fully filled. Terminal.
    Completed,
}

impl OrderStatus {
    /// Can this status transition to the given target?
    ///
    /// Transitions never regress; equal-status updates are allowed so that
    /// a fill which leaves an order partial can still advance
    /// `filled_amount`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        !matches!(
            (self, target),
            (Self::Partial | Self::Completed, Self::Pending) | (Self::Completed, Self::Partial)
        )
    }

    /// Derive the status implied by a fill level.
    #[must_use]
    pub fn from_fill(amount: Decimal, filled: Decimal) -> Self {
        if filled >= amount {
            Self::Completed
        } else if filled > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Pending
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A limit order resting in, or entering, the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: UserId,
    pub pair: CurrencyPair,
    pub side: OrderSide,
    /// Total order size in base currency.
    pub amount: Decimal,
    /// Limit price in quote currency per base unit.
    pub price: Decimal,
    /// Cumulative filled size. Monotonically non-decreasing.
    pub filled_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Unfilled size: `amount - filled_amount`.
    #[must_use]
    pub fn unfilled(&self) -> Decimal {
        self.amount - self.filled_amount
    }

    /// Whether a resting counter-order at `price` crosses this order's
    /// limit: a buy crosses sells at or below its limit, a sell crosses
    /// buys at or above it.
    #[must_use]
    pub fn crosses(&self, price: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => price <= self.price,
            OrderSide::Sell => price >= self.price,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled_amount >= self.amount
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(side: OrderSide, price: Decimal, amount: Decimal) -> Self {
        Self::dummy_limit_for_user(UserId::new(), side, price, amount)
    }

    pub fn dummy_limit_for_user(
        owner: UserId,
        side: OrderSide,
        price: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            id: OrderId::new(),
            owner,
            pair: CurrencyPair::new("BTC", "USDT"),
            side,
            amount,
            price,
            filled_amount: Decimal::ZERO,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn status_transitions_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Partial));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Partial.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Partial.can_transition_to(OrderStatus::Partial));

        assert!(!OrderStatus::Partial.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Partial));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn status_from_fill() {
        let amount = Decimal::new(5, 0);
        assert_eq!(
            OrderStatus::from_fill(amount, Decimal::ZERO),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::from_fill(amount, Decimal::new(2, 0)),
            OrderStatus::Partial
        );
        assert_eq!(
            OrderStatus::from_fill(amount, amount),
            OrderStatus::Completed
        );
    }

    #[test]
    fn buy_crosses_at_or_below_limit() {
        let buy = Order::dummy_limit(OrderSide::Buy, Decimal::new(100, 0), Decimal::ONE);
        assert!(buy.crosses(Decimal::new(99, 0)));
        assert!(buy.crosses(Decimal::new(100, 0)));
        assert!(!buy.crosses(Decimal::new(101, 0)));
    }

    #[test]
    fn sell_crosses_at_or_above_limit() {
        let sell = Order::dummy_limit(OrderSide::Sell, Decimal::new(100, 0), Decimal::ONE);
        assert!(sell.crosses(Decimal::new(101, 0)));
        assert!(sell.crosses(Decimal::new(100, 0)));
        assert!(!sell.crosses(Decimal::new(99, 0)));
    }

    #[test]
    fn unfilled_tracking() {
        let mut order = Order::dummy_limit(OrderSide::Buy, Decimal::new(100, 0), Decimal::TEN);
        assert_eq!(order.unfilled(), Decimal::TEN);
        assert!(!order.is_filled());

        order.filled_amount = Decimal::TEN;
        assert_eq!(order.unfilled(), Decimal::ZERO);
        assert!(order.is_filled());
    }
}

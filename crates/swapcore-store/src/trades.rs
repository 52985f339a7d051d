//! Trade recorder: append-only log of executed trades.
//!
//! Shared by the matching engine and the offer settlement coordinator.
//! Trades are immutable once recorded.

use std::sync::{PoisonError, RwLock};

use swapcore_types::{Trade, TradeId, UserId};

pub struct TradeRecorder {
    log: RwLock<Vec<Trade>>,
}

impl TradeRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: RwLock::new(Vec::new()),
        }
    }

    /// Append a trade to the log.
    pub fn record(&self, trade: Trade) {
        tracing::debug!(
            trade = %trade.id,
            buyer = %trade.buyer,
            seller = %trade.seller,
            pair = %trade.pair,
            amount = %trade.amount,
            rate = %trade.rate,
            "Trade recorded"
        );
        self.write().push(trade);
    }

    /// Look up a trade by id.
    #[must_use]
    pub fn get(&self, id: TradeId) -> Option<Trade> {
        self.read().iter().find(|t| t.id == id).cloned()
    }

    /// All trades a user took part in (either side), newest first.
    #[must_use]
    pub fn for_user(&self, user: UserId) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .read()
            .iter()
            .filter(|t| t.buyer == user || t.seller == user)
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.executed_at.cmp(&a.executed_at).then(b.id.cmp(&a.id)));
        trades
    }

    /// Every recorded trade, in execution order.
    #[must_use]
    pub fn all(&self) -> Vec<Trade> {
        self.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Trade>> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Trade>> {
        self.log.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TradeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

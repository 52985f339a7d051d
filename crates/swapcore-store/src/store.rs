//! The aggregate store handle.
//!
//! A [`Store`] owns every table. It is constructed explicitly by the
//! process entry point and handed to each component (ledger, matching
//! engine, offer manager) at construction — there is no process-wide
//! singleton, and teardown is simply dropping the last `Arc`.

use std::sync::Arc;

use crate::{
    acceptances::AcceptanceLog, offers::OfferTable, orders::OrderTable, trades::TradeRecorder,
    users::UserDirectory, wallets::WalletTable,
};

/// All persistent state of the exchange core.
pub struct Store {
    pub wallets: WalletTable,
    pub orders: OrderTable,
    pub offers: OfferTable,
    pub trades: TradeRecorder,
    pub acceptances: AcceptanceLog,
    pub users: UserDirectory,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wallets: WalletTable::new(),
            orders: OrderTable::new(),
            offers: OfferTable::new(),
            trades: TradeRecorder::new(),
            acceptances: AcceptanceLog::new(),
            users: UserDirectory::new(),
        }
    }

    /// Create an empty store behind a shared handle, ready to inject into
    /// the components.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_empty() {
        let store = Store::new();
        assert!(store.wallets.is_empty());
        assert!(store.orders.is_empty());
        assert!(store.offers.is_empty());
        assert!(store.trades.is_empty());
        assert!(store.acceptances.is_empty());
    }

    #[test]
    fn shared_handle_clones_cheaply() {
        let store = Store::shared();
        let other = Arc::clone(&store);
        assert_eq!(Arc::strong_count(&other), 2);
    }
}

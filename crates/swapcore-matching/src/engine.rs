//! The order book matching engine.
//!
//! An incoming order is persisted, then matched against the resting
//! opposite side of its pair: price-crossing orders are grouped by exact
//! price level, levels are walked best-price-first for the incoming side,
//! and each level's fill is split pro rata across its resting orders in
//! time priority.
//!
//! Matching for one currency pair is serialized by a per-pair guard, so
//! two incoming orders can never both consume the same resting capacity.
//! Each fill commits as one unit: the base-currency transfer, the trade
//! record, and the resting order's advance happen together under the
//! pair guard, with the wallet legs validated before anything is written.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;
use swapcore_ledger::Ledger;
use swapcore_types::{
    numeric, CurrencyPair, MarketConfig, Order, OrderId, OrderSide, OrderStatus, Result,
    SwapcoreError, Trade, TradeId, TradeSource, TradeStatus, UserId,
};

/// Request to place a new limit order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner: UserId,
    pub pair: CurrencyPair,
    pub side: OrderSide,
    pub amount: Decimal,
    pub price: Decimal,
}

/// The result of submitting an order: the post-match order row and the
/// trades it produced.
#[derive(Debug)]
pub struct MatchOutcome {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// The matching engine. Shares the ledger (and through it the store).
pub struct MatchingEngine {
    ledger: Arc<Ledger>,
    /// When configured, incoming orders are gated against this market
    /// list and its per-market minimum size.
    markets: Option<Vec<MarketConfig>>,
    /// One guard per currency pair: matching is single-writer per pair.
    pair_guards: Mutex<HashMap<CurrencyPair, Arc<Mutex<()>>>>,
}

impl MatchingEngine {
    /// Build an engine that accepts any well-formed pair.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            markets: None,
            pair_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Build an engine restricted to the given markets.
    #[must_use]
    pub fn with_markets(ledger: Arc<Ledger>, markets: Vec<MarketConfig>) -> Self {
        Self {
            ledger,
            markets: Some(markets),
            pair_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Validate, persist, and match a new order.
    ///
    /// Returns the order as stored after matching, along with every trade
    /// executed against the resting book.
    pub fn submit(&self, new_order: NewOrder) -> Result<MatchOutcome> {
        self.validate(&new_order)?;

        let order = Order {
            id: OrderId::new(),
            owner: new_order.owner,
            pair: new_order.pair,
            side: new_order.side,
            amount: new_order.amount,
            price: new_order.price,
            filled_amount: Decimal::ZERO,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.ledger.store().orders.insert(order.clone())?;

        // Single writer per pair: hold the guard across the snapshot of
        // the resting side and every fill applied against it.
        let guard = self.pair_guard(&order.pair);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        let trades = self.match_order(&order)?;
        let order = self.ledger.store().orders.get(order.id)?;

        tracing::info!(
            order = %order.id,
            pair = %order.pair,
            side = %order.side,
            status = %order.status,
            filled = %order.filled_amount,
            trades = trades.len(),
            "Matching complete"
        );
        Ok(MatchOutcome { order, trades })
    }

    // =================================================================
    // Matching internals
    // =================================================================

    fn match_order(&self, incoming: &Order) -> Result<Vec<Trade>> {
        let store = self.ledger.store();
        let counter_side = incoming.side.opposite();
        let resting = store.orders.fetch_pending(&incoming.pair, counter_side);

        // Price-crossing orders only, grouped by exact price level.
        // fetch_pending returns time order, so each level keeps it.
        let mut levels: BTreeMap<Decimal, Vec<Order>> = BTreeMap::new();
        for order in resting {
            if incoming.crosses(order.price) {
                levels.entry(order.price).or_default().push(order);
            }
        }

        // Best price first for the incoming side: ascending for a buy,
        // descending for a sell.
        let ordered: Vec<(Decimal, Vec<Order>)> = match incoming.side {
            OrderSide::Buy => levels.into_iter().collect(),
            OrderSide::Sell => levels.into_iter().rev().collect(),
        };

        let mut remaining = incoming.amount;
        let mut trades = Vec::new();

        for (price, orders_at_level) in ordered {
            if remaining <= Decimal::ZERO {
                break;
            }
            let unfilled: Vec<Decimal> = orders_at_level.iter().map(Order::unfilled).collect();
            let total_available: Decimal = unfilled.iter().copied().sum();
            if total_available <= Decimal::ZERO {
                continue;
            }

            let fill_at_level = remaining.min(total_available);
            let shares = crate::pro_rata::distribute(&unfilled, fill_at_level);

            for (resting_order, share) in orders_at_level.iter().zip(shares) {
                if share <= Decimal::ZERO {
                    continue;
                }
                match self.execute_fill(incoming, resting_order, share, price) {
                    Ok(trade) => {
                        trades.push(trade);
                        remaining -= share;
                    }
                    Err(err) if err.is_consistency() => return Err(err),
                    Err(err) => {
                        // Validation failure on this counterparty only
                        // (e.g. seller spent their funds since resting).
                        // Skip the fill; the incoming capacity stays open.
                        tracing::warn!(
                            resting = %resting_order.id,
                            share = %share,
                            %err,
                            "Skipping fill"
                        );
                    }
                }
            }
        }

        let filled = incoming.amount - remaining;
        store.orders.update_status(
            incoming.id,
            OrderStatus::from_fill(incoming.amount, filled),
            filled,
        )?;
        Ok(trades)
    }

    /// Apply one fill as a unit: transfer the base currency seller →
    /// buyer (auto-creating the buyer's wallet), record the trade, and
    /// advance the resting order.
    fn execute_fill(
        &self,
        incoming: &Order,
        resting: &Order,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Trade> {
        let store = self.ledger.store();

        // Re-validate the resting order's live capacity before touching
        // wallets. Under the pair guard nothing else fills it, but the
        // row is the source of truth, not our snapshot.
        let current = store.orders.get(resting.id)?;
        if amount > current.unfilled() || !current.status.can_transition_to(OrderStatus::Partial) {
            return Err(SwapcoreError::MatchingFailed {
                reason: format!("resting order {} lost its capacity", resting.id),
            });
        }

        let (buyer, seller, buy_order, sell_order) = match incoming.side {
            OrderSide::Buy => (incoming.owner, resting.owner, incoming.id, resting.id),
            OrderSide::Sell => (resting.owner, incoming.owner, resting.id, incoming.id),
        };

        let base = &incoming.pair.base;
        let seller_wallet = self.ledger.wallet_for(seller, base).ok_or_else(|| {
            SwapcoreError::MatchingFailed {
                reason: format!("seller {seller} holds no {base} wallet"),
            }
        })?;

        // The wallet leg: all-or-nothing under the row locks.
        self.ledger.transfer_to_user(seller_wallet, buyer, amount)?;

        let new_filled = current.filled_amount + amount;
        store.orders.update_status(
            resting.id,
            OrderStatus::from_fill(current.amount, new_filled),
            new_filled,
        )?;

        let trade = Trade {
            id: TradeId::new(),
            buyer,
            seller,
            pair: incoming.pair.clone(),
            amount,
            rate: price,
            quote_amount: numeric::quote_value(amount, price),
            payment_method: None,
            status: TradeStatus::Completed,
            source: TradeSource::Orders {
                buy: buy_order,
                sell: sell_order,
            },
            executed_at: Utc::now(),
        };
        store.trades.record(trade.clone());

        tracing::debug!(
            trade = %trade.id,
            buyer = %buyer,
            seller = %seller,
            price = %price,
            amount = %amount,
            "Fill executed"
        );
        Ok(trade)
    }

    // =================================================================
    // Validation / guards
    // =================================================================

    fn validate(&self, new_order: &NewOrder) -> Result<()> {
        if !new_order.pair.is_valid() {
            return Err(SwapcoreError::InvalidOrder {
                reason: format!("malformed pair {}", new_order.pair),
            });
        }
        if !numeric::is_valid_amount(new_order.amount) {
            return Err(SwapcoreError::InvalidOrder {
                reason: format!("bad amount {}", new_order.amount),
            });
        }
        if new_order.price <= Decimal::ZERO {
            return Err(SwapcoreError::InvalidOrder {
                reason: format!("bad price {}", new_order.price),
            });
        }
        if let Some(markets) = &self.markets {
            let market = markets
                .iter()
                .find(|m| m.pair == new_order.pair)
                .ok_or_else(|| SwapcoreError::UnknownMarket {
                    pair: new_order.pair.clone(),
                })?;
            if new_order.amount < market.min_order_size {
                return Err(SwapcoreError::BelowMinimumSize {
                    amount: new_order.amount,
                    min: market.min_order_size,
                });
            }
        }
        Ok(())
    }

    fn pair_guard(&self, pair: &CurrencyPair) -> Arc<Mutex<()>> {
        let mut guards = self
            .pair_guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            guards
                .entry(pair.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

#[cfg(test)]
mod tests {
    use swapcore_store::Store;

    use super::*;

    fn dec(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale)
    }

    fn setup() -> (Arc<Ledger>, MatchingEngine) {
        let ledger = Arc::new(Ledger::new(Store::shared()));
        let engine = MatchingEngine::new(Arc::clone(&ledger));
        (ledger, engine)
    }

    fn btc_usdt() -> CurrencyPair {
        CurrencyPair::new("BTC", "USDT")
    }

    /// A funded seller resting `amount` BTC at `price`.
    fn rest_sell(
        ledger: &Ledger,
        engine: &MatchingEngine,
        amount: Decimal,
        price: Decimal,
    ) -> (UserId, Order) {
        let seller = UserId::new();
        ledger.deposit(seller, "BTC", amount).unwrap();
        let outcome = engine
            .submit(NewOrder {
                owner: seller,
                pair: btc_usdt(),
                side: OrderSide::Sell,
                amount,
                price,
            })
            .unwrap();
        assert_eq!(outcome.order.status, OrderStatus::Pending);
        (seller, outcome.order)
    }

    #[test]
    fn no_cross_leaves_both_pending() {
        let (ledger, engine) = setup();
        rest_sell(&ledger, &engine, Decimal::ONE, dec(101, 0));

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: Decimal::ONE,
                price: dec(99, 0),
            })
            .unwrap();

        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.order.status, OrderStatus::Pending);
    }

    #[test]
    fn crossing_buy_fills_at_resting_price() {
        let (ledger, engine) = setup();
        let (seller, sell_order) = rest_sell(&ledger, &engine, Decimal::ONE, dec(100, 0));

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: Decimal::ONE,
                price: dec(105, 0),
            })
            .unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        // Executes at the resting level's price, not the incoming limit.
        assert_eq!(trade.rate, dec(100, 0));
        assert_eq!(trade.amount, Decimal::ONE);
        assert_eq!(trade.buyer, buyer);
        assert_eq!(trade.seller, seller);
        assert_eq!(
            trade.source,
            TradeSource::Orders {
                buy: outcome.order.id,
                sell: sell_order.id
            }
        );

        assert_eq!(outcome.order.status, OrderStatus::Completed);

        // Base currency moved seller -> buyer; buyer wallet auto-created.
        let seller_wallet = ledger.wallet_for(seller, "BTC").unwrap();
        assert_eq!(ledger.wallet(seller_wallet).unwrap().balance, Decimal::ZERO);
        let buyer_wallet = ledger.wallet_for(buyer, "BTC").unwrap();
        assert_eq!(ledger.wallet(buyer_wallet).unwrap().balance, Decimal::ONE);
        ledger.verify_supply("BTC").unwrap();
    }

    #[test]
    fn pro_rata_split_across_one_level() {
        let (ledger, engine) = setup();
        let (_, small) = rest_sell(&ledger, &engine, dec(3, 0), dec(100, 0));
        let (_, large) = rest_sell(&ledger, &engine, dec(7, 0), dec(100, 0));

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: dec(5, 0),
                price: dec(100, 0),
            })
            .unwrap();

        // Resting 3 and 7 share an incoming 5 as exactly 1.5 and 3.5.
        assert_eq!(outcome.trades.len(), 2);
        let store = ledger.store();
        assert_eq!(store.orders.get(small.id).unwrap().filled_amount, dec(15, 1));
        assert_eq!(store.orders.get(large.id).unwrap().filled_amount, dec(35, 1));
        assert_eq!(outcome.order.status, OrderStatus::Completed);

        let total: Decimal = outcome.trades.iter().map(|t| t.amount).sum();
        assert_eq!(total, dec(5, 0));
    }

    #[test]
    fn better_levels_fill_first() {
        let (ledger, engine) = setup();
        let (_, cheap) = rest_sell(&ledger, &engine, Decimal::ONE, dec(98, 0));
        let (_, dear) = rest_sell(&ledger, &engine, Decimal::ONE, dec(100, 0));

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: dec(15, 1), // 1.5
                price: dec(100, 0),
            })
            .unwrap();

        assert_eq!(outcome.trades.len(), 2);
        // The cheaper ask is consumed in full before the dearer one.
        assert_eq!(outcome.trades[0].rate, dec(98, 0));
        assert_eq!(outcome.trades[0].amount, Decimal::ONE);
        assert_eq!(outcome.trades[1].rate, dec(100, 0));
        assert_eq!(outcome.trades[1].amount, dec(5, 1));

        let store = ledger.store();
        assert!(store.orders.get(cheap.id).unwrap().is_filled());
        assert_eq!(store.orders.get(dear.id).unwrap().status, OrderStatus::Partial);
    }

    #[test]
    fn incoming_sell_walks_bids_downward() {
        let (ledger, engine) = setup();
        // Two resting buys at different prices.
        for price in [dec(100, 0), dec(102, 0)] {
            let buyer = UserId::new();
            engine
                .submit(NewOrder {
                    owner: buyer,
                    pair: btc_usdt(),
                    side: OrderSide::Buy,
                    amount: Decimal::ONE,
                    price,
                })
                .unwrap();
        }

        let seller = UserId::new();
        ledger.deposit(seller, "BTC", dec(2, 0)).unwrap();
        let outcome = engine
            .submit(NewOrder {
                owner: seller,
                pair: btc_usdt(),
                side: OrderSide::Sell,
                amount: dec(15, 1),
                price: dec(99, 0),
            })
            .unwrap();

        // Highest bid first.
        assert_eq!(outcome.trades[0].rate, dec(102, 0));
        assert_eq!(outcome.trades[1].rate, dec(100, 0));
        assert_eq!(outcome.order.status, OrderStatus::Completed);
    }

    #[test]
    fn partial_incoming_rests_as_partial() {
        let (ledger, engine) = setup();
        rest_sell(&ledger, &engine, Decimal::ONE, dec(100, 0));

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: dec(4, 0),
                price: dec(100, 0),
            })
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Partial);
        assert_eq!(outcome.order.filled_amount, Decimal::ONE);
    }

    #[test]
    fn partially_filled_orders_leave_the_resting_set() {
        let (ledger, engine) = setup();
        let (_, resting) = rest_sell(&ledger, &engine, dec(10, 0), dec(100, 0));

        let first = UserId::new();
        engine
            .submit(NewOrder {
                owner: first,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: dec(4, 0),
                price: dec(100, 0),
            })
            .unwrap();
        assert_eq!(
            ledger.store().orders.get(resting.id).unwrap().status,
            OrderStatus::Partial
        );

        // A second buy finds no pending liquidity: partial orders rest out.
        let second = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: second,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: Decimal::ONE,
                price: dec(100, 0),
            })
            .unwrap();
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.order.status, OrderStatus::Pending);
    }

    #[test]
    fn underfunded_seller_is_skipped() {
        let (ledger, engine) = setup();
        // Funded seller resting 1 BTC, and a second resting order whose
        // seller spent their funds after placing it.
        let (_, good) = rest_sell(&ledger, &engine, Decimal::ONE, dec(100, 0));
        let (broke_seller, bad) = rest_sell(&ledger, &engine, Decimal::ONE, dec(100, 0));
        let broke_wallet = ledger.wallet_for(broke_seller, "BTC").unwrap();
        ledger.withdraw(broke_wallet, Decimal::ONE).unwrap();

        let buyer = UserId::new();
        let outcome = engine
            .submit(NewOrder {
                owner: buyer,
                pair: btc_usdt(),
                side: OrderSide::Buy,
                amount: dec(2, 0),
                price: dec(100, 0),
            })
            .unwrap();

        // Only the funded half executed; the skipped share stays open on
        // the incoming order, and the broke seller's row is untouched.
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.order.status, OrderStatus::Partial);
        assert_eq!(outcome.order.filled_amount, Decimal::ONE);
        let store = ledger.store();
        assert!(store.orders.get(good.id).unwrap().is_filled());
        assert_eq!(store.orders.get(bad.id).unwrap().filled_amount, Decimal::ZERO);
    }

    #[test]
    fn validation_rejects_malformed_orders() {
        let (_, engine) = setup();
        let base = NewOrder {
            owner: UserId::new(),
            pair: btc_usdt(),
            side: OrderSide::Buy,
            amount: Decimal::ONE,
            price: dec(100, 0),
        };

        let mut same_leg = base.clone();
        same_leg.pair = CurrencyPair::new("BTC", "BTC");
        assert!(matches!(
            engine.submit(same_leg),
            Err(SwapcoreError::InvalidOrder { .. })
        ));

        let mut zero_amount = base.clone();
        zero_amount.amount = Decimal::ZERO;
        assert!(matches!(
            engine.submit(zero_amount),
            Err(SwapcoreError::InvalidOrder { .. })
        ));

        let mut bad_price = base;
        bad_price.price = Decimal::ZERO;
        assert!(matches!(
            engine.submit(bad_price),
            Err(SwapcoreError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn market_list_gates_pairs_and_size() {
        let ledger = Arc::new(Ledger::new(Store::shared()));
        let market = MarketConfig::new(btc_usdt()).with_min_order_size(dec(1, 2));
        let engine = MatchingEngine::with_markets(Arc::clone(&ledger), vec![market]);

        let unknown = NewOrder {
            owner: UserId::new(),
            pair: CurrencyPair::new("DOGE", "USDT"),
            side: OrderSide::Buy,
            amount: Decimal::ONE,
            price: dec(1, 0),
        };
        assert!(matches!(
            engine.submit(unknown),
            Err(SwapcoreError::UnknownMarket { .. })
        ));

        let dust = NewOrder {
            owner: UserId::new(),
            pair: btc_usdt(),
            side: OrderSide::Buy,
            amount: dec(1, 3), // 0.001 < 0.01 minimum
            price: dec(100, 0),
        };
        assert!(matches!(
            engine.submit(dust),
            Err(SwapcoreError::BelowMinimumSize { .. })
        ));
    }

    #[test]
    fn concurrent_submissions_never_oversell_resting_capacity() {
        use std::thread;

        let (ledger, engine) = setup();
        let engine = Arc::new(engine);
        // One resting sell of 4 BTC.
        let (_, resting) = rest_sell(&ledger, &engine, dec(4, 0), dec(100, 0));

        // Eight concurrent full-size buys race for the same liquidity.
        // Without per-pair serialization, several could snapshot the sell
        // as pending and all believe the 4 BTC are theirs.
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                let outcome = engine
                    .submit(NewOrder {
                        owner: UserId::new(),
                        pair: CurrencyPair::new("BTC", "USDT"),
                        side: OrderSide::Buy,
                        amount: dec(4, 0),
                        price: dec(100, 0),
                    })
                    .unwrap();
                outcome
                    .trades
                    .iter()
                    .map(|t| t.amount)
                    .sum::<Decimal>()
            }));
        }
        let mut executed = Decimal::ZERO;
        for handle in handles {
            executed += handle.join().unwrap();
        }

        // Exactly one winner took the liquidity; nothing oversold.
        assert_eq!(executed, dec(4, 0));
        let row = ledger.store().orders.get(resting.id).unwrap();
        assert_eq!(row.filled_amount, dec(4, 0));
        assert_eq!(row.status, OrderStatus::Completed);
        ledger.verify_supply("BTC").unwrap();
    }
}

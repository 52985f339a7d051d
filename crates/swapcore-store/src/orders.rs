//! Order table with monotonic status enforcement.
//!
//! This is the store query surface the matching engine consumes:
//! [`OrderTable::fetch_pending`] returns the resting side of the book and
//! [`OrderTable::update_status`] advances a row, refusing any update that
//! would regress `filled_amount` or the status machine.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use swapcore_types::{
    CurrencyPair, Order, OrderId, OrderSide, OrderStatus, Result, SwapcoreError,
};
use rust_decimal::Decimal;

pub struct OrderTable {
    rows: RwLock<HashMap<OrderId, Order>>,
}

impl OrderTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Persist a new order.
    ///
    /// # Errors
    /// Returns `DuplicateOrder` if the id is already present.
    pub fn insert(&self, order: Order) -> Result<()> {
        let mut rows = self.write();
        if rows.contains_key(&order.id) {
            return Err(SwapcoreError::DuplicateOrder(order.id));
        }
        rows.insert(order.id, order);
        Ok(())
    }

    /// Point-in-time copy of an order row.
    ///
    /// # Errors
    /// Returns `OrderNotFound` if the row does not exist.
    pub fn get(&self, id: OrderId) -> Result<Order> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(SwapcoreError::OrderNotFound(id))
    }

    /// All `Pending` orders for a pair on one side, earliest first
    /// (creation time, ties broken by id).
    #[must_use]
    pub fn fetch_pending(&self, pair: &CurrencyPair, side: OrderSide) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .read()
            .values()
            .filter(|o| o.status == OrderStatus::Pending && o.side == side && o.pair == *pair)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        orders
    }

    /// Advance an order's status and cumulative fill.
    ///
    /// # Errors
    /// - `OrderNotFound` if the row does not exist
    /// - `FillRegression` if the update would shrink `filled_amount`,
    ///   overfill the order, or regress the status machine — the row is
    ///   left untouched and the violation logged
    pub fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        filled_amount: Decimal,
    ) -> Result<()> {
        let mut rows = self.write();
        let order = rows.get_mut(&id).ok_or(SwapcoreError::OrderNotFound(id))?;

        let legal = filled_amount >= order.filled_amount
            && filled_amount <= order.amount
            && order.status.can_transition_to(status)
            && status == OrderStatus::from_fill(order.amount, filled_amount);
        if !legal {
            tracing::error!(
                order = %id,
                current_status = %order.status,
                current_filled = %order.filled_amount,
                requested_status = %status,
                requested_filled = %filled_amount,
                "Refusing order update: fill or status regression"
            );
            return Err(SwapcoreError::FillRegression { order: id });
        }

        order.status = status;
        order.filled_amount = filled_amount;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OrderTable {
    fn default() -> Self {
        Self::new()
    }
}

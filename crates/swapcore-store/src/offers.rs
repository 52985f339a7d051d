//! Offer table.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use swapcore_types::{Offer, OfferId, Result, SwapcoreError};

pub struct OfferTable {
    rows: RwLock<HashMap<OfferId, Offer>>,
}

impl OfferTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Persist a new offer.
    pub fn insert(&self, offer: Offer) {
        self.write().insert(offer.id, offer);
    }

    /// Point-in-time copy of an offer row.
    ///
    /// # Errors
    /// Returns `OfferNotFound` if the row does not exist.
    pub fn get(&self, id: OfferId) -> Result<Offer> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(SwapcoreError::OfferNotFound(id))
    }

    /// All currently active offers, newest first.
    #[must_use]
    pub fn active(&self) -> Vec<Offer> {
        let mut offers: Vec<Offer> = self
            .read()
            .values()
            .filter(|o| o.active)
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        offers
    }

    /// Flip an offer inactive. One-way: an already-inactive offer stays
    /// inactive and the call still succeeds.
    ///
    /// # Errors
    /// Returns `OfferNotFound` if the row does not exist.
    pub fn deactivate(&self, id: OfferId) -> Result<Offer> {
        let mut rows = self.write();
        let offer = rows.get_mut(&id).ok_or(SwapcoreError::OfferNotFound(id))?;
        offer.active = false;
        Ok(offer.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<OfferId, Offer>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<OfferId, Offer>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OfferTable {
    fn default() -> Self {
        Self::new()
    }
}

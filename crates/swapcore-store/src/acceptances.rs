//! Offer acceptance log.
//!
//! One row per (offer, buyer). The row is written inside the acceptance
//! flow after settlement commits, and its uniqueness makes double
//! acceptance of the same offer by the same buyer structurally
//! impossible.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use swapcore_types::{OfferId, Result, SwapcoreError, UserId};

pub struct AcceptanceLog {
    rows: RwLock<HashSet<(OfferId, UserId)>>,
}

impl AcceptanceLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashSet::new()),
        }
    }

    /// Record that `buyer` accepted `offer`.
    ///
    /// # Errors
    /// Returns `AlreadyAccepted` if the pair is already present.
    pub fn record(&self, offer: OfferId, buyer: UserId) -> Result<()> {
        let mut rows = self.write();
        if !rows.insert((offer, buyer)) {
            return Err(SwapcoreError::AlreadyAccepted { offer, buyer });
        }
        Ok(())
    }

    /// Whether an acceptance row exists for (offer, buyer).
    #[must_use]
    pub fn contains(&self, offer: OfferId, buyer: UserId) -> bool {
        self.read().contains(&(offer, buyer))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashSet<(OfferId, UserId)>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<(OfferId, UserId)>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AcceptanceLog {
    fn default() -> Self {
        Self::new()
    }
}

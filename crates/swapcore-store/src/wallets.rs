//! Row-locked wallet table.
//!
//! Each wallet row sits behind its own mutex. Multi-row operations go
//! through [`WalletTable::with_rows`], which acquires every requested row
//! lock in **ascending `WalletId` order** (the canonical lock order, so
//! opposite-direction transfers cannot deadlock), runs the caller's
//! closure against working copies, and commits all rows only when the
//! closure succeeds and every row still satisfies `0 <= reserved <=
//! balance`. A failing operation therefore leaves no partial state, and
//! concurrent callers contending on a row serialize on its lock — one of
//! them observes the other's committed post-state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use swapcore_types::{Currency, Result, SwapcoreError, UserId, Wallet, WalletId};
use rust_decimal::Decimal;

/// Recover a mutex guard even if a previous holder panicked. Rows only
/// ever hold fully committed states (mutations go through `with_rows`,
/// which writes back complete rows), so the inner value is always usable.
fn lock_row(row: &Mutex<Wallet>) -> MutexGuard<'_, Wallet> {
    row.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The wallet table: one lockable row per wallet, plus an (owner,
/// currency) index. At most one wallet exists per (owner, currency).
pub struct WalletTable {
    rows: RwLock<HashMap<WalletId, Arc<Mutex<Wallet>>>>,
    by_owner: RwLock<HashMap<(UserId, Currency), WalletId>>,
}

impl WalletTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            by_owner: RwLock::new(HashMap::new()),
        }
    }

    // =================================================================
    // Creation / lookup
    // =================================================================

    /// Create a wallet for (owner, currency).
    ///
    /// # Errors
    /// Returns `WalletExists` if the user already holds a wallet for this
    /// currency.
    pub fn insert(&self, owner: UserId, currency: &str) -> Result<WalletId> {
        let mut index = write(&self.by_owner);
        if index.contains_key(&(owner, currency.to_string())) {
            return Err(SwapcoreError::WalletExists {
                owner,
                currency: currency.to_string(),
            });
        }
        let wallet = Wallet::new(owner, currency);
        let id = wallet.id;
        index.insert((owner, currency.to_string()), id);
        write(&self.rows).insert(id, Arc::new(Mutex::new(wallet)));
        Ok(id)
    }

    /// Find the user's wallet for a currency, creating an empty one if
    /// absent (wallets are created on demand at first deposit / credit).
    /// The index lock is held across the lookup and the creation, so two
    /// racing callers resolve to the same row.
    pub fn get_or_create(&self, owner: UserId, currency: &str) -> WalletId {
        let mut index = write(&self.by_owner);
        if let Some(id) = index.get(&(owner, currency.to_string())) {
            return *id;
        }
        let wallet = Wallet::new(owner, currency);
        let id = wallet.id;
        index.insert((owner, currency.to_string()), id);
        write(&self.rows).insert(id, Arc::new(Mutex::new(wallet)));
        id
    }

    /// The user's wallet for a currency, if any.
    #[must_use]
    pub fn find(&self, owner: UserId, currency: &str) -> Option<WalletId> {
        read(&self.by_owner)
            .get(&(owner, currency.to_string()))
            .copied()
    }

    /// Point-in-time copy of a wallet row.
    ///
    /// # Errors
    /// Returns `WalletNotFound` if the row does not exist.
    pub fn snapshot(&self, id: WalletId) -> Result<Wallet> {
        let arc = self.row(id)?;
        let guard = lock_row(&arc);
        Ok(guard.clone())
    }

    /// Point-in-time copies of all wallets owned by a user.
    #[must_use]
    pub fn snapshots_for(&self, owner: UserId) -> Vec<Wallet> {
        let ids: Vec<WalletId> = read(&self.by_owner)
            .iter()
            .filter(|((o, _), _)| *o == owner)
            .map(|(_, id)| *id)
            .collect();
        let mut wallets: Vec<Wallet> = ids
            .into_iter()
            .filter_map(|id| self.snapshot(id).ok())
            .collect();
        wallets.sort_by(|a, b| a.currency.cmp(&b.currency));
        wallets
    }

    // =================================================================
    // Transactional mutation
    // =================================================================

    /// Run `f` against working copies of the requested rows, holding every
    /// row lock for the duration, and commit the copies back only on
    /// success.
    ///
    /// Rows are handed to `f` in the order `ids` lists them, but the locks
    /// are acquired in ascending `WalletId` order. After `f` returns `Ok`,
    /// every row is re-validated against the balance invariant before
    /// anything is written; a violation aborts the whole operation with
    /// no effect.
    ///
    /// # Errors
    /// - `WalletNotFound` if any id is unknown (no locks taken)
    /// - `Internal` if `ids` contains duplicates
    /// - `InvariantViolation` if `f` left a row with `reserved > balance`
    /// - whatever `f` itself returns
    pub fn with_rows<R>(
        &self,
        ids: &[WalletId],
        f: impl FnOnce(&mut [Wallet]) -> Result<R>,
    ) -> Result<R> {
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(SwapcoreError::Internal(format!(
                    "duplicate wallet row {id} in lock set"
                )));
            }
        }

        // Resolve every row before locking anything.
        let arcs: Vec<Arc<Mutex<Wallet>>> = ids
            .iter()
            .map(|id| self.row(*id))
            .collect::<Result<Vec<_>>>()?;

        // Canonical acquisition order: ascending wallet id.
        let mut order: Vec<usize> = (0..ids.len()).collect();
        order.sort_by_key(|&i| ids[i]);

        let mut slots: Vec<Option<MutexGuard<'_, Wallet>>> =
            ids.iter().map(|_| None).collect();
        for &i in &order {
            slots[i] = Some(lock_row(&arcs[i]));
        }
        let mut guards: Vec<MutexGuard<'_, Wallet>> = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SwapcoreError::Internal("wallet row lock slot empty".into()))?;

        // Validate-then-write: f works on copies; rows commit only on Ok.
        let mut work: Vec<Wallet> = guards.iter().map(|g| (**g).clone()).collect();
        let out = f(&mut work)?;

        for wallet in &work {
            if !wallet.invariant_holds() {
                tracing::error!(
                    wallet = %wallet.id,
                    balance = %wallet.balance,
                    reserved = %wallet.reserved,
                    "Refusing commit: balance invariant violated"
                );
                return Err(SwapcoreError::InvariantViolation { wallet: wallet.id });
            }
        }

        for (guard, wallet) in guards.iter_mut().zip(work) {
            **guard = wallet;
        }
        Ok(out)
    }

    // =================================================================
    // Aggregates
    // =================================================================

    /// Total balance held across all wallets of a currency.
    #[must_use]
    pub fn total_supply(&self, currency: &str) -> Decimal {
        let arcs: Vec<Arc<Mutex<Wallet>>> = read(&self.rows).values().cloned().collect();
        arcs.iter()
            .map(|arc| {
                let row = lock_row(arc);
                if row.currency == currency {
                    row.balance
                } else {
                    Decimal::ZERO
                }
            })
            .sum()
    }

    /// Number of wallet rows.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.rows).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(&self, id: WalletId) -> Result<Arc<Mutex<Wallet>>> {
        read(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(SwapcoreError::WalletNotFound(id))
    }
}

impl Default for WalletTable {
    fn default() -> Self {
        Self::new()
    }
}

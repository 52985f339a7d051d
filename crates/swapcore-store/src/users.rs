//! User directory: trading statistics per user.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use swapcore_types::{UserId, UserProfile};

pub struct UserDirectory {
    rows: RwLock<HashMap<UserId, UserProfile>>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Advance a user's completed-trade counter, creating the profile on
    /// first use.
    pub fn record_completed_trade(&self, user: UserId) {
        let mut rows = self.write();
        let profile = rows.entry(user).or_insert_with(|| UserProfile::new(user));
        profile.completed_trades += 1;
    }

    /// The user's profile; a zeroed profile if none has been recorded yet.
    #[must_use]
    pub fn profile(&self, user: UserId) -> UserProfile {
        self.read()
            .get(&user)
            .cloned()
            .unwrap_or_else(|| UserProfile::new(user))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<UserId, UserProfile>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<UserId, UserProfile>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_has_zero_trades() {
        let dir = UserDirectory::new();
        assert_eq!(dir.profile(UserId::new()).completed_trades, 0);
    }

    #[test]
    fn counter_advances() {
        let dir = UserDirectory::new();
        let user = UserId::new();
        dir.record_completed_trade(user);
        dir.record_completed_trade(user);
        assert_eq!(dir.profile(user).completed_trades, 2);
    }
}

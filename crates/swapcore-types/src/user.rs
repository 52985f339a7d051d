//! User trading-statistics profile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Per-user trading statistics, advanced on every completed offer trade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    /// Number of completed trades this user took part in (either side).
    pub completed_trades: u64,
    /// Fraction of initiated trades that completed successfully.
    pub success_rate: Decimal,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            completed_trades: 0,
            success_rate: Decimal::ZERO,
        }
    }
}

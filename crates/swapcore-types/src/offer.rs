//! Direct peer-to-peer offer model.
//!
//! A seller posts an offer to exchange `amount` of the base currency at a
//! fixed `rate`. Offers accepting the on-platform wallet method carry a
//! seller-side reservation so the promised funds cannot be spent elsewhere
//! while the offer is live. The `active` flag flips one way: an offer that
//! has been accepted or withdrawn never reactivates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{numeric, CurrencyPair, OfferId, UserId, WalletId};

/// How the quote leg of an offer trade is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Instant on-platform settlement through both parties' wallets.
    /// The only method the settlement coordinator executes itself.
    PlatformWallet,
    /// Off-platform bank transfer.
    BankTransfer,
    /// Off-platform cash exchange.
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformWallet => write!(f, "PLATFORM_WALLET"),
            Self::BankTransfer => write!(f, "BANK_TRANSFER"),
            Self::Cash => write!(f, "CASH"),
        }
    }
}

/// A direct offer posted by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub seller: UserId,
    pub pair: CurrencyPair,
    /// Base-currency amount on offer. Accepted in full or not at all.
    pub amount: Decimal,
    /// Quote currency per base unit.
    pub rate: Decimal,
    pub payment_methods: Vec<PaymentMethod>,
    /// Wallet holding the seller-side reservation, when one was taken.
    pub reserved_wallet: Option<WalletId>,
    /// Amount reserved on `reserved_wallet`. Zero when no reservation.
    pub reserved_amount: Decimal,
    /// One-way flag: flips to `false` on acceptance or withdrawal.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Quote-currency value of the full offer: `round8(amount * rate)`.
    #[must_use]
    pub fn quote_amount(&self) -> Decimal {
        numeric::quote_value(self.amount, self.rate)
    }

    /// Whether the offer settles through on-platform wallets.
    #[must_use]
    pub fn accepts_platform_wallet(&self) -> bool {
        self.payment_methods.contains(&PaymentMethod::PlatformWallet)
    }
}

//! Error types for the swapcore exchange.
//!
//! All errors use the `SW_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Wallet / balance errors
//! - 2xx: Reservation errors
//! - 3xx: Order errors
//! - 4xx: Matching errors
//! - 5xx: Offer errors
//! - 6xx: Settlement / trade errors
//! - 9xx: General / internal errors
//!
//! Failures cross every component boundary as `Result` values; none of the
//! core components panic across their public surface.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Currency, CurrencyPair, OfferId, OrderId, PaymentMethod, UserId, WalletId};

/// Central error enum for all swapcore operations.
#[derive(Debug, Error)]
pub enum SwapcoreError {
    // =================================================================
    // Wallet / Balance Errors (1xx)
    // =================================================================
    /// The referenced wallet row does not exist.
    #[error("SW_ERR_100: Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// The user already holds a wallet for this currency.
    #[error("SW_ERR_101: Wallet already exists for user {owner} and currency {currency}")]
    WalletExists { owner: UserId, currency: Currency },

    /// Not enough spendable (non-reserved) funds for the operation.
    #[error("SW_ERR_102: Insufficient available funds: need {needed}, have {available}")]
    InsufficientAvailable { needed: Decimal, available: Decimal },

    /// A mutation would leave `reserved > balance` on a wallet row.
    /// Indicates a bug elsewhere; the operation is refused, never clamped.
    #[error("SW_ERR_103: Balance invariant violated on wallet {wallet}")]
    InvariantViolation { wallet: WalletId },

    /// The operation spans wallets of different currencies.
    #[error("SW_ERR_104: Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    /// The amount is zero, negative, or beyond canonical precision.
    #[error("SW_ERR_105: Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// The user holds no wallet for the required currency.
    #[error("SW_ERR_106: User {owner} holds no {currency} wallet")]
    MissingWallet { owner: UserId, currency: Currency },

    // =================================================================
    // Reservation Errors (2xx)
    // =================================================================
    /// A release or settlement needs more reserved funds than the wallet
    /// row currently carries. Indicates the reservation was already
    /// consumed or corrupted elsewhere.
    #[error("SW_ERR_200: Insufficient reserved funds: need {needed}, have {reserved}")]
    InsufficientReserved { needed: Decimal, reserved: Decimal },

    /// The offer carries no reservation but one is required.
    #[error("SW_ERR_201: Offer {0} has no reserved funds")]
    MissingReservation(OfferId),

    // =================================================================
    // Order Errors (3xx)
    // =================================================================
    /// The referenced order does not exist.
    #[error("SW_ERR_300: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed validation (bad amount, bad price, bad pair).
    #[error("SW_ERR_301: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An update would regress `filled_amount` or the status machine.
    /// Indicates a bug elsewhere; the row is left untouched.
    #[error("SW_ERR_302: Fill regression on order {order}")]
    FillRegression { order: OrderId },

    /// The currency pair is not in the configured market list.
    #[error("SW_ERR_303: Unknown market: {pair}")]
    UnknownMarket { pair: CurrencyPair },

    /// The order is below the market's minimum size.
    #[error("SW_ERR_304: Order size {amount} below market minimum {min}")]
    BelowMinimumSize { amount: Decimal, min: Decimal },

    /// An order with this ID already exists.
    #[error("SW_ERR_305: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    // =================================================================
    // Matching Errors (4xx)
    // =================================================================
    /// The matching algorithm failed mid-flight.
    #[error("SW_ERR_400: Matching failed: {reason}")]
    MatchingFailed { reason: String },

    // =================================================================
    // Offer Errors (5xx)
    // =================================================================
    /// The referenced offer does not exist.
    #[error("SW_ERR_500: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer has been deactivated.
    #[error("SW_ERR_501: Offer no longer active: {0}")]
    OfferInactive(OfferId),

    /// The offer failed validation (bad pair, bad rate, bad amount).
    #[error("SW_ERR_502: Invalid offer: {reason}")]
    InvalidOffer { reason: String },

    /// A seller attempted to accept their own offer.
    #[error("SW_ERR_503: Cannot accept own offer")]
    SelfAcceptance,

    /// Offers are accepted in full only.
    #[error("SW_ERR_504: Partial acceptance not supported: requested {requested} of {offered}")]
    PartialAcceptance { requested: Decimal, offered: Decimal },

    /// The payment method cannot be settled on-platform.
    #[error("SW_ERR_505: Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(PaymentMethod),

    /// This buyer already accepted this offer.
    #[error("SW_ERR_506: Offer {offer} already accepted by {buyer}")]
    AlreadyAccepted { offer: OfferId, buyer: UserId },

    // =================================================================
    // Settlement / Trade Errors (6xx)
    // =================================================================
    /// The dual settlement could not be applied.
    #[error("SW_ERR_600: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Per-currency supply stopped matching deposits minus withdrawals.
    #[error("SW_ERR_601: Supply invariant violation: {reason}")]
    SupplyViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SW_ERR_900: Internal error: {0}")]
    Internal(String),
}

impl SwapcoreError {
    /// Whether this error signals an internal consistency violation
    /// (a bug elsewhere) rather than an ordinary validation failure.
    /// Consistency failures are logged at `error!` level and must never
    /// be silently repaired.
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation { .. }
                | Self::InsufficientReserved { .. }
                | Self::FillRegression { .. }
                | Self::SupplyViolation { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapcoreError>;

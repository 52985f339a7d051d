//! Offer lifecycle: create, accept, deactivate.
//!
//! ## Acceptance flow
//!
//! Acceptance is a saga over two independent ledger operations, not one
//! transaction, so failure handling is explicit compensation rather than
//! rollback:
//!
//! 1. Reserve the buyer's quote funds (compensable from here on).
//! 2. Redeem the seller's parked reservation and the buyer's fresh one in
//!    a single `dual_settlement`.
//! 3. On success: deactivate the offer *without* releasing (both earmarks
//!    were consumed by the settlement), write the acceptance row, record
//!    the trade, advance both parties' statistics.
//! 4. On failure: the settlement hands both tokens back — the buyer's is
//!    released (the compensating action) and the seller's returns to the
//!    vault, leaving the offer exactly as it was before the attempt.
//!
//! The reservation tokens live in the manager's vault and move out at
//! most once, so a consumed reservation can never be released a second
//! time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;
use swapcore_ledger::{Ledger, Reservation};
use swapcore_types::{
    numeric, CurrencyPair, Offer, OfferId, PaymentMethod, Result, SwapcoreError, Trade, TradeId,
    TradeSource, TradeStatus, UserId, WalletId,
};

/// Request to post a new offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub seller: UserId,
    pub pair: CurrencyPair,
    pub amount: Decimal,
    pub rate: Decimal,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Request to accept an offer. `amount` may be omitted (full fill) but
/// when present must equal the offer amount — partial fills are rejected.
#[derive(Debug, Clone)]
pub struct AcceptRequest {
    pub offer: OfferId,
    pub buyer: UserId,
    pub amount: Option<Decimal>,
    pub payment_method: PaymentMethod,
}

/// The offer lifecycle manager and settlement coordinator.
pub struct OfferManager {
    ledger: Arc<Ledger>,
    /// Parked seller reservations, keyed by offer. Tokens enter at offer
    /// creation and leave exactly once: into settlement or release.
    vault: Mutex<HashMap<OfferId, Reservation>>,
}

impl OfferManager {
    #[must_use]
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            vault: Mutex::new(HashMap::new()),
        }
    }

    // =================================================================
    // Create
    // =================================================================

    /// Validate and persist a new offer. When the offer settles through
    /// on-platform wallets, the seller's base funds are reserved first;
    /// any failure aborts creation with nothing persisted.
    pub fn create(&self, new_offer: NewOffer) -> Result<Offer> {
        if !new_offer.pair.is_valid() {
            return Err(SwapcoreError::InvalidOffer {
                reason: format!("malformed pair {}", new_offer.pair),
            });
        }
        if new_offer.rate <= Decimal::ZERO {
            return Err(SwapcoreError::InvalidOffer {
                reason: format!("bad rate {}", new_offer.rate),
            });
        }
        if !numeric::is_valid_amount(new_offer.amount) {
            return Err(SwapcoreError::InvalidOffer {
                reason: format!("bad amount {}", new_offer.amount),
            });
        }

        let mut offer = Offer {
            id: OfferId::new(),
            seller: new_offer.seller,
            pair: new_offer.pair,
            amount: new_offer.amount,
            rate: new_offer.rate,
            payment_methods: new_offer.payment_methods,
            reserved_wallet: None,
            reserved_amount: Decimal::ZERO,
            active: true,
            created_at: Utc::now(),
        };

        if offer.accepts_platform_wallet() {
            let wallet = self
                .ledger
                .wallet_for(offer.seller, &offer.pair.base)
                .ok_or_else(|| SwapcoreError::MissingWallet {
                    owner: offer.seller,
                    currency: offer.pair.base.clone(),
                })?;
            // The reserve itself performs the availability check.
            let reservation = self.ledger.reserve(wallet, offer.amount)?;
            offer.reserved_wallet = Some(wallet);
            offer.reserved_amount = offer.amount;
            self.park(offer.id, reservation);
        }

        self.ledger.store().offers.insert(offer.clone());
        tracing::info!(
            offer = %offer.id,
            seller = %offer.seller,
            pair = %offer.pair,
            amount = %offer.amount,
            rate = %offer.rate,
            reserved = offer.reserved_wallet.is_some(),
            "Offer created"
        );
        Ok(offer)
    }

    // =================================================================
    // Accept
    // =================================================================

    /// Accept an offer in full, settling both currency legs atomically
    /// through the buyer's and seller's platform wallets.
    pub fn accept(&self, request: AcceptRequest) -> Result<Trade> {
        let store = self.ledger.store();
        let offer = store.offers.get(request.offer)?;

        if !offer.active {
            return Err(SwapcoreError::OfferInactive(offer.id));
        }
        if request.buyer == offer.seller {
            return Err(SwapcoreError::SelfAcceptance);
        }
        if request.payment_method != PaymentMethod::PlatformWallet
            || !offer.accepts_platform_wallet()
        {
            return Err(SwapcoreError::UnsupportedPaymentMethod(
                request.payment_method,
            ));
        }
        let amount = match request.amount {
            Some(requested) if requested != offer.amount => {
                return Err(SwapcoreError::PartialAcceptance {
                    requested,
                    offered: offer.amount,
                });
            }
            _ => offer.amount,
        };
        if store.acceptances.contains(offer.id, request.buyer) {
            return Err(SwapcoreError::AlreadyAccepted {
                offer: offer.id,
                buyer: request.buyer,
            });
        }
        if offer.reserved_wallet.is_none() {
            return Err(SwapcoreError::MissingReservation(offer.id));
        }

        // Both parties need wallets on both legs before anything moves.
        let base = &offer.pair.base;
        let quote = &offer.pair.quote;
        let buyer_base = self.require_wallet(request.buyer, base)?;
        let buyer_quote = self.require_wallet(request.buyer, quote)?;
        let seller_quote = self.require_wallet(offer.seller, quote)?;

        let quote_amount = numeric::quote_value(amount, offer.rate);

        // Step 1: reserve the buyer's quote funds. From here every exit
        // path must either consume or release this token.
        let buyer_reservation = self.ledger.reserve(buyer_quote, quote_amount)?;

        // Step 2: take the seller's parked reservation.
        let Some(seller_reservation) = self.take(offer.id) else {
            // Another acceptance won the race and consumed it.
            // Compensate the reservation taken in step 1.
            self.compensate(buyer_reservation);
            return Err(SwapcoreError::MissingReservation(offer.id));
        };

        // Step 3: settle both legs in one atomic commit.
        match self.ledger.dual_settlement(
            seller_reservation,
            buyer_base,
            buyer_reservation,
            seller_quote,
        ) {
            Ok(()) => {}
            Err(rollback) => {
                // Compensating actions in reverse order: release the
                // buyer's reservation, re-park the seller's. The offer
                // and the seller's earmark end exactly as they began.
                self.compensate(rollback.buyer_quote);
                self.park(offer.id, rollback.seller_base);
                return Err(rollback.error);
            }
        }

        // Step 4: the earmarks are spent — deactivate without releasing,
        // then make re-acceptance structurally impossible.
        store.offers.deactivate(offer.id)?;
        store.acceptances.record(offer.id, request.buyer)?;

        let trade = Trade {
            id: TradeId::new(),
            buyer: request.buyer,
            seller: offer.seller,
            pair: offer.pair.clone(),
            amount,
            rate: offer.rate,
            quote_amount,
            payment_method: Some(PaymentMethod::PlatformWallet),
            status: TradeStatus::Completed,
            source: TradeSource::Offer(offer.id),
            executed_at: Utc::now(),
        };
        store.trades.record(trade.clone());
        store.users.record_completed_trade(trade.buyer);
        store.users.record_completed_trade(trade.seller);

        tracing::info!(
            offer = %offer.id,
            trade = %trade.id,
            buyer = %trade.buyer,
            seller = %trade.seller,
            amount = %trade.amount,
            quote_amount = %trade.quote_amount,
            "Offer accepted and settled"
        );
        Ok(trade)
    }

    // =================================================================
    // Deactivate
    // =================================================================

    /// Withdraw an offer. The `active` flag flips one-way regardless;
    /// when `release_reservation` is set and a reservation is still
    /// parked, it is released back to the seller's spendable funds.
    ///
    /// # Errors
    /// - `InsufficientReserved` (critical) if the wallet row carries less
    ///   than the parked amount — the reservation was consumed elsewhere;
    ///   nothing is released
    /// - `MissingReservation` if release was requested but the earmark
    ///   was already spent by an acceptance
    pub fn deactivate(&self, offer_id: OfferId, release_reservation: bool) -> Result<Offer> {
        let offer = self.ledger.store().offers.deactivate(offer_id)?;

        if release_reservation && offer.reserved_wallet.is_some() {
            match self.take(offer_id) {
                // The ledger re-reads the row under lock and refuses on
                // shortfall, leaving the corrupt state for inspection.
                Some(reservation) => self.ledger.release(reservation)?,
                None => {
                    tracing::warn!(
                        offer = %offer_id,
                        "Deactivation found no parked reservation to release"
                    );
                    return Err(SwapcoreError::MissingReservation(offer_id));
                }
            }
        }

        tracing::info!(offer = %offer_id, released = release_reservation, "Offer deactivated");
        Ok(offer)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// All currently active offers, newest first.
    #[must_use]
    pub fn active(&self) -> Vec<Offer> {
        self.ledger.store().offers.active()
    }

    /// Point-in-time copy of one offer.
    pub fn offer(&self, id: OfferId) -> Result<Offer> {
        self.ledger.store().offers.get(id)
    }

    // =================================================================
    // Vault
    // =================================================================

    fn park(&self, offer: OfferId, reservation: Reservation) {
        self.lock_vault().insert(offer, reservation);
    }

    fn take(&self, offer: OfferId) -> Option<Reservation> {
        self.lock_vault().remove(&offer)
    }

    /// Run the compensating release for a reservation taken earlier in a
    /// failed flow. A failure here is logged and swallowed: the original
    /// error is the one the caller must see.
    fn compensate(&self, reservation: Reservation) {
        let wallet = reservation.wallet();
        if let Err(err) = self.ledger.release(reservation) {
            tracing::error!(
                wallet = %wallet,
                %err,
                "Compensating release failed; reservation is stranded"
            );
        }
    }

    fn require_wallet(&self, owner: UserId, currency: &str) -> Result<WalletId> {
        self.ledger
            .wallet_for(owner, currency)
            .ok_or_else(|| SwapcoreError::MissingWallet {
                owner,
                currency: currency.to_string(),
            })
    }

    fn lock_vault(&self) -> std::sync::MutexGuard<'_, HashMap<OfferId, Reservation>> {
        self.vault.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

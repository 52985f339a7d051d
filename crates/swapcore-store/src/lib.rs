//! # swapcore-store
//!
//! The shared transactional store for the swapcore exchange.
//!
//! ## Architecture
//!
//! Every table lives behind interior locks so each inbound request can run
//! as an independent unit of work:
//!
//! 1. **WalletTable**: one mutex per wallet row; multi-row operations lock
//!    rows in ascending `WalletId` order, validate on working copies, and
//!    commit all-or-nothing
//! 2. **OrderTable**: resting orders; enforces monotonic fills and the
//!    `PENDING → PARTIAL → COMPLETED` status machine
//! 3. **OfferTable**: direct offers with a one-way `active` flag
//! 4. **TradeRecorder**: append-only log of executed trades
//! 5. **AcceptanceLog**: one row per (offer, buyer), blocks double accepts
//! 6. **UserDirectory**: completed-trade statistics
//!
//! The [`Store`] aggregate is constructed explicitly and injected into the
//! ledger / matching / offer components — no global singleton.

pub mod acceptances;
pub mod offers;
pub mod orders;
pub mod store;
pub mod trades;
pub mod users;
pub mod wallets;

pub use acceptances::AcceptanceLog;
pub use offers::OfferTable;
pub use orders::OrderTable;
pub use store::Store;
pub use trades::TradeRecorder;
pub use users::UserDirectory;
pub use wallets::WalletTable;

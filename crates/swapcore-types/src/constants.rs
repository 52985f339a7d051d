//! System-wide constants for the swapcore exchange.

/// Fractional digits for monetary amounts (cryptocurrency precision).
pub const AMOUNT_PRECISION: u32 = 8;

/// Default minimum order size in base currency, as (mantissa, scale):
/// 0.00000001 — one unit of canonical precision.
pub const DEFAULT_MIN_ORDER_SIZE: (i64, u32) = (1, 8);

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "swapcore";

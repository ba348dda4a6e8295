//! Domain model for stock items, movements and alert tiers.
//!
//! # Responsibility
//! - Define canonical data structures used by the registry and the ledger.
//! - Keep validation and pure stock arithmetic next to the types they guard.
//!
//! # Invariants
//! - Every item and movement is identified by a stable, non-nil UUID.
//! - `Item::current_stock` is never negative.
//! - `Movement::quantity` is always positive; direction lives in `MovementType`.

pub mod alert;
pub mod item;
pub mod movement;
pub mod text;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

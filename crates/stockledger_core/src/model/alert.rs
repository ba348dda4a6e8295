//! Alert tier classification.
//!
//! Tiers are derived on every read and never stored, so they always agree
//! with the latest `current_stock`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stock alert tier relative to an item's minimum threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertTier {
    /// `current <= min`.
    Low,
    /// `min < current <= 1.5 * min`.
    Warning,
    /// Anything above the warning band.
    Healthy,
}

impl AlertTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Warning => "WARNING",
            Self::Healthy => "HEALTHY",
        }
    }
}

impl Display for AlertTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classifies a stock level against its minimum threshold.
///
/// The warning upper bound `min * 1.5` is compared exactly, without
/// rounding: `current <= 1.5 * min` is evaluated as `2 * current <= 3 * min`
/// in 128-bit arithmetic. With `min == 0` the warning band is empty, so any
/// positive stock is `Healthy`.
pub fn classify(current_stock: i64, min_stock_level: i64) -> AlertTier {
    if current_stock <= min_stock_level {
        return AlertTier::Low;
    }
    if 2 * i128::from(current_stock) <= 3 * i128::from(min_stock_level) {
        return AlertTier::Warning;
    }
    AlertTier::Healthy
}

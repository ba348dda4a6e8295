//! Item domain model.
//!
//! # Responsibility
//! - Define the catalog record whose stock the ledger maintains.
//! - Normalize and validate registration input.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another item.
//! - New items start with `current_stock == 0` and `last_updated == created_at`.
//! - `current_stock` and `min_stock_level` are never negative.

use crate::model::alert::{classify, AlertTier};
use crate::model::now_epoch_ms;
use crate::model::text::normalize_label;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a stock item.
pub type ItemId = Uuid;

/// Unit label used when registration input leaves the unit blank.
pub const DEFAULT_UNIT: &str = "pcs";

/// Trackable stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Display name, trimmed with collapsed whitespace.
    pub name: String,
    /// Unit-of-measure label, e.g. `pcs` or `box`.
    pub unit: String,
    /// Net sum of every applied movement. Written only by the ledger.
    pub current_stock: i64,
    /// Alert threshold; see [`classify`].
    pub min_stock_level: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the latest applied movement, or creation.
    pub last_updated: i64,
}

impl Item {
    /// Creates a new item with a generated ID and zero stock.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `NegativeMinStockLevel` when `min_stock_level < 0`.
    pub fn new(name: &str, unit: &str, min_stock_level: i64) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, unit, min_stock_level, now_epoch_ms())
    }

    /// Creates a new item with a caller-provided ID and creation time.
    ///
    /// Used by import paths and tests that need deterministic identity.
    pub fn with_id(
        id: ItemId,
        name: &str,
        unit: &str,
        min_stock_level: i64,
        created_at: i64,
    ) -> Result<Self, ValidationError> {
        let unit = normalize_label(unit);
        let item = Self {
            id,
            name: normalize_label(name),
            unit: if unit.is_empty() {
                DEFAULT_UNIT.to_string()
            } else {
                unit
            },
            current_stock: 0,
            min_stock_level,
            created_at,
            last_updated: created_at,
        };
        item.validate()?;
        Ok(item)
    }

    /// Validates item invariants, including ones only persisted data can break.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.min_stock_level < 0 {
            return Err(ValidationError::NegativeMinStockLevel(self.min_stock_level));
        }
        if self.current_stock < 0 {
            return Err(ValidationError::NegativeStock(self.current_stock));
        }
        Ok(())
    }

    /// Returns the alert tier for the current stock level.
    pub fn alert_tier(&self) -> AlertTier {
        classify(self.current_stock, self.min_stock_level)
    }
}

//! Stock ledger core.
//!
//! Tracks stock levels for inventory items and records every movement that
//! changes them. This crate is the single source of truth for the ledger
//! invariant: an item's `current_stock` always equals the signed sum of its
//! recorded movements, and never drops below zero.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LedgerConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::alert::{classify, AlertTier};
pub use model::item::{Item, ItemId, DEFAULT_UNIT};
pub use model::movement::{
    Movement, MovementId, MovementRequest, MovementType, ParseMovementTypeError,
};
pub use model::validation::ValidationError;
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::ledger_repo::{AppliedMovement, LedgerRepository, SqliteLedgerRepository};
pub use repo::movement_repo::{MovementRepository, SqliteMovementRepository};
pub use repo::{RepoError, RepoResult};
pub use service::{
    Inventory, InventorySummary, ItemRegistry, ItemStatus, LedgerError, LedgerResult,
    StockLedger, DEFAULT_MAX_CONFLICT_ATTEMPTS,
};

/// Minimal health-check API for integration smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Inventory facade: the service object callers hold for ledger operations.
//!
//! # Responsibility
//! - Own one migrated storage connection with an explicit open/close
//!   lifecycle.
//! - Expose registry, ledger and history operations as one call surface.
//!
//! # Invariants
//! - Every stock change goes through `StockLedger`.
//! - One `Inventory` serves one thread; concurrent writers each open their
//!   own instance against the same database file.

use crate::config::LedgerConfig;
use crate::db::{close_db, open_db, open_db_in_memory};
use crate::model::item::{Item, ItemId};
use crate::model::movement::{Movement, MovementRequest};
use crate::repo::item_repo::{ensure_items_ready, SqliteItemRepository};
use crate::repo::ledger_repo::{AppliedMovement, SqliteLedgerRepository};
use crate::repo::movement_repo::{
    ensure_movements_ready, MovementRepository, SqliteMovementRepository,
};
use crate::repo::RepoResult;
use crate::service::item_registry::{InventorySummary, ItemRegistry, ItemStatus};
use crate::service::stock_ledger::{LedgerResult, StockLedger, DEFAULT_MAX_CONFLICT_ATTEMPTS};
use rusqlite::Connection;
use std::path::Path;

/// Owns one migrated connection and exposes the registry, ledger and history
/// operations over it.
///
/// `Connection` is `Send` but not `Sync`: share the database file between
/// threads by opening one `Inventory` per thread.
pub struct Inventory {
    conn: Connection,
    max_conflict_attempts: u32,
}

impl Inventory {
    /// Opens (creating if needed) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Opens the database named by `config` and applies its retry policy.
    pub fn open_with_config(config: &LedgerConfig) -> RepoResult<Self> {
        let inventory = match &config.db_path {
            Some(path) => Self::open(path)?,
            None => Self::open_in_memory()?,
        };
        Ok(inventory.with_max_conflict_attempts(config.max_conflict_attempts))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        ensure_items_ready(&conn)?;
        ensure_movements_ready(&conn)?;
        Ok(Self {
            conn,
            max_conflict_attempts: DEFAULT_MAX_CONFLICT_ATTEMPTS,
        })
    }

    pub fn with_max_conflict_attempts(mut self, max_conflict_attempts: u32) -> Self {
        self.max_conflict_attempts = max_conflict_attempts;
        self
    }

    /// Closes the underlying connection.
    pub fn close(self) -> RepoResult<()> {
        close_db(self.conn)?;
        Ok(())
    }

    pub fn create_item(&self, name: &str, unit: &str, min_stock_level: i64) -> RepoResult<Item> {
        self.registry()?.create_item(name, unit, min_stock_level)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        self.registry()?.get_item(id)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.registry()?.delete_item(id)
    }

    /// Items sorted by name. Each call re-reads storage.
    pub fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.registry()?.list_items()
    }

    pub fn list_items_with_tiers(&self) -> RepoResult<Vec<ItemStatus>> {
        self.registry()?.list_items_with_tiers()
    }

    pub fn low_stock_alerts(&self) -> RepoResult<Vec<Item>> {
        self.registry()?.low_stock_alerts()
    }

    pub fn summary(&self) -> RepoResult<InventorySummary> {
        self.registry()?.summary()
    }

    /// Applies one movement. See [`StockLedger::record_movement`].
    pub fn record_movement(&mut self, request: &MovementRequest) -> LedgerResult<AppliedMovement> {
        let repo = SqliteLedgerRepository::try_new(&mut self.conn)?;
        StockLedger::with_max_attempts(repo, self.max_conflict_attempts).record_movement(request)
    }

    /// Newest movements first, at most `limit`.
    pub fn list_recent_movements(&self, limit: u32) -> RepoResult<Vec<Movement>> {
        SqliteMovementRepository::try_new(&self.conn)?.list_recent_movements(limit)
    }

    /// One item's movement trail in creation order, also after deletion.
    pub fn movements_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Movement>> {
        SqliteMovementRepository::try_new(&self.conn)?.list_item_movements(item_id)
    }

    fn registry(&self) -> RepoResult<ItemRegistry<SqliteItemRepository<'_>>> {
        Ok(ItemRegistry::new(SqliteItemRepository::try_new(&self.conn)?))
    }
}

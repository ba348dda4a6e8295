//! Ledger repository: the atomic "append movement + set stock" unit.
//!
//! # Responsibility
//! - Run one read-validate-write attempt for a movement inside a single
//!   SQLite transaction.
//!
//! # Invariants
//! - The transaction is `IMMEDIATE`, so it holds the write lock from the
//!   stock read until commit.
//! - The stock write is conditional on the value read; a mismatch is a
//!   `Conflict` and nothing is committed.
//! - On any error the transaction is rolled back: no movement row and no
//!   stock change survive.
//! - The movement timestamp is read after the write lock is taken and never
//!   precedes the item's `last_updated`.

use crate::model::item::{Item, ItemId};
use crate::model::movement::{apply_to_stock, Movement, MovementRequest, StockChangeError};
use crate::model::now_epoch_ms;
use crate::model::validation::ValidationError;
use crate::repo::item_repo::{compare_and_set_stock, ensure_items_ready, load_item};
use crate::repo::movement_repo::{ensure_movements_ready, insert_movement};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{Connection, TransactionBehavior};

/// Result of one successfully applied movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMovement {
    pub movement: Movement,
    /// Item snapshot after the stock update.
    pub item: Item,
}

/// Storage contract for applying one movement atomically.
pub trait LedgerRepository {
    /// Performs a single attempt; `Conflict` means the caller may retry.
    fn apply_movement(&mut self, request: &MovementRequest) -> RepoResult<AppliedMovement>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_items_ready(conn)?;
        ensure_movements_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn apply_movement(&mut self, request: &MovementRequest) -> RepoResult<AppliedMovement> {
        let request = request.normalized()?;
        let item_id = request.item_id;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| conflict_if_busy(err.into(), item_id))?;

        let item = load_item(&tx, item_id)?.ok_or(RepoError::NotFound(item_id))?;
        let candidate = apply_to_stock(item.current_stock, request.kind, request.quantity)
            .map_err(|err| stock_change_error(err, item_id))?;

        let recorded_at = now_epoch_ms().max(item.last_updated);
        let movement = Movement::for_item(&item, &request, recorded_at);
        insert_movement(&tx, &movement)?;
        compare_and_set_stock(&tx, item_id, item.current_stock, candidate, recorded_at)?;

        tx.commit()
            .map_err(|err| conflict_if_busy(err.into(), item_id))?;

        Ok(AppliedMovement {
            movement,
            item: Item {
                current_stock: candidate,
                last_updated: recorded_at,
                ..item
            },
        })
    }
}

fn conflict_if_busy(err: RepoError, item_id: ItemId) -> RepoError {
    if err.is_busy() {
        RepoError::Conflict(item_id)
    } else {
        err
    }
}

fn stock_change_error(err: StockChangeError, item_id: ItemId) -> RepoError {
    match err {
        StockChangeError::Insufficient {
            requested,
            available,
        } => RepoError::InsufficientStock {
            item_id,
            requested,
            available,
        },
        StockChangeError::Overflow { current, quantity } => {
            RepoError::Validation(ValidationError::StockOverflow { current, quantity })
        }
    }
}

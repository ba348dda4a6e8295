//! Stock ledger use-case service.
//!
//! # Responsibility
//! - Validate movement requests before touching storage.
//! - Drive the repository's atomic apply step, retrying bounded times on
//!   write conflicts.
//! - Translate repository failures into the ledger error taxonomy.
//!
//! # Invariants
//! - A call either records exactly one movement and updates stock, or
//!   changes nothing.
//! - `current_stock` equals the signed sum of the item's movements.
//! - Only `LedgerError::Conflict` is ever retried.

use crate::model::item::ItemId;
use crate::model::movement::MovementRequest;
use crate::model::validation::ValidationError;
use crate::repo::ledger_repo::{AppliedMovement, LedgerRepository};
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attempts made before a persistent conflict is reported to the caller.
pub const DEFAULT_MAX_CONFLICT_ATTEMPTS: u32 = 3;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors from [`StockLedger::record_movement`].
#[derive(Debug)]
pub enum LedgerError {
    /// Malformed input; shown to the user as-is.
    Validation(ValidationError),
    /// Referenced item does not exist.
    NotFound(ItemId),
    /// `OUT` would drive stock negative; state is unchanged.
    InsufficientStock {
        item_id: ItemId,
        requested: i64,
        available: i64,
    },
    /// Concurrent writers kept winning; transient, the caller may retry later.
    Conflict { item_id: ItemId, attempts: u32 },
    /// Infrastructure failure, propagated unmodified.
    Storage(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InsufficientStock {
                requested,
                available,
                ..
            } => write!(
                f,
                "cannot remove {requested} units; only {available} in stock"
            ),
            Self::Conflict { item_id, attempts } => write!(
                f,
                "stock for item {item_id} kept changing concurrently; gave up after {attempts} attempts"
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::InsufficientStock {
                item_id,
                requested,
                available,
            } => Self::InsufficientStock {
                item_id,
                requested,
                available,
            },
            RepoError::Conflict(item_id) => Self::Conflict {
                item_id,
                attempts: 1,
            },
            other => Self::Storage(other),
        }
    }
}

impl LedgerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "item_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::Conflict { .. } => "conflict_exhausted",
            Self::Storage(_) => "storage_failed",
        }
    }
}

/// The only path through which item stock changes.
pub struct StockLedger<R: LedgerRepository> {
    repo: R,
    max_attempts: u32,
}

impl<R: LedgerRepository> StockLedger<R> {
    pub fn new(repo: R) -> Self {
        Self::with_max_attempts(repo, DEFAULT_MAX_CONFLICT_ATTEMPTS)
    }

    /// `max_attempts` below 1 is treated as 1.
    pub fn with_max_attempts(repo: R, max_attempts: u32) -> Self {
        Self {
            repo,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Records one movement and returns it with the updated item.
    ///
    /// # Errors
    /// - `Validation` for non-positive quantity, blank responsible person or
    ///   stock overflow.
    /// - `NotFound` when the item does not exist.
    /// - `InsufficientStock` when an `OUT` exceeds current stock.
    /// - `Conflict` after `max_attempts` lost races.
    /// - `Storage` for any other persistence failure.
    pub fn record_movement(&mut self, request: &MovementRequest) -> LedgerResult<AppliedMovement> {
        let request = match request.normalized() {
            Ok(request) => request,
            Err(err) => {
                let err = LedgerError::from(err);
                log_rejection(request, &err);
                return Err(err);
            }
        };

        for attempt in 1..=self.max_attempts {
            match self.repo.apply_movement(&request) {
                Ok(applied) => {
                    info!(
                        "event=movement_record module=ledger status=ok item_id={} movement_id={} type={} quantity={} new_stock={} attempt={}",
                        applied.item.id,
                        applied.movement.id,
                        applied.movement.kind,
                        applied.movement.quantity,
                        applied.item.current_stock,
                        attempt
                    );
                    return Ok(applied);
                }
                Err(RepoError::Conflict(item_id)) => {
                    warn!(
                        "event=movement_record module=ledger status=conflict item_id={} attempt={} max_attempts={}",
                        item_id, attempt, self.max_attempts
                    );
                }
                Err(other) => {
                    let err = LedgerError::from(other);
                    log_rejection(&request, &err);
                    return Err(err);
                }
            }
        }

        let err = LedgerError::Conflict {
            item_id: request.item_id,
            attempts: self.max_attempts,
        };
        log_rejection(&request, &err);
        Err(err)
    }
}

fn log_rejection(request: &MovementRequest, err: &LedgerError) {
    match err {
        LedgerError::Storage(_) | LedgerError::Conflict { .. } => error!(
            "event=movement_record module=ledger status=error item_id={} type={} quantity={} error_code={} error={}",
            request.item_id,
            request.kind,
            request.quantity,
            err.error_code(),
            err
        ),
        _ => info!(
            "event=movement_record module=ledger status=rejected item_id={} type={} quantity={} error_code={}",
            request.item_id,
            request.kind,
            request.quantity,
            err.error_code()
        ),
    }
}

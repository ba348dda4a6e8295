//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into registry and ledger use cases.
//! - Provide the [`Inventory`] facade that callers hold for the process
//!   lifetime instead of reaching for ambient storage state.
//!
//! # Invariants
//! - Stock changes only through [`StockLedger::record_movement`].

pub mod inventory;
pub mod item_registry;
pub mod stock_ledger;

pub use inventory::Inventory;
pub use item_registry::{InventorySummary, ItemRegistry, ItemStatus};
pub use stock_ledger::{LedgerError, LedgerResult, StockLedger, DEFAULT_MAX_CONFLICT_ATTEMPTS};

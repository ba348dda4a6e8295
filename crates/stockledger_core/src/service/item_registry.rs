//! Item registry use-case service.
//!
//! # Responsibility
//! - Register, look up, list and delete catalog items.
//! - Derive read-side alert views and dashboard totals from item state.
//!
//! # Invariants
//! - Registration always yields `current_stock == 0`.
//! - Alert tiers are computed per call, never stored.

use crate::model::alert::AlertTier;
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::ItemRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::Serialize;

/// Item paired with its current alert tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemStatus {
    pub item: Item,
    pub tier: AlertTier,
}

/// Dashboard totals over the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InventorySummary {
    pub total_items: usize,
    /// Sum of `current_stock` across items, saturating at `i64::MAX`.
    pub total_stock: i64,
    /// Items whose tier is `LOW`.
    pub low_stock_items: usize,
}

/// Use-case service over an item repository.
pub struct ItemRegistry<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new item with zero stock.
    ///
    /// # Errors
    /// - `RepoError::Validation` for a blank name or negative threshold.
    pub fn create_item(&self, name: &str, unit: &str, min_stock_level: i64) -> RepoResult<Item> {
        let item = Item::new(name, unit, min_stock_level)?;
        self.repo.create_item(&item)?;
        info!(
            "event=item_create module=registry status=ok item_id={} min_stock_level={}",
            item.id, item.min_stock_level
        );
        Ok(item)
    }

    /// Gets one item; absence is `RepoError::NotFound`.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        self.repo.get_item(id)?.ok_or(RepoError::NotFound(id))
    }

    pub fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.repo.list_items()
    }

    /// Removes an item. Stock does not need to be zero; history is kept.
    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.delete_item(id)?;
        info!("event=item_delete module=registry status=ok item_id={id}");
        Ok(())
    }

    pub fn list_items_with_tiers(&self) -> RepoResult<Vec<ItemStatus>> {
        Ok(self
            .repo
            .list_items()?
            .into_iter()
            .map(|item| ItemStatus {
                tier: item.alert_tier(),
                item,
            })
            .collect())
    }

    /// Items at or below their minimum level, in name order.
    pub fn low_stock_alerts(&self) -> RepoResult<Vec<Item>> {
        Ok(self
            .repo
            .list_items()?
            .into_iter()
            .filter(|item| item.alert_tier() == AlertTier::Low)
            .collect())
    }

    pub fn summary(&self) -> RepoResult<InventorySummary> {
        let items = self.repo.list_items()?;
        Ok(summarize(&items))
    }
}

fn summarize(items: &[Item]) -> InventorySummary {
    items
        .iter()
        .fold(InventorySummary::default(), |mut summary, item| {
            summary.total_items += 1;
            summary.total_stock = summary.total_stock.saturating_add(item.current_stock);
            if item.alert_tier() == AlertTier::Low {
                summary.low_stock_items += 1;
            }
            summary
        })
}

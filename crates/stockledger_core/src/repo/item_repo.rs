//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/list/delete over the `items` catalog.
//! - Own the conditional stock write used by the ledger.
//!
//! # Invariants
//! - Items are inserted with `current_stock = 0`.
//! - No public API here mutates `current_stock`; see
//!   [`compare_and_set_stock`], reachable only from inside the crate.
//! - Listing is deterministic: `name ASC, id ASC`.

use crate::model::item::{Item, ItemId};
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    unit,
    current_stock,
    min_stock_level,
    created_at,
    last_updated
FROM items";

const ITEM_COLUMNS: &[&str] = &[
    "id",
    "name",
    "unit",
    "current_stock",
    "min_stock_level",
    "created_at",
    "last_updated",
];

/// Repository interface for the item catalog.
pub trait ItemRepository {
    /// Inserts a new item; its stock must be zero.
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Lists every item ordered by name.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Hard-deletes an item regardless of its stock level.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_items_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;
        if item.current_stock != 0 {
            return Err(RepoError::InvalidData(format!(
                "new item {} must start with zero stock, got {}",
                item.id, item.current_stock
            )));
        }

        self.conn.execute(
            "INSERT INTO items (
                id,
                name,
                unit,
                current_stock,
                min_stock_level,
                created_at,
                last_updated
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5);",
            params![
                item.id.to_string(),
                item.name.as_str(),
                item.unit.as_str(),
                item.min_stock_level,
                item.created_at,
            ],
        )?;

        Ok(item.id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, id)
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

pub(crate) fn ensure_items_ready(conn: &Connection) -> RepoResult<()> {
    ensure_table_ready(conn, "items", ITEM_COLUMNS)
}

pub(crate) fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let item = stmt
        .query_row([id.to_string()], |row| Ok(parse_item_row(row)))
        .optional()?;
    item.transpose()
}

/// Sets `current_stock` only if it still equals `expected_stock`.
///
/// # Errors
/// - `NotFound` when the item no longer exists.
/// - `Conflict` when another writer changed the stock since it was read.
pub(crate) fn compare_and_set_stock(
    conn: &Connection,
    id: ItemId,
    expected_stock: i64,
    new_stock: i64,
    updated_at: i64,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE items
         SET
            current_stock = ?3,
            last_updated = ?4
         WHERE id = ?1
           AND current_stock = ?2;",
        params![id.to_string(), expected_stock, new_stock, updated_at],
    )?;

    if changed == 1 {
        return Ok(());
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Err(RepoError::Conflict(id))
    } else {
        Err(RepoError::NotFound(id))
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let item = Item {
        id: parse_uuid(&id_text, "items.id")?,
        name: row.get("name")?,
        unit: row.get("unit")?,
        current_stock: row.get("current_stock")?,
        min_stock_level: row.get("min_stock_level")?,
        created_at: row.get("created_at")?,
        last_updated: row.get("last_updated")?,
    };
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("item {} failed validation: {err}", item.id))
    })?;
    Ok(item)
}

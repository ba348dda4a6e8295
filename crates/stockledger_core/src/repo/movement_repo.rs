//! Movement history repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append movement records inside the ledger's transaction.
//! - Serve read-side history: most recent first, or one item's trail in
//!   creation order.
//!
//! # Invariants
//! - The trait exposes reads only; appends go through [`insert_movement`],
//!   which only the ledger calls.
//! - Creation order is `seq ASC`; recency is `created_at DESC, seq DESC`.

use crate::model::item::ItemId;
use crate::model::movement::{Movement, MovementType};
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const MOVEMENT_SELECT_SQL: &str = "SELECT
    id,
    item_id,
    item_name,
    quantity,
    type,
    request_code,
    responsible_person,
    remarks,
    created_at
FROM movements";

const MOVEMENT_COLUMNS: &[&str] = &[
    "seq",
    "id",
    "item_id",
    "item_name",
    "quantity",
    "type",
    "request_code",
    "responsible_person",
    "remarks",
    "created_at",
];

/// Read-only access to recorded movements.
pub trait MovementRepository {
    /// Returns at most `limit` movements, newest first.
    fn list_recent_movements(&self, limit: u32) -> RepoResult<Vec<Movement>>;
    /// Returns every movement recorded for `item_id`, oldest first.
    ///
    /// Works for deleted items as well; their history is kept.
    fn list_item_movements(&self, item_id: ItemId) -> RepoResult<Vec<Movement>>;
}

/// SQLite-backed movement history repository.
pub struct SqliteMovementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMovementRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_movements_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MovementRepository for SqliteMovementRepository<'_> {
    fn list_recent_movements(&self, limit: u32) -> RepoResult<Vec<Movement>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{MOVEMENT_SELECT_SQL} ORDER BY created_at DESC, seq DESC LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        collect_movements(&mut rows)
    }

    fn list_item_movements(&self, item_id: ItemId) -> RepoResult<Vec<Movement>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MOVEMENT_SELECT_SQL} WHERE item_id = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([item_id.to_string()])?;
        collect_movements(&mut rows)
    }
}

pub(crate) fn ensure_movements_ready(conn: &Connection) -> RepoResult<()> {
    ensure_table_ready(conn, "movements", MOVEMENT_COLUMNS)
}

/// Appends one movement record. Callers provide the surrounding transaction.
pub(crate) fn insert_movement(conn: &Connection, movement: &Movement) -> RepoResult<()> {
    if movement.quantity <= 0 {
        return Err(RepoError::InvalidData(format!(
            "movement {} must have a positive quantity, got {}",
            movement.id, movement.quantity
        )));
    }

    conn.execute(
        "INSERT INTO movements (
            id,
            item_id,
            item_name,
            quantity,
            type,
            request_code,
            responsible_person,
            remarks,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            movement.id.to_string(),
            movement.item_id.to_string(),
            movement.item_name.as_str(),
            movement.quantity,
            movement.kind.as_str(),
            movement.request_code.as_deref(),
            movement.responsible_person.as_str(),
            movement.remarks.as_deref(),
            movement.created_at,
        ],
    )?;
    Ok(())
}

fn collect_movements(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Movement>> {
    let mut movements = Vec::new();
    while let Some(row) = rows.next()? {
        movements.push(parse_movement_row(row)?);
    }
    Ok(movements)
}

fn parse_movement_row(row: &Row<'_>) -> RepoResult<Movement> {
    let id_text: String = row.get("id")?;
    let item_id_text: String = row.get("item_id")?;

    let type_text: String = row.get("type")?;
    let kind = parse_movement_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid movement type `{type_text}` in movements.type"
        ))
    })?;

    let quantity: i64 = row.get("quantity")?;
    if quantity <= 0 {
        return Err(RepoError::InvalidData(format!(
            "non-positive quantity {quantity} in movements.quantity"
        )));
    }

    Ok(Movement {
        id: parse_uuid(&id_text, "movements.id")?,
        item_id: parse_uuid(&item_id_text, "movements.item_id")?,
        item_name: row.get("item_name")?,
        quantity,
        kind,
        request_code: row.get("request_code")?,
        responsible_person: row.get("responsible_person")?,
        remarks: row.get("remarks")?,
        created_at: row.get("created_at")?,
    })
}

// Stored values are exact; `MovementType::from_str` is the lenient parser
// for user input.
fn parse_movement_type(value: &str) -> Option<MovementType> {
    match value {
        "IN" => Some(MovementType::In),
        "OUT" => Some(MovementType::Out),
        _ => None,
    }
}

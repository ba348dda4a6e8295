//! Movement (stock transaction) domain model.
//!
//! # Responsibility
//! - Define the immutable audit record for one stock increase or decrease.
//! - Provide the pure stock arithmetic the ledger applies inside its
//!   storage transaction.
//!
//! # Invariants
//! - `quantity > 0`; direction is carried only by `MovementType`.
//! - `item_name` is a snapshot taken when the movement is recorded.
//! - A movement is never updated or deleted once recorded.

use crate::model::item::{Item, ItemId};
use crate::model::text::{normalize_label, normalize_optional};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a movement record.
pub type MovementId = Uuid;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Receipt; increases stock.
    In,
    /// Issuance; decreases stock.
    Out,
}

impl MovementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// Returns `quantity` with the sign this direction applies to stock.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

impl Display for MovementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when text is neither `IN` nor `OUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMovementTypeError(pub String);

impl Display for ParseMovementTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown movement type `{}`; expected IN|OUT", self.0)
    }
}

impl Error for ParseMovementTypeError {}

impl FromStr for MovementType {
    type Err = ParseMovementTypeError;

    /// Accepts `IN`/`OUT` in any letter case, surrounding whitespace ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(ParseMovementTypeError(value.to_string())),
        }
    }
}

/// Recorded stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub item_id: ItemId,
    /// Item name at recording time.
    pub item_name: String,
    pub quantity: i64,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: MovementType,
    pub request_code: Option<String>,
    pub responsible_person: String,
    pub remarks: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Movement {
    /// Builds the record for a validated request against `item`.
    pub(crate) fn for_item(item: &Item, request: &MovementRequest, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: item.id,
            item_name: item.name.clone(),
            quantity: request.quantity,
            kind: request.kind,
            request_code: request.request_code.clone(),
            responsible_person: request.responsible_person.clone(),
            remarks: request.remarks.clone(),
            created_at,
        }
    }

    /// Signed effect of this movement on stock.
    pub fn signed_quantity(&self) -> i64 {
        self.kind.signed(self.quantity)
    }
}

/// Caller input for recording one movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub item_id: ItemId,
    pub kind: MovementType,
    pub quantity: i64,
    pub request_code: Option<String>,
    pub responsible_person: String,
    pub remarks: Option<String>,
}

impl MovementRequest {
    /// Creates a request without optional metadata.
    pub fn new(
        item_id: ItemId,
        kind: MovementType,
        quantity: i64,
        responsible_person: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            kind,
            quantity,
            request_code: None,
            responsible_person: responsible_person.into(),
            remarks: None,
        }
    }

    pub fn with_request_code(mut self, request_code: impl Into<String>) -> Self {
        self.request_code = Some(request_code.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Returns a normalized copy, or the first validation failure.
    ///
    /// Free-text fields are trimmed; blank optional fields become `None`.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        if self.item_id.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }
        let responsible_person = normalize_label(&self.responsible_person);
        if responsible_person.is_empty() {
            return Err(ValidationError::EmptyResponsiblePerson);
        }

        Ok(Self {
            item_id: self.item_id,
            kind: self.kind,
            quantity: self.quantity,
            request_code: normalize_optional(self.request_code.as_deref()),
            responsible_person,
            remarks: normalize_optional(self.remarks.as_deref()),
        })
    }
}

/// Why a movement cannot be applied to the current stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChangeError {
    /// `OUT` would drive stock below zero.
    Insufficient { requested: i64, available: i64 },
    /// `IN` would overflow the stock counter.
    Overflow { current: i64, quantity: i64 },
}

/// Computes the stock level after applying `quantity` in direction `kind`.
///
/// Only `OUT` is bounded below; `IN` growth is limited only by `i64`.
pub fn apply_to_stock(
    current_stock: i64,
    kind: MovementType,
    quantity: i64,
) -> Result<i64, StockChangeError> {
    match kind {
        MovementType::In => current_stock
            .checked_add(quantity)
            .ok_or(StockChangeError::Overflow {
                current: current_stock,
                quantity,
            }),
        MovementType::Out => match current_stock.checked_sub(quantity) {
            Some(candidate) if candidate >= 0 => Ok(candidate),
            _ => Err(StockChangeError::Insufficient {
                requested: quantity,
                available: current_stock,
            }),
        },
    }
}

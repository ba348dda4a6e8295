//! Input validation failures shared by items and movements.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-correctable input error.
///
/// `Display` output is meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is the nil UUID.
    NilId,
    /// Item name is blank after trim.
    EmptyName,
    /// Minimum stock threshold is below zero.
    NegativeMinStockLevel(i64),
    /// Movement quantity is zero or negative.
    NonPositiveQuantity(i64),
    /// Movement has no responsible person after trim.
    EmptyResponsiblePerson,
    /// Applying an `IN` movement would overflow the stock counter.
    StockOverflow { current: i64, quantity: i64 },
    /// Stored stock is negative, which no valid history can produce.
    NegativeStock(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "identifier must not be nil"),
            Self::EmptyName => write!(f, "item name must not be blank"),
            Self::NegativeMinStockLevel(value) => {
                write!(f, "minimum stock level must be >= 0, got {value}")
            }
            Self::NonPositiveQuantity(value) => {
                write!(f, "quantity must be a positive integer, got {value}")
            }
            Self::EmptyResponsiblePerson => write!(f, "responsible person must not be blank"),
            Self::StockOverflow { current, quantity } => write!(
                f,
                "adding {quantity} to current stock {current} exceeds the supported range"
            ),
            Self::NegativeStock(value) => write!(f, "stock must be >= 0, got {value}"),
        }
    }
}

impl Error for ValidationError {}

use thiserror::Error;

use super::types::RowId;

/// Errors raised by filter box operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterBoxError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("no filter row {0}")]
    RowNotFound(RowId),
    #[error("row {row} has no value slot {slot}")]
    InvalidSlot { row: RowId, slot: usize },
    #[error("row {0} is not an enum filter")]
    NotAnEnum(RowId),
    #[error("row {0} is not a date/time filter")]
    NotAPicker(RowId),
    #[error("operator {operator} is not available for field {field}")]
    UnavailableOperator { field: String, operator: String },
    #[error("invalid picker value: {0}")]
    InvalidPickerValue(String),
    #[error("malformed parameter: {0}")]
    MalformedParameter(String),
}

pub type Result<T> = std::result::Result<T, FilterBoxError>;

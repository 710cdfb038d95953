//! Date/time picker backing the temporal filter rows
//!
//! The picker owns the visible text of its control. Only a commit writes the
//! canonical value; listeners receive every commit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

use crate::core::error::{FilterBoxError, Result};
use crate::core::types::{FieldType, RowId};

/// Canonical storage format shared by date, datetime and time rows
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_INPUT_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"];

const TIME_INPUT_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Date used for time-only values
fn time_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Parse any accepted picker or record representation into a timestamp
pub fn parse_temporal(field_type: FieldType, input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    for fmt in DATETIME_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(match field_type {
                FieldType::Date => dt.date().and_time(NaiveTime::MIN),
                _ => dt,
            });
        }
    }
    for fmt in DATE_INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    if field_type == FieldType::Time {
        for fmt in TIME_INPUT_FORMATS {
            if let Ok(time) = NaiveTime::parse_from_str(input, fmt) {
                return Some(time_anchor().and_time(time));
            }
        }
    }
    None
}

/// Normalise picker input into the canonical hidden-field value
pub fn canonicalize(field_type: FieldType, input: &str) -> Result<String> {
    parse_temporal(field_type, input)
        .map(|dt| dt.format(CANONICAL_FORMAT).to_string())
        .ok_or_else(|| FilterBoxError::InvalidPickerValue(input.to_string()))
}

/// Text shown in the visible control for a canonical value
pub fn display_text(field_type: FieldType, canonical: &str) -> String {
    let Some(dt) = parse_temporal(field_type, canonical) else {
        return String::new();
    };
    match field_type {
        FieldType::Date => dt.format("%Y-%m-%d").to_string(),
        FieldType::Time => dt.format("%H:%M").to_string(),
        _ => dt.format("%Y-%m-%d %H:%M").to_string(),
    }
}

/// A committed picker value, addressed to one hidden slot of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerCommit {
    pub row: RowId,
    pub slot: usize,
    pub value: String,
}

type CommitListener = Box<dyn FnMut(&PickerCommit)>;

/// Picker attached to one value slot of a temporal row
pub struct DateTimePicker {
    row: RowId,
    slot: usize,
    field_type: FieldType,
    display: String,
    listeners: Vec<CommitListener>,
}

impl fmt::Debug for DateTimePicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimePicker")
            .field("row", &self.row)
            .field("slot", &self.slot)
            .field("field_type", &self.field_type)
            .field("display", &self.display)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Clone for DateTimePicker {
    /// Listeners belong to the original control and are not cloned
    fn clone(&self) -> Self {
        Self {
            row: self.row.clone(),
            slot: self.slot,
            field_type: self.field_type,
            display: self.display.clone(),
            listeners: Vec::new(),
        }
    }
}

impl DateTimePicker {
    pub fn new(row: RowId, slot: usize, field_type: FieldType) -> Self {
        Self {
            row,
            slot,
            field_type,
            display: String::new(),
            listeners: Vec::new(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Register a commit listener
    pub fn on_commit(&mut self, listener: impl FnMut(&PickerCommit) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Free typing into the visible control; never reaches the hidden field
    pub fn type_text(&mut self, text: &str) {
        self.display = text.to_string();
    }

    /// Show an already canonical value without notifying anyone
    pub fn show(&mut self, canonical: &str) {
        self.display = display_text(self.field_type, canonical);
    }

    /// Select a date in the picker, the equivalent of `setDate`
    pub fn set_date(&mut self, input: &str) -> Result<PickerCommit> {
        let value = canonicalize(self.field_type, input)?;
        self.display = display_text(self.field_type, &value);
        let commit = PickerCommit {
            row: self.row.clone(),
            slot: self.slot,
            value,
        };
        for listener in self.listeners.iter_mut() {
            listener(&commit);
        }
        Ok(commit)
    }
}

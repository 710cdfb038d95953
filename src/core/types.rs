use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr};

/// Declared type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldType {
    String,
    Text,
    Boolean,
    Date,
    #[strum(serialize = "datetime")]
    #[serde(rename = "datetime")]
    DateTime,
    Time,
    /// Enumerated values, including color pickers
    #[strum(to_string = "enum", serialize = "color")]
    #[serde(rename = "enum", alias = "color")]
    Enum,
    #[strum(to_string = "numeric", serialize = "integer", serialize = "float", serialize = "decimal")]
    #[serde(rename = "numeric", alias = "integer", alias = "float", alias = "decimal")]
    Numeric,
    #[strum(to_string = "association", serialize = "belongs_to_association")]
    #[serde(rename = "association", alias = "belongs_to_association")]
    Association,
}

impl FieldType {
    /// Date-like types are edited through a picker and stored canonically
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }

    /// Types whose value is submitted as a `v[]` list of slots (exact, from, to)
    pub fn uses_range_slots(&self) -> bool {
        self.is_temporal() || matches!(self, Self::Numeric)
    }

    /// CSS class used on the visible picker control
    pub fn picker_class(&self) -> Option<&'static str> {
        match self {
            Self::Date => Some("date"),
            // The time picker shares the datetime widget
            Self::DateTime | Self::Time => Some("datetime"),
            _ => None,
        }
    }
}

/// Comparison operator submitted as `f[field][index][o]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum Operator {
    #[strum(serialize = "like")]
    #[serde(rename = "like")]
    Like,
    #[strum(serialize = "not_like")]
    #[serde(rename = "not_like")]
    NotLike,
    #[strum(serialize = "is")]
    #[serde(rename = "is")]
    Is,
    #[strum(serialize = "starts_with")]
    #[serde(rename = "starts_with")]
    StartsWith,
    #[strum(serialize = "ends_with")]
    #[serde(rename = "ends_with")]
    EndsWith,
    /// Equality for numbers, same day for dates
    #[strum(serialize = "default")]
    #[serde(rename = "default")]
    Default,
    #[strum(serialize = "between")]
    #[serde(rename = "between")]
    Between,
    #[strum(serialize = "today")]
    #[serde(rename = "today")]
    Today,
    #[strum(serialize = "yesterday")]
    #[serde(rename = "yesterday")]
    Yesterday,
    #[strum(serialize = "this_week")]
    #[serde(rename = "this_week")]
    ThisWeek,
    #[strum(serialize = "last_week")]
    #[serde(rename = "last_week")]
    LastWeek,
    #[strum(serialize = "_present")]
    #[serde(rename = "_present")]
    Present,
    #[strum(serialize = "_blank")]
    #[serde(rename = "_blank")]
    Blank,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Label shown in the operator dropdown
    pub fn label(&self) -> &'static str {
        match self {
            Self::Like => "Contains",
            Self::NotLike => "Not contains",
            Self::Is => "Is exactly",
            Self::StartsWith => "Starts with",
            Self::EndsWith => "Ends with",
            Self::Default => "Is",
            Self::Between => "Between ... and ...",
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This week",
            Self::LastWeek => "Last week",
            Self::Present => "Is present",
            Self::Blank => "Is blank",
        }
    }

    /// Whether the operator reads the row's value(s)
    pub fn needs_value(&self) -> bool {
        !matches!(
            self,
            Self::Today | Self::Yesterday | Self::ThisWeek | Self::LastWeek | Self::Present | Self::Blank
        )
    }
}

/// Relation joining a field's later rows to the ones before it
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn combine(&self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }
}

/// Selection mode of an enum row
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectMode {
    #[default]
    Single,
    Multiple,
}

impl SelectMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Multiple,
            Self::Multiple => Self::Single,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Single => "select-single",
            Self::Multiple => "select-multiple",
        }
    }
}

/// Identity of a filter row: field name plus a per-field index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId {
    pub field: String,
    pub index: u32,
}

impl RowId {
    pub fn new(field: impl Into<String>, index: u32) -> Self {
        Self { field: field.into(), index }
    }

    /// Prefix shared by every input of this row, e.g. `f[name][1]`
    pub fn param_prefix(&self) -> String {
        format!("f[{}][{}]", self.field, self.index)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.field, self.index)
    }
}

impl FromStr for RowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, index) = s
            .rsplit_once('#')
            .ok_or_else(|| format!("Invalid row id: {}", s))?;
        let index = index.parse::<u32>().map_err(|e| e.to_string())?;
        Ok(Self::new(field, index))
    }
}

/// Lifecycle of a row; `Removed` rows never come back
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowState {
    #[default]
    Editing,
    Submitted,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_conversion() {
        assert_eq!(Operator::from_str("_present").unwrap(), Operator::Present);
        assert_eq!(Operator::StartsWith.as_str(), "starts_with");
        assert_eq!(Operator::Blank.to_string(), "_blank");
        assert!(Operator::from_str("bogus").is_err());
    }

    #[test]
    fn test_field_type_aliases() {
        assert_eq!(FieldType::from_str("color").unwrap(), FieldType::Enum);
        assert_eq!(FieldType::from_str("integer").unwrap(), FieldType::Numeric);
        assert_eq!(FieldType::from_str("datetime").unwrap(), FieldType::DateTime);
        assert_eq!(FieldType::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_combinator_semantics() {
        assert!(Combinator::And.combine(true, true));
        assert!(!Combinator::And.combine(true, false));
        assert!(Combinator::Or.combine(false, true));
        assert_eq!(Combinator::default(), Combinator::And);
    }

    #[test]
    fn test_row_id_round_trip() {
        let id = RowId::new("name", 3);
        assert_eq!(id.param_prefix(), "f[name][3]");
        assert_eq!(RowId::from_str(&id.to_string()).unwrap(), id);
        assert!(RowId::from_str("name").is_err());
    }
}

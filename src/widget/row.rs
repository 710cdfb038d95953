use serde::Serialize;

use crate::core::error::{FilterBoxError, Result};
use crate::core::models::{EnumOption, FilterableField};
use crate::core::operators::{default_operator, has_operator_control, operators_for};
use crate::core::params::{ParamValue, RowParams};
use crate::core::types::{Combinator, FieldType, Operator, RowId, RowState, SelectMode};

use super::picker::{DateTimePicker, PickerCommit};

/// Value slots of range rows: exact value, lower bound, upper bound
pub const RANGE_SLOTS: usize = 3;

pub const BOOLEAN_VALUES: [&str; 2] = ["true", "false"];

/// One predicate in the filter box
#[derive(Debug, Clone, Serialize)]
pub struct FilterRow {
    pub id: RowId,
    /// Field configuration captured when the row was added
    pub field: FilterableField,
    pub operator: Operator,
    /// Present on every row except the first of its field
    pub combinator: Option<Combinator>,
    pub select_mode: SelectMode,
    pub state: RowState,
    values: Vec<String>,
    #[serde(skip)]
    pickers: Vec<DateTimePicker>,
}

impl FilterRow {
    pub fn new(id: RowId, field: FilterableField, combinator: Option<Combinator>) -> Self {
        let field_type = field.field_type;
        let slots = if field_type.uses_range_slots() { RANGE_SLOTS } else { 1 };
        let pickers = if field_type.is_temporal() {
            (0..slots)
                .map(|slot| DateTimePicker::new(id.clone(), slot, field_type))
                .collect()
        } else {
            Vec::new()
        };
        Self {
            id,
            field,
            operator: default_operator(field_type),
            combinator,
            select_mode: SelectMode::Single,
            state: RowState::Editing,
            values: vec![String::new(); slots],
            pickers,
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.field.field_type
    }

    /// Operators offered in this row's dropdown
    pub fn operator_choices(&self) -> Vec<Operator> {
        operators_for(&self.field)
    }

    pub fn has_operator_control(&self) -> bool {
        has_operator_control(self.field_type())
    }

    pub fn has_combinator(&self) -> bool {
        self.combinator.is_some()
    }

    /// Selectable values of a value dropdown (boolean and enum rows)
    pub fn value_choices(&self) -> Vec<EnumOption> {
        match self.field_type() {
            FieldType::Boolean => BOOLEAN_VALUES
                .iter()
                .map(|v| EnumOption::new(*v, *v))
                .collect(),
            FieldType::Enum => self.field.options.clone(),
            _ => Vec::new(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, slot: usize) -> Option<&str> {
        self.values.get(slot).map(String::as_str)
    }

    pub fn pickers(&self) -> &[DateTimePicker] {
        &self.pickers
    }

    pub fn picker_mut(&mut self, slot: usize) -> Result<&mut DateTimePicker> {
        if !self.field_type().is_temporal() {
            return Err(FilterBoxError::NotAPicker(self.id.clone()));
        }
        let id = self.id.clone();
        self.pickers
            .get_mut(slot)
            .ok_or(FilterBoxError::InvalidSlot { row: id, slot })
    }

    pub fn set_operator(&mut self, operator: Operator) -> Result<()> {
        if !self.operator_choices().contains(&operator) {
            return Err(FilterBoxError::UnavailableOperator {
                field: self.field.name.clone(),
                operator: operator.to_string(),
            });
        }
        self.operator = operator;
        self.state = RowState::Editing;
        Ok(())
    }

    /// Write one value slot; temporal rows only change through picker commits
    pub fn set_value(&mut self, slot: usize, value: &str) -> Result<()> {
        if self.field_type().is_temporal() {
            return Err(FilterBoxError::NotAPicker(self.id.clone()));
        }
        if self.field_type() == FieldType::Enum && self.select_mode == SelectMode::Multiple {
            return self.set_values(vec![value.to_string()]);
        }
        let id = self.id.clone();
        let target = self
            .values
            .get_mut(slot)
            .ok_or(FilterBoxError::InvalidSlot { row: id, slot })?;
        *target = value.to_string();
        self.sync_boolean_operator();
        self.state = RowState::Editing;
        Ok(())
    }

    /// Boolean rows carry `_present`/`_blank` in their value dropdown
    fn sync_boolean_operator(&mut self) {
        if self.field_type() != FieldType::Boolean {
            return;
        }
        let choices = self.operator_choices();
        self.operator = match self.value(0) {
            None | Some("") => self.operator,
            Some(value) => value
                .parse::<Operator>()
                .ok()
                .filter(|op| choices.contains(op))
                .unwrap_or_else(|| default_operator(FieldType::Boolean)),
        };
    }

    /// Replace the selection of a multiple-select enum row
    pub fn set_values(&mut self, values: Vec<String>) -> Result<()> {
        if self.field_type() != FieldType::Enum || self.select_mode != SelectMode::Multiple {
            let first = values.into_iter().next().unwrap_or_default();
            return self.set_value(0, &first);
        }
        self.values = values;
        self.state = RowState::Editing;
        Ok(())
    }

    /// Switch an enum row between single and multiple selection
    pub fn toggle_select_mode(&mut self) -> Result<SelectMode> {
        if self.field_type() != FieldType::Enum {
            return Err(FilterBoxError::NotAnEnum(self.id.clone()));
        }
        self.select_mode = self.select_mode.toggled();
        self.values = match self.select_mode {
            SelectMode::Single => vec![String::new()],
            SelectMode::Multiple => Vec::new(),
        };
        self.state = RowState::Editing;
        Ok(self.select_mode)
    }

    /// Copy a committed picker value verbatim into its hidden slot
    pub fn apply_commit(&mut self, commit: &PickerCommit) -> Result<()> {
        let id = self.id.clone();
        let target = self
            .values
            .get_mut(commit.slot)
            .ok_or(FilterBoxError::InvalidSlot { row: id, slot: commit.slot })?;
        *target = commit.value.clone();
        self.state = RowState::Editing;
        Ok(())
    }

    /// Overwrite values from submitted parameters
    pub(crate) fn restore_values(&mut self, value: Option<&ParamValue>) {
        let field_type = self.field_type();
        match value {
            Some(ParamValue::List(values)) if field_type == FieldType::Enum => {
                self.select_mode = SelectMode::Multiple;
                self.values = values.clone();
            }
            Some(value) if field_type.uses_range_slots() => {
                let mut values: Vec<String> = value.values().into_iter().map(str::to_string).collect();
                values.resize(RANGE_SLOTS, String::new());
                self.values = values;
            }
            Some(value) => self.values = vec![value.first().unwrap_or_default().to_string()],
            None => {}
        }
        self.sync_boolean_operator();
        let values = self.values.clone();
        for picker in self.pickers.iter_mut() {
            if let Some(value) = values.get(picker.slot()) {
                picker.show(value);
            }
        }
    }

    /// Name of the value input(s), e.g. `f[date_field][1][v][]`
    pub fn value_param_name(&self) -> String {
        if self.is_list_valued() {
            format!("{}[v][]", self.id.param_prefix())
        } else {
            format!("{}[v]", self.id.param_prefix())
        }
    }

    pub fn is_list_valued(&self) -> bool {
        self.field_type().uses_range_slots()
            || (self.field_type() == FieldType::Enum && self.select_mode == SelectMode::Multiple)
    }

    /// Serialize into the `{o, v, s}` shape
    pub fn to_params(&self) -> RowParams {
        let v = if self.is_list_valued() {
            ParamValue::List(self.values.clone())
        } else {
            ParamValue::Single(self.values.first().cloned().unwrap_or_default())
        };
        RowParams {
            o: (self.has_operator_control() || self.operator != default_operator(self.field_type()))
                .then(|| self.operator.to_string()),
            v: Some(v),
            s: self.combinator.map(|c| c.to_string()),
        }
    }

    /// Format the row as a one-line summary
    pub fn summary(&self) -> String {
        let prefix = match self.combinator {
            Some(c) => format!("{c} "),
            None => String::new(),
        };
        let name = &self.field.name;
        let shown: Vec<&str> = self
            .values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        match self.operator {
            op if !op.needs_value() => format!("{prefix}{name} {}", op.label().to_lowercase()),
            Operator::Between => format!(
                "{prefix}{name} between {} and {}",
                self.value(1).filter(|v| !v.is_empty()).unwrap_or("..."),
                self.value(2).filter(|v| !v.is_empty()).unwrap_or("...")
            ),
            op => format!("{prefix}{name} {} \"{}\"", op.as_str(), shown.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::EnumOption;

    fn color_field() -> FilterableField {
        FilterableField::new("color", FieldType::Enum).with_options(vec![
            EnumOption::new("red", "red"),
            EnumOption::new("blu<e>é", "blue"),
        ])
    }

    #[test]
    fn test_string_row_params() {
        let mut row = FilterRow::new(RowId::new("name", 1), FilterableField::new("name", FieldType::String), None);
        row.set_value(0, "aa").unwrap();
        let params = row.to_params();
        assert_eq!(params.o.as_deref(), Some("like"));
        assert_eq!(params.v, Some(ParamValue::Single("aa".into())));
        assert!(params.s.is_none());
        assert_eq!(row.summary(), "name like \"aa\"");
    }

    #[test]
    fn test_boolean_row_has_no_operator_param() {
        let row = FilterRow::new(RowId::new("boolean_field", 1), FilterableField::new("boolean_field", FieldType::Boolean), None);
        let values: Vec<_> = row.value_choices().into_iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["true", "false"]);
        assert!(row.to_params().o.is_none());
    }

    #[test]
    fn test_boolean_presence_choice_sets_operator() {
        let field = FilterableField::new("retired", FieldType::Boolean);
        let mut row = FilterRow::new(RowId::new("retired", 1), field, None);
        row.set_value(0, "_blank").unwrap();
        assert_eq!(row.operator, Operator::Blank);
        assert_eq!(row.to_params().o.as_deref(), Some("_blank"));
        row.set_value(0, "true").unwrap();
        assert_eq!(row.operator, Operator::Is);
        assert!(row.to_params().o.is_none());
    }

    #[test]
    fn test_restored_boolean_operator_survives_empty_value() {
        let field = FilterableField::new("retired", FieldType::Boolean);
        let mut row = FilterRow::new(RowId::new("retired", 1), field, None);
        row.operator = Operator::Blank;
        row.restore_values(Some(&ParamValue::Single(String::new())));
        assert_eq!(row.operator, Operator::Blank);
        assert_eq!(row.to_params().o.as_deref(), Some("_blank"));
    }

    #[test]
    fn test_temporal_rows_reject_direct_writes() {
        let mut row = FilterRow::new(RowId::new("date_field", 1), FilterableField::new("date_field", FieldType::Date), None);
        assert!(matches!(row.set_value(0, "2015-10-08"), Err(FilterBoxError::NotAPicker(_))));
        assert_eq!(row.values().len(), RANGE_SLOTS);
        assert_eq!(row.value_param_name(), "f[date_field][1][v][]");
    }

    #[test]
    fn test_enum_toggle_switches_param_shape() {
        let mut row = FilterRow::new(RowId::new("color", 1), color_field(), None);
        row.set_value(0, "red").unwrap();
        assert_eq!(row.value_param_name(), "f[color][1][v]");
        assert_eq!(row.toggle_select_mode().unwrap(), SelectMode::Multiple);
        assert!(row.values().is_empty());
        row.set_values(vec!["red".into(), "blue".into()]).unwrap();
        assert_eq!(row.value_param_name(), "f[color][1][v][]");
        assert_eq!(row.to_params().v, Some(ParamValue::List(vec!["red".into(), "blue".into()])));
        assert_eq!(row.value_choices(), color_field().options);
    }

    #[test]
    fn test_unavailable_operator_is_rejected() {
        let field = FilterableField::new("name", FieldType::String).required(true);
        let mut row = FilterRow::new(RowId::new("name", 1), field, None);
        assert!(row.set_operator(Operator::Present).is_err());
        assert!(row.set_operator(Operator::StartsWith).is_ok());
    }
}

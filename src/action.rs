use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants};

use crate::core::types::{Combinator, Operator, RowId};

/// User interactions with the filter box and the surrounding list page
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumDiscriminants, Serialize, Deserialize)]
#[strum_discriminants(name(ActionKind), derive(Hash, Display))]
pub enum Action {
    /// A field was chosen from the "Add filter" menu
    AddFilter(String),
    /// The row's remove button was clicked
    RemoveFilter(RowId),
    SetOperator { row: RowId, operator: Operator },
    /// Text typed into a value input, or a single value picked from a dropdown
    SetValue { row: RowId, slot: usize, value: String },
    /// Selection of a multiple-select enum row
    SetValues { row: RowId, values: Vec<String> },
    SetCombinator { row: RowId, combinator: Combinator },
    /// The `switch-select` toggle of an enum row
    ToggleSelectMode(RowId),
    /// Text typed into a picker's visible control
    TypeDisplayText { row: RowId, slot: usize, text: String },
    /// A value selected in a picker
    PickDate { row: RowId, slot: usize, input: String },
    /// Resubmit the page with the current filters
    Refresh,
    ClearFilters,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::AddFilter(_) => "Add filter",
            Action::RemoveFilter(_) => "Remove filter",
            Action::SetOperator { .. } => "Change operator",
            Action::SetValue { .. } => "Change value",
            Action::SetValues { .. } => "Change selection",
            Action::SetCombinator { .. } => "Change and/or",
            Action::ToggleSelectMode(_) => "Toggle multiple selection",
            Action::TypeDisplayText { .. } => "Type into picker",
            Action::PickDate { .. } => "Pick date",
            Action::Refresh => "Refresh",
            Action::ClearFilters => "Clear filters",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_and_display() {
        let action = Action::RemoveFilter(RowId::new("name", 1));
        assert_eq!(ActionKind::from(&action), ActionKind::RemoveFilter);
        assert_eq!(action.to_string(), "RemoveFilter");
        assert_eq!(action.description(), "Remove filter");
    }

    #[test]
    fn test_action_serde() {
        let action = Action::SetCombinator { row: RowId::new("name", 2), combinator: Combinator::Or };
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}

//! FilterBox: per-field filter rows of an admin list page
use color_eyre::Result;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionKind};
use crate::component::Component;
use crate::config::FilterSettings;
use crate::core::error::{FilterBoxError, Result as FilterResult};
use crate::core::models::{FieldConfigProvider, FilterableField, ModelConfig};
use crate::core::operators::default_operator;
use crate::core::params::ParameterTree;
use crate::core::types::{Combinator, Operator, RowId, RowState, SelectMode};

use super::picker::PickerCommit;
use super::render::{render_add_filter_menu, render_filter_box};
use super::row::FilterRow;

const SUPPORTED_ACTIONS: [ActionKind; 11] = [
    ActionKind::AddFilter,
    ActionKind::RemoveFilter,
    ActionKind::SetOperator,
    ActionKind::SetValue,
    ActionKind::SetValues,
    ActionKind::SetCombinator,
    ActionKind::ToggleSelectMode,
    ActionKind::TypeDisplayText,
    ActionKind::PickDate,
    ActionKind::Refresh,
    ActionKind::ClearFilters,
];

/// Filter box controller
///
/// Rows are keyed by `(field, index)` and kept in insertion order. Indices are
/// allocated per field and never handed out twice during one page lifecycle.
#[derive(Debug)]
pub struct FilterBox<P: FieldConfigProvider = ModelConfig> {
    provider: P,
    settings: FilterSettings,
    rows: IndexMap<RowId, FilterRow>,
    used_indices: HashMap<String, BTreeSet<u32>>,
}

impl<P: FieldConfigProvider> FilterBox<P> {
    /// Create an empty filter box
    pub fn new(provider: P) -> Self {
        Self::with_settings(provider, FilterSettings::default())
    }

    pub fn with_settings(provider: P, settings: FilterSettings) -> Self {
        Self {
            provider,
            settings,
            rows: IndexMap::new(),
            used_indices: HashMap::new(),
        }
    }

    /// Rebuild a box from submitted parameters
    pub fn from_params(provider: P, settings: FilterSettings, params: &ParameterTree) -> Self {
        let mut filter_box = Self::with_settings(provider, settings);
        filter_box.restore(params);
        filter_box
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Point the box at another model; rows of the old model are dropped
    pub fn switch_model(&mut self, provider: P) {
        self.provider = provider;
        self.clear();
        self.used_indices.clear();
    }

    /// Every field offered by the "Add filter" menu
    pub fn add_filter_menu(&self) -> Vec<FilterableField> {
        self.provider.fields()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &FilterRow> {
        self.rows.values()
    }

    pub fn row(&self, id: &RowId) -> Option<&FilterRow> {
        self.rows.get(id)
    }

    /// Rows of one field in insertion order
    pub fn rows_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FilterRow> + 'a {
        self.rows.values().filter(move |row| row.field.name == field)
    }

    fn row_mut(&mut self, id: &RowId) -> FilterResult<&mut FilterRow> {
        self.rows
            .get_mut(id)
            .ok_or_else(|| FilterBoxError::RowNotFound(id.clone()))
    }

    fn lowest_unused_index(&self, field: &str) -> u32 {
        let used = self.used_indices.get(field);
        (1..)
            .find(|i| used.is_none_or(|set| !set.contains(i)))
            .unwrap_or(u32::MAX)
    }

    fn has_rows_for(&self, field: &str) -> bool {
        self.rows.keys().any(|id| id.field == field)
    }

    /// Add a row for a field, as picked from the "Add filter" menu
    pub fn add_filter(&mut self, field_name: &str) -> FilterResult<RowId> {
        let field = self
            .provider
            .field(field_name)
            .ok_or_else(|| FilterBoxError::UnknownField(field_name.to_string()))?;
        let index = self.lowest_unused_index(field_name);
        let id = RowId::new(field_name, index);
        let combinator = self
            .has_rows_for(field_name)
            .then_some(self.settings.default_combinator);
        debug!("add_filter: {} (combinator: {:?})", id, combinator);
        self.used_indices.entry(field_name.to_string()).or_default().insert(index);
        self.rows.insert(id.clone(), FilterRow::new(id.clone(), field, combinator));
        Ok(id)
    }

    /// Remove a row and its inputs; unknown rows are ignored
    pub fn remove_filter(&mut self, id: &RowId) -> Option<FilterRow> {
        let mut removed = self.rows.shift_remove(id)?;
        removed.state = RowState::Removed;
        debug!("remove_filter: {}", id);
        // The field's new first row no longer has anything to combine with
        if let Some(first) = self.rows.values_mut().find(|row| row.field.name == id.field) {
            first.combinator = None;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn set_operator(&mut self, id: &RowId, operator: Operator) -> FilterResult<()> {
        self.row_mut(id)?.set_operator(operator)
    }

    pub fn set_value(&mut self, id: &RowId, slot: usize, value: &str) -> FilterResult<()> {
        self.row_mut(id)?.set_value(slot, value)
    }

    pub fn set_values(&mut self, id: &RowId, values: Vec<String>) -> FilterResult<()> {
        self.row_mut(id)?.set_values(values)
    }

    /// Change the combinator of a non-first row
    pub fn set_combinator(&mut self, id: &RowId, combinator: Combinator) -> FilterResult<()> {
        let row = self.row_mut(id)?;
        match row.combinator.as_mut() {
            Some(current) => {
                *current = combinator;
                row.state = RowState::Editing;
                Ok(())
            }
            None => Err(FilterBoxError::MalformedParameter(format!(
                "{id} is the first row of its field and has no combinator"
            ))),
        }
    }

    pub fn toggle_select_mode(&mut self, id: &RowId) -> FilterResult<SelectMode> {
        self.row_mut(id)?.toggle_select_mode()
    }

    /// Free typing into a picker's visible control
    pub fn type_display_text(&mut self, id: &RowId, slot: usize, text: &str) -> FilterResult<()> {
        self.row_mut(id)?.picker_mut(slot)?.type_text(text);
        Ok(())
    }

    /// Select a value in a row's picker and copy the commit into the hidden slot
    pub fn pick_date(&mut self, id: &RowId, slot: usize, input: &str) -> FilterResult<PickerCommit> {
        let row = self.row_mut(id)?;
        let commit = row.picker_mut(slot)?.set_date(input)?;
        row.apply_commit(&commit)?;
        debug!("pick_date: {} slot {} -> {}", id, slot, commit.value);
        Ok(commit)
    }

    /// Apply a commit raised by a picker outside the box
    pub fn commit_picker(&mut self, commit: &PickerCommit) -> FilterResult<()> {
        self.row_mut(&commit.row)?.apply_commit(commit)
    }

    /// Register a listener on one picker of a temporal row
    pub fn on_picker_commit(
        &mut self,
        id: &RowId,
        slot: usize,
        listener: impl FnMut(&PickerCommit) + 'static,
    ) -> FilterResult<()> {
        self.row_mut(id)?.picker_mut(slot)?.on_commit(listener);
        Ok(())
    }

    /// Serialize all rows into `field -> index -> {o, v, s}`
    pub fn build_query_params(&self) -> ParameterTree {
        let mut tree = ParameterTree::new();
        for row in self.rows.values() {
            tree.insert(row.id.field.clone(), row.id.index.to_string(), row.to_params());
        }
        tree
    }

    /// Mark every row as submitted, ahead of a refresh
    pub fn mark_submitted(&mut self) {
        for row in self.rows.values_mut() {
            row.state = RowState::Submitted;
        }
    }

    /// Recreate rows from submitted parameters, keeping their indices
    ///
    /// Unknown fields and non-numeric indices are skipped. A missing or
    /// unknown operator falls back to the field type's default.
    pub fn restore(&mut self, params: &ParameterTree) {
        for (field_name, index, params) in params.iter() {
            let Some(field) = self.provider.field(field_name) else {
                warn!("Skipping filter on unknown field '{}'", field_name);
                continue;
            };
            let Ok(index) = index.parse::<u32>() else {
                warn!("Skipping filter '{}' with non-numeric index '{}'", field_name, index);
                continue;
            };
            let id = RowId::new(field_name.as_str(), index);
            if self.rows.contains_key(&id) {
                continue;
            }
            let combinator = self.has_rows_for(field_name).then(|| {
                params
                    .s
                    .as_deref()
                    .and_then(|s| Combinator::from_str(s).ok())
                    .unwrap_or(self.settings.default_combinator)
            });
            let field_type = field.field_type;
            let mut row = FilterRow::new(id.clone(), field, combinator);
            let choices = row.operator_choices();
            let operator = params
                .o
                .as_deref()
                .and_then(|o| Operator::from_str(o).ok())
                .filter(|op| choices.contains(op))
                .unwrap_or_else(|| default_operator(field_type));
            row.operator = operator;
            row.restore_values(params.v.as_ref());
            row.state = RowState::Submitted;
            self.used_indices.entry(field_name.clone()).or_default().insert(index);
            self.rows.insert(id, row);
        }
        info!("Restored {} filter rows", self.rows.len());
    }

    /// One summary line per row
    pub fn summary(&self) -> Vec<String> {
        self.rows.values().map(FilterRow::summary).collect()
    }

    /// Markup of the `#filters_box` region
    pub fn render_html(&self) -> String {
        render_filter_box(self.rows.values())
    }

    /// Markup of the "Add filter" menu
    pub fn render_menu(&self) -> String {
        render_add_filter_menu(&self.add_filter_menu())
    }
}

impl<P: FieldConfigProvider> Component for FilterBox<P> {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        debug!("FilterBox handle_action: {:?}", action);
        match action {
            Action::AddFilter(field) => {
                self.add_filter(&field)?;
            }
            Action::RemoveFilter(id) => {
                self.remove_filter(&id);
            }
            Action::SetOperator { row, operator } => self.set_operator(&row, operator)?,
            Action::SetValue { row, slot, value } => self.set_value(&row, slot, &value)?,
            Action::SetValues { row, values } => self.set_values(&row, values)?,
            Action::SetCombinator { row, combinator } => self.set_combinator(&row, combinator)?,
            Action::ToggleSelectMode(row) => {
                self.toggle_select_mode(&row)?;
            }
            Action::TypeDisplayText { row, slot, text } => self.type_display_text(&row, slot, &text)?,
            Action::PickDate { row, slot, input } => {
                self.pick_date(&row, slot, &input)?;
            }
            Action::Refresh => self.mark_submitted(),
            Action::ClearFilters => self.clear(),
        }
        Ok(true)
    }

    fn render(&self) -> String {
        format!("{}{}", self.render_menu(), self.render_html())
    }

    fn supported_actions(&self) -> &[ActionKind] {
        &SUPPORTED_ACTIONS
    }

    fn name(&self) -> &str {
        "FilterBox"
    }
}

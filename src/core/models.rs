use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// One selectable value of an enum field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    /// Display text
    pub label: String,
    /// Underlying code submitted with the form
    pub value: String,
}

impl EnumOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// A field that can be filtered on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterableField {
    pub name: String,
    /// Human label; derived from the name when absent
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<EnumOption>,
}

impl FilterableField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type,
            required: false,
            options: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options(mut self, options: Vec<EnumOption>) -> Self {
        self.options = options;
        self
    }

    /// Label shown in the "Add filter" menu, e.g. `date_field` -> `Date field`
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let spaced = self.name.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Source of field configuration for the filter box
///
/// The controller asks the provider on every "Add filter" action and never
/// caches the answer, so switching models never leaves stale field types behind.
pub trait FieldConfigProvider {
    /// Look up a field by name
    fn field(&self, name: &str) -> Option<FilterableField>;

    /// Every configured field, in menu order
    fn fields(&self) -> Vec<FilterableField>;
}

/// Field configuration of a single model, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FilterableField>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: IndexMap::new() }
    }

    /// Builder-style field registration; later definitions replace earlier ones
    pub fn with_field(mut self, field: FilterableField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

impl FieldConfigProvider for ModelConfig {
    fn field(&self, name: &str) -> Option<FilterableField> {
        self.fields.get(name).cloned()
    }

    fn fields(&self) -> Vec<FilterableField> {
        self.fields.values().cloned().collect()
    }
}

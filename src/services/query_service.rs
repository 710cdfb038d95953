//! In-memory list query service
//!
//! Compiles submitted filter parameters into per-field predicates and runs
//! them over a set of JSON records, then renders the refreshed page with the
//! filter box rebuilt from the same parameters.

use chrono::{Local, NaiveDate};
use color_eyre::Result;
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::FilterSettings;
use crate::core::models::{FieldConfigProvider, ModelConfig};
use crate::core::params::ParameterTree;
use crate::core::types::Combinator;
use crate::widget::filter_box::FilterBox;
use crate::widget::render::escape_html;

use super::predicate::{Condition, FieldPredicate, value_text};

/// One list record, keyed by field name
pub type Record = Map<String, Value>;

/// Compiled filter parameters; fields are ANDed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    pub fields: Vec<FieldPredicate>,
}

impl FilterQuery {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, record: &Record, today: NaiveDate) -> bool {
        self.fields
            .iter()
            .all(|predicate| predicate.evaluate(record.get(&predicate.field), today))
    }
}

/// Result of a list refresh: the rebuilt filter box plus the matching records
#[derive(Debug)]
pub struct Page {
    pub filter_box: FilterBox<ModelConfig>,
    pub records: Vec<Record>,
    pub columns: Vec<String>,
}

impl Page {
    /// Text of one column across the listed records
    pub fn column_values(&self, field: &str) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.get(field).map(value_text).unwrap_or_default())
            .collect()
    }

    /// Filter box followed by the result table
    pub fn render(&self) -> String {
        let mut html = String::new();
        html.push_str(&self.filter_box.render_menu());
        html.push_str(&self.filter_box.render_html());
        html.push_str("<table class=\"table table-condensed table-striped\"><thead><tr>");
        for column in &self.columns {
            html.push_str(&format!(
                "<th class=\"{}_field\">{}</th>",
                escape_html(column),
                escape_html(column)
            ));
        }
        html.push_str("</tr></thead><tbody>");
        for record in &self.records {
            html.push_str("<tr>");
            for column in &self.columns {
                let text = record.get(column).map(value_text).unwrap_or_default();
                html.push_str(&format!(
                    "<td class=\"{}_field\">{}</td>",
                    escape_html(column),
                    escape_html(&text)
                ));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Service answering list requests for one model
#[derive(Debug, Clone)]
pub struct QueryService {
    model: ModelConfig,
    records: Vec<Record>,
    settings: FilterSettings,
    columns: Vec<String>,
}

impl QueryService {
    pub fn new(model: ModelConfig, records: Vec<Record>) -> Self {
        let columns = model.fields.keys().cloned().collect();
        Self {
            model,
            records,
            settings: FilterSettings::default(),
            columns,
        }
    }

    /// Load records from a JSON array file
    pub fn from_json_file(model: ModelConfig, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let records: Vec<Record> = serde_json::from_str(&text)?;
        info!("Loaded {} {} records from {}", records.len(), model.name, path.display());
        Ok(Self::new(model, records))
    }

    pub fn with_settings(mut self, settings: FilterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Pin the reference day used by relative date operators
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.settings.today = Some(today);
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        if !columns.is_empty() {
            self.columns = columns;
        }
        self
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn today(&self) -> NaiveDate {
        self.settings.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Compile submitted parameters
    ///
    /// Unknown fields are skipped. Rows without a usable value are ignored.
    /// A row's missing combinator means `and`, and the first row's is unused.
    pub fn compile(&self, params: &ParameterTree) -> FilterQuery {
        let mut query = FilterQuery::default();
        for field_name in params.field_names() {
            let Some(field) = self.model.field(field_name) else {
                warn!("Ignoring filter on unknown field '{}'", field_name);
                continue;
            };
            let clauses: Vec<(Combinator, Condition)> = params
                .rows_for(field_name)
                .filter_map(|(index, row)| {
                    let condition = Condition::compile(&field, row)?;
                    let combinator = row
                        .s
                        .as_deref()
                        .and_then(|s| Combinator::from_str(s).ok())
                        .unwrap_or_default();
                    debug!("compiled {}[{}]: {:?} {:?}", field_name, index, combinator, condition);
                    Some((combinator, condition))
                })
                .collect();
            if !clauses.is_empty() {
                query.fields.push(FieldPredicate { field: field_name.clone(), clauses });
            }
        }
        query
    }

    /// Records matching the submitted parameters, in stored order
    pub fn filter(&self, params: &ParameterTree) -> Vec<Record> {
        let query = self.compile(params);
        let today = self.today();
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|record| query.matches(record, today))
            .cloned()
            .collect();
        info!(
            "{} of {} {} records match {} filtered fields",
            records.len(),
            self.records.len(),
            self.model.name,
            query.fields.len()
        );
        records
    }

    /// Answer a list request: filter, then rebuild the filter box from the
    /// same parameters so every submitted row is shown again
    pub fn refresh(&self, params: &ParameterTree) -> Page {
        let records = self.filter(params);
        let filter_box = FilterBox::from_params(self.model.clone(), self.settings.clone(), params);
        Page {
            filter_box,
            records,
            columns: self.columns.clone(),
        }
    }

    /// Same as [`QueryService::refresh`] for a raw query string
    pub fn refresh_query(&self, query: &str) -> Page {
        self.refresh(&ParameterTree::from_query(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FilterableField;
    use crate::core::types::FieldType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn service() -> QueryService {
        let model = ModelConfig::new("player")
            .with_field(FilterableField::new("name", FieldType::String))
            .with_field(FilterableField::new("number", FieldType::Numeric))
            .with_field(FilterableField::new("retired", FieldType::Boolean));
        let records = ["aaa", "aab", "bbb"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({"name": name, "number": i + 1, "retired": i == 2})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        QueryService::new(model, records).with_today(NaiveDate::from_ymd_opt(2015, 10, 8).unwrap())
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| value_text(&r["name"])).collect()
    }

    #[test]
    fn test_no_filters_lists_everything() {
        assert_eq!(service().filter(&ParameterTree::new()).len(), 3);
    }

    #[test]
    fn test_missing_combinator_defaults_to_and() {
        let params = ParameterTree::from_query(
            "f[name][1][o]=like&f[name][1][v]=aa&f[name][2][o]=like&f[name][2][v]=ab",
        );
        assert_eq!(names(&service().filter(&params)), vec!["aab"]);
    }

    #[test]
    fn test_fields_are_anded() {
        let params = ParameterTree::from_query(
            "f[name][1][o]=like&f[name][1][v]=a&f[retired][2][v]=false&f[number][3][o]=between&f[number][3][v][]=&f[number][3][v][]=2&f[number][3][v][]=",
        );
        assert_eq!(names(&service().filter(&params)), vec!["aab"]);
    }

    #[test]
    fn test_unknown_fields_and_blank_values_are_ignored() {
        let params = ParameterTree::from_query("f[salary][1][v]=10&f[name][2][o]=like&f[name][2][v]=");
        assert_eq!(service().filter(&params).len(), 3);
    }

    #[test]
    fn test_refresh_restores_rows() {
        let page = service().refresh_query("f[name][4][o]=is&f[name][4][v]=bbb");
        assert_eq!(page.filter_box.len(), 1);
        assert_eq!(page.column_values("name"), vec!["bbb"]);
        assert!(page.render().contains("<td class=\"name_field\">bbb</td>"));
    }
}

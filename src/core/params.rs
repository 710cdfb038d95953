//! Request parameter tree: `f[<field>][<index>][o|v|s]`
//!
//! Field names and row indices are opaque tokens here. The tree keeps
//! submission order for fields and for rows within a field.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{FilterBoxError, Result};

lazy_static! {
    static ref PARAM_KEY: Regex =
        Regex::new(r"^f\[([^\[\]]+)\]\[([^\[\]]+)\]\[(o|v|s)\](\[\])?$").unwrap();
}

/// A row value: single (`v`) or multi-valued (`v[]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// All values as a slice-like list; a single value is a list of one
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::List(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v.as_str()),
            Self::List(vs) => vs.first().map(String::as_str),
        }
    }

    /// True when no value carries any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.values().iter().all(|v| v.trim().is_empty())
    }
}

/// Parameters of one submitted row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
}

/// Nested mapping field name -> row index -> row parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTree {
    fields: IndexMap<String, IndexMap<String, RowParams>>,
}

impl ParameterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of rows across all fields
    pub fn row_count(&self) -> usize {
        self.fields.values().map(IndexMap::len).sum()
    }

    /// Insert or replace a row
    pub fn insert(&mut self, field: impl Into<String>, index: impl Into<String>, row: RowParams) {
        self.fields.entry(field.into()).or_default().insert(index.into(), row);
    }

    pub fn row(&self, field: &str, index: &str) -> Option<&RowParams> {
        self.fields.get(field)?.get(index)
    }

    /// Rows of one field in submission order
    pub fn rows_for(&self, field: &str) -> impl Iterator<Item = (&String, &RowParams)> {
        self.fields.get(field).into_iter().flat_map(|rows| rows.iter())
    }

    /// Every (field, index, row) triple in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String, &RowParams)> {
        self.fields
            .iter()
            .flat_map(|(field, rows)| rows.iter().map(move |(index, row)| (field, index, row)))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Set one parameter from a raw key such as `f[name][1][v][]`
    pub fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        let caps = PARAM_KEY
            .captures(key)
            .ok_or_else(|| FilterBoxError::MalformedParameter(key.to_string()))?;
        let field = caps[1].to_string();
        let index = caps[2].to_string();
        let list = caps.get(4).is_some();
        let row = self.fields.entry(field).or_default().entry(index).or_default();
        match &caps[3] {
            "o" => row.o = Some(value.to_string()),
            "s" => row.s = Some(value.to_string()),
            _ if list => match &mut row.v {
                Some(ParamValue::List(values)) => values.push(value.to_string()),
                _ => row.v = Some(ParamValue::List(vec![value.to_string()])),
            },
            _ => row.v = Some(ParamValue::Single(value.to_string())),
        }
        Ok(())
    }

    /// Parse an `application/x-www-form-urlencoded` query string
    ///
    /// Pairs that are not filter parameters are ignored. Malformed filter keys
    /// are skipped with a warning.
    pub fn from_query(query: &str) -> Self {
        let mut tree = Self::new();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let (Some(key), Some(value)) = (decode_component(raw_key), decode_component(raw_value)) else {
                warn!("Skipping undecodable query pair: {}", pair);
                continue;
            };
            if !key.starts_with("f[") {
                continue;
            }
            if let Err(e) = tree.set_raw(&key, &value) {
                warn!("Skipping filter parameter: {}", e);
            }
        }
        tree
    }

    /// Flatten into `(key, value)` pairs, e.g. `("f[name][1][o]", "like")`
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (field, index, row) in self.iter() {
            let prefix = format!("f[{field}][{index}]");
            if let Some(o) = &row.o {
                pairs.push((format!("{prefix}[o]"), o.clone()));
            }
            match &row.v {
                Some(ParamValue::Single(v)) => pairs.push((format!("{prefix}[v]"), v.clone())),
                Some(ParamValue::List(vs)) => {
                    for v in vs {
                        pairs.push((format!("{prefix}[v][]"), v.clone()));
                    }
                }
                None => {}
            }
            if let Some(s) = &row.s {
                pairs.push((format!("{prefix}[s]"), s.clone()));
            }
        }
        pairs
    }

    /// Encode as a query string (without the leading `?`)
    pub fn to_query(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rails_style_query() {
        let tree = ParameterTree::from_query(
            "?model_name=player&f%5Bname%5D%5B1%5D%5Bo%5D=like&f[name][1][v]=aa\
             &f[name][2][o]=like&f[name][2][v]=ab&f[name][2][s]=and\
             &f[date_field][3][v][]=2015-10-08T00:00:00&f[date_field][3][v][]=&f[date_field][3][v][]=",
        );
        assert_eq!(tree.row_count(), 3);
        let first = tree.row("name", "1").unwrap();
        assert_eq!(first.o.as_deref(), Some("like"));
        assert_eq!(first.v, Some(ParamValue::Single("aa".into())));
        assert_eq!(first.s, None);
        assert_eq!(tree.row("name", "2").unwrap().s.as_deref(), Some("and"));
        let date = tree.row("date_field", "3").unwrap();
        assert_eq!(
            date.v,
            Some(ParamValue::List(vec!["2015-10-08T00:00:00".into(), String::new(), String::new()]))
        );
    }

    #[test]
    fn test_malformed_keys_are_skipped() {
        let tree = ParameterTree::from_query("f[name]=x&f[name][1][q]=y&f[team][2][v]=");
        assert_eq!(tree.row_count(), 1);
        assert!(tree.row("team", "2").unwrap().o.is_none());
        assert!(tree.row("team", "2").unwrap().v.as_ref().unwrap().is_blank());
    }

    #[test]
    fn test_plus_and_escapes_decode() {
        let tree = ParameterTree::from_query("f[color][1][v]=blu%3Ce%3E%C3%A9&f[name][1][v]=a+b");
        assert_eq!(tree.row("color", "1").unwrap().v, Some(ParamValue::Single("blu<e>é".into())));
        assert_eq!(tree.row("name", "1").unwrap().v, Some(ParamValue::Single("a b".into())));
    }

    #[test]
    fn test_query_encoding_is_readable_back() {
        let mut tree = ParameterTree::new();
        tree.insert(
            "color",
            "4",
            RowParams {
                o: Some("is".into()),
                v: Some(ParamValue::List(vec!["red".into(), "blu<e>é".into()])),
                s: Some("or".into()),
            },
        );
        let query = tree.to_query();
        assert!(query.starts_with("f%5Bcolor%5D%5B4%5D%5Bo%5D=is"));
        assert_eq!(ParameterTree::from_query(&query), tree);
    }

    #[test]
    fn test_json_shape() {
        let mut tree = ParameterTree::new();
        tree.insert("name", "1", RowParams { o: Some("like".into()), v: Some(ParamValue::Single("aa".into())), s: None });
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"name":{"1":{"o":"like","v":"aa"}}}"#);
    }
}

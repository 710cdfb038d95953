//! Row predicates evaluated against JSON records

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::models::FilterableField;
use crate::core::operators::default_operator;
use crate::core::params::{ParamValue, RowParams};
use crate::core::types::{Combinator, FieldType, Operator};
use crate::widget::picker::parse_temporal;

/// A single compiled filter row
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field_type: FieldType,
    pub operator: Operator,
    pub values: Vec<String>,
}

/// All compiled rows of one field, folded left with their combinators
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub clauses: Vec<(Combinator, Condition)>,
}

impl FieldPredicate {
    pub fn evaluate(&self, record_value: Option<&Value>, today: NaiveDate) -> bool {
        let mut clauses = self.clauses.iter();
        let Some((_, first)) = clauses.next() else {
            return true;
        };
        // The first row's combinator has nothing on its left
        clauses.fold(first.matches(record_value, today), |acc, (combinator, condition)| {
            combinator.combine(acc, condition.matches(record_value, today))
        })
    }
}

/// Text form of a record value used for string comparisons
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("id"))
            .map(value_text)
            .unwrap_or_default(),
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => map.get("id").and_then(value_number),
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

impl Condition {
    /// Compile a submitted row; `None` when the row carries nothing to filter on
    pub fn compile(field: &FilterableField, params: &RowParams) -> Option<Self> {
        let field_type = field.field_type;
        let values: Vec<String> = match &params.v {
            Some(ParamValue::Single(v)) => vec![v.trim().to_string()],
            Some(ParamValue::List(vs)) => vs.iter().map(|v| v.trim().to_string()).collect(),
            None => Vec::new(),
        };
        let mut operator = params
            .o
            .as_deref()
            .and_then(|o| o.parse::<Operator>().ok())
            .unwrap_or_else(|| default_operator(field_type));
        // Boolean dropdowns submit presence checks as values
        if field_type == FieldType::Boolean && operator == Operator::Is {
            if let Some(Ok(op @ (Operator::Present | Operator::Blank))) =
                values.first().map(|v| v.parse::<Operator>())
            {
                operator = op;
            }
        }
        let condition = Self { field_type, operator, values };
        if operator.needs_value() && !condition.has_operands() {
            debug!("Ignoring '{}' filter on {} without a value", operator, field.name);
            return None;
        }
        if operator.needs_value() && !condition.operands_parse() {
            warn!("Ignoring filter on {} with unusable value {:?}", field.name, condition.values);
            return None;
        }
        Some(condition)
    }

    /// Numbers and dates must parse; other types take any text
    fn operands_parse(&self) -> bool {
        let mut filled = self.values.iter().filter(|v| !v.is_empty());
        match self.field_type {
            FieldType::Numeric => filled.all(|v| v.parse::<f64>().is_ok()),
            t if t.is_temporal() => filled.all(|v| parse_temporal(t, v).is_some()),
            FieldType::Boolean => self.exact().is_some_and(|v| parse_bool(v).is_some()),
            _ => true,
        }
    }

    fn slot(&self, slot: usize) -> Option<&str> {
        self.values.get(slot).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Exact value: slot 0, or the only value of single-valued rows
    fn exact(&self) -> Option<&str> {
        self.slot(0)
    }

    fn has_operands(&self) -> bool {
        match (self.field_type, self.operator) {
            (_, Operator::Between) => self.slot(1).is_some() || self.slot(2).is_some(),
            (FieldType::Enum, _) => self.values.iter().any(|v| !v.is_empty()),
            _ => self.exact().is_some(),
        }
    }

    pub fn matches(&self, record_value: Option<&Value>, today: NaiveDate) -> bool {
        let value = record_value.unwrap_or(&Value::Null);
        let text = value_text(value);
        match self.operator {
            Operator::Present => return !text.trim().is_empty(),
            Operator::Blank => return text.trim().is_empty(),
            _ => {}
        }
        match self.field_type {
            FieldType::String | FieldType::Text | FieldType::Association => self.matches_text(&text),
            FieldType::Boolean => self.matches_bool(value, &text),
            FieldType::Enum => self.values.iter().any(|v| !v.is_empty() && *v == text),
            FieldType::Numeric => self.matches_number(value),
            FieldType::Date | FieldType::DateTime | FieldType::Time => self.matches_temporal(&text, today),
        }
    }

    fn matches_text(&self, text: &str) -> bool {
        let Some(needle) = self.exact() else {
            return true;
        };
        let hay = text.to_lowercase();
        let needle = needle.to_lowercase();
        match self.operator {
            Operator::NotLike => !hay.contains(&needle),
            Operator::Is | Operator::Default => hay == needle,
            Operator::StartsWith => hay.starts_with(&needle),
            Operator::EndsWith => hay.ends_with(&needle),
            _ => hay.contains(&needle),
        }
    }

    fn matches_bool(&self, value: &Value, text: &str) -> bool {
        let Some(wanted) = self.exact().and_then(parse_bool) else {
            debug!("Ignoring boolean filter value {:?}", self.exact());
            return true;
        };
        let actual = match value {
            Value::Bool(b) => Some(*b),
            _ => parse_bool(text),
        };
        actual == Some(wanted)
    }

    fn matches_number(&self, value: &Value) -> bool {
        let bound = |slot: usize| -> Option<Option<f64>> {
            match self.slot(slot) {
                None => Some(None),
                Some(raw) => match raw.parse::<f64>() {
                    Ok(n) => Some(Some(n)),
                    Err(_) => {
                        debug!("Ignoring unparseable number '{}'", raw);
                        None
                    }
                },
            }
        };
        let actual = value_number(value);
        match self.operator {
            Operator::Between => {
                let (Some(lower), Some(upper)) = (bound(1), bound(2)) else {
                    return true;
                };
                let Some(actual) = actual else {
                    return false;
                };
                lower.is_none_or(|l| actual >= l) && upper.is_none_or(|u| actual <= u)
            }
            _ => match bound(0) {
                Some(Some(wanted)) => actual.is_some_and(|a| (a - wanted).abs() < f64::EPSILON),
                _ => true,
            },
        }
    }

    fn matches_temporal(&self, text: &str, today: NaiveDate) -> bool {
        let parse = |raw: &str| parse_temporal(self.field_type, raw);
        let Some(actual) = parse(text) else {
            return false;
        };
        let day = actual.date();
        match self.operator {
            Operator::Today => day == today,
            Operator::Yesterday => day == today - Duration::days(1),
            Operator::ThisWeek => day >= week_start(today) && day < week_start(today) + Duration::days(7),
            Operator::LastWeek => {
                let start = week_start(today) - Duration::days(7);
                day >= start && day < start + Duration::days(7)
            }
            Operator::Between => {
                let lower = self.slot(1).map(parse);
                let upper = self.slot(2).map(parse);
                if matches!(lower, Some(None)) || matches!(upper, Some(None)) {
                    debug!("Ignoring unparseable date range {:?}", self.values);
                    return true;
                }
                let key = |dt: NaiveDateTime| self.comparable(dt);
                let actual = key(actual);
                lower.flatten().is_none_or(|l| actual >= key(l))
                    && upper.flatten().is_none_or(|u| actual <= self.upper_key(u))
            }
            _ => match self.exact().map(parse) {
                Some(Some(wanted)) => match self.field_type {
                    FieldType::Time => actual.time() == wanted.time(),
                    // Dates and datetimes match the whole day
                    _ => day == wanted.date(),
                },
                _ => true,
            },
        }
    }

    /// Comparison key: time of day for time fields, timestamp otherwise
    fn comparable(&self, dt: NaiveDateTime) -> NaiveDateTime {
        match self.field_type {
            FieldType::Time => NaiveDate::default().and_time(dt.time()),
            _ => dt,
        }
    }

    /// Date upper bounds include the whole day
    fn upper_key(&self, dt: NaiveDateTime) -> NaiveDateTime {
        match self.field_type {
            FieldType::Date => dt.date().and_hms_opt(23, 59, 59).unwrap_or(dt),
            _ => self.comparable(dt),
        }
    }
}

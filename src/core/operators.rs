//! Operator availability per field
//!
//! Every field type has a fixed operator list. `_present` and `_blank` are
//! appended only for fields that are not required, since a required field is
//! never absent.

use super::models::FilterableField;
use super::types::{FieldType, Operator};

const STRING_OPERATORS: [Operator; 5] = [
    Operator::Like,
    Operator::NotLike,
    Operator::Is,
    Operator::StartsWith,
    Operator::EndsWith,
];

const NUMERIC_OPERATORS: [Operator; 2] = [Operator::Default, Operator::Between];

const DATE_OPERATORS: [Operator; 6] = [
    Operator::Default,
    Operator::Between,
    Operator::Today,
    Operator::Yesterday,
    Operator::ThisWeek,
    Operator::LastWeek,
];

const TIME_OPERATORS: [Operator; 2] = [Operator::Default, Operator::Between];

const VALUE_OPERATORS: [Operator; 1] = [Operator::Is];

const PRESENCE_OPERATORS: [Operator; 2] = [Operator::Present, Operator::Blank];

/// Operators of a type before the requiredness policy is applied
pub fn type_operators(field_type: FieldType) -> &'static [Operator] {
    match field_type {
        FieldType::String | FieldType::Text | FieldType::Association => &STRING_OPERATORS,
        FieldType::Numeric => &NUMERIC_OPERATORS,
        FieldType::Date | FieldType::DateTime => &DATE_OPERATORS,
        FieldType::Time => &TIME_OPERATORS,
        FieldType::Boolean | FieldType::Enum => &VALUE_OPERATORS,
    }
}

/// Operators offered for one field
pub fn operators_for(field: &FilterableField) -> Vec<Operator> {
    let mut operators = type_operators(field.field_type).to_vec();
    if !field.required {
        operators.extend_from_slice(&PRESENCE_OPERATORS);
    }
    operators
}

/// Operator preselected on a new row, also used when a submitted row omits `o`
pub fn default_operator(field_type: FieldType) -> Operator {
    type_operators(field_type)[0]
}

/// Whether the row control shows an operator dropdown
pub fn has_operator_control(field_type: FieldType) -> bool {
    !matches!(field_type, FieldType::Boolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FieldType;

    const ALL_TYPES: [FieldType; 9] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Time,
        FieldType::Enum,
        FieldType::Numeric,
        FieldType::Association,
    ];

    #[test]
    fn required_fields_never_offer_presence_operators() {
        for field_type in ALL_TYPES {
            let field = FilterableField::new("f", field_type).required(true);
            let ops = operators_for(&field);
            assert!(!ops.contains(&Operator::Present), "{field_type}");
            assert!(!ops.contains(&Operator::Blank), "{field_type}");
        }
    }

    #[test]
    fn optional_fields_offer_presence_operators() {
        for field_type in ALL_TYPES {
            let field = FilterableField::new("f", field_type);
            let ops = operators_for(&field);
            assert!(ops.contains(&Operator::Present), "{field_type}");
            assert!(ops.contains(&Operator::Blank), "{field_type}");
        }
    }

    #[test]
    fn default_operator_is_first_of_type() {
        assert_eq!(default_operator(FieldType::String), Operator::Like);
        assert_eq!(default_operator(FieldType::Date), Operator::Default);
        assert_eq!(default_operator(FieldType::Enum), Operator::Is);
        assert!(!has_operator_control(FieldType::Boolean));
    }
}

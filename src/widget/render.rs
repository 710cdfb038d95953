//! Markup for the `#filters_box` subtree and the "Add filter" menu

use std::fmt::Write;

use crate::core::models::{EnumOption, FilterableField};
use crate::core::types::{Combinator, FieldType, Operator, SelectMode};

use super::row::FilterRow;

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn option(out: &mut String, value: &str, label: &str, selected: bool) {
    let _ = write!(
        out,
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    );
}

/// The "Add filter" dropdown, listing every configured field
pub fn render_add_filter_menu(fields: &[FilterableField]) -> String {
    let mut out = String::from(
        "<div class=\"dropdown\"><a class=\"dropdown-toggle\" href=\"#\">Add filter</a><ul class=\"dropdown-menu\" id=\"filters\">",
    );
    for field in fields {
        let _ = write!(
            out,
            "<li><a href=\"#\" data-field-name=\"{}\" data-field-type=\"{}\" data-field-required=\"{}\">{}</a></li>",
            escape_html(&field.name),
            field.field_type,
            field.required,
            escape_html(&field.display_label())
        );
    }
    out.push_str("</ul></div>");
    out
}

/// The whole filter box; an empty box renders an empty container
pub fn render_filter_box<'a>(rows: impl IntoIterator<Item = &'a FilterRow>) -> String {
    let mut out = String::from("<div id=\"filters_box\">");
    for row in rows {
        out.push_str(&render_row(row));
    }
    out.push_str("</div>");
    out
}

pub fn render_row(row: &FilterRow) -> String {
    let prefix = row.id.param_prefix();
    let mut out = String::new();
    let _ = write!(
        out,
        "<p class=\"filter form-search\" data-field-name=\"{}\" data-index=\"{}\">",
        escape_html(&row.field.name),
        row.id.index
    );
    let _ = write!(
        out,
        "<span class=\"label label-info form-label\"><button type=\"button\" class=\"delete\" data-row=\"{}\">{}</button></span>",
        escape_html(&row.id.to_string()),
        escape_html(&row.field.display_label())
    );
    if let Some(combinator) = row.combinator {
        let _ = write!(out, "<select class=\"form-control input-sm\" name=\"{}\">", escape_html(&format!("{prefix}[s]")));
        for choice in [Combinator::And, Combinator::Or] {
            option(&mut out, choice.as_str(), choice.as_str(), choice == combinator);
        }
        out.push_str("</select>");
    }
    if row.has_operator_control() {
        render_operator_select(&mut out, row, &prefix);
    }
    match row.field_type() {
        FieldType::Boolean => render_value_select(&mut out, row, false),
        FieldType::Enum => render_enum_control(&mut out, row),
        FieldType::Date | FieldType::DateTime | FieldType::Time => render_picker_inputs(&mut out, row),
        FieldType::Numeric => render_range_inputs(&mut out, row),
        FieldType::String | FieldType::Text | FieldType::Association => {
            let _ = write!(
                out,
                "<input type=\"text\" class=\"form-control input-sm\" name=\"{}\" value=\"{}\">",
                escape_html(&row.value_param_name()),
                escape_html(row.value(0).unwrap_or_default())
            );
        }
    }
    out.push_str("</p>");
    out
}

fn render_operator_select(out: &mut String, row: &FilterRow, prefix: &str) {
    let _ = write!(out, "<select class=\"form-control input-sm\" name=\"{}\">", escape_html(&format!("{prefix}[o]")));
    let mut separated = false;
    for operator in row.operator_choices() {
        if matches!(operator, Operator::Present | Operator::Blank) && !separated {
            out.push_str("<option disabled>---------</option>");
            separated = true;
        }
        option(out, operator.as_str(), operator.label(), operator == row.operator);
    }
    out.push_str("</select>");
}

fn render_value_select(out: &mut String, row: &FilterRow, multiple: bool) {
    let class = row.select_mode.css_class();
    let _ = write!(
        out,
        "<select class=\"form-control input-sm {}\" name=\"{}\"{}>",
        class,
        escape_html(&row.value_param_name()),
        if multiple { " multiple" } else { "" }
    );
    if row.field_type() == FieldType::Enum && !multiple {
        option(out, "", "...", row.value(0).is_none_or(str::is_empty));
    }
    for EnumOption { label, value } in row.value_choices() {
        let selected = row.values().iter().any(|v| *v == value);
        option(out, &value, &label, selected);
    }
    if row.field_type() == FieldType::Boolean && !row.field.required {
        out.push_str("<option disabled>---------</option>");
        for operator in [Operator::Present, Operator::Blank] {
            option(out, operator.as_str(), operator.label(), row.operator == operator);
        }
    }
    out.push_str("</select>");
}

fn render_enum_control(out: &mut String, row: &FilterRow) {
    let multiple = row.select_mode == SelectMode::Multiple;
    render_value_select(out, row, multiple);
    let (icon, title) = if multiple { ("fa-minus", "Single selection") } else { ("fa-plus", "Multiple selection") };
    let _ = write!(
        out,
        "<a href=\"#\" class=\"switch-select\" data-row=\"{}\" title=\"{}\"><i class=\"fas {}\"></i></a>",
        escape_html(&row.id.to_string()),
        title,
        icon
    );
}

/// Slots visible for the current operator: exact value, or the two bounds
fn visible_slots(row: &FilterRow) -> &'static [usize] {
    match row.operator {
        Operator::Between => &[1, 2],
        op if op.needs_value() => &[0],
        _ => &[],
    }
}

fn render_picker_inputs(out: &mut String, row: &FilterRow) {
    let class = row.field_type().picker_class().unwrap_or("datetime");
    let visible = visible_slots(row);
    for picker in row.pickers() {
        if visible.contains(&picker.slot()) {
            let _ = write!(
                out,
                "<input type=\"text\" class=\"form-control {}\" data-slot=\"{}\" value=\"{}\">",
                class,
                picker.slot(),
                escape_html(picker.display())
            );
        }
    }
    for value in row.values() {
        let _ = write!(
            out,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            escape_html(&row.value_param_name()),
            escape_html(value)
        );
    }
}

fn render_range_inputs(out: &mut String, row: &FilterRow) {
    let visible = visible_slots(row);
    for (slot, value) in row.values().iter().enumerate() {
        let input_type = if visible.contains(&slot) { "number" } else { "hidden" };
        let _ = write!(
            out,
            "<input type=\"{}\" class=\"form-control input-sm\" name=\"{}\" value=\"{}\">",
            input_type,
            escape_html(&row.value_param_name()),
            escape_html(value)
        );
    }
}

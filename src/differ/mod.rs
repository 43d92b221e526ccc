//! Field-level difference detection over matched record pairs.
//!
//! For each comparable field and each matched (old, new) pair the differ
//! applies the field's comparison rule and emits a [`FieldDiff`] when the
//! values disagree. Transforms are pure: they produce new values and never
//! write into the rows, so a row participating in several comparisons can
//! never observe an aliased mutation.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::FieldDiff;

/// Per-field comparison rules.
///
/// `prefix_fields` maps a field name to the number of leading characters to
/// strip from its NEW-side value before comparing. This handles structured
/// prefix fields: columns whose new-side representation carries a fixed-width
/// code absent on the old side (e.g. an organizational-unit code).
#[derive(Debug, Clone, Default)]
pub struct DiffRules {
    pub prefix_fields: HashMap<String, usize>,
}

impl DiffRules {
    /// Register a structured prefix field.
    pub fn with_prefix_field(mut self, field: impl Into<String>, strip: usize) -> Self {
        self.prefix_fields.insert(field.into(), strip);
        self
    }
}

/// Compare every comparable field across every matched pair.
///
/// Emits exactly one [`FieldDiff`] per (pair, field) where the transformed
/// values differ, and none where they are equal (including when both sides
/// are null). Null is a distinct value from every string, the empty string
/// included; there is no null-coalescing.
///
/// Emitted values are post-transform, matching what was actually compared.
pub fn diff_fields<'a>(
    matched: &[(Value, Value)],
    fields: impl IntoIterator<Item = &'a String>,
    name_column: &str,
    rules: &DiffRules,
) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    for field in fields {
        let strip = rules.prefix_fields.get(field).copied();

        for (old_row, new_row) in matched {
            let old_value = transform_old(old_row.get(field), strip);
            let new_value = transform_new(new_row.get(field), strip);

            if old_value != new_value {
                diffs.push(FieldDiff {
                    employee: display_name(old_row, name_column),
                    field: field.clone(),
                    old_value: to_json(old_value),
                    new_value: to_json(new_value),
                });
            }
        }
    }

    diffs
}

/// OLD-side transform: raw by default; trimmed for prefix fields.
fn transform_old(value: Option<&Value>, strip: Option<usize>) -> Option<String> {
    let text = cell_text(value)?;
    Some(match strip {
        Some(_) => text.trim().to_string(),
        None => text,
    })
}

/// NEW-side transform: raw by default; for prefix fields, drop the
/// fixed-width leading code then trim.
fn transform_new(value: Option<&Value>, strip: Option<usize>) -> Option<String> {
    let text = cell_text(value)?;
    Some(match strip {
        Some(n) => text.chars().skip(n).collect::<String>().trim().to_string(),
        None => text,
    })
}

/// Render a cell as text; `None` for null or absent cells.
fn cell_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn to_json(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

/// Display name for the report, taken untransformed from the OLD row.
fn display_name(old_row: &Value, name_column: &str) -> String {
    cell_text(old_row.get(name_column)).unwrap_or_default()
}

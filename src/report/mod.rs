//! Report assembly, filtering and delimited-text export.
//!
//! Aggregates the differ's output into a unified report with summary
//! statistics, supports post-hoc filtering by field and old value, and
//! renders reports as CSV with a UTF-8 byte-order marker so spreadsheet
//! tools open them with the right encoding.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::models::{FieldDiff, Report};

/// UTF-8 byte-order marker expected by common spreadsheet tools.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// =============================================================================
// Assembly
// =============================================================================

/// Aggregate field differences into a [`Report`].
///
/// Row order is the differ's field-iteration order. `changed_count` is the
/// number of distinct employee display names across all differences;
/// `per_field_counts` counts differences per field in first-seen order.
pub fn assemble(diffs: Vec<FieldDiff>) -> Report {
    let changed_names: BTreeSet<&str> = diffs.iter().map(|d| d.employee.as_str()).collect();
    let changed_count = changed_names.len();

    let mut per_field_counts: Vec<(String, usize)> = Vec::new();
    for diff in &diffs {
        match per_field_counts.iter_mut().find(|(f, _)| f == &diff.field) {
            Some((_, count)) => *count += 1,
            None => per_field_counts.push((diff.field.clone(), 1)),
        }
    }

    Report {
        rows: diffs,
        changed_count,
        per_field_counts,
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Value selection for [`filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueFilter {
    /// Sentinel: keep every row for the chosen field.
    All,
    /// Keep rows whose old value equals this string exactly.
    OldValue(String),
}

/// Field-equality filter over report rows.
///
/// Selects rows for one field; `ValueFilter::All` keeps them all,
/// `ValueFilter::OldValue` additionally requires an exact old-value string
/// match. Null old values never match a value filter.
pub fn filter<'a>(report: &'a Report, field: &str, value: &ValueFilter) -> Vec<&'a FieldDiff> {
    report
        .rows
        .iter()
        .filter(|d| d.field == field)
        .filter(|d| match value {
            ValueFilter::All => true,
            ValueFilter::OldValue(wanted) => d.old_value.as_str() == Some(wanted.as_str()),
        })
        .collect()
}

/// Sorted distinct non-null old values for one field, for populating a
/// value selector next to the [`ValueFilter::All`] sentinel.
pub fn distinct_old_values(report: &Report, field: &str) -> Vec<String> {
    let values: BTreeSet<String> = report
        .rows
        .iter()
        .filter(|d| d.field == field)
        .filter_map(|d| d.old_value.as_str().map(String::from))
        .collect();
    values.into_iter().collect()
}

// =============================================================================
// CSV export (UTF-8 with BOM)
// =============================================================================

/// Export a full report as CSV bytes, UTF-8 with BOM.
pub fn to_csv_bom(report: &Report) -> Result<Vec<u8>, csv::Error> {
    let refs: Vec<&FieldDiff> = report.rows.iter().collect();
    diffs_to_csv_bom(&refs)
}

/// Export a (possibly filtered) set of difference rows as CSV bytes.
pub fn diffs_to_csv_bom(rows: &[&FieldDiff]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(["employee", "field", "old_value", "new_value"])?;

    for diff in rows {
        let old_value = cell_to_string(&diff.old_value);
        let new_value = cell_to_string(&diff.new_value);
        writer.write_record([
            diff.employee.as_str(),
            diff.field.as_str(),
            old_value.as_str(),
            new_value.as_str(),
        ])?;
    }

    finish(writer)
}

/// Export full rows (e.g. the old-only subset) as CSV bytes, using the
/// dataset's native column order.
pub fn rows_to_csv_bom(headers: &[String], rows: &[Value]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(headers)?;

    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| cell_to_string(row.get(h).unwrap_or(&Value::Null)))
            .collect();
        writer.write_record(&record)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Render a cell for delimited output; null becomes the empty string.
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(employee: &str, field: &str, old: Value, new: Value) -> FieldDiff {
        FieldDiff {
            employee: employee.into(),
            field: field.into(),
            old_value: old,
            new_value: new,
        }
    }

    #[test]
    fn test_changed_count_is_distinct_employees() {
        let report = assemble(vec![
            diff("أحمد", "القسم", json!("A"), json!("B")),
            diff("أحمد", "الراتب", json!("100"), json!("200")),
            diff("سارة", "القسم", json!("X"), json!("Y")),
        ]);
        assert_eq!(report.changed_count, 2);
        assert_eq!(report.rows.len(), 3);
    }

    #[test]
    fn test_per_field_counts() {
        let report = assemble(vec![
            diff("a", "القسم", json!("A"), json!("B")),
            diff("b", "القسم", json!("C"), json!("D")),
            diff("a", "الراتب", json!("1"), json!("2")),
        ]);
        assert_eq!(
            report.per_field_counts,
            vec![("القسم".to_string(), 2), ("الراتب".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_report() {
        let report = assemble(vec![]);
        assert!(report.is_empty());
        assert_eq!(report.changed_count, 0);
        assert!(report.per_field_counts.is_empty());
    }

    #[test]
    fn test_filter_all_sentinel_equals_unfiltered_field_rows() {
        let report = assemble(vec![
            diff("a", "القسم", json!("A"), json!("B")),
            diff("b", "القسم", json!("C"), json!("D")),
            diff("a", "الراتب", json!("1"), json!("2")),
        ]);

        let all = filter(&report, "القسم", &ValueFilter::All);
        let unfiltered: Vec<&FieldDiff> =
            report.rows.iter().filter(|d| d.field == "القسم").collect();
        assert_eq!(all, unfiltered);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_filter_by_old_value() {
        let report = assemble(vec![
            diff("a", "القسم", json!("A"), json!("B")),
            diff("b", "القسم", json!("C"), json!("D")),
        ]);

        let rows = filter(&report, "القسم", &ValueFilter::OldValue("A".into()));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee, "a");
    }

    #[test]
    fn test_filter_null_old_value_never_matches_value() {
        let report = assemble(vec![diff("a", "القسم", Value::Null, json!("B"))]);
        let rows = filter(&report, "القسم", &ValueFilter::OldValue("".into()));
        assert!(rows.is_empty());
        // But the ALL sentinel still returns it.
        assert_eq!(filter(&report, "القسم", &ValueFilter::All).len(), 1);
    }

    #[test]
    fn test_distinct_old_values_sorted_non_null() {
        let report = assemble(vec![
            diff("a", "f", json!("B"), json!("x")),
            diff("b", "f", json!("A"), json!("y")),
            diff("c", "f", json!("B"), json!("z")),
            diff("d", "f", Value::Null, json!("w")),
        ]);
        assert_eq!(distinct_old_values(&report, "f"), vec!["A", "B"]);
    }

    #[test]
    fn test_csv_export_starts_with_bom() {
        let report = assemble(vec![diff("أحمد", "القسم", json!("A"), json!("B"))]);
        let bytes = to_csv_bom(&report).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("employee,field,old_value,new_value"));
        assert!(text.contains("أحمد"));
    }

    #[test]
    fn test_rows_export_preserves_column_order() {
        let headers = vec!["b".to_string(), "a".to_string()];
        let rows = vec![json!({"a": "1", "b": "2"}), json!({"b": "3"})];

        let bytes = rows_to_csv_bom(&headers, &rows).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("b,a"));
        assert_eq!(lines.next(), Some("2,1"));
        // Missing cell renders empty.
        assert_eq!(lines.next(), Some("3,"));
    }
}

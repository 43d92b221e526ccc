//! Domain models for the staffdiff comparison pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Dataset`] - one loaded employee-records snapshot
//! - [`MatchPartition`] - outer-join result of the OLD and NEW snapshots
//! - [`FieldDiff`] - one detected change in one field for one matched employee
//! - [`Report`] - the assembled difference report with summary aggregates

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved column name for the normalized matching key.
///
/// Inputs sometimes carry this column over from a previous export, so the
/// column resolver always excludes it from the comparable field set.
pub const NORMALIZED_KEY_COLUMN: &str = "normalized_name";

// =============================================================================
// Dataset
// =============================================================================

/// One loaded snapshot of the employee-records table.
///
/// Rows are JSON objects keyed by column header; all cell values are strings
/// as loaded, or null where a source cell was genuinely absent. A dataset is
/// immutable once loaded: the engine never writes into its rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column headers in native file order.
    pub headers: Vec<String>,
    /// Records, one JSON object per row.
    pub rows: Vec<Value>,
    /// Detected or assumed encoding of the source file.
    pub encoding: String,
    /// Detected or assumed delimiter of the source file.
    pub delimiter: char,
}

impl Dataset {
    /// Build a dataset from in-memory rows (encoding/delimiter default to
    /// UTF-8 and comma).
    pub fn new(headers: Vec<String>, rows: Vec<Value>) -> Self {
        Self {
            headers,
            rows,
            encoding: "utf-8".to_string(),
            delimiter: ',',
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// =============================================================================
// Match Partition
// =============================================================================

/// Result of joining OLD and NEW on normalized name key.
///
/// The partitions are exhaustive and disjoint: every OLD row lands in exactly
/// one of {matched, old_only}, every NEW row in exactly one of
/// {matched, new_only}. A key with multiple rows on either side produces the
/// full old x new cross-product of pairs; such keys are listed in
/// `duplicate_keys` so callers can warn about potentially spurious pairs.
#[derive(Debug, Clone, Default)]
pub struct MatchPartition {
    /// (old_row, new_row) pairs sharing a normalized key.
    pub matched: Vec<(Value, Value)>,
    /// OLD rows whose key has no counterpart in NEW (removed employees).
    pub old_only: Vec<Value>,
    /// NEW rows whose key has no counterpart in OLD (added employees).
    pub new_only: Vec<Value>,
    /// Normalized keys that matched with more than one row on a side.
    pub duplicate_keys: Vec<String>,
}

// =============================================================================
// Field Difference
// =============================================================================

/// A single detected change in one field's value for one matched employee.
///
/// Values are post-transform: for structured prefix fields the stripped and
/// trimmed strings are recorded, matching what was actually compared.
/// Null means the cell was absent on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    /// Employee display name, taken from the OLD row's name column.
    pub employee: String,
    /// Column the change was detected in.
    pub field: String,
    /// Value on the OLD side (null when absent).
    pub old_value: Value,
    /// Value on the NEW side (null when absent).
    pub new_value: Value,
}

// =============================================================================
// Report
// =============================================================================

/// The assembled difference report.
///
/// Rebuilt fresh on every run; never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// All field differences, in field-iteration order.
    pub rows: Vec<FieldDiff>,
    /// Count of distinct employees with at least one difference.
    pub changed_count: usize,
    /// Per-field difference counts in first-seen order, chart-ready.
    pub per_field_counts: Vec<(String, usize)>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_new_defaults() {
        let ds = Dataset::new(vec!["a".into()], vec![json!({"a": "1"})]);
        assert_eq!(ds.encoding, "utf-8");
        assert_eq!(ds.delimiter, ',');
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn test_field_diff_camel_case_serialization() {
        let diff = FieldDiff {
            employee: "أحمد".into(),
            field: "dept".into(),
            old_value: json!("A"),
            new_value: json!("B"),
        };
        let v = serde_json::to_value(&diff).unwrap();
        assert_eq!(v["employee"], "أحمد");
        assert_eq!(v["oldValue"], "A");
        assert_eq!(v["newValue"], "B");
    }

    #[test]
    fn test_empty_report_is_normal() {
        let report = Report::default();
        assert!(report.is_empty());
        assert_eq!(report.changed_count, 0);
    }
}

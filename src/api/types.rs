//! REST API types for the presentation layer.
//!
//! The response carries everything the frontend tabs need in one payload:
//! the difference table, the summary count, per-field counts for the bar
//! chart, and the removed/added row subsets.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::{CompareResult, DatasetInfo};
use crate::models::FieldDiff;

/// Response sent after both snapshots were uploaded and compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// Status: "ok", or "warning" when duplicated name keys were found.
    pub status: String,

    /// RFC 3339 timestamp of this run.
    pub generated_at: String,

    /// The difference table (employee / field / old / new).
    pub differences: Vec<FieldDiff>,

    /// Count of distinct employees with at least one difference.
    pub changed_count: usize,

    /// Per-field difference counts, chart-ready.
    pub per_field_counts: Vec<FieldCount>,

    /// Full OLD rows missing from the new snapshot.
    pub removed: Vec<Value>,

    /// Full NEW rows missing from the old snapshot.
    pub added: Vec<Value>,

    /// Normalized keys that produced cross-product pairs.
    pub duplicate_keys: Vec<String>,

    /// Metadata about both inputs.
    pub metadata: ResponseMetadata,
}

/// One bar of the per-field change chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCount {
    pub field: String,
    pub count: usize,
}

/// Metadata about the two compared inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub old: FileMetadata,
    pub new: FileMetadata,
}

/// Parsing metadata for one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<DatasetInfo> for FileMetadata {
    fn from(info: DatasetInfo) -> Self {
        Self {
            encoding: info.encoding,
            delimiter: info.delimiter.to_string(),
            row_count: info.row_count,
            columns: info.headers,
        }
    }
}

impl From<CompareResult> for CompareResponse {
    fn from(result: CompareResult) -> Self {
        let status = if result.duplicate_keys.is_empty() {
            "ok"
        } else {
            "warning"
        };

        CompareResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            changed_count: result.report.changed_count,
            per_field_counts: result
                .report
                .per_field_counts
                .iter()
                .map(|(field, count)| FieldCount {
                    field: field.clone(),
                    count: *count,
                })
                .collect(),
            differences: result.report.rows,
            removed: result.old_only,
            added: result.new_only,
            duplicate_keys: result.duplicate_keys,
            metadata: ResponseMetadata {
                old: result.old_info.into(),
                new: result.new_info.into(),
            },
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "differences": [],
        "changedCount": 0,
        "removed": [],
        "added": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compare_datasets, CompareOptions};
    use crate::models::Dataset;
    use serde_json::json;

    const NAME: &str = "اسم الموظف";

    #[test]
    fn test_response_from_compare_result() {
        let old = Dataset::new(
            vec![NAME.into(), "القسم".into()],
            vec![json!({NAME: "أحمد", "القسم": "A"})],
        );
        let new = Dataset::new(
            vec![NAME.into(), "القسم".into()],
            vec![json!({NAME: "احمد", "القسم": "B"})],
        );

        let result = compare_datasets(&old, &new, &CompareOptions::default()).unwrap();
        let response = CompareResponse::from(result);

        assert_eq!(response.status, "ok");
        assert_eq!(response.changed_count, 1);
        assert_eq!(response.differences.len(), 1);
        assert_eq!(response.per_field_counts.len(), 1);
        assert_eq!(response.per_field_counts[0].field, "القسم");
        assert_eq!(response.per_field_counts[0].count, 1);
        assert!(response.removed.is_empty());

        let v = serde_json::to_value(&response).unwrap();
        assert!(v["jobId"].is_string());
        assert!(v["generatedAt"].is_string());
        assert_eq!(v["changedCount"], 1);
    }

    #[test]
    fn test_error_response_shape() {
        let v = error_response("No employee-name column found");
        assert_eq!(v["status"], "error");
        assert!(v["error"].as_str().unwrap().contains("employee-name"));
        assert_eq!(v["changedCount"], 0);
    }
}

//! High-level comparison pipeline.
//!
//! Combines the column resolver, record matcher, field differ and report
//! assembler into single entry points over two loaded datasets, raw bytes or
//! file paths. One run is a single-pass, stateless, synchronous computation:
//! it either completes with a [`CompareResult`] or fails fast when no
//! employee-name column can be resolved.
//!
//! # Example
//!
//! ```rust,ignore
//! use staffdiff::{compare_files, CompareOptions};
//!
//! let result = compare_files("old.csv", "new.csv", &CompareOptions::default())?;
//! println!("{} employees changed", result.report.changed_count);
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::differ::{diff_fields, DiffRules};
use crate::error::{EngineError, PipelineResult};
use crate::loader::{load_bytes, load_file};
use crate::matcher::match_records;
use crate::models::{Dataset, Report};
use crate::report::assemble;
use crate::schema::{comparable_fields, resolve_name_column};

// =============================================================================
// Options
// =============================================================================

/// Configuration for one comparison run.
///
/// Defaults reproduce the production HR export conventions: an Arabic
/// employee-name header, a hire-date column excluded from comparison (its
/// representation differs between the sources without being a real change),
/// and the organizational-unit column carrying a 3-character prefix code on
/// the new side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Substrings a header must all contain to qualify as the name column.
    pub name_tokens: Vec<String>,

    /// Headers containing any of these substrings are never compared.
    pub excluded_substrings: Vec<String>,

    /// Structured prefix fields: field name -> leading chars to strip from
    /// the NEW side before comparing.
    pub prefix_fields: HashMap<String, usize>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            name_tokens: vec!["اسم".to_string(), "الموظف".to_string()],
            excluded_substrings: vec!["تاريخ التعيين".to_string()],
            prefix_fields: HashMap::from([("الوحدة التنظيمية".to_string(), 3)]),
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// Parsing metadata for one input dataset, reported to the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl DatasetInfo {
    fn of(dataset: &Dataset) -> Self {
        Self {
            encoding: dataset.encoding.clone(),
            delimiter: dataset.delimiter,
            headers: dataset.headers.clone(),
            row_count: dataset.row_count(),
        }
    }
}

/// Result of a complete comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    /// The assembled difference report.
    pub report: Report,

    /// Full OLD rows missing from the new snapshot (removed employees).
    pub old_only: Vec<Value>,

    /// Full NEW rows missing from the old snapshot (added employees).
    pub new_only: Vec<Value>,

    /// Normalized keys that matched more than one row on a side; their
    /// matched pairs are a cross-product and may contain spurious rows.
    pub duplicate_keys: Vec<String>,

    /// OLD input metadata.
    pub old_info: DatasetInfo,

    /// NEW input metadata.
    pub new_info: DatasetInfo,
}

// =============================================================================
// Entry points
// =============================================================================

/// Compare two loaded datasets.
///
/// Resolves the name column and comparable fields, joins on normalized name,
/// diffs every comparable field over the matched pairs and assembles the
/// report. Fails with [`EngineError::NameColumnNotFound`] (wrapped) when
/// either snapshot lacks a name column; no partial report is produced.
pub fn compare_datasets(
    old: &Dataset,
    new: &Dataset,
    options: &CompareOptions,
) -> PipelineResult<CompareResult> {
    let name_column = resolve_name_column(&old.headers, &options.name_tokens)?;
    if !new.headers.iter().any(|h| h == name_column) {
        // The identity column must exist on both sides to join on.
        return Err(EngineError::NameColumnNotFound {
            tokens: options.name_tokens.clone(),
        }
        .into());
    }
    log_success(format!("Name column: {}", name_column));

    let fields = comparable_fields(
        &old.headers,
        &new.headers,
        name_column,
        &options.excluded_substrings,
    );
    log_info(format!("{} comparable fields", fields.len()));

    log_info("Matching records on normalized name...");
    let partition = match_records(old, new, name_column);
    log_success(format!(
        "{} matched pairs, {} removed, {} added",
        partition.matched.len(),
        partition.old_only.len(),
        partition.new_only.len()
    ));
    if !partition.duplicate_keys.is_empty() {
        log_warning(format!(
            "{} duplicated name keys produce cross-product pairs: {}",
            partition.duplicate_keys.len(),
            partition.duplicate_keys.join(", ")
        ));
    }

    log_info("Diffing fields over matched pairs...");
    let rules = DiffRules {
        prefix_fields: options.prefix_fields.clone(),
    };
    let diffs = diff_fields(&partition.matched, fields.iter(), name_column, &rules);

    let report = assemble(diffs);
    if report.is_empty() {
        log_success("No differences found");
    } else {
        log_success(format!(
            "{} differences across {} employees",
            report.rows.len(),
            report.changed_count
        ));
    }

    Ok(CompareResult {
        report,
        old_only: partition.old_only,
        new_only: partition.new_only,
        duplicate_keys: partition.duplicate_keys,
        old_info: DatasetInfo::of(old),
        new_info: DatasetInfo::of(new),
    })
}

/// Load both snapshots from files, then compare.
pub fn compare_files<P: AsRef<Path>>(
    old_path: P,
    new_path: P,
    options: &CompareOptions,
) -> PipelineResult<CompareResult> {
    log_info("Loading OLD snapshot...");
    let old = load_file(old_path)?;
    log_success(format!(
        "{} rows ({}, '{}')",
        old.row_count(),
        old.encoding,
        old.delimiter
    ));

    log_info("Loading NEW snapshot...");
    let new = load_file(new_path)?;
    log_success(format!(
        "{} rows ({}, '{}')",
        new.row_count(),
        new.encoding,
        new.delimiter
    ));

    compare_datasets(&old, &new, options)
}

/// Load both snapshots from raw bytes (e.g. an HTTP upload), then compare.
pub fn compare_bytes(
    old_bytes: &[u8],
    new_bytes: &[u8],
    options: &CompareOptions,
) -> PipelineResult<CompareResult> {
    let old = load_bytes(old_bytes)?;
    let new = load_bytes(new_bytes)?;
    compare_datasets(&old, &new, options)
}

//! # Staffdiff - employee-records reconciliation
//!
//! Staffdiff compares two snapshots of an employee-records export (OLD and
//! NEW), matches records despite inconsistent Arabic name orthography, and
//! reports field-level differences plus added/removed employees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌───────────┐    ┌───────────┐    ┌──────────┐
//! │ OLD / NEW   │───▶│ Column       │───▶│ Record    │───▶│ Field     │───▶│ Report   │
//! │ CSV files   │    │ Resolver     │    │ Matcher   │    │ Differ    │    │ Assembler│
//! │ (auto-enc)  │    │ (name+fields)│    │ (join)    │    │ (rules)   │    │ (counts) │
//! └─────────────┘    └──────────────┘    └───────────┘    └───────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use staffdiff::{compare_files, CompareOptions};
//!
//! let result = compare_files("old.csv", "new.csv", &CompareOptions::default()).unwrap();
//! println!("{} employees changed", result.report.changed_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - hierarchical error types
//! - [`models`] - domain models (Dataset, MatchPartition, FieldDiff, Report)
//! - [`loader`] - delimited-text loading with auto-detection
//! - [`normalize`] - name normalization for matching
//! - [`schema`] - column resolution
//! - [`matcher`] - outer join on normalized name
//! - [`differ`] - field-level difference detection
//! - [`report`] - report assembly, filtering and CSV export
//! - [`engine`] - pipeline orchestration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod loader;

// Comparison engine
pub mod differ;
pub mod matcher;
pub mod normalize;
pub mod schema;

// Reporting
pub mod report;

// Orchestration
pub mod engine;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EngineError, EngineResult, LoadError, LoadResult, PipelineError, PipelineResult, ServerError,
    ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Dataset, FieldDiff, MatchPartition, Report, NORMALIZED_KEY_COLUMN};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{decode_content, detect_delimiter, detect_encoding, load_bytes, load_file};

// =============================================================================
// Re-exports - Engine components
// =============================================================================

pub use differ::{diff_fields, DiffRules};
pub use matcher::match_records;
pub use normalize::normalize_name;
pub use schema::{comparable_fields, resolve_name_column};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{
    assemble, diffs_to_csv_bom, distinct_old_values, filter, rows_to_csv_bom, to_csv_bom,
    ValueFilter,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use engine::{
    compare_bytes, compare_datasets, compare_files, CompareOptions, CompareResult, DatasetInfo,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CompareResponse, FieldCount};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}

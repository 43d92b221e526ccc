//! Column resolution: locate the identity column and the comparable field set.
//!
//! This is a lightweight schema-inference step over the header strings of the
//! two snapshots. Token predicates and exclusion substrings are injected by
//! the caller (see [`crate::engine::CompareOptions`]) rather than hard-coded,
//! so the resolver is unit-testable independent of any UI or locale.

use std::collections::BTreeSet;

use crate::error::{EngineError, EngineResult};
use crate::models::NORMALIZED_KEY_COLUMN;

/// Find the employee-name column among `headers`.
///
/// Returns the first header (in native column order) containing every token
/// as a substring. With the default tokens that means a header mentioning
/// both "name" and "employee" in the dataset's language.
///
/// Fails with [`EngineError::NameColumnNotFound`] when no header qualifies;
/// without an identity column no comparison can proceed.
pub fn resolve_name_column<'a>(headers: &'a [String], tokens: &[String]) -> EngineResult<&'a str> {
    headers
        .iter()
        .find(|h| tokens.iter().all(|t| h.contains(t.as_str())))
        .map(String::as_str)
        .ok_or_else(|| EngineError::NameColumnNotFound {
            tokens: tokens.to_vec(),
        })
}

/// Compute the set of fields eligible for comparison.
///
/// Takes the intersection of both header sets, then removes the name column,
/// the reserved normalized-key column, and any header containing one of the
/// configured excluded substrings (fields whose representation differs
/// between the sources in ways that are not true data changes, e.g. hire
/// dates). The result is a set: iteration order carries no meaning beyond
/// being deterministic.
pub fn comparable_fields(
    old_headers: &[String],
    new_headers: &[String],
    name_column: &str,
    excluded_substrings: &[String],
) -> BTreeSet<String> {
    let new_set: BTreeSet<&str> = new_headers.iter().map(String::as_str).collect();

    old_headers
        .iter()
        .filter(|h| new_set.contains(h.as_str()))
        .filter(|h| h.as_str() != name_column && h.as_str() != NORMALIZED_KEY_COLUMN)
        .filter(|h| !excluded_substrings.iter().any(|ex| h.contains(ex.as_str())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_name_column_arabic() {
        let cols = headers(&["الرقم", "اسم الموظف", "الوظيفة"]);
        let found = resolve_name_column(&cols, &tokens(&["اسم", "الموظف"])).unwrap();
        assert_eq!(found, "اسم الموظف");
    }

    #[test]
    fn test_resolve_name_column_first_match_wins() {
        let cols = headers(&["employee name (ar)", "employee name (en)"]);
        let found = resolve_name_column(&cols, &tokens(&["name", "employee"])).unwrap();
        assert_eq!(found, "employee name (ar)");
    }

    #[test]
    fn test_resolve_name_column_substring_not_exact() {
        let cols = headers(&["full employee name"]);
        assert!(resolve_name_column(&cols, &tokens(&["name", "employee"])).is_ok());
    }

    #[test]
    fn test_resolve_name_column_missing_is_fatal() {
        let cols = headers(&["id", "department"]);
        let err = resolve_name_column(&cols, &tokens(&["name", "employee"])).unwrap_err();
        assert!(err.to_string().contains("employee"));
    }

    #[test]
    fn test_comparable_fields_intersection() {
        let old = headers(&["اسم الموظف", "القسم", "الراتب", "قديم فقط"]);
        let new = headers(&["اسم الموظف", "القسم", "الراتب", "جديد فقط"]);
        let fields = comparable_fields(&old, &new, "اسم الموظف", &[]);
        assert_eq!(fields, ["القسم", "الراتب"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_comparable_fields_excludes_key_column() {
        let old = headers(&["اسم الموظف", NORMALIZED_KEY_COLUMN, "القسم"]);
        let new = old.clone();
        let fields = comparable_fields(&old, &new, "اسم الموظف", &[]);
        assert!(!fields.contains(NORMALIZED_KEY_COLUMN));
        assert!(fields.contains("القسم"));
    }

    #[test]
    fn test_comparable_fields_excluded_substring() {
        let old = headers(&["اسم الموظف", "تاريخ التعيين الفعلي", "القسم"]);
        let new = old.clone();
        let fields = comparable_fields(&old, &new, "اسم الموظف", &tokens(&["تاريخ التعيين"]));
        assert!(!fields.iter().any(|f| f.contains("تاريخ التعيين")));
        assert!(fields.contains("القسم"));
    }
}

//! Record matching: full outer join of the two snapshots on normalized name.
//!
//! Keys are computed on the fly from the resolved name column via
//! [`crate::normalize::normalize_name`]; rows are never mutated and no key
//! column is written back into the datasets. Matching is exact over
//! normalized keys; all fuzziness lives in the normalizer.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{Dataset, MatchPartition};
use crate::normalize::normalize_name;

/// Join OLD and NEW on normalized name key.
///
/// Every OLD row lands in exactly one of {matched, old_only}, every NEW row
/// in exactly one of {matched, new_only}. When a key maps to multiple rows
/// on either side, every old x new combination for that key is produced
/// (outer-join cross-product semantics, not deduplicated); the affected keys
/// are reported in [`MatchPartition::duplicate_keys`].
pub fn match_records(old: &Dataset, new: &Dataset, name_column: &str) -> MatchPartition {
    let old_keys = row_keys(&old.rows, name_column);
    let new_keys = row_keys(&new.rows, name_column);

    // Multimap of key -> NEW row indices, preserving row order.
    let mut new_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, key) in new_keys.iter().enumerate() {
        new_by_key.entry(key.as_str()).or_default().push(idx);
    }

    let mut old_count_by_key: HashMap<&str, usize> = HashMap::new();
    for key in &old_keys {
        *old_count_by_key.entry(key.as_str()).or_default() += 1;
    }

    let mut partition = MatchPartition::default();

    for (old_idx, key) in old_keys.iter().enumerate() {
        match new_by_key.get(key.as_str()) {
            Some(new_indices) => {
                for &new_idx in new_indices {
                    partition
                        .matched
                        .push((old.rows[old_idx].clone(), new.rows[new_idx].clone()));
                }
            }
            None => partition.old_only.push(old.rows[old_idx].clone()),
        }
    }

    for (new_idx, key) in new_keys.iter().enumerate() {
        if !old_count_by_key.contains_key(key.as_str()) {
            partition.new_only.push(new.rows[new_idx].clone());
        }
    }

    // Keys that matched with more than one row on a side produce spurious
    // cross-product pairs; surface them for the caller to warn about.
    let mut duplicates: Vec<String> = old_count_by_key
        .iter()
        .filter(|(key, &old_count)| {
            let new_count = new_by_key.get(*key).map_or(0, Vec::len);
            new_count > 0 && (old_count > 1 || new_count > 1)
        })
        .map(|(key, _)| key.to_string())
        .collect();
    duplicates.sort();
    partition.duplicate_keys = duplicates;

    partition
}

/// Normalized key for each row, aligned with row order.
fn row_keys(rows: &[Value], name_column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| normalize_name(row.get(name_column).unwrap_or(&Value::Null)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NAME: &str = "اسم الموظف";

    fn dataset(rows: Vec<Value>) -> Dataset {
        Dataset::new(vec![NAME.to_string(), "القسم".to_string()], rows)
    }

    #[test]
    fn test_orthographic_variants_match() {
        let old = dataset(vec![json!({NAME: "أحمد", "القسم": "A"})]);
        let new = dataset(vec![json!({NAME: "احمد", "القسم": "B"})]);

        let p = match_records(&old, &new, NAME);
        assert_eq!(p.matched.len(), 1);
        assert!(p.old_only.is_empty());
        assert!(p.new_only.is_empty());
    }

    #[test]
    fn test_old_only_and_new_only() {
        let old = dataset(vec![
            json!({NAME: "سارة", "القسم": "X"}),
            json!({NAME: "علي", "القسم": "Y"}),
        ]);
        let new = dataset(vec![
            json!({NAME: "علي", "القسم": "Y"}),
            json!({NAME: "منى", "القسم": "Z"}),
        ]);

        let p = match_records(&old, &new, NAME);
        assert_eq!(p.matched.len(), 1);
        assert_eq!(p.old_only.len(), 1);
        assert_eq!(p.old_only[0][NAME], "سارة");
        assert_eq!(p.new_only.len(), 1);
        assert_eq!(p.new_only[0][NAME], "منى");
    }

    #[test]
    fn test_empty_new_dataset() {
        let old = dataset(vec![json!({NAME: "سارة", "القسم": "X"})]);
        let new = dataset(vec![]);

        let p = match_records(&old, &new, NAME);
        assert!(p.matched.is_empty());
        assert_eq!(p.old_only.len(), 1);
        assert!(p.new_only.is_empty());
    }

    #[test]
    fn test_partitions_exhaustive_and_disjoint() {
        let old = dataset(vec![
            json!({NAME: "a"}),
            json!({NAME: "b"}),
            json!({NAME: "c"}),
        ]);
        let new = dataset(vec![json!({NAME: "b"}), json!({NAME: "d"})]);

        let p = match_records(&old, &new, NAME);
        // Every OLD row in exactly one of {matched, old_only}.
        assert_eq!(p.matched.len() + p.old_only.len(), 3);
        // Every NEW row in exactly one of {matched, new_only}.
        assert_eq!(p.matched.len() + p.new_only.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_cross_product() {
        let old = dataset(vec![
            json!({NAME: "علي", "القسم": "A"}),
            json!({NAME: "علي", "القسم": "B"}),
        ]);
        let new = dataset(vec![
            json!({NAME: "علي", "القسم": "C"}),
            json!({NAME: "علي", "القسم": "D"}),
        ]);

        let p = match_records(&old, &new, NAME);
        assert_eq!(p.matched.len(), 4);
        assert_eq!(p.duplicate_keys, vec!["علي".to_string()]);
    }

    #[test]
    fn test_empty_keys_match_each_other() {
        let old = dataset(vec![json!({NAME: "  ", "القسم": "A"})]);
        let new = dataset(vec![json!({NAME: null, "القسم": "B"})]);

        let p = match_records(&old, &new, NAME);
        assert_eq!(p.matched.len(), 1);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let old = dataset(vec![json!({NAME: "أحمد"})]);
        let new = dataset(vec![json!({NAME: "احمد"})]);
        let old_before = old.rows.clone();

        let _ = match_records(&old, &new, NAME);
        assert_eq!(old.rows, old_before);
        assert!(old.rows[0].get("normalized_name").is_none());
    }
}

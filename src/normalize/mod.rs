//! Name normalization for cross-snapshot matching.
//!
//! Employee names arrive with inconsistent Arabic orthography between exports
//! (hamza-carrying alef forms, ta marbuta vs ha, alef maksura vs ya). The
//! normalizer collapses those variants to one canonical form so that the
//! matcher can join on an exact string key. Normalized keys are used only for
//! matching and never displayed.

use serde_json::Value;

/// Normalize a name value into a canonical matching key.
///
/// Null and missing values normalize to the empty string; the function is
/// total and never fails. Otherwise the value is rendered as a string,
/// trimmed, character-folded and lowercased. Pure: no I/O, no side effects,
/// and idempotent (`normalize_name` of its own output is a fixed point).
///
/// Whitespace-only input normalizes to the empty string. Empty keys from
/// different source rows will match each other; that is accepted matcher
/// behavior, not a bug.
pub fn normalize_name(value: &Value) -> String {
    let raw = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    raw.trim().chars().map(fold_char).collect::<String>().to_lowercase()
}

/// Collapse visually/linguistically equivalent Arabic letter variants.
///
/// All alef forms fold to bare alef, ta marbuta to ha, alef maksura to ya.
fn fold_char(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' => 'ا',
        'ة' => 'ه',
        'ى' => 'ي',
        _ => c,
    }
}

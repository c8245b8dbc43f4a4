//! Digit-key array normalization.
//!
//! Unflattening `layers.0.weight` style keys produces maps keyed `"0"`,
//! `"1"`, … where the source model had ordered submodule lists. Normalizing
//! rewrites every all-digit-keyed map into a positional array, in ascending
//! numeric key order. Sparse or non-zero-based key sets compact silently;
//! the original keys are discarded.

use crate::value::TreeValue;

/// Rewrite all-digit-keyed maps into arrays, recursively.
///
/// A pure structural rewrite: leaf numeric content is never inspected or
/// altered, and normalizing an already-normalized tree is a no-op.
pub fn normalize(node: TreeValue) -> TreeValue {
    match node {
        TreeValue::Map(entries) => {
            let keys: Option<Vec<u128>> = entries.iter().map(|(k, _)| digit_key(k)).collect();
            match keys {
                Some(keys) => {
                    let mut ordered: Vec<(u128, TreeValue)> = keys
                        .into_iter()
                        .zip(entries.into_iter().map(|(_, v)| v))
                        .collect();
                    ordered.sort_by_key(|(n, _)| *n);
                    TreeValue::Array(ordered.into_iter().map(|(_, v)| normalize(v)).collect())
                }
                None => TreeValue::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, normalize(v)))
                        .collect(),
                ),
            }
        }
        TreeValue::Array(items) => TreeValue::Array(items.into_iter().map(normalize).collect()),
        leaf => leaf,
    }
}

/// Inverse rewrite: arrays that contain maps become digit-keyed maps.
///
/// Leaf lists (arrays with no map anywhere below) are left alone so tensor
/// payloads survive; only structural arrays convert. Enables flattening a
/// normalized tree back to dotted keys.
pub fn denormalize(node: TreeValue) -> TreeValue {
    match node {
        TreeValue::Map(entries) => TreeValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, denormalize(v)))
                .collect(),
        ),
        TreeValue::Array(items) => {
            if items.iter().any(contains_map) {
                TreeValue::Map(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), denormalize(v)))
                        .collect(),
                )
            } else {
                TreeValue::Array(items)
            }
        }
        leaf => leaf,
    }
}

/// Parse a key as a non-negative decimal integer, or None if it isn't one.
///
/// Keys of 39+ digits overflow u128 and count as non-digit, leaving the
/// map un-normalized; no real submodule index comes anywhere near that.
fn digit_key(key: &str) -> Option<u128> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn contains_map(node: &TreeValue) -> bool {
    match node {
        TreeValue::Map(_) => true,
        TreeValue::Array(items) => items.iter().any(contains_map),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TreeValue {
        TreeValue::from_json(&serde_json::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn digit_keyed_map_becomes_array() {
        let tree = normalize(parse(r#"{"0": {"x": 1}, "1": {"x": 2}}"#));
        assert_eq!(tree, parse(r#"[{"x": 1}, {"x": 2}]"#));
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let tree = normalize(parse(r#"{"10": 10, "2": 2, "0": 0}"#));
        assert_eq!(tree, parse("[0, 2, 10]"));
    }

    #[test]
    fn sparse_keys_compact() {
        let tree = normalize(parse(r#"{"0": 1, "2": 2, "5": 3}"#));
        assert_eq!(tree, parse("[1, 2, 3]"));
    }

    #[test]
    fn mixed_keys_are_left_as_map() {
        let tree = normalize(parse(r#"{"0": 1, "weight": 2}"#));
        assert_eq!(tree, parse(r#"{"0": 1, "weight": 2}"#));
    }

    #[test]
    fn recurses_under_named_keys_and_arrays() {
        let tree = normalize(parse(r#"{"net": {"0": [1], "1": [2]}, "list": [{"3": 4}]}"#));
        assert_eq!(tree, parse(r#"{"net": [[1], [2]], "list": [[4]]}"#));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize(parse(r#"{"a": {"0": {"w": [1, 2]}, "1": {"w": [3]}}}"#));
        assert_eq!(normalize(once.clone()), once);
    }

    #[test]
    fn leaves_pass_through_untouched() {
        assert_eq!(normalize(parse("[1.5, 2.5]")), parse("[1.5, 2.5]"));
        assert_eq!(normalize(parse("3")), parse("3"));
    }

    #[test]
    fn overlong_digit_keys_stay_maps() {
        // 39 digits overflow u128, so the key does not count as numeric
        let tree = TreeValue::Map(vec![("9".repeat(39), TreeValue::Scalar(1.0))]);
        assert_eq!(normalize(tree.clone()), tree);
    }

    #[test]
    fn empty_map_is_vacuously_digit_keyed() {
        // all() over no keys holds, matching the observed source behavior
        assert_eq!(normalize(TreeValue::Map(Vec::new())), parse("[]"));
    }

    #[test]
    fn denormalize_inverts_structural_arrays_only() {
        let tree = parse(r#"{"net": [{"w": [1, 2]}, {"w": [3, 4]}]}"#);
        let denorm = denormalize(tree.clone());
        assert_eq!(
            denorm,
            parse(r#"{"net": {"0": {"w": [1, 2]}, "1": {"w": [3, 4]}}}"#)
        );
        // leaf lists stayed arrays, so normalizing restores the input
        assert_eq!(normalize(denorm), tree);
    }
}

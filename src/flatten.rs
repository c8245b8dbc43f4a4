//! Flatten/unflatten between a dot-delimited key map and a nested tree.
//!
//! A model's parameter dictionary arrives as a single-level map whose keys
//! encode the module hierarchy (`layers.0.weight`). Unflattening splits each
//! key at the first delimiter and merges entries with a common head into one
//! child subtree, so encounter order never changes the final structure.

use crate::error::{PackError, Result};
use crate::value::TreeValue;

/// Default key delimiter for parameter dictionaries.
pub const DEFAULT_DELIMITER: &str = ".";

/// Expand a flat delimited-key map into a nested map tree.
///
/// Values that are already maps are passed through recursively under their
/// full key, mirroring the parameter-dictionary convention. A key that would
/// descend through an established leaf value is a `MalformedInput` error.
pub fn unflatten(flat: &TreeValue, delim: &str) -> Result<TreeValue> {
    let TreeValue::Map(entries) = flat else {
        return Err(PackError::MalformedInput(
            "unflatten input must be a map".into(),
        ));
    };

    let mut out: Vec<(String, TreeValue)> = Vec::new();
    for (key, value) in entries {
        if let TreeValue::Map(_) = value {
            insert(&mut out, key, "", unflatten(value, delim)?)?;
        } else {
            match key.split_once(delim) {
                None => insert(&mut out, key, "", value.clone())?,
                Some((head, rest)) => insert_split(&mut out, head, rest, value, delim)?,
            }
        }
    }
    Ok(TreeValue::Map(out))
}

/// Collapse a nested map tree back into a flat delimited-key map.
///
/// Structural inverse of [`unflatten`] for trees whose leaf paths are unique
/// once joined by `delim`. Non-map values (scalars, arrays, tensors) are the
/// flattening leaves.
pub fn flatten(tree: &TreeValue, delim: &str) -> Result<TreeValue> {
    let TreeValue::Map(_) = tree else {
        return Err(PackError::MalformedInput(
            "flatten input must be a map".into(),
        ));
    };

    let mut out = Vec::new();
    flatten_into(tree, delim, String::new(), &mut out);
    Ok(TreeValue::Map(out))
}

fn flatten_into(
    node: &TreeValue,
    delim: &str,
    prefix: String,
    out: &mut Vec<(String, TreeValue)>,
) {
    match node {
        TreeValue::Map(entries) => {
            for (key, value) in entries {
                let joined = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}{delim}{key}")
                };
                flatten_into(value, delim, joined, out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}

fn insert_split(
    entries: &mut Vec<(String, TreeValue)>,
    head: &str,
    rest: &str,
    value: &TreeValue,
    delim: &str,
) -> Result<()> {
    let idx = match entries.iter().position(|(k, _)| k == head) {
        Some(i) => i,
        None => {
            entries.push((head.to_string(), TreeValue::Map(Vec::new())));
            entries.len() - 1
        }
    };
    let TreeValue::Map(child) = &mut entries[idx].1 else {
        return Err(PackError::MalformedInput(format!(
            "key `{head}{delim}{rest}` descends through non-map value at `{head}`"
        )));
    };

    match rest.split_once(delim) {
        None => insert(child, rest, head, value.clone()),
        Some((next, tail)) => insert_split(child, next, tail, value, delim),
    }
}

fn insert(
    entries: &mut Vec<(String, TreeValue)>,
    key: &str,
    context: &str,
    value: TreeValue,
) -> Result<()> {
    if entries.iter().any(|(k, _)| k == key) {
        let at = if context.is_empty() {
            key.to_string()
        } else {
            format!("{context}.{key}")
        };
        return Err(PackError::MalformedInput(format!(
            "key `{at}` conflicts with an already-established value"
        )));
    }
    entries.push((key.to_string(), value));
    Ok(())
}

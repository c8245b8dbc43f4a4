//! Leaf-list traversal.
//!
//! Walks a tree depth-first and fires a visitor exactly once per maximal
//! non-map-containing subtree hanging off a map entry: the "leaf lists"
//! holding tensor payloads (and bare scalar parameters). The recursion
//! reports whether each subtree contains a map anywhere, which is what
//! decides where a visit fires: a map entry whose value contains no further
//! map is a finished parameter, anything deeper is structure to descend.

use crate::value::{PathSeg, TreeValue};

/// Visit every leaf list under `root`, in depth-first container order.
///
/// `visit` receives the full path from the root and the visited value; its
/// first error short-circuits the traversal. Returns whether `root` itself
/// contains a map.
pub fn visit_leaf_lists<F, E>(root: &TreeValue, mut visit: F) -> Result<bool, E>
where
    F: FnMut(&[PathSeg], &TreeValue) -> Result<(), E>,
{
    let mut path = Vec::new();
    walk(root, &mut path, &mut visit)
}

fn walk<F, E>(node: &TreeValue, path: &mut Vec<PathSeg>, visit: &mut F) -> Result<bool, E>
where
    F: FnMut(&[PathSeg], &TreeValue) -> Result<(), E>,
{
    match node {
        TreeValue::Map(entries) => {
            for (key, value) in entries {
                path.push(PathSeg::Key(key.clone()));
                let contains_map = walk(value, path, visit)?;
                if !contains_map {
                    visit(path, value)?;
                }
                path.pop();
            }
            Ok(true)
        }
        TreeValue::Array(items) => {
            let mut contains_map = false;
            for (idx, value) in items.iter().enumerate() {
                path.push(PathSeg::Index(idx));
                contains_map = walk(value, path, visit)? || contains_map;
                path.pop();
            }
            Ok(contains_map)
        }
        TreeValue::Scalar(_) | TreeValue::Tensor(_) => Ok(false),
    }
}

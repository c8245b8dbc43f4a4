//! Tree value model for weight interchange.
//!
//! `TreeValue` is the tagged value flowing through every pipeline stage:
//! a numeric scalar, a materialized tensor, an ordered map, or an ordered
//! array. The JSON boundary maps objects to maps (insertion-ordered),
//! arrays to arrays, and numbers to scalars; strings, booleans and nulls
//! have no meaning in a weight dictionary and are rejected.

use std::fmt;

use serde_json::Value as Json;

use crate::error::{PackError, Result};
use crate::tensor::Tensor;

/// A node in the weight tree.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeValue {
    /// A single numeric leaf.
    Scalar(f64),
    /// A materialized rectangular numeric payload.
    Tensor(Tensor),
    /// Ordered key/value container; keys are unique.
    Map(Vec<(String, TreeValue)>),
    /// Ordered positional container.
    Array(Vec<TreeValue>),
}

/// One step of a path from the root to a node: a map key or array index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSeg::Key(k) => write!(f, "{k}"),
            PathSeg::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Render a path as a dotted string for error messages and reports.
pub fn path_string(path: &[PathSeg]) -> String {
    let parts: Vec<String> = path.iter().map(|seg| seg.to_string()).collect();
    parts.join(".")
}

impl TreeValue {
    /// Build a tree from parsed JSON. Objects keep insertion order.
    pub fn from_json(json: &Json) -> Result<TreeValue> {
        match json {
            Json::Number(n) => {
                let v = n.as_f64().ok_or_else(|| {
                    PackError::MalformedInput(format!("number `{n}` is not representable as f64"))
                })?;
                Ok(TreeValue::Scalar(v))
            }
            Json::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(TreeValue::from_json(item)?);
                }
                Ok(TreeValue::Array(out))
            }
            Json::Object(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    out.push((key.clone(), TreeValue::from_json(value)?));
                }
                Ok(TreeValue::Map(out))
            }
            Json::String(_) | Json::Bool(_) | Json::Null => Err(PackError::MalformedInput(
                format!("unsupported JSON value `{json}` in weight tree"),
            )),
        }
    }

    /// Serialize back to JSON. Tensors expand to nested arrays of numbers.
    ///
    /// JSON has no representation for NaN or infinity, so a non-finite
    /// value anywhere in the tree is a `MalformedInput` error.
    pub fn to_json(&self) -> Result<Json> {
        match self {
            TreeValue::Scalar(v) => json_number(*v),
            TreeValue::Tensor(t) => t.to_tree().to_json(),
            TreeValue::Map(entries) => {
                let mut obj = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    obj.insert(key.clone(), value.to_json()?);
                }
                Ok(Json::Object(obj))
            }
            TreeValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json()?);
                }
                Ok(Json::Array(out))
            }
        }
    }

    /// Look up a node by path.
    pub fn get_path(&self, path: &[PathSeg]) -> Option<&TreeValue> {
        let mut node = self;
        for seg in path {
            node = match (node, seg) {
                (TreeValue::Map(entries), PathSeg::Key(k)) => {
                    entries.iter().find(|(key, _)| key == k).map(|(_, v)| v)?
                }
                (TreeValue::Array(items), PathSeg::Index(i)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Replace the node at `path` with `value`.
    ///
    /// The path must already exist: this rewrites an output tree whose
    /// structure mirrors the traversal source, it never creates nodes.
    pub fn set_path(&mut self, path: &[PathSeg], value: TreeValue) -> Result<()> {
        let Some(slot) = self.get_path_mut(path) else {
            return Err(PackError::MalformedInput(format!(
                "path `{}` not present in output tree",
                path_string(path)
            )));
        };
        *slot = value;
        Ok(())
    }

    fn get_path_mut(&mut self, path: &[PathSeg]) -> Option<&mut TreeValue> {
        let mut node = self;
        for seg in path {
            node = match (node, seg) {
                (TreeValue::Map(entries), PathSeg::Key(k)) => entries
                    .iter_mut()
                    .find(|(key, _)| key == k)
                    .map(|(_, v)| v)?,
                (TreeValue::Array(items), PathSeg::Index(i)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Convert an f64 into a JSON number, preserving integral values exactly.
fn json_number(v: f64) -> Result<Json> {
    if v.fract() == 0.0 && v.abs() <= i64::MAX as f64 {
        Ok(Json::Number((v as i64).into()))
    } else {
        serde_json::Number::from_f64(v)
            .map(Json::Number)
            .ok_or_else(|| {
                PackError::MalformedInput(format!("non-finite value {v} has no JSON form"))
            })
    }
}

//! texpack — weight-tree conversion and RGBA texture repacking.
//!
//! Converts trained neural-network weights between a flat, dot-delimited
//! parameter dictionary and a nested JSON tree, then repacks rank-4
//! convolution weights into an RGBA-texel layout for texture storage.
//!
//! Pipeline:
//! ```text
//! flat map ──→ unflatten ──→ nested tree ──→ normalize (digit keys → arrays)
//!                                                 │
//!                         leaf-list traversal ────┴──→ repack per tensor → JSON
//! ```
//!
//! # Public API
//!
//! ```ignore
//! use texpack::{repack_document, ChannelGrouping};
//! let json: serde_json::Value = serde_json::from_str(input)?;
//! let (packed, report) = repack_document(&json, &ChannelGrouping::default())?;
//! ```

pub mod error;
pub mod flatten;
pub mod normalize;
pub mod repack;
pub mod tensor;
pub mod traverse;
pub mod value;

pub use error::{PackError, Result};
pub use flatten::{flatten, unflatten, DEFAULT_DELIMITER};
pub use normalize::{denormalize, normalize};
pub use repack::{repack_tree, ChannelGrouping, RepackReport};
pub use tensor::Tensor;
pub use traverse::visit_leaf_lists;
pub use value::{path_string, PathSeg, TreeValue};

/// Repack a parsed JSON weight document end to end.
///
/// Parses the document into a tree, repacks every rank-4 tensor leaf, and
/// returns the rewritten document plus the conversion report. The first
/// validation failure aborts with no output.
pub fn repack_document(
    json: &serde_json::Value,
    grouping: &ChannelGrouping,
) -> Result<(serde_json::Value, RepackReport)> {
    let tree = TreeValue::from_json(json)?;
    let (out, report) = repack_tree(&tree, grouping)?;
    Ok((out.to_json()?, report))
}

/// Expand a flat dotted-key JSON object into a normalized nested document.
///
/// Runs unflatten followed by digit-key normalization, the preparation step
/// that turns a parameter dictionary into the tree [`repack_document`]
/// consumes.
pub fn nest_document(json: &serde_json::Value, delim: &str) -> Result<serde_json::Value> {
    let flat = TreeValue::from_json(json)?;
    let nested = unflatten(&flat, delim)?;
    normalize(nested).to_json()
}

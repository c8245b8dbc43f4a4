//! Convolution weight repacking for RGBA texture storage.
//!
//! A rank-4 weight tensor `(F, C, H, W)` is rewritten so that groups of 4
//! input channels land on the trailing axis, where a shader can read them
//! as one RGBA texel: `(F, groups, H, W, 4)`. Anything that is not rank 4
//! is deliberately skipped, so biases and scalars ride through unchanged.

use serde::Serialize;

use crate::error::{PackError, Result};
use crate::tensor::Tensor;
use crate::traverse::visit_leaf_lists;
use crate::value::{path_string, PathSeg, TreeValue};

/// Texel width the trailing axis is packed into.
pub const TEXEL_WIDTH: usize = 4;

/// Default top-level parameter index limit below which channels regroup.
pub const DEFAULT_GROUP_LIMIT: usize = 12;

/// First-layer shape (post-permute) whose 3 input channels are padded to 4.
const FIRST_LAYER_SHAPE: [usize; 4] = [64, 7, 7, 3];

/// Which parameters get their channel axis regrouped into 4-wide texels.
///
/// The decision is keyed by the top-level parameter index: the second path
/// segment of the visited leaf, interpreted as an integer. Callers that know
/// which parameters are convolutional supply the classification explicitly;
/// `IndexBelow(12)` reproduces the historical layout.
#[derive(Clone, Debug)]
pub enum ChannelGrouping {
    /// Regroup when the parameter index is below the limit.
    IndexBelow(usize),
    /// Regroup every rank-4 tensor.
    Always,
    /// Never regroup; keep the raw single-entry group axis.
    Never,
    /// Explicit per-parameter flags, indexed by parameter index.
    PerParameter(Vec<bool>),
}

impl Default for ChannelGrouping {
    fn default() -> Self {
        ChannelGrouping::IndexBelow(DEFAULT_GROUP_LIMIT)
    }
}

impl ChannelGrouping {
    fn should_group(&self, path: &[PathSeg]) -> bool {
        match self {
            ChannelGrouping::Always => true,
            ChannelGrouping::Never => false,
            ChannelGrouping::IndexBelow(limit) => param_index(path).is_some_and(|i| i < *limit),
            ChannelGrouping::PerParameter(flags) => param_index(path)
                .and_then(|i| flags.get(i).copied())
                .unwrap_or(false),
        }
    }
}

/// Top-level parameter index: the second path segment, as an integer.
fn param_index(path: &[PathSeg]) -> Option<usize> {
    match path.get(1)? {
        PathSeg::Index(i) => Some(*i),
        PathSeg::Key(k) => k.parse().ok(),
    }
}

/// Shapes of the tensors a conversion repacked, and how many leaves it
/// skipped, for diagnostics.
#[derive(Debug, Default, Serialize)]
pub struct RepackReport {
    pub repacked: Vec<(String, Vec<usize>)>,
    pub skipped: usize,
}

/// Repack every rank-4 leaf tensor in `tree`.
///
/// The traversal walks the input tree while rewrites land in a fresh clone,
/// so array shapes discovered mid-traversal never disturb the traversal
/// itself. The first validation failure aborts with no output tree.
pub fn repack_tree(
    tree: &TreeValue,
    grouping: &ChannelGrouping,
) -> Result<(TreeValue, RepackReport)> {
    let mut out = tree.clone();
    let mut report = RepackReport::default();

    visit_leaf_lists(tree, |path, value| {
        match repack_leaf(path, value, grouping)? {
            Some(tensor) => {
                report
                    .repacked
                    .push((path_string(path), tensor.shape().to_vec()));
                out.set_path(path, TreeValue::Tensor(tensor))
            }
            None => {
                report.skipped += 1;
                Ok(())
            }
        }
    })?;

    Ok((out, report))
}

/// Repack one leaf, or None if it is not a rank-4 tensor.
pub fn repack_leaf(
    path: &[PathSeg],
    value: &TreeValue,
    grouping: &ChannelGrouping,
) -> Result<Option<Tensor>> {
    let tensor = Tensor::from_tree(value)?;
    if tensor.rank() != 4 {
        return Ok(None);
    }

    // (F, C, H, W) → (F, H, W, C)
    let mut tensor = tensor.permute(&[0, 2, 3, 1])?;

    if tensor.shape() == FIRST_LAYER_SHAPE {
        tensor = tensor.pad_last(1, 0.0)?;
    }

    let channels = tensor.shape()[3];
    if channels % TEXEL_WIDTH != 0 {
        return Err(PackError::ShapeValidation {
            path: path_string(path),
            len: channels,
        });
    }

    // Insert the group axis before the channels, then split channels into
    // 4-wide texels for convolutional parameters.
    let &[f, h, w, _] = tensor.shape() else {
        unreachable!("rank checked above");
    };
    let tensor = if grouping.should_group(path) {
        tensor.with_shape(vec![f, h, w, channels / TEXEL_WIDTH, TEXEL_WIDTH])?
    } else {
        tensor.with_shape(vec![f, h, w, 1, channels])?
    };

    // Move the group axis between features and rows: (F, groups, H, W, 4)
    Ok(Some(tensor.permute(&[0, 3, 1, 2, 4])?))
}

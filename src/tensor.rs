//! Rectangular tensor materialization and shape ops.
//!
//! Leaf subtrees are nested arrays of numbers; `Tensor` flattens them into
//! a row-major buffer with an explicit shape so the repack transform can
//! permute and reshape without walking nested containers. Jagged input is a
//! precondition violation and fails materialization.

use crate::error::{PackError, Result};
use crate::value::TreeValue;

/// A rectangular numeric tensor, row-major. A scalar is rank 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Tensor> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(PackError::MalformedInput(format!(
                "shape {shape:?} implies {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Tensor { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Materialize a tensor from a nested tree of arrays and scalars.
    ///
    /// Every sibling subsequence must have the same length at each depth;
    /// jagged data or a map anywhere below is `MalformedInput`.
    pub fn from_tree(value: &TreeValue) -> Result<Tensor> {
        let shape = shape_of(value)?;
        let mut data = Vec::with_capacity(shape.iter().product());
        collect(value, &mut data);
        Ok(Tensor { shape, data })
    }

    /// Expand back into nested arrays of scalars.
    pub fn to_tree(&self) -> TreeValue {
        build_tree(&self.shape, &self.data)
    }

    /// Reorder axes: `perm[i]` names the source axis that becomes axis `i`.
    pub fn permute(&self, perm: &[usize]) -> Result<Tensor> {
        if perm.len() != self.rank() || !is_permutation(perm) {
            return Err(PackError::MalformedInput(format!(
                "permutation {perm:?} does not fit rank {}",
                self.rank()
            )));
        }

        let new_shape: Vec<usize> = perm.iter().map(|&axis| self.shape[axis]).collect();
        let old_strides = strides(&self.shape);
        let mut data = Vec::with_capacity(self.data.len());

        let mut coords = vec![0usize; new_shape.len()];
        for _ in 0..self.data.len() {
            let old_index: usize = coords
                .iter()
                .zip(perm)
                .map(|(&c, &axis)| c * old_strides[axis])
                .sum();
            data.push(self.data[old_index]);
            advance(&mut coords, &new_shape);
        }

        Ok(Tensor {
            shape: new_shape,
            data,
        })
    }

    /// Append `count` copies of `fill` along the trailing axis.
    pub fn pad_last(&self, count: usize, fill: f64) -> Result<Tensor> {
        let Some(&last) = self.shape.last() else {
            return Err(PackError::MalformedInput(
                "cannot pad a rank-0 tensor".into(),
            ));
        };

        let mut shape = self.shape.clone();
        *shape.last_mut().unwrap() = last + count;

        let rows: usize = self.shape[..self.rank() - 1].iter().product();
        let mut data = Vec::with_capacity(rows * (last + count));
        for i in 0..rows {
            data.extend_from_slice(&self.data[i * last..(i + 1) * last]);
            data.extend(std::iter::repeat(fill).take(count));
        }

        Tensor::new(shape, data)
    }

    /// Reinterpret the buffer under a new shape with the same element count.
    pub fn with_shape(&self, shape: Vec<usize>) -> Result<Tensor> {
        Tensor::new(shape, self.data.clone())
    }
}

fn shape_of(value: &TreeValue) -> Result<Vec<usize>> {
    match value {
        TreeValue::Scalar(_) => Ok(Vec::new()),
        TreeValue::Tensor(t) => Ok(t.shape.clone()),
        TreeValue::Array(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let sub = shape_of(item)?;
                match &inner {
                    None => inner = Some(sub),
                    Some(prev) if *prev == sub => {}
                    Some(prev) => {
                        return Err(PackError::MalformedInput(format!(
                            "jagged tensor data: sibling shapes {prev:?} and {sub:?}"
                        )))
                    }
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Ok(shape)
        }
        TreeValue::Map(_) => Err(PackError::MalformedInput("map inside tensor data".into())),
    }
}

fn collect(value: &TreeValue, data: &mut Vec<f64>) {
    match value {
        TreeValue::Scalar(v) => data.push(*v),
        TreeValue::Tensor(t) => data.extend_from_slice(&t.data),
        TreeValue::Array(items) => {
            for item in items {
                collect(item, data);
            }
        }
        // shape_of already rejected maps
        TreeValue::Map(_) => {}
    }
}

fn build_tree(shape: &[usize], data: &[f64]) -> TreeValue {
    match shape {
        [] => TreeValue::Scalar(data[0]),
        [len, rest @ ..] => {
            let step: usize = rest.iter().product();
            let items = (0..*len)
                .map(|i| build_tree(rest, &data[i * step..(i + 1) * step]))
                .collect();
            TreeValue::Array(items)
        }
    }
}

fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &axis in perm {
        if axis >= perm.len() || seen[axis] {
            return false;
        }
        seen[axis] = true;
    }
    true
}

/// Increment `coords` as an odometer over `shape`, row-major.
fn advance(coords: &mut [usize], shape: &[usize]) {
    for i in (0..coords.len()).rev() {
        coords[i] += 1;
        if coords[i] < shape[i] {
            return;
        }
        coords[i] = 0;
    }
}

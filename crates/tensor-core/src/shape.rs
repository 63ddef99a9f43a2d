// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.
//!
//! Two representations live here:
//!
//! - [`Shape`] — an owned, growable list of dimensions. Used while a model
//!   is being described, serialized and validated.
//! - [`Dims`] — a fixed-capacity `Copy` shape of rank ≤ [`MAX_RANK`]. Used
//!   once tensors live in the arena, so shape queries and kernels never
//!   touch the heap.

use crate::{DType, TensorError};
use std::fmt;

/// Largest rank a tensor may have once it is placed in the arena.
pub const MAX_RANK: usize = 4;

/// Describes the dimensionality of a tensor in a model definition.
///
/// Serialized as a plain JSON array of dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![1, 16]);
    /// assert_eq!(s.rank(), 2);
    /// assert_eq!(s.num_elements(), 16);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1. Panics on overflow in debug
    /// builds; use [`checked_num_elements`](Shape::checked_num_elements) for
    /// shapes that have not been validated yet.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Like [`num_elements`](Shape::num_elements), but returns `None` if the
    /// product does not fit in a `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`DType`].
    pub fn size_bytes(&self, dtype: DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Memory footprint in bytes, or `None` on overflow.
    pub fn checked_size_bytes(&self, dtype: DType) -> Option<usize> {
        self.checked_num_elements()?.checked_mul(dtype.size_bytes())
    }

    /// Converts into the fixed-rank representation.
    pub fn to_dims(&self) -> Result<Dims, TensorError> {
        Dims::new(&self.dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dims(f, &self.dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

/// A fixed-capacity shape that can be copied around without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    rank: usize,
    dims: [usize; MAX_RANK],
}

impl Dims {
    /// Builds fixed-rank dims from a slice.
    ///
    /// # Errors
    /// Returns [`TensorError::RankTooLarge`] if `dims.len() > MAX_RANK`.
    pub fn new(dims: &[usize]) -> Result<Self, TensorError> {
        if dims.len() > MAX_RANK {
            return Err(TensorError::RankTooLarge {
                rank: dims.len(),
                max: MAX_RANK,
            });
        }
        let mut fixed = [0usize; MAX_RANK];
        fixed[..dims.len()].copy_from_slice(dims);
        Ok(Self {
            rank: dims.len(),
            dims: fixed,
        })
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the populated dimensions.
    pub fn as_slice(&self) -> &[usize] {
        &self.dims[..self.rank]
    }

    /// Returns the total number of elements (1 for rank 0).
    pub fn num_elements(&self) -> usize {
        self.as_slice().iter().product()
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.as_slice().get(index).copied()
    }

    /// Converts back into an owned [`Shape`].
    pub fn to_shape(&self) -> Shape {
        Shape::from(self.as_slice())
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dims(f, self.as_slice())
    }
}

fn write_dims(f: &mut fmt::Formatter<'_>, dims: &[usize]) -> fmt::Result {
    write!(f, "[")?;
    for (i, d) in dims.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{d}")?;
    }
    write!(f, "]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(vec![]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
    }

    #[test]
    fn test_matrix_shape() {
        let s = Shape::matrix(1, 16);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.num_elements(), 16);
        assert_eq!(s.size_bytes(DType::F32), 64);
        assert_eq!(s.dim(1), Some(16));
        assert_eq!(s.dim(2), None);
    }

    #[test]
    fn test_checked_size() {
        let s = Shape::matrix(4, 16);
        assert_eq!(s.checked_num_elements(), Some(64));
        assert_eq!(s.checked_size_bytes(DType::F32), Some(256));

        let huge = Shape::matrix(1 << 32, 1 << 32);
        assert_eq!(huge.checked_num_elements(), None);
        assert_eq!(Shape::vector(usize::MAX).checked_size_bytes(DType::F32), None);
        assert_eq!(Shape::new(vec![usize::MAX, 0]).checked_num_elements(), Some(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::new(vec![2, 3, 4])), "[2, 3, 4]");
        assert_eq!(format!("{}", Dims::new(&[1, 1]).unwrap()), "[1, 1]");
    }

    #[test]
    fn test_serde_transparent() {
        let s = Shape::matrix(1, 1);
        assert_eq!(serde_json::to_string(&s).unwrap(), "[1,1]");
        let back: Shape = serde_json::from_str("[16,1]").unwrap();
        assert_eq!(back, Shape::matrix(16, 1));
    }

    #[test]
    fn test_dims_roundtrip() {
        let s = Shape::new(vec![1, 2, 3]);
        let d = s.to_dims().unwrap();
        assert_eq!(d.rank(), 3);
        assert_eq!(d.as_slice(), &[1, 2, 3]);
        assert_eq!(d.num_elements(), 6);
        assert_eq!(d.to_shape(), s);
    }

    #[test]
    fn test_dims_rank_limit() {
        let err = Dims::new(&[1, 1, 1, 1, 1]).unwrap_err();
        assert!(matches!(err, TensorError::RankTooLarge { rank: 5, .. }));
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Borrowed tensor views over raw byte buffers.
//!
//! Tensors in this runtime never own their storage. Activations live in
//! arena regions and constants live inside the model descriptor, so the
//! only tensor types are views that pair a [`Dims`] and [`DType`] with a
//! borrowed byte slice.
//!
//! # Memory Layout
//! Data is stored in row-major (C) order, little-endian. Element access
//! decodes bytes on the fly, which keeps the views `unsafe`-free and
//! indifferent to buffer alignment.

use crate::{DType, Dims, TensorError};

/// A borrowed, read-only view over tensor data.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    dims: Dims,
    dtype: DType,
    data: &'a [u8],
}

impl<'a> TensorView<'a> {
    /// Creates a view, checking that `data` is exactly the size implied by
    /// `dims` and `dtype`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, Dims, TensorView};
    /// let bytes = 2.5f32.to_le_bytes();
    /// let v = TensorView::new(Dims::new(&[1, 1]).unwrap(), DType::F32, &bytes).unwrap();
    /// assert_eq!(v.f32_at(0).unwrap(), 2.5);
    /// ```
    pub fn new(dims: Dims, dtype: DType, data: &'a [u8]) -> Result<Self, TensorError> {
        check_len(dims, dtype, data.len())?;
        Ok(Self { dims, dtype, data })
    }

    /// Returns the shape of the viewed tensor.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Returns the data type of the viewed tensor.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.dims.num_elements()
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw byte slice.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads the `f32` element at flat index `index`.
    pub fn f32_at(&self, index: usize) -> Result<f32, TensorError> {
        expect_f32(self.dtype, "f32_at")?;
        read_f32(self.data, index)
    }

    /// Iterates over all elements as `f32`.
    ///
    /// # Errors
    /// Returns [`TensorError::UnsupportedDType`] if the view is not `F32`.
    pub fn iter_f32(&self) -> Result<impl Iterator<Item = f32> + 'a, TensorError> {
        expect_f32(self.dtype, "iter_f32")?;
        Ok(self
            .data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])))
    }
}

/// A borrowed, writable view over tensor data.
#[derive(Debug)]
pub struct TensorViewMut<'a> {
    dims: Dims,
    dtype: DType,
    data: &'a mut [u8],
}

impl<'a> TensorViewMut<'a> {
    /// Creates a writable view, checking the buffer size.
    pub fn new(dims: Dims, dtype: DType, data: &'a mut [u8]) -> Result<Self, TensorError> {
        check_len(dims, dtype, data.len())?;
        Ok(Self { dims, dtype, data })
    }

    /// Returns the shape of the viewed tensor.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Returns the data type of the viewed tensor.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.dims.num_elements()
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> TensorView<'_> {
        TensorView {
            dims: self.dims,
            dtype: self.dtype,
            data: &*self.data,
        }
    }

    /// Reads the `f32` element at flat index `index`.
    pub fn f32_at(&self, index: usize) -> Result<f32, TensorError> {
        expect_f32(self.dtype, "f32_at")?;
        read_f32(&*self.data, index)
    }

    /// Writes `value` at flat index `index`.
    pub fn set_f32(&mut self, index: usize, value: f32) -> Result<(), TensorError> {
        expect_f32(self.dtype, "set_f32")?;
        let len = self.data.len() / 4;
        let chunk = self
            .data
            .get_mut(index * 4..index * 4 + 4)
            .ok_or(TensorError::IndexOutOfBounds { index, len })?;
        chunk.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Copies `values` into the tensor. The lengths must match exactly.
    pub fn copy_from_f32(&mut self, values: &[f32]) -> Result<(), TensorError> {
        expect_f32(self.dtype, "copy_from_f32")?;
        if values.len() * 4 != self.data.len() {
            return Err(TensorError::BufferSizeMismatch {
                expected: self.data.len(),
                actual: values.len() * 4,
            });
        }
        for (chunk, v) in self.data.chunks_exact_mut(4).zip(values) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Fills the tensor with a constant `f32` value.
    pub fn fill_f32(&mut self, value: f32) -> Result<(), TensorError> {
        expect_f32(self.dtype, "fill_f32")?;
        let bytes = value.to_le_bytes();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&bytes);
        }
        Ok(())
    }
}

fn check_len(dims: Dims, dtype: DType, actual: usize) -> Result<(), TensorError> {
    let expected = dims.num_elements() * dtype.size_bytes();
    if expected != actual {
        return Err(TensorError::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

fn expect_f32(dtype: DType, op: &'static str) -> Result<(), TensorError> {
    if dtype != DType::F32 {
        return Err(TensorError::UnsupportedDType { op, dtype });
    }
    Ok(())
}

fn read_f32(data: &[u8], index: usize) -> Result<f32, TensorError> {
    let c = data
        .get(index * 4..index * 4 + 4)
        .ok_or(TensorError::IndexOutOfBounds {
            index,
            len: data.len() / 4,
        })?;
    Ok(f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

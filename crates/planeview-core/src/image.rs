//! Dense N-dimensional image.
//!
//! Samples are laid out with the first axis varying fastest, so a 2D image is
//! stored row-major with `x` contiguous. Coordinates are `i64` vectors with one
//! component per axis.

use crate::error::{PlaneviewError, Result};
use crate::sample::{SampleBuffer, SampleKind};

/// An N-dimensional array of numeric samples of one [`SampleKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    dims: Vec<usize>,
    strides: Vec<usize>,
    data: SampleBuffer,
}

impl Image {
    /// Allocate a zero-filled image.
    pub fn new(dims: &[usize], kind: SampleKind) -> Result<Self> {
        let len = element_count(dims)?;
        Ok(Self {
            dims: dims.to_vec(),
            strides: strides_for(dims),
            data: SampleBuffer::zeros(kind, len),
        })
    }

    /// Allocate an image with every sample set to `value` (narrowed to `kind`).
    pub fn filled(dims: &[usize], kind: SampleKind, value: f64) -> Result<Self> {
        let mut image = Self::new(dims, kind)?;
        for i in 0..image.len() {
            image.data.set(i, value);
        }
        Ok(image)
    }

    /// Build an image from samples in storage order (first axis fastest).
    pub fn from_values(dims: &[usize], kind: SampleKind, values: &[f64]) -> Result<Self> {
        let mut image = Self::new(dims, kind)?;
        if values.len() != image.len() {
            return Err(PlaneviewError::DataLength {
                expected: image.len(),
                actual: values.len(),
            });
        }
        for (i, &v) in values.iter().enumerate() {
            image.data.set(i, v);
        }
        Ok(image)
    }

    /// Size of each axis.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn dim(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    pub fn kind(&self) -> SampleKind {
        self.data.kind()
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `other` has the same rank and the same size on every axis.
    pub fn same_shape(&self, other: &Image) -> bool {
        self.dims == other.dims
    }

    /// Linear storage index of `pos`.
    ///
    /// # Panics
    /// Panics if `pos` has the wrong rank or lies outside the image.
    #[inline]
    pub fn index_of(&self, pos: &[i64]) -> usize {
        assert_eq!(pos.len(), self.dims.len(), "coordinate rank mismatch");
        let mut index = 0usize;
        for (axis, (&p, &stride)) in pos.iter().zip(&self.strides).enumerate() {
            assert!(
                p >= 0 && (p as usize) < self.dims[axis],
                "coordinate {p} out of bounds on axis {axis}"
            );
            index += p as usize * stride;
        }
        index
    }

    /// Sample at `pos`, widened to `f64`.
    #[inline]
    pub fn get(&self, pos: &[i64]) -> f64 {
        self.data.get(self.index_of(pos))
    }

    /// Store `value` at `pos`, narrowed to the image's sample kind.
    #[inline]
    pub fn set(&mut self, pos: &[i64], value: f64) {
        let index = self.index_of(pos);
        self.data.set(index, value);
    }

    /// Whether `pos` addresses a sample of this image.
    pub fn contains(&self, pos: &[i64]) -> bool {
        pos.len() == self.dims.len()
            && pos
                .iter()
                .zip(&self.dims)
                .all(|(&p, &size)| p >= 0 && (p as u64) < size as u64)
    }

    /// All samples in storage order, widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.data.get(i)).collect()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.data
    }
}

/// Product of `dims`, checked for rank, zero sizes, and overflow.
fn element_count(dims: &[usize]) -> Result<usize> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(PlaneviewError::InvalidDimensions(dims.to_vec()));
    }
    let total = dims
        .iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
        .ok_or_else(|| PlaneviewError::TooLarge(dims.to_vec()))?;
    usize::try_from(total).map_err(|_| PlaneviewError::TooLarge(dims.to_vec()))
}

fn strides_for(dims: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut stride = 1usize;
    for &d in dims {
        strides.push(stride);
        stride *= d;
    }
    strides
}

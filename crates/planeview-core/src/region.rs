//! Rectangular N-dimensional coordinate regions and their iteration order.
//!
//! A [`HyperVolume`] is described by an origin and a span (element count) per
//! axis. [`PositionIter`] walks it in raster order with the **first axis
//! varying fastest**, matching the storage order of [`crate::image::Image`].
//!
//! ```text
//! 3×2 region at origin (0, 0):
//!   (0,0) (1,0) (2,0) (0,1) (1,1) (2,1)
//! ```
//!
//! Totals are computed in `u64` so regions with up to `u64::MAX` elements can
//! be counted without overflow.

use crate::error::{PlaneviewError, Result};

/// A dense rectangular region of integer coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperVolume {
    origin: Vec<i64>,
    span: Vec<i64>,
}

impl HyperVolume {
    /// Region starting at `origin` and covering `span[i]` positions on axis `i`.
    ///
    /// Fails with [`PlaneviewError::InvalidRegion`] if any span is not positive.
    pub fn new(origin: Vec<i64>, span: Vec<i64>) -> Result<Self> {
        if origin.len() != span.len() {
            return Err(PlaneviewError::RankMismatch {
                expected: origin.len(),
                actual: span.len(),
            });
        }
        if let Some((axis, &s)) = span.iter().enumerate().find(|&(_, &s)| s <= 0) {
            return Err(PlaneviewError::InvalidRegion { axis, span: s });
        }
        Ok(Self { origin, span })
    }

    /// Region between two corner points, both inclusive.
    ///
    /// `from_bounds(first, last)` covers `last[i] - first[i] + 1` positions per axis.
    pub fn from_bounds(first: &[i64], last: &[i64]) -> Result<Self> {
        if first.len() != last.len() {
            return Err(PlaneviewError::RankMismatch {
                expected: first.len(),
                actual: last.len(),
            });
        }
        let span = first.iter().zip(last).map(|(&a, &b)| b - a + 1).collect();
        Self::new(first.to_vec(), span)
    }

    /// Region covering every coordinate of an image with the given dimensions.
    pub fn covering(dims: &[usize]) -> Result<Self> {
        let span = dims.iter().map(|&d| d as i64).collect();
        Self::new(vec![0; dims.len()], span)
    }

    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    pub fn span(&self) -> &[i64] {
        &self.span
    }

    pub fn ndim(&self) -> usize {
        self.span.len()
    }

    /// Inclusive last corner of the region.
    pub fn last(&self) -> Vec<i64> {
        self.origin
            .iter()
            .zip(&self.span)
            .map(|(&o, &s)| o + s - 1)
            .collect()
    }

    /// Number of coordinates in the region, saturating at `u64::MAX`.
    pub fn element_count(&self) -> u64 {
        self.span
            .iter()
            .fold(1u64, |acc, &s| acc.saturating_mul(s as u64))
    }

    /// A fresh iterator over the region. Each call restarts from the origin.
    pub fn positions(&self) -> PositionIter {
        PositionIter {
            origin: self.origin.clone(),
            last: self.last(),
            current: self.origin.clone(),
            remaining: self.element_count(),
            started: false,
        }
    }
}

impl IntoIterator for &HyperVolume {
    type Item = Vec<i64>;
    type IntoIter = PositionIter;

    fn into_iter(self) -> PositionIter {
        self.positions()
    }
}

/// Raster-order walk over a [`HyperVolume`].
///
/// Use [`PositionIter::advance`] in hot loops: it hands out a borrowed slice
/// instead of allocating a fresh vector per position.
#[derive(Debug, Clone)]
pub struct PositionIter {
    origin: Vec<i64>,
    last: Vec<i64>,
    current: Vec<i64>,
    remaining: u64,
    started: bool,
}

impl PositionIter {
    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    /// Move to the next coordinate and borrow it, or `None` once exhausted.
    pub fn advance(&mut self) -> Option<&[i64]> {
        if self.remaining == 0 {
            return None;
        }
        if self.started {
            for axis in 0..self.current.len() {
                if self.current[axis] < self.last[axis] {
                    self.current[axis] += 1;
                    break;
                }
                self.current[axis] = self.origin[axis];
            }
        } else {
            self.started = true;
        }
        self.remaining -= 1;
        Some(&self.current)
    }

    /// Coordinates not yet produced.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Iterator for PositionIter {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Vec<i64>> {
        self.advance().map(<[i64]>::to_vec)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

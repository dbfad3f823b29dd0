//! In-memory dataset: an image plus the metadata the calculator and display need.
//!
//! A [`Dataset`] labels each image axis with an [`Axis`] so callers can find the
//! channel axis, and keeps a revision counter that [`Dataset::update`] bumps
//! after the samples were changed in place. New datasets are allocated through
//! a [`DatasetService`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlaneviewError, Result};
use crate::image::Image;
use crate::sample::SampleKind;

/// Semantic label of one image axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    /// Selects among co-located intensity measurements (color or fluorescence channels).
    Channel,
    Time,
    /// Any other labelled axis.
    Other(String),
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
            Self::Channel => write!(f, "Channel"),
            Self::Time => write!(f, "Time"),
            Self::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A named image with labelled axes.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    axes: Vec<Axis>,
    image: Image,
    revision: u64,
}

impl Dataset {
    /// Wrap `image`, labelling axis `i` with `axes[i]`.
    pub fn new(name: impl Into<String>, axes: Vec<Axis>, image: Image) -> Result<Self> {
        if axes.len() != image.ndim() {
            return Err(PlaneviewError::RankMismatch {
                expected: image.ndim(),
                actual: axes.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            axes,
            image,
            revision: 0,
        })
    }

    /// Wrap `image` with the conventional labels `X, Y, Channel, Z, Time`.
    ///
    /// Axes past the fifth are labelled `Other("dim<i>")`.
    pub fn with_default_axes(name: impl Into<String>, image: Image) -> Self {
        let axes = default_axes(image.ndim());
        Self {
            name: name.into(),
            axes,
            image,
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Mutable access to the samples. Call [`Dataset::update`] after writing.
    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }

    pub fn into_image(self) -> Image {
        self.image
    }

    pub fn dims(&self) -> &[usize] {
        self.image.dims()
    }

    pub fn kind(&self) -> SampleKind {
        self.image.kind()
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.image.kind().bits()
    }

    pub fn is_signed(&self) -> bool {
        self.image.kind().is_signed()
    }

    pub fn is_integer(&self) -> bool {
        !self.image.kind().is_float()
    }

    /// Index of the first axis labelled [`Axis::Channel`].
    pub fn channel_axis(&self) -> Option<usize> {
        self.axes.iter().position(|a| *a == Axis::Channel)
    }

    /// Number of channels, or 1 if there is no channel axis.
    pub fn channel_count(&self) -> usize {
        self.channel_axis().map_or(1, |axis| self.image.dim(axis))
    }

    /// Signal that the samples changed.
    pub fn update(&mut self) {
        self.revision += 1;
        tracing::debug!("dataset {:?} updated, revision {}", self.name, self.revision);
    }

    /// Number of [`Dataset::update`] calls so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn default_axes(ndim: usize) -> Vec<Axis> {
    const LABELS: [Axis; 5] = [Axis::X, Axis::Y, Axis::Channel, Axis::Z, Axis::Time];
    (0..ndim)
        .map(|i| match LABELS.get(i) {
            Some(axis) => axis.clone(),
            None => Axis::Other(format!("dim{i}")),
        })
        .collect()
}

/// Factory for new datasets.
pub trait DatasetService: Send + Sync {
    /// Allocate a zero-filled dataset with the given shape and sample kind.
    fn create(
        &self,
        dims: &[usize],
        name: &str,
        axes: &[Axis],
        bits_per_pixel: u32,
        signed: bool,
        floating: bool,
    ) -> Result<Dataset>;
}

/// [`DatasetService`] backed by plain heap allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDatasetService;

impl DatasetService for DefaultDatasetService {
    fn create(
        &self,
        dims: &[usize],
        name: &str,
        axes: &[Axis],
        bits_per_pixel: u32,
        signed: bool,
        floating: bool,
    ) -> Result<Dataset> {
        let kind = SampleKind::from_parts(bits_per_pixel, signed, floating).ok_or(
            PlaneviewError::UnsupportedSampleKind {
                bits: bits_per_pixel,
                signed,
                floating,
            },
        )?;
        let image = Image::new(dims, kind)?;
        Dataset::new(name, axes.to_vec(), image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_axes_find_channel() {
        let image = Image::new(&[4, 4, 3], SampleKind::U8).expect("valid image");
        let ds = Dataset::with_default_axes("rgb", image);
        assert_eq!(ds.axes(), &[Axis::X, Axis::Y, Axis::Channel]);
        assert_eq!(ds.channel_axis(), Some(2));
        assert_eq!(ds.channel_count(), 3);
    }

    #[test]
    fn test_plain_plane_has_no_channel_axis() {
        let image = Image::new(&[4, 4], SampleKind::U16).expect("valid image");
        let ds = Dataset::with_default_axes("plane", image);
        assert_eq!(ds.channel_axis(), None);
        assert_eq!(ds.channel_count(), 1);
        assert_eq!(ds.bits_per_pixel(), 16);
        assert!(ds.is_integer());
        assert!(!ds.is_signed());
    }

    #[test]
    fn test_axes_must_match_rank() {
        let image = Image::new(&[2, 2], SampleKind::U8).expect("valid image");
        let err = Dataset::new("bad", vec![Axis::X], image).unwrap_err();
        assert!(matches!(err, PlaneviewError::RankMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_update_bumps_revision() {
        let image = Image::new(&[2, 2], SampleKind::U8).expect("valid image");
        let mut ds = Dataset::with_default_axes("a", image);
        assert_eq!(ds.revision(), 0);
        ds.update();
        ds.update();
        assert_eq!(ds.revision(), 2);
    }

    #[test]
    fn test_service_creates_requested_kind() {
        let service = DefaultDatasetService;
        let ds = service
            .create(&[3, 2], "out", &[Axis::X, Axis::Y], 64, true, true)
            .expect("supported kind");
        assert_eq!(ds.kind(), SampleKind::F64);
        assert_eq!(ds.dims(), &[3, 2]);
        assert_eq!(ds.name(), "out");

        let err = service
            .create(&[3, 2], "out", &[Axis::X, Axis::Y], 12, false, false)
            .unwrap_err();
        assert!(matches!(err, PlaneviewError::UnsupportedSampleKind { bits: 12, .. }));
    }
}

//! Planeview Core — domain layer for multi-dimensional image arithmetic and display.
//!
//! This crate contains the pixel-wise image calculator (two images in, one
//! combined image out) and the display projection that turns an N-dimensional
//! image into a 2D ARGB raster. No GPU or windowing dependencies.

pub mod calculator;
pub mod color_table;
pub mod combine;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod image;
pub mod ops;
pub mod raster;
pub mod region;
pub mod sample;
pub mod view;

// Re-exports for convenience.
pub use calculator::{CalculatorSettings, Cancelable, Destination, ImageCalculator, Materialized};
pub use color_table::ColorTable;
pub use combine::combine;
pub use convert::{ChannelConverter, DisplayRange};
pub use dataset::{Axis, Dataset, DatasetService, DefaultDatasetService};
pub use error::{PlaneviewError, Result};
pub use self::image::Image;
pub use ops::BinaryOp;
pub use raster::ArgbRaster;
pub use region::{HyperVolume, PositionIter};
pub use sample::SampleKind;
pub use view::{DatasetView, DisplaySettings, ImageCanvas, ProjectionMode, SharedDataset};

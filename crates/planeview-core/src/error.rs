//! Error type shared by every module of the core.

/// Errors raised by image construction, combination, and display projection.
///
/// Pixel operators never fail, and narrowing a value into a smaller sample
/// kind clamps silently, so neither shows up here.
#[derive(Debug, thiserror::Error)]
pub enum PlaneviewError {
    #[error("invalid region: span {span} on axis {axis} must be positive")]
    InvalidRegion { axis: usize, span: i64 },
    #[error("rank mismatch: expected {expected} axes, got {actual}")]
    RankMismatch { expected: usize, actual: usize },
    #[error("invalid image dimensions {0:?}: need at least one axis and no zero sizes")]
    InvalidDimensions(Vec<usize>),
    #[error("image dimensions {0:?} exceed the addressable element count")]
    TooLarge(Vec<usize>),
    #[error("sample data has {actual} values, dimensions require {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),
    #[error("image shapes differ: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
    #[error("unsupported sample kind: {bits} bits, signed={signed}, floating={floating}")]
    UnsupportedSampleKind { bits: u32, signed: bool, floating: bool },
    #[error("invalid axis {axis}: {reason}")]
    InvalidAxis { axis: usize, reason: &'static str },
    #[error("position {value} out of bounds on axis {axis} (size {size})")]
    PositionOutOfBounds { axis: usize, value: i64, size: usize },
    #[error("color table must have 256 entries, got {0}")]
    ColorTableLength(usize),
    #[error("expected {expected} color tables (one per channel), got {actual}")]
    ColorTableCount { expected: usize, actual: usize },
    #[error("projection mode requires a channel axis")]
    MissingChannelAxis,
    #[error("image with {0} axes cannot be displayed as a plane")]
    NotPlanar(usize),
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlaneviewError>;

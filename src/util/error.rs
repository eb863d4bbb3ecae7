//! Error types for stripjoin.

use thiserror::Error;

/// Result alias for stripjoin operations.
pub type StripJoinResult<T> = std::result::Result<T, StripJoinError>;

/// Errors that can occur when comparing or stitching fragments.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StripJoinError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer does not hold enough bytes for the dimensions.
    #[error("buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two fragments disagree on the dimension that must be shared.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// A row index lies outside the image.
    #[error("row {row} out of range for height {height}")]
    RowOutOfRange { row: usize, height: usize },
    /// A comparison anchor or block lies outside the image.
    #[error("anchor ({x}, {y}) out of range for {width}x{height} image")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// No columns were left to compare after shifting.
    #[error("no columns overlap for comparison")]
    EmptyComparison,
    /// The overlap swallows a whole fragment.
    #[error("overlap {overlap} is not smaller than fragment extent {extent}")]
    OverlapTooLarge { overlap: usize, extent: usize },
    /// A fragment could not be decoded.
    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    /// Encoding or writing an image failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}

impl StripJoinError {
    /// Returns true when the error means "these two fragments cannot be
    /// compared" rather than a caller mistake.
    pub fn is_incomparable(&self) -> bool {
        matches!(
            self,
            StripJoinError::DimensionMismatch { .. }
                | StripJoinError::RowOutOfRange { .. }
                | StripJoinError::OutOfRange { .. }
                | StripJoinError::EmptyComparison
                | StripJoinError::Decode { .. }
        )
    }
}

//! Dissimilarity scores between fragment edges.
//!
//! Two scoring families live here and their scores are not on the same
//! scale:
//!
//! - whole-row distances ([`row_distance`]): mean Euclidean distance over
//!   the selected channels, judged against [`Tolerance::ROW_RGB`];
//! - block distances ([`block_distance`], [`block_edge_distance`]): mean
//!   absolute difference of block-averaged single channels, judged against
//!   [`Tolerance::BLOCK_LUMINANCE`].
//!
//! Every function is pure. Failures that mean "these fragments cannot be
//! compared" are reported as errors for which
//! [`StripJoinError::is_incomparable`](crate::StripJoinError::is_incomparable)
//! returns true.

mod block;
mod row;

pub use block::{block_distance, block_edge_distance};
pub use row::row_distance;

use crate::color::ColorModel;
use crate::image::PixelBuffer;
use crate::util::{StripJoinError, StripJoinResult};

/// Acceptance threshold for a dissimilarity score.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Default threshold for whole-row RGB distances.
    pub const ROW_RGB: Self = Self(12.0);
    /// Default threshold for block distances, in single-channel units.
    pub const BLOCK_LUMINANCE: Self = Self(18.0);

    /// Creates a tolerance from a finite, non-negative threshold.
    pub fn new(threshold: f64) -> StripJoinResult<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(StripJoinError::InvalidInput(
                "tolerance must be finite and non-negative",
            ));
        }
        Ok(Self(threshold))
    }

    /// Returns the raw threshold.
    pub fn threshold(self) -> f64 {
        self.0
    }

    /// Returns true when `score` is strictly below the threshold.
    pub fn accepts(self, score: f64) -> bool {
        is_within_tolerance(score, self.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::ROW_RGB
    }
}

/// Returns true when `score < threshold`.
#[inline]
pub fn is_within_tolerance(score: f64, threshold: f64) -> bool {
    score < threshold
}

/// Row comparison with a fixed color model and force-fit setting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowComparator {
    model: ColorModel,
    force: bool,
}

impl RowComparator {
    /// Creates a comparator that rejects width mismatches.
    pub fn new(model: ColorModel) -> Self {
        Self {
            model,
            force: false,
        }
    }

    /// Enables or disables centering of rows with different widths.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Returns the color model used for pixel distances.
    pub fn model(&self) -> ColorModel {
        self.model
    }

    /// Returns whether width mismatches are tolerated.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Scores `row_a` of `a` against `row_b` of `b`.
    pub fn row_distance(
        &self,
        a: &PixelBuffer,
        row_a: usize,
        b: &PixelBuffer,
        row_b: usize,
        offset: i64,
    ) -> StripJoinResult<f64> {
        row_distance(a, row_a, b, row_b, self.model, offset, self.force)
    }

    /// Scores the last row of `top` against the first row of `bottom`.
    pub fn edge_distance(
        &self,
        top: &PixelBuffer,
        bottom: &PixelBuffer,
        offset: i64,
    ) -> StripJoinResult<f64> {
        self.row_distance(top, top.height() - 1, bottom, 0, offset)
    }
}

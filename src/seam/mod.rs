//! Seam location between two overlapping fragments.
//!
//! [`find_optimal_seam`] answers "how many leading rows of the bottom
//! fragment repeat the end of the top fragment?" by scoring the last row of
//! the top fragment against the first rows of the bottom fragment.
//! [`find_matching_rows`] is the exhaustive variant that searches every row
//! pair.

use crate::color::ColorModel;
use crate::compare::row_distance;
use crate::image::PixelBuffer;
use crate::trace::{trace_event, trace_span};
use crate::util::math::scaled_len;
use crate::util::{StripJoinError, StripJoinResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Per-pixel score below which the best row counts as a literal duplicate.
///
/// Scaled by the wider of the two fragment widths.
pub const DUPLICATE_ROW_FACTOR: f64 = 0.04;

/// Configuration for [`find_optimal_seam`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeamSearch {
    /// Fraction of the bottom fragment's height to search, starting at row 0.
    pub fraction: f32,
    /// Center rows of different widths instead of rejecting them.
    pub force: bool,
    /// Color model used to score rows.
    pub model: ColorModel,
    /// Score candidate rows on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for SeamSearch {
    fn default() -> Self {
        Self {
            fraction: 0.5,
            force: false,
            model: ColorModel::RGB,
            parallel: false,
        }
    }
}

impl SeamSearch {
    /// Searches the given fraction of the bottom fragment.
    pub fn with_fraction(mut self, fraction: f32) -> Self {
        self.fraction = fraction;
        self
    }

    /// Enables or disables width centering.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets the color model used to score rows.
    pub fn with_model(mut self, model: ColorModel) -> Self {
        self.model = model;
        self
    }

    /// Enables parallel scoring when the `rayon` feature is compiled in.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcome of a seam search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeamMatch {
    /// Number of leading rows of the bottom fragment to drop.
    pub row: usize,
    /// Score of the winning row, `None` when nothing was comparable.
    pub score: Option<f64>,
    /// True when the winning row was a near-exact duplicate and was skipped.
    pub skipped_duplicate: bool,
}

impl SeamMatch {
    fn literal_edges() -> Self {
        Self {
            row: 0,
            score: None,
            skipped_duplicate: false,
        }
    }
}

/// Finds the row of `bottom` that best continues the last row of `top`.
///
/// Rows `0..round(fraction * bottom.height())` are scored; the lowest score
/// wins and ties keep the earliest row. A winner scoring below
/// `DUPLICATE_ROW_FACTOR * max(width)` is a repeated row, so the seam moves
/// one row further down (as long as the bottom fragment keeps at least one
/// row). With an empty search range or no comparable row the fragments join
/// at their literal edges.
pub fn find_optimal_seam(
    top: &PixelBuffer,
    bottom: &PixelBuffer,
    search: &SeamSearch,
) -> SeamMatch {
    let rows = scaled_len(search.fraction, bottom.height()).min(bottom.height());
    let _span = trace_span!("find_optimal_seam", rows = rows).entered();

    let scores = score_candidate_rows(top, bottom, rows, search);
    let mut best: Option<(usize, f64)> = None;
    let mut best_score = f64::MAX;
    for (row, score) in scores.into_iter().enumerate() {
        if let Some(score) = score {
            if score < best_score {
                best_score = score;
                best = Some((row, score));
            }
        }
    }

    let Some((row, score)) = best else {
        return SeamMatch::literal_edges();
    };

    let duplicate_limit = DUPLICATE_ROW_FACTOR * top.width().max(bottom.width()) as f64;
    let skip = score < duplicate_limit && row + 1 < bottom.height();
    let seam = SeamMatch {
        row: if skip { row + 1 } else { row },
        score: Some(score),
        skipped_duplicate: skip,
    };
    trace_event!("seam_found", row = seam.row, score = score);
    seam
}

fn score_candidate_rows(
    top: &PixelBuffer,
    bottom: &PixelBuffer,
    rows: usize,
    search: &SeamSearch,
) -> Vec<Option<f64>> {
    let last = top.height() - 1;
    let score = |row: usize| {
        row_distance(top, last, bottom, row, search.model, 0, search.force).ok()
    };

    #[cfg(feature = "rayon")]
    {
        if search.parallel {
            return (0..rows).into_par_iter().map(score).collect();
        }
    }

    (0..rows).map(score).collect()
}

/// Best-matching row pair between two fragments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowPair {
    pub top_row: usize,
    pub bottom_row: usize,
    pub score: f64,
}

/// Searches every row of `bottom` against every row of `top` (or only
/// `top_row` when given) and returns the lowest-scoring pair.
///
/// Ties keep the first pair in row-major order.
pub fn find_matching_rows(
    top: &PixelBuffer,
    bottom: &PixelBuffer,
    top_row: Option<usize>,
    model: ColorModel,
    force: bool,
) -> StripJoinResult<RowPair> {
    let top_rows = match top_row {
        Some(row) if row >= top.height() => {
            return Err(StripJoinError::RowOutOfRange {
                row,
                height: top.height(),
            })
        }
        Some(row) => row..row + 1,
        None => 0..top.height(),
    };
    let _span = trace_span!("find_matching_rows", top_rows = top_rows.len()).entered();

    let mut best: Option<RowPair> = None;
    for i in top_rows {
        for j in 0..bottom.height() {
            let score = row_distance(top, i, bottom, j, model, 0, force)?;
            if best.map_or(true, |b| score < b.score) {
                best = Some(RowPair {
                    top_row: i,
                    bottom_row: j,
                    score,
                });
            }
        }
    }
    best.ok_or(StripJoinError::EmptyComparison)
}

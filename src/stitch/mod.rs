//! Compositing an ordered run of fragments into one image.
//!
//! Horizontal joins are handled by transposing the fragments, running the
//! vertical compositor, and transposing the result back, so every rule below
//! is stated for vertical joins (join axis = y, cross axis = x).
//!
//! Placement of fragment `i > 0`:
//!
//! - its drawn content starts `spacing - overlap` pixels after the end of
//!   the previous fragment's content (forward overlap), or `spacing` pixels
//!   after it once its own leading `overlap` rows are clipped (reverse
//!   overlap);
//! - the `spacing` rows just before that start are painted with the fill
//!   color after the previous fragment is pasted;
//! - across the seam it sits at its centering offset plus the user offset.

mod spec;

pub use spec::{JoinSpec, Orientation, Overlap};

use crate::image::PixelBuffer;
use crate::seam::find_optimal_seam;
use crate::trace::{trace_event, trace_span};
use crate::util::math::center_offset;
use crate::util::{StripJoinError, StripJoinResult};
use std::borrow::Cow;

/// Composites `pieces` in order according to `spec`.
///
/// Fails before allocating the canvas when fewer than two fragments are
/// given, when cross dimensions disagree without force-fit, or when the
/// overlap would swallow a fragment.
pub fn stitch(pieces: &[PixelBuffer], spec: &JoinSpec) -> StripJoinResult<PixelBuffer> {
    if pieces.len() < 2 {
        return Err(StripJoinError::InvalidInput(
            "stitching needs at least two fragments",
        ));
    }
    let _span = trace_span!(
        "stitch",
        pieces = pieces.len(),
        orientation = ?spec.orientation
    )
    .entered();

    let frames: Vec<Cow<'_, PixelBuffer>> = match spec.orientation {
        Orientation::Vertical => pieces.iter().map(Cow::Borrowed).collect(),
        Orientation::Horizontal => pieces.iter().map(|p| Cow::Owned(p.transpose())).collect(),
    };

    let out = stitch_vertical(frames, spec)?;
    trace_event!("stitched", width = out.width(), height = out.height());
    Ok(match spec.orientation {
        Orientation::Vertical => out,
        Orientation::Horizontal => out.transpose(),
    })
}

fn stitch_vertical(
    mut frames: Vec<Cow<'_, PixelBuffer>>,
    spec: &JoinSpec,
) -> StripJoinResult<PixelBuffer> {
    let width = reconcile_width(&frames, spec.force)?;

    if let Some(search) = spec.seam_search {
        let search = search.with_force(search.force || spec.force);
        for i in 1..frames.len() {
            let seam = find_optimal_seam(&frames[i - 1], &frames[i], &search);
            if seam.row > 0 {
                let piece = &frames[i];
                let trimmed = piece.crop(0, seam.row, piece.width(), piece.height() - seam.row)?;
                frames[i] = Cow::Owned(trimmed);
            }
        }
    }

    let overlap = spec.overlap.winning();
    let reverse = spec.overlap.reverse_wins();
    if let Some(piece) = frames.iter().find(|f| overlap >= f.height()) {
        return Err(StripJoinError::OverlapTooLarge {
            overlap,
            extent: piece.height(),
        });
    }

    let seams = frames.len() - 1;
    let total: usize = frames.iter().map(|f| f.height()).sum();
    let height = seams
        .checked_mul(spec.spacing)
        .and_then(|gaps| (total - seams * overlap).checked_add(gaps))
        .ok_or(StripJoinError::InvalidDimensions { width, height: total })?;
    let mut canvas = PixelBuffer::filled(width, height, spec.fill)?;

    let first = &frames[0];
    canvas.paste(first, center_offset(width, first.width()) as i64, 0);
    let mut end = first.height() as i64;

    for piece in frames.iter().skip(1) {
        let x = (center_offset(width, piece.width()) as i64).saturating_add(spec.offset);
        let spacing = spec.spacing as i64;
        let (content, start) = if reverse && overlap > 0 {
            let clipped = piece.crop(0, overlap, piece.width(), piece.height() - overlap)?;
            (Cow::Owned(clipped), end + spacing)
        } else {
            (Cow::Borrowed(&**piece), end - overlap as i64 + spacing)
        };

        if spec.spacing > 0 {
            canvas.fill_rect(0, start - spacing, width, spec.spacing, spec.fill);
        }
        canvas.paste(&content, x, start);
        end = start + content.height() as i64;
    }

    debug_assert_eq!(end, height as i64);
    Ok(canvas)
}

/// Returns the shared cross dimension, or the widest one under force-fit.
fn reconcile_width(frames: &[Cow<'_, PixelBuffer>], force: bool) -> StripJoinResult<usize> {
    let expected = frames[0].width();
    let mut widest = expected;
    for frame in frames.iter().skip(1) {
        if frame.width() != expected && !force {
            return Err(StripJoinError::DimensionMismatch {
                expected,
                got: frame.width(),
            });
        }
        widest = widest.max(frame.width());
    }
    Ok(widest)
}

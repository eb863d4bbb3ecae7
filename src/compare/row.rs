//! Whole-row Euclidean distance.

use crate::color::ColorModel;
use crate::image::{PixelBuffer, CHANNELS};
use crate::util::math::{center_offset, shifted_index};
use crate::util::{StripJoinError, StripJoinResult};

/// Mean per-pixel distance between `row_a` of `a` and `row_b` of `b`.
///
/// Column `x` of `a` is compared with column `x + offset` of `b`. Columns
/// whose partner falls outside `b` are skipped and do not count toward the
/// mean. Rows of different widths are rejected unless `force` is set, in
/// which case the narrower row is centered inside the wider one before the
/// offset is applied.
#[allow(clippy::too_many_arguments)]
pub fn row_distance(
    a: &PixelBuffer,
    row_a: usize,
    b: &PixelBuffer,
    row_b: usize,
    model: ColorModel,
    offset: i64,
    force: bool,
) -> StripJoinResult<f64> {
    let pixels_a = a.row(row_a).ok_or(StripJoinError::RowOutOfRange {
        row: row_a,
        height: a.height(),
    })?;
    let pixels_b = b.row(row_b).ok_or(StripJoinError::RowOutOfRange {
        row: row_b,
        height: b.height(),
    })?;

    let width_a = a.width();
    let width_b = b.width();
    if width_a != width_b && !force {
        return Err(StripJoinError::DimensionMismatch {
            expected: width_a,
            got: width_b,
        });
    }

    let centering = if width_a <= width_b {
        center_offset(width_b, width_a) as i64
    } else {
        -(center_offset(width_a, width_b) as i64)
    };
    // No column can line up once the shift leaves the i64 range.
    let shift = centering
        .checked_add(offset)
        .ok_or(StripJoinError::EmptyComparison)?;

    let mut sum = 0.0f64;
    let mut compared = 0usize;
    for x in 0..width_a {
        let Some(xb) = shifted_index(x, shift, width_b) else {
            continue;
        };
        let ia = x * CHANNELS;
        let ib = xb * CHANNELS;
        let pa = [pixels_a[ia], pixels_a[ia + 1], pixels_a[ia + 2]];
        let pb = [pixels_b[ib], pixels_b[ib + 1], pixels_b[ib + 2]];
        sum += model.pixel_distance(pa, pb);
        compared += 1;
    }

    if compared == 0 {
        return Err(StripJoinError::EmptyComparison);
    }
    Ok(sum / compared as f64)
}

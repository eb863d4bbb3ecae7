//! Block-averaged single-channel distance.
//!
//! A block is `block_size` columns wide and `block_size` rows tall. It
//! starts at its anchor column and extends rightward; blocks that run past
//! the right edge are truncated. A top block extends upward from its anchor
//! row and a bottom block extends downward. Leaving the image vertically is
//! an error, never a clamp.

use crate::color::ColorModel;
use crate::image::PixelBuffer;
use crate::util::math::shifted_index;
use crate::util::{StripJoinError, StripJoinResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reach {
    Up,
    Down,
}

/// Absolute difference between the block averages anchored at `anchor_a`
/// in `a` (a top block) and `anchor_b` in `b` (a bottom block).
///
/// Only the lowest selected channel of `model` is averaged.
pub fn block_distance(
    a: &PixelBuffer,
    anchor_a: (usize, usize),
    b: &PixelBuffer,
    anchor_b: (usize, usize),
    block_size: usize,
    model: ColorModel,
) -> StripJoinResult<f64> {
    let top = block_average(a, anchor_a, block_size, model, Reach::Up)?;
    let bottom = block_average(b, anchor_b, block_size, model, Reach::Down)?;
    Ok((top - bottom).abs())
}

/// Mean block distance along the seam between `top` and `bottom`.
///
/// Column `x` of the last row of `top` is paired with column `x + offset`
/// of the first row of `bottom`. Columns whose partner falls outside
/// `bottom` or whose blocks cannot be formed are skipped and excluded from
/// the mean.
pub fn block_edge_distance(
    top: &PixelBuffer,
    bottom: &PixelBuffer,
    block_size: usize,
    model: ColorModel,
    offset: i64,
) -> StripJoinResult<f64> {
    if block_size == 0 {
        return Err(StripJoinError::InvalidInput("block size must be positive"));
    }
    let width = top.width();
    if width != bottom.width() {
        return Err(StripJoinError::DimensionMismatch {
            expected: width,
            got: bottom.width(),
        });
    }

    let last = top.height() - 1;
    let mut sum = 0.0f64;
    let mut used = 0usize;
    for x in 0..width {
        let Some(xb) = shifted_index(x, offset, width) else {
            continue;
        };
        match block_distance(top, (x, last), bottom, (xb, 0), block_size, model) {
            Ok(dist) => {
                sum += dist;
                used += 1;
            }
            Err(err) if err.is_incomparable() => continue,
            Err(err) => return Err(err),
        }
    }

    if used == 0 {
        return Err(StripJoinError::EmptyComparison);
    }
    Ok(sum / used as f64)
}

fn block_average(
    img: &PixelBuffer,
    (x, y): (usize, usize),
    block_size: usize,
    model: ColorModel,
    reach: Reach,
) -> StripJoinResult<f64> {
    if block_size == 0 {
        return Err(StripJoinError::InvalidInput("block size must be positive"));
    }
    let out_of_range = StripJoinError::OutOfRange {
        x,
        y,
        width: img.width(),
        height: img.height(),
    };
    if x >= img.width() || y >= img.height() {
        return Err(out_of_range);
    }
    let y0 = match reach {
        Reach::Up => y.checked_sub(block_size - 1).ok_or(out_of_range.clone())?,
        Reach::Down => match y.checked_add(block_size) {
            Some(end) if end <= img.height() => y,
            _ => return Err(out_of_range),
        },
    };

    let x_end = x.saturating_add(block_size).min(img.width());
    let mut sum = 0u64;
    for row in y0..y0 + block_size {
        for col in x..x_end {
            if let Some(px) = img.pixel(col, row) {
                sum += u64::from(model.primary_component(px));
            }
        }
    }
    let count = (x_end - x) * block_size;
    Ok(sum as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::{block_average, Reach};
    use crate::color::ColorModel;
    use crate::image::PixelBuffer;
    use crate::StripJoinError;

    #[test]
    fn top_block_reaches_upward_and_truncates_right() {
        let img = PixelBuffer::from_fn(4, 4, |x, y| [(10 * y + x) as u8, 0, 0]).unwrap();
        // columns 2..4, rows 2..=3
        let avg = block_average(&img, (2, 3), 2, ColorModel::RED, Reach::Up).unwrap();
        let expected = (22.0 + 23.0 + 32.0 + 33.0) / 4.0;
        assert!((avg - expected).abs() < 1e-9);

        let avg = block_average(&img, (3, 0), 2, ColorModel::RED, Reach::Down).unwrap();
        assert!((avg - (3.0 + 13.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn anchor_past_width_is_out_of_range() {
        let img = PixelBuffer::filled(3, 3, [5, 5, 5]).unwrap();
        let err = block_average(&img, (3, 0), 1, ColorModel::RED, Reach::Down).unwrap_err();
        assert_eq!(
            err,
            StripJoinError::OutOfRange {
                x: 3,
                y: 0,
                width: 3,
                height: 3,
            }
        );
    }

    #[test]
    fn vertical_overrun_is_not_clamped() {
        let img = PixelBuffer::filled(3, 3, [5, 5, 5]).unwrap();
        assert!(block_average(&img, (0, 1), 3, ColorModel::RED, Reach::Up).is_err());
        assert!(block_average(&img, (0, 1), 3, ColorModel::RED, Reach::Down).is_err());
        assert!(block_average(&img, (0, 2), 3, ColorModel::RED, Reach::Up).is_ok());
    }

    #[test]
    fn huge_block_size_is_out_of_range() {
        let img = PixelBuffer::filled(3, 3, [5, 5, 5]).unwrap();
        let err = block_average(&img, (1, 1), usize::MAX, ColorModel::RED, Reach::Down);
        assert!(matches!(err, Err(StripJoinError::OutOfRange { x: 1, y: 1, .. })));
        let err = block_average(&img, (1, 1), usize::MAX, ColorModel::RED, Reach::Up);
        assert!(matches!(err, Err(StripJoinError::OutOfRange { .. })));
    }
}

//! Owned RGB rasters and the canvas operations stitching needs.
//!
//! `PixelBuffer` stores three bytes per pixel in row-major order with no row
//! padding. Comparison code only reads from buffers; compositing writes into
//! a canvas through [`PixelBuffer::paste`] and [`PixelBuffer::fill_rect`],
//! both of which clip against the canvas instead of failing.

use crate::util::{StripJoinError, StripJoinResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Opaque black, the default canvas and spacing fill.
pub const BLACK: [u8; 3] = [0, 0, 0];

/// Owned, contiguous RGB8 image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Wraps an interleaved RGB8 buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> StripJoinResult<Self> {
        let needed = required_len(width, height)?;
        if data.len() < needed {
            return Err(StripJoinError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(StripJoinError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a buffer with every pixel set to `rgb`.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> StripJoinResult<Self> {
        let needed = required_len(width, height)?;
        let mut data = Vec::with_capacity(needed);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> StripJoinResult<Self>
    where
        F: FnMut(usize, usize) -> [u8; 3],
    {
        let needed = required_len(width, height)?;
        let mut data = Vec::with_capacity(needed);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns the interleaved RGB bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Returns row `y` as `width * 3` interleaved bytes.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width * CHANNELS;
        let start = y * stride;
        self.data.get(start..start + stride)
    }

    /// Copies `src` onto this buffer with its top-left corner at `(x, y)`.
    ///
    /// Coordinates may be negative or run past the edges; only the part of
    /// `src` that lands on the canvas is written.
    pub fn paste(&mut self, src: &PixelBuffer, x: i64, y: i64) {
        let Some((dst_x0, src_x0, span_w)) = clip_span(x, src.width, self.width) else {
            return;
        };
        let Some((dst_y0, src_y0, span_h)) = clip_span(y, src.height, self.height) else {
            return;
        };

        let src_stride = src.width * CHANNELS;
        let dst_stride = self.width * CHANNELS;
        let len = span_w * CHANNELS;
        for row in 0..span_h {
            let s = (src_y0 + row) * src_stride + src_x0 * CHANNELS;
            let d = (dst_y0 + row) * dst_stride + dst_x0 * CHANNELS;
            self.data[d..d + len].copy_from_slice(&src.data[s..s + len]);
        }
    }

    /// Fills a rectangle with `rgb`, clipping it to the buffer.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: usize, height: usize, rgb: [u8; 3]) {
        let Some((x0, _, span_w)) = clip_span(x, width, self.width) else {
            return;
        };
        let Some((y0, _, span_h)) = clip_span(y, height, self.height) else {
            return;
        };

        let stride = self.width * CHANNELS;
        for row in y0..y0 + span_h {
            let start = row * stride + x0 * CHANNELS;
            for px in self.data[start..start + span_w * CHANNELS].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(&rgb);
            }
        }
    }

    /// Returns a copy of the `width x height` region starting at `(x, y)`.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> StripJoinResult<Self> {
        if width == 0 || height == 0 {
            return Err(StripJoinError::InvalidDimensions { width, height });
        }
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(StripJoinError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let src_stride = self.width * CHANNELS;
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for row in y..y + height {
            let start = row * src_stride + x * CHANNELS;
            data.extend_from_slice(&self.data[start..start + width * CHANNELS]);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the buffer mirrored across its main diagonal.
    ///
    /// Horizontal joins reuse the row-oriented seam search on transposed
    /// fragments.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for x in 0..self.width {
            for y in 0..self.height {
                let idx = (y * self.width + x) * CHANNELS;
                data.extend_from_slice(&self.data[idx..idx + CHANNELS]);
            }
        }
        Self {
            data,
            width: self.height,
            height: self.width,
        }
    }
}

fn required_len(width: usize, height: usize) -> StripJoinResult<usize> {
    if width == 0 || height == 0 {
        return Err(StripJoinError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or(StripJoinError::InvalidDimensions { width, height })
}

/// Clips a 1D span of `len` starting at `start` against `[0, limit)`.
///
/// Returns `(dst_start, src_skip, visible_len)` or `None` when nothing is
/// visible.
fn clip_span(start: i64, len: usize, limit: usize) -> Option<(usize, usize, usize)> {
    let end = start.saturating_add(i64::try_from(len).unwrap_or(i64::MAX));
    let lo = start.max(0);
    let hi = end.min(i64::try_from(limit).unwrap_or(i64::MAX));
    if lo >= hi {
        return None;
    }
    let skip = usize::try_from(lo.abs_diff(start)).ok()?;
    Some((lo as usize, skip, (hi - lo) as usize))
}

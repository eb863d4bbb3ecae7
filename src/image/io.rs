//! Loading and saving fragments via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Loading applies the
//! EXIF orientation reported by the decoder, so comparison and stitching
//! never reason about rotation or mirroring.

use crate::image::PixelBuffer;
use crate::util::{StripJoinError, StripJoinResult};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default JPEG quality for stitched output.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Creates an owned buffer from an RGB8 image.
pub fn buffer_from_rgb_image(img: RgbImage) -> StripJoinResult<PixelBuffer> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    PixelBuffer::new(img.into_raw(), width, height)
}

/// Creates an owned buffer from any decoded image, dropping alpha.
pub fn buffer_from_dynamic_image(img: DynamicImage) -> StripJoinResult<PixelBuffer> {
    buffer_from_rgb_image(img.into_rgb8())
}

/// Converts a buffer back into an `image` RGB8 image.
pub fn rgb_image_from_buffer(buf: &PixelBuffer) -> StripJoinResult<RgbImage> {
    let width = u32::try_from(buf.width()).map_err(|_| StripJoinError::InvalidDimensions {
        width: buf.width(),
        height: buf.height(),
    })?;
    let height = u32::try_from(buf.height()).map_err(|_| StripJoinError::InvalidDimensions {
        width: buf.width(),
        height: buf.height(),
    })?;
    RgbImage::from_raw(width, height, buf.as_raw().to_vec()).ok_or(
        StripJoinError::BufferTooSmall {
            needed: buf.width() * buf.height() * 3,
            got: buf.as_raw().len(),
        },
    )
}

/// Loads a fragment from disk with its camera orientation applied.
pub fn load_oriented<P: AsRef<Path>>(path: P) -> StripJoinResult<PixelBuffer> {
    let path = path.as_ref();
    let decode_err = |reason: String| StripJoinError::Decode {
        name: path.display().to_string(),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|err| decode_err(err.to_string()))?
        .with_guessed_format()
        .map_err(|err| decode_err(err.to_string()))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|err| decode_err(err.to_string()))?;
    let orientation = decoder
        .orientation()
        .map_err(|err| decode_err(err.to_string()))?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(|err| decode_err(err.to_string()))?;
    img.apply_orientation(orientation);
    buffer_from_dynamic_image(img)
}

/// Encodes a buffer as JPEG and writes it to `path`.
pub fn save_jpeg<P: AsRef<Path>>(buf: &PixelBuffer, path: P, quality: u8) -> StripJoinResult<()> {
    let io_err = |reason: String| StripJoinError::ImageIo { reason };
    let img = rgb_image_from_buffer(buf)?;
    let file = File::create(path.as_ref()).map_err(|err| io_err(err.to_string()))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    img.write_with_encoder(encoder)
        .map_err(|err| io_err(err.to_string()))?;
    writer.flush().map_err(|err| io_err(err.to_string()))
}

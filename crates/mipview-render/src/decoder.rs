//! Image decoding into premultiplied packed pixels.
//!
//! The decoder hands any format the `image` crate understands back as a
//! top-down [`PixelBuffer`] with premultiplied alpha. No color management or
//! orientation correction is applied beyond what the `image` crate does.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits, RgbaImage};
use mipview_core::logging::{PerfSpan, span_names};

use crate::error::{DecodeError, RenderError, RenderResult};
use crate::pixel_buffer::{PixelBuffer, pack_argb};
use crate::types::Size;

/// Largest allocation a single decode may make, in bytes.
///
/// Images whose header promises more than this as RGBA8 are rejected as
/// [`DecodeError::TooLarge`] before any pixel data is read.
pub const MAX_DECODE_BYTES: u64 = 512 * 1024 * 1024;

/// Decode an image file.
///
/// The format is taken from the file contents, falling back to the
/// extension. On failure nothing is returned; there is never a partially
/// decoded buffer.
pub fn decode_file(path: impl AsRef<Path>) -> RenderResult<PixelBuffer> {
    let path = path.as_ref();
    let _span = PerfSpan::new(span_names::DECODE);

    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let buffer = decode_with_limits(&bytes, ImageFormat::from_path(path).ok(), path)?;

    tracing::debug!(
        target: "mipview_render::decode",
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "decoded image"
    );
    Ok(buffer)
}

/// Decode an image held in memory.
pub fn decode_bytes(bytes: &[u8]) -> RenderResult<PixelBuffer> {
    let _span = PerfSpan::new(span_names::DECODE);
    decode_with_limits(bytes, None, Path::new("<memory>"))
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_DECODE_BYTES);
    limits
}

fn open_reader<'a>(
    bytes: &'a [u8],
    format: Option<ImageFormat>,
    path: &Path,
) -> RenderResult<ImageReader<Cursor<&'a [u8]>>> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    if let Some(format) = format {
        reader.set_format(format);
    }
    let reader = reader.with_guessed_format().map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(reader)
}

fn decode_with_limits(
    bytes: &[u8],
    format: Option<ImageFormat>,
    path: &Path,
) -> RenderResult<PixelBuffer> {
    // The header alone is read without limits so oversized images can be
    // reported with their dimensions.
    let mut header = open_reader(bytes, format, path)?;
    header.no_limits();
    let (width, height) = header
        .into_dimensions()
        .map_err(|e| map_image_error(e, path, None))?;
    if u64::from(width) * u64::from(height) * 4 > MAX_DECODE_BYTES {
        return Err(DecodeError::TooLarge { width, height }.into());
    }

    let mut decoder = open_reader(bytes, format, path)?;
    decoder.limits(decode_limits());
    let image = decoder
        .decode()
        .map_err(|e| map_image_error(e, path, Some((width, height))))?;
    premultiply(image)
}

fn map_image_error(err: ImageError, path: &Path, dimensions: Option<(u32, u32)>) -> RenderError {
    let decode = match err {
        ImageError::IoError(source) => DecodeError::Io {
            path: path.to_path_buf(),
            source,
        },
        ImageError::Unsupported(e) => DecodeError::Unsupported(e.to_string()),
        ImageError::Limits(e) => match dimensions {
            Some((width, height)) => DecodeError::TooLarge { width, height },
            None => DecodeError::Corrupt(e.to_string()),
        },
        other => DecodeError::Corrupt(other.to_string()),
    };
    RenderError::Decode(decode)
}

/// Premultiply a single 8-bit channel by alpha, rounding to nearest.
#[inline]
pub fn premultiply_channel(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

/// Convert any decoded image to premultiplied packed pixels.
fn premultiply(image: DynamicImage) -> RenderResult<PixelBuffer> {
    let rgba: RgbaImage = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Corrupt(format!("image has no pixels ({width}x{height})")).into());
    }
    if Size::new(width, height).area().is_none() {
        return Err(DecodeError::TooLarge { width, height }.into());
    }

    let mut buffer = PixelBuffer::try_new(width, height)?;
    for (dst, src) in buffer.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = pack_argb(
            a,
            premultiply_channel(r, a),
            premultiply_channel(g, a),
            premultiply_channel(b, a),
        );
    }
    Ok(buffer)
}

//! Background baking.
//!
//! Baking blends every premultiplied pixel against an opaque background color
//! and marks it opaque:
//!
//! ```text
//! c' = min(255, c + bg_c * (255 - a) / 255)     for c in r, g, b
//! a' = 255
//! ```
//!
//! The division truncates. Once a buffer is baked the formula is a no-op, but
//! callers bake exactly once per freshly decoded or freshly downsampled buffer.
//!
//! Two implementations exist: [`bake_scalar`] is the reference, and
//! [`bake_vectorized`] packs the channels of each pixel into one machine word
//! and splits large buffers across threads. Both produce bit-identical output.

use rayon::prelude::*;

use crate::pixel_buffer::{PixelBuffer, pack_argb, unpack_argb};
use crate::swar;
use crate::types::Rgb;

/// Which implementation of the pixel kernels to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KernelPath {
    /// Straightforward per-channel arithmetic. The reference for correctness.
    Scalar,
    /// Packed-lane arithmetic, parallelised across threads for large buffers.
    #[default]
    Vectorized,
}

/// Buffers with fewer pixels than this are processed on the calling thread.
pub(crate) const PARALLEL_THRESHOLD: usize = 64 * 1024;
/// Pixels handed to each parallel task.
const PARALLEL_CHUNK: usize = 16 * 1024;

/// Blend one channel against the background using `alpha`.
#[inline]
pub fn bake_channel(c: u8, bg: u8, alpha: u8) -> u8 {
    let residual = bg as u32 * (255 - alpha as u32) / 255;
    (c as u32 + residual).min(255) as u8
}

/// Bake a single packed pixel.
#[inline]
pub fn bake_pixel(pixel: u32, background: Rgb) -> u32 {
    let [a, r, g, b] = unpack_argb(pixel);
    pack_argb(
        255,
        bake_channel(r, background.r, a),
        bake_channel(g, background.g, a),
        bake_channel(b, background.b, a),
    )
}

/// Reference implementation: bake every pixel in place, one channel at a time.
pub fn bake_scalar(pixels: &mut [u32], background: Rgb) {
    for pixel in pixels.iter_mut() {
        *pixel = bake_pixel(*pixel, background);
    }
}

/// Packed-lane implementation of [`bake_scalar`].
pub fn bake_vectorized(pixels: &mut [u32], background: Rgb) {
    let bg_lanes = swar::widen(background.to_u32());

    let bake_run = |run: &mut [u32]| {
        for pixel in run.iter_mut() {
            if *pixel >> 24 == 0xFF {
                continue;
            }
            *pixel = swar::narrow(swar::bake_lanes(swar::widen(*pixel), bg_lanes));
        }
    };

    if pixels.len() >= PARALLEL_THRESHOLD {
        pixels.par_chunks_mut(PARALLEL_CHUNK).for_each(bake_run);
    } else {
        bake_run(pixels);
    }
}

/// Bake raw pixels with the selected kernel.
pub fn bake_pixels(pixels: &mut [u32], background: Rgb, kernel: KernelPath) {
    match kernel {
        KernelPath::Scalar => bake_scalar(pixels, background),
        KernelPath::Vectorized => bake_vectorized(pixels, background),
    }
}

/// Bake a whole buffer in place. Afterwards the buffer is fully opaque.
pub fn bake(buffer: &mut PixelBuffer, background: Rgb, kernel: KernelPath) {
    tracing::trace!(
        target: "mipview_render::compositor",
        width = buffer.width(),
        height = buffer.height(),
        ?kernel,
        "baking background"
    );
    bake_pixels(buffer.pixels_mut(), background, kernel);
}

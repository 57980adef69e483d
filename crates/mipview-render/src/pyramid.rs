//! Mip pyramid construction.
//!
//! A [`Pyramid`] holds the baked full-resolution image (level 0) followed by
//! `L` minified levels. Level `i` is level `i - 1` halved in each dimension
//! (rounding up) with a 2x2 box filter, so rounding error compounds from level
//! to level exactly as a chain of half-scale reductions would.
//!
//! # Edge handling
//!
//! When a level has an odd width or height, the last destination column/row
//! only has one or two source pixels underneath it. Missing sources count as
//! fully transparent black, the sum is still divided by four, and the result
//! is then baked against the background. With premultiplied sources this
//! makes the missing pixels look like the flat background rather than a copy
//! of the nearest edge pixel.
//!
//! A pyramid is immutable once built. Reloading an image builds a brand-new
//! pyramid and swaps it in whole; a failure at any level drops every level
//! built so far and leaves the caller's current pyramid untouched.

use mipview_core::logging::{PerfSpan, span_names};
use rayon::prelude::*;

use crate::compositor::{self, KernelPath, PARALLEL_THRESHOLD, bake_channel};
use crate::error::{RenderError, RenderResult};
use crate::pixel_buffer::{PixelBuffer, pack_argb, unpack_argb};
use crate::swar;
use crate::types::{Rgb, Size};

/// Default number of minified levels.
pub const DEFAULT_MIP_LEVELS: u32 = 5;

/// Reference 2x2 box-filter downsample of a single pixel.
fn downsample_pixel_scalar(src: &PixelBuffer, dx: u32, dy: u32, background: Rgb) -> u32 {
    let mut sum = [0u32; 4];
    for sy in dy * 2..dy * 2 + 2 {
        for sx in dx * 2..dx * 2 + 2 {
            if let Some(pixel) = src.pixel(sx, sy) {
                for (total, channel) in sum.iter_mut().zip(unpack_argb(pixel)) {
                    *total += channel as u32;
                }
            }
        }
    }

    let [a, r, g, b] = sum.map(|total| (total / 4) as u8);
    pack_argb(
        255,
        bake_channel(r, background.r, a),
        bake_channel(g, background.g, a),
        bake_channel(b, background.b, a),
    )
}

/// Reference implementation of one reduction step into a preallocated level.
pub fn downsample_into_scalar(src: &PixelBuffer, dst: &mut PixelBuffer, background: Rgb) {
    debug_assert_eq!(dst.size(), src.size().half_ceil());
    for dy in 0..dst.height() {
        for dx in 0..dst.width() {
            dst.set_pixel(dx, dy, downsample_pixel_scalar(src, dx, dy, background));
        }
    }
}

/// Reduce one destination row from one or two source rows.
fn downsample_row_lanes(top: &[u32], bottom: Option<&[u32]>, out: &mut [u32], bg_lanes: u64) {
    for (dx, dst) in out.iter_mut().enumerate() {
        let sx = dx * 2;
        let mut sum = swar::widen(top[sx]);
        if let Some(&right) = top.get(sx + 1) {
            sum += swar::widen(right);
        }
        if let Some(row) = bottom {
            sum += swar::widen(row[sx]);
            if let Some(&right) = row.get(sx + 1) {
                sum += swar::widen(right);
            }
        }
        let average = (sum >> 2) & swar::LANE_LOW;
        *dst = swar::narrow(swar::bake_lanes(average, bg_lanes));
    }
}

/// Packed-lane implementation of [`downsample_into_scalar`].
pub fn downsample_into_vectorized(src: &PixelBuffer, dst: &mut PixelBuffer, background: Rgb) {
    debug_assert_eq!(dst.size(), src.size().half_ceil());
    let bg_lanes = swar::widen(background.to_u32());
    let src_height = src.height();
    let dst_width = dst.width() as usize;
    let parallel = dst.pixels().len() >= PARALLEL_THRESHOLD;

    let reduce_row = |(dy, out): (usize, &mut [u32])| {
        let sy = dy as u32 * 2;
        let top = src.row(sy);
        let bottom = (sy + 1 < src_height).then(|| src.row(sy + 1));
        downsample_row_lanes(top, bottom, out, bg_lanes);
    };

    if parallel {
        dst.pixels_mut()
            .par_chunks_mut(dst_width)
            .enumerate()
            .for_each(reduce_row);
    } else {
        dst.pixels_mut()
            .chunks_mut(dst_width)
            .enumerate()
            .for_each(reduce_row);
    }
}

/// Reduce `src` into `dst` with the selected kernel.
pub fn downsample_into(src: &PixelBuffer, dst: &mut PixelBuffer, background: Rgb, kernel: KernelPath) {
    match kernel {
        KernelPath::Scalar => downsample_into_scalar(src, dst, background),
        KernelPath::Vectorized => downsample_into_vectorized(src, dst, background),
    }
}

/// Produce the next pyramid level from `src`.
///
/// The result is `ceil(w / 2) x ceil(h / 2)` and fully opaque.
pub fn downsample(src: &PixelBuffer, background: Rgb, kernel: KernelPath) -> RenderResult<PixelBuffer> {
    let size = src.size().half_ceil();
    let mut dst = PixelBuffer::try_new(size.width, size.height)?;
    downsample_into(src, &mut dst, background, kernel);
    Ok(dst)
}

/// A full-resolution image plus its pre-baked minified levels.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<PixelBuffer>,
    background: Rgb,
}

impl Pyramid {
    /// Build a pyramid from a freshly decoded (premultiplied, unbaked) image.
    ///
    /// The image is baked against `background` to become level 0, then
    /// `minify_levels` reductions are derived, each from the previous level.
    pub fn build(
        decoded: PixelBuffer,
        background: Rgb,
        minify_levels: u32,
        kernel: KernelPath,
    ) -> RenderResult<Self> {
        Self::build_with(decoded, background, minify_levels, kernel, |size| {
            PixelBuffer::try_new(size.width, size.height)
        })
    }

    /// [`build`](Self::build) with a caller-supplied level allocator.
    pub(crate) fn build_with<A>(
        mut decoded: PixelBuffer,
        background: Rgb,
        minify_levels: u32,
        kernel: KernelPath,
        mut allocate: A,
    ) -> RenderResult<Self>
    where
        A: FnMut(Size) -> RenderResult<PixelBuffer>,
    {
        let _span = PerfSpan::new(span_names::PYRAMID_BUILD);
        let base_size = decoded.size();

        let mut levels = Vec::new();
        levels
            .try_reserve_exact(minify_levels as usize + 1)
            .map_err(|_| RenderError::Allocation {
                width: base_size.width,
                height: base_size.height,
            })?;

        compositor::bake(&mut decoded, background, kernel);
        debug_assert!(decoded.is_opaque());
        levels.push(decoded);

        for index in 1..=minify_levels {
            let Some(previous) = levels.last() else {
                break;
            };
            let size = previous.size().half_ceil();
            let mut next = match allocate(size) {
                Ok(buffer) => buffer,
                Err(err) => {
                    tracing::warn!(
                        target: "mipview_render::pyramid",
                        level = index,
                        %size,
                        error = %err,
                        "pyramid level allocation failed, discarding partial pyramid"
                    );
                    return Err(err);
                }
            };
            downsample_into(previous, &mut next, background, kernel);
            debug_assert!(next.is_opaque());
            levels.push(next);
        }

        tracing::debug!(
            target: "mipview_render::pyramid",
            %base_size,
            levels = levels.len(),
            ?kernel,
            "built pyramid"
        );

        Ok(Self { levels, background })
    }

    /// The full-resolution, baked image.
    #[inline]
    pub fn base(&self) -> &PixelBuffer {
        &self.levels[0]
    }

    /// Size of the full-resolution image.
    #[inline]
    pub fn image_size(&self) -> Size {
        self.base().size()
    }

    /// Level `index` (0 = full resolution).
    #[inline]
    pub fn level(&self, index: usize) -> Option<&PixelBuffer> {
        self.levels.get(index)
    }

    /// All levels, full resolution first.
    #[inline]
    pub fn levels(&self) -> &[PixelBuffer] {
        &self.levels
    }

    /// Number of minified levels (`L`); the pyramid holds `L + 1` buffers.
    #[inline]
    pub fn minify_levels(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    /// The background baked into every level.
    #[inline]
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Which level to draw at `zoom`, and the integer magnification to draw it at.
    ///
    /// Non-negative zoom draws level 0 magnified by `2^zoom`; negative zoom
    /// draws level `-zoom` at 1:1.
    pub fn level_for_zoom(&self, zoom: i32) -> (usize, u32) {
        if zoom >= 0 {
            (0, 1u32 << zoom.min(30))
        } else {
            let level = (zoom.unsigned_abs()).min(self.minify_levels()) as usize;
            (level, 1)
        }
    }

    /// On-screen size of the image at `zoom`.
    pub fn scaled_size(&self, zoom: i32) -> (i64, i64) {
        let (level, scale) = self.level_for_zoom(zoom);
        let size = self.levels[level].size();
        (
            size.width as i64 * scale as i64,
            size.height as i64 * scale as i64,
        )
    }
}

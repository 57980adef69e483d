//! CPU-side packed pixel buffers.
//!
//! A [`PixelBuffer`] is a top-down, row-major array of 32-bit pixels packed as
//! `0xAARRGGBB` (alpha in the high byte). Color channels are premultiplied by
//! alpha until the buffer has been baked against a background, after which
//! every pixel is opaque.
//!
//! All constructors allocate fallibly: a buffer that cannot be allocated is
//! reported as [`RenderError::Allocation`] instead of aborting the process.

use image::RgbaImage;

use crate::error::{RenderError, RenderResult};
use crate::types::Size;

/// Mask selecting the alpha byte of a packed pixel.
pub const ALPHA_MASK: u32 = 0xFF00_0000;

/// Pack four 8-bit channels into a pixel.
#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split a pixel into its `[a, r, g, b]` channels.
#[inline]
pub const fn unpack_argb(pixel: u32) -> [u8; 4] {
    [
        (pixel >> 24) as u8,
        (pixel >> 16) as u8,
        (pixel >> 8) as u8,
        pixel as u8,
    ]
}

/// A packed 32-bit pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Create a fully transparent buffer with the specified dimensions.
    pub fn try_new(width: u32, height: u32) -> RenderResult<Self> {
        Self::try_filled(width, height, 0)
    }

    /// Create a buffer with every pixel set to `pixel`.
    pub fn try_filled(width: u32, height: u32, pixel: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let count = Size::new(width, height)
            .area()
            .ok_or(RenderError::Allocation { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| RenderError::Allocation { width, height })?;
        pixels.resize(count, pixel);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap existing packed pixels.
    ///
    /// `pixels` must hold exactly `width * height` entries in row-major order.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let expected = Size::new(width, height)
            .area()
            .ok_or(RenderError::Allocation { width, height })?;
        if pixels.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    /// Get the width of the buffer in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height of the buffer in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the dimensions as a `Size`.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check whether every pixel has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.pixels.iter().all(|&p| p & ALPHA_MASK == ALPHA_MASK)
    }

    // ========================================================================
    // PIXEL ACCESS
    // ========================================================================

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable access to all pixels in row-major order.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Get the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Set the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: u32) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = pixel;
        }
    }

    /// One row of pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// One mutable row of pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    // ========================================================================
    // CONVERSION
    // ========================================================================

    /// Copy the buffer into an `image::RgbaImage`.
    ///
    /// Channels are written as stored; for a baked buffer that is the final
    /// on-screen color.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (dst, &src) in out.pixels_mut().zip(self.pixels.iter()) {
            let [a, r, g, b] = unpack_argb(src);
            dst.0 = [r, g, b, a];
        }
        out
    }
}

//! The drawing seam between frame planning and a concrete output surface.
//!
//! [`FrameRenderer`](crate::FrameRenderer) decides *what* to draw; a
//! [`Painter`] decides *how*. The only primitives the canvas needs are a
//! solid fill, an integer nearest-neighbour blit and a status line.

use crate::pixel_buffer::PixelBuffer;
use crate::types::{Point, Rect, Rgb, Size};

/// Statistics from a painted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of solid fills submitted.
    pub fills: u32,
    /// Number of image blits submitted.
    pub blits: u32,
    /// Number of surface pixels overwritten.
    pub pixels_written: u64,
}

/// A target that frames can be painted onto.
///
/// All rectangles are in viewport pixels. Implementations clip every
/// operation to their own bounds.
pub trait Painter {
    /// Size of the surface in pixels.
    fn viewport_size(&self) -> Size;

    /// Begin a new frame. Nothing is cleared; only the planned regions are
    /// repainted.
    fn begin_frame(&mut self) {}

    /// End the current frame.
    ///
    /// Returns statistics about the operations painted since
    /// [`begin_frame`](Self::begin_frame).
    fn end_frame(&mut self) -> FrameStats {
        FrameStats::default()
    }

    /// Fill `rect` with an opaque color.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Copy `src_rect` of `source` into `dest_rect`, scaling with nearest
    /// neighbour sampling. Only pixels inside `clip` are written.
    fn blit_scaled(&mut self, source: &PixelBuffer, src_rect: Rect, dest_rect: Rect, clip: Rect);

    /// Draw a single line of text centered on `center`.
    fn draw_status_text(&mut self, text: &str, center: Point, color: Rgb);
}

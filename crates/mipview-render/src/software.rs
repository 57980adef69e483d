//! CPU framebuffer implementing [`Painter`].
//!
//! [`SoftwareSurface`] paints into a [`PixelBuffer`] the size of the viewport.
//! It is what headless hosts and tests draw into; a windowing host copies the
//! buffer to its native surface after each frame.
//!
//! Text is not rasterised. The surface records the last status line it was
//! asked to draw so the host can render it with its own font stack.

use image::RgbaImage;
use tracing::debug;

use crate::error::RenderResult;
use crate::painter::{FrameStats, Painter};
use crate::pixel_buffer::PixelBuffer;
use crate::types::{Point, Rect, Rgb, Size};

/// A status line recorded by [`SoftwareSurface::draw_status_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    /// The message.
    pub text: String,
    /// Where the text is centered, in viewport pixels.
    pub center: Point,
    /// Text color.
    pub color: Rgb,
}

/// An in-memory render target.
///
/// # Example
///
/// ```
/// use mipview_render::{Painter, Rect, Rgb, Size, SoftwareSurface};
///
/// let mut surface = SoftwareSurface::new(Size::new(64, 48)).unwrap();
/// surface.begin_frame();
/// surface.fill_rect(Rect::new(0, 0, 64, 48), Rgb::DARK_GRAY);
/// let stats = surface.end_frame();
///
/// assert_eq!(stats.fills, 1);
/// assert_eq!(surface.pixel(10, 10), Some(0xFF40_4040));
/// ```
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    buffer: PixelBuffer,
    stats: FrameStats,
    status: Option<StatusText>,
}

impl SoftwareSurface {
    /// Create a surface of the given size, initially opaque black.
    pub fn new(size: Size) -> RenderResult<Self> {
        let buffer = PixelBuffer::try_filled(size.width, size.height, Rgb::BLACK.to_pixel())?;
        debug!(target: "mipview_render::renderer", %size, "created software surface");
        Ok(Self {
            buffer,
            stats: FrameStats::default(),
            status: None,
        })
    }

    /// Resize the surface. The contents are reset to opaque black.
    ///
    /// On failure the surface keeps its previous size and contents.
    pub fn resize(&mut self, size: Size) -> RenderResult<()> {
        if size == self.buffer.size() {
            return Ok(());
        }
        self.buffer = PixelBuffer::try_filled(size.width, size.height, Rgb::BLACK.to_pixel())?;
        self.status = None;
        debug!(target: "mipview_render::renderer", %size, "resized software surface");
        Ok(())
    }

    /// The framebuffer.
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Read one pixel of the framebuffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.buffer.pixel(x, y)
    }

    /// The last status line drawn, if the most recent frame drew one.
    pub fn status_text(&self) -> Option<&StatusText> {
        self.status.as_ref()
    }

    /// Copy the framebuffer into an `image::RgbaImage`, e.g. for saving.
    pub fn to_rgba_image(&self) -> RgbaImage {
        self.buffer.to_rgba_image()
    }

    fn bounds(&self) -> Rect {
        Rect::from_size(self.buffer.size())
    }
}

impl Painter for SoftwareSurface {
    fn viewport_size(&self) -> Size {
        self.buffer.size()
    }

    fn begin_frame(&mut self) {
        self.stats = FrameStats::default();
        self.status = None;
    }

    fn end_frame(&mut self) -> FrameStats {
        std::mem::take(&mut self.stats)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let Some(target) = rect.intersect(&self.bounds()) else {
            return;
        };
        let pixel = color.to_pixel();
        let (left, right) = (target.left() as usize, target.right() as usize);
        for y in target.top()..target.bottom() {
            self.buffer.row_mut(y as u32)[left..right].fill(pixel);
        }
        self.stats.fills += 1;
        self.stats.pixels_written += target.area();
    }

    fn blit_scaled(&mut self, source: &PixelBuffer, src_rect: Rect, dest_rect: Rect, clip: Rect) {
        if src_rect.is_empty() || dest_rect.is_empty() {
            return;
        }
        let Some(target) = dest_rect
            .intersect(&clip)
            .and_then(|r| r.intersect(&self.bounds()))
        else {
            return;
        };

        // Nearest neighbour: dest offset * src extent / dest extent.
        let sample = |offset: i32, src_origin: i32, src_extent: i32, dest_extent: i32| -> i64 {
            src_origin as i64 + offset as i64 * src_extent as i64 / dest_extent as i64
        };

        let mut written = 0u64;
        for y in target.top()..target.bottom() {
            let sy = sample(y - dest_rect.y, src_rect.y, src_rect.height, dest_rect.height);
            let Ok(sy) = u32::try_from(sy) else {
                continue;
            };
            if sy >= source.height() {
                continue;
            }
            let src_row = source.row(sy);
            let out = self.buffer.row_mut(y as u32);
            for x in target.left()..target.right() {
                let sx = sample(x - dest_rect.x, src_rect.x, src_rect.width, dest_rect.width);
                if let Some(&pixel) = usize::try_from(sx).ok().and_then(|sx| src_row.get(sx)) {
                    out[x as usize] = pixel;
                    written += 1;
                }
            }
        }

        self.stats.blits += 1;
        self.stats.pixels_written += written;
    }

    fn draw_status_text(&mut self, text: &str, center: Point, color: Rgb) {
        self.status = Some(StatusText {
            text: text.to_owned(),
            center,
            color,
        });
    }
}

//! Frame planning and execution.
//!
//! Painting a frame is split in two. [`FrameRenderer::plan`] is a pure
//! function from the scene, the viewport size and the dirty rectangle to a
//! [`FramePlan`]: which pyramid level to draw, at which integer scale, from
//! which source rectangle to which destination rectangle, and which parts of
//! the dirty rectangle still need the flat background. [`FrameRenderer::render`]
//! then replays the plan on any [`Painter`].
//!
//! # Level selection
//!
//! At zoom `z >= 0` the full-resolution level is magnified by `2^z` with
//! nearest-neighbour sampling. At `z < 0` pyramid level `-z` is drawn 1:1;
//! it is already filtered, so no runtime minification happens.
//!
//! # Source clipping
//!
//! The scaled image can be far larger than anything `i32` can address (a
//! large image at high zoom). The planner therefore works in `i64`, clips the
//! image to the dirty rectangle first, and derives the smallest source
//! rectangle covering what is visible. The destination rectangle is that
//! source rectangle scaled back up, so it overhangs the visible area by less
//! than one source pixel on each side.

use mipview_core::logging::{PerfSpan, span_names};

use crate::painter::{FrameStats, Painter};
use crate::pyramid::Pyramid;
use crate::types::{Point, Rect, Rgb, Size, clamp_to_i32};

/// Zoom and pan of the image relative to the viewport.
///
/// `(tx, ty)` is the viewport position of the image's top-left corner in
/// destination pixels. The image is drawn at `2^zoom` of its full size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewTransform {
    /// Zoom exponent.
    pub zoom: i32,
    /// Horizontal pan offset.
    pub tx: i32,
    /// Vertical pan offset.
    pub ty: i32,
}

impl ViewTransform {
    /// Create a new transform.
    #[inline]
    pub const fn new(zoom: i32, tx: i32, ty: i32) -> Self {
        Self { zoom, tx, ty }
    }

    /// The magnification factor, `2^zoom`.
    #[inline]
    pub fn scale(&self) -> f64 {
        2f64.powi(self.zoom)
    }

    /// Map a viewport point to full-resolution image pixels.
    ///
    /// Computes `floor((client - pan) / 2^zoom)` exactly.
    pub fn client_to_image(&self, client: Point) -> Point {
        Point::new(
            client_axis_to_image(client.x, self.tx, self.zoom),
            client_axis_to_image(client.y, self.ty, self.zoom),
        )
    }

    /// Map a full-resolution image pixel to its viewport position.
    ///
    /// The inverse of [`client_to_image`](Self::client_to_image), rounding
    /// down when zoomed out.
    pub fn image_to_client(&self, image: Point) -> Point {
        Point::new(
            image_axis_to_client(image.x, self.tx, self.zoom),
            image_axis_to_client(image.y, self.ty, self.zoom),
        )
    }
}

fn client_axis_to_image(client: i32, offset: i32, zoom: i32) -> i32 {
    let delta = client as i64 - offset as i64;
    let shift = zoom.unsigned_abs().min(32);
    // Arithmetic right shift is floor division by a power of two.
    clamp_to_i32(if zoom >= 0 { delta >> shift } else { delta << shift })
}

fn image_axis_to_client(image: i32, offset: i32, zoom: i32) -> i32 {
    let shift = zoom.unsigned_abs().min(32);
    let scaled = if zoom >= 0 {
        (image as i64) << shift
    } else {
        (image as i64) >> shift
    };
    clamp_to_i32(offset as i64 + scaled)
}

/// What the canvas currently shows.
#[derive(Debug, Clone, Copy)]
pub enum Scene<'a> {
    /// No image path has been set.
    Empty,
    /// A path was set but the image could not be loaded.
    Failed,
    /// A loaded image under a view transform.
    Image {
        /// The pyramid to draw from.
        pyramid: &'a Pyramid,
        /// Current zoom and pan.
        transform: ViewTransform,
    },
}

/// Which status line to show in place of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Nothing has been loaded.
    NoImage,
    /// The last load attempt failed.
    LoadFailed,
}

impl StatusKind {
    /// The message text.
    pub fn text(self) -> &'static str {
        match self {
            Self::NoImage => "No image loaded",
            Self::LoadFailed => "Error loading image",
        }
    }
}

/// A status line placed in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    /// Which message.
    pub kind: StatusKind,
    /// Center of the text in viewport pixels.
    pub center: Point,
    /// Text color.
    pub color: Rgb,
}

/// One scaled copy from a pyramid level onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBlit {
    /// Pyramid level to read from.
    pub level: usize,
    /// Integer magnification; `dest` is `src` times this.
    pub scale: u32,
    /// Source rectangle in level pixels.
    pub src: Rect,
    /// Destination rectangle in viewport pixels, possibly overhanging `clip`.
    pub dest: Rect,
    /// Only pixels inside this rectangle may be written.
    pub clip: Rect,
}

/// Everything needed to repaint one dirty rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FramePlan {
    /// The image copy, if any part of the image is inside the dirty area.
    pub image: Option<ImageBlit>,
    /// Rectangles to fill with the background color. Disjoint.
    pub background: Vec<Rect>,
    /// Status line to draw instead of an image.
    pub status: Option<StatusMessage>,
}

impl FramePlan {
    /// Check if the plan paints nothing.
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.background.is_empty() && self.status.is_none()
    }
}

/// Plans and paints canvas frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRenderer {
    background: Rgb,
    message_color: Rgb,
    error_color: Rgb,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(Rgb::DARK_GRAY)
    }
}

impl FrameRenderer {
    /// Create a renderer filling uncovered areas with `background`.
    pub fn new(background: Rgb) -> Self {
        Self {
            background,
            message_color: Rgb::WHITE,
            error_color: Rgb::RED,
        }
    }

    /// Set the status text colors for the empty and failed states.
    pub fn with_status_colors(mut self, message: Rgb, error: Rgb) -> Self {
        self.message_color = message;
        self.error_color = error;
        self
    }

    /// The background fill color.
    #[inline]
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Compute what must be painted to refresh `dirty`.
    pub fn plan(&self, scene: &Scene<'_>, viewport: Size, dirty: Rect) -> FramePlan {
        let Some(clip) = dirty.intersect(&Rect::from_size(viewport)) else {
            return FramePlan::default();
        };

        let (pyramid, transform) = match *scene {
            Scene::Empty => return self.status_plan(StatusKind::NoImage, viewport, clip),
            Scene::Failed => return self.status_plan(StatusKind::LoadFailed, viewport, clip),
            Scene::Image { pyramid, transform } => (pyramid, transform),
        };

        let (level, scale) = pyramid.level_for_zoom(transform.zoom);
        let Some(source) = pyramid.level(level) else {
            return FramePlan {
                background: vec![clip],
                ..FramePlan::default()
            };
        };

        let scale_wide = scale as i64;
        let (tx, ty) = (transform.tx as i64, transform.ty as i64);
        let image_right = tx + source.width() as i64 * scale_wide;
        let image_bottom = ty + source.height() as i64 * scale_wide;

        let visible_left = tx.max(clip.left() as i64);
        let visible_top = ty.max(clip.top() as i64);
        let visible_right = image_right.min(clip.right() as i64);
        let visible_bottom = image_bottom.min(clip.bottom() as i64);

        if visible_left >= visible_right || visible_top >= visible_bottom {
            return FramePlan {
                background: vec![clip],
                ..FramePlan::default()
            };
        }

        let src_left = (visible_left - tx) / scale_wide;
        let src_top = (visible_top - ty) / scale_wide;
        let src_right = (visible_right - tx + scale_wide - 1) / scale_wide;
        let src_bottom = (visible_bottom - ty + scale_wide - 1) / scale_wide;

        let blit = ImageBlit {
            level,
            scale,
            src: Rect::from_edges(
                src_left as i32,
                src_top as i32,
                src_right as i32,
                src_bottom as i32,
            ),
            dest: Rect::from_edges(
                clamp_to_i32(tx + src_left * scale_wide),
                clamp_to_i32(ty + src_top * scale_wide),
                clamp_to_i32(tx + src_right * scale_wide),
                clamp_to_i32(ty + src_bottom * scale_wide),
            ),
            clip,
        };

        // Inside `clip`, so it fits in i32.
        let covered = Rect::from_edges(
            visible_left as i32,
            visible_top as i32,
            visible_right as i32,
            visible_bottom as i32,
        );

        tracing::trace!(
            target: "mipview_render::renderer",
            level,
            scale,
            src = ?blit.src,
            dest = ?blit.dest,
            "planned image blit"
        );

        FramePlan {
            image: Some(blit),
            background: clip.subtract(&covered),
            status: None,
        }
    }

    fn status_plan(&self, kind: StatusKind, viewport: Size, clip: Rect) -> FramePlan {
        let color = match kind {
            StatusKind::NoImage => self.message_color,
            StatusKind::LoadFailed => self.error_color,
        };
        FramePlan {
            image: None,
            background: vec![clip],
            status: Some(StatusMessage {
                kind,
                center: Point::new((viewport.width / 2) as i32, (viewport.height / 2) as i32),
                color,
            }),
        }
    }

    /// Repaint `dirty` on `painter`.
    ///
    /// The image is drawn first, then the uncovered remainder of `dirty` is
    /// filled with the background, then the status line if there is one.
    pub fn render<P>(&self, scene: &Scene<'_>, dirty: Rect, painter: &mut P) -> FrameStats
    where
        P: Painter + ?Sized,
    {
        let _span = PerfSpan::new(span_names::PAINT);
        let plan = self.plan(scene, painter.viewport_size(), dirty);

        painter.begin_frame();

        if let (Some(blit), Scene::Image { pyramid, .. }) = (plan.image, scene)
            && let Some(source) = pyramid.level(blit.level)
        {
            painter.blit_scaled(source, blit.src, blit.dest, blit.clip);
        }

        for rect in &plan.background {
            painter.fill_rect(*rect, self.background);
        }

        if let Some(status) = plan.status {
            painter.draw_status_text(status.kind.text(), status.center, status.color);
        }

        painter.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::KernelPath;
    use crate::pixel_buffer::PixelBuffer;
    use crate::software::SoftwareSurface;

    const VIEWPORT: Size = Size::new(800, 600);

    fn pyramid(width: u32, height: u32) -> Pyramid {
        let base = PixelBuffer::try_filled(width, height, 0xFF80_8080).unwrap();
        Pyramid::build(base, Rgb::DARK_GRAY, 5, KernelPath::Vectorized).unwrap()
    }

    fn full() -> Rect {
        Rect::from_size(VIEWPORT)
    }

    #[test]
    fn test_client_image_mapping() {
        let t = ViewTransform::new(2, -10, 5);
        assert_eq!(t.client_to_image(Point::new(-10, 5)), Point::new(0, 0));
        assert_eq!(t.client_to_image(Point::new(-7, 8)), Point::new(0, 0));
        assert_eq!(t.client_to_image(Point::new(-11, 4)), Point::new(-1, -1));
        assert_eq!(t.image_to_client(Point::new(3, 1)), Point::new(2, 9));

        let t = ViewTransform::new(-3, 100, 0);
        assert_eq!(t.client_to_image(Point::new(101, 1)), Point::new(8, 8));
        assert_eq!(t.image_to_client(Point::new(17, 8)), Point::new(102, 1));
    }

    #[test]
    fn test_zoomed_out_selects_level_without_rescale() {
        let pyramid = pyramid(1000, 700);
        let scene = Scene::Image {
            pyramid: &pyramid,
            transform: ViewTransform::new(-3, 337, 256),
        };
        let plan = FrameRenderer::default().plan(&scene, VIEWPORT, full());
        let blit = plan.image.unwrap();

        assert_eq!(blit.level, 3);
        assert_eq!(blit.scale, 1);
        assert_eq!(blit.src, Rect::new(0, 0, 125, 88));
        assert_eq!(blit.dest, Rect::new(337, 256, 125, 88));

        let covered: u64 = plan.background.iter().map(Rect::area).sum();
        assert_eq!(covered, 800 * 600 - 125 * 88);
        assert!(plan.status.is_none());
    }

    #[test]
    fn test_deep_zoom_uses_minimal_source() {
        let pyramid = pyramid(1000, 700);
        let scene = Scene::Image {
            pyramid: &pyramid,
            transform: ViewTransform::new(5, -10_000, -5_000),
        };
        let plan = FrameRenderer::default().plan(&scene, VIEWPORT, full());
        let blit = plan.image.unwrap();

        assert_eq!(blit.level, 0);
        assert_eq!(blit.scale, 32);
        assert_eq!(blit.src, Rect::from_edges(312, 156, 338, 175));
        assert_eq!(blit.dest, Rect::from_edges(-16, -8, 816, 600));
        assert_eq!(blit.dest.width, blit.src.width * 32);
        assert!(plan.background.is_empty());
    }

    #[test]
    fn test_dirty_outside_image_only_fills_background() {
        let pyramid = pyramid(100, 100);
        let scene = Scene::Image {
            pyramid: &pyramid,
            transform: ViewTransform::new(0, 350, 250),
        };
        let dirty = Rect::new(0, 0, 100, 100);
        let plan = FrameRenderer::default().plan(&scene, VIEWPORT, dirty);

        assert!(plan.image.is_none());
        assert_eq!(plan.background, vec![dirty]);
    }

    #[test]
    fn test_background_limited_to_dirty_rect() {
        let pyramid = pyramid(100, 100);
        let scene = Scene::Image {
            pyramid: &pyramid,
            transform: ViewTransform::new(0, 350, 250),
        };
        let dirty = Rect::new(300, 300, 100, 10);
        let plan = FrameRenderer::default().plan(&scene, VIEWPORT, dirty);

        let blit = plan.image.unwrap();
        assert_eq!(blit.clip, dirty);
        assert_eq!(blit.src, Rect::new(0, 50, 50, 10));
        assert_eq!(plan.background, vec![Rect::new(300, 300, 50, 10)]);
    }

    #[test]
    fn test_status_messages() {
        let renderer = FrameRenderer::default();

        let plan = renderer.plan(&Scene::Empty, VIEWPORT, full());
        let status = plan.status.unwrap();
        assert_eq!(status.kind.text(), "No image loaded");
        assert_eq!(status.center, Point::new(400, 300));
        assert_eq!(status.color, Rgb::WHITE);
        assert_eq!(plan.background, vec![full()]);

        let status = renderer.plan(&Scene::Failed, VIEWPORT, full()).status.unwrap();
        assert_eq!(status.kind.text(), "Error loading image");
        assert_eq!(status.color, Rgb::RED);
    }

    #[test]
    fn test_empty_dirty_plans_nothing() {
        let plan = FrameRenderer::default().plan(&Scene::Empty, VIEWPORT, Rect::new(900, 0, 10, 10));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_render_on_software_surface() {
        let pyramid = pyramid(4, 4);
        let renderer = FrameRenderer::new(Rgb::new(1, 2, 3));
        let mut surface = SoftwareSurface::new(Size::new(16, 16)).unwrap();
        let scene = Scene::Image {
            pyramid: &pyramid,
            transform: ViewTransform::new(1, 4, 4),
        };

        let stats = renderer.render(&scene, Rect::new(0, 0, 16, 16), &mut surface);

        assert_eq!(stats.blits, 1);
        assert_eq!(stats.fills, 4);
        assert_eq!(stats.pixels_written, 16 * 16);
        assert_eq!(surface.pixel(4, 4), Some(0xFF80_8080));
        assert_eq!(surface.pixel(11, 11), Some(0xFF80_8080));
        assert_eq!(surface.pixel(12, 12), Some(0xFF01_0203));
        assert_eq!(surface.pixel(0, 0), Some(0xFF01_0203));
        assert!(surface.status_text().is_none());
    }

    #[test]
    fn test_render_status_on_software_surface() {
        let renderer = FrameRenderer::default();
        let mut surface = SoftwareSurface::new(Size::new(10, 8)).unwrap();
        renderer.render(&Scene::Failed, Rect::new(0, 0, 10, 8), &mut surface);

        let status = surface.status_text().unwrap();
        assert_eq!(status.text, "Error loading image");
        assert_eq!(status.center, Point::new(5, 4));
        assert_eq!(surface.pixel(9, 7), Some(0xFF40_4040));
    }
}

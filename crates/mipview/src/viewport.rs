//! Zoom, pan and wheel state of a canvas.
//!
//! The [`ViewportController`] owns the view transform and keeps it valid:
//! after every mutation the pan offset is clamped so that, per axis, an image
//! smaller than the viewport is centered and a larger one never exposes a gap
//! between its edge and the viewport edge.
//!
//! Zoom changes are anchored at the pointer: the image point under the cursor
//! before the change stays under it afterwards, up to truncation to whole
//! viewport pixels.

use mipview_render::{Point, Size, ViewTransform};
use tracing::{debug, trace};

use crate::config::CanvasConfig;

/// A net zoom change produced by one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoomChange {
    /// Zoom before the input.
    pub old: i32,
    /// Zoom after the input.
    pub new: i32,
}

/// Mutable view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Zoom exponent and pan offset.
    pub transform: ViewTransform,
    /// Wheel delta not yet consumed by a whole zoom step.
    pub wheel_accumulator: i32,
    /// Last pointer position while a pan gesture is active.
    pub pan_anchor: Option<Point>,
}

/// Clamp one axis of the pan offset.
///
/// Centers the image when `scaled <= viewport`, otherwise keeps `offset`
/// within `[viewport - scaled, 0]`.
pub fn clamp_axis(offset: i32, viewport: u32, scaled: i64) -> i32 {
    let viewport = viewport as i64;
    let clamped = if scaled <= viewport {
        (viewport - scaled) / 2
    } else {
        (offset as i64).clamp(viewport - scaled, 0)
    };
    saturate_i32(clamped)
}

/// The offset that keeps the image point under `pointer` fixed when zoom
/// changes from `old_zoom` to `new_zoom`.
///
/// `pointer - (pointer - offset) / 2^old * 2^new`, truncated toward zero.
pub fn anchored_offset(pointer: i32, offset: i32, old_zoom: i32, new_zoom: i32) -> i32 {
    let old_scale = 2f64.powi(old_zoom);
    let new_scale = 2f64.powi(new_zoom);
    let pointer = pointer as f64;
    (pointer - (pointer - offset as f64) / old_scale * new_scale) as i32
}

/// On-screen size of an image of `image` pixels at `zoom`.
///
/// Matches the size of the pyramid level drawn at that zoom: magnified
/// full-resolution size for `zoom >= 0`, the halved-and-rounded-up level
/// size below.
pub fn scaled_image_size(image: Size, zoom: i32, mip_levels: u32) -> (i64, i64) {
    if zoom >= 0 {
        let shift = zoom.min(32) as u32;
        (
            (image.width as i64) << shift,
            (image.height as i64) << shift,
        )
    } else {
        let level = zoom.unsigned_abs().min(mip_levels);
        let size = (0..level).fold(image, |size, _| size.half_ceil());
        (size.width as i64, size.height as i64)
    }
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Converts pointer input into view transform updates.
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewState,
    viewport: Size,
    image: Option<Size>,
    mip_levels: u32,
    max_zoom: i32,
    wheel_notch: i32,
}

impl ViewportController {
    /// Create a controller with the zoom limits and wheel step of `config`.
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            state: ViewState::default(),
            viewport: Size::ZERO,
            image: None,
            mip_levels: config.mip_levels,
            max_zoom: config.max_zoom,
            wheel_notch: config.wheel_notch.max(1),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The full view state.
    #[inline]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The current zoom and pan.
    #[inline]
    pub fn transform(&self) -> ViewTransform {
        self.state.transform
    }

    /// The current zoom exponent.
    #[inline]
    pub fn zoom(&self) -> i32 {
        self.state.transform.zoom
    }

    /// The viewport size.
    #[inline]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Full-resolution size of the current image.
    #[inline]
    pub fn image_size(&self) -> Option<Size> {
        self.image
    }

    /// Whether a pan gesture is active.
    #[inline]
    pub fn is_panning(&self) -> bool {
        self.state.pan_anchor.is_some()
    }

    /// The zoom range `[min, max]`.
    pub fn zoom_range(&self) -> (i32, i32) {
        (-(self.mip_levels as i32), self.max_zoom)
    }

    /// On-screen size of the image at the current zoom.
    pub fn scaled_size(&self) -> Option<(i64, i64)> {
        self.image
            .map(|image| scaled_image_size(image, self.zoom(), self.mip_levels))
    }

    /// Set or clear the image being viewed and re-clamp.
    ///
    /// Zoom and pan are kept; call [`reset`](Self::reset) first for a new image.
    pub fn set_image(&mut self, image: Option<Size>) {
        self.image = image;
        if image.is_none() {
            self.state.pan_anchor = None;
        }
        self.clamp();
    }

    /// Reset to 100% zoom with zero pan, ending any gesture.
    pub fn reset(&mut self) {
        self.state = ViewState::default();
    }

    /// Clamp the pan offset against the current image and viewport.
    ///
    /// Idempotent. Does nothing while no image is set.
    pub fn clamp(&mut self) {
        let Some((scaled_width, scaled_height)) = self.scaled_size() else {
            return;
        };
        let transform = &mut self.state.transform;
        transform.tx = clamp_axis(transform.tx, self.viewport.width, scaled_width);
        transform.ty = clamp_axis(transform.ty, self.viewport.height, scaled_height);
    }

    /// Update the viewport size and re-clamp. Zoom is unchanged.
    pub fn resize(&mut self, size: Size) {
        self.viewport = size;
        self.clamp();
        trace!(target: "mipview::viewport", %size, transform = ?self.state.transform, "viewport resized");
    }

    // =========================================================================
    // Panning
    // =========================================================================

    /// Start a pan gesture at `position`.
    ///
    /// Returns `false` (and does nothing) while no image is set.
    pub fn begin_pan(&mut self, position: Point) -> bool {
        if self.image.is_none() {
            return false;
        }
        self.state.pan_anchor = Some(position);
        true
    }

    /// Continue a pan gesture.
    ///
    /// Returns `true` if a gesture is active, in which case the view must be
    /// repainted.
    pub fn pan_to(&mut self, position: Point) -> bool {
        let Some(last) = self.state.pan_anchor else {
            return false;
        };
        let transform = &mut self.state.transform;
        transform.tx = transform.tx.saturating_add(position.x.saturating_sub(last.x));
        transform.ty = transform.ty.saturating_add(position.y.saturating_sub(last.y));
        self.state.pan_anchor = Some(position);
        self.clamp();
        trace!(target: "mipview::viewport", tx = self.state.transform.tx, ty = self.state.transform.ty, "panned");
        true
    }

    /// End the pan gesture. Returns whether one was active.
    pub fn end_pan(&mut self) -> bool {
        self.state.pan_anchor.take().is_some()
    }

    // =========================================================================
    // Zooming
    // =========================================================================

    /// Accumulate wheel `delta` and zoom by every whole notch, anchored at
    /// `anchor`.
    ///
    /// Wheel input is ignored while no image is set. Returns the net zoom
    /// change, if any.
    pub fn wheel(&mut self, delta: i32, anchor: Point) -> Option<ZoomChange> {
        self.image?;

        let notch = self.wheel_notch;
        let accumulator = &mut self.state.wheel_accumulator;
        *accumulator = accumulator.saturating_add(delta);

        let steps = *accumulator / notch;
        *accumulator -= steps * notch;

        if steps == 0 {
            return None;
        }
        let target = self.zoom().saturating_add(steps);
        self.set_zoom(target, anchor)
    }

    /// Zoom to `zoom` (clamped to the zoom range), anchored at `anchor`.
    ///
    /// Returns the change, or `None` if the zoom is unchanged or no image is
    /// set.
    pub fn set_zoom(&mut self, zoom: i32, anchor: Point) -> Option<ZoomChange> {
        self.image?;

        let (min_zoom, max_zoom) = self.zoom_range();
        let old = self.zoom();
        let new = zoom.clamp(min_zoom, max_zoom);
        if new == old {
            return None;
        }

        let transform = &mut self.state.transform;
        transform.tx = anchored_offset(anchor.x, transform.tx, old, new);
        transform.ty = anchored_offset(anchor.y, transform.ty, old, new);
        transform.zoom = new;
        self.clamp();

        debug!(
            target: "mipview::viewport",
            old,
            new,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "zoom changed"
        );
        Some(ZoomChange { old, new })
    }

    // =========================================================================
    // Coordinates
    // =========================================================================

    /// Map a viewport point to full-resolution image pixels.
    pub fn client_to_image(&self, client: Point) -> Point {
        self.state.transform.client_to_image(client)
    }

    /// Map a full-resolution image pixel to the viewport.
    pub fn image_to_client(&self, image: Point) -> Point {
        self.state.transform.image_to_client(image)
    }
}

//! The image canvas.
//!
//! A [`Canvas`] is owned by its host window and driven explicitly: the host
//! forwards input as [`CanvasEvent`]s, asks which region needs repainting
//! with [`Canvas::take_damage`], and paints with [`Canvas::paint`].
//!
//! Loading is synchronous. The image is decoded, baked and reduced into a
//! fresh [`Pyramid`] before anything visible changes; only a fully built
//! pyramid replaces the current one, so a failed reload leaves the previous
//! image on screen.
//!
//! # Example
//!
//! ```no_run
//! use mipview::{Canvas, CanvasConfig};
//! use mipview::events::CanvasEvent;
//! use mipview::render::{Point, Size, SoftwareSurface};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut canvas = Canvas::new(CanvasConfig::default())?;
//! canvas.zoom_changed.connect(|zoom| println!("zoom is now 2^{zoom}"));
//! canvas.navigate_next.connect(|_| println!("show the next file"));
//!
//! canvas.resize(Size::new(800, 600));
//! canvas.set_image("photo.png")?;
//!
//! canvas.handle_event(CanvasEvent::Wheel { delta: 120, position: Point::new(400, 300) });
//!
//! let mut surface = SoftwareSurface::new(Size::new(800, 600))?;
//! if let Some(dirty) = canvas.take_damage() {
//!     canvas.paint(&mut surface, dirty);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mipview_core::Signal;
use mipview_core::logging::{PerfSpan, span_names};
use mipview_render::{
    DamageTracker, FrameRenderer, FrameStats, Painter, Point, Pyramid, Rect, Scene, Size,
    ViewTransform, decoder,
};
use tracing::{debug, trace, warn};

use crate::config::CanvasConfig;
use crate::error::{CanvasError, CanvasResult, ConfigError};
use crate::events::{CanvasEvent, CaptureChange, EventResponse, MouseButton};
use crate::viewport::ViewportController;

/// What the canvas is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CanvasState {
    /// No image path has been set.
    #[default]
    Empty,
    /// An image is loaded.
    Ready,
    /// A path is set but no image could be loaded from it.
    Error,
}

/// A pan/zoom view of one image.
///
/// # Signals
///
/// - `zoom_changed`: emitted with the new zoom exponent after a wheel zoom
/// - `pointer_moved`: emitted with the viewport position on every pointer move
/// - `navigate_previous`: emitted when the back side button is pressed
/// - `navigate_next`: emitted when the forward side button is pressed
pub struct Canvas {
    config: CanvasConfig,
    renderer: FrameRenderer,
    viewport: ViewportController,
    damage: DamageTracker,

    /// The image being shown. Replaced whole, never mutated.
    pyramid: Option<Arc<Pyramid>>,

    /// The path of the current image, kept even if loading it failed.
    path: Option<PathBuf>,

    /// Signal emitted when the zoom changes.
    pub zoom_changed: Signal<i32>,

    /// Signal emitted when the pointer moves over the canvas.
    pub pointer_moved: Signal<Point>,

    /// Signal emitted when the user asks for the previous image.
    pub navigate_previous: Signal<()>,

    /// Signal emitted when the user asks for the next image.
    pub navigate_next: Signal<()>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("state", &self.state())
            .field("path", &self.path)
            .field("transform", &self.viewport.transform())
            .field("viewport", &self.viewport.viewport())
            .finish_non_exhaustive()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::from_valid_config(CanvasConfig::default())
    }
}

impl Canvas {
    /// Create a canvas with a validated configuration.
    ///
    /// The viewport starts empty; call [`resize`](Self::resize) once the host
    /// knows its size.
    pub fn new(config: CanvasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: CanvasConfig) -> Self {
        let renderer = FrameRenderer::new(config.background)
            .with_status_colors(config.message_color, config.error_color);
        Self {
            renderer,
            viewport: ViewportController::new(&config),
            damage: DamageTracker::new(),
            pyramid: None,
            path: None,
            config,
            zoom_changed: Signal::new(),
            pointer_moved: Signal::new(),
            navigate_previous: Signal::new(),
            navigate_next: Signal::new(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the image with the one at `path`.
    ///
    /// The previous image is dropped first and the view resets to 100% zoom.
    /// The path is recorded even if loading fails, in which case the canvas
    /// shows its error state.
    pub fn set_image(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let path = path.as_ref().to_path_buf();
        self.unload();
        self.viewport.reset();
        self.path = Some(path.clone());
        self.damage.invalidate_all();

        let pyramid = self.load(&path)?;
        self.install(pyramid);
        Ok(())
    }

    /// Load the current path again, keeping zoom and pan.
    ///
    /// On failure the previously loaded image, if any, stays in place.
    pub fn reload_image(&mut self) -> CanvasResult<()> {
        let path = self.path.clone().ok_or(CanvasError::NoImagePath)?;
        self.damage.invalidate_all();

        let pyramid = self.load(&path)?;
        self.install(pyramid);
        Ok(())
    }

    /// Drop the image and forget its path.
    pub fn clear_image(&mut self) {
        self.unload();
        self.path = None;
        self.viewport.reset();
        self.damage.invalidate_all();
    }

    fn unload(&mut self) {
        self.pyramid = None;
        self.viewport.set_image(None);
    }

    fn load(&self, path: &Path) -> CanvasResult<Arc<Pyramid>> {
        let span = PerfSpan::new(span_names::LOAD);
        let built = decoder::decode_file(path).and_then(|decoded| {
            Pyramid::build(
                decoded,
                self.config.background,
                self.config.mip_levels,
                self.config.kernel,
            )
        });

        match built {
            Ok(pyramid) => {
                let size = pyramid.image_size();
                debug!(
                    target: "mipview::canvas",
                    path = %path.display(),
                    width = size.width,
                    height = size.height,
                    levels = pyramid.levels().len(),
                    elapsed_ms = span.elapsed_ms(),
                    "image loaded"
                );
                Ok(Arc::new(pyramid))
            }
            Err(err) => {
                warn!(
                    target: "mipview::canvas",
                    path = %path.display(),
                    error = %err,
                    "failed to load image"
                );
                Err(err.into())
            }
        }
    }

    fn install(&mut self, pyramid: Arc<Pyramid>) {
        self.viewport.set_image(Some(pyramid.image_size()));
        self.pyramid = Some(pyramid);
        self.damage.invalidate_all();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The configuration the canvas was created with.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// What the canvas is showing.
    pub fn state(&self) -> CanvasState {
        match (&self.pyramid, &self.path) {
            (Some(_), _) => CanvasState::Ready,
            (None, Some(_)) => CanvasState::Error,
            (None, None) => CanvasState::Empty,
        }
    }

    /// The path of the current image.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current zoom exponent.
    pub fn zoom(&self) -> i32 {
        self.viewport.zoom()
    }

    /// The current magnification, `2^zoom`.
    pub fn zoom_scale(&self) -> f64 {
        self.viewport.transform().scale()
    }

    /// Full-resolution size of the loaded image.
    pub fn image_size(&self) -> Option<Size> {
        self.pyramid.as_ref().map(|pyramid| pyramid.image_size())
    }

    /// The current zoom and pan.
    pub fn view_transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    /// The viewport size.
    pub fn viewport_size(&self) -> Size {
        self.viewport.viewport()
    }

    /// Whether a pan gesture is active.
    pub fn is_panning(&self) -> bool {
        self.viewport.is_panning()
    }

    /// A handle to the loaded pyramid.
    ///
    /// The handle stays valid after the canvas loads another image.
    pub fn pyramid(&self) -> Option<Arc<Pyramid>> {
        self.pyramid.clone()
    }

    /// Map a viewport point to full-resolution image pixels.
    pub fn client_to_image(&self, client: Point) -> Point {
        self.viewport.client_to_image(client)
    }

    /// Map a full-resolution image pixel to the viewport.
    pub fn image_to_client(&self, image: Point) -> Point {
        self.viewport.image_to_client(image)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Resize the viewport. Zoom is kept and pan is re-clamped.
    pub fn resize(&mut self, size: Size) {
        self.viewport.resize(size);
        self.damage.set_viewport(size);
        self.damage.invalidate_all();
    }

    /// Handle one viewport-local input event.
    pub fn handle_event(&mut self, event: CanvasEvent) -> EventResponse {
        trace!(target: "mipview::canvas", ?event, "handling event");

        match event {
            CanvasEvent::PointerPressed { button, position } => match button {
                MouseButton::Left => {
                    if self.viewport.begin_pan(position) {
                        EventResponse::ACCEPTED.with_capture(CaptureChange::Acquire)
                    } else {
                        EventResponse::IGNORED
                    }
                }
                MouseButton::Back => {
                    self.navigate_previous.emit(());
                    EventResponse::ACCEPTED
                }
                MouseButton::Forward => {
                    self.navigate_next.emit(());
                    EventResponse::ACCEPTED
                }
                MouseButton::Right | MouseButton::Middle => EventResponse::IGNORED,
            },

            CanvasEvent::PointerMoved { position } => {
                let panned = self.viewport.pan_to(position);
                if panned {
                    self.damage.invalidate_all();
                }
                self.pointer_moved.emit(position);
                EventResponse::ACCEPTED.with_repaint(panned)
            }

            CanvasEvent::PointerReleased { button, .. } => {
                if button != MouseButton::Left {
                    return EventResponse::IGNORED;
                }
                self.viewport.end_pan();
                EventResponse::ACCEPTED.with_capture(CaptureChange::Release)
            }

            CanvasEvent::CaptureLost => {
                self.viewport.end_pan();
                EventResponse::ACCEPTED
            }

            CanvasEvent::Wheel { delta, position } => {
                if self.pyramid.is_none() {
                    return EventResponse::IGNORED;
                }
                match self.viewport.wheel(delta, position) {
                    Some(change) => {
                        self.damage.invalidate_all();
                        self.zoom_changed.emit(change.new);
                        EventResponse::ACCEPTED.with_repaint(true)
                    }
                    None => EventResponse::ACCEPTED,
                }
            }

            CanvasEvent::Resized(size) => {
                self.resize(size);
                EventResponse::ACCEPTED.with_repaint(true)
            }
        }
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// The scene to draw for the current state.
    pub fn scene(&self) -> Scene<'_> {
        match (&self.pyramid, &self.path) {
            (Some(pyramid), _) => Scene::Image {
                pyramid,
                transform: self.viewport.transform(),
            },
            (None, Some(_)) => Scene::Failed,
            (None, None) => Scene::Empty,
        }
    }

    /// The frame renderer, for hosts that want to inspect frame plans.
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Whether any part of the viewport needs repainting.
    pub fn has_damage(&self) -> bool {
        self.damage.has_damage()
    }

    /// Take the region that needs repainting, clearing it.
    pub fn take_damage(&mut self) -> Option<Rect> {
        self.damage.take()
    }

    /// Repaint `dirty` on `painter`.
    pub fn paint<P>(&self, painter: &mut P, dirty: Rect) -> FrameStats
    where
        P: Painter + ?Sized,
    {
        self.renderer.render(&self.scene(), dirty, painter)
    }
}

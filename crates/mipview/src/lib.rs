//! mipview - a pan/zoom image canvas.
//!
//! The canvas loads an image, bakes it against an opaque background, builds a
//! pyramid of pre-blended half-scale levels, and lets the user pan by dragging
//! and zoom in powers of two with the wheel. Zooming out never resamples at
//! paint time: each negative zoom step shows the next pre-filtered level.
//!
//! This is the umbrella crate. It owns the host-facing [`Canvas`] and
//! re-exports the pixel pipeline as [`render`] and the signal and logging
//! primitives at the crate root.
//!
//! # Example
//!
//! ```no_run
//! use mipview::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CanvasConfig::from_toml_str("background = \"#303030\"")?;
//!     let mut canvas = Canvas::new(config)?;
//!     canvas.resize(Size::new(1024, 768));
//!     canvas.set_image("photo.jpg")?;
//!
//!     let mut surface = SoftwareSurface::new(canvas.viewport_size())?;
//!     if let Some(dirty) = canvas.take_damage() {
//!         canvas.paint(&mut surface, dirty);
//!     }
//!     surface.to_rgba_image().save("frame.png")?;
//!     Ok(())
//! }
//! ```

mod canvas;
mod config;
mod error;
pub mod events;
pub mod prelude;
pub mod viewport;

pub use canvas::{Canvas, CanvasState};
pub use config::{CanvasConfig, DEFAULT_MAX_ZOOM, MAX_MIP_LEVELS, MAX_ZOOM_LIMIT, WHEEL_NOTCH};
pub use error::{CanvasError, CanvasResult, ConfigError};
pub use mipview_core::*;

/// Pixel pipeline and drawing.
pub mod render {
    pub use mipview_render::*;
}

//! Pixel pipeline for mipview.
//!
//! This crate turns an image file into something that can be panned and
//! zoomed cheaply:
//!
//! 1. [`decoder`] reads the file into a premultiplied [`PixelBuffer`].
//! 2. [`compositor`] bakes the buffer against an opaque background.
//! 3. [`pyramid`] derives the pre-baked, half-scale levels.
//! 4. [`FrameRenderer`] plans each repaint and replays it on a [`Painter`],
//!    such as the CPU [`SoftwareSurface`].
//!
//! # Loading and drawing an image
//!
//! ```no_run
//! use mipview_render::{
//!     FrameRenderer, KernelPath, Pyramid, Rect, Rgb, Scene, Size, SoftwareSurface,
//!     ViewTransform, decoder, pyramid::DEFAULT_MIP_LEVELS,
//! };
//!
//! # fn example() -> mipview_render::RenderResult<()> {
//! let decoded = decoder::decode_file("photo.png")?;
//! let pyramid = Pyramid::build(decoded, Rgb::DARK_GRAY, DEFAULT_MIP_LEVELS, KernelPath::default())?;
//!
//! let mut surface = SoftwareSurface::new(Size::new(800, 600))?;
//! let scene = Scene::Image {
//!     pyramid: &pyramid,
//!     transform: ViewTransform::new(-1, 0, 0),
//! };
//! FrameRenderer::new(Rgb::DARK_GRAY).render(&scene, Rect::new(0, 0, 800, 600), &mut surface);
//! # Ok(())
//! # }
//! ```
//!
//! # Pixel kernels
//!
//! The bake and downsample kernels come in a scalar reference form and a
//! packed-lane form selected by [`KernelPath`]. Both produce bit-identical
//! output; the packed form is the default.

pub mod compositor;
mod damage;
pub mod decoder;
mod error;
mod painter;
mod pixel_buffer;
pub mod pyramid;
mod renderer;
mod software;
mod swar;
mod types;

// Errors
pub use error::{DecodeError, RenderError, RenderResult};

// Pixels and geometry
pub use pixel_buffer::{ALPHA_MASK, PixelBuffer, pack_argb, unpack_argb};
pub use types::{Point, Rect, Rgb, Size};

// Pipeline
pub use compositor::KernelPath;
pub use pyramid::Pyramid;

// Drawing
pub use damage::DamageTracker;
pub use painter::{FrameStats, Painter};
pub use renderer::{
    FramePlan, FrameRenderer, ImageBlit, Scene, StatusKind, StatusMessage, ViewTransform,
};
pub use software::{SoftwareSurface, StatusText};

//! Logging facilities for mipview.
//!
//! mipview uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in the host application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("mipview=debug,mipview_render=debug")
//!         .init();
//!
//!     // Create the canvas and run the host window...
//! }
//! ```
//!
//! The constants in [`targets`] match the `target:` used by every log
//! statement in the workspace, so they can be used directly in filter
//! directives.

use std::time::Instant;

/// Span names used throughout mipview for tracing.
pub mod span_names {
    /// Image decode span.
    pub const DECODE: &str = "mipview::decode";
    /// Pyramid construction span.
    pub const PYRAMID_BUILD: &str = "mipview::pyramid_build";
    /// Frame painting span.
    pub const PAINT: &str = "mipview::paint";
    /// Image load / reload span.
    pub const LOAD: &str = "mipview::load";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal emission target.
    pub const SIGNAL: &str = "mipview_core::signal";
    /// Image decoder target.
    pub const DECODE: &str = "mipview_render::decode";
    /// Background compositor target.
    pub const COMPOSITOR: &str = "mipview_render::compositor";
    /// Pyramid builder target.
    pub const PYRAMID: &str = "mipview_render::pyramid";
    /// Frame renderer target.
    pub const RENDERER: &str = "mipview_render::renderer";
    /// Canvas instance target.
    pub const CANVAS: &str = "mipview::canvas";
    /// Viewport controller target.
    pub const VIEWPORT: &str = "mipview::viewport";
}

/// A guard that times an operation and reports it when dropped.
///
/// The span is entered for the lifetime of the guard, so events logged while
/// it is alive are attributed to the operation.
///
/// ```
/// use mipview_core::logging::{span_names, PerfSpan};
///
/// {
///     let _span = PerfSpan::new(span_names::PYRAMID_BUILD);
///     // ... expensive work ...
/// } // elapsed time is logged here
/// ```
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "mipview_core::perf", "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            span: span.entered(),
        }
    }

    /// Elapsed time since the span was created, in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::trace!(
            target: "mipview_core::perf",
            operation = self.name,
            elapsed_ms = self.elapsed_ms(),
            "operation finished"
        );
    }
}

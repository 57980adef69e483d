//! Prelude module for mipview.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use mipview::prelude::*;
//! ```

// ============================================================================
// Canvas
// ============================================================================

pub use crate::{Canvas, CanvasConfig, CanvasError, CanvasResult, CanvasState};

// ============================================================================
// Input
// ============================================================================

pub use crate::events::{
    CanvasEvent, CaptureChange, CoordinateSpace, EventResponse, InputBoundary, MouseButton,
    PointerAction, RawPointerInput,
};

// ============================================================================
// Signals
// ============================================================================

pub use mipview_core::{ConnectionId, Signal};

// ============================================================================
// Rendering
// ============================================================================

pub use mipview_render::{
    FrameStats, KernelPath, Painter, Point, Rect, Rgb, Size, SoftwareSurface, ViewTransform,
};

//! Input events accepted by the canvas.
//!
//! Hosts deliver pointer input in whatever coordinate space their window
//! system uses. Some platforms report wheel positions in screen coordinates
//! and everything else in window coordinates. An [`InputBoundary`] converts
//! each [`RawPointerInput`] into a viewport-local [`CanvasEvent`] once, so the
//! canvas never needs to know where an event came from.
//!
//! ```
//! use mipview::events::{CanvasEvent, CoordinateSpace, InputBoundary, PointerAction, RawPointerInput};
//! use mipview::render::Point;
//!
//! let boundary = InputBoundary::new(Point::new(100, 50));
//! let raw = RawPointerInput::new(PointerAction::Wheel(120), Point::new(130, 70), CoordinateSpace::Screen);
//!
//! assert_eq!(
//!     boundary.translate(raw),
//!     CanvasEvent::Wheel { delta: 120, position: Point::new(30, 20) }
//! );
//! ```

use mipview_render::{Point, Size};

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Secondary button (usually right).
    Right = 1,
    /// Middle button (scroll wheel click).
    Middle = 2,
    /// First side button (browser back).
    Back = 3,
    /// Second side button (browser forward).
    Forward = 4,
}

/// The space a raw pointer position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinateSpace {
    /// Relative to the canvas viewport's top-left corner.
    #[default]
    Viewport,
    /// Relative to the screen's top-left corner.
    Screen,
}

/// What a raw pointer input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// A button went down.
    Press(MouseButton),
    /// The pointer moved.
    Move,
    /// A button went up.
    Release(MouseButton),
    /// The wheel turned by a signed delta (positive away from the user).
    Wheel(i32),
}

/// Pointer input as delivered by the host window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPointerInput {
    /// What happened.
    pub action: PointerAction,
    /// Where it happened.
    pub position: Point,
    /// Which space `position` is in.
    pub space: CoordinateSpace,
}

impl RawPointerInput {
    /// Create a new raw input.
    pub fn new(action: PointerAction, position: Point, space: CoordinateSpace) -> Self {
        Self {
            action,
            position,
            space,
        }
    }

    /// Create a raw input already in viewport coordinates.
    pub fn viewport(action: PointerAction, position: Point) -> Self {
        Self::new(action, position, CoordinateSpace::Viewport)
    }

    /// Create a raw input in screen coordinates.
    pub fn screen(action: PointerAction, position: Point) -> Self {
        Self::new(action, position, CoordinateSpace::Screen)
    }
}

/// Converts raw input into viewport-local canvas events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputBoundary {
    /// Screen position of the viewport's top-left corner.
    pub viewport_origin: Point,
}

impl InputBoundary {
    /// Create a boundary for a viewport at `viewport_origin` on screen.
    pub fn new(viewport_origin: Point) -> Self {
        Self { viewport_origin }
    }

    /// Update the viewport's screen position, e.g. after the window moved.
    pub fn set_viewport_origin(&mut self, origin: Point) {
        self.viewport_origin = origin;
    }

    /// Convert a position to viewport coordinates.
    pub fn viewport_position(&self, position: Point, space: CoordinateSpace) -> Point {
        match space {
            CoordinateSpace::Viewport => position,
            CoordinateSpace::Screen => Point::new(
                position.x.saturating_sub(self.viewport_origin.x),
                position.y.saturating_sub(self.viewport_origin.y),
            ),
        }
    }

    /// Convert a raw input into a canvas event.
    pub fn translate(&self, input: RawPointerInput) -> CanvasEvent {
        let position = self.viewport_position(input.position, input.space);
        match input.action {
            PointerAction::Press(button) => CanvasEvent::PointerPressed { button, position },
            PointerAction::Move => CanvasEvent::PointerMoved { position },
            PointerAction::Release(button) => CanvasEvent::PointerReleased { button, position },
            PointerAction::Wheel(delta) => CanvasEvent::Wheel { delta, position },
        }
    }
}

/// An event delivered to [`Canvas::handle_event`](crate::Canvas::handle_event).
///
/// All positions are in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A mouse button was pressed.
    PointerPressed {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// The pointer moved.
    PointerMoved {
        /// Pointer position.
        position: Point,
    },
    /// A mouse button was released.
    PointerReleased {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// The canvas lost pointer capture to another window.
    CaptureLost,
    /// The wheel turned.
    Wheel {
        /// Signed delta; positive zooms in.
        delta: i32,
        /// Pointer position, the zoom anchor.
        position: Point,
    },
    /// The viewport changed size.
    Resized(Size),
}

/// A request to change exclusive pointer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureChange {
    /// Route all pointer input to the canvas until released.
    Acquire,
    /// Stop routing all pointer input to the canvas.
    Release,
}

/// The canvas' answer to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Whether the canvas handled the event.
    pub accepted: bool,
    /// Whether the host should schedule a repaint.
    pub repaint: bool,
    /// Pointer capture change the host should apply.
    pub capture: Option<CaptureChange>,
}

impl EventResponse {
    /// The event was not handled.
    pub const IGNORED: Self = Self {
        accepted: false,
        repaint: false,
        capture: None,
    };

    /// The event was handled and nothing needs repainting.
    pub const ACCEPTED: Self = Self {
        accepted: true,
        repaint: false,
        capture: None,
    };

    /// Mark the response as needing a repaint (builder pattern).
    pub fn with_repaint(mut self, repaint: bool) -> Self {
        self.repaint |= repaint;
        self
    }

    /// Attach a capture change (builder pattern).
    pub fn with_capture(mut self, change: CaptureChange) -> Self {
        self.capture = Some(change);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_input_is_unchanged() {
        let boundary = InputBoundary::new(Point::new(500, 400));
        let raw = RawPointerInput::viewport(PointerAction::Press(MouseButton::Left), Point::new(3, 4));
        assert_eq!(
            boundary.translate(raw),
            CanvasEvent::PointerPressed {
                button: MouseButton::Left,
                position: Point::new(3, 4)
            }
        );
    }

    #[test]
    fn test_screen_input_is_offset() {
        let mut boundary = InputBoundary::default();
        boundary.set_viewport_origin(Point::new(10, 20));
        let raw = RawPointerInput::screen(PointerAction::Move, Point::new(5, 25));
        assert_eq!(
            boundary.translate(raw),
            CanvasEvent::PointerMoved {
                position: Point::new(-5, 5)
            }
        );
    }

    #[test]
    fn test_response_builders() {
        let response = EventResponse::ACCEPTED
            .with_repaint(true)
            .with_capture(CaptureChange::Acquire);
        assert!(response.accepted);
        assert!(response.repaint);
        assert_eq!(response.capture, Some(CaptureChange::Acquire));

        assert!(!EventResponse::IGNORED.with_repaint(false).repaint);
    }
}

//! Damage tracking for repaints.
//!
//! Every change the canvas makes (pan, zoom, resize, load) moves the whole
//! image, so damage is a single flag covering the viewport. The host drains
//! it with [`DamageTracker::take`] and hands the region to the renderer.

use crate::types::{Rect, Size};

/// Tracks whether the viewport needs repainting.
///
/// # Example
///
/// ```
/// use mipview_render::{DamageTracker, Rect, Size};
///
/// let mut tracker = DamageTracker::new();
/// tracker.set_viewport(Size::new(800, 600));
/// tracker.invalidate_all();
///
/// assert_eq!(tracker.take(), Some(Rect::new(0, 0, 800, 600)));
/// assert!(!tracker.has_damage());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    /// Whether the whole viewport must be repainted.
    full_repaint: bool,
    /// Viewport bounds.
    viewport: Rect,
}

impl DamageTracker {
    /// Create a new damage tracker with an empty viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = Rect::from_size(size);
    }

    /// Mark the entire viewport as damaged.
    pub fn invalidate_all(&mut self) {
        self.full_repaint = true;
    }

    /// The region that needs repainting.
    ///
    /// `None` if nothing is damaged or the viewport is empty.
    fn damage_region(&self) -> Option<Rect> {
        (self.full_repaint && !self.viewport.is_empty()).then_some(self.viewport)
    }

    /// Check if any damage has been recorded.
    #[inline]
    pub fn has_damage(&self) -> bool {
        self.damage_region().is_some()
    }

    /// Return the current damage region and clear it.
    pub fn take(&mut self) -> Option<Rect> {
        let region = self.damage_region();
        self.full_repaint = false;
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_tracker() -> DamageTracker {
        let mut tracker = DamageTracker::new();
        tracker.set_viewport(Size::new(800, 600));
        tracker
    }

    #[test]
    fn test_empty_tracker() {
        let mut tracker = viewport_tracker();
        assert!(!tracker.has_damage());
        assert!(tracker.take().is_none());
    }

    #[test]
    fn test_invalidate_all() {
        let mut tracker = viewport_tracker();
        tracker.invalidate_all();

        assert!(tracker.has_damage());
        assert_eq!(tracker.take(), Some(Rect::new(0, 0, 800, 600)));
    }

    #[test]
    fn test_invalidate_all_with_empty_viewport() {
        let mut tracker = DamageTracker::new();
        tracker.invalidate_all();
        assert!(!tracker.has_damage());
    }

    #[test]
    fn test_take_clears() {
        let mut tracker = viewport_tracker();
        tracker.invalidate_all();
        tracker.take();
        assert!(!tracker.has_damage());
        assert!(tracker.take().is_none());
    }

    #[test]
    fn test_resize_covers_new_viewport() {
        let mut tracker = viewport_tracker();
        tracker.invalidate_all();
        tracker.set_viewport(Size::new(750, 550));
        assert_eq!(tracker.take(), Some(Rect::new(0, 0, 750, 550)));
    }
}

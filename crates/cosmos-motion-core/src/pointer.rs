//! Latest pointer, scroll and viewport state.
//!
//! Input handlers write here asynchronously (last write wins, nothing is
//! queued). Once per frame the driver copies the state into an immutable
//! [`PointerSnapshot`] that every task reads.

use serde::{Deserialize, Serialize};

use crate::NARROW_VIEWPORT_MAX_WIDTH;

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width (px)
    pub width: f64,
    /// Height (px)
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Whether this is a phone-sized viewport.
    #[must_use]
    pub fn is_narrow(&self) -> bool {
        self.width <= NARROW_VIEWPORT_MAX_WIDTH
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Read-only view of input state for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerSnapshot {
    /// Pointer X in viewport coordinates
    pub x: f64,
    /// Pointer Y in viewport coordinates
    pub y: f64,
    /// Vertical scroll offset of the page
    pub scroll_y: f64,
    /// Viewport size
    pub viewport: Viewport,
    /// Whether the window has input focus
    pub focused: bool,
    /// Whether the pointer is inside the document
    pub inside: bool,
}

impl PointerSnapshot {
    /// Pointer offset from the viewport centre.
    #[must_use]
    pub fn offset_from_center(&self) -> (f64, f64) {
        let (cx, cy) = self.viewport.center();
        (self.x - cx, self.y - cy)
    }
}

impl Default for PointerSnapshot {
    fn default() -> Self {
        PointerTracker::new(Viewport::default()).snapshot()
    }
}

/// Mutable store behind [`PointerSnapshot`].
#[derive(Clone, Debug)]
pub struct PointerTracker {
    latest: PointerSnapshot,
}

impl PointerTracker {
    /// Start with the pointer resting at the viewport centre.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let (x, y) = viewport.center();
        Self {
            latest: PointerSnapshot {
                x,
                y,
                scroll_y: 0.0,
                viewport,
                focused: true,
                inside: true,
            },
        }
    }

    /// Record a pointer move.
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.latest.x = x;
        self.latest.y = y;
    }

    /// Record a scroll offset.
    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.latest.scroll_y = scroll_y;
    }

    /// Record a viewport resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.latest.viewport = viewport;
    }

    /// Record a focus change.
    pub fn set_focused(&mut self, focused: bool) {
        self.latest.focused = focused;
    }

    /// Record the pointer entering or leaving the document.
    pub fn set_inside(&mut self, inside: bool) {
        self.latest.inside = inside;
    }

    /// Copy of the latest state.
    #[must_use]
    pub fn snapshot(&self) -> PointerSnapshot {
        self.latest
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_center() {
        let tracker = PointerTracker::new(Viewport::new(800.0, 600.0));
        let snap = tracker.snapshot();
        assert_eq!((snap.x, snap.y), (400.0, 300.0));
        assert_eq!(snap.offset_from_center(), (0.0, 0.0));
    }

    #[test]
    fn test_last_write_wins() {
        let mut tracker = PointerTracker::default();
        tracker.set_pointer(10.0, 20.0);
        tracker.set_pointer(30.0, 40.0);
        let snap = tracker.snapshot();
        assert_eq!((snap.x, snap.y), (30.0, 40.0));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut tracker = PointerTracker::default();
        let before = tracker.snapshot();
        tracker.set_scroll(500.0);
        assert_eq!(before.scroll_y, 0.0);
        assert_eq!(tracker.snapshot().scroll_y, 500.0);
    }

    #[test]
    fn test_narrow_viewport() {
        assert!(Viewport::new(768.0, 1024.0).is_narrow());
        assert!(!Viewport::new(769.0, 1024.0).is_narrow());
    }
}

//! Scroll- and pointer-linked offsets: parallax layers, the scroll progress
//! bar and the navigation bar's scrolled state.

use serde::{Deserialize, Serialize};

use crate::config::{MotionPolicy, ParallaxConfig};
use crate::error::Result;
use crate::frame::{FrameTask, FrameTime, TaskStatus};
use crate::pointer::PointerSnapshot;

/// Scroll offset (px) past which the navigation bar is "scrolled".
pub const NAV_SCROLLED_THRESHOLD: f64 = 60.0;

/// Vertical shift for a scroll-linked layer.
#[must_use]
pub fn scroll_shift(scroll_y: f64, factor: f64) -> f64 {
    scroll_y * factor
}

/// Shift for a pointer-linked layer: `strength` px at the viewport edge,
/// zero at the centre. A degenerate viewport gives no shift.
#[must_use]
pub fn pointer_shift(input: &PointerSnapshot, strength: f64) -> (f64, f64) {
    let viewport = input.viewport;
    if !(viewport.width > 0.0 && viewport.height > 0.0) {
        return (0.0, 0.0);
    }
    let (dx, dy) = input.offset_from_center();
    (dx / viewport.width * strength, dy / viewport.height * strength)
}

/// Fraction of the page scrolled, in `[0, 1]`; `0` when the page does not
/// scroll.
#[must_use]
pub fn scroll_progress(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable > 0.0 {
        (scroll_y / scrollable).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Whether the navigation bar should switch to its scrolled style.
#[must_use]
pub fn nav_scrolled(scroll_y: f64) -> bool {
    scroll_y > NAV_SCROLLED_THRESHOLD
}

/// What drives a [`ParallaxLayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParallaxSource {
    /// `[data-parallax]`: page scroll
    Scroll,
    /// `[data-mouse-parallax]`: pointer position
    Pointer,
}

/// One element moved by scroll or pointer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    config: ParallaxConfig,
    source: ParallaxSource,
}

impl ParallaxLayer {
    /// Create a layer.
    #[must_use]
    pub fn new(config: ParallaxConfig, source: ParallaxSource) -> Self {
        Self { config, source }
    }

    /// What drives this layer.
    #[must_use]
    pub fn source(&self) -> ParallaxSource {
        self.source
    }

    /// CSS `transform` for this frame, or `None` when the policy leaves the
    /// element untouched.
    #[must_use]
    pub fn transform(&self, input: &PointerSnapshot, policy: MotionPolicy) -> Option<String> {
        match self.source {
            ParallaxSource::Scroll => Some(format!(
                "translateY({}px)",
                scroll_shift(input.scroll_y, self.config.scroll_factor)
            )),
            ParallaxSource::Pointer if policy.allows_pointer_effects() => {
                let (x, y) = pointer_shift(input, self.config.pointer_strength);
                Some(format!("translate({x}px, {y}px)"))
            }
            ParallaxSource::Pointer => None,
        }
    }
}

/// Scroll progress bar and navigation state, refreshed every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollIndicators {
    document_height: f64,
    progress: f64,
    nav_scrolled: bool,
}

impl ScrollIndicators {
    /// Create for a document of `document_height` px.
    #[must_use]
    pub fn new(document_height: f64) -> Self {
        Self {
            document_height,
            ..Self::default()
        }
    }

    /// The document grew or shrank.
    pub fn set_document_height(&mut self, document_height: f64) {
        self.document_height = document_height;
    }

    /// Progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether the navigation bar is in its scrolled style.
    #[must_use]
    pub fn is_nav_scrolled(&self) -> bool {
        self.nav_scrolled
    }

    /// CSS `transform` for the progress bar.
    #[must_use]
    pub fn progress_css(&self) -> String {
        format!("scaleX({})", self.progress)
    }
}

impl FrameTask for ScrollIndicators {
    fn name(&self) -> &'static str {
        "scroll-indicators"
    }

    fn update(&mut self, _time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        self.progress = scroll_progress(input.scroll_y, self.document_height, input.viewport.height);
        self.nav_scrolled = nav_scrolled(input.scroll_y);
        Ok(TaskStatus::Continue)
    }
}

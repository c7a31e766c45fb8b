//! Pointer followers: magnetic buttons, the cursor glow and card highlights.

use serde::{Deserialize, Serialize};

use crate::config::{GlowConfig, MagneticConfig, MotionPolicy};
use crate::error::Result;
use crate::frame::{FrameTask, FrameTime, StepOutcome, TaskStatus, TaskWaker};
use crate::geometry::Rect;
use crate::pointer::PointerSnapshot;
use crate::smoothing::SmoothedVec2;

/// Offset (px) under which a follower is at rest.
const REST_PX: f64 = 0.01;

/// A button that drifts toward the pointer while hovered.
#[derive(Clone, Debug)]
pub struct MagneticFollower {
    config: MagneticConfig,
    offset: SmoothedVec2,
    enabled: bool,
    waker: Option<TaskWaker>,
}

impl MagneticFollower {
    /// Create a follower at rest.
    #[must_use]
    pub fn new(config: MagneticConfig) -> Self {
        let offset = SmoothedVec2::new(0.0, 0.0, config.tau);
        Self {
            config,
            offset,
            enabled: true,
            waker: None,
        }
    }

    /// Keep a waker so pointer events can restart a sleeping follower.
    pub fn attach_waker(&mut self, waker: TaskWaker) {
        self.waker = Some(waker);
    }

    /// Disabled on narrow viewports; disabling returns the button home.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.enabled = policy.allows_pointer_effects();
        if !self.enabled {
            self.retarget(0.0, 0.0);
        }
    }

    /// Pointer at viewport `(x, y)` over a button occupying `rect`.
    pub fn pointer_move(&mut self, rect: Rect, x: f64, y: f64) -> StepOutcome {
        if !self.enabled || rect.is_degenerate() {
            return StepOutcome::Skipped;
        }
        let (dx, dy) = rect.offset_from_center(x, y);
        let strength = self.config.strength;
        self.retarget(dx * strength, dy * strength);
        StepOutcome::Applied
    }

    /// Pointer left; return home.
    pub fn pointer_leave(&mut self) {
        self.retarget(0.0, 0.0);
    }

    fn retarget(&mut self, x: f64, y: f64) {
        self.offset.set_target(x, y);
        if let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    /// Current `(x, y)` displacement (px).
    #[must_use]
    pub fn offset(&self) -> (f64, f64) {
        self.offset.current()
    }

    /// Displacement being approached (px).
    #[must_use]
    pub fn target(&self) -> (f64, f64) {
        self.offset.target()
    }

    /// CSS `transform` value.
    #[must_use]
    pub fn transform_css(&self) -> String {
        let (x, y) = self.offset.current();
        format!("translate({x:.2}px,{y:.2}px)")
    }
}

impl FrameTask for MagneticFollower {
    fn name(&self) -> &'static str {
        "magnetic"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        self.offset.update(time.delta_s);
        if self.offset.distance() < REST_PX {
            let (x, y) = self.offset.target();
            self.offset.set_current(x, y);
            return Ok(TaskStatus::Sleep);
        }
        Ok(TaskStatus::Continue)
    }
}

/// A soft glow that trails the pointer across the page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorGlow {
    config: GlowConfig,
    position: SmoothedVec2,
    visible: bool,
    paused: bool,
}

impl CursorGlow {
    /// Create a glow resting at `(x, y)`.
    #[must_use]
    pub fn new(config: GlowConfig, x: f64, y: f64) -> Self {
        let position = SmoothedVec2::new(x, y, config.tau);
        Self {
            config,
            position,
            visible: true,
            paused: false,
        }
    }

    /// Paused (frozen in place) on narrow viewports.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.paused = !policy.allows_pointer_effects();
    }

    /// Current position (px).
    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        self.position.current()
    }

    /// Whether the glow is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// CSS opacity.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        if self.visible {
            1.0
        } else {
            0.0
        }
    }

    /// Time constant in use.
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.config.tau
    }
}

impl FrameTask for CursorGlow {
    fn name(&self) -> &'static str {
        "cursor-glow"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        self.visible = input.inside;
        if !self.paused {
            self.position.set_target(input.x, input.y);
            self.position.update(time.delta_s);
        }
        Ok(TaskStatus::Continue)
    }
}

/// `--mx` / `--my` values for a card highlight under the pointer.
///
/// Returns `None` for a card with no size.
#[must_use]
pub fn card_glow_vars(rect: Rect, x: f64, y: f64) -> Option<(String, String)> {
    let (nx, ny) = rect.normalized(x, y)?;
    Some((
        format!("{:.1}%", nx * 100.0),
        format!("{:.1}%", ny * 100.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_magnetic_target_is_quarter_offset() {
        let mut button = MagneticFollower::new(MagneticConfig::default());
        let rect = Rect::new(100.0, 100.0, 200.0, 60.0);
        assert_eq!(button.pointer_move(rect, 300.0, 100.0), StepOutcome::Applied);
        assert_eq!(button.target(), (25.0, -7.5));
        button.pointer_leave();
        assert_eq!(button.target(), (0.0, 0.0));
    }

    #[test]
    fn test_magnetic_matches_lerp_at_sixty_hz() {
        let mut button = MagneticFollower::new(MagneticConfig::default());
        button.pointer_move(Rect::new(0.0, 0.0, 100.0, 100.0), 90.0, 50.0);
        let input = PointerSnapshot::default();
        button
            .update(&FrameTime::fixed(1, DT, DT), &input)
            .expect("frame");
        // one 60 Hz frame moves 10% of the way, like lerp(.., 0.1)
        assert!((button.offset().0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_magnetic_sleeps_when_home() {
        let mut button = MagneticFollower::new(MagneticConfig::default());
        button.pointer_move(Rect::new(0.0, 0.0, 100.0, 100.0), 100.0, 100.0);
        button.pointer_leave();
        let input = PointerSnapshot::default();
        let mut time = FrameTime::fixed(0, 0.0, 0.0);
        let status = button.update(&time, &input).expect("frame");
        assert_eq!(status, TaskStatus::Sleep);
        time = time.next(DT);
        assert_eq!(button.update(&time, &input).expect("frame"), TaskStatus::Sleep);
        assert_eq!(button.transform_css(), "translate(0.00px,0.00px)");
    }

    #[test]
    fn test_magnetic_disabled_on_narrow() {
        let mut button = MagneticFollower::new(MagneticConfig::default());
        button.set_policy(MotionPolicy::from_viewport(400.0, false));
        let outcome = button.pointer_move(Rect::new(0.0, 0.0, 10.0, 10.0), 10.0, 10.0);
        assert_eq!(outcome, StepOutcome::Skipped);
    }

    #[test]
    fn test_glow_follows_and_hides() {
        let mut glow = CursorGlow::new(GlowConfig::default(), 0.0, 0.0);
        let mut input = PointerSnapshot::default();
        input.x = 100.0;
        input.y = 0.0;
        glow.update(&FrameTime::fixed(1, DT, DT), &input).expect("frame");
        assert!((glow.position().0 - 6.0).abs() < 1e-9);

        input.inside = false;
        glow.update(&FrameTime::fixed(2, 2.0 * DT, DT), &input).expect("frame");
        assert!(!glow.is_visible());
        assert_eq!(glow.opacity(), 0.0);
    }

    #[test]
    fn test_glow_paused_on_narrow() {
        let mut glow = CursorGlow::new(GlowConfig::default(), 5.0, 5.0);
        glow.set_policy(MotionPolicy::from_viewport(320.0, false));
        let mut input = PointerSnapshot::default();
        input.x = 300.0;
        glow.update(&FrameTime::fixed(1, DT, DT), &input).expect("frame");
        assert_eq!(glow.position(), (5.0, 5.0));
    }

    #[test]
    fn test_card_glow_vars() {
        let rect = Rect::new(10.0, 10.0, 300.0, 200.0);
        assert_eq!(
            card_glow_vars(rect, 110.0, 60.0),
            Some(("33.3%".to_string(), "25.0%".to_string()))
        );
        assert_eq!(card_glow_vars(Rect::default(), 1.0, 1.0), None);
    }
}

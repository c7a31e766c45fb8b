//! Pointer-driven 3D tilt.
//!
//! [`TiltEngine`] drives the profile card: a smoothed pointer position inside
//! the card becomes a set of CSS custom properties (pointer percentages,
//! background shift, rotation). It glides in from the top-right corner on
//! load, follows the pointer while inside and recentres after a leave, then
//! stops requesting frames once settled.
//!
//! [`SpringTilt`] is the lighter `[data-tilt]` variant that maps the pointer
//! straight to a rotation.
//!
//! ```text
//!   Idle ──enter──▶ Entering ──window ends──▶ Tracking
//!    ▲                  │                        │
//!    │                  └────────leave───────────┤
//!    └──settled──── Leaving ◀────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{MotionPolicy, ProfileTiltConfig, TiltConfig};
use crate::error::Result;
use crate::frame::{FrameTask, FrameTime, StepOutcome, TaskStatus, TaskWaker};
use crate::geometry::{remap, round3, Rect};
use crate::pointer::PointerSnapshot;
use crate::render::SurfaceSize;
use crate::smoothing::SmoothedVec2;

/// Width used to place the glide start when the card has not been laid out.
const FALLBACK_WIDTH: f64 = 300.0;

/// Rotation gap (degrees) under which a spring tilt is at rest.
const SPRING_REST_DEG: f64 = 0.001;

/// Activation state of a [`TiltEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiltPhase {
    /// Not tracking; no frames requested.
    Idle,
    /// Just activated; the slower initial time constant applies.
    Entering,
    /// Following the pointer with the steady time constant.
    Tracking,
    /// Pointer left; recentring until settled.
    Leaving,
}

/// One-shot timed window that starts on the first frame after arming.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Window {
    Closed,
    Armed,
    Until(f64),
}

impl Window {
    fn arm(&mut self) {
        *self = Self::Armed;
    }

    fn is_open(&mut self, now_s: f64, duration_s: f64) -> bool {
        match *self {
            Self::Closed => false,
            Self::Armed => {
                *self = Self::Until(now_s + duration_s);
                duration_s > 0.0
            }
            Self::Until(until) if now_s < until => true,
            Self::Until(_) => {
                *self = Self::Closed;
                false
            }
        }
    }
}

/// CSS custom properties produced by a [`TiltEngine`], rounded to three
/// decimals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltOutput {
    /// Pointer X inside the card (%)
    pub pointer_x: f64,
    /// Pointer Y inside the card (%)
    pub pointer_y: f64,
    /// Background X (%)
    pub background_x: f64,
    /// Background Y (%)
    pub background_y: f64,
    /// Distance from the centre, 0 at the centre and 1 at an edge midpoint
    pub pointer_from_center: f64,
    /// `pointer_y / 100`
    pub pointer_from_top: f64,
    /// `pointer_x / 100`
    pub pointer_from_left: f64,
    /// Rotation about X (degrees)
    pub rotate_x: f64,
    /// Rotation about Y (degrees)
    pub rotate_y: f64,
}

impl TiltOutput {
    /// Map a position inside a card of `size` to output values.
    #[must_use]
    pub fn from_position(x: f64, y: f64, size: SurfaceSize, config: &ProfileTiltConfig) -> Self {
        let width = if size.width > 0.0 { size.width } else { 1.0 };
        let height = if size.height > 0.0 { size.height } else { 1.0 };
        let px = (100.0 / width * x).clamp(0.0, 100.0);
        let py = (100.0 / height * y).clamp(0.0, 100.0);
        let (cx, cy) = (px - 50.0, py - 50.0);
        let range = config.background_range;

        Self {
            pointer_x: round3(px),
            pointer_y: round3(py),
            background_x: round3(remap(px, 0.0, 100.0, range.min, range.max)),
            background_y: round3(remap(py, 0.0, 100.0, range.min, range.max)),
            pointer_from_center: round3((cy.hypot(cx) / 50.0).clamp(0.0, 1.0)),
            pointer_from_top: round3(py / 100.0),
            pointer_from_left: round3(px / 100.0),
            rotate_x: round3(-(cx / config.rotate_x_divisor)),
            rotate_y: round3(cy / config.rotate_y_divisor),
        }
    }

    /// `(name, value)` pairs ready for `style.setProperty`.
    #[must_use]
    pub fn css_properties(&self) -> [(&'static str, String); 9] {
        [
            ("--pointer-x", format!("{}%", self.pointer_x)),
            ("--pointer-y", format!("{}%", self.pointer_y)),
            ("--background-x", format!("{}%", self.background_x)),
            ("--background-y", format!("{}%", self.background_y)),
            ("--pointer-from-center", self.pointer_from_center.to_string()),
            ("--pointer-from-top", self.pointer_from_top.to_string()),
            ("--pointer-from-left", self.pointer_from_left.to_string()),
            ("--rotate-x", format!("{}deg", self.rotate_x)),
            ("--rotate-y", format!("{}deg", self.rotate_y)),
        ]
    }
}

/// Smoothed pointer tracking for the profile card.
#[derive(Clone, Debug)]
pub struct TiltEngine {
    config: ProfileTiltConfig,
    size: SurfaceSize,
    position: SmoothedVec2,
    phase: TiltPhase,
    initial_window: Window,
    entering_flag: Window,
    entering_visible: bool,
    active: bool,
    pointer_inside: bool,
    focused: bool,
    output: TiltOutput,
    waker: Option<TaskWaker>,
}

impl TiltEngine {
    /// Create an engine for a card of `size`, starting the entry glide from
    /// near its top-right corner toward the centre.
    #[must_use]
    pub fn new(config: ProfileTiltConfig, size: SurfaceSize) -> Self {
        let start_width = if size.width > 0.0 { size.width } else { FALLBACK_WIDTH };
        let start = (start_width - config.glide_inset_x, config.glide_inset_y);
        let mut position = SmoothedVec2::new(start.0, start.1, config.steady_tau);
        position.set_target(size.width / 2.0, size.height / 2.0);
        let output = TiltOutput::from_position(start.0, start.1, size, &config);

        let mut initial_window = Window::Closed;
        initial_window.arm();

        Self {
            config,
            size,
            position,
            phase: TiltPhase::Entering,
            initial_window,
            entering_flag: Window::Closed,
            entering_visible: false,
            active: false,
            pointer_inside: false,
            focused: true,
            output,
            waker: None,
        }
    }

    /// Keep a waker so input events can restart a sleeping engine.
    pub fn attach_waker(&mut self, waker: TaskWaker) {
        self.waker = Some(waker);
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TiltPhase {
        self.phase
    }

    /// Latest output values.
    #[must_use]
    pub fn output(&self) -> &TiltOutput {
        &self.output
    }

    /// Whether the card shows its "active" state (pointer entered, not yet
    /// settled after leaving).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the short "entering" flag is showing.
    #[must_use]
    pub fn is_entering(&self) -> bool {
        self.entering_visible
    }

    /// Smoothed position inside the card (px).
    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        self.position.current()
    }

    /// Position being approached (px).
    #[must_use]
    pub fn target(&self) -> (f64, f64) {
        self.position.target()
    }

    /// Card size.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The card was resized. Recentres when the pointer is outside.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = SurfaceSize::new(width, height);
        if !self.pointer_inside {
            if self.phase == TiltPhase::Idle {
                self.phase = TiltPhase::Leaving;
            }
            self.retarget(width / 2.0, height / 2.0);
        }
    }

    /// Record window focus. While unfocused, pointer moves are ignored.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Pointer entered the card at local `(x, y)`.
    pub fn pointer_enter(&mut self, x: f64, y: f64) {
        self.pointer_inside = true;
        self.active = true;
        self.entering_flag.arm();
        self.entering_visible = true;
        match self.phase {
            TiltPhase::Idle => {
                self.phase = TiltPhase::Entering;
                self.initial_window.arm();
            }
            TiltPhase::Leaving => self.phase = TiltPhase::Tracking,
            TiltPhase::Entering | TiltPhase::Tracking => {}
        }
        debug!(phase = ?self.phase, "tilt pointer enter");
        self.retarget(x, y);
    }

    /// Pointer moved to local `(x, y)` inside the card.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.focused {
            trace!("tilt ignoring move while unfocused");
            return;
        }
        self.pointer_inside = true;
        if matches!(self.phase, TiltPhase::Idle | TiltPhase::Leaving) {
            self.phase = TiltPhase::Tracking;
        }
        self.retarget(x, y);
    }

    /// Pointer left the card; recentre.
    pub fn pointer_leave(&mut self) {
        self.pointer_inside = false;
        self.phase = TiltPhase::Leaving;
        debug!("tilt pointer leave");
        self.retarget(self.size.width / 2.0, self.size.height / 2.0);
    }

    fn retarget(&mut self, x: f64, y: f64) {
        self.position.set_target(x, y);
        if let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    /// Advance the smoothed position by one frame and refresh the output.
    pub fn step(&mut self, time: &FrameTime) -> StepOutcome {
        if self.size.is_degenerate() {
            debug!(
                width = self.size.width,
                height = self.size.height,
                "tilt skipped: degenerate card size"
            );
            return StepOutcome::Skipped;
        }

        let initial = self
            .initial_window
            .is_open(time.now_s, self.config.initial_window_s);
        if self.phase == TiltPhase::Entering && !initial {
            self.phase = if self.pointer_inside {
                TiltPhase::Tracking
            } else {
                TiltPhase::Leaving
            };
        }
        let tau = if initial {
            self.config.initial_tau
        } else {
            self.config.steady_tau
        };

        let (x, y) = self.position.update_with_tau(time.delta_s, tau);
        self.output = TiltOutput::from_position(x, y, self.size, &self.config);
        self.entering_visible = self
            .entering_flag
            .is_open(time.now_s, self.config.entering_flag_s);
        StepOutcome::Applied
    }

    fn at_rest(&self) -> bool {
        let rest = self.config.rest_threshold;
        self.position.x.gap() <= rest && self.position.y.gap() <= rest
    }

    /// Decide whether more frames are needed after a [`Self::step`].
    fn schedule(&mut self) -> TaskStatus {
        if self.entering_visible {
            return TaskStatus::Continue;
        }
        match self.phase {
            TiltPhase::Idle => TaskStatus::Sleep,
            TiltPhase::Entering => TaskStatus::Continue,
            TiltPhase::Tracking if self.at_rest() => TaskStatus::Sleep,
            TiltPhase::Tracking => TaskStatus::Continue,
            TiltPhase::Leaving if self.position.distance() < self.config.settle_threshold => {
                let (tx, ty) = self.position.target();
                self.position.set_current(tx, ty);
                self.output = TiltOutput::from_position(tx, ty, self.size, &self.config);
                self.active = false;
                self.phase = TiltPhase::Idle;
                debug!("tilt settled");
                TaskStatus::Sleep
            }
            TiltPhase::Leaving => TaskStatus::Continue,
        }
    }
}

impl FrameTask for TiltEngine {
    fn name(&self) -> &'static str {
        "profile-tilt"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        self.focused = input.focused;
        if self.phase == TiltPhase::Idle && !self.entering_visible {
            return Ok(TaskStatus::Sleep);
        }
        match self.step(time) {
            StepOutcome::Skipped => Ok(TaskStatus::Continue),
            StepOutcome::Applied => Ok(self.schedule()),
        }
    }
}

/// Spring-smoothed rotation for `[data-tilt]` elements.
#[derive(Clone, Debug)]
pub struct SpringTilt {
    config: TiltConfig,
    rotation: SmoothedVec2,
    enabled: bool,
    waker: Option<TaskWaker>,
}

impl SpringTilt {
    /// Create a tilt at rest.
    #[must_use]
    pub fn new(config: TiltConfig) -> Self {
        let rotation = SmoothedVec2::new(0.0, 0.0, config.tau);
        Self {
            config,
            rotation,
            enabled: true,
            waker: None,
        }
    }

    /// Keep a waker so pointer events can restart a sleeping tilt.
    pub fn attach_waker(&mut self, waker: TaskWaker) {
        self.waker = Some(waker);
    }

    /// Pointer tilt is off on narrow viewports; disabling relaxes to flat.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.enabled = policy.allows_pointer_effects();
        if !self.enabled {
            self.retarget(0.0, 0.0);
        }
    }

    /// Pointer at viewport `(x, y)` over an element occupying `rect`.
    pub fn pointer_move(&mut self, rect: Rect, x: f64, y: f64) -> StepOutcome {
        if !self.enabled {
            return StepOutcome::Skipped;
        }
        let Some((nx, ny)) = rect.normalized(x, y) else {
            return StepOutcome::Skipped;
        };
        let max = self.config.max_deg;
        self.retarget((ny - 0.5) * -max, (nx - 0.5) * max);
        StepOutcome::Applied
    }

    /// Pointer left; relax to flat.
    pub fn pointer_leave(&mut self) {
        self.retarget(0.0, 0.0);
    }

    fn retarget(&mut self, rx: f64, ry: f64) {
        self.rotation.set_target(rx, ry);
        if let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    /// Current `(rotate_x, rotate_y)` in degrees.
    #[must_use]
    pub fn rotation(&self) -> (f64, f64) {
        self.rotation.current()
    }

    /// Target `(rotate_x, rotate_y)` in degrees.
    #[must_use]
    pub fn target(&self) -> (f64, f64) {
        self.rotation.target()
    }

    /// CSS `transform` value.
    #[must_use]
    pub fn transform_css(&self) -> String {
        let (rx, ry) = self.rotation.current();
        format!(
            "perspective({}px) rotateX({:.3}deg) rotateY({:.3}deg)",
            self.config.perspective_px, rx, ry
        )
    }
}

impl FrameTask for SpringTilt {
    fn name(&self) -> &'static str {
        "spring-tilt"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        self.rotation.update(time.delta_s);
        if self.rotation.x.is_settled(SPRING_REST_DEG) && self.rotation.y.is_settled(SPRING_REST_DEG) {
            let (rx, ry) = self.rotation.target();
            self.rotation.set_current(rx, ry);
            return Ok(TaskStatus::Sleep);
        }
        Ok(TaskStatus::Continue)
    }
}

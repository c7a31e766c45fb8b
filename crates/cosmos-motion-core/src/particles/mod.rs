//! Background particle system: starfield, shooting stars and rocket trails.
//!
//! The system owns every particle and redraws them all each frame onto a
//! [`DrawSurface`] it borrows. Spawning is periodic (via [`IntervalTimer`])
//! and gated by [`MotionPolicy`]. Decay constants are per reference tick, so
//! a particle with decay `d` dies after exactly `ceil(1 / d)` ticks.

mod rocket;
mod shooting_star;
mod star;

pub use rocket::{ExhaustPuff, Rocket};
pub use shooting_star::ShootingStar;
pub use star::{wrapped_y, Star};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{MotionConfig, MotionPolicy, RocketConfig, ShootingStarConfig, StarfieldConfig};
use crate::error::{MotionError, Result};
use crate::frame::{FrameTask, FrameTime, IntervalTimer, TaskStatus};
use crate::pointer::PointerSnapshot;
use crate::render::{DrawSurface, Rgba, SurfaceSize};
use crate::rng::{RandomSource, SeededRandom};

/// Life below this is treated as zero, absorbing float drift in repeated
/// subtraction.
const LIFE_EPSILON: f64 = 1e-9;

/// Remaining life of a transient particle, in `[0, 1]`.
///
/// Only ever decreases; a particle is dead once it reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Life(f64);

impl Life {
    /// Freshly spawned.
    pub const FULL: Self = Self(1.0);

    /// Create from a raw value, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) })
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Lose `amount`; negative amounts are ignored.
    pub fn decay(&mut self, amount: f64) {
        let next = self.0 - amount.max(0.0);
        self.0 = if next <= LIFE_EPSILON { 0.0 } else { next };
    }

    /// Whether any life remains.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0 > 0.0
    }
}

/// Every particle plus spawn timing.
#[derive(Debug)]
pub struct ParticleSystem<R = SeededRandom> {
    starfield: StarfieldConfig,
    shooting: ShootingStarConfig,
    rocket: RocketConfig,
    policy: MotionPolicy,
    size: Option<SurfaceSize>,
    stars: Vec<Star>,
    shooting_stars: Vec<ShootingStar>,
    rockets: Vec<Rocket>,
    shooting_timer: IntervalTimer,
    rocket_timer: IntervalTimer,
    rng: R,
}

impl<R: RandomSource> ParticleSystem<R> {
    /// Create a detached system; nothing spawns until [`Self::resize`].
    pub fn new(config: &MotionConfig, rng: R) -> Self {
        Self {
            starfield: config.starfield.clone(),
            shooting: config.shooting_stars.clone(),
            rocket: config.rockets.clone(),
            policy: MotionPolicy::default(),
            size: None,
            stars: Vec::new(),
            shooting_stars: Vec::with_capacity(config.shooting_stars.capacity),
            rockets: Vec::with_capacity(config.rockets.capacity),
            shooting_timer: IntervalTimer::new(config.shooting_stars.interval_s),
            rocket_timer: IntervalTimer::new(config.rockets.interval_s),
            rng,
        }
    }

    /// Current policy.
    #[must_use]
    pub fn policy(&self) -> MotionPolicy {
        self.policy
    }

    /// Apply a new policy. Takes effect for spawns from now on; a change in
    /// viewport class also re-lays the stars.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        let relayout = policy.narrow_viewport != self.policy.narrow_viewport;
        self.policy = policy;
        if relayout {
            if let Some(size) = self.size {
                self.layout_stars(size);
            }
        }
    }

    /// Size of the attached surface, if any.
    #[must_use]
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    /// Whether a usable surface is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.size.is_some()
    }

    /// Match a surface of `width` x `height`, re-laying the stars.
    ///
    /// A degenerate size detaches the system and is reported as an error.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        let size = SurfaceSize::new(width, height);
        if size.is_degenerate() {
            self.detach();
            return Err(MotionError::DegenerateGeometry {
                what: "particle surface",
                width,
                height,
            });
        }
        self.size = Some(size);
        self.layout_stars(size);
        Ok(())
    }

    /// Drop the surface and every particle.
    pub fn detach(&mut self) {
        self.size = None;
        self.stars.clear();
        self.shooting_stars.clear();
        self.rockets.clear();
    }

    fn layout_stars(&mut self, size: SurfaceSize) {
        let count = if self.policy.narrow_viewport {
            self.starfield.narrow_count
        } else {
            self.starfield.count
        };
        let starfield = &self.starfield;
        let rng = &mut self.rng;
        self.stars = (0..count).map(|_| Star::spawn(starfield, size, rng)).collect();
        debug!(count, width = size.width, height = size.height, "laid out starfield");
    }

    /// Spawn one shooting star now. Returns `false` when detached, when the
    /// policy forbids it or at capacity.
    pub fn spawn_shooting_star(&mut self) -> bool {
        let Some(size) = self.size else {
            return false;
        };
        if !self.policy.allows_transients() {
            return false;
        }
        let star = ShootingStar::spawn(&self.shooting, size, &mut self.rng);
        self.insert_shooting_star(star)
    }

    /// Add a pre-built shooting star, subject to capacity.
    pub fn insert_shooting_star(&mut self, star: ShootingStar) -> bool {
        if self.shooting_stars.len() >= self.shooting.capacity {
            trace!("shooting star capacity reached");
            return false;
        }
        self.shooting_stars.push(star);
        true
    }

    /// Spawn one rocket now. Returns `false` when detached, when the policy
    /// forbids it or at capacity.
    pub fn spawn_rocket(&mut self) -> bool {
        let Some(size) = self.size else {
            return false;
        };
        if !self.policy.allows_rockets() || self.rockets.len() >= self.rocket.capacity {
            return false;
        }
        let rocket = Rocket::spawn(&self.rocket, size, &mut self.rng);
        self.rockets.push(rocket);
        true
    }

    /// Poll the spawn timers, then advance every particle by the frame delta.
    pub fn update(&mut self, time: &FrameTime) {
        if self.size.is_none() {
            return;
        }
        if self.shooting_timer.poll(time.now_s) {
            self.spawn_shooting_star();
        }
        if self.rocket_timer.poll(time.now_s) {
            self.spawn_rocket();
        }
        self.advance(time.ticks());
    }

    /// Advance every particle by `ticks` reference frames and evict the dead.
    pub fn advance(&mut self, ticks: f64) {
        let ticks = ticks.max(0.0);
        for star in &mut self.stars {
            star.advance(ticks);
        }
        for streak in &mut self.shooting_stars {
            streak.advance(ticks);
        }
        self.shooting_stars.retain(ShootingStar::is_alive);

        let config = &self.rocket;
        let rng = &mut self.rng;
        for rocket in &mut self.rockets {
            rocket.advance(ticks, config, rng);
        }
        self.rockets.retain(Rocket::is_alive);
    }

    /// Star position for this frame's scroll and pointer.
    #[must_use]
    pub fn star_position(&self, star: &Star, input: &PointerSnapshot) -> (f64, f64) {
        let Some(size) = self.size else {
            return (star.x, star.y);
        };
        let scroll_offset = input.scroll_y * self.starfield.scroll_factor;
        let shift = if self.policy.allows_pointer_effects() {
            let factor = self.starfield.pointer_factor;
            (
                (input.x - size.width / 2.0) * factor,
                (input.y - size.height / 2.0) * factor,
            )
        } else {
            (0.0, 0.0)
        };
        star.screen_position(scroll_offset, shift, size.height)
    }

    /// Draw every particle. The caller clears the surface first.
    pub fn render<S: DrawSurface>(&self, surface: &mut S, input: &PointerSnapshot) -> core::result::Result<(), S::Error> {
        if self.size.is_none() {
            return Ok(());
        }
        let color = self.starfield.color;
        for star in &self.stars {
            let (x, y) = self.star_position(star, input);
            surface.fill_circle(x, y, star.size, Rgba::from_rgb(color, star.current_alpha()))?;
        }
        for streak in &self.shooting_stars {
            streak.render(surface)?;
        }
        for rocket in &self.rockets {
            rocket.render(surface)?;
        }
        Ok(())
    }

    /// Background stars.
    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Live shooting stars.
    #[must_use]
    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    /// Live rockets.
    #[must_use]
    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    /// Transient particles alive, exhaust included.
    #[must_use]
    pub fn transient_count(&self) -> usize {
        self.shooting_stars.len()
            + self
                .rockets
                .iter()
                .map(|rocket| 1 + rocket.exhaust().len())
                .sum::<usize>()
    }
}

/// A [`ParticleSystem`] bound to the surface it draws on.
///
/// Each frame it follows the surface size, advances the particles, clears
/// and redraws.
pub struct Starfield<S, R = SeededRandom> {
    system: ParticleSystem<R>,
    surface: S,
}

impl<S: DrawSurface, R: RandomSource> Starfield<S, R> {
    /// Bind a system to a surface, laying out stars for its current size.
    pub fn new(mut system: ParticleSystem<R>, surface: S) -> Self {
        let size = surface.size();
        if let Err(err) = system.resize(size.width, size.height) {
            debug!("starfield starts detached: {err}");
        }
        Self { system, surface }
    }

    /// The particles.
    #[must_use]
    pub fn system(&self) -> &ParticleSystem<R> {
        &self.system
    }

    /// Mutable access, e.g. to change the policy.
    pub fn system_mut(&mut self) -> &mut ParticleSystem<R> {
        &mut self.system
    }

    /// The bound surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to resize a canvas.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: DrawSurface, R: RandomSource> FrameTask for Starfield<S, R> {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let size = self.surface.size();
        if self.system.size() != Some(size) {
            if size.is_degenerate() {
                if self.system.is_attached() {
                    self.system.detach();
                }
                return Ok(TaskStatus::Continue);
            }
            self.system.resize(size.width, size.height)?;
        }

        self.system.update(time);
        self.surface.clear().map_err(MotionError::surface)?;
        self.system
            .render(&mut self.surface, input)
            .map_err(MotionError::surface)?;
        Ok(TaskStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use crate::rng::SequenceRandom;

    fn system() -> ParticleSystem<SequenceRandom> {
        let mut system = ParticleSystem::new(&MotionConfig::default(), SequenceRandom::constant(0.5));
        system.resize(1000.0, 600.0).expect("valid size");
        system
    }

    #[test]
    fn test_life_decay_is_monotonic_and_floors() {
        let mut life = Life::FULL;
        life.decay(-1.0);
        assert_eq!(life.value(), 1.0);
        life.decay(0.4);
        life.decay(0.7);
        assert_eq!(life.value(), 0.0);
        assert!(!life.is_alive());
    }

    #[test]
    fn test_shooting_star_dies_after_ceil_ticks() {
        for decay in [0.015, 0.3, 0.07, 0.25] {
            let mut system = system();
            let mut streak = ShootingStar::spawn(
                &ShootingStarConfig::default(),
                SurfaceSize::new(1000.0, 600.0),
                &mut SequenceRandom::constant(0.5),
            );
            streak.decay = decay;
            assert!(system.insert_shooting_star(streak));

            let n = (1.0 / decay).ceil() as usize;
            for _ in 0..n - 1 {
                system.advance(1.0);
            }
            assert_eq!(system.shooting_stars().len(), 1, "decay {decay}");
            system.advance(1.0);
            assert!(system.shooting_stars().is_empty(), "decay {decay}");
        }
    }

    #[test]
    fn test_star_count_follows_viewport_class() {
        let mut system = system();
        assert_eq!(system.stars().len(), 200);
        system.set_policy(MotionPolicy::from_viewport(600.0, false));
        assert_eq!(system.stars().len(), 80);
    }

    #[test]
    fn test_reduced_motion_blocks_spawns() {
        let mut system = system();
        system.set_policy(MotionPolicy::from_viewport(1400.0, true));
        assert!(!system.spawn_shooting_star());
        assert!(!system.spawn_rocket());
        assert_eq!(system.transient_count(), 0);
    }

    #[test]
    fn test_narrow_blocks_rockets_only() {
        let mut system = system();
        system.set_policy(MotionPolicy::from_viewport(600.0, false));
        assert!(system.spawn_shooting_star());
        assert!(!system.spawn_rocket());
    }

    #[test]
    fn test_detached_system_is_inert() {
        let mut system = ParticleSystem::new(&MotionConfig::default(), SequenceRandom::constant(0.5));
        assert!(!system.spawn_shooting_star());
        system.update(&FrameTime::fixed(0, 10.0, 1.0 / 60.0));
        assert!(system.stars().is_empty());
        assert!(system.resize(0.0, 600.0).is_err());
        assert!(!system.is_attached());
    }

    #[test]
    fn test_capacity_bounds_shooting_stars() {
        let mut system = system();
        let capacity = ShootingStarConfig::default().capacity;
        for _ in 0..capacity {
            assert!(system.spawn_shooting_star());
        }
        assert!(!system.spawn_shooting_star());
    }

    #[test]
    fn test_timers_spawn_on_schedule() {
        let mut system = system();
        let mut time = FrameTime::fixed(0, 0.0, 0.0);
        system.update(&time);
        while time.now_s < 3.05 {
            time = time.next(1.0 / 60.0);
            system.update(&time);
        }
        assert_eq!(system.shooting_stars().len(), 1);
        assert!(system.rockets().is_empty());
    }

    #[test]
    fn test_star_positions_stay_on_surface_vertically() {
        let system = system();
        let mut input = PointerSnapshot::default();
        for scroll in [0.0, 250.0, 12_345.0] {
            input.scroll_y = scroll;
            for star in system.stars() {
                let (_, y) = system.star_position(star, &input);
                let max_shift = 600.0 / 2.0 * 0.003 * 4.0;
                assert!(y >= -max_shift && y < 600.0 + max_shift);
            }
        }
    }

    #[test]
    fn test_starfield_task_redraws_each_frame() {
        let system = ParticleSystem::new(&MotionConfig::default(), SequenceRandom::constant(0.5));
        let mut field = Starfield::new(system, RecordingSurface::new(800.0, 400.0));
        let input = PointerSnapshot::default();

        let status = field.update(&FrameTime::fixed(0, 0.0, 0.0), &input).expect("frame");
        assert_eq!(status, TaskStatus::Continue);
        assert_eq!(field.surface().circle_count(), 200);

        field.surface_mut().resize(0.0, 0.0);
        field.update(&FrameTime::fixed(1, 0.016, 0.016), &input).expect("frame");
        assert!(!field.system().is_attached());
    }
}

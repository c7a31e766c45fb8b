//! Rockets that cross the sky leaving an exhaust trail.
//!
//! The exhaust belongs to its rocket: when the rocket burns out the whole
//! trail goes with it, even puffs that still had life left.

use serde::{Deserialize, Serialize};

use super::Life;
use crate::config::{RocketConfig, Span};
use crate::render::{DrawSurface, Rgba, SurfaceSize};
use crate::rng::RandomSource;

const EXHAUST_COLOR: [u8; 3] = [124, 58, 237];
const HEAD_COLOR: [u8; 3] = [167, 139, 250];
const HEAD_RADIUS: f64 = 2.5;
const GLOW_BLUR: f64 = 12.0;
const GLOW_ALPHA: f64 = 0.4;
const EDGE_MARGIN: f64 = 10.0;

/// One exhaust particle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExhaustPuff {
    /// X (px)
    pub x: f64,
    /// Y (px)
    pub y: f64,
    /// Horizontal velocity (px per tick)
    pub vx: f64,
    /// Vertical velocity (px per tick)
    pub vy: f64,
    /// Radius at full life (px)
    pub size: f64,
    /// Remaining life
    pub life: Life,
    /// Life lost per tick
    pub decay: f64,
}

impl ExhaustPuff {
    fn emit(config: &RocketConfig, x: f64, y: f64, rng: &mut impl RandomSource) -> Self {
        Self {
            x,
            y,
            vx: config.exhaust_vx.sample(rng),
            vy: config.exhaust_vy.sample(rng),
            size: config.exhaust_size.sample(rng),
            life: Life::FULL,
            decay: config.exhaust_decay,
        }
    }

    fn advance(&mut self, ticks: f64) {
        self.x += self.vx * ticks;
        self.y += self.vy * ticks;
        self.life.decay(self.decay * ticks);
    }

    /// Current radius; shrinks with life.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.size * self.life.value()
    }
}

/// A rocket and its exhaust.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    /// X (px)
    pub x: f64,
    /// Y (px)
    pub y: f64,
    /// Horizontal velocity (px per tick)
    pub vx: f64,
    /// Vertical velocity (px per tick, negative is up)
    pub vy: f64,
    /// Remaining life
    pub life: Life,
    /// Life lost per tick
    pub decay: f64,
    exhaust: Vec<ExhaustPuff>,
    /// Fraction of a tick not yet given an emission draw
    #[serde(default)]
    emit_carry: f64,
}

impl Rocket {
    /// Enter just outside the left or right edge, heading inward and up.
    pub fn spawn(config: &RocketConfig, size: SurfaceSize, rng: &mut impl RandomSource) -> Self {
        let from_left = rng.next_f64() > 0.5;
        let band = Span {
            min: size.height * config.entry_band.min,
            max: size.height * config.entry_band.max,
        };
        let y = band.sample(rng);
        let speed = config.speed_x.sample(rng);
        let climb = config.climb.sample(rng);
        Self {
            x: if from_left {
                -EDGE_MARGIN
            } else {
                size.width + EDGE_MARGIN
            },
            y,
            vx: if from_left { speed } else { -speed },
            vy: -climb,
            life: Life::FULL,
            decay: config.decay,
            exhaust: Vec::new(),
            emit_carry: 0.0,
        }
    }

    /// Move, fade and update the exhaust.
    ///
    /// Every whole tick elapsed gets one emission draw: a new puff appears at
    /// the current position with probability `1 - exhaust_threshold`, up to
    /// `exhaust_capacity`. Partial ticks carry over to the next call, so the
    /// emission rate is the same at any display refresh rate.
    pub fn advance(&mut self, ticks: f64, config: &RocketConfig, rng: &mut impl RandomSource) {
        self.x += self.vx * ticks;
        self.y += self.vy * ticks;
        self.life.decay(self.decay * ticks);
        if !self.life.is_alive() {
            self.exhaust.clear();
            return;
        }

        self.emit_carry += ticks.max(0.0);
        while self.emit_carry >= 1.0 {
            self.emit_carry -= 1.0;
            if rng.next_f64() > config.exhaust_threshold && self.exhaust.len() < config.exhaust_capacity {
                self.exhaust.push(ExhaustPuff::emit(config, self.x, self.y, rng));
            }
        }
        for puff in &mut self.exhaust {
            puff.advance(ticks);
        }
        self.exhaust.retain(|puff| puff.life.is_alive());
    }

    /// Whether the rocket is still flying.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    /// Live exhaust puffs.
    #[must_use]
    pub fn exhaust(&self) -> &[ExhaustPuff] {
        &self.exhaust
    }

    /// Draw the exhaust, then the glowing head.
    pub fn render<S: DrawSurface>(&self, surface: &mut S) -> Result<(), S::Error> {
        for puff in &self.exhaust {
            let life = puff.life.value();
            surface.fill_circle(
                puff.x,
                puff.y,
                puff.radius(),
                Rgba::from_rgb(EXHAUST_COLOR, life * 0.5),
            )?;
        }
        surface.set_glow(GLOW_BLUR, Rgba::from_rgb(HEAD_COLOR, GLOW_ALPHA))?;
        surface.fill_circle(
            self.x,
            self.y,
            HEAD_RADIUS,
            Rgba::from_rgb(HEAD_COLOR, self.life.value() * 0.6),
        )?;
        surface.set_glow(0.0, Rgba::from_rgb(HEAD_COLOR, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};
    use crate::rng::SequenceRandom;

    #[test]
    fn test_spawn_sides() {
        let cfg = RocketConfig::default();
        let size = SurfaceSize::new(1000.0, 600.0);

        let left = Rocket::spawn(&cfg, size, &mut SequenceRandom::constant(0.9));
        assert_eq!(left.x, -10.0);
        assert!(left.vx > 0.0);
        assert!(left.vy < 0.0);
        assert!((180.0..420.0).contains(&left.y));

        let right = Rocket::spawn(&cfg, size, &mut SequenceRandom::constant(0.1));
        assert_eq!(right.x, 1010.0);
        assert!(right.vx < 0.0);
    }

    #[test]
    fn test_exhaust_emitted_above_threshold() {
        let cfg = RocketConfig::default();
        let mut rocket = Rocket::spawn(&cfg, SurfaceSize::new(100.0, 100.0), &mut SequenceRandom::constant(0.9));

        rocket.advance(1.0, &cfg, &mut SequenceRandom::constant(0.1));
        assert!(rocket.exhaust().is_empty());

        rocket.advance(1.0, &cfg, &mut SequenceRandom::constant(0.9));
        assert_eq!(rocket.exhaust().len(), 1);
    }

    #[test]
    fn test_zero_tick_frame_emits_nothing() {
        let cfg = RocketConfig::default();
        let mut rocket = Rocket::spawn(&cfg, SurfaceSize::new(100.0, 100.0), &mut SequenceRandom::constant(0.9));
        rocket.advance(0.0, &cfg, &mut SequenceRandom::constant(0.9));
        assert!(rocket.exhaust().is_empty());

        // half ticks accumulate into one draw
        rocket.advance(0.5, &cfg, &mut SequenceRandom::constant(0.9));
        assert!(rocket.exhaust().is_empty());
        rocket.advance(0.5, &cfg, &mut SequenceRandom::constant(0.9));
        assert_eq!(rocket.exhaust().len(), 1);
    }

    /// Live puffs after one simulated second at `hz`.
    fn exhaust_after_one_second(hz: u32, cfg: &RocketConfig) -> usize {
        let mut rng = SequenceRandom::constant(0.9);
        let mut rocket = Rocket::spawn(cfg, SurfaceSize::new(1000.0, 600.0), &mut rng);
        let ticks = 60.0 / f64::from(hz);
        for _ in 0..hz {
            rocket.advance(ticks, cfg, &mut rng);
        }
        rocket.exhaust().len()
    }

    #[test]
    fn test_exhaust_rate_independent_of_refresh_rate() {
        let cfg = RocketConfig {
            exhaust_decay: 0.001,
            exhaust_capacity: 1000,
            ..RocketConfig::default()
        };
        let at30 = exhaust_after_one_second(30, &cfg);
        let at60 = exhaust_after_one_second(60, &cfg);
        let at144 = exhaust_after_one_second(144, &cfg);
        assert_eq!(at30, 60);
        assert_eq!(at60, 60);
        assert!((59..=60).contains(&at144), "at144={at144}");
    }

    #[test]
    fn test_exhaust_capacity() {
        let cfg = RocketConfig {
            exhaust_capacity: 3,
            exhaust_decay: 0.0001,
            ..RocketConfig::default()
        };
        let mut rocket = Rocket::spawn(&cfg, SurfaceSize::new(100.0, 100.0), &mut SequenceRandom::constant(0.9));
        let mut rng = SequenceRandom::constant(0.9);
        for _ in 0..10 {
            rocket.advance(1.0, &cfg, &mut rng);
        }
        assert_eq!(rocket.exhaust().len(), 3);
    }

    #[test]
    fn test_trail_discarded_with_rocket() {
        let cfg = RocketConfig {
            decay: 0.25,
            exhaust_decay: 0.001,
            ..RocketConfig::default()
        };
        let mut rocket = Rocket::spawn(&cfg, SurfaceSize::new(100.0, 100.0), &mut SequenceRandom::constant(0.9));
        let mut rng = SequenceRandom::constant(0.9);
        rocket.advance(1.0, &cfg, &mut rng);
        rocket.advance(1.0, &cfg, &mut rng);
        assert!(!rocket.exhaust().is_empty());

        rocket.advance(1.0, &cfg, &mut rng);
        rocket.advance(1.0, &cfg, &mut rng);
        assert!(!rocket.is_alive());
        assert!(rocket.exhaust().is_empty());
    }

    #[test]
    fn test_glow_reset_after_head() {
        let cfg = RocketConfig::default();
        let rocket = Rocket::spawn(&cfg, SurfaceSize::new(100.0, 100.0), &mut SequenceRandom::constant(0.9));
        let mut surface = RecordingSurface::new(100.0, 100.0);
        rocket.render(&mut surface).ok();
        match surface.commands().last() {
            Some(DrawCommand::Glow { blur, .. }) => assert_eq!(*blur, 0.0),
            other => panic!("expected glow reset, got {other:?}"),
        }
    }
}

//! Short-lived streaks that cross the upper part of the sky.

use serde::{Deserialize, Serialize};

use super::Life;
use crate::config::ShootingStarConfig;
use crate::render::{DrawSurface, Rgba, SurfaceSize};
use crate::rng::RandomSource;

const TRAIL_COLOR: [u8; 3] = [167, 139, 250];
const HEAD_COLOR: [u8; 3] = [255, 255, 255];
const TRAIL_WIDTH: f64 = 1.5;
const HEAD_RADIUS: f64 = 2.0;

/// A streak moving in a straight line while it fades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShootingStar {
    /// Head X (px)
    pub x: f64,
    /// Head Y (px)
    pub y: f64,
    /// Trail length (px)
    pub length: f64,
    /// Speed (px per tick)
    pub speed: f64,
    /// Heading (radians)
    pub angle: f64,
    /// Remaining life
    pub life: Life,
    /// Life lost per tick
    pub decay: f64,
}

impl ShootingStar {
    /// Spawn in the upper-left region of a surface.
    pub fn spawn(config: &ShootingStarConfig, size: SurfaceSize, rng: &mut impl RandomSource) -> Self {
        Self {
            x: rng.next_f64() * size.width * config.origin_x_fraction,
            y: rng.next_f64() * size.height * config.origin_y_fraction,
            length: config.length.sample(rng),
            speed: config.speed.sample(rng),
            angle: config.angle.sample(rng),
            life: Life::FULL,
            decay: config.decay,
        }
    }

    /// Move along the heading and fade.
    pub fn advance(&mut self, ticks: f64) {
        let step = self.speed * ticks;
        self.x += self.angle.cos() * step;
        self.y += self.angle.sin() * step;
        self.life.decay(self.decay * ticks);
    }

    /// Whether the streak is still visible.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    /// End of the trail, opposite the heading.
    #[must_use]
    pub fn tail(&self) -> (f64, f64) {
        (
            self.x - self.angle.cos() * self.length,
            self.y - self.angle.sin() * self.length,
        )
    }

    /// Draw the fading trail and the bright head.
    pub fn render<S: DrawSurface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let life = self.life.value();
        surface.stroke_gradient_line(
            (self.x, self.y),
            self.tail(),
            TRAIL_WIDTH,
            Rgba::from_rgb(TRAIL_COLOR, life),
            Rgba::from_rgb(TRAIL_COLOR, 0.0),
        )?;
        surface.fill_circle(self.x, self.y, HEAD_RADIUS, Rgba::from_rgb(HEAD_COLOR, life))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};
    use crate::rng::SequenceRandom;

    fn streak() -> ShootingStar {
        ShootingStar {
            x: 100.0,
            y: 50.0,
            length: 80.0,
            speed: 10.0,
            angle: 0.6,
            life: Life::FULL,
            decay: 0.015,
        }
    }

    #[test]
    fn test_ten_ticks() {
        let mut s = streak();
        for _ in 0..10 {
            s.advance(1.0);
        }
        assert!((s.life.value() - 0.85).abs() < 1e-9);
        assert!((s.x - (100.0 + 100.0 * 0.6f64.cos())).abs() < 1e-9);
        assert!((s.y - (50.0 + 100.0 * 0.6f64.sin())).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_region() {
        let cfg = ShootingStarConfig::default();
        let mut rng = SequenceRandom::new(vec![0.99, 0.99, 0.0, 0.0, 0.0]);
        let s = ShootingStar::spawn(&cfg, SurfaceSize::new(1000.0, 500.0), &mut rng);
        assert!(s.x < 700.0);
        assert!(s.y < 200.0);
        assert_eq!(s.length, 40.0);
        assert_eq!(s.angle, std::f64::consts::FRAC_PI_6);
    }

    #[test]
    fn test_render_fades_to_transparent_tail() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let s = streak();
        s.render(&mut surface).ok();
        let DrawCommand::Line {
            from_color,
            to_color,
            width,
            ..
        } = surface.commands()[0]
        else {
            panic!("expected a line first");
        };
        assert_eq!(from_color.a, 1.0);
        assert_eq!(to_color.a, 0.0);
        assert_eq!(width, 1.5);
        assert_eq!(surface.circle_count(), 1);
    }
}

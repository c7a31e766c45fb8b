//! Background stars.
//!
//! Stars are laid out once per surface size and never evicted. Each frame they
//! twinkle, drift with page scroll (wrapping vertically) and shift slightly
//! with the pointer, scaled by depth.

use serde::{Deserialize, Serialize};

use crate::config::StarfieldConfig;
use crate::render::SurfaceSize;
use crate::rng::RandomSource;

/// A single background star.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Base X (px)
    pub x: f64,
    /// Base Y before scroll drift (px)
    pub y: f64,
    /// Radius (px)
    pub size: f64,
    /// Base opacity
    pub alpha: f64,
    /// Twinkle phase advance per tick (radians)
    pub twinkle_speed: f64,
    /// Current twinkle phase (radians)
    pub twinkle_phase: f64,
    /// Parallax depth multiplier
    pub depth: f64,
}

impl Star {
    /// Place a star uniformly on a surface of `size`.
    pub fn spawn(config: &StarfieldConfig, size: SurfaceSize, rng: &mut impl RandomSource) -> Self {
        Self {
            x: rng.next_f64() * size.width,
            y: rng.next_f64() * size.height,
            size: config.size.sample(rng),
            alpha: config.alpha.sample(rng),
            twinkle_speed: config.twinkle_speed.sample(rng),
            twinkle_phase: rng.next_f64() * std::f64::consts::TAU,
            depth: config.depth.sample(rng),
        }
    }

    /// Advance the twinkle by `ticks` reference frames.
    pub fn advance(&mut self, ticks: f64) {
        self.twinkle_phase = (self.twinkle_phase + self.twinkle_speed * ticks) % std::f64::consts::TAU;
    }

    /// Brightness multiplier in `[0.4, 1.0]`.
    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.twinkle_phase.sin() * 0.3 + 0.7
    }

    /// Opacity to draw with this frame.
    #[must_use]
    pub fn current_alpha(&self) -> f64 {
        self.alpha * self.brightness()
    }

    /// On-screen position for a scroll offset and pointer displacement.
    ///
    /// `pointer_shift` is the per-unit-depth pointer parallax; it is
    /// multiplied by this star's depth.
    #[must_use]
    pub fn screen_position(&self, scroll_offset: f64, pointer_shift: (f64, f64), height: f64) -> (f64, f64) {
        let y = wrapped_y(self.y, scroll_offset, self.depth, height);
        (
            self.x + pointer_shift.0 * self.depth,
            y + pointer_shift.1 * self.depth,
        )
    }
}

/// Vertical position after scroll drift, wrapped into `[0, height)`.
///
/// Stars that drift off one edge re-enter from the other. A non-positive
/// height returns `0.0`.
#[must_use]
pub fn wrapped_y(base_y: f64, scroll_offset: f64, depth: f64, height: f64) -> f64 {
    if !(height > 0.0) {
        return 0.0;
    }
    let y = (base_y - scroll_offset * depth).rem_euclid(height);
    // rem_euclid rounds tiny negatives up to exactly `height`
    if y >= height || !y.is_finite() {
        0.0
    } else {
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    #[test]
    fn test_wrapped_y_in_range() {
        let heights = [1.0, 720.0, 1080.5];
        let scrolls = [0.0, 0.3, 50.0, 1234.5, -999.0, 1e7];
        let depths = [1.0, 2.5, 3.99];
        for &h in &heights {
            for &s in &scrolls {
                for &d in &depths {
                    for base in [0.0, h * 0.5, h - 1e-9] {
                        let y = wrapped_y(base, s, d, h);
                        assert!((0.0..h).contains(&y), "y={y} h={h} s={s} d={d}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_wrapped_y_tiny_negative() {
        let y = wrapped_y(0.0, 1e-20, 1.0, 100.0);
        assert!((0.0..100.0).contains(&y));
    }

    #[test]
    fn test_wrap_reenters_from_top() {
        // scrolled past the top edge by 10px
        let y = wrapped_y(5.0, 15.0, 1.0, 100.0);
        assert!((y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_uses_config_ranges() {
        let cfg = StarfieldConfig::default();
        let mut rng = SequenceRandom::constant(0.5);
        let star = Star::spawn(&cfg, SurfaceSize::new(200.0, 100.0), &mut rng);
        assert_eq!((star.x, star.y), (100.0, 50.0));
        assert!((star.size - 1.2).abs() < 1e-12);
        assert!((star.depth - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_brightness_bounds() {
        let mut star = Star::spawn(
            &StarfieldConfig::default(),
            SurfaceSize::new(10.0, 10.0),
            &mut SequenceRandom::constant(0.25),
        );
        for _ in 0..1000 {
            star.advance(1.0);
            let b = star.brightness();
            assert!((0.4 - 1e-12..=1.0 + 1e-12).contains(&b));
        }
    }

    #[test]
    fn test_pointer_shift_scaled_by_depth() {
        let star = Star {
            x: 10.0,
            y: 10.0,
            size: 1.0,
            alpha: 0.5,
            twinkle_speed: 0.01,
            twinkle_phase: 0.0,
            depth: 2.0,
        };
        let (x, y) = star.screen_position(0.0, (1.5, -0.5), 100.0);
        assert_eq!((x, y), (13.0, 9.0));
    }
}

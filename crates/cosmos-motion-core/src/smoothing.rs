//! Frame-rate independent exponential smoothing.
//!
//! Every follower in the engine (tilt, magnetic buttons, cursor glow, marquee
//! velocity) approaches its target with the same first-order filter:
//!
//! ```text
//! k = 1 - exp(-dt / tau)
//! current' = current + (target - current) * k
//! ```
//!
//! Because `k` is derived from elapsed time, two clients running at 30 Hz and
//! 144 Hz trace the same curve.

use serde::{Deserialize, Serialize};

/// Blend factor for an elapsed time `dt` and time constant `tau` (seconds).
///
/// Returns `0.0` for `dt <= 0` and `1.0` (snap) for `tau <= 0`.
#[must_use]
pub fn blend_factor(dt: f64, tau: f64) -> f64 {
    if dt <= 0.0 || !dt.is_finite() {
        return 0.0;
    }
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / tau).exp()
}

/// Move `current` toward `target` by the amount elapsed time allows.
///
/// The result always lies between `current` and `target` inclusive.
#[must_use]
pub fn smooth(current: f64, target: f64, dt: f64, tau: f64) -> f64 {
    let k = blend_factor(dt, tau);
    if k <= 0.0 {
        return current;
    }
    if k >= 1.0 {
        return target;
    }
    let next = current + (target - current) * k;
    // rounding can push a hair past either end when the gap is tiny
    next.clamp(current.min(target), current.max(target))
}

/// Time constant equivalent to applying a fixed per-frame lerp factor at `hz`.
///
/// A per-frame `lerp(a, b, 0.08)` at 60 Hz becomes a `tau` of about 0.2 s.
#[must_use]
pub fn tau_from_lerp(factor: f64, hz: f64) -> f64 {
    let factor = factor.clamp(1e-6, 1.0 - 1e-9);
    -1.0 / (hz * (1.0 - factor).ln())
}

/// A `(current, target)` pair that converges with time constant `tau`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothedScalar {
    /// Smoothed value
    pub current: f64,
    /// Value being approached
    pub target: f64,
    /// Time constant (seconds)
    pub tau: f64,
}

impl SmoothedScalar {
    /// Create a pair at rest on `value`.
    #[must_use]
    pub const fn new(value: f64, tau: f64) -> Self {
        Self {
            current: value,
            target: value,
            tau,
        }
    }

    /// Change the value being approached.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Jump straight to `value` with no transition.
    pub fn snap(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Advance by `dt` seconds using the stored `tau`.
    pub fn update(&mut self, dt: f64) -> f64 {
        self.update_with_tau(dt, self.tau)
    }

    /// Advance by `dt` seconds using an explicit `tau`.
    pub fn update_with_tau(&mut self, dt: f64, tau: f64) -> f64 {
        self.current = smooth(self.current, self.target, dt, tau);
        self.current
    }

    /// Absolute distance still to travel.
    #[must_use]
    pub fn gap(&self) -> f64 {
        (self.target - self.current).abs()
    }

    /// Whether the remaining gap is below `epsilon`.
    #[must_use]
    pub fn is_settled(&self, epsilon: f64) -> bool {
        self.gap() < epsilon
    }
}

impl Default for SmoothedScalar {
    fn default() -> Self {
        Self::new(0.0, 0.1)
    }
}

/// Two independently smoothed axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothedVec2 {
    /// Horizontal axis
    pub x: SmoothedScalar,
    /// Vertical axis
    pub y: SmoothedScalar,
}

impl SmoothedVec2 {
    /// Create a pair at rest on `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64, tau: f64) -> Self {
        Self {
            x: SmoothedScalar::new(x, tau),
            y: SmoothedScalar::new(y, tau),
        }
    }

    /// Change both targets.
    pub fn set_target(&mut self, x: f64, y: f64) {
        self.x.set_target(x);
        self.y.set_target(y);
    }

    /// Move both current values without touching the targets.
    pub fn set_current(&mut self, x: f64, y: f64) {
        self.x.current = x;
        self.y.current = y;
    }

    /// Advance both axes with the stored time constants.
    pub fn update(&mut self, dt: f64) -> (f64, f64) {
        (self.x.update(dt), self.y.update(dt))
    }

    /// Advance both axes with an explicit time constant.
    pub fn update_with_tau(&mut self, dt: f64, tau: f64) -> (f64, f64) {
        (self.x.update_with_tau(dt, tau), self.y.update_with_tau(dt, tau))
    }

    /// Current `(x, y)`.
    #[must_use]
    pub fn current(&self) -> (f64, f64) {
        (self.x.current, self.y.current)
    }

    /// Target `(x, y)`.
    #[must_use]
    pub fn target(&self) -> (f64, f64) {
        (self.x.target, self.y.target)
    }

    /// Euclidean distance between current and target.
    #[must_use]
    pub fn distance(&self) -> f64 {
        (self.x.target - self.x.current).hypot(self.y.target - self.y.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dt_is_identity() {
        assert_eq!(smooth(3.0, 10.0, 0.0, 0.25), 3.0);
    }

    #[test]
    fn test_result_stays_between_endpoints() {
        let cases = [
            (0.0, 100.0),
            (100.0, 0.0),
            (-5.0, 5.0),
            (1e6, 1e6 + 1e-6),
        ];
        for (current, target) in cases {
            for dt in [0.001, 0.016, 0.1, 1.0, 50.0] {
                for tau in [0.01, 0.14, 0.6, 3.0] {
                    let v = smooth(current, target, dt, tau);
                    assert!(v >= current.min(target) && v <= current.max(target));
                }
            }
        }
    }

    #[test]
    fn test_converges_for_large_dt() {
        let v = smooth(0.0, 42.0, 1000.0, 0.25);
        assert!((v - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_tau_snaps() {
        assert_eq!(smooth(0.0, 1.0, 0.016, 0.0), 1.0);
        assert!((smooth(0.0, 1.0, 0.016, 1e-9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut fast = SmoothedScalar::new(0.0, 0.25);
        let mut slow = SmoothedScalar::new(0.0, 0.25);
        fast.set_target(80.0);
        slow.set_target(80.0);

        for _ in 0..120 {
            fast.update(1.0 / 120.0);
        }
        for _ in 0..30 {
            slow.update(1.0 / 30.0);
        }

        assert!((fast.current - slow.current).abs() < 1e-9);
    }

    #[test]
    fn test_monotone_approach() {
        let mut s = SmoothedScalar::new(0.0, 0.1);
        s.set_target(10.0);
        let mut prev = s.current;
        for _ in 0..100 {
            let v = s.update(0.016);
            assert!(v >= prev);
            assert!(v <= 10.0);
            prev = v;
        }
        assert!(s.is_settled(0.01));
    }

    #[test]
    fn test_tau_from_lerp_matches_per_frame_lerp() {
        let tau = tau_from_lerp(0.08, 60.0);
        let k = blend_factor(1.0 / 60.0, tau);
        assert!((k - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_vec2_axes_independent() {
        let mut v = SmoothedVec2::new(0.0, 0.0, 0.2);
        v.set_target(10.0, 0.0);
        v.update(0.05);
        assert!(v.x.current > 0.0);
        assert_eq!(v.y.current, 0.0);
        assert!((v.distance() - (10.0 - v.x.current)).abs() < 1e-12);
    }
}

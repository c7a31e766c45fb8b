//! Typed configuration for every bound element.
//!
//! Each struct carries documented defaults through its `Default` impl and
//! `#[serde(default)]`, so a JSON document only needs the fields it changes.
//! Per-element `data-*` attributes are parsed once at construction via
//! [`AttributeSource`]; missing or unusable values fall back to the default.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::rng::RandomSource;
use crate::smoothing::tau_from_lerp;
use crate::{NARROW_VIEWPORT_MAX_WIDTH, REFERENCE_HZ};

// ============================================================================
// Attribute parsing
// ============================================================================

/// Anything that can answer `data-*` attribute lookups.
pub trait AttributeSource {
    /// Raw value of `name` (e.g. `"data-tilt-max"`), if present.
    fn attribute(&self, name: &str) -> Option<String>;
}

impl AttributeSource for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl AttributeSource for [(&str, &str)] {
    fn attribute(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| (*value).to_string())
    }
}

/// Parse the leading integer of `raw` (`"12px"` → 12), ignoring leading spaces.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let digits_start = usize::from(s.starts_with(['+', '-']));
    let end = s[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| i + digits_start);
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Parse the leading decimal number of `raw` (`"0.05x"` → 0.05).
#[must_use]
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

/// Integer attribute, or `default` when missing, unparsable or zero.
pub fn attr_int_or(source: &(impl AttributeSource + ?Sized), name: &str, default: i64) -> i64 {
    source
        .attribute(name)
        .and_then(|raw| parse_leading_int(&raw))
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

/// Float attribute, or `default` when missing, unparsable or zero.
pub fn attr_float_or(source: &(impl AttributeSource + ?Sized), name: &str, default: f64) -> f64 {
    source
        .attribute(name)
        .and_then(|raw| parse_leading_float(&raw))
        .filter(|v| *v != 0.0 && v.is_finite())
        .unwrap_or(default)
}

/// Strict integer attribute: absent is `Ok(None)`, garbage is an error.
pub fn attr_int_strict(source: &(impl AttributeSource + ?Sized), name: &str) -> Result<Option<i64>> {
    match source.attribute(name) {
        None => Ok(None),
        Some(raw) => parse_leading_int(&raw)
            .map(Some)
            .ok_or(MotionError::Attribute {
                name: name.to_string(),
                value: raw,
            }),
    }
}

// ============================================================================
// Policy
// ============================================================================

/// User and device preferences that gate motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPolicy {
    /// `prefers-reduced-motion: reduce` is set
    pub reduced_motion: bool,
    /// Viewport is phone-sized
    pub narrow_viewport: bool,
}

impl MotionPolicy {
    /// Derive the policy from viewport width and the reduced-motion query.
    #[must_use]
    pub fn from_viewport(width: f64, reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            narrow_viewport: width <= NARROW_VIEWPORT_MAX_WIDTH,
        }
    }

    /// Shooting stars and other transient spawns.
    #[must_use]
    pub const fn allows_transients(&self) -> bool {
        !self.reduced_motion
    }

    /// Rocket trails need both full motion and a wide viewport.
    #[must_use]
    pub const fn allows_rockets(&self) -> bool {
        !self.reduced_motion && !self.narrow_viewport
    }

    /// Pointer-driven effects (parallax, tilt, magnetic, glow).
    #[must_use]
    pub const fn allows_pointer_effects(&self) -> bool {
        !self.narrow_viewport
    }
}

// ============================================================================
// Particles
// ============================================================================

/// Half-open uniform range `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive lower bound
    pub min: f64,
    /// Exclusive upper bound
    pub max: f64,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a value from the span.
    pub fn sample(&self, rng: &mut impl RandomSource) -> f64 {
        rng.range(self.min, self.max)
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(MotionError::InvalidConfig {
                field,
                value: self.max,
            })
        }
    }
}

/// Background starfield layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Stars on wide viewports
    pub count: usize,
    /// Stars on narrow viewports
    pub narrow_count: usize,
    /// Radius (px)
    pub size: Span,
    /// Base opacity
    pub alpha: Span,
    /// Twinkle phase advance (radians per tick)
    pub twinkle_speed: Span,
    /// Parallax depth multiplier
    pub depth: Span,
    /// Fraction of page scroll applied to star drift
    pub scroll_factor: f64,
    /// Pointer parallax per pixel of offset, per unit depth
    pub pointer_factor: f64,
    /// Star colour as `[r, g, b]`
    pub color: [u8; 3],
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 200,
            narrow_count: 80,
            size: Span::new(0.3, 2.1),
            alpha: Span::new(0.1, 0.7),
            twinkle_speed: Span::new(0.005, 0.02),
            depth: Span::new(1.0, 4.0),
            scroll_factor: 0.05,
            pointer_factor: 0.003,
            color: [200, 190, 255],
        }
    }
}

/// Periodic shooting stars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingStarConfig {
    /// Seconds between spawns
    pub interval_s: f64,
    /// Origin X as a fraction of surface width
    pub origin_x_fraction: f64,
    /// Origin Y as a fraction of surface height
    pub origin_y_fraction: f64,
    /// Trail length (px)
    pub length: Span,
    /// Speed (px per tick)
    pub speed: Span,
    /// Heading (radians, 0 = right, positive = down)
    pub angle: Span,
    /// Life lost per tick
    pub decay: f64,
    /// Most shooting stars alive at once
    pub capacity: usize,
}

impl Default for ShootingStarConfig {
    fn default() -> Self {
        let base = std::f64::consts::FRAC_PI_6;
        Self {
            interval_s: 3.0,
            origin_x_fraction: 0.7,
            origin_y_fraction: 0.4,
            length: Span::new(40.0, 120.0),
            speed: Span::new(6.0, 14.0),
            angle: Span::new(base, base + 0.3),
            decay: 0.015,
            capacity: 32,
        }
    }
}

/// Periodic rocket trails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    /// Seconds between spawns
    pub interval_s: f64,
    /// Horizontal speed magnitude (px per tick)
    pub speed_x: Span,
    /// Upward speed magnitude (px per tick)
    pub climb: Span,
    /// Entry band as fractions of surface height
    pub entry_band: Span,
    /// Life lost per tick
    pub decay: f64,
    /// Exhaust is emitted when a uniform draw exceeds this value
    pub exhaust_threshold: f64,
    /// Exhaust horizontal spread (px per tick)
    pub exhaust_vx: Span,
    /// Exhaust downward drift (px per tick)
    pub exhaust_vy: Span,
    /// Exhaust radius (px)
    pub exhaust_size: Span,
    /// Exhaust life lost per tick
    pub exhaust_decay: f64,
    /// Most rockets alive at once
    pub capacity: usize,
    /// Most exhaust puffs per rocket
    pub exhaust_capacity: usize,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            interval_s: 8.0,
            speed_x: Span::new(2.0, 5.0),
            climb: Span::new(0.5, 2.0),
            entry_band: Span::new(0.3, 0.7),
            decay: 0.005,
            exhaust_threshold: 0.3,
            exhaust_vx: Span::new(-0.75, 0.75),
            exhaust_vy: Span::new(0.5, 2.0),
            exhaust_size: Span::new(1.0, 3.0),
            exhaust_decay: 0.025,
            capacity: 8,
            exhaust_capacity: 256,
        }
    }
}

// ============================================================================
// Pointer followers
// ============================================================================

/// `[data-tilt]` spring tilt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Maximum rotation (degrees), `data-tilt-max`
    pub max_deg: f64,
    /// CSS perspective distance (px)
    pub perspective_px: f64,
    /// Smoothing time constant (seconds)
    pub tau: f64,
}

impl TiltConfig {
    /// Read `data-tilt-max`.
    pub fn from_attributes(source: &(impl AttributeSource + ?Sized)) -> Self {
        let defaults = Self::default();
        Self {
            max_deg: attr_int_or(source, "data-tilt-max", defaults.max_deg as i64) as f64,
            ..defaults
        }
    }
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_deg: 8.0,
            perspective_px: 800.0,
            tau: tau_from_lerp(0.08, REFERENCE_HZ),
        }
    }
}

/// Profile card tilt engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTiltConfig {
    /// Steady-state time constant (seconds)
    pub steady_tau: f64,
    /// Time constant during the entry glide (seconds)
    pub initial_tau: f64,
    /// Length of the entry glide window (seconds)
    pub initial_window_s: f64,
    /// Distance (px) under which a leave is considered settled
    pub settle_threshold: f64,
    /// Per-axis gap (px) under which tracking stops scheduling frames
    pub rest_threshold: f64,
    /// Duration of the "entering" visual flag (seconds)
    pub entering_flag_s: f64,
    /// Initial glide start, offset left from the right edge (px)
    pub glide_inset_x: f64,
    /// Initial glide start, offset down from the top edge (px)
    pub glide_inset_y: f64,
    /// Background position output range, in percent
    pub background_range: Span,
    /// Horizontal centre offset is divided by this for `rotate-x`
    pub rotate_x_divisor: f64,
    /// Vertical centre offset is divided by this for `rotate-y`
    pub rotate_y_divisor: f64,
}

impl Default for ProfileTiltConfig {
    fn default() -> Self {
        Self {
            steady_tau: 0.14,
            initial_tau: 0.6,
            initial_window_s: 1.2,
            settle_threshold: 0.6,
            rest_threshold: 0.05,
            entering_flag_s: 0.18,
            glide_inset_x: 70.0,
            glide_inset_y: 60.0,
            background_range: Span::new(35.0, 65.0),
            rotate_x_divisor: 5.0,
            rotate_y_divisor: 4.0,
        }
    }
}

/// Magnetic button pull.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    /// Fraction of the pointer's offset from the button centre
    pub strength: f64,
    /// Smoothing time constant (seconds)
    pub tau: f64,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: 0.25,
            tau: tau_from_lerp(0.1, REFERENCE_HZ),
        }
    }
}

/// Cursor glow follower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    /// Smoothing time constant (seconds)
    pub tau: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            tau: tau_from_lerp(0.06, REFERENCE_HZ),
        }
    }
}

/// Scroll and pointer parallax for one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Scroll multiplier, `data-parallax`
    pub scroll_factor: f64,
    /// Pointer travel (px) at the viewport edge, `data-mouse-parallax`
    pub pointer_strength: f64,
}

impl ParallaxConfig {
    /// Read `data-parallax` and `data-mouse-parallax`.
    pub fn from_attributes(source: &(impl AttributeSource + ?Sized)) -> Self {
        let defaults = Self::default();
        Self {
            scroll_factor: attr_float_or(source, "data-parallax", defaults.scroll_factor),
            pointer_strength: attr_int_or(
                source,
                "data-mouse-parallax",
                defaults.pointer_strength as i64,
            ) as f64,
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            scroll_factor: 0.02,
            pointer_strength: 20.0,
        }
    }
}

/// Infinite marquee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Cruise speed (px/s); negative scrolls the other way
    pub speed: f64,
    /// Speed while hovered (px/s)
    pub hover_speed: f64,
    /// Velocity smoothing time constant (seconds)
    pub tau: f64,
    /// Fewest copies ever materialized
    pub min_copies: usize,
    /// Extra copies beyond what covers the container
    pub headroom: usize,
}

impl MarqueeConfig {
    /// Check the copy rules can always cover the container.
    pub fn validate(&self) -> Result<()> {
        if self.headroom == 0 {
            return Err(MotionError::InvalidConfig {
                field: "marquee.headroom",
                value: 0.0,
            });
        }
        if self.min_copies < 2 {
            return Err(MotionError::InvalidConfig {
                field: "marquee.min_copies",
                value: self.min_copies as f64,
            });
        }
        if !self.speed.is_finite() {
            return Err(MotionError::InvalidConfig {
                field: "marquee.speed",
                value: self.speed,
            });
        }
        Ok(())
    }
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            speed: 80.0,
            hover_speed: 0.0,
            tau: 0.25,
            min_copies: 2,
            headroom: 2,
        }
    }
}

/// Stat counter animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Integer part of the final value, `data-target`
    pub target: i64,
    /// Single decimal digit, `data-decimal`
    pub decimal: Option<u32>,
    /// Duration (seconds)
    pub duration_s: f64,
}

impl CounterConfig {
    /// Read `data-target` and `data-decimal`.
    ///
    /// A present but unparsable `data-target` is an error; the element would
    /// otherwise count to `NaN`.
    pub fn from_attributes(source: &(impl AttributeSource + ?Sized)) -> Result<Self> {
        let target = attr_int_strict(source, "data-target")?.unwrap_or(0);
        let decimal = attr_int_strict(source, "data-decimal")?
            .map(|d| u32::try_from(d.clamp(0, 9)).unwrap_or(0));
        Ok(Self {
            target,
            decimal,
            ..Self::default()
        })
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            target: 0,
            decimal: None,
            duration_s: 2.4,
        }
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Every engine setting in one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Starfield
    pub starfield: StarfieldConfig,
    /// Shooting stars
    pub shooting_stars: ShootingStarConfig,
    /// Rocket trails
    pub rockets: RocketConfig,
    /// Default `[data-tilt]` settings
    pub tilt: TiltConfig,
    /// Profile card
    pub profile_tilt: ProfileTiltConfig,
    /// Magnetic buttons
    pub magnetic: MagneticConfig,
    /// Cursor glow
    pub glow: GlowConfig,
    /// Default parallax settings
    pub parallax: ParallaxConfig,
    /// Logo marquee
    pub marquee: MarqueeConfig,
}

impl MotionConfig {
    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json(json: &str) -> core::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject settings that would break an invariant.
    pub fn validate(&self) -> Result<()> {
        self.starfield.size.validate("starfield.size")?;
        self.starfield.alpha.validate("starfield.alpha")?;
        self.starfield.depth.validate("starfield.depth")?;
        self.shooting_stars.speed.validate("shooting_stars.speed")?;
        self.rockets.speed_x.validate("rockets.speed_x")?;
        for (field, decay) in [
            ("shooting_stars.decay", self.shooting_stars.decay),
            ("rockets.decay", self.rockets.decay),
            ("rockets.exhaust_decay", self.rockets.exhaust_decay),
        ] {
            if !(decay > 0.0 && decay.is_finite()) {
                return Err(MotionError::InvalidConfig { field, value: decay });
            }
        }
        for (field, tau) in [
            ("tilt.tau", self.tilt.tau),
            ("profile_tilt.steady_tau", self.profile_tilt.steady_tau),
            ("profile_tilt.initial_tau", self.profile_tilt.initial_tau),
            ("magnetic.tau", self.magnetic.tau),
            ("glow.tau", self.glow.tau),
            ("marquee.tau", self.marquee.tau),
        ] {
            if !(tau > 0.0 && tau.is_finite()) {
                return Err(MotionError::InvalidConfig { field, value: tau });
            }
        }
        self.marquee.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_leading_number_parsing() {
        assert_eq!(parse_leading_int("12px"), Some(12));
        assert_eq!(parse_leading_int("  -4"), Some(-4));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_float("0.05x"), Some(0.05));
        assert_eq!(parse_leading_float("3."), Some(3.0));
        assert_eq!(parse_leading_float("."), None);
    }

    #[test]
    fn test_tilt_attributes() {
        let cfg = TiltConfig::from_attributes(&attrs(&[("data-tilt-max", "14")]));
        assert_eq!(cfg.max_deg, 14.0);

        // missing, garbage and zero all fall back
        for raw in [None, Some("wide"), Some("0")] {
            let map = raw.map_or_else(HashMap::new, |v| attrs(&[("data-tilt-max", v)]));
            assert_eq!(TiltConfig::from_attributes(&map).max_deg, 8.0);
        }
    }

    #[test]
    fn test_parallax_attributes() {
        let pairs: &[(&str, &str)] = &[("data-parallax", "0.1"), ("data-mouse-parallax", "35")];
        let cfg = ParallaxConfig::from_attributes(pairs);
        assert_eq!(cfg.scroll_factor, 0.1);
        assert_eq!(cfg.pointer_strength, 35.0);

        let cfg = ParallaxConfig::from_attributes(&attrs(&[]));
        assert_eq!(cfg, ParallaxConfig::default());
    }

    #[test]
    fn test_counter_attributes() {
        let cfg = CounterConfig::from_attributes(&attrs(&[
            ("data-target", "98"),
            ("data-decimal", "5"),
        ]))
        .expect("valid attributes");
        assert_eq!(cfg.target, 98);
        assert_eq!(cfg.decimal, Some(5));

        let err = CounterConfig::from_attributes(&attrs(&[("data-target", "lots")]));
        assert!(matches!(err, Err(MotionError::Attribute { .. })));
    }

    #[test]
    fn test_policy_gates() {
        let narrow = MotionPolicy::from_viewport(600.0, false);
        assert!(narrow.allows_transients());
        assert!(!narrow.allows_rockets());
        assert!(!narrow.allows_pointer_effects());

        let reduced = MotionPolicy::from_viewport(1400.0, true);
        assert!(!reduced.allows_transients());
        assert!(!reduced.allows_rockets());
        assert!(reduced.allows_pointer_effects());
    }

    #[test]
    fn test_json_partial_document() {
        let cfg = MotionConfig::from_json(r#"{"marquee": {"speed": 120.0}, "starfield": {"count": 50}}"#)
            .expect("valid json");
        assert_eq!(cfg.marquee.speed, 120.0);
        assert_eq!(cfg.marquee.headroom, 2);
        assert_eq!(cfg.starfield.count, 50);
        assert_eq!(cfg.starfield.narrow_count, 80);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_headroom() {
        let mut cfg = MotionConfig::default();
        cfg.marquee.headroom = 0;
        assert!(matches!(
            cfg.validate(),
            Err(MotionError::InvalidConfig { field: "marquee.headroom", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_decay() {
        let mut cfg = MotionConfig::default();
        cfg.shooting_stars.decay = 0.0;
        assert!(cfg.validate().is_err());
    }
}

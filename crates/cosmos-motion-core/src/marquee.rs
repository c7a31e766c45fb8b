//! Seamless infinite marquee.
//!
//! One content sequence is measured and tiled enough times to cover the
//! container with headroom. Each frame the track shifts left by `offset`,
//! which wraps at the sequence width; since every copy is identical the wrap
//! is invisible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MarqueeConfig;
use crate::error::Result;
use crate::frame::{FrameTask, FrameTime, StepOutcome, TaskStatus};
use crate::pointer::PointerSnapshot;
use crate::smoothing::SmoothedScalar;

/// Copies of a sequence of `sequence_width` needed to fill `container_width`.
///
/// Always at least `min_copies`, so `copies * sequence_width` covers the
/// container plus one full sequence.
#[must_use]
pub fn copies_needed(sequence_width: f64, container_width: f64, config: &MarqueeConfig) -> usize {
    if !(sequence_width > 0.0) {
        return config.min_copies;
    }
    let fill = (container_width.max(0.0) / sequence_width).ceil() as usize;
    config.min_copies.max(fill.saturating_add(config.headroom))
}

/// Result of a measurement: how the track should be materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPlan {
    /// Total copies including the original
    pub copies: usize,
    /// Whether the count differs from the previous measurement
    pub changed: bool,
}

impl CopyPlan {
    /// Duplicates to create beyond the original.
    #[must_use]
    pub fn clones(&self) -> usize {
        self.copies.saturating_sub(1)
    }
}

/// State of one marquee track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopMarquee {
    config: MarqueeConfig,
    sequence_width: f64,
    copies: usize,
    offset: f64,
    velocity: SmoothedScalar,
    hovered: bool,
}

impl LoopMarquee {
    /// Create an unmeasured marquee at rest; it accelerates to cruise speed.
    #[must_use]
    pub fn new(config: MarqueeConfig) -> Self {
        let mut velocity = SmoothedScalar::new(0.0, config.tau);
        velocity.set_target(config.speed);
        Self {
            config,
            sequence_width: 0.0,
            copies: 1,
            offset: 0.0,
            velocity,
            hovered: false,
        }
    }

    /// Measure the sequence and container (px).
    ///
    /// The sequence width is rounded up. A zero or non-finite container falls
    /// back to the sequence width. Returns `None` while the sequence has no width; the
    /// marquee then holds still until a later measurement succeeds.
    pub fn measure(&mut self, sequence_width: f64, container_width: f64) -> Option<CopyPlan> {
        let width = if sequence_width.is_finite() {
            sequence_width.ceil()
        } else {
            0.0
        };
        self.sequence_width = width.max(0.0);
        if self.sequence_width <= 0.0 {
            debug!(sequence_width, "marquee measure skipped: empty sequence");
            return None;
        }

        let container = if container_width > 0.0 && container_width.is_finite() {
            container_width
        } else {
            self.sequence_width
        };
        let copies = copies_needed(self.sequence_width, container, &self.config);
        let changed = copies != self.copies;
        if changed {
            debug!(
                from = self.copies,
                to = copies,
                sequence_width = self.sequence_width,
                container,
                "marquee copy count changed"
            );
        }
        self.copies = copies;
        self.offset = wrap(self.offset, self.sequence_width);
        Some(CopyPlan { copies, changed })
    }

    /// Pointer over the track slows it to the hover speed.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
        let target = if hovered {
            self.config.hover_speed
        } else {
            self.config.speed
        };
        self.velocity.set_target(target);
    }

    /// Smooth the velocity and move the track by `dt` seconds.
    ///
    /// The velocity always updates; the offset is left alone while the
    /// sequence is unmeasured.
    pub fn advance(&mut self, dt: f64) -> StepOutcome {
        let velocity = self.velocity.update(dt);
        if self.sequence_width <= 0.0 {
            return StepOutcome::Skipped;
        }
        self.offset = wrap(self.offset + velocity * dt.max(0.0), self.sequence_width);
        StepOutcome::Applied
    }

    /// Track shift (px), in `[0, sequence_width)`.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current speed (px/s).
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity.current
    }

    /// Measured sequence width (px).
    #[must_use]
    pub fn sequence_width(&self) -> f64 {
        self.sequence_width
    }

    /// Copies currently planned, original included.
    #[must_use]
    pub fn copies(&self) -> usize {
        self.copies
    }

    /// Whether the pointer is over the track.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// CSS `transform` for the track.
    #[must_use]
    pub fn translate_css(&self) -> String {
        format!("translate3d({}px, 0, 0)", 0.0 - self.offset)
    }
}

/// Wrap into `[0, width)`; correct for negative input.
fn wrap(value: f64, width: f64) -> f64 {
    let wrapped = value.rem_euclid(width);
    if wrapped >= width || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

impl FrameTask for LoopMarquee {
    fn name(&self) -> &'static str {
        "marquee"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        self.advance(time.delta_s);
        Ok(TaskStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_for_known_layout() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        let plan = marquee.measure(400.0, 900.0).expect("measurable");
        assert_eq!(plan.copies, 5);
        assert_eq!(plan.clones(), 4);
        assert!(plan.changed);

        let again = marquee.measure(400.0, 900.0).expect("measurable");
        assert!(!again.changed);
    }

    #[test]
    fn test_copies_always_cover_container() {
        let cfg = MarqueeConfig::default();
        for &seq in &[1.0, 37.0, 400.0, 1999.0, 5000.0] {
            for &container in &[0.0, 10.0, 900.0, 1920.0, 3840.0] {
                let n = copies_needed(seq, container, &cfg);
                assert!(n >= 2);
                assert!(n as f64 * seq >= container + seq, "seq={seq} container={container}");
            }
        }
    }

    #[test]
    fn test_width_rounds_up_and_container_falls_back() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        let plan = marquee.measure(399.2, 0.0).expect("measurable");
        assert_eq!(marquee.sequence_width(), 400.0);
        assert_eq!(plan.copies, 3);
    }

    #[test]
    fn test_unbounded_container_does_not_overflow() {
        let cfg = MarqueeConfig::default();
        assert_eq!(copies_needed(1.0, f64::INFINITY, &cfg), usize::MAX);
        assert_eq!(copies_needed(1e-300, 1e300, &cfg), usize::MAX);

        let mut marquee = LoopMarquee::new(cfg);
        let plan = marquee.measure(400.0, f64::INFINITY).expect("measurable");
        assert_eq!(plan.copies, 3);
        let plan = marquee.measure(400.0, f64::NAN).expect("measurable");
        assert_eq!(plan.copies, 3);
    }

    #[test]
    fn test_remeasure_after_content_grows() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        marquee.measure(380.0, 900.0);
        for _ in 0..600 {
            marquee.advance(1.0 / 60.0);
        }
        assert!(marquee.offset() > 0.0);

        // late webfont widens the sequence without changing the copy count
        let plan = marquee.measure(412.0, 900.0).expect("measurable");
        assert!(!plan.changed);
        assert_eq!(marquee.sequence_width(), 412.0);
        for _ in 0..600 {
            marquee.advance(1.0 / 60.0);
            assert!((0.0..412.0).contains(&marquee.offset()));
        }
    }

    #[test]
    fn test_zero_width_skips_offset() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        assert!(marquee.measure(0.0, 900.0).is_none());
        assert_eq!(marquee.advance(0.5), StepOutcome::Skipped);
        assert_eq!(marquee.offset(), 0.0);
        assert!(marquee.velocity() > 0.0);
    }

    #[test]
    fn test_offset_stays_in_range_and_moves_continuously() {
        for speed in [80.0, -120.0, 3000.0] {
            let cfg = MarqueeConfig {
                speed,
                ..MarqueeConfig::default()
            };
            let mut marquee = LoopMarquee::new(cfg);
            marquee.measure(250.0, 1000.0);
            let width = marquee.sequence_width();
            let dt = 1.0 / 60.0;
            let mut previous = marquee.offset();
            for frame in 0..2000 {
                if frame == 700 {
                    marquee.set_hovered(true);
                }
                if frame == 1200 {
                    marquee.set_hovered(false);
                }
                marquee.advance(dt);
                let offset = marquee.offset();
                assert!((0.0..width).contains(&offset), "offset {offset}");

                // shortest distance around the loop
                let raw = (offset - previous).abs();
                let step = raw.min(width - raw);
                assert!(step <= speed.abs() * dt + 1e-9, "jump of {step}px");
                previous = offset;
            }
        }
    }

    #[test]
    fn test_hover_eases_to_stop() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        marquee.measure(400.0, 900.0);
        for _ in 0..120 {
            marquee.advance(1.0 / 60.0);
        }
        assert!(marquee.velocity() > 79.0);

        marquee.set_hovered(true);
        marquee.advance(1.0 / 60.0);
        assert!(marquee.velocity() > 0.0 && marquee.velocity() < 80.0);
        for _ in 0..600 {
            marquee.advance(1.0 / 60.0);
        }
        assert!(marquee.velocity() < 1e-6);
    }

    #[test]
    fn test_translate_css() {
        let mut marquee = LoopMarquee::new(MarqueeConfig::default());
        marquee.measure(400.0, 900.0);
        assert_eq!(marquee.translate_css(), "translate3d(0px, 0, 0)");
    }
}

//! Easing curves and the one-shot animations built on them.
//!
//! One-shot animations are frame tasks that start on the first frame they
//! see and return [`TaskStatus::Done`] when their progress reaches 1, which
//! removes them from the driver.

use serde::{Deserialize, Serialize};

use crate::config::CounterConfig;
use crate::error::Result;
use crate::frame::{FrameTask, FrameTime, TaskStatus};
use crate::pointer::PointerSnapshot;

/// Smooth-scroll duration (seconds).
pub const SMOOTH_SCROLL_DURATION_S: f64 = 0.9;

/// Space kept above a smooth-scroll target for the fixed navigation bar (px).
pub const NAV_OFFSET_PX: f64 = 72.0;

/// Elastic ease-out: overshoots and rings before settling. Exactly `0.0` at
/// `p <= 0` and `1.0` at `p >= 1`.
#[must_use]
pub fn elastic_out(p: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    let c = std::f64::consts::TAU / 3.0;
    1.0 + 2f64.powf(-10.0 * p) * ((p * 10.0 - 0.75) * c).sin()
}

/// Quartic ease-out.
#[must_use]
pub fn quartic_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

/// Linear progress over a fixed duration, anchored at the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct Timeline {
    duration_s: f64,
    started_s: Option<f64>,
}

impl Timeline {
    fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            started_s: None,
        }
    }

    fn progress(&mut self, now_s: f64) -> f64 {
        let start = *self.started_s.get_or_insert(now_s);
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        ((now_s - start) / self.duration_s).clamp(0.0, 1.0)
    }
}

/// A stat number counting up to its target with an elastic ease.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterAnimation {
    config: CounterConfig,
    timeline: Timeline,
    text: String,
    finished: bool,
}

impl CounterAnimation {
    /// Create a counter showing zero.
    #[must_use]
    pub fn new(config: CounterConfig) -> Self {
        let timeline = Timeline::new(config.duration_s);
        let text = Self::format(&config, 0.0);
        Self {
            config,
            timeline,
            text,
            finished: false,
        }
    }

    fn format(config: &CounterConfig, ease: f64) -> String {
        match config.decimal {
            Some(decimal) => {
                let value = config.target as f64 + f64::from(decimal) / 10.0;
                format!("{:.1}", ease * value)
            }
            None => ((ease * config.target as f64).floor() as i64).to_string(),
        }
    }

    fn final_text(config: &CounterConfig) -> String {
        match config.decimal {
            Some(decimal) => format!("{}.{}", config.target, decimal),
            None => config.target.to_string(),
        }
    }

    /// Text to display.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the final value is showing.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `now_s`; returns `true` once finished.
    pub fn advance(&mut self, now_s: f64) -> bool {
        if self.finished {
            return true;
        }
        let p = self.timeline.progress(now_s);
        if p >= 1.0 {
            self.text = Self::final_text(&self.config);
            self.finished = true;
        } else {
            self.text = Self::format(&self.config, elastic_out(p));
        }
        self.finished
    }
}

impl FrameTask for CounterAnimation {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        if self.advance(time.now_s) {
            Ok(TaskStatus::Done)
        } else {
            Ok(TaskStatus::Continue)
        }
    }
}

/// Eased page scroll toward a target offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothScroll {
    from_y: f64,
    to_y: f64,
    timeline: Timeline,
    current_y: f64,
    finished: bool,
}

impl SmoothScroll {
    /// Scroll from `from_y` to `to_y` over `duration_s`.
    #[must_use]
    pub fn new(from_y: f64, to_y: f64, duration_s: f64) -> Self {
        Self {
            from_y,
            to_y,
            timeline: Timeline::new(duration_s),
            current_y: from_y,
            finished: false,
        }
    }

    /// Scroll so an element at document offset `element_top` lands just
    /// below the navigation bar.
    #[must_use]
    pub fn to_element(from_y: f64, element_top: f64) -> Self {
        Self::new(from_y, element_top - NAV_OFFSET_PX, SMOOTH_SCROLL_DURATION_S)
    }

    /// Destination offset.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.to_y
    }

    /// Offset to scroll to this frame.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current_y
    }

    /// Whether the destination was reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `now_s`; returns `true` once finished.
    pub fn advance(&mut self, now_s: f64) -> bool {
        let t = self.timeline.progress(now_s);
        self.current_y = self.from_y + (self.to_y - self.from_y) * quartic_out(t);
        self.finished = t >= 1.0;
        self.finished
    }
}

impl FrameTask for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        if self.advance(time.now_s) {
            Ok(TaskStatus::Done)
        } else {
            Ok(TaskStatus::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elastic_endpoints() {
        assert_eq!(elastic_out(0.0), 0.0);
        assert!(elastic_out(0.001) < 0.05);
        assert_eq!(elastic_out(1.0), 1.0);
        assert_eq!(elastic_out(3.0), 1.0);
        // overshoots on the way
        assert!((0..100).map(|i| elastic_out(f64::from(i) / 100.0)).any(|v| v > 1.0));
    }

    #[test]
    fn test_quartic_monotone() {
        let mut prev = quartic_out(0.0);
        assert_eq!(prev, 0.0);
        for i in 1..=50 {
            let v = quartic_out(f64::from(i) / 50.0);
            assert!(v >= prev);
            prev = v;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn test_integer_counter() {
        let mut counter = CounterAnimation::new(CounterConfig {
            target: 150,
            ..CounterConfig::default()
        });
        assert_eq!(counter.text(), "0");
        assert!(!counter.advance(10.0));
        assert!(!counter.advance(11.2));
        assert!(counter.text().parse::<i64>().is_ok());
        assert!(counter.advance(12.5));
        assert_eq!(counter.text(), "150");
    }

    #[test]
    fn test_decimal_counter_finishes_exactly() {
        let mut counter = CounterAnimation::new(CounterConfig {
            target: 98,
            decimal: Some(5),
            duration_s: 2.4,
        });
        counter.advance(0.0);
        assert_eq!(counter.text(), "0.0");
        counter.advance(1.0);
        assert!(counter.text().contains('.'));
        counter.advance(2.5);
        assert_eq!(counter.text(), "98.5");
        assert!(counter.is_finished());
    }

    #[test]
    fn test_counter_task_reports_done() {
        let mut counter = CounterAnimation::new(CounterConfig {
            target: 3,
            duration_s: 0.05,
            ..CounterConfig::default()
        });
        let input = PointerSnapshot::default();
        let mut time = FrameTime::fixed(0, 0.0, 0.0);
        let mut frames = 0;
        while counter.update(&time, &input).expect("frame") == TaskStatus::Continue {
            time = time.next(1.0 / 60.0);
            frames += 1;
            assert!(frames < 10);
        }
        assert_eq!(counter.text(), "3");
    }

    #[test]
    fn test_smooth_scroll_lands_below_nav() {
        let mut scroll = SmoothScroll::to_element(0.0, 1072.0);
        assert_eq!(scroll.target(), 1000.0);
        scroll.advance(5.0);
        assert_eq!(scroll.current(), 0.0);
        scroll.advance(5.45);
        assert!((scroll.current() - 1000.0 * (1.0 - 0.5f64.powi(4))).abs() < 1e-6);
        assert!(scroll.advance(5.9));
        assert_eq!(scroll.current(), 1000.0);
    }
}

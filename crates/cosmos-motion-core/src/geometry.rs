//! Rectangles and the small geometric helpers shared by pointer followers.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport coordinates, as returned by
/// `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (px)
    pub left: f64,
    /// Top edge (px)
    pub top: f64,
    /// Width (px)
    pub width: f64,
    /// Height (px)
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether either side is zero or negative.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// A point relative to the top-left corner.
    #[must_use]
    pub fn local(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.left, y - self.top)
    }

    /// A point as a fraction of the size, `(0, 0)` top-left to `(1, 1)`
    /// bottom-right. `None` for a degenerate rectangle.
    #[must_use]
    pub fn normalized(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.is_degenerate() {
            return None;
        }
        let (lx, ly) = self.local(x, y);
        Some((lx / self.width, ly / self.height))
    }

    /// A point relative to the centre.
    #[must_use]
    pub fn offset_from_center(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        (x - cx, y - cy)
    }
}

/// Round to three decimals. Negative zero comes back as `0.0`.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}

/// Linearly remap `value` from `[from_min, from_max]` to `[to_min, to_max]`.
///
/// An empty source range maps everything to `to_min`.
#[must_use]
pub fn remap(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    let span = from_max - from_min;
    if span == 0.0 {
        return to_min;
    }
    to_min + (to_max - to_min) * (value - from_min) / span
}

/// Geometry of the circle that fills a pill-shaped button on hover.
///
/// The circle rises from below and its chord at the pill's top edge spans the
/// full width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PillCircle {
    /// Circle radius (px)
    pub radius: f64,
    /// Rendered diameter, rounded up with a 2 px bleed
    pub diameter: f64,
    /// Distance of the circle's bottom below the pill's bottom edge (px)
    pub bottom_offset: f64,
}

impl PillCircle {
    /// Compute the circle for a pill of `width` x `height`.
    ///
    /// Returns `None` when `height` is not positive.
    #[must_use]
    pub fn for_pill(width: f64, height: f64) -> Option<Self> {
        if !(height > 0.0) || !width.is_finite() {
            return None;
        }
        let half_chord_sq = width * width / 4.0;
        let radius = (half_chord_sq + height * height) / (2.0 * height);
        let diameter = (2.0 * radius).ceil() + 2.0;
        let sagitta = radius - (radius * radius - half_chord_sq).max(0.0).sqrt();
        Some(Self {
            radius,
            diameter,
            bottom_offset: sagitta.ceil() + 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_point() {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.normalized(200.0, 100.0), Some((0.5, 0.5)));
        assert_eq!(rect.normalized(100.0, 50.0), Some((0.0, 0.0)));
        assert_eq!(Rect::new(0.0, 0.0, 0.0, 10.0).normalized(1.0, 1.0), None);
    }

    #[test]
    fn test_round3_and_remap() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(-2.0004), -2.0);
        assert!(round3(-0.0001).is_sign_positive());
        assert_eq!(remap(50.0, 0.0, 100.0, 35.0, 65.0), 50.0);
        assert_eq!(remap(0.0, 0.0, 100.0, 35.0, 65.0), 35.0);
        assert_eq!(remap(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn test_pill_circle() {
        // 120 x 40 pill: R = (3600 + 1600) / 80 = 65
        let circle = PillCircle::for_pill(120.0, 40.0).expect("valid pill");
        assert_eq!(circle.radius, 65.0);
        assert_eq!(circle.diameter, 132.0);
        // sagitta = 65 - sqrt(4225 - 3600) = 40
        assert_eq!(circle.bottom_offset, 41.0);
    }

    #[test]
    fn test_pill_circle_degenerate() {
        assert!(PillCircle::for_pill(120.0, 0.0).is_none());
        assert!(PillCircle::for_pill(120.0, -3.0).is_none());
    }
}

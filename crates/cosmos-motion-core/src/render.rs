//! Drawing surface contract.
//!
//! The engine issues draw calls but never owns the surface. A browser binding
//! implements [`DrawSurface`] on a 2D canvas; tests and the headless runner
//! use [`RecordingSurface`].

use serde::{Deserialize, Serialize};

/// Colour with 8-bit channels and a floating-point alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha in `[0, 1]`
    pub a: f64,
}

impl Rgba {
    /// Create a colour; alpha is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Build from an `[r, g, b]` triple.
    #[must_use]
    pub fn from_rgb(rgb: [u8; 3], a: f64) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    /// Same colour with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f64) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// CSS `rgba(...)` string.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Size of a drawing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width (px)
    pub width: f64,
    /// Height (px)
    pub height: f64,
}

impl SurfaceSize {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero or negative.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A raster target that is cleared and fully redrawn each frame.
pub trait DrawSurface {
    /// Error raised by the underlying backend.
    type Error: core::fmt::Debug;

    /// Current size.
    fn size(&self) -> SurfaceSize;

    /// Erase everything.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Filled circle.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) -> Result<(), Self::Error>;

    /// Line whose colour fades linearly from `from_color` to `to_color`.
    fn stroke_gradient_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        from_color: Rgba,
        to_color: Rgba,
    ) -> Result<(), Self::Error>;

    /// Glow applied to subsequent fills; a blur of `0.0` turns it off.
    fn set_glow(&mut self, blur: f64, color: Rgba) -> Result<(), Self::Error>;
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// [`DrawSurface::clear`]
    Clear,
    /// [`DrawSurface::fill_circle`]
    Circle {
        /// Centre X
        x: f64,
        /// Centre Y
        y: f64,
        /// Radius
        radius: f64,
        /// Fill colour
        color: Rgba,
    },
    /// [`DrawSurface::stroke_gradient_line`]
    Line {
        /// Start point
        from: (f64, f64),
        /// End point
        to: (f64, f64),
        /// Stroke width
        width: f64,
        /// Colour at `from`
        from_color: Rgba,
        /// Colour at `to`
        to_color: Rgba,
    },
    /// [`DrawSurface::set_glow`]
    Glow {
        /// Blur radius
        blur: f64,
        /// Glow colour
        color: Rgba,
    },
}

/// In-memory surface that records every call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordingSurface {
    size: Option<SurfaceSize>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create a surface of the given size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some(SurfaceSize::new(width, height)),
            commands: Vec::new(),
        }
    }

    /// Change the reported size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = Some(SurfaceSize::new(width, height));
    }

    /// Calls recorded since the last [`DrawSurface::clear`].
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of filled circles since the last clear.
    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Number of gradient lines since the last clear.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    type Error = core::convert::Infallible;

    fn size(&self) -> SurfaceSize {
        self.size.unwrap_or(SurfaceSize::new(0.0, 0.0))
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        Ok(())
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_gradient_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        from_color: Rgba,
        to_color: Rgba,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            from_color,
            to_color,
        });
        Ok(())
    }

    fn set_glow(&mut self, blur: f64, color: Rgba) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Glow { blur, color });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_formatting() {
        assert_eq!(Rgba::new(167, 139, 250, 0.5).to_css(), "rgba(167,139,250,0.5)");
        assert_eq!(Rgba::new(0, 0, 0, 3.0).a, 1.0);
    }

    #[test]
    fn test_recording_clear_resets() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.fill_circle(1.0, 2.0, 3.0, Rgba::new(255, 255, 255, 1.0)).ok();
        surface.clear().ok();
        assert_eq!(surface.commands(), &[DrawCommand::Clear]);
        assert_eq!(surface.circle_count(), 0);
    }

    #[test]
    fn test_degenerate_size() {
        assert!(SurfaceSize::new(0.0, 10.0).is_degenerate());
        assert!(!SurfaceSize::new(1.0, 1.0).is_degenerate());
        assert!(RecordingSurface::default().size().is_degenerate());
    }
}

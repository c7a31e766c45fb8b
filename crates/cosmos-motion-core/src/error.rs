//! Error types for the animation engine
//!
//! Nothing in this crate is fatal. Errors describe why a single component
//! skipped work; the [`crate::frame::FrameDriver`] logs them and keeps every
//! other task running.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, MotionError>;

/// Engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A drawing surface or container element is not available
    #[error("Missing collaborator: {what}")]
    MissingCollaborator {
        /// Name of the missing element or surface
        what: &'static str,
    },

    /// Zero or negative extent where a positive one is required
    #[error("Degenerate geometry for {what}: {width}x{height}")]
    DegenerateGeometry {
        /// Component that measured the geometry
        what: &'static str,
        /// Measured width in pixels
        width: f64,
        /// Measured height in pixels
        height: f64,
    },

    /// A configuration value is out of its valid range
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// A data attribute could not be interpreted
    #[error("Invalid attribute {name}=\"{value}\"")]
    Attribute {
        /// Attribute name
        name: String,
        /// Raw attribute value
        value: String,
    },

    /// The drawing surface rejected a call
    #[error("Drawing surface error: {message}")]
    Surface {
        /// Surface-specific description
        message: String,
    },
}

impl MotionError {
    /// Build a [`MotionError::Surface`] from any debuggable surface error.
    pub fn surface<E: core::fmt::Debug>(err: E) -> Self {
        Self::Surface {
            message: format!("{err:?}"),
        }
    }

    /// Whether the condition is expected to clear up on a later frame.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. } | Self::Surface { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = MotionError::DegenerateGeometry {
            what: "marquee",
            width: 0.0,
            height: 24.0,
        };
        assert_eq!(err.to_string(), "Degenerate geometry for marquee: 0x24");
    }

    #[test]
    fn test_transient_classification() {
        assert!(MotionError::surface("lost context").is_transient());
        assert!(!MotionError::MissingCollaborator { what: "canvas" }.is_transient());
    }
}

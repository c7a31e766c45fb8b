//! Cosmos Motion Core - Frame-Driven Animation Engine
//!
//! This crate turns raw per-frame input (timestamps, pointer position, scroll
//! offset) into visual state for a page: a twinkling starfield with shooting
//! stars and rocket trails, pointer-reactive tilt and magnetic followers, and
//! a seamless looping marquee.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Frame Driver                                  │
//! │  ┌─────────────────┐    ┌─────────────────┐                             │
//! │  │ FrameClock      │    │ PointerTracker  │   (one snapshot per frame)  │
//! │  └────────┬────────┘    └────────┬────────┘                             │
//! │           └──────────┬───────────┘                                      │
//! │                      ▼                                                  │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌───────────────┐   │
//! │  │ Starfield    │ │ TiltEngine   │ │ LoopMarquee  │ │ Followers ... │   │
//! │  │ (particles)  │ │ (smoothing)  │ │ (smoothing)  │ │               │   │
//! │  └──────┬───────┘ └──────┬───────┘ └──────┬───────┘ └───────┬───────┘   │
//! │         ▼                ▼                ▼                 ▼           │
//! │    DrawSurface      CSS variables    track shift        transforms      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is target-independent: the browser binding lives in
//! `cosmos-motion-web`, which implements [`render::DrawSurface`] on a 2D
//! canvas and forwards DOM events into the [`pointer::PointerTracker`].
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use cosmos_motion_core::config::MarqueeConfig;
//! use cosmos_motion_core::frame::FrameDriver;
//! use cosmos_motion_core::marquee::LoopMarquee;
//!
//! let mut driver = FrameDriver::new();
//! let marquee = Rc::new(RefCell::new(LoopMarquee::new(MarqueeConfig::default())));
//! marquee.borrow_mut().measure(400.0, 900.0);
//! driver.register(marquee.clone());
//!
//! driver.frame(0.0);
//! driver.frame(16.0);
//! assert!(marquee.borrow().offset() >= 0.0);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod easing;
pub mod error;
pub mod follow;
pub mod frame;
pub mod geometry;
pub mod marquee;
pub mod parallax;
pub mod particles;
pub mod pointer;
pub mod render;
pub mod rng;
pub mod smoothing;
pub mod tilt;

pub use config::{AttributeSource, MotionConfig, MotionPolicy};
pub use error::{MotionError, Result};
pub use frame::{FrameClock, FrameDriver, FrameTask, FrameTime, StepOutcome, TaskId, TaskStatus, TaskWaker};
pub use marquee::LoopMarquee;
pub use particles::{ParticleSystem, Starfield};
pub use pointer::{PointerSnapshot, PointerTracker, Viewport};
pub use render::{DrawSurface, RecordingSurface, Rgba};
pub use rng::{RandomSource, SeededRandom, SequenceRandom};
pub use smoothing::{smooth, SmoothedScalar, SmoothedVec2};
pub use tilt::{SpringTilt, TiltEngine, TiltPhase};

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference refresh rate (Hz) that per-tick constants are expressed in.
pub const REFERENCE_HZ: f64 = 60.0;

/// Viewports at or below this width (px) are treated as narrow.
pub const NARROW_VIEWPORT_MAX_WIDTH: f64 = 768.0;

//! Cosmos Motion Web Binding
//!
//! WASM entry point for the animation engine. Implements the drawing surface
//! on a 2D canvas, binds page elements to their engines, and exposes
//! [`CosmosApp`] to JavaScript.
//!
//! # Host loop
//!
//! JavaScript owns `requestAnimationFrame` and forwards window-level input:
//!
//! ```text
//! const app = new CosmosApp();
//! app.mount();
//! addEventListener('mousemove', e => app.pointer_move(e.clientX, e.clientY));
//! addEventListener('scroll', () => app.scroll(scrollY), { passive: true });
//! addEventListener('resize', () => app.resize(innerWidth, innerHeight));
//! (function loop(ts) { app.frame(ts); requestAnimationFrame(loop); })(performance.now());
//! ```
//!
//! Element-level listeners (tilt, magnetic, marquee hover, card glow) are
//! attached by [`CosmosApp::mount`] itself.

pub mod bind;
pub mod dom;
pub mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_motion_core::config::{MotionConfig, MotionPolicy};
use cosmos_motion_core::frame::{FrameDriver, FrameReport, TaskId};
use cosmos_motion_core::particles::{ParticleSystem, Starfield};
use cosmos_motion_core::pointer::Viewport;
use cosmos_motion_core::rng::SeededRandom;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use bind::{
    BoundCounter, BoundGlow, BoundIndicators, BoundMagnetic, BoundMarquee, BoundProfileCard,
    BoundSmoothScroll, BoundSpringTilt, ParallaxLayers,
};
use dom::{by_id, document, query_all, to_js_error, warn_missing, window};
pub use surface::CanvasSurface;

/// Media query for the reduced-motion preference
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Engine version
#[wasm_bindgen]
pub fn version() -> String {
    cosmos_motion_core::VERSION.to_string()
}

/// Page animation state
#[wasm_bindgen]
pub struct CosmosApp {
    /// Shared per-frame dispatcher
    driver: FrameDriver,
    /// Engine settings
    config: MotionConfig,
    /// Reduced-motion and viewport gates
    policy: MotionPolicy,
    /// Starfield canvas
    starfield: Option<Rc<RefCell<Starfield<CanvasSurface>>>>,
    /// `[data-tilt]` elements
    spring_tilts: Vec<Rc<RefCell<BoundSpringTilt>>>,
    /// Profile card
    profile: Option<Rc<RefCell<BoundProfileCard>>>,
    /// Magnetic buttons
    magnets: Vec<Rc<RefCell<BoundMagnetic>>>,
    /// Cursor glow
    glow: Option<Rc<RefCell<BoundGlow>>>,
    /// Parallax layers
    parallax: Option<Rc<RefCell<ParallaxLayers>>>,
    /// Scroll progress bar and nav state
    indicators: Option<Rc<RefCell<BoundIndicators>>>,
    /// Logo loop
    marquee: Option<Rc<RefCell<BoundMarquee>>>,
    /// In-flight smooth scroll
    smooth_scroll: Option<TaskId>,
    /// Counters already started
    counters_started: bool,
    /// Mount already ran
    mounted: bool,
    /// Summary of the last frame
    last_report: FrameReport,
}

#[wasm_bindgen]
impl CosmosApp {
    /// Create an application with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<CosmosApp, JsValue> {
        Self::from_config(MotionConfig::default())
    }

    /// Create an application from a JSON settings document
    ///
    /// Missing fields keep their defaults.
    pub fn with_config_json(json: &str) -> Result<CosmosApp, JsValue> {
        let config =
            MotionConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::from_config(config)
    }

    /// Create an application from a plain JS settings object
    pub fn with_config(value: JsValue) -> Result<CosmosApp, JsValue> {
        let config: MotionConfig = serde_wasm_bindgen::from_value(value)?;
        Self::from_config(config)
    }

    /// Settings in use, as a JS object
    pub fn config(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.config)?)
    }

    /// Bind every effect whose elements exist on the page
    ///
    /// Missing elements are reported to the console and skipped.
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if self.mounted {
            return Ok(());
        }
        self.mounted = true;
        let document = document()?;

        match by_id(&document, "particleCanvas").and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok()) {
            Some(canvas) => self.mount_starfield(canvas)?,
            None => warn_missing("particle canvas"),
        }

        for element in query_all(&document, "[data-tilt]")? {
            let bound = BoundSpringTilt::bind(&mut self.driver, element, &self.config.tilt, self.policy)?;
            self.spring_tilts.push(bound);
        }

        match (by_id(&document, "profileCard"), by_id(&document, "pcShell")) {
            (Some(wrapper), Some(shell)) => {
                let card = BoundProfileCard::bind(&mut self.driver, wrapper, shell, &self.config.profile_tilt)?;
                self.profile = Some(card);
            }
            _ => warn_missing("profile card"),
        }

        for element in query_all(&document, ".btn--magnetic")? {
            let bound = BoundMagnetic::bind(&mut self.driver, element, &self.config.magnetic, self.policy)?;
            self.magnets.push(bound);
        }

        for card in query_all(&document, ".exp-card, .int-card")? {
            bind::bind_card_glow(&card)?;
        }

        let glow = BoundGlow::create(&mut self.driver, &document, &self.config.glow, self.policy)?;
        self.glow = Some(glow);

        let layers = ParallaxLayers::collect(&document, self.policy)?;
        if !layers.is_empty() {
            let layers = Rc::new(RefCell::new(layers));
            self.driver.register(Rc::clone(&layers));
            self.parallax = Some(layers);
        }

        let indicators = BoundIndicators::new(
            &document,
            by_id(&document, "scrollProgress"),
            by_id(&document, "nav"),
        );
        let indicators = Rc::new(RefCell::new(indicators));
        self.driver.register(Rc::clone(&indicators));
        self.indicators = Some(indicators);

        match (
            by_id(&document, "logoLoop"),
            by_id(&document, "logoLoopTrack"),
            by_id(&document, "logoLoopSeq"),
        ) {
            (Some(container), Some(track), Some(sequence)) => {
                let marquee =
                    BoundMarquee::bind(&mut self.driver, container, track, sequence, &self.config.marquee)?;
                self.marquee = Some(marquee);
            }
            _ => warn_missing("logo loop"),
        }

        bind::layout_pill_circles(&document)?;

        web_sys::console::log_1(
            &format!("cosmos-motion mounted {} frame tasks", self.driver.task_count()).into(),
        );
        Ok(())
    }

    /// Run one animation frame at `timestamp_ms` (`requestAnimationFrame` time)
    ///
    /// Returns the number of tasks that ran.
    pub fn frame(&mut self, timestamp_ms: f64) -> usize {
        self.last_report = self.driver.frame(timestamp_ms);
        self.last_report.dispatched
    }

    /// Summary of the last frame, as a JS object
    pub fn last_report(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.last_report)?)
    }

    /// Number of registered frame tasks
    pub fn task_count(&self) -> usize {
        self.driver.task_count()
    }

    /// Window-level pointer move
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.driver.pointer_mut().set_pointer(x, y);
    }

    /// Pointer entered or left the document
    pub fn set_pointer_inside(&mut self, inside: bool) {
        self.driver.pointer_mut().set_inside(inside);
    }

    /// Page scroll offset changed
    pub fn scroll(&mut self, scroll_y: f64) {
        self.driver.pointer_mut().set_scroll(scroll_y);
    }

    /// Window focus changed
    pub fn set_focused(&mut self, focused: bool) {
        self.driver.pointer_mut().set_focused(focused);
    }

    /// Page visibility changed; the first frame after becoming visible has a
    /// zero delta.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.driver.clock_mut().resume();
        }
    }

    /// Reduced-motion preference changed
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        let viewport = self.driver.pointer().snapshot().viewport;
        self.apply_policy(MotionPolicy::from_viewport(viewport.width, reduced));
    }

    /// Viewport resized
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.driver.pointer_mut().set_viewport(Viewport::new(width, height));
        self.apply_policy(MotionPolicy::from_viewport(width, self.policy.reduced_motion));

        if let Some(starfield) = &self.starfield {
            starfield.borrow_mut().surface_mut().resize(width, height);
        }
        if let Some(card) = &self.profile {
            card.borrow_mut().remeasure();
        }
        if let Some(marquee) = &self.marquee {
            marquee.borrow_mut().measure()?;
        }
        let document = document()?;
        if let Some(indicators) = &self.indicators {
            indicators
                .borrow_mut()
                .set_document_height(bind::page::document_height(&document));
        }
        bind::layout_pill_circles(&document)
    }

    /// Start the stat counters (once); call when the stats come into view
    pub fn run_counters(&mut self) -> Result<usize, JsValue> {
        if self.counters_started {
            return Ok(0);
        }
        self.counters_started = true;

        let mut started = 0;
        for element in query_all(&document()?, ".stat__num")? {
            match BoundCounter::new(element) {
                Ok(counter) => {
                    self.driver.register(Rc::new(RefCell::new(counter)));
                    started += 1;
                }
                Err(err) => web_sys::console::warn_1(&to_js_error(err)),
            }
        }
        Ok(started)
    }

    /// Smoothly scroll so `element_top` (document offset) lands below the nav
    ///
    /// Replaces any scroll still in flight.
    pub fn smooth_scroll_to(&mut self, element_top: f64) -> Result<(), JsValue> {
        if let Some(previous) = self.smooth_scroll.take() {
            self.driver.cancel(previous);
        }
        let from_y = self.driver.pointer().snapshot().scroll_y;
        let scroll = BoundSmoothScroll::new(window()?, from_y, element_top);
        self.smooth_scroll = Some(self.driver.register(Rc::new(RefCell::new(scroll))));
        Ok(())
    }
}

impl CosmosApp {
    fn from_config(config: MotionConfig) -> Result<CosmosApp, JsValue> {
        config.validate().map_err(to_js_error)?;

        let window = window()?;
        let width = window.inner_width()?.as_f64().unwrap_or(0.0);
        let height = window.inner_height()?.as_f64().unwrap_or(0.0);
        let reduced = window
            .match_media(REDUCED_MOTION_QUERY)?
            .map_or(false, |query| query.matches());

        Ok(Self {
            driver: FrameDriver::with_viewport(Viewport::new(width, height)),
            config,
            policy: MotionPolicy::from_viewport(width, reduced),
            starfield: None,
            spring_tilts: Vec::new(),
            profile: None,
            magnets: Vec::new(),
            glow: None,
            parallax: None,
            indicators: None,
            marquee: None,
            smooth_scroll: None,
            counters_started: false,
            mounted: false,
            last_report: FrameReport::default(),
        })
    }

    fn mount_starfield(&mut self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let viewport = self.driver.pointer().snapshot().viewport;
        let mut surface = CanvasSurface::new(canvas)?;
        surface.resize(viewport.width, viewport.height);

        let mut system = ParticleSystem::new(&self.config, SeededRandom::from_entropy());
        system.set_policy(self.policy);
        let starfield = Rc::new(RefCell::new(Starfield::new(system, surface)));
        self.driver.register(Rc::clone(&starfield));
        self.starfield = Some(starfield);
        Ok(())
    }

    fn apply_policy(&mut self, policy: MotionPolicy) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        if let Some(starfield) = &self.starfield {
            starfield.borrow_mut().system_mut().set_policy(policy);
        }
        for tilt in &self.spring_tilts {
            tilt.borrow_mut().set_policy(policy);
        }
        for magnet in &self.magnets {
            magnet.borrow_mut().set_policy(policy);
        }
        if let Some(glow) = &self.glow {
            glow.borrow_mut().set_policy(policy);
        }
        if let Some(layers) = &self.parallax {
            layers.borrow_mut().set_policy(policy);
        }
    }
}

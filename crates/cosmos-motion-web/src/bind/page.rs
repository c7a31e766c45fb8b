//! Page-wide effects: parallax layers, scroll indicators, counters, smooth
//! scrolling and pill hover circles.

use cosmos_motion_core::config::{CounterConfig, MotionPolicy, ParallaxConfig};
use cosmos_motion_core::easing::{CounterAnimation, SmoothScroll};
use cosmos_motion_core::frame::{FrameTask, FrameTime, TaskStatus};
use cosmos_motion_core::geometry::PillCircle;
use cosmos_motion_core::parallax::{ParallaxLayer, ParallaxSource, ScrollIndicators};
use cosmos_motion_core::pointer::PointerSnapshot;
use cosmos_motion_core::Result;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::dom::{element_rect, query_all, set_style, ElementAttributes};

/// Every `[data-parallax]` and `[data-mouse-parallax]` element.
pub struct ParallaxLayers {
    layers: Vec<(HtmlElement, ParallaxLayer)>,
    policy: MotionPolicy,
}

impl ParallaxLayers {
    /// Collect layers from the document.
    pub fn collect(document: &Document, policy: MotionPolicy) -> core::result::Result<Self, JsValue> {
        let mut layers = Vec::new();
        for (selector, source) in [
            ("[data-parallax]", ParallaxSource::Scroll),
            ("[data-mouse-parallax]", ParallaxSource::Pointer),
        ] {
            for element in query_all(document, selector)? {
                let config = ParallaxConfig::from_attributes(&ElementAttributes(&element));
                layers.push((element, ParallaxLayer::new(config, source)));
            }
        }
        Ok(Self { layers, policy })
    }

    /// Number of bound layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no element opted in.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Apply a new motion policy.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.policy = policy;
    }
}

impl FrameTask for ParallaxLayers {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn update(&mut self, _time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        for (element, layer) in &self.layers {
            if let Some(transform) = layer.transform(input, self.policy) {
                set_style(element, "transform", &transform);
            }
        }
        Ok(TaskStatus::Continue)
    }
}

/// `#scrollProgress` and the `scrolled` class on `#nav`.
pub struct BoundIndicators {
    indicators: ScrollIndicators,
    progress: Option<HtmlElement>,
    nav: Option<HtmlElement>,
}

/// Full scrollable height of the document.
pub fn document_height(document: &Document) -> f64 {
    document
        .document_element()
        .map_or(0.0, |root| f64::from(root.scroll_height()))
}

impl BoundIndicators {
    /// Bind whichever of the two elements exist.
    pub fn new(document: &Document, progress: Option<HtmlElement>, nav: Option<HtmlElement>) -> Self {
        Self {
            indicators: ScrollIndicators::new(document_height(document)),
            progress,
            nav,
        }
    }

    /// The document grew or shrank.
    pub fn set_document_height(&mut self, height: f64) {
        self.indicators.set_document_height(height);
    }
}

impl FrameTask for BoundIndicators {
    fn name(&self) -> &'static str {
        "scroll-indicators"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.indicators.update(time, input)?;
        if let Some(progress) = &self.progress {
            set_style(progress, "transform", &self.indicators.progress_css());
        }
        if let Some(nav) = &self.nav {
            if let Err(err) = nav
                .class_list()
                .toggle_with_force("scrolled", self.indicators.is_nav_scrolled())
            {
                web_sys::console::warn_1(&err);
            }
        }
        Ok(status)
    }
}

/// A `.stat__num` element counting up to its `data-target`.
pub struct BoundCounter {
    counter: CounterAnimation,
    element: HtmlElement,
}

impl BoundCounter {
    /// Read the target from the element. An unparsable `data-target` is
    /// returned as an error and the element is left alone.
    pub fn new(element: HtmlElement) -> Result<Self> {
        let config = CounterConfig::from_attributes(&ElementAttributes(&element))?;
        Ok(Self {
            counter: CounterAnimation::new(config),
            element,
        })
    }
}

impl FrameTask for BoundCounter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.counter.update(time, input)?;
        self.element.set_text_content(Some(self.counter.text()));
        Ok(status)
    }
}

/// Eased window scroll.
pub struct BoundSmoothScroll {
    scroll: SmoothScroll,
    window: Window,
}

impl BoundSmoothScroll {
    /// Scroll `window` from `from_y` so `element_top` sits below the nav bar.
    pub fn new(window: Window, from_y: f64, element_top: f64) -> Self {
        Self {
            scroll: SmoothScroll::to_element(from_y, element_top),
            window,
        }
    }
}

impl FrameTask for BoundSmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.scroll.update(time, input)?;
        self.window.scroll_to_with_x_and_y(0.0, self.scroll.current());
        Ok(status)
    }
}

/// Size the `.hover-circle` inside every `.pill`.
pub fn layout_pill_circles(document: &Document) -> core::result::Result<(), JsValue> {
    for pill in query_all(document, ".pill")? {
        let Some(circle) = pill
            .query_selector(".hover-circle")?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let rect = element_rect(&pill);
        let Some(geometry) = PillCircle::for_pill(rect.width, rect.height) else {
            continue;
        };
        let diameter = format!("{}px", geometry.diameter);
        set_style(&circle, "width", &diameter);
        set_style(&circle, "height", &diameter);
        set_style(&circle, "bottom", &format!("-{}px", geometry.bottom_offset));
    }
    Ok(())
}

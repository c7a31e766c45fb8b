//! The logo loop: a measured sequence tiled inside a moving track.

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_motion_core::config::MarqueeConfig;
use cosmos_motion_core::frame::{FrameDriver, FrameTask, FrameTime, StepOutcome, TaskStatus};
use cosmos_motion_core::marquee::{CopyPlan, LoopMarquee};
use cosmos_motion_core::pointer::PointerSnapshot;
use cosmos_motion_core::Result;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, Node};

use super::{register, with_bound};
use crate::dom::{listen, observe_resize, set_style};

/// Class shared by the sequence and its copies.
const LIST_SELECTOR: &str = ".logoloop__list";

/// A marquee bound to its container, track and first sequence.
pub struct BoundMarquee {
    marquee: LoopMarquee,
    container: HtmlElement,
    track: HtmlElement,
    sequence: HtmlElement,
}

impl BoundMarquee {
    /// Bind and perform the first measurement. The marquee re-measures
    /// whenever the container or the sequence changes size, so late fonts and
    /// images keep the wrap width current.
    pub fn bind(
        driver: &mut FrameDriver,
        container: HtmlElement,
        track: HtmlElement,
        sequence: HtmlElement,
        config: &MarqueeConfig,
    ) -> core::result::Result<Rc<RefCell<Self>>, JsValue> {
        let mut bound = Self {
            marquee: LoopMarquee::new(config.clone()),
            container,
            track: track.clone(),
            sequence,
        };
        bound.measure()?;

        let bound = Rc::new(RefCell::new(bound));
        register(driver, &bound);

        let target = Rc::clone(&bound);
        {
            let b = bound.borrow();
            let container: &Element = &b.container;
            let sequence: &Element = &b.sequence;
            observe_resize(&[container, sequence], move || {
                if let Some(Err(err)) = with_bound(&target, BoundMarquee::measure) {
                    web_sys::console::warn_1(&err);
                }
            })?;
        }

        let target = Rc::clone(&bound);
        listen(&track, "mouseenter", move |_| {
            with_bound(&target, |b| b.marquee.set_hovered(true));
        })?;
        let target = Rc::clone(&bound);
        listen(&track, "mouseleave", move |_| {
            with_bound(&target, |b| b.marquee.set_hovered(false));
        })?;

        Ok(bound)
    }

    /// Measure the sequence and container, then add or drop copies.
    pub fn measure(&mut self) -> core::result::Result<Option<CopyPlan>, JsValue> {
        let sequence_width = self.sequence.get_bounding_client_rect().width();
        let container_width = f64::from(self.container.client_width());
        let Some(plan) = self.marquee.measure(sequence_width, container_width) else {
            return Ok(None);
        };
        if plan.changed {
            self.materialize(plan)?;
        }
        Ok(Some(plan))
    }

    fn materialize(&self, plan: CopyPlan) -> core::result::Result<(), JsValue> {
        let sequence: &Node = &self.sequence;
        let existing = self.track.query_selector_all(LIST_SELECTOR)?;
        for i in (0..existing.length()).rev() {
            let Some(node) = existing.item(i) else {
                continue;
            };
            if !node.is_same_node(Some(sequence)) {
                self.track.remove_child(&node)?;
            }
        }

        for _ in 0..plan.clones() {
            let clone = self.sequence.clone_node_with_deep(true)?.dyn_into::<Element>()?;
            clone.remove_attribute("id")?;
            clone.set_attribute("aria-hidden", "true")?;
            self.track.append_child(&clone)?;
        }
        Ok(())
    }
}

impl FrameTask for BoundMarquee {
    fn name(&self) -> &'static str {
        "marquee"
    }

    fn update(&mut self, time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
        if self.marquee.sequence_width() <= 0.0 {
            // content (fonts, images) may not have laid out yet
            if let Err(err) = self.measure() {
                web_sys::console::warn_1(&err);
            }
        }
        if self.marquee.advance(time.delta_s) == StepOutcome::Applied {
            set_style(&self.track, "transform", &self.marquee.translate_css());
        }
        Ok(TaskStatus::Continue)
    }
}

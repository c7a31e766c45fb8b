//! Magnetic buttons, the cursor glow and card highlights.

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_motion_core::config::{GlowConfig, MagneticConfig, MotionPolicy};
use cosmos_motion_core::follow::{card_glow_vars, CursorGlow, MagneticFollower};
use cosmos_motion_core::frame::{FrameDriver, FrameTask, FrameTime, TaskStatus};
use cosmos_motion_core::pointer::PointerSnapshot;
use cosmos_motion_core::Result;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use super::{register, with_bound};
use crate::dom::{client_position, element_rect, listen, set_style};

/// A `.btn--magnetic` button.
pub struct BoundMagnetic {
    follower: MagneticFollower,
    element: HtmlElement,
}

impl BoundMagnetic {
    /// Bind `element`.
    pub fn bind(
        driver: &mut FrameDriver,
        element: HtmlElement,
        config: &MagneticConfig,
        policy: MotionPolicy,
    ) -> core::result::Result<Rc<RefCell<Self>>, JsValue> {
        let mut follower = MagneticFollower::new(config.clone());
        follower.set_policy(policy);
        let bound = Rc::new(RefCell::new(Self {
            follower,
            element: element.clone(),
        }));
        if let Some(waker) = register(driver, &bound) {
            bound.borrow_mut().follower.attach_waker(waker);
        }

        let target = Rc::clone(&bound);
        let el = element.clone();
        listen(&element, "mousemove", move |event| {
            let Some((x, y)) = client_position(&event) else {
                return;
            };
            let rect = element_rect(&el);
            with_bound(&target, |b| b.follower.pointer_move(rect, x, y));
        })?;

        let target = Rc::clone(&bound);
        listen(&element, "mouseleave", move |_| {
            with_bound(&target, |b| b.follower.pointer_leave());
        })?;

        Ok(bound)
    }

    /// Apply a new motion policy.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.follower.set_policy(policy);
    }
}

impl FrameTask for BoundMagnetic {
    fn name(&self) -> &'static str {
        "magnetic"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.follower.update(time, input)?;
        set_style(&self.element, "transform", &self.follower.transform_css());
        Ok(status)
    }
}

/// The `.cursor-glow` element appended to the body.
pub struct BoundGlow {
    glow: CursorGlow,
    element: HtmlElement,
}

impl BoundGlow {
    /// Create the glow element at the pointer's resting position.
    pub fn create(
        driver: &mut FrameDriver,
        document: &Document,
        config: &GlowConfig,
        policy: MotionPolicy,
    ) -> core::result::Result<Rc<RefCell<Self>>, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?;
        let element = document.create_element("div")?.dyn_into::<HtmlElement>()?;
        element.set_class_name("cursor-glow");
        body.append_child(&element)?;

        let start = driver.pointer().snapshot();
        let mut glow = CursorGlow::new(config.clone(), start.x, start.y);
        glow.set_policy(policy);

        let bound = Rc::new(RefCell::new(Self { glow, element }));
        register(driver, &bound);
        Ok(bound)
    }

    /// Apply a new motion policy.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.glow.set_policy(policy);
    }
}

impl FrameTask for BoundGlow {
    fn name(&self) -> &'static str {
        "cursor-glow"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.glow.update(time, input)?;
        let (x, y) = self.glow.position();
        set_style(&self.element, "left", &format!("{x}px"));
        set_style(&self.element, "top", &format!("{y}px"));
        set_style(&self.element, "opacity", &self.glow.opacity().to_string());
        Ok(status)
    }
}

/// Write `--mx` / `--my` on a card as the pointer moves over it.
///
/// Purely event-driven; nothing runs per frame.
pub fn bind_card_glow(card: &HtmlElement) -> core::result::Result<(), JsValue> {
    let el = card.clone();
    listen(card, "mousemove", move |event| {
        let Some((x, y)) = client_position(&event) else {
            return;
        };
        if let Some((mx, my)) = card_glow_vars(element_rect(&el), x, y) {
            set_style(&el, "--mx", &mx);
            set_style(&el, "--my", &my);
        }
    })
}

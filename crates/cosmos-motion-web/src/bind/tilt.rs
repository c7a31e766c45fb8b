//! `[data-tilt]` elements and the profile card.

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_motion_core::config::{MotionPolicy, ProfileTiltConfig, TiltConfig};
use cosmos_motion_core::frame::{FrameDriver, FrameTask, FrameTime, TaskStatus};
use cosmos_motion_core::pointer::PointerSnapshot;
use cosmos_motion_core::render::SurfaceSize;
use cosmos_motion_core::tilt::{SpringTilt, TiltEngine};
use cosmos_motion_core::Result;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use super::{register, with_bound};
use crate::dom::{client_position, element_rect, listen, set_style, ElementAttributes};

/// A `[data-tilt]` element rotating toward the pointer.
pub struct BoundSpringTilt {
    tilt: SpringTilt,
    element: HtmlElement,
}

impl BoundSpringTilt {
    /// Bind `element`, reading `data-tilt-max` over the shared defaults.
    pub fn bind(
        driver: &mut FrameDriver,
        element: HtmlElement,
        base: &TiltConfig,
        policy: MotionPolicy,
    ) -> core::result::Result<Rc<RefCell<Self>>, JsValue> {
        let config = TiltConfig {
            max_deg: TiltConfig::from_attributes(&ElementAttributes(&element)).max_deg,
            ..base.clone()
        };
        let mut tilt = SpringTilt::new(config);
        tilt.set_policy(policy);

        let bound = Rc::new(RefCell::new(Self {
            tilt,
            element: element.clone(),
        }));
        if let Some(waker) = register(driver, &bound) {
            bound.borrow_mut().tilt.attach_waker(waker);
        }

        let target = Rc::clone(&bound);
        let el = element.clone();
        listen(&element, "mousemove", move |event| {
            let Some((x, y)) = client_position(&event) else {
                return;
            };
            let rect = element_rect(&el);
            with_bound(&target, |b| {
                b.tilt.pointer_move(rect, x, y);
            });
        })?;

        let target = Rc::clone(&bound);
        listen(&element, "mouseleave", move |_| {
            with_bound(&target, |b| b.tilt.pointer_leave());
        })?;

        Ok(bound)
    }

    /// Apply a new motion policy.
    pub fn set_policy(&mut self, policy: MotionPolicy) {
        self.tilt.set_policy(policy);
    }
}

impl FrameTask for BoundSpringTilt {
    fn name(&self) -> &'static str {
        "spring-tilt"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        let status = self.tilt.update(time, input)?;
        set_style(&self.element, "transform", &self.tilt.transform_css());
        Ok(status)
    }
}

/// The profile card: CSS variables on the wrapper, state classes on the shell.
pub struct BoundProfileCard {
    engine: TiltEngine,
    wrapper: HtmlElement,
    shell: HtmlElement,
}

fn shell_size(shell: &HtmlElement) -> SurfaceSize {
    SurfaceSize::new(f64::from(shell.client_width()), f64::from(shell.client_height()))
}

/// Pointer position relative to the shell's top-left corner.
fn local_position(shell: &HtmlElement, event: &web_sys::Event) -> Option<(f64, f64)> {
    let (x, y) = client_position(event)?;
    let rect = element_rect(shell);
    Some(rect.local(x, y))
}

impl BoundProfileCard {
    /// Bind the card and start its entry glide.
    pub fn bind(
        driver: &mut FrameDriver,
        wrapper: HtmlElement,
        shell: HtmlElement,
        config: &ProfileTiltConfig,
    ) -> core::result::Result<Rc<RefCell<Self>>, JsValue> {
        let engine = TiltEngine::new(config.clone(), shell_size(&shell));
        let card = Self {
            engine,
            wrapper,
            shell: shell.clone(),
        };
        card.write();

        let bound = Rc::new(RefCell::new(card));
        if let Some(waker) = register(driver, &bound) {
            bound.borrow_mut().engine.attach_waker(waker);
        }

        let target = Rc::clone(&bound);
        let el = shell.clone();
        listen(&shell, "pointerenter", move |event| {
            if let Some((x, y)) = local_position(&el, &event) {
                with_bound(&target, |b| b.engine.pointer_enter(x, y));
            }
        })?;

        let target = Rc::clone(&bound);
        let el = shell.clone();
        listen(&shell, "pointermove", move |event| {
            if let Some((x, y)) = local_position(&el, &event) {
                with_bound(&target, |b| b.engine.pointer_move(x, y));
            }
        })?;

        let target = Rc::clone(&bound);
        listen(&shell, "pointerleave", move |_| {
            with_bound(&target, |b| b.engine.pointer_leave());
        })?;

        Ok(bound)
    }

    /// Re-measure the shell; the engine recentres if the pointer is away.
    pub fn remeasure(&mut self) {
        let size = shell_size(&self.shell);
        if size != self.engine.size() {
            self.engine.resize(size.width, size.height);
        }
    }

    fn write(&self) {
        for (name, value) in self.engine.output().css_properties() {
            set_style(&self.wrapper, name, &value);
        }
        let classes = self.shell.class_list();
        let toggles = [
            ("active", self.engine.is_active()),
            ("entering", self.engine.is_entering()),
        ];
        for (class, on) in toggles {
            if let Err(err) = classes.toggle_with_force(class, on) {
                web_sys::console::warn_1(&err);
            }
        }
    }
}

impl FrameTask for BoundProfileCard {
    fn name(&self) -> &'static str {
        "profile-card"
    }

    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
        self.remeasure();
        let status = self.engine.update(time, input)?;
        self.write();
        Ok(status)
    }
}

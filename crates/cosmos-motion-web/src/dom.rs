//! DOM helpers shared by the element bindings.

use cosmos_motion_core::config::AttributeSource;
use cosmos_motion_core::geometry::Rect;
use cosmos_motion_core::MotionError;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, MouseEvent, ResizeObserver, Window};

/// `data-*` lookups backed by a live element.
pub struct ElementAttributes<'a>(pub &'a Element);

impl AttributeSource for ElementAttributes<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }
}

/// Convert an engine error for the `#[wasm_bindgen]` boundary.
pub fn to_js_error(err: MotionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Report a missing element; the effect it drives is skipped.
pub fn warn_missing(what: &'static str) {
    let err = MotionError::MissingCollaborator { what };
    web_sys::console::warn_1(&err.to_string().into());
}

/// Browser window
pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window"))
}

/// Page document
pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))
}

/// Every element matching `selector`, as `HtmlElement`s.
pub fn query_all(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Element looked up by id, as an `HtmlElement`.
pub fn by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Viewport-relative bounding box.
pub fn element_rect(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

/// Pointer position of a mouse or pointer event, in viewport coordinates.
pub fn client_position(event: &Event) -> Option<(f64, f64)> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some((f64::from(mouse.client_x()), f64::from(mouse.client_y())))
}

/// Set one inline style property, logging failures.
pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        web_sys::console::warn_1(&err);
    }
}

/// Attach `handler` for `event` for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // listeners live as long as the page
    closure.forget();
    Ok(())
}

/// Call `handler` whenever one of `targets` changes size. Observation starts
/// with one immediate callback and lasts for the lifetime of the page.
pub fn observe_resize<F>(targets: &[&Element], mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let closure = Closure::wrap(Box::new(move |_entries: JsValue| handler()) as Box<dyn FnMut(JsValue)>);
    let observer = ResizeObserver::new(closure.as_ref().unchecked_ref())?;
    closure.forget();
    for target in targets {
        observer.observe(target);
    }
    Ok(())
}

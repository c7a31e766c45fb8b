//! Element bindings.
//!
//! Each bound element pairs an engine from `cosmos-motion-core` with the DOM
//! nodes it writes to. The pair is shared between the frame driver and the
//! element's event listeners; listeners mutate the engine and wake its task,
//! the task writes styles once per frame.

pub mod follow;
pub mod marquee;
pub mod page;
pub mod tilt;

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_motion_core::frame::{FrameDriver, FrameTask, TaskWaker};

pub use follow::{bind_card_glow, BoundGlow, BoundMagnetic};
pub use marquee::BoundMarquee;
pub use page::{layout_pill_circles, BoundCounter, BoundIndicators, BoundSmoothScroll, ParallaxLayers};
pub use tilt::{BoundProfileCard, BoundSpringTilt};

/// Register `bound` and hand back the waker for its listeners.
pub(crate) fn register<T>(driver: &mut FrameDriver, bound: &Rc<RefCell<T>>) -> Option<TaskWaker>
where
    T: FrameTask + 'static,
{
    let id = driver.register(Rc::clone(bound));
    driver.waker(id)
}

/// Run `f` on a bound element unless it is mid-frame.
pub(crate) fn with_bound<T, R>(bound: &Rc<RefCell<T>>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    bound.try_borrow_mut().ok().map(|mut b| f(&mut *b))
}

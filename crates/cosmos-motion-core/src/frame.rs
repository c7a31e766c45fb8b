//! Frame timing and the shared per-frame task driver.
//!
//! The host (a browser `requestAnimationFrame` loop or the headless runner)
//! calls [`FrameDriver::frame`] once per display refresh with a monotonic
//! millisecond timestamp. The driver converts it into a [`FrameTime`], takes
//! one [`PointerSnapshot`] and dispatches every scheduled [`FrameTask`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pointer::{PointerSnapshot, PointerTracker, Viewport};
use crate::REFERENCE_HZ;

/// Default clamp on a single frame's delta (seconds).
pub const DEFAULT_MAX_DT_S: f64 = 0.1;

/// Timing information for one dispatched frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Frame number since the clock started.
    pub frame_number: u64,
    /// Host timestamp of this frame (seconds).
    pub now_s: f64,
    /// Time since the first frame (seconds).
    pub elapsed_s: f64,
    /// Delta since the previous frame (seconds, clamped).
    pub delta_s: f64,
}

impl FrameTime {
    /// Create a frame time from explicit values.
    #[must_use]
    pub const fn new(frame_number: u64, now_s: f64, elapsed_s: f64, delta_s: f64) -> Self {
        Self {
            frame_number,
            now_s,
            elapsed_s,
            delta_s,
        }
    }

    /// A frame at `now_s` with a fixed delta, for stepping engines in tests.
    #[must_use]
    pub const fn fixed(frame_number: u64, now_s: f64, delta_s: f64) -> Self {
        Self::new(frame_number, now_s, now_s, delta_s)
    }

    /// The delta expressed in reference ticks (one 60 Hz frame = 1.0).
    #[must_use]
    pub fn ticks(&self) -> f64 {
        self.delta_s * REFERENCE_HZ
    }

    /// The frame that follows this one after `delta_s` seconds.
    #[must_use]
    pub fn next(&self, delta_s: f64) -> Self {
        Self {
            frame_number: self.frame_number + 1,
            now_s: self.now_s + delta_s,
            elapsed_s: self.elapsed_s + delta_s,
            delta_s,
        }
    }
}

/// Turns host timestamps into [`FrameTime`]s.
#[derive(Clone, Debug)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: Option<f64>,
    frame_number: u64,
    max_dt_s: f64,
}

impl FrameClock {
    /// Create a clock with the default delta clamp.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_dt(DEFAULT_MAX_DT_S)
    }

    /// Create a clock that clamps each delta to `max_dt_s` seconds.
    #[must_use]
    pub fn with_max_dt(max_dt_s: f64) -> Self {
        Self {
            start_ms: None,
            last_ms: None,
            frame_number: 0,
            max_dt_s: max_dt_s.max(0.0),
        }
    }

    /// Advance to the frame at `timestamp_ms`.
    ///
    /// The first frame, and the first frame after [`Self::resume`], has a zero
    /// delta. Timestamps that go backwards also produce a zero delta.
    pub fn advance(&mut self, timestamp_ms: f64) -> FrameTime {
        let start = *self.start_ms.get_or_insert(timestamp_ms);
        let delta_ms = match self.last_ms {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(timestamp_ms);

        let time = FrameTime {
            frame_number: self.frame_number,
            now_s: timestamp_ms / 1000.0,
            elapsed_s: (timestamp_ms - start).max(0.0) / 1000.0,
            delta_s: (delta_ms / 1000.0).min(self.max_dt_s),
        };
        self.frame_number += 1;
        time
    }

    /// Forget the previous timestamp so the next frame has a zero delta.
    ///
    /// Used when the page becomes visible again after being backgrounded.
    pub fn resume(&mut self) {
        self.last_ms = None;
    }

    /// Number of frames produced so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// What a task wants after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Keep dispatching every frame.
    Continue,
    /// Stop dispatching until woken by a [`TaskWaker`].
    Sleep,
    /// Remove the task.
    Done,
}

/// Result of one component step that depends on measured geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// State advanced and output is current.
    Applied,
    /// Geometry was degenerate; nothing changed and the step is retried next
    /// frame.
    Skipped,
}

/// A component updated once per rendered frame.
pub trait FrameTask {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Advance one frame.
    ///
    /// Returning an error is logged by the driver; the task stays scheduled.
    fn update(&mut self, time: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus>;
}

/// Identifier returned by [`FrameDriver::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw numeric id.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

/// Handle that reschedules a sleeping task from an input handler.
///
/// Waking only sets a flag; the driver picks it up at the start of the next
/// frame, so handlers never need to borrow the driver.
#[derive(Clone, Debug, Default)]
pub struct TaskWaker {
    flag: Rc<Cell<bool>>,
}

impl TaskWaker {
    /// Request dispatch on the next frame.
    pub fn wake(&self) {
        self.flag.set(true);
    }

    fn take(&self) -> bool {
        self.flag.replace(false)
    }
}

struct Slot {
    id: TaskId,
    task: Rc<RefCell<dyn FrameTask>>,
    sleeping: bool,
    waker: TaskWaker,
}

/// Summary of one [`FrameDriver::frame`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Timing of the frame.
    pub time: FrameTime,
    /// Tasks that ran.
    pub dispatched: usize,
    /// Tasks that went to sleep this frame.
    pub slept: usize,
    /// Tasks removed after returning [`TaskStatus::Done`].
    pub finished: usize,
    /// Tasks that returned an error.
    pub failed: usize,
}

/// Shared per-frame callback source.
///
/// Tasks are owned jointly by the driver and whoever registered them
/// (`Rc<RefCell<_>>`), so input handlers can keep mutating their component
/// between frames. Dispatch order is registration order, which is not
/// observable because tasks only read their own state plus the snapshot.
pub struct FrameDriver {
    clock: FrameClock,
    pointer: PointerTracker,
    slots: Vec<Slot>,
    next_id: u64,
}

impl FrameDriver {
    /// Create a driver for a default-sized viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::with_viewport(Viewport::default())
    }

    /// Create a driver for a viewport of the given size.
    #[must_use]
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            clock: FrameClock::new(),
            pointer: PointerTracker::new(viewport),
            slots: Vec::new(),
            next_id: 0,
        }
    }

    /// Replace the frame clock.
    #[must_use]
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Schedule a task; it runs from the next frame on.
    pub fn register<T>(&mut self, task: Rc<RefCell<T>>) -> TaskId
    where
        T: FrameTask + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let name = task.borrow().name();
        debug!(task = name, id = id.0, "registered frame task");
        self.slots.push(Slot {
            id,
            task,
            sleeping: false,
            waker: TaskWaker::default(),
        });
        id
    }

    /// Remove a task before it finishes. Returns `false` for unknown ids.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        let removed = self.slots.len() != before;
        if removed {
            debug!(id = id.0, "cancelled frame task");
        }
        removed
    }

    /// Reschedule a sleeping task immediately.
    pub fn wake(&mut self, id: TaskId) -> bool {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => {
                slot.sleeping = false;
                true
            }
            None => false,
        }
    }

    /// A waker that input handlers can keep for `id`.
    #[must_use]
    pub fn waker(&self, id: TaskId) -> Option<TaskWaker> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.waker.clone())
    }

    /// Whether `id` is still registered.
    #[must_use]
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Whether `id` is registered but not being dispatched.
    #[must_use]
    pub fn is_sleeping(&self, id: TaskId) -> bool {
        self.slots.iter().any(|slot| slot.id == id && slot.sleeping)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of tasks that will run next frame (ignoring pending wakes).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.sleeping).count()
    }

    /// Pointer and scroll state written by input handlers.
    #[must_use]
    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    /// Mutable access for input handlers.
    pub fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    /// Mutable access to the clock, e.g. to [`FrameClock::resume`].
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Run one frame.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameReport {
        let time = self.clock.advance(timestamp_ms);
        let input = self.pointer.snapshot();
        let mut report = FrameReport {
            time,
            ..FrameReport::default()
        };

        self.slots.retain_mut(|slot| {
            if slot.waker.take() {
                slot.sleeping = false;
            }
            if slot.sleeping {
                return true;
            }

            let Ok(mut task) = slot.task.try_borrow_mut() else {
                warn!(id = slot.id.0, "frame task busy, skipping frame");
                return true;
            };
            report.dispatched += 1;

            match task.update(&time, &input) {
                Ok(TaskStatus::Continue) => true,
                Ok(TaskStatus::Sleep) => {
                    slot.sleeping = true;
                    report.slept += 1;
                    true
                }
                Ok(TaskStatus::Done) => {
                    debug!(task = task.name(), id = slot.id.0, "frame task finished");
                    report.finished += 1;
                    false
                }
                Err(err) => {
                    warn!(task = task.name(), id = slot.id.0, "frame task failed: {err}");
                    report.failed += 1;
                    true
                }
            }
        });

        report
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-period timer polled from frame updates.
///
/// Fires at most once per poll; if several periods were missed (for example
/// while the tab was hidden) they collapse into a single fire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    period_s: f64,
    next_s: Option<f64>,
}

impl IntervalTimer {
    /// Create a timer with the given period in seconds.
    #[must_use]
    pub const fn new(period_s: f64) -> Self {
        Self {
            period_s,
            next_s: None,
        }
    }

    /// Period in seconds.
    #[must_use]
    pub const fn period(&self) -> f64 {
        self.period_s
    }

    /// Whether the timer is due at `now_s`. The first poll arms the timer.
    pub fn poll(&mut self, now_s: f64) -> bool {
        if self.period_s <= 0.0 {
            return false;
        }
        let next = *self.next_s.get_or_insert(now_s + self.period_s);
        if now_s < next {
            return false;
        }
        let mut following = next + self.period_s;
        if following <= now_s {
            following = now_s + self.period_s;
        }
        self.next_s = Some(following);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;

    struct Countdown {
        remaining: u32,
        calls: u32,
    }

    impl FrameTask for Countdown {
        fn name(&self) -> &'static str {
            "countdown"
        }

        fn update(&mut self, _time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
            self.calls += 1;
            if self.remaining == 0 {
                return Ok(TaskStatus::Done);
            }
            self.remaining -= 1;
            Ok(TaskStatus::Continue)
        }
    }

    struct Sleeper {
        calls: u32,
    }

    impl FrameTask for Sleeper {
        fn name(&self) -> &'static str {
            "sleeper"
        }

        fn update(&mut self, _time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
            self.calls += 1;
            Ok(TaskStatus::Sleep)
        }
    }

    struct Faulty {
        calls: u32,
    }

    impl FrameTask for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn update(&mut self, _time: &FrameTime, _input: &PointerSnapshot) -> Result<TaskStatus> {
            self.calls += 1;
            Err(MotionError::MissingCollaborator { what: "canvas" })
        }
    }

    #[test]
    fn test_clock_first_frame_has_zero_delta() {
        let mut clock = FrameClock::new();
        let t0 = clock.advance(1000.0);
        assert_eq!(t0.delta_s, 0.0);
        assert_eq!(t0.frame_number, 0);

        let t1 = clock.advance(1016.0);
        assert!((t1.delta_s - 0.016).abs() < 1e-12);
        assert!((t1.elapsed_s - 0.016).abs() < 1e-12);
        assert_eq!(t1.frame_number, 1);
    }

    #[test]
    fn test_clock_clamps_gaps_and_backwards_time() {
        let mut clock = FrameClock::with_max_dt(0.1);
        clock.advance(0.0);
        assert!((clock.advance(5000.0).delta_s - 0.1).abs() < 1e-12);
        assert_eq!(clock.advance(4000.0).delta_s, 0.0);
    }

    #[test]
    fn test_clock_resume_resets_delta() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        clock.advance(16.0);
        clock.resume();
        assert_eq!(clock.advance(9000.0).delta_s, 0.0);
    }

    #[test]
    fn test_ticks_at_reference_rate() {
        let t = FrameTime::fixed(0, 0.0, 1.0 / 60.0);
        assert!((t.ticks() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_done_task_is_removed() {
        let mut driver = FrameDriver::new();
        let task = Rc::new(RefCell::new(Countdown {
            remaining: 2,
            calls: 0,
        }));
        let id = driver.register(task.clone());

        for i in 0..5 {
            driver.frame(i as f64 * 16.0);
        }

        assert!(!driver.is_registered(id));
        assert_eq!(task.borrow().calls, 3);
    }

    #[test]
    fn test_cancel_stops_dispatch() {
        let mut driver = FrameDriver::new();
        let task = Rc::new(RefCell::new(Countdown {
            remaining: 100,
            calls: 0,
        }));
        let id = driver.register(task.clone());
        driver.frame(0.0);
        assert!(driver.cancel(id));
        assert!(!driver.cancel(id));
        driver.frame(16.0);
        assert_eq!(task.borrow().calls, 1);
    }

    #[test]
    fn test_sleeping_task_wakes_through_waker() {
        let mut driver = FrameDriver::new();
        let task = Rc::new(RefCell::new(Sleeper { calls: 0 }));
        let id = driver.register(task.clone());
        let waker = driver.waker(id).expect("registered");

        driver.frame(0.0);
        driver.frame(16.0);
        assert_eq!(task.borrow().calls, 1);
        assert!(driver.is_sleeping(id));

        waker.wake();
        driver.frame(32.0);
        assert_eq!(task.borrow().calls, 2);
    }

    #[test]
    fn test_failing_task_does_not_stop_others() {
        let mut driver = FrameDriver::new();
        let faulty = Rc::new(RefCell::new(Faulty { calls: 0 }));
        let healthy = Rc::new(RefCell::new(Countdown {
            remaining: 10,
            calls: 0,
        }));
        driver.register(faulty.clone());
        driver.register(healthy.clone());

        let report = driver.frame(0.0);
        driver.frame(16.0);

        assert_eq!(report.failed, 1);
        assert_eq!(report.dispatched, 2);
        assert_eq!(faulty.borrow().calls, 2);
        assert_eq!(healthy.borrow().calls, 2);
    }

    #[test]
    fn test_snapshot_taken_before_dispatch() {
        struct SnapshotRecorder(Option<f64>);
        impl FrameTask for SnapshotRecorder {
            fn name(&self) -> &'static str {
                "snapshot-recorder"
            }
            fn update(&mut self, _t: &FrameTime, input: &PointerSnapshot) -> Result<TaskStatus> {
                self.0 = Some(input.scroll_y);
                Ok(TaskStatus::Continue)
            }
        }

        let mut driver = FrameDriver::new();
        let recorder = Rc::new(RefCell::new(SnapshotRecorder(None)));
        driver.register(recorder.clone());
        driver.pointer_mut().set_scroll(120.0);
        driver.pointer_mut().set_scroll(240.0);
        driver.frame(0.0);
        assert_eq!(recorder.borrow().0, Some(240.0));
    }

    #[test]
    fn test_interval_timer_collapses_missed_periods() {
        let mut timer = IntervalTimer::new(3.0);
        assert!(!timer.poll(0.0));
        assert!(!timer.poll(2.9));
        assert!(timer.poll(3.0));
        assert!(!timer.poll(3.1));
        // hidden tab for 20 s: one fire, then back to normal cadence
        assert!(timer.poll(23.0));
        assert!(!timer.poll(24.0));
        assert!(timer.poll(26.0));
    }
}

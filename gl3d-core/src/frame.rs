/// Host-driven frame loop.
///
/// The host decides when a frame may be drawn; [`FrameScheduler`] is its
/// "call me on the next frame" primitive. Each request yields exactly one
/// callback. A loop continues only because the draw routine schedules the
/// next frame, so stopping is simply not rescheduling.
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Callback run on the next frame with the host timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

pub trait FrameScheduler {
    fn request_next_frame(&self, callback: FrameCallback);
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for Rc<T> {
    fn request_next_frame(&self, callback: FrameCallback) {
        (**self).request_next_frame(callback)
    }
}

/// Requests one future invocation of `callback`.
pub fn schedule_next_frame<S, F>(scheduler: &S, callback: F)
where
    S: FrameScheduler + ?Sized,
    F: FnOnce(f64) + 'static,
{
    scheduler.request_next_frame(Box::new(callback));
}

/// Returned by a draw routine to keep or end the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

pub struct FrameLoop;

impl FrameLoop {
    /// Calls `draw` once per frame until it returns [`FrameControl::Stop`].
    pub fn start<S, F>(scheduler: Rc<S>, draw: F)
    where
        S: FrameScheduler + ?Sized + 'static,
        F: FnMut(f64) -> FrameControl + 'static,
    {
        schedule_loop(scheduler, draw);
    }

    /// Like [`FrameLoop::start`], with clamped frame timing.
    pub fn start_timed<S, F>(scheduler: Rc<S>, mut draw: F)
    where
        S: FrameScheduler + ?Sized + 'static,
        F: FnMut(FrameTime) -> FrameControl + 'static,
    {
        let mut clock = FrameClock::new();
        schedule_loop(scheduler, move |timestamp| draw(clock.tick(timestamp)));
    }
}

/// Start/stop switch for a loop that can be restarted.
///
/// Every start opens a new generation. A loop keeps drawing only while the
/// switch is on and its generation is the latest, so a frame still queued
/// from a stopped loop ends that loop instead of running beside its
/// replacement.
#[derive(Debug, Clone, Default)]
pub struct LoopSwitch {
    state: Rc<SwitchState>,
}

#[derive(Debug, Default)]
struct SwitchState {
    running: Cell<bool>,
    generation: Cell<u64>,
}

impl LoopSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Turns the switch on and returns the new generation, or `None` when
    /// it is already on.
    pub fn turn_on(&self) -> Option<u64> {
        if self.is_running() {
            return None;
        }
        let generation = self.state.generation.get().wrapping_add(1);
        self.state.generation.set(generation);
        self.state.running.set(true);
        Some(generation)
    }

    pub fn stop(&self) {
        self.state.running.set(false);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.state.generation.get() == generation
    }
}

impl FrameLoop {
    /// Starts a timed loop owned by `switch`. Returns `false` without
    /// scheduling anything when the switch is already on.
    pub fn start_switched<S, F>(scheduler: Rc<S>, switch: &LoopSwitch, mut draw: F) -> bool
    where
        S: FrameScheduler + ?Sized + 'static,
        F: FnMut(FrameTime) -> FrameControl + 'static,
    {
        let Some(generation) = switch.turn_on() else {
            return false;
        };
        let switch = switch.clone();
        Self::start_timed(scheduler, move |time| {
            if switch.is_current(generation) {
                draw(time)
            } else {
                FrameControl::Stop
            }
        });
        true
    }
}

fn schedule_loop<S, F>(scheduler: Rc<S>, mut draw: F)
where
    S: FrameScheduler + ?Sized + 'static,
    F: FnMut(f64) -> FrameControl + 'static,
{
    let next = Rc::clone(&scheduler);
    schedule_next_frame(&*scheduler, move |timestamp| {
        if draw(timestamp) == FrameControl::Continue {
            schedule_loop(next, draw);
        } else {
            log::debug!("Frame loop stopped");
        }
    });
}

/// Scheduler whose queue is pumped by the host.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<FrameCallback>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs the callbacks queued so far. Requests made while running wait
    /// for the next call. Returns the number of callbacks run.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        let due: Vec<FrameCallback> = self.queue.borrow_mut().drain(..).collect();
        let count = due.len();
        for callback in due {
            callback(timestamp);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_next_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}

/// Frame timing snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped.
    pub dt: f64,
    /// Host timestamp of this frame in milliseconds.
    pub timestamp: f64,
    pub frame_index: u64,
}

/// Produces [`FrameTime`] from host timestamps.
///
/// Delta time is clamped so stalls and duplicate timestamps stay harmless.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_index: u64,
    dt_min: f64,
    dt_max: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(0.0001, 0.25)
    }

    pub fn with_clamps(dt_min: f64, dt_max: f64) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advances the clock to `timestamp` (milliseconds).
    pub fn tick(&mut self, timestamp: f64) -> FrameTime {
        let elapsed = match self.last {
            Some(last) => (timestamp - last) / 1000.0,
            None => 0.0,
        };
        self.last = Some(timestamp);

        let time = FrameTime {
            dt: elapsed.clamp(self.dt_min, self.dt_max),
            timestamp,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_schedule_runs_once() {
        let scheduler = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        schedule_next_frame(&scheduler, move |_| counter.set(counter.get() + 1));

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.run_frame(16.0), 1);
        assert_eq!(scheduler.run_frame(32.0), 0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_loop_reschedules_once_per_frame() {
        let scheduler = Rc::new(ManualScheduler::new());
        let frames = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&frames);

        FrameLoop::start(Rc::clone(&scheduler), move |timestamp| {
            seen.borrow_mut().push(timestamp);
            if seen.borrow().len() < 3 {
                FrameControl::Continue
            } else {
                FrameControl::Stop
            }
        });

        for frame in 1..=5 {
            assert!(scheduler.pending() <= 1);
            scheduler.run_frame(frame as f64 * 16.0);
        }
        assert_eq!(*frames.borrow(), vec![16.0, 32.0, 48.0]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_timed_loop() {
        let scheduler = Rc::new(ManualScheduler::new());
        let times = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&times);

        FrameLoop::start_timed(Rc::clone(&scheduler), move |time| {
            seen.borrow_mut().push(time);
            FrameControl::Continue
        });
        scheduler.run_frame(1000.0);
        scheduler.run_frame(1020.0);

        let times = times.borrow();
        assert_eq!(times[0].frame_index, 0);
        assert_eq!(times[1].frame_index, 1);
        assert!((times[1].dt - 0.02).abs() < 1e-9);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_switched_loop_stops() {
        let scheduler = Rc::new(ManualScheduler::new());
        let switch = LoopSwitch::new();
        let draws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&draws);

        assert!(FrameLoop::start_switched(Rc::clone(&scheduler), &switch, move |_| {
            counter.set(counter.get() + 1);
            FrameControl::Continue
        }));
        assert!(!FrameLoop::start_switched(Rc::clone(&scheduler), &switch, |_| FrameControl::Continue));
        scheduler.run_frame(16.0);
        scheduler.run_frame(32.0);
        assert_eq!(draws.get(), 2);

        switch.stop();
        scheduler.run_frame(48.0);
        assert_eq!(draws.get(), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_restart_before_pending_frame_keeps_one_loop() {
        let scheduler = Rc::new(ManualScheduler::new());
        let switch = LoopSwitch::new();
        let draws = Rc::new(Cell::new(0));

        let start = |switch: &LoopSwitch| {
            let counter = Rc::clone(&draws);
            FrameLoop::start_switched(Rc::clone(&scheduler), switch, move |_| {
                counter.set(counter.get() + 1);
                FrameControl::Continue
            })
        };

        assert!(start(&switch));
        scheduler.run_frame(16.0);
        assert_eq!(draws.get(), 1);

        switch.stop();
        assert!(start(&switch));
        assert_eq!(scheduler.pending(), 2);

        for frame in 2..=6 {
            let before = draws.get();
            scheduler.run_frame(frame as f64 * 16.0);
            assert_eq!(draws.get(), before + 1);
            assert_eq!(scheduler.pending(), 1);
        }
    }

    #[test]
    fn test_clock_clamps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(0.0).dt, 0.0001);
        assert_eq!(clock.tick(0.0).dt, 0.0001);
        assert_eq!(clock.tick(10_000.0).dt, 0.25);

        clock.reset();
        let time = clock.tick(20_000.0);
        assert_eq!(time.dt, 0.0001);
        assert_eq!(time.frame_index, 3);
    }
}

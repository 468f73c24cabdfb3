//=========================================================================
// Timers
//=========================================================================
//
// Countdown timers advanced by frame delta time.
//
// Lifecycle:
//   add_timer() → [ticking] → fires → finished → pruned from the list
//   repeating timers re-arm instead of finishing, and fire once for every
//   whole period a long frame covers
//   remove_timer() cancels, so pending firings of the frame are dropped
//
// The callback is taken out of the timer while it runs, so a callback may
// freely query or remove its own handle.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::Stage;

//=== Timer ===============================================================

/// Timer callback.
pub type TimerCallback = Box<dyn FnMut(&mut Stage)>;

/// A countdown that invokes its callback once `duration` seconds elapsed.
pub struct Timer {
    duration: f64,
    elapsed: f64,
    repeating: bool,
    finished: bool,
    cancelled: bool,
    callback: Option<TimerCallback>,
}

impl Timer {
    /// Creates a one-shot timer firing after `duration` seconds.
    pub fn new<F>(duration: f64, callback: F) -> Self
    where
        F: FnMut(&mut Stage) + 'static,
    {
        Self {
            duration,
            elapsed: 0.0,
            repeating: false,
            finished: false,
            cancelled: false,
            callback: Some(Box::new(callback)),
        }
    }

    /// Creates a one-shot timer whose callback also receives `param`.
    pub fn with_param<P, F>(duration: f64, param: P, mut callback: F) -> Self
    where
        P: 'static,
        F: FnMut(&mut Stage, &mut P) + 'static,
    {
        let mut param = param;
        Self::new(duration, move |stage| callback(stage, &mut param))
    }

    /// Re-arms after every firing instead of finishing.
    pub fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Seconds left until the next firing.
    pub fn remaining(&self) -> f64 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    //--- Internal Helpers -------------------------------------------------

    /// Advances by `dt` seconds. Returns how many times the timer fired.
    fn advance(&mut self, dt: f64) -> u32 {
        if self.finished || self.cancelled {
            return 0;
        }

        self.elapsed += dt;
        if self.elapsed < self.duration {
            return 0;
        }

        if self.repeating && self.duration > 0.0 {
            let periods = (self.elapsed / self.duration).floor();
            self.elapsed -= periods * self.duration;
            periods as u32
        } else if self.repeating {
            self.elapsed = 0.0;
            1
        } else {
            self.finished = true;
            1
        }
    }

    fn take_callback(&mut self) -> Option<TimerCallback> {
        if self.cancelled {
            return None;
        }
        self.callback.take()
    }

    fn restore(&mut self, callback: TimerCallback) {
        self.callback = Some(callback);
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("repeating", &self.repeating)
            .field("finished", &self.finished)
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

//=== TimerHandle =========================================================

/// Shared identity of a registered timer.
#[derive(Debug, Clone)]
pub struct TimerHandle(Rc<RefCell<Timer>>);

impl TimerHandle {
    pub(crate) fn new(timer: Timer) -> Self {
        Self(Rc::new(RefCell::new(timer)))
    }

    pub fn is_finished(&self) -> bool {
        self.0.borrow().is_finished()
    }

    pub fn remaining(&self) -> f64 {
        self.0.borrow().remaining()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &TimerHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Advances the timer and runs its callback once per firing.
    ///
    /// Stops early if a callback cancels the timer.
    pub(crate) fn update(&self, stage: &mut Stage, dt: f64) {
        let fired = self.0.borrow_mut().advance(dt);

        for _ in 0..fired {
            let Some(mut callback) = self.0.borrow_mut().take_callback() else {
                return;
            };
            callback(stage);
            self.0.borrow_mut().restore(callback);
        }
    }

    /// Drops any pending firings; the timer never fires again.
    pub(crate) fn cancel(&self) {
        self.0.borrow_mut().cancelled = true;
    }
}

//=== TimerList ===========================================================

#[derive(Debug, Default)]
pub(crate) struct TimerList {
    timers: Vec<TimerHandle>,
}

impl TimerList {
    pub(crate) fn new() -> Self {
        Self { timers: Vec::new() }
    }

    pub(crate) fn push(&mut self, timer: TimerHandle) {
        self.timers.push(timer);
    }

    /// Removes `timer` by identity. Returns `false` if it was not listed.
    pub(crate) fn remove(&mut self, timer: &TimerHandle) -> bool {
        match self.timers.iter().position(|t| t.ptr_eq(timer)) {
            Some(index) => {
                self.timers.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, timer: &TimerHandle) -> bool {
        self.timers.iter().any(|t| t.ptr_eq(timer))
    }

    pub(crate) fn snapshot(&self) -> Vec<TimerHandle> {
        self.timers.clone()
    }

    /// Drops one-shot timers that already fired.
    pub(crate) fn prune_finished(&mut self) {
        self.timers.retain(|t| !t.is_finished());
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_timer(duration: f64) -> (Rc<Cell<u32>>, Timer) {
        let count = Rc::new(Cell::new(0));
        let sink = count.clone();
        (count, Timer::new(duration, move |_| sink.set(sink.get() + 1)))
    }

    #[test]
    fn one_shot_fires_once_after_duration() {
        let mut stage = Stage::new();
        let (count, timer) = counting_timer(2.0);
        let handle = TimerHandle::new(timer);

        for _ in 0..3 {
            handle.update(&mut stage, 0.5);
        }
        assert_eq!(count.get(), 0);
        assert_eq!(handle.remaining(), 0.5);

        handle.update(&mut stage, 0.5);
        handle.update(&mut stage, 0.5);
        handle.update(&mut stage, 0.5);

        assert_eq!(count.get(), 1);
        assert!(handle.is_finished());
    }

    #[test]
    fn repeating_rearms() {
        let mut stage = Stage::new();
        let (count, timer) = counting_timer(1.0);
        let handle = TimerHandle::new(timer.repeating());

        for _ in 0..5 {
            handle.update(&mut stage, 0.5);
        }

        assert_eq!(count.get(), 2);
        assert!(!handle.is_finished());
    }

    #[test]
    fn repeating_catches_up_on_long_frames() {
        let mut stage = Stage::new();
        let (count, timer) = counting_timer(0.5);
        let handle = TimerHandle::new(timer.repeating());

        handle.update(&mut stage, 1.6);

        assert_eq!(count.get(), 3);
        assert!((handle.remaining() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn cancelled_timer_stops_firing() {
        let mut stage = Stage::new();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let inner = slot.clone();
        let count = Rc::new(Cell::new(0));
        let sink = count.clone();

        let handle = TimerHandle::new(
            Timer::new(0.5, move |_| {
                sink.set(sink.get() + 1);
                if let Some(me) = inner.borrow().as_ref() {
                    me.cancel();
                }
            })
            .repeating(),
        );
        *slot.borrow_mut() = Some(handle.clone());

        handle.update(&mut stage, 2.0);
        handle.update(&mut stage, 2.0);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn param_is_passed_mutably() {
        let mut stage = Stage::new();
        let seen = Rc::new(Cell::new(0));
        let sink = seen.clone();
        let timer = Timer::with_param(0.1, 41, move |_, value: &mut i32| {
            *value += 1;
            sink.set(*value);
        });
        let handle = TimerHandle::new(timer);

        handle.update(&mut stage, 0.2);

        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn callback_may_query_its_own_handle() {
        let mut stage = Stage::new();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let inner = slot.clone();
        let observed = Rc::new(Cell::new(false));
        let sink = observed.clone();

        let handle = TimerHandle::new(Timer::new(0.0, move |_| {
            if let Some(me) = inner.borrow().as_ref() {
                sink.set(me.is_finished());
            }
        }));
        *slot.borrow_mut() = Some(handle.clone());

        handle.update(&mut stage, 0.016);

        assert!(observed.get());
    }

    #[test]
    fn list_prunes_finished_and_removes_by_identity() {
        let mut list = TimerList::new();
        let (_, short) = counting_timer(0.0);
        let (_, long) = counting_timer(10.0);
        let short = TimerHandle::new(short);
        let long = TimerHandle::new(long);
        list.push(short.clone());
        list.push(long.clone());

        let mut stage = Stage::new();
        short.update(&mut stage, 0.1);
        list.prune_finished();

        assert_eq!(list.len(), 1);
        assert!(!list.contains(&short));
        assert!(list.remove(&long));
        assert!(!list.remove(&long));
    }
}

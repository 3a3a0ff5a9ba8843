//! Debouncing of query input.
//!
//! [`Debouncer`] is the bare state machine (`Idle -> Pending -> Fired`) with
//! time passed in by the caller. [`LoopDebouncer`] drives the same machine
//! from a calloop timer and owns the timer registration, so superseding,
//! cancelling or dropping it always removes the pending timer.

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<T> {
    Idle,
    Pending { deadline: Instant, value: T },
    Fired,
}

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    phase: Phase<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            phase: Phase::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Schedules `value` for `now + delay`, discarding any value still
    /// pending. Returns true when something was superseded.
    pub fn push(&mut self, value: T, now: Instant) -> bool {
        let superseded = self.is_pending();
        self.phase = Phase::Pending {
            deadline: now + self.delay,
            value,
        };
        superseded
    }

    /// Releases the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Releases the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.take()
    }

    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pending { value, .. } => Some(value),
            _ => None,
        }
    }

    fn take(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.phase, Phase::Fired) {
            Phase::Pending { value, .. } => Some(value),
            other => {
                self.phase = other;
                None
            }
        }
    }
}

struct Shared<T> {
    machine: Debouncer<T>,
    token: Option<RegistrationToken>,
}

type FireFn<T, Data> = Rc<RefCell<dyn FnMut(T, &mut Data)>>;

/// A [`Debouncer`] whose deadline is a calloop timer source.
pub struct LoopDebouncer<T: 'static, Data: 'static> {
    handle: LoopHandle<'static, Data>,
    shared: Rc<RefCell<Shared<T>>>,
    on_fire: FireFn<T, Data>,
}

impl<T: 'static, Data: 'static> LoopDebouncer<T, Data> {
    pub fn new<F>(handle: LoopHandle<'static, Data>, delay: Duration, on_fire: F) -> Self
    where
        F: FnMut(T, &mut Data) + 'static,
    {
        let on_fire: FireFn<T, Data> = Rc::new(RefCell::new(on_fire));
        Self {
            handle,
            shared: Rc::new(RefCell::new(Shared {
                machine: Debouncer::new(delay),
                token: None,
            })),
            on_fire,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.shared.borrow().machine.is_pending()
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        if let Some(token) = shared.token.take() {
            self.handle.remove(token);
            debug!("LoopDebouncer: superseded pending value");
        }
        shared.machine.push(value, Instant::now());
        let Some(deadline) = shared.machine.deadline() else {
            return Ok(());
        };

        let weak = Rc::downgrade(&self.shared);
        let on_fire = Rc::clone(&self.on_fire);
        let token = self
            .handle
            .insert_source(Timer::from_deadline(deadline), move |fired_at, _, data| {
                let Some(shared) = weak.upgrade() else {
                    return TimeoutAction::Drop;
                };
                let value = {
                    let mut shared = shared.borrow_mut();
                    shared.token = None;
                    shared.machine.poll(fired_at.max(Instant::now()))
                };
                if let Some(value) = value {
                    (on_fire.borrow_mut())(value, data);
                }
                TimeoutAction::Drop
            })
            .map_err(|e| e.error)?;
        shared.token = Some(token);
        Ok(())
    }

    /// Drops the pending value and its timer. Returns whether anything was
    /// pending.
    pub fn cancel(&mut self) -> bool {
        let mut shared = self.shared.borrow_mut();
        if let Some(token) = shared.token.take() {
            self.handle.remove(token);
        }
        shared.machine.cancel().is_some()
    }
}

impl<T: 'static, Data: 'static> Drop for LoopDebouncer<T, Data> {
    fn drop(&mut self) {
        if self.cancel() {
            debug!("LoopDebouncer: cancelled pending value on teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("abc", start);
        assert_eq!(d.poll(start + Duration::from_millis(299)), None);
        assert_eq!(d.poll(start + Duration::from_millis(300)), Some("abc"));
        assert_eq!(d.phase(), &Phase::Fired);
        assert_eq!(d.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_push_restarts_the_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        assert!(!d.push("a", start));
        assert!(d.push("ab", start + Duration::from_millis(200)));
        assert_eq!(d.poll(start + Duration::from_millis(350)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some("ab"));
    }

    #[test]
    fn test_cancel_discards_pending() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        d.push(1, start);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.phase(), &Phase::Idle);
        assert_eq!(d.poll(start + Duration::from_secs(1)), None);
        assert_eq!(d.cancel(), None);
    }

    #[test]
    fn test_flush_fires_immediately() {
        let mut d = Debouncer::new(Duration::from_secs(60));
        d.push("x", Instant::now());
        assert_eq!(d.flush(), Some("x"));
        assert_eq!(d.flush(), None);
    }

    #[derive(Default)]
    struct Recorder {
        fired: Vec<String>,
    }

    fn run_for(event_loop: &mut EventLoop<'static, Recorder>, rec: &mut Recorder, total: Duration) {
        let start = Instant::now();
        while start.elapsed() < total {
            event_loop.dispatch(Some(Duration::from_millis(5)), rec).unwrap();
        }
    }

    #[test]
    fn test_loop_debouncer_only_fires_last_value() {
        let mut event_loop: EventLoop<'static, Recorder> = EventLoop::try_new().unwrap();
        let mut debouncer = LoopDebouncer::new(
            event_loop.handle(),
            Duration::from_millis(40),
            |q: String, rec: &mut Recorder| rec.fired.push(q),
        );
        let mut rec = Recorder::default();

        debouncer.push("a".to_string()).unwrap();
        debouncer.push("ab".to_string()).unwrap();
        debouncer.push("abc".to_string()).unwrap();
        assert!(debouncer.is_pending());

        run_for(&mut event_loop, &mut rec, Duration::from_millis(150));
        assert_eq!(rec.fired, vec!["abc".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_loop_debouncer_cancel_prevents_firing() {
        let mut event_loop: EventLoop<'static, Recorder> = EventLoop::try_new().unwrap();
        let mut debouncer = LoopDebouncer::new(
            event_loop.handle(),
            Duration::from_millis(20),
            |q: String, rec: &mut Recorder| rec.fired.push(q),
        );
        let mut rec = Recorder::default();

        debouncer.push("chair".to_string()).unwrap();
        assert!(debouncer.cancel());
        run_for(&mut event_loop, &mut rec, Duration::from_millis(80));
        assert!(rec.fired.is_empty());
    }

    #[test]
    fn test_loop_debouncer_drop_cancels_pending_timer() {
        let mut event_loop: EventLoop<'static, Recorder> = EventLoop::try_new().unwrap();
        let mut rec = Recorder::default();
        {
            let mut debouncer = LoopDebouncer::new(
                event_loop.handle(),
                Duration::from_millis(20),
                |q: String, rec: &mut Recorder| rec.fired.push(q),
            );
            debouncer.push("desk".to_string()).unwrap();
        }
        run_for(&mut event_loop, &mut rec, Duration::from_millis(80));
        assert!(rec.fired.is_empty());
    }
}

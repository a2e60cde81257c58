//! Single-slot trailing-edge debounce timer.
//!
//! Scheduling replaces both the pending value and the deadline, so a burst of
//! requests closer together than `delay` fires once, with the last value, at
//! `last_request + delay`. The timer holds no thread; owners call
//! [`Debouncer::poll`] with the current instant from their event loop.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay. A pending deadline keeps its old value.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Store `value` and restart the timer from `now`. Returns the value it
    /// replaced, if any.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        self.deadline = Some(now + self.delay);
        self.pending.replace(value)
    }

    /// Drop the pending value and deadline.
    pub fn cancel(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the pending value fires (zero when overdue).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }
}

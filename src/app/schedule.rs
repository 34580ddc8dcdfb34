//! Deadline-based callbacks
//!
//! Stands in for "run this later" timers. The owner polls with the current
//! instant; cancelling drops the pending action so it can never fire late.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    pending: Option<(T, Instant)>,
}

impl<T> Default for Scheduled<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Scheduled<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `action` to fire `delay` after `now`. Replaces anything already armed.
    pub fn arm(&mut self, action: T, now: Instant, delay: Duration) {
        self.pending = Some((action, now + delay));
    }

    /// Drop the pending action.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(action, _)| action)
    }

    /// Take the action if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(action, _)| action),
            _ => None,
        }
    }
}

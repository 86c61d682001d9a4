//! Cancellable delayed task
//!
//! A [`Debouncer`] coalesces a burst of triggers into one elapsed event fired
//! `delay` after the last trigger. The host owns the actual clock: it is asked
//! to schedule and cancel one-shot timeouts and reports back through
//! [`Debouncer::take_elapsed`] when one fires.

use std::cell::RefCell;
use std::time::Duration;

/// One-shot timer facility provided by the host environment.
pub trait TimerHost {
    type Handle;

    /// Schedule the host's elapsed callback after `delay`. Returns `None` if
    /// the host could not schedule it.
    fn set_timeout(&self, delay: Duration) -> Option<Self::Handle>;

    /// Cancel a timeout that has not fired yet.
    fn clear_timeout(&self, handle: Self::Handle);
}

pub struct Debouncer<T: TimerHost> {
    host: T,
    delay: Duration,
    pending: RefCell<Option<T::Handle>>,
}

impl<T: TimerHost> Debouncer<T> {
    pub fn new(host: T, delay: Duration) -> Self {
        Self {
            host,
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn host(&self) -> &T {
        &self.host
    }

    /// Cancel the pending timeout, if any, and schedule a fresh one.
    pub fn trigger(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            self.host.clear_timeout(handle);
        }
        let next = self.host.set_timeout(self.delay);
        if next.is_none() {
            log::warn!("Failed to schedule debounce timer");
        }
        *self.pending.borrow_mut() = next;
    }

    /// Drop the pending timeout without running it.
    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            self.host.clear_timeout(handle);
        }
    }

    /// Called by the host when a timeout fires. Returns `true` if a trigger
    /// was pending, `false` for a stale fire.
    pub fn take_elapsed(&self) -> bool {
        self.pending.borrow_mut().take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

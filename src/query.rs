//! Debounced search input.
//!
//! Raw input is echoed immediately; the normalized query used for filtering
//! only changes once input has been idle for the debounce delay. Time is
//! always passed in by the caller so the pipeline can be driven by a fake
//! clock.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::filter::normalize_query;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// A one-shot deadline that can be rescheduled or cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    /// Arm the timer for `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has been reached.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct DebouncedQuery {
    raw: String,
    committed: String,
    delay: Duration,
    timer: Timer,
}

impl Default for DebouncedQuery {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebouncedQuery {
    pub fn new(delay: Duration) -> Self {
        Self {
            raw: String::new(),
            committed: String::new(),
            delay,
            timer: Timer::default(),
        }
    }

    pub fn on_input(&mut self, raw: impl Into<String>, now: Instant) {
        self.raw = raw.into();
        self.timer.schedule(now, self.delay);
    }

    /// Commit the latest raw input if the idle period has elapsed.
    ///
    /// Returns the newly committed query, or `None` if nothing was due.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        if !self.timer.fire(now) {
            return None;
        }
        self.committed = normalize_query(&self.raw);
        debug!("Search query committed: {:?}", self.committed);
        Some(&self.committed)
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// The text as typed, for echoing back to the user.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized query the visible list is filtered by.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }
}

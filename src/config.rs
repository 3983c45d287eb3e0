//! # Stream and hub configuration.
//!
//! Provides [`StreamConfig`] (cursor start, bound, production delay) and
//! [`HubConfig`] (dispatch queue sizing).
//!
//! ## Sentinel values
//! - `bound = 0` → unbounded stream
//! - `delay = 0s` → produce immediately (no timer)

use std::time::Duration;

/// Settings for a [`LazyStream`](crate::LazyStream) and its [`Ticker`](crate::Ticker).
///
/// ## Field semantics
/// - `start`: initial cursor; the first pull yields `start + 1`
/// - `bound`: last cursor value produced (`0` = unbounded)
/// - `delay`: time the ticker waits before each value (`0s` = immediate)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Initial cursor value.
    pub start: u64,

    /// Highest cursor value that is still produced.
    ///
    /// The pull that moves the cursor past `bound` resolves with end-of-stream.
    pub bound: u64,

    /// Delay before each value is ready.
    pub delay: Duration,
}

impl StreamConfig {
    /// Returns the bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → values up to and including `n`
    #[inline]
    pub fn bound_limit(&self) -> Option<u64> {
        if self.bound == 0 {
            None
        } else {
            Some(self.bound)
        }
    }

    /// Returns the production delay as an `Option`.
    #[inline]
    pub fn production_delay(&self) -> Option<Duration> {
        if self.delay == Duration::ZERO {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Unbounded, immediate configuration starting at zero.
    pub fn unbounded() -> Self {
        Self {
            start: 0,
            bound: 0,
            delay: Duration::ZERO,
        }
    }

    /// Sets the bound.
    #[must_use]
    pub fn with_bound(mut self, bound: u64) -> Self {
        self.bound = bound;
        self
    }

    /// Sets the production delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the initial cursor.
    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }
}

impl Default for StreamConfig {
    /// Default configuration:
    ///
    /// - `start = 0`
    /// - `bound = 10` (values `1..=10`)
    /// - `delay = 500ms`
    fn default() -> Self {
        Self {
            start: 0,
            bound: 10,
            delay: Duration::from_millis(500),
        }
    }
}

/// Settings for a [`DispatchQueue`](crate::DispatchQueue).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    /// Capacity of the bounded dispatch queue (min 1; clamped).
    pub queue_capacity: usize,
}

impl HubConfig {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

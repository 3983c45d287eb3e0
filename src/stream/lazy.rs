//! # Pull-driven lazy stream.
//!
//! A [`LazyStream`] produces nothing until asked. Each
//! [`request_next`](LazyStream::request_next) advances the cursor, suspends on
//! the [`Produce`] source, and resolves with the value. The next pull cannot be
//! issued before the consumer has taken the previous result, so the producer can
//! never run ahead of its consumer.
//!
//! ## Pull flow
//! ```text
//! request_next()
//!   ├─ Terminated (or token cancelled) ─► Ok(None)
//!   ├─ Producing                       ─► Err(ConcurrentPull)   (state untouched)
//!   └─ Idle: cursor += 1
//!        ├─ cursor > bound ─► Terminated, Ok(None)
//!        └─ Producing: select {
//!               cancelled        ─► Terminated, Err(Abandoned)
//!               produce(cursor)  ─► Ok(Some(v)) → Idle
//!                                   Ok(None)    → Terminated   (source ended)
//!                                   Err(e)      → Terminated
//!           }
//! ```
//!
//! ## Rules
//! - Termination is monotone: once `Terminated`, every pull resolves `Ok(None)`.
//! - At most one outstanding pull.
//! - A value whose production is overtaken by `cancel()` is discarded.
//! - Dropping a pull future mid-production returns the stream to `Idle`
//!   and rewinds the cursor.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::stream::produce::{Produce, Ticker};
use crate::stream::state::{Phase, Pull, StreamState};

/// Lazy, bounded or unbounded sequence with explicit end-of-stream.
///
/// ## Example
/// ```rust
/// use eventpipe::{LazyStream, StreamConfig, Ticker};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cfg = StreamConfig::unbounded().with_bound(2);
/// let stream = LazyStream::new(Ticker::new(None), &cfg);
///
/// assert_eq!(stream.request_next().await, Ok(Some(1)));
/// assert_eq!(stream.request_next().await, Ok(Some(2)));
/// assert_eq!(stream.request_next().await, Ok(None));
/// # }
/// ```
pub struct LazyStream<S> {
    producer: S,
    bound: Option<u64>,
    state: Mutex<StreamState>,
    cancel: CancellationToken,
}

impl LazyStream<Ticker> {
    /// Counting stream: yields `start + 1 ..= bound`, each after `cfg.delay`.
    pub fn ticker(cfg: &StreamConfig) -> Self {
        Self::new(Ticker::new(cfg.production_delay()), cfg)
    }
}

impl<S: Produce> LazyStream<S> {
    /// Creates an idle stream with its own cancellation token.
    pub fn new(producer: S, cfg: &StreamConfig) -> Self {
        Self::with_token(producer, cfg, CancellationToken::new())
    }

    /// Creates an idle stream cancelled by `token`.
    ///
    /// Pass a child of a [`Shutdown`](crate::Shutdown) token to have the
    /// stream terminated on process shutdown.
    pub fn with_token(producer: S, cfg: &StreamConfig, token: CancellationToken) -> Self {
        Self {
            producer,
            bound: cfg.bound_limit(),
            state: Mutex::new(StreamState::new(cfg.start)),
            cancel: token,
        }
    }

    /// Requests the next item.
    ///
    /// Returns `Ok(None)` at end-of-stream and on every call after it.
    ///
    /// # Errors
    /// - [`StreamError::ConcurrentPull`] if a pull is already outstanding
    /// - [`StreamError::Abandoned`] if the stream was cancelled during production
    /// - any error returned by the producer (the stream is then terminated)
    pub async fn request_next(&self) -> Result<Option<S::Item>, StreamError> {
        let cursor = {
            let mut st = self.lock();
            if self.cancel.is_cancelled() {
                st.terminate();
            }
            match st.begin_pull(self.bound) {
                Pull::Produce(cursor) => cursor,
                Pull::End => return Ok(None),
                Pull::Busy => return Err(StreamError::ConcurrentPull),
            }
        };

        let mut guard = PullGuard {
            state: &self.state,
            armed: true,
        };
        let produced = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            res = self.producer.produce(cursor) => Some(res),
        };
        guard.armed = false;

        let mut st = self.lock();
        let overtaken = self.cancel.is_cancelled() || st.is_terminated();
        let Some(res) = produced.filter(|_| !overtaken) else {
            st.terminate();
            debug!(cursor, "production abandoned");
            return Err(StreamError::Abandoned);
        };
        match res {
            Ok(Some(item)) => {
                st.finish_pull();
                Ok(Some(item))
            }
            Ok(None) => {
                st.terminate();
                debug!(cursor, "source ended");
                Ok(None)
            }
            Err(err) => {
                st.terminate();
                debug!(cursor, label = err.as_label(), "source failed");
                Err(err)
            }
        }
    }

    /// Terminates the stream; an in-flight pull resolves with
    /// [`StreamError::Abandoned`]. Idempotent.
    pub fn cancel(&self) {
        self.lock().terminate();
        self.cancel.cancel();
    }

    /// Snapshot of cursor and phase.
    ///
    /// A cancelled token reports `Terminated` even before the next pull.
    pub fn state(&self) -> StreamState {
        let mut st = *self.lock();
        if self.cancel.is_cancelled() {
            st.phase = Phase::Terminated;
        }
        st
    }

    /// True once end-of-stream was reached or the stream was cancelled.
    pub fn is_terminated(&self) -> bool {
        self.cancel.is_cancelled() || self.lock().is_terminated()
    }

    /// Token that cancels this stream.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The producer backing this stream.
    pub fn producer(&self) -> &S {
        &self.producer
    }

    /// Adapts the stream into a [`futures::Stream`] that ends at end-of-stream.
    ///
    /// An error is yielded once, then the adapter ends.
    pub fn into_stream(self) -> impl Stream<Item = Result<S::Item, StreamError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let Some(stream) = state else {
                return None;
            };
            let next = stream.request_next().await;
            match next {
                Ok(Some(item)) => Some((Ok(item), Some(stream))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<StreamState>) -> MutexGuard<'_, StreamState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rewinds an outstanding pull whose future was dropped before completion.
struct PullGuard<'a> {
    state: &'a Mutex<StreamState>,
    armed: bool,
}

impl Drop for PullGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock_state(self.state).abort_pull();
        }
    }
}

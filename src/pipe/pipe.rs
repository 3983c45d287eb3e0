//! # Drive a lazy stream into a sink.
//!
//! [`Pipe::run`] loops pull → write → (wait for write) → pull until the
//! stream ends, fails, or is cancelled. It never pulls ahead of the sink.
//!
//! ## Event flow
//! ```text
//! Finished:
//!   request_next() → Ok(None)             → sink.close() → Ok(Completion::Finished)
//!
//! Cancelled (token / stream.cancel()):
//!   request_next() → Ok(None) | Abandoned → sink.close() → Ok(Completion::Cancelled)
//!
//! Stream failure:
//!   request_next() → Err(e)               → stream.cancel(), sink.close() → Err(PipeError::Stream)
//!
//! Sink failure:
//!   sink.write(v)  → Err(e)               → stream.cancel(), sink.close() → Err(PipeError::Sink)
//! ```
//!
//! ## Rules
//! - The sink is closed **exactly once**, on every path.
//! - Items are written in production order; delivered items are never undone.
//! - A close error after a clean finish fails the run; after a failure it is only logged.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{PipeError, StreamError};
use crate::pipe::Sink;
use crate::stream::{LazyStream, Produce};

/// How a successful pipe run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The stream reached end-of-stream.
    Finished,
    /// The stream was cancelled before end-of-stream.
    Cancelled,
}

/// Result of a pipe run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Items accepted by the sink.
    pub delivered: u64,
    /// Why the run stopped.
    pub outcome: Outcome,
}

/// Coordinator binding one stream to one sink.
pub struct Pipe<S, K> {
    stream: Arc<LazyStream<S>>,
    sink: K,
}

impl<S, K> Pipe<S, K>
where
    S: Produce,
    K: Sink<S::Item>,
{
    /// Creates a pipe that owns its stream.
    pub fn new(stream: LazyStream<S>, sink: K) -> Self {
        Self::from_shared(Arc::new(stream), sink)
    }

    /// Creates a pipe over a shared stream (e.g. to inspect its state while running).
    pub fn from_shared(stream: Arc<LazyStream<S>>, sink: K) -> Self {
        Self { stream, sink }
    }

    /// Token that cancels the run (cancels the stream).
    pub fn cancel_token(&self) -> CancellationToken {
        self.stream.cancel_token()
    }

    /// The stream being drained.
    pub fn stream(&self) -> &Arc<LazyStream<S>> {
        &self.stream
    }

    /// Runs to completion.
    ///
    /// # Errors
    /// [`PipeError::Stream`] or [`PipeError::Sink`] with the cause and the
    /// number of items delivered before it.
    pub async fn run(mut self) -> Result<Completion, PipeError> {
        let sink_name = self.sink.name();
        let mut delivered = 0u64;

        let result = loop {
            let next = self.stream.request_next().await;
            match next {
                Ok(Some(item)) => {
                    if let Err(source) = self.sink.write(item).await {
                        self.stream.cancel();
                        break Err(PipeError::Sink { source, delivered });
                    }
                    delivered += 1;
                }
                Ok(None) => {
                    let outcome = if self.stream.cancel_token().is_cancelled() {
                        Outcome::Cancelled
                    } else {
                        Outcome::Finished
                    };
                    break Ok(Completion { delivered, outcome });
                }
                Err(StreamError::Abandoned) => {
                    break Ok(Completion {
                        delivered,
                        outcome: Outcome::Cancelled,
                    });
                }
                Err(source) => {
                    self.stream.cancel();
                    break Err(PipeError::Stream { source, delivered });
                }
            }
        };

        let closed = self.sink.close().await;
        match (result, closed) {
            (Ok(done), Ok(())) => {
                debug!(sink = sink_name, delivered, outcome = ?done.outcome, "pipe completed");
                Ok(done)
            }
            (Ok(_), Err(source)) => {
                warn!(sink = sink_name, delivered, label = source.as_label(), "sink close failed");
                Err(PipeError::Sink { source, delivered })
            }
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(
                        sink = sink_name,
                        label = close_err.as_label(),
                        "sink close failed after pipe error"
                    );
                }
                warn!(sink = sink_name, delivered, label = err.as_label(), "{}", err.as_message());
                Err(err)
            }
        }
    }
}

/// Runs `stream` into `sink`; shorthand for `Pipe::new(stream, sink).run()`.
pub async fn run<S, K>(stream: LazyStream<S>, sink: K) -> Result<Completion, PipeError>
where
    S: Produce,
    K: Sink<S::Item>,
{
    Pipe::new(stream, sink).run().await
}

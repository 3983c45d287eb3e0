//! Error types used by the hub, the lazy stream and the pipe.
//!
//! - [`StreamError`]: failures of a single pull on a [`LazyStream`](crate::LazyStream).
//! - [`SubscriberError`]: a notification callback failed; caught and reported by the hub.
//! - [`SinkError`]: a sink rejected a write or failed to close.
//! - [`PipeError`]: a pipe run aborted; carries the stream or sink cause.
//! - [`HubError`]: the async dispatch queue could not accept or acknowledge a publish.
//! - [`ShutdownError`]: process-level shutdown wiring failed.
//!
//! Every enum provides `as_label` (stable snake_case for logs) and `as_message`.

use thiserror::Error;

/// # Errors produced by a pull on a lazy stream.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A pull was requested while a previous one is still outstanding.
    ///
    /// Fatal to the call, not to the stream: the outstanding pull is unaffected.
    #[error("pull requested while another pull is outstanding")]
    ConcurrentPull,

    /// The stream was cancelled while this pull was producing; the result is discarded.
    #[error("production abandoned: stream cancelled")]
    Abandoned,

    /// The producer failed; the stream is terminated.
    #[error("source failed: {error}")]
    Source {
        /// The underlying error message.
        error: String,
    },
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventpipe::StreamError;
    ///
    /// assert_eq!(StreamError::ConcurrentPull.as_label(), "stream_concurrent_pull");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::ConcurrentPull => "stream_concurrent_pull",
            StreamError::Abandoned => "stream_production_abandoned",
            StreamError::Source { .. } => "stream_source_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::ConcurrentPull => "concurrent pull".to_string(),
            StreamError::Abandoned => "production abandoned".to_string(),
            StreamError::Source { error } => format!("source: {error}"),
        }
    }

    /// Shorthand for a [`StreamError::Source`] from any displayable error.
    pub fn source(error: impl std::fmt::Display) -> Self {
        StreamError::Source {
            error: error.to_string(),
        }
    }
}

/// # Errors raised by notification callbacks.
///
/// Never propagated out of [`NotificationHub::publish`](crate::NotificationHub::publish):
/// they are logged and counted in the [`DispatchReport`](crate::DispatchReport).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// The callback returned an error.
    #[error("subscriber {subscriber} failed: {error}")]
    Failed {
        /// Subscriber name (or `#<id>` when unnamed).
        subscriber: String,
        /// The underlying error message.
        error: String,
    },

    /// The callback panicked.
    #[error("subscriber {subscriber} panicked: {info}")]
    Panicked {
        /// Subscriber name (or `#<id>` when unnamed).
        subscriber: String,
        /// Panic payload, when it was a string.
        info: String,
    },
}

impl SubscriberError {
    /// Creates a failure for use inside a fallible callback.
    ///
    /// The hub fills in the subscriber name when it reports the failure.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        SubscriberError::Failed {
            subscriber: String::new(),
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscriberError::Failed { .. } => "subscriber_failed",
            SubscriberError::Panicked { .. } => "subscriber_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscriberError::Failed { error, .. } => format!("error: {error}"),
            SubscriberError::Panicked { info, .. } => format!("panic: {info}"),
        }
    }

    pub(crate) fn with_subscriber(self, name: &str) -> Self {
        match self {
            SubscriberError::Failed { error, .. } => SubscriberError::Failed {
                subscriber: name.to_string(),
                error,
            },
            SubscriberError::Panicked { info, .. } => SubscriberError::Panicked {
                subscriber: name.to_string(),
                info,
            },
        }
    }
}

/// # Errors produced by sinks.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// Underlying I/O failed.
    #[error("sink i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Write attempted after the sink was closed.
    #[error("sink closed")]
    Closed,

    /// The sink refused the item.
    #[error("write rejected: {error}")]
    Rejected {
        /// The underlying error message.
        error: String,
    },
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Io(_) => "sink_io",
            SinkError::Closed => "sink_closed",
            SinkError::Rejected { .. } => "sink_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SinkError::Io(e) => format!("io: {e}"),
            SinkError::Closed => "closed".to_string(),
            SinkError::Rejected { error } => format!("rejected: {error}"),
        }
    }
}

/// # Errors that abort a pipe run.
///
/// Both variants carry the number of items delivered before the failure;
/// delivered items are never undone.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PipeError {
    /// Pulling from the stream failed.
    #[error("stream failed after {delivered} item(s): {source}")]
    Stream {
        /// The stream error.
        source: StreamError,
        /// Items written before the failure.
        delivered: u64,
    },

    /// Writing to the sink failed.
    #[error("sink failed after {delivered} item(s): {source}")]
    Sink {
        /// The sink error.
        source: SinkError,
        /// Items written before the failure.
        delivered: u64,
    },
}

impl PipeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PipeError::Stream { .. } => "pipe_stream_failed",
            PipeError::Sink { .. } => "pipe_sink_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PipeError::Stream { source, delivered } => {
                format!("stream: {} (delivered={delivered})", source.as_message())
            }
            PipeError::Sink { source, delivered } => {
                format!("sink: {} (delivered={delivered})", source.as_message())
            }
        }
    }

    /// Number of items the sink accepted before the run aborted.
    pub fn delivered(&self) -> u64 {
        match self {
            PipeError::Stream { delivered, .. } | PipeError::Sink { delivered, .. } => *delivered,
        }
    }
}

/// # Errors produced by the async dispatch queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The bounded queue is full; the publish was dropped.
    #[error("dispatch queue full")]
    QueueFull,

    /// The queue was shut down.
    #[error("dispatch queue closed")]
    QueueClosed,

    /// The worker exited before acknowledging the publish.
    #[error("dispatch worker gone before acknowledgement")]
    WorkerGone,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::QueueFull => "hub_queue_full",
            HubError::QueueClosed => "hub_queue_closed",
            HubError::WorkerGone => "hub_worker_gone",
        }
    }
}

/// # Errors produced by process-level shutdown wiring.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownError {
    /// [`register_shutdown_handler`](crate::register_shutdown_handler) was already called.
    #[error("shutdown handler already registered")]
    AlreadyRegistered,

    /// No tokio runtime is available to host the signal listener.
    #[error("no tokio runtime to host the signal listener")]
    NoRuntime,
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::AlreadyRegistered => "shutdown_already_registered",
            ShutdownError::NoRuntime => "shutdown_no_runtime",
        }
    }
}

//! # HubSink: relay piped items into a notification hub
//!
//! Each written item is published under one [`EventKind`]; subscribers run
//! synchronously inside `write`, so the next pull waits for every listener.
//!
//! By default subscriber failures follow the hub policy (logged, dispatch
//! continues, write succeeds). [`HubSink::strict`] turns any subscriber
//! failure into [`SinkError::Rejected`], which aborts the pipe.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::hub::{EventKind, NotificationHub, Publish};
use crate::pipe::Sink;

/// Sink that publishes every item to a [`NotificationHub`].
pub struct HubSink<P> {
    hub: Arc<NotificationHub<P>>,
    kind: EventKind,
    strict: bool,
    closed: bool,
}

impl<P: 'static> HubSink<P> {
    /// Publishes items under `kind`.
    pub fn new(hub: Arc<NotificationHub<P>>, kind: impl Into<EventKind>) -> Self {
        Self {
            hub,
            kind: kind.into(),
            strict: false,
            closed: false,
        }
    }

    /// Rejects the write when any subscriber fails.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Kind items are published under.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

#[async_trait]
impl<P: Send + 'static> Sink<P> for HubSink<P> {
    async fn write(&mut self, item: P) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        match self.hub.publish(&self.kind, item) {
            Publish::Delivered(report) if self.strict && !report.is_clean() => {
                let error = report
                    .failed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(SinkError::Rejected { error })
            }
            _ => Ok(()),
        }
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HubSink"
    }
}

//! Lazy streams: pull-driven production with backpressure.
//!
//! ## Contents
//! - [`LazyStream`] the pull API and state machine
//! - [`StreamState`], [`Phase`] cursor and lifecycle snapshot
//! - [`Produce`] readiness source trait, with [`Ticker`], [`Inbound`], [`ProduceFn`]
//!
//! A consumer drives production; the producer is idle until asked. See
//! [`Pipe`](crate::Pipe) for driving a stream into a sink.

mod lazy;
mod produce;
mod state;

pub use lazy::LazyStream;
pub use produce::{Inbound, Produce, ProduceFn, Ticker};
pub use state::{Phase, StreamState};

//! # Stream cursor and phase.
//!
//! ```text
//!            begin_pull            finish_pull
//!   Idle ───────────────► Producing ───────────► Idle
//!    │                        │
//!    │ cursor > bound         │ cancel / source ended / source error
//!    ▼                        ▼
//!  Terminated ◄───────────────┘          (no transition leaves Terminated)
//! ```
//!
//! A dropped pull (`abort_pull`) returns to `Idle` and rewinds the cursor,
//! so the value it would have produced is produced by the next pull.

/// Lifecycle phase of a lazy stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a pull.
    Idle,
    /// A pull is outstanding.
    Producing,
    /// End-of-stream reached or cancelled.
    Terminated,
}

/// Cursor plus phase; the producer-side state of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamState {
    /// Last cursor value handed to the producer.
    pub cursor: u64,
    /// Current phase.
    pub phase: Phase,
}

/// What a pull should do after the state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pull {
    /// Produce the value for this cursor.
    Produce(u64),
    /// Resolve with end-of-stream.
    End,
    /// Another pull is outstanding.
    Busy,
}

impl StreamState {
    pub(crate) fn new(start: u64) -> Self {
        Self {
            cursor: start,
            phase: Phase::Idle,
        }
    }

    pub(crate) fn begin_pull(&mut self, bound: Option<u64>) -> Pull {
        match self.phase {
            Phase::Terminated => Pull::End,
            Phase::Producing => Pull::Busy,
            Phase::Idle => {
                let next = match self.cursor.checked_add(1) {
                    Some(next) if bound.is_none_or(|b| next <= b) => next,
                    _ => {
                        self.phase = Phase::Terminated;
                        return Pull::End;
                    }
                };
                self.cursor = next;
                self.phase = Phase::Producing;
                Pull::Produce(next)
            }
        }
    }

    pub(crate) fn finish_pull(&mut self) {
        if self.phase == Phase::Producing {
            self.phase = Phase::Idle;
        }
    }

    pub(crate) fn abort_pull(&mut self) {
        if self.phase == Phase::Producing {
            self.phase = Phase::Idle;
            self.cursor -= 1;
        }
    }

    pub(crate) fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }

    /// True once end-of-stream was reached or the stream was cancelled.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_terminates_after_last_value() {
        let mut st = StreamState::new(0);
        for expected in 1..=3 {
            assert_eq!(st.begin_pull(Some(3)), Pull::Produce(expected));
            st.finish_pull();
        }
        assert_eq!(st.begin_pull(Some(3)), Pull::End);
        assert!(st.is_terminated());
        assert_eq!(st.begin_pull(Some(3)), Pull::End);
    }

    #[test]
    fn test_cursor_ceiling_ends_unbounded_stream() {
        let mut st = StreamState::new(u64::MAX - 1);
        assert_eq!(st.begin_pull(None), Pull::Produce(u64::MAX));
        st.finish_pull();
        assert_eq!(st.begin_pull(None), Pull::End);
        assert!(st.is_terminated());
    }

    #[test]
    fn test_busy_while_producing_keeps_state() {
        let mut st = StreamState::new(0);
        assert_eq!(st.begin_pull(None), Pull::Produce(1));
        let snapshot = st;
        assert_eq!(st.begin_pull(None), Pull::Busy);
        assert_eq!(st, snapshot);
    }

    #[test]
    fn test_abort_rewinds_cursor() {
        let mut st = StreamState::new(4);
        assert_eq!(st.begin_pull(None), Pull::Produce(5));
        st.abort_pull();
        assert_eq!(st, StreamState::new(4));
        assert_eq!(st.begin_pull(None), Pull::Produce(5));
    }

    #[test]
    fn test_terminated_is_final() {
        let mut st = StreamState::new(0);
        st.terminate();
        st.finish_pull();
        st.abort_pull();
        assert_eq!(st.phase, Phase::Terminated);
        assert_eq!(st.begin_pull(None), Pull::End);
    }
}

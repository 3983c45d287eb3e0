//! # LineWriter: newline-terminated text sink
//!
//! Writes each item's `Display` form followed by `\n` to any
//! [`AsyncWrite`], flushing after every line so a reader sees items as they
//! are produced.
//!
//! ## Example output (counting stream, bound 3)
//! ```text
//! 1
//! 2
//! 3
//! ```

use std::fmt::Display;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SinkError;
use crate::pipe::Sink;

/// Line-oriented byte writer.
pub struct LineWriter<W> {
    inner: W,
    closed: bool,
}

impl<W> LineWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// True after `close`.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LineWriter<tokio::io::Stdout> {
    /// Writes lines to standard output.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl LineWriter<tokio::fs::File> {
    /// Creates (or truncates) `path` and writes lines to it.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(file))
    }
}

#[async_trait]
impl<W, T> Sink<T> for LineWriter<W>
where
    W: AsyncWrite + Unpin + Send,
    T: Display + Send + 'static,
{
    async fn write(&mut self, item: T) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        let line = format!("{item}\n");
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.shutdown().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LineWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_one_line_per_item() {
        let mut w = LineWriter::new(Vec::<u8>::new());
        Sink::<u64>::write(&mut w, 1).await.unwrap();
        Sink::<&str>::write(&mut w, "two").await.unwrap();
        Sink::<u64>::close(&mut w).await.unwrap();
        assert!(w.is_closed());
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "1\ntwo\n");
    }

    #[tokio::test]
    async fn test_write_after_close_is_rejected() {
        let mut w = LineWriter::new(Vec::<u8>::new());
        Sink::<u64>::close(&mut w).await.unwrap();
        let err = Sink::<u64>::write(&mut w, 1).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }

    #[tokio::test]
    async fn test_create_writes_file() {
        let path = std::env::temp_dir().join(format!("eventpipe-line-{}.txt", std::process::id()));
        let mut w = LineWriter::create(&path).await.unwrap();
        Sink::<u64>::write(&mut w, 42).await.unwrap();
        Sink::<u64>::close(&mut w).await.unwrap();

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(body, "42\n");
        let _ = tokio::fs::remove_file(&path).await;
    }
}

//! `Session` over a line-oriented reader and writer, normally stdin/stdout

use std::time::Duration;

use async_trait::async_trait;
use studyclock_core::errors::{ExError, ExErrorKind, Result};
use studyclock_core::Session;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};
use tokio::sync::Mutex;

/// Reads operator lines from `R`; the console loop and the prompts of a
/// running command share the same reader.
pub struct LineSession<R, W> {
    lines: Mutex<Lines<R>>,
    out: Mutex<W>,
}

pub type StdioSession = LineSession<BufReader<Stdin>, Stdout>;

fn transport(err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Transport)
        .with_op("stdio")
        .with_message(err.to_string())
}

impl StdioSession {
    pub fn stdio() -> Self {
        LineSession::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
            out: Mutex::new(writer),
        }
    }

    /// Next line typed by the operator, `None` at end of input
    pub async fn next_line(&self) -> Result<Option<String>> {
        self.lines.lock().await.next_line().await.map_err(transport)
    }

    async fn write_line(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await.map_err(transport)?;
        out.write_all(b"\n").await.map_err(transport)?;
        out.flush().await.map_err(transport)
    }
}

#[async_trait]
impl<R, W> Session for LineSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn prompt(&self, text: &str, timeout: Duration) -> Result<String> {
        self.write_line(text).await?;
        match tokio::time::timeout(timeout, self.next_line()).await {
            Ok(Ok(Some(line))) => Ok(line),
            Ok(Ok(None)) => Err(transport("stdin closed while waiting for a reply")),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ExError::new(ExErrorKind::TimedOut)
                .with_op("prompt")
                .with_message(format!("no reply within {}s", timeout.as_secs()))),
        }
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.write_line(text).await
    }
}

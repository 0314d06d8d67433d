use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use nunit_step_core::error::RunnerError;

/// Keeps the last `capacity` bytes written to it.
#[derive(Debug)]
pub struct TailBuffer {
    capacity: usize,
    bytes: VecDeque<u8>,
    dropped: u64,
}

impl TailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bytes: VecDeque::with_capacity(capacity.min(64 * 1024)),
            dropped: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend(chunk);
        let overflow = self.bytes.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.bytes.drain(..overflow);
            self.dropped += overflow as u64;
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_string(self) -> String {
        let bytes: Vec<u8> = self.bytes.into();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Copies a child stream to `echo` (when given) while keeping its tail.
pub async fn pump<R, W>(
    mut source: R,
    mut echo: Option<W>,
    capacity: usize,
    stream: &'static str,
) -> Result<TailBuffer, RunnerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut tail = TailBuffer::new(capacity);
    let mut buf = [0u8; 8192];
    loop {
        let n = source
            .read(&mut buf)
            .await
            .map_err(|source| RunnerError::StreamIo { stream, source })?;
        if n == 0 {
            break;
        }
        tail.push(&buf[..n]);
        let echo_failed = match echo.as_mut() {
            Some(w) => match w.write_all(&buf[..n]).await {
                Ok(()) => w.flush().await.err(),
                Err(e) => Some(e),
            },
            None => None,
        };
        // keep draining the pipe even when the console goes away
        if let Some(e) = echo_failed {
            tracing::debug!(stream, error = %e, "console echo failed, continuing capture");
            echo = None;
        }
    }
    if tail.dropped() > 0 {
        tracing::debug!(stream, dropped = tail.dropped(), "capture truncated to tail");
    }
    Ok(tail)
}

use crate::{
    MonitorError, MonitorSink, OutputBuffer, OutputSource, ProcessHandle, ProcessId,
    ProcessStatus, ReadConfig, Readiness, TerminationResult,
};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Follows one child process through the readable end of its output pipe.
///
/// The monitor owns the process handle, the output stream and the growing
/// output buffer. All I/O is driven inside [`wait_for_output`] and
/// [`terminate`]; there is no background task. `&mut self` on the wait and
/// `self` on terminate enforce that only one call is in flight per monitor.
///
/// [`wait_for_output`]: OutputMonitor::wait_for_output
/// [`terminate`]: OutputMonitor::terminate
pub struct OutputMonitor {
    handle: Box<dyn ProcessHandle>,
    source: Box<dyn OutputSource>,
    buffer: OutputBuffer,
    sink: Option<MonitorSink>,
    read: ReadConfig,
    saw_eof: bool,
}

impl OutputMonitor {
    pub fn new(
        handle: Box<dyn ProcessHandle>,
        source: Box<dyn OutputSource>,
        sink: Option<MonitorSink>,
        read: ReadConfig,
    ) -> Self {
        Self {
            handle,
            source,
            buffer: OutputBuffer::new(),
            sink,
            read,
            saw_eof: false,
        }
    }

    pub fn pid(&self) -> Option<ProcessId> {
        self.handle.get_pid()
    }

    pub fn command(&self) -> &str {
        self.handle.get_command()
    }

    /// Everything the child has written so far, as (lossy) text
    pub fn output(&self) -> Cow<'_, str> {
        self.buffer.to_text()
    }

    /// Everything the child has written so far, as raw bytes
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub async fn is_running(&self) -> bool {
        self.handle.is_running().await
    }

    /// Exit status if the child has already exited, without blocking
    pub async fn try_wait(&mut self) -> Result<Option<ProcessStatus>, MonitorError> {
        self.handle.try_wait().await.map_err(MonitorError::from)
    }

    /// Block until `pattern` has occurred at least `count` times
    /// (non-overlapping) in the accumulated output, or fail.
    ///
    /// The buffer is checked before any I/O, so already-received occurrences
    /// satisfy the call with zero blocking even when `timeout` is zero; a
    /// zero timeout otherwise only picks up immediately-available data. An
    /// empty pattern or a zero count is trivially satisfied.
    ///
    /// Exactly one of four outcomes is produced per call: success,
    /// [`MonitorError::MatchTimeout`], [`MonitorError::MatchEof`] (the
    /// stream closed; inspect the exit status via [`try_wait`]), or
    /// [`MonitorError::Select`]. Cancelling the returned future mid-wait
    /// leaves the monitor in an unspecified state; discard it afterwards.
    ///
    /// [`try_wait`]: OutputMonitor::try_wait
    pub async fn wait_for_output(
        &mut self,
        pattern: &str,
        timeout: Duration,
        count: usize,
    ) -> Result<(), MonitorError> {
        if self.buffer.contains_at_least(pattern, count) {
            return Ok(());
        }

        // After end-of-stream the buffer can no longer grow; don't read again
        if self.saw_eof {
            return Err(MonitorError::MatchEof {
                pattern: pattern.to_string(),
                count,
                found: self.buffer.occurrences(pattern),
            });
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let readiness = self
                .source
                .poll_readable(remaining)
                .await
                .map_err(|e| MonitorError::Select {
                    reason: e.to_string(),
                })?;

            match readiness {
                Readiness::Idle => {
                    return if Instant::now() < deadline {
                        Err(MonitorError::Select {
                            reason: "stream reported nothing readable before the deadline"
                                .to_string(),
                        })
                    } else {
                        Err(MonitorError::MatchTimeout {
                            pattern: pattern.to_string(),
                            count,
                            found: self.buffer.occurrences(pattern),
                        })
                    };
                }
                Readiness::Readable => {
                    let mut chunk = vec![0u8; self.read.chunk_size];
                    let read = self.source.read_chunk(&mut chunk).await.map_err(|e| {
                        MonitorError::Select {
                            reason: e.to_string(),
                        }
                    })?;

                    if read == 0 {
                        self.saw_eof = true;
                        return Err(MonitorError::MatchEof {
                            pattern: pattern.to_string(),
                            count,
                            found: self.buffer.occurrences(pattern),
                        });
                    }

                    self.buffer.extend(&chunk[..read]);
                    if let Some(sink) = &self.sink {
                        sink.write_chunk(&chunk[..read]).await;
                    }

                    if self.buffer.contains_at_least(pattern, count) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Stop the child, drain its remaining output into the sink, and reap
    /// the OS process.
    ///
    /// Safe to call when the child has already exited. A child that refuses
    /// to stop promptly is not an error; the drain simply ends once the
    /// stream reports end-of-stream or nothing readable, and the handle is
    /// waited on regardless. Consuming `self` makes any further use of the
    /// monitor a compile error.
    pub async fn terminate(mut self) -> Result<ProcessStatus, MonitorError> {
        info!(
            command = %self.handle.get_command(),
            pid = ?self.handle.get_pid(),
            "terminating monitored process"
        );

        match self.handle.signal_terminate().await {
            TerminationResult::Success | TerminationResult::ProcessNotFound => {}
            other => {
                warn!(result = ?other, "graceful termination signal failed");
            }
        }

        let window = self.read.drain_poll_window();
        while !self.saw_eof {
            match self.source.poll_readable(window).await {
                Ok(Readiness::Idle) => break,
                Ok(Readiness::Readable) => {
                    let mut chunk = vec![0u8; self.read.chunk_size];
                    match self.source.read_chunk(&mut chunk).await {
                        Ok(0) => break,
                        Ok(read) => {
                            self.buffer.extend(&chunk[..read]);
                            if let Some(sink) = &self.sink {
                                sink.write_chunk(&chunk[..read]).await;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "read failed while draining; stopping drain");
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "readiness wait failed while draining; stopping drain");
                    break;
                }
            }
        }

        if let Some(sink) = &self.sink {
            sink.flush().await;
        }

        let status = self.handle.wait().await?;
        info!(status = ?status, "child process reaped");

        Ok(status)
    }
}

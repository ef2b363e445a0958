//! procwatch - launch a child process, follow everything it writes to its
//! output stream, wait for patterns with a deadline, and terminate without
//! losing output or leaking the OS process entry.
//!
//! The typical flow is: spawn a server-like child, block until its readiness
//! line has appeared, interact with it out of band, then terminate:
//!
//! ```no_run
//! use procwatch::{MonitorConfig, ProcessMonitor};
//! use std::time::Duration;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = MonitorConfig::builder()
//!     .command("my-server")
//!     .args(["--listen", "127.0.0.1:9000"])
//!     .build()?;
//!
//! let mut monitor = ProcessMonitor::spawn(config).await?;
//! monitor
//!     .wait_for_output("listening on", Duration::from_secs(5), 1)
//!     .await?;
//!
//! // ... talk to the server ...
//!
//! monitor.terminate().await?;
//! # Ok(())
//! # }
//! ```

mod factory;

pub use factory::PlatformSpawner;
pub use procwatch_core::*;

use std::borrow::Cow;
use std::time::Duration;

/// Monitors a single spawned child process.
///
/// One monitor owns exactly one child: the handle, the readable end of the
/// output pipe, and the accumulated output buffer. Calls must be serialized
/// per instance; `wait_for_output` takes `&mut self` and `terminate`
/// consumes the monitor, so the compiler enforces this.
pub struct ProcessMonitor {
    inner: OutputMonitor,
}

impl std::fmt::Debug for ProcessMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMonitor").finish_non_exhaustive()
    }
}

impl ProcessMonitor {
    /// Spawn `config.command` with its output redirected into the monitor.
    ///
    /// Fails with [`MonitorError::Spawn`] when the OS cannot create the
    /// process; the failure is detected here, never deferred to the first
    /// read.
    pub async fn spawn(config: MonitorConfig) -> Result<Self, MonitorError> {
        Self::spawn_inner(config, None).await
    }

    /// Same as [`spawn`](ProcessMonitor::spawn), additionally forwarding a
    /// copy of every received chunk to `sink`.
    pub async fn spawn_with_sink(
        config: MonitorConfig,
        sink: MonitorSink,
    ) -> Result<Self, MonitorError> {
        Self::spawn_inner(config, Some(sink)).await
    }

    async fn spawn_inner(
        config: MonitorConfig,
        sink: Option<MonitorSink>,
    ) -> Result<Self, MonitorError> {
        config.read.validate()?;

        let spawner = PlatformSpawner::new();
        let spawned =
            spawner
                .spawn_monitored(&config)
                .await
                .map_err(|source| MonitorError::Spawn {
                    command: config.command.clone(),
                    source,
                })?;

        Ok(Self {
            inner: OutputMonitor::new(spawned.handle, spawned.output, sink, config.read),
        })
    }

    /// Block until `pattern` has occurred at least `count` times
    /// (non-overlapping) in the accumulated output since spawn.
    ///
    /// A zero `timeout` checks the buffer and any immediately-available
    /// data, then fails without blocking further. See
    /// [`OutputMonitor::wait_for_output`] for the full contract.
    pub async fn wait_for_output(
        &mut self,
        pattern: &str,
        timeout: Duration,
        count: usize,
    ) -> Result<(), MonitorError> {
        self.inner.wait_for_output(pattern, timeout, count).await
    }

    /// Stop the child, drain remaining output into the sink, reap the
    /// process, and close the stream. See [`OutputMonitor::terminate`].
    pub async fn terminate(self) -> Result<ProcessStatus, MonitorError> {
        self.inner.terminate().await
    }

    pub fn pid(&self) -> Option<ProcessId> {
        self.inner.pid()
    }

    pub fn command(&self) -> &str {
        self.inner.command()
    }

    /// Everything the child has written so far, as (lossy) text
    pub fn output(&self) -> Cow<'_, str> {
        self.inner.output()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.is_running().await
    }

    /// Exit status if the child has already exited, without blocking
    pub async fn try_wait(&mut self) -> Result<Option<ProcessStatus>, MonitorError> {
        self.inner.try_wait().await
    }
}

use crate::{MonitorConfig, OutputSource};
use anyhow::Result;
use async_trait::async_trait;

/// Represents a process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl From<ProcessId> for u32 {
    fn from(pid: ProcessId) -> Self {
        pid.0
    }
}

/// Represents the status of a process
#[derive(Debug, Clone)]
pub enum ProcessStatus {
    Running,
    Exited(std::process::ExitStatus),
    Terminated,
    Unknown,
}

impl ProcessStatus {
    /// True if the process exited on its own with a success code
    pub fn success(&self) -> bool {
        matches!(self, ProcessStatus::Exited(status) if status.success())
    }
}

/// Result of a termination attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationResult {
    Success,
    ProcessNotFound,
    AccessDenied,
    Failed(String),
}

/// Trait representing a handle to the monitored child process
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None if the process has exited)
    fn get_pid(&self) -> Option<ProcessId>;

    /// Get the command that started this process
    fn get_command(&self) -> &str;

    /// Get the arguments passed to this process
    fn get_args(&self) -> &[String];

    /// Check if the process is still running (non-blocking)
    async fn is_running(&self) -> bool;

    /// Try to get exit status without blocking
    async fn try_wait(&mut self) -> Result<Option<ProcessStatus>>;

    /// Wait for the process to exit and reap it
    async fn wait(&mut self) -> Result<ProcessStatus>;

    /// Request graceful termination (SIGTERM on Unix)
    async fn signal_terminate(&mut self) -> TerminationResult;

    /// Force kill the process (platform-specific implementation)
    async fn kill(&mut self) -> Result<()>;
}

#[async_trait]
impl ProcessHandle for Box<dyn ProcessHandle> {
    fn get_pid(&self) -> Option<ProcessId> {
        (**self).get_pid()
    }

    fn get_command(&self) -> &str {
        (**self).get_command()
    }

    fn get_args(&self) -> &[String] {
        (**self).get_args()
    }

    async fn is_running(&self) -> bool {
        (**self).is_running().await
    }

    async fn try_wait(&mut self) -> Result<Option<ProcessStatus>> {
        (**self).try_wait().await
    }

    async fn wait(&mut self) -> Result<ProcessStatus> {
        (**self).wait().await
    }

    async fn signal_terminate(&mut self) -> TerminationResult {
        (**self).signal_terminate().await
    }

    async fn kill(&mut self) -> Result<()> {
        (**self).kill().await
    }
}

/// A freshly spawned child paired with the readable end of its output pipe
pub struct SpawnedProcess {
    pub handle: Box<dyn ProcessHandle>,
    pub output: Box<dyn OutputSource>,
}

/// Platform seam for creating monitored processes
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Spawn the configured command with its output redirected into a pipe
    /// owned by the monitor.
    ///
    /// Fails synchronously with the OS-level cause when the process cannot
    /// be created.
    async fn spawn_monitored(
        &self,
        config: &MonitorConfig,
    ) -> Result<SpawnedProcess, std::io::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_conversions() {
        let pid = ProcessId::from(42u32);
        assert_eq!(pid, ProcessId(42));
        assert_eq!(u32::from(pid), 42);
    }

    #[test]
    fn test_status_success() {
        assert!(!ProcessStatus::Running.success());
        assert!(!ProcessStatus::Terminated.success());
        assert!(!ProcessStatus::Unknown.success());
    }
}

#[cfg(unix)]
mod unix_impl {
    use crate::UnixPipeSource;
    use anyhow::Result;
    use async_trait::async_trait;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid as NixPid;
    use procwatch_core::{
        MonitorConfig, ProcessHandle, ProcessId, ProcessSpawner, ProcessStatus, SpawnedProcess,
        TerminationResult,
    };
    use std::io;
    use std::process::Stdio;
    use tokio::process::{Child, Command};
    use tracing::{info, warn};

    /// Unix-specific process handle implementation
    pub struct UnixProcessHandle {
        child: Child,
        command: String,
        args: Vec<String>,
    }

    impl UnixProcessHandle {
        pub fn new(child: Child, command: String, args: Vec<String>) -> Self {
            Self {
                child,
                command,
                args,
            }
        }
    }

    #[async_trait]
    impl ProcessHandle for UnixProcessHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            self.child.id().map(ProcessId::from)
        }

        fn get_command(&self) -> &str {
            &self.command
        }

        fn get_args(&self) -> &[String] {
            &self.args
        }

        async fn is_running(&self) -> bool {
            if let Some(pid) = self.get_pid() {
                let nix_pid = NixPid::from_raw(pid.0 as i32);
                // Signal 0 probes for existence without delivering anything
                signal::kill(nix_pid, None).is_ok()
            } else {
                false
            }
        }

        async fn try_wait(&mut self) -> Result<Option<ProcessStatus>> {
            match self.child.try_wait()? {
                Some(status) => Ok(Some(ProcessStatus::Exited(status))),
                None => Ok(None),
            }
        }

        async fn wait(&mut self) -> Result<ProcessStatus> {
            let status = self.child.wait().await?;
            Ok(ProcessStatus::Exited(status))
        }

        async fn signal_terminate(&mut self) -> TerminationResult {
            if let Some(pid) = self.get_pid() {
                let nix_pid = NixPid::from_raw(pid.0 as i32);

                match signal::kill(nix_pid, Signal::SIGTERM) {
                    Ok(()) => {
                        info!("Sent SIGTERM to process {}", pid.0);
                        TerminationResult::Success
                    }
                    Err(nix::errno::Errno::ESRCH) => {
                        info!("Process {} not found (already terminated)", pid.0);
                        TerminationResult::ProcessNotFound
                    }
                    Err(nix::errno::Errno::EPERM) => {
                        warn!("Permission denied to terminate process {}", pid.0);
                        TerminationResult::AccessDenied
                    }
                    Err(e) => {
                        warn!("Failed to send SIGTERM to process {}: {}", pid.0, e);
                        TerminationResult::Failed(format!("SIGTERM failed: {e}"))
                    }
                }
            } else {
                TerminationResult::ProcessNotFound
            }
        }

        async fn kill(&mut self) -> Result<()> {
            self.child
                .kill()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to kill process: {e}"))
        }
    }

    /// Spawns children with their output redirected into a monitor-owned pipe
    #[derive(Default)]
    pub struct UnixProcessSpawner;

    impl UnixProcessSpawner {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl ProcessSpawner for UnixProcessSpawner {
        async fn spawn_monitored(
            &self,
            config: &MonitorConfig,
        ) -> Result<SpawnedProcess, io::Error> {
            let (reader, writer) = io::pipe()?;

            let mut cmd = Command::new(&config.command);
            cmd.args(&config.args);

            if let Some(dir) = &config.working_directory {
                cmd.current_dir(dir);
            }

            for (key, value) in &config.env {
                cmd.env(key, value);
            }

            cmd.stdin(Stdio::null());
            if config.read.capture_stderr {
                cmd.stderr(Stdio::from(writer.try_clone()?));
            } else {
                cmd.stderr(Stdio::inherit());
            }
            cmd.stdout(Stdio::from(writer));

            // Child gets its own process group
            cmd.process_group(0);

            let child = cmd.spawn()?;
            // The command retains the write ends it was given; drop it so
            // the pipe can report end-of-stream once the child exits.
            drop(cmd);

            if let Some(pid) = child.id() {
                info!(
                    "Spawned Unix process: {} (PID: {}) with args: {:?}",
                    config.command, pid, config.args
                );
            }

            let source = UnixPipeSource::from_pipe_reader(reader)?;
            let handle =
                UnixProcessHandle::new(child, config.command.clone(), config.args.clone());

            Ok(SpawnedProcess {
                handle: Box::new(handle),
                output: Box::new(source),
            })
        }
    }

    /// Factory for creating Unix spawner instances
    pub struct UnixSpawnerFactory;

    impl UnixSpawnerFactory {
        pub fn create_spawner() -> UnixProcessSpawner {
            UnixProcessSpawner::new()
        }

        pub fn platform_name() -> &'static str {
            "unix"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::Duration;

        fn config_for(script: &str) -> MonitorConfig {
            MonitorConfig::builder()
                .command("/bin/sh")
                .args(["-c", script])
                .build()
                .unwrap()
        }

        #[tokio::test]
        async fn test_spawn_failure_is_synchronous() {
            let config = MonitorConfig::builder()
                .command("/nonexistent/not-a-binary")
                .build()
                .unwrap();

            let spawner = UnixProcessSpawner::new();
            assert!(spawner.spawn_monitored(&config).await.is_err());
        }

        #[tokio::test]
        async fn test_spawned_child_output_reaches_source() {
            let spawner = UnixProcessSpawner::new();
            let mut spawned = spawner
                .spawn_monitored(&config_for("printf ready"))
                .await
                .unwrap();

            let mut collected = Vec::new();
            let mut buf = [0u8; 256];
            loop {
                match spawned
                    .output
                    .poll_readable(Duration::from_secs(5))
                    .await
                    .unwrap()
                {
                    procwatch_core::Readiness::Idle => break,
                    procwatch_core::Readiness::Readable => {
                        let read = spawned.output.read_chunk(&mut buf).await.unwrap();
                        if read == 0 {
                            break;
                        }
                        collected.extend_from_slice(&buf[..read]);
                    }
                }
            }

            assert_eq!(collected, b"ready");
            spawned.handle.wait().await.unwrap();
        }

        #[tokio::test]
        async fn test_terminate_signal_reaches_child() {
            let spawner = UnixProcessSpawner::new();
            let mut spawned = spawner
                .spawn_monitored(&config_for("sleep 30"))
                .await
                .unwrap();

            assert!(spawned.handle.is_running().await);
            assert_eq!(
                spawned.handle.signal_terminate().await,
                TerminationResult::Success
            );
            let status = spawned.handle.wait().await.unwrap();
            assert!(!status.success());
        }
    }
}

#[cfg(unix)]
pub use unix_impl::{UnixProcessHandle, UnixProcessSpawner, UnixSpawnerFactory};

// Stubs for non-Unix builds
#[cfg(not(unix))]
pub struct UnixProcessSpawner;

#[cfg(not(unix))]
impl UnixProcessSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Default for UnixProcessSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
mod windows_impl {
    use crate::ChannelSource;
    use anyhow::Result;
    use async_trait::async_trait;
    use procwatch_core::{
        MonitorConfig, ProcessHandle, ProcessId, ProcessSpawner, ProcessStatus, SpawnedProcess,
        TerminationResult,
    };
    use std::io;
    use std::os::windows::io::OwnedHandle;
    use std::process::Stdio;
    use tokio::process::{Child, Command};
    use tokio::sync::mpsc;
    use tracing::{info, warn};
    use windows::Win32::Foundation::{CloseHandle, STILL_ACTIVE};
    use windows::Win32::System::Threading::{
        CREATE_NO_WINDOW, GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    fn pid_is_running(pid: u32) -> bool {
        unsafe {
            let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) else {
                return false;
            };
            let mut code = 0u32;
            let alive = GetExitCodeProcess(handle, &mut code).is_ok()
                && code == STILL_ACTIVE.0 as u32;
            let _ = CloseHandle(handle);
            alive
        }
    }

    /// Windows-specific process handle implementation
    pub struct WindowsProcessHandle {
        child: Child,
        command: String,
        args: Vec<String>,
    }

    impl WindowsProcessHandle {
        pub fn new(child: Child, command: String, args: Vec<String>) -> Self {
            Self {
                child,
                command,
                args,
            }
        }
    }

    #[async_trait]
    impl ProcessHandle for WindowsProcessHandle {
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
            match self.get_pid() {
                Some(pid) => pid_is_running(pid.0),
                None => false,
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
            // Windows has no SIGTERM analogue; TerminateProcess through the
            // handle is the stop request
            match self.child.start_kill() {
                Ok(()) => {
                    info!("Requested termination of process {:?}", self.get_pid());
                    TerminationResult::Success
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                    TerminationResult::ProcessNotFound
                }
                Err(e) => {
                    warn!("Failed to terminate process: {}", e);
                    TerminationResult::Failed(format!("TerminateProcess failed: {e}"))
                }
            }
        }

        async fn kill(&mut self) -> Result<()> {
            self.child
                .kill()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to kill process: {e}"))
        }
    }

    /// Spawns children with reader threads pumping their output into a channel
    #[derive(Default)]
    pub struct WindowsProcessSpawner;

    impl WindowsProcessSpawner {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl ProcessSpawner for WindowsProcessSpawner {
        async fn spawn_monitored(
            &self,
            config: &MonitorConfig,
        ) -> Result<SpawnedProcess, io::Error> {
            let mut cmd = Command::new(&config.command);
            cmd.args(&config.args);

            if let Some(dir) = &config.working_directory {
                cmd.current_dir(dir);
            }

            for (key, value) in &config.env {
                cmd.env(key, value);
            }

            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::piped());
            if config.read.capture_stderr {
                cmd.stderr(Stdio::piped());
            } else {
                cmd.stderr(Stdio::inherit());
            }

            // Background execution without a console window popup
            cmd.creation_flags(CREATE_NO_WINDOW.0);

            let mut child = cmd.spawn()?;

            if let Some(pid) = child.id() {
                info!(
                    "Spawned Windows process: {} (PID: {}) with args: {:?}",
                    config.command, pid, config.args
                );
            }

            let (tx, rx) = mpsc::unbounded_channel();

            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
            let stdout: OwnedHandle = stdout.try_into()?;
            ChannelSource::pump(
                std::fs::File::from(stdout),
                tx.clone(),
                config.read.chunk_size,
            );

            if config.read.capture_stderr {
                let stderr = child
                    .stderr
                    .take()
                    .ok_or_else(|| io::Error::other("child stderr was not captured"))?;
                let stderr: OwnedHandle = stderr.try_into()?;
                ChannelSource::pump(
                    std::fs::File::from(stderr),
                    tx.clone(),
                    config.read.chunk_size,
                );
            }
            // End-of-stream is the pump threads dropping their senders
            drop(tx);

            let handle =
                WindowsProcessHandle::new(child, config.command.clone(), config.args.clone());

            Ok(SpawnedProcess {
                handle: Box::new(handle),
                output: Box::new(ChannelSource::new(rx)),
            })
        }
    }

    /// Factory for creating Windows spawner instances
    pub struct WindowsSpawnerFactory;

    impl WindowsSpawnerFactory {
        pub fn create_spawner() -> WindowsProcessSpawner {
            WindowsProcessSpawner::new()
        }

        pub fn platform_name() -> &'static str {
            "windows"
        }
    }
}

#[cfg(windows)]
pub use windows_impl::{WindowsProcessHandle, WindowsProcessSpawner, WindowsSpawnerFactory};

// Stubs for non-Windows builds
#[cfg(not(windows))]
pub struct WindowsProcessSpawner;

#[cfg(not(windows))]
impl WindowsProcessSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl Default for WindowsProcessSpawner {
    fn default() -> Self {
        Self::new()
    }
}

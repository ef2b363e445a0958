use async_trait::async_trait;
use procwatch_core::{MonitorConfig, ProcessSpawner, SpawnedProcess};
use tracing::info;

/// Platform-specific spawner implementations
pub enum PlatformSpawner {
    #[cfg(unix)]
    Unix(procwatch_unix::UnixProcessSpawner),
    #[cfg(windows)]
    Windows(procwatch_windows::WindowsProcessSpawner),
}

impl PlatformSpawner {
    pub fn new() -> Self {
        #[cfg(unix)]
        {
            info!("Creating Unix process spawner");
            Self::Unix(procwatch_unix::UnixSpawnerFactory::create_spawner())
        }

        #[cfg(windows)]
        {
            info!("Creating Windows process spawner");
            Self::Windows(procwatch_windows::WindowsSpawnerFactory::create_spawner())
        }

        #[cfg(not(any(unix, windows)))]
        {
            compile_error!("Unsupported platform: only Unix and Windows are currently supported");
        }
    }

    pub fn platform_name() -> &'static str {
        #[cfg(unix)]
        {
            procwatch_unix::UnixSpawnerFactory::platform_name()
        }

        #[cfg(windows)]
        {
            procwatch_windows::WindowsSpawnerFactory::platform_name()
        }
    }
}

impl Default for PlatformSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for PlatformSpawner {
    async fn spawn_monitored(
        &self,
        config: &MonitorConfig,
    ) -> Result<SpawnedProcess, std::io::Error> {
        match self {
            #[cfg(unix)]
            Self::Unix(spawner) => spawner.spawn_monitored(config).await,
            #[cfg(windows)]
            Self::Windows(spawner) => spawner.spawn_monitored(config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = PlatformSpawner::platform_name();
        println!("Running on platform: {platform}");

        let _spawner = PlatformSpawner::new();
    }
}

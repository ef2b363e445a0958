use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Tuning knobs for the monitor's read and drain loops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadConfig {
    /// Upper bound for a single read from the output stream (in bytes)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Readiness window for one round of the termination drain
    /// (in milliseconds)
    #[serde(default = "default_drain_poll_ms")]
    pub drain_poll_ms: u64,

    /// Whether the child's stderr is merged into the monitored stream
    #[serde(default = "default_capture_stderr")]
    pub capture_stderr: bool,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            drain_poll_ms: default_drain_poll_ms(),
            capture_stderr: default_capture_stderr(),
        }
    }
}

impl ReadConfig {
    /// Create a new ReadConfig with sensible defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            return Err(anyhow::anyhow!("chunk_size must be greater than zero"));
        }

        if self.chunk_size > 1 << 20 {
            return Err(anyhow::anyhow!("chunk_size should not exceed 1 MiB"));
        }

        if self.drain_poll_ms > 60_000 {
            return Err(anyhow::anyhow!(
                "drain_poll_ms should not exceed 60 seconds"
            ));
        }

        Ok(())
    }

    /// Get the drain readiness window as Duration
    pub fn drain_poll_window(&self) -> Duration {
        Duration::from_millis(self.drain_poll_ms)
    }
}

/// Main monitor configuration
#[derive(Default, Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into, strip_option))]
pub struct MonitorConfig {
    pub command: String,
    #[builder(default)]
    #[builder(setter(custom))]
    #[serde(default)]
    pub args: Vec<String>,
    #[builder(default)]
    #[builder(setter(custom))]
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[builder(default)]
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    #[builder(default)]
    #[serde(default)]
    pub read: ReadConfig,
}

impl MonitorConfig {
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }
}

impl MonitorConfigBuilder {
    pub fn args<S: ToString, I: IntoIterator<Item = S>>(&mut self, iter: I) -> &mut Self {
        let args: Vec<String> = iter.into_iter().map(|s| s.to_string()).collect();
        self.args = Some(args);
        self
    }

    pub fn env<T: ToString>(&mut self, key: T, value: T) -> &mut Self {
        let map = self.env.get_or_insert_with(HashMap::new);
        map.insert(key.to_string(), value.to_string());

        self
    }

    pub fn env_multi<T: ToString, I: IntoIterator<Item = (T, T)>>(&mut self, iter: I) -> &mut Self {
        let env = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in iter {
            env.insert(key.to_string(), value.to_string());
        }
        self
    }
}

// Default value functions for serde
fn default_chunk_size() -> usize {
    4096
}
fn default_drain_poll_ms() -> u64 {
    200
}
fn default_capture_stderr() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_read_config() {
        let config = ReadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 4096);
        assert!(config.capture_stderr);
    }

    #[test]
    fn test_invalid_read_config() {
        let mut config = ReadConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.chunk_size = 4096;
        config.drain_poll_ms = 120_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_drain_poll_window() {
        let config = ReadConfig {
            drain_poll_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.drain_poll_window(), Duration::from_millis(250));
    }

    #[test]
    fn test_serialization() {
        let config = ReadConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ReadConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ReadConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReadConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = MonitorConfig::builder()
            .command("server")
            .args(["--port", "3000"])
            .env("RUST_LOG", "info")
            .working_directory("/tmp")
            .build()
            .unwrap();

        assert_eq!(config.command, "server");
        assert_eq!(config.args, vec!["--port", "3000"]);
        assert_eq!(config.env.get("RUST_LOG").unwrap(), "info");
        assert_eq!(config.working_directory, Some(PathBuf::from("/tmp")));
        assert_eq!(config.read, ReadConfig::default());
    }

    #[test]
    fn test_builder_requires_command() {
        assert!(MonitorConfig::builder().build().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = MonitorConfig::builder()
            .command("server")
            .args(["-v"])
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MonitorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}

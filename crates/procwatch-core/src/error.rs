use thiserror::Error;

/// Error types for monitor operations
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The OS could not create the child process
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The deadline passed before enough occurrences were buffered
    #[error("pattern {pattern:?} seen {found} of {count} times before the timeout")]
    MatchTimeout {
        pattern: String,
        count: usize,
        found: usize,
    },

    /// The output stream closed before enough occurrences were buffered
    #[error("output stream closed with pattern {pattern:?} seen {found} of {count} times")]
    MatchEof {
        pattern: String,
        count: usize,
        found: usize,
    },

    /// The readiness wait reported nothing readable while the deadline had
    /// not passed, or failed outright
    #[error("readiness wait failed: {reason}")]
    Select { reason: String },

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl MonitorError {
    /// Check if a caller may retry the failed wait with a new deadline
    pub fn is_retryable(&self) -> bool {
        matches!(self, MonitorError::MatchTimeout { .. })
    }

    /// Check if this error ends the monitor's usefulness for further waits
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MonitorError::Spawn { .. } | MonitorError::Select { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_error() -> MonitorError {
        MonitorError::Spawn {
            command: "missing-binary".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    #[test]
    fn test_error_display() {
        let error = spawn_error();
        let display = format!("{error}");
        assert!(display.contains("failed to spawn"));
        assert!(display.contains("missing-binary"));

        let error = MonitorError::MatchTimeout {
            pattern: "ready".to_string(),
            count: 2,
            found: 1,
        };
        let display = format!("{error}");
        assert!(display.contains("\"ready\""));
        assert!(display.contains("1 of 2"));
    }

    #[test]
    fn test_error_categorization() {
        // Retryable errors
        assert!(
            MonitorError::MatchTimeout {
                pattern: "x".to_string(),
                count: 1,
                found: 0,
            }
            .is_retryable()
        );

        // Non-retryable errors
        assert!(
            !MonitorError::MatchEof {
                pattern: "x".to_string(),
                count: 1,
                found: 0,
            }
            .is_retryable()
        );
        assert!(!spawn_error().is_retryable());

        // Fatal errors
        assert!(spawn_error().is_fatal());
        assert!(
            MonitorError::Select {
                reason: "test".to_string()
            }
            .is_fatal()
        );
        assert!(
            !MonitorError::MatchTimeout {
                pattern: "x".to_string(),
                count: 1,
                found: 0,
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_spawn_error_preserves_os_cause() {
        let error = spawn_error();
        let MonitorError::Spawn { source, .. } = &error else {
            panic!("expected spawn error");
        };
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_error_debug_format() {
        let error = MonitorError::Select {
            reason: "poll failed".to_string(),
        };
        let debug_str = format!("{error:?}");
        assert!(debug_str.contains("Select"));
        assert!(debug_str.contains("poll failed"));
    }
}

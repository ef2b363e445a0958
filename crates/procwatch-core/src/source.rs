use async_trait::async_trait;
use std::time::Duration;

/// Outcome of one multiplexing round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The stream has data (or end-of-stream) to deliver
    Readable,
    /// Nothing became readable within the window
    Idle,
}

/// Readable side of the monitored output stream.
///
/// The readiness wait and the bounded read are separate calls so that
/// deterministic fakes can stand in for the OS primitives in tests, and so
/// the monitor can share one deadline across any number of rounds.
#[async_trait]
pub trait OutputSource: Send {
    /// Wait up to `window` for the stream to become readable.
    ///
    /// A zero window checks for immediately-available data without blocking.
    async fn poll_readable(&mut self, window: Duration) -> std::io::Result<Readiness>;

    /// Perform one bounded read into `buf`.
    ///
    /// Returning `Ok(0)` denotes end-of-stream; implementations must not
    /// report it for a merely-empty pipe that is still open.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

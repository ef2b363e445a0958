use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Destination for copies of the child's output.
///
/// The monitor forwards every chunk it reads, both during normal waits and
/// during the termination drain; the sink is flushed before the process is
/// reaped. Write failures are swallowed - a broken sink must not interfere
/// with matching or termination.
#[derive(Clone, derive_more::From)]
pub enum MonitorSink {
    Writer(SinkWriter),
    Memory(MemorySink),
}

impl MonitorSink {
    /// Sink that copies output to the monitor's own stdout
    pub fn stdout() -> Self {
        SinkWriter::new(Box::new(tokio::io::stdout())).into()
    }

    /// In-memory sink; keep a [`MemorySink`] clone to read the contents back
    pub fn memory() -> Self {
        MemorySink::new().into()
    }

    pub async fn write_chunk(&self, chunk: &[u8]) {
        match self {
            MonitorSink::Writer(writer) => writer.write_chunk(chunk).await,
            MonitorSink::Memory(memory) => memory.write_chunk(chunk).await,
        }
    }

    pub async fn flush(&self) {
        if let MonitorSink::Writer(writer) = self {
            writer.flush().await;
        }
    }
}

/// Sink flavor wrapping an arbitrary async writer
pub struct SinkWriter(Arc<Mutex<Box<dyn AsyncWrite + Unpin + Sync + Send>>>);

impl Clone for SinkWriter {
    fn clone(&self) -> Self {
        SinkWriter(self.0.clone())
    }
}

impl SinkWriter {
    pub fn new(writer: Box<dyn AsyncWrite + Unpin + Sync + Send>) -> SinkWriter {
        SinkWriter(Arc::new(Mutex::new(writer)))
    }

    pub async fn write_chunk(&self, chunk: &[u8]) {
        let mut lock = self.0.lock().await;
        let _ = lock.write_all(chunk).await;
    }

    pub async fn flush(&self) {
        let mut lock = self.0.lock().await;
        let _ = lock.flush().await;
    }
}

/// Sink flavor accumulating output in memory, readable back out
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn write_chunk(&self, chunk: &[u8]) {
        self.0.lock().await.extend_from_slice(chunk);
    }

    pub async fn contents(&self) -> Vec<u8> {
        self.0.lock().await.clone()
    }

    pub async fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents().await).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_accumulates() {
        let memory = MemorySink::new();
        let sink: MonitorSink = memory.clone().into();

        sink.write_chunk(b"first ").await;
        sink.write_chunk(b"second").await;
        sink.flush().await;

        assert_eq!(memory.text().await, "first second");
    }

    #[tokio::test]
    async fn test_writer_sink_appends() {
        // A shared Vec behind the writer flavor observes the same bytes
        struct VecWriter(Arc<std::sync::Mutex<Vec<u8>>>);

        impl AsyncWrite for VecWriter {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
                buf: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                self.0.lock().unwrap().extend_from_slice(buf);
                std::task::Poll::Ready(Ok(buf.len()))
            }

            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink: MonitorSink = SinkWriter::new(Box::new(VecWriter(seen.clone()))).into();

        sink.write_chunk(b"drained").await;
        sink.flush().await;

        assert_eq!(&*seen.lock().unwrap(), b"drained");
    }
}

use async_trait::async_trait;
use procwatch_core::{OutputSource, Readiness};
use std::io;
use std::io::Read;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output source fed by dedicated reader threads over a channel.
///
/// Each captured stream gets a thread performing blocking reads and sending
/// the chunks here; once every sender is gone the channel closes, which this
/// source presents as end-of-stream (a zero-length read). Chunks larger than
/// the caller's buffer are handed out across several reads.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    staged: Option<Vec<u8>>,
    offset: usize,
    eof: bool,
}

impl ChannelSource {
    pub fn new(rx: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self {
            rx,
            staged: None,
            offset: 0,
            eof: false,
        }
    }

    /// Spawn a reader thread pumping `reader` into `tx` until end-of-stream
    pub fn pump<R: Read + Send + 'static>(
        mut reader: R,
        tx: mpsc::UnboundedSender<Vec<u8>>,
        chunk_size: usize,
    ) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let mut buf = vec![0u8; chunk_size.max(1)];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(read) => {
                        if tx.send(buf[..read].to_vec()).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }

    fn take_staged(&mut self, buf: &mut [u8]) -> Option<usize> {
        let chunk = self.staged.as_ref()?;
        let len = (chunk.len() - self.offset).min(buf.len());
        buf[..len].copy_from_slice(&chunk[self.offset..self.offset + len]);
        self.offset += len;
        if self.offset == chunk.len() {
            self.staged = None;
            self.offset = 0;
        }
        Some(len)
    }
}

#[async_trait]
impl OutputSource for ChannelSource {
    async fn poll_readable(&mut self, window: Duration) -> io::Result<Readiness> {
        if self.staged.is_some() || self.eof {
            return Ok(Readiness::Readable);
        }

        match tokio::time::timeout(window, self.rx.recv()).await {
            Ok(Some(chunk)) => {
                self.staged = Some(chunk);
                self.offset = 0;
                Ok(Readiness::Readable)
            }
            Ok(None) => {
                self.eof = true;
                Ok(Readiness::Readable)
            }
            Err(_) => Ok(Readiness::Idle),
        }
    }

    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(read) = self.take_staged(buf) {
            return Ok(read);
        }
        if self.eof {
            return Ok(0);
        }

        match self.rx.recv().await {
            Some(chunk) => {
                self.staged = Some(chunk);
                self.offset = 0;
                Ok(self.take_staged(buf).unwrap_or(0))
            }
            None => {
                self.eof = true;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_until_data_arrives() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = ChannelSource::new(rx);

        assert_eq!(
            source.poll_readable(Duration::from_millis(20)).await.unwrap(),
            Readiness::Idle
        );

        tx.send(b"data".to_vec()).unwrap();
        assert_eq!(
            source.poll_readable(Duration::from_secs(1)).await.unwrap(),
            Readiness::Readable
        );

        let mut buf = [0u8; 16];
        let read = source.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..read], b"data");
    }

    #[tokio::test]
    async fn test_large_chunk_spans_reads() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = ChannelSource::new(rx);

        tx.send(b"0123456789".to_vec()).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"4567");
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
    }

    #[tokio::test]
    async fn test_closed_channel_is_end_of_stream() {
        let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let mut source = ChannelSource::new(rx);
        drop(tx);

        assert_eq!(
            source.poll_readable(Duration::from_secs(1)).await.unwrap(),
            Readiness::Readable
        );
        let mut buf = [0u8; 16];
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 0);
        // End-of-stream is sticky
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pump_forwards_until_eof() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = ChannelSource::new(rx);

        let pump = ChannelSource::pump(io::Cursor::new(b"pumped bytes".to_vec()), tx, 5);

        let mut collected = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let read = source.read_chunk(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            collected.extend_from_slice(&buf[..read]);
        }

        assert_eq!(collected, b"pumped bytes");
        pump.join().unwrap();
    }
}

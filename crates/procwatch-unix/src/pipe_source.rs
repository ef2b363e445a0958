#[cfg(unix)]
mod unix_impl {
    use async_trait::async_trait;
    use procwatch_core::{OutputSource, Readiness};
    use std::io;
    use std::os::fd::OwnedFd;
    use std::time::Duration;
    use tokio::net::unix::pipe;

    /// Readable end of the child's output pipe, in non-blocking mode
    pub struct UnixPipeSource {
        rx: pipe::Receiver,
    }

    impl UnixPipeSource {
        pub fn from_pipe_reader(reader: io::PipeReader) -> io::Result<Self> {
            let fd = OwnedFd::from(reader);
            Ok(Self {
                rx: pipe::Receiver::from_owned_fd(fd)?,
            })
        }
    }

    #[async_trait]
    impl OutputSource for UnixPipeSource {
        async fn poll_readable(&mut self, window: Duration) -> io::Result<Readiness> {
            match tokio::time::timeout(window, self.rx.readable()).await {
                Ok(Ok(())) => Ok(Readiness::Readable),
                Ok(Err(e)) => Err(e),
                Err(_) => Ok(Readiness::Idle),
            }
        }

        async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            loop {
                match self.rx.try_read(buf) {
                    Ok(read) => return Ok(read),
                    // Readiness can be spurious; rearm and retry
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        self.rx.readable().await?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

}

#[cfg(unix)]
pub use unix_impl::UnixPipeSource;

// Stub for non-Unix builds
#[cfg(not(unix))]
pub struct UnixPipeSource;

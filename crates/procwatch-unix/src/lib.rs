//! Unix implementation of the procwatch process and stream seams.
//!
//! Children are spawned with their output redirected into an anonymous pipe
//! whose readable end the monitor owns; readiness is observed through
//! non-blocking pipe I/O and graceful termination is SIGTERM.

mod pipe_source;
mod process;

pub use pipe_source::*;
pub use process::*;

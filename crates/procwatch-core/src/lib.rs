//! Procwatch core - platform-independent abstractions for the process
//! output monitor.
//!
//! This crate provides the configuration, error types, trait seams and the
//! monitor orchestration that are shared across platform-specific
//! implementations.

mod config;
mod error;
mod monitor;
mod output;
mod process;
mod sink;
mod source;

pub use config::*;
pub use error::*;
pub use monitor::*;
pub use output::*;
pub use process::*;
pub use sink::*;
pub use source::*;

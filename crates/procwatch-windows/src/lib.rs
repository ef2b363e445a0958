//! Windows implementation of the procwatch process and stream seams.
//!
//! Windows anonymous pipes have no readiness notification, so blocking
//! reads run on dedicated reader threads and the monitor multiplexes on a
//! channel instead; the four-outcome wait contract is unchanged.

mod channel_source;
mod process;

pub use channel_source::*;
pub use process::*;

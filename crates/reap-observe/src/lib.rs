//! Logging bootstrap for reap binaries.
//!
//! Library crates only emit `tracing` events; a binary picks the output format
//! once at startup through [`init_logger`].
mod logger;
pub use logger::*;

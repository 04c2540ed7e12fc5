//! Injection-safe composition of single-string command lines.
//!
//! Launchers that take one string and re-split it themselves (the Windows
//! `CreateProcess` convention) need every argument quoted exactly where the
//! re-splitter would otherwise cut it. This crate decides which tokens need
//! quoting, under which [`VerificationMode`], and recovers executables whose
//! path was split across tokens upstream.
mod error;
pub use error::{CmdlineError, CmdlineResult};

mod mode;
pub use mode::VerificationMode;

mod quote;
pub use quote::{escape_arg, is_quoted, needs_escaping, quote};

mod token;
pub use token::tokenize;

mod builder;
pub use builder::{CmdlineConfig, CommandLine, CommandLineBuilder, compose};

pub mod prelude {
    pub use crate::{CmdlineConfig, CmdlineError, CommandLine, CommandLineBuilder, VerificationMode};
}

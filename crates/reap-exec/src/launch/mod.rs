//! Fire-and-forget process launching.
//!
//! Every OS side effect of this crate goes through a [`Launcher`], so callers
//! decide whether commands hit a real shell ([`SystemLauncher`]) or a fake.
//! Launches are never awaited: success means the child was spawned, nothing
//! more. Callers that want to see each attempt register a [`LaunchObserver`].
use std::{fmt, path::PathBuf};

use reap_cmdline::CommandLineBuilder;

use crate::error::ExecError;

mod system;
pub use system::SystemLauncher;

/// Program, arguments and working directory of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Program followed by arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Renders as a quoted command line, for logs.
impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match CommandLineBuilder::default().build(&self.argv()) {
            Ok(line) => f.write_str(line.as_str()),
            Err(_) => f.write_str(&self.argv().join(" ")),
        }
    }
}

/// What a successful spawn reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchReceipt {
    /// OS pid of the spawned child, when the platform reports one.
    pub pid: Option<u32>,
}

pub trait Launcher: Send + Sync {
    /// Spawn `spec` and return without waiting for it to finish.
    fn spawn(&self, spec: &LaunchSpec) -> Result<LaunchReceipt, ExecError>;
}

/// Opt-in hook that sees every launch attempt and its result.
pub trait LaunchObserver: Send + Sync {
    fn on_launch(&self, spec: &LaunchSpec, result: Result<&LaunchReceipt, &ExecError>);
}

pub(crate) fn launch_observed(
    launcher: &dyn Launcher,
    observer: Option<&dyn LaunchObserver>,
    spec: &LaunchSpec,
) -> Result<LaunchReceipt, ExecError> {
    let result = launcher.spawn(spec);
    if let Some(observer) = observer {
        observer.on_launch(spec, result.as_ref());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = LaunchSpec::new("sudo").args(["-u", "etl team", "sh", "/w/a.kill"]);
        assert_eq!(spec.to_string(), r#"sudo -u "etl team" sh /w/a.kill"#);
    }

    #[test]
    fn argv_starts_with_program() {
        let spec = LaunchSpec::new("kill").arg("-9").arg("42");
        assert_eq!(spec.argv(), vec!["kill", "-9", "42"]);
    }

    #[test]
    fn display_falls_back_for_empty_program() {
        let spec = LaunchSpec::new("").arg("x");
        assert_eq!(spec.to_string(), " x");
    }
}

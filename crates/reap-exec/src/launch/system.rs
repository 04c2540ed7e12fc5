use std::process::Stdio;

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, trace};

use crate::{
    error::ExecError,
    launch::{LaunchReceipt, LaunchSpec, Launcher},
};

/// Spawns real OS processes through `tokio::process`.
///
/// Must be used from within a tokio runtime; the child is reaped on a
/// background task so it never lingers as a zombie.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    detach: bool,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self { detach: true }
    }

    /// Keep children in the launcher's session instead of starting a new one.
    pub fn attached(mut self) -> Self {
        self.detach = false;
        self
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for SystemLauncher {
    fn spawn(&self, spec: &LaunchSpec) -> Result<LaunchReceipt, ExecError> {
        if spec.program.is_empty() {
            return Err(ExecError::MissingProgram);
        }
        let handle = Handle::try_current().map_err(|_| ExecError::NoRuntime)?;

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        if self.detach {
            detach(&mut cmd);
        }

        trace!(target: "reap.exec.launch", program = %spec.program, args = ?spec.args, "spawn");
        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", spec.program)))?;
        let pid = child.id();

        let program = spec.program.clone();
        handle.spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    trace!(target: "reap.exec.launch", %program, ?pid, code = ?status.code(), "child exited")
                }
                Err(e) => debug!(target: "reap.exec.launch", %program, ?pid, error = %e, "wait failed"),
            }
        });

        Ok(LaunchReceipt { pid })
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Start the child in its own session so it outlives a worker shutdown
        /// that signals the worker's process group.
        fn detach(cmd: &mut Command) {
            let hook = || -> std::io::Result<()> {
                // SAFETY: setsid is async-signal-safe and touches no parent state.
                if unsafe { libc::setsid() } == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            };
            // SAFETY: the hook only calls setsid between fork and exec.
            unsafe {
                cmd.pre_exec(hook);
            }
        }
    } else {
        fn detach(_cmd: &mut Command) {
            tracing::warn!(target: "reap.exec.launch", "session detach is not supported on this platform; ignoring");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_is_rejected() {
        let err = SystemLauncher::new().spawn(&LaunchSpec::new("")).unwrap_err();
        assert!(matches!(err, ExecError::MissingProgram));
    }

    #[test]
    fn spawn_outside_runtime_fails_cleanly() {
        let err = SystemLauncher::new().spawn(&LaunchSpec::new("true")).unwrap_err();
        assert!(matches!(err, ExecError::NoRuntime));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn spawns_real_process() {
        let receipt = SystemLauncher::new().spawn(&LaunchSpec::new("true")).unwrap();
        assert!(receipt.pid.is_some());
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let err = SystemLauncher::new()
            .attached()
            .spawn(&LaunchSpec::new("reap-definitely-missing-binary-1b7e"))
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn(ref msg) if msg.contains("reap-definitely-missing")));
    }
}

//! In-memory launcher fakes.
use std::sync::Mutex;

use crate::{
    error::ExecError,
    launch::{LaunchObserver, LaunchReceipt, LaunchSpec, Launcher},
};

/// Records every spec it is asked to spawn; optionally fails each spawn.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<LaunchSpec>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn spawn(&self, spec: &LaunchSpec) -> Result<LaunchReceipt, ExecError> {
        self.launched.lock().unwrap().push(spec.clone());
        if self.fail {
            return Err(ExecError::Spawn(format!("{}: refused by test launcher", spec.program)));
        }
        Ok(LaunchReceipt { pid: Some(4242) })
    }
}

/// Records whether each observed launch succeeded.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    results: Mutex<Vec<bool>>,
}

impl RecordingObserver {
    pub fn results(&self) -> Vec<bool> {
        self.results.lock().unwrap().clone()
    }
}

impl LaunchObserver for RecordingObserver {
    fn on_launch(&self, _spec: &LaunchSpec, result: Result<&LaunchReceipt, &ExecError>) {
        self.results.lock().unwrap().push(result.is_ok());
    }
}

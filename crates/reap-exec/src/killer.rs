use std::sync::Arc;

use reap_model::{NO_PID, Pid};
use tracing::{error, info};

use crate::{
    error::ExecError,
    launch::{LaunchObserver, LaunchReceipt, LaunchSpec, Launcher, launch_observed},
};

#[derive(Debug, Clone)]
pub struct KillConfig {
    /// Privilege-escalation program prefixed to `kill`; `None` runs `kill` directly.
    pub sudo: Option<String>,
    /// Signal number passed as `-<signal>`.
    pub signal: i32,
}

impl Default for KillConfig {
    fn default() -> Self {
        Self {
            sudo: Some("sudo".to_string()),
            signal: 9,
        }
    }
}

impl KillConfig {
    pub fn with_sudo(mut self, sudo: Option<String>) -> Self {
        self.sudo = sudo;
        self
    }

    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = signal;
        self
    }
}

/// Result of a local kill attempt. Never an error: failures are logged here.
#[derive(Debug)]
pub enum KillOutcome {
    /// The pid was the never-started sentinel; nothing was launched.
    NoProcess,
    /// The kill command was spawned.
    Launched(LaunchReceipt),
    /// The kill command could not be spawned.
    LaunchFailed(ExecError),
}

impl KillOutcome {
    /// Returns `true` when a kill was attempted, launched or not.
    pub fn attempted(&self) -> bool {
        !matches!(self, KillOutcome::NoProcess)
    }
}

/// Sends a privileged kill signal to a local process.
pub struct ProcessKiller {
    launcher: Arc<dyn Launcher>,
    observer: Option<Arc<dyn LaunchObserver>>,
    config: KillConfig,
}

impl ProcessKiller {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            launcher,
            observer: None,
            config: KillConfig::default(),
        }
    }

    pub fn with_config(mut self, config: KillConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LaunchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The command `kill_local(pid)` would launch.
    pub fn command_for(&self, pid: Pid) -> LaunchSpec {
        let kill_args = [
            "kill".to_string(),
            format!("-{}", self.config.signal),
            pid.to_string(),
        ];
        match &self.config.sudo {
            Some(sudo) => LaunchSpec::new(sudo.clone()).args(kill_args),
            None => LaunchSpec::new("kill").args(kill_args.into_iter().skip(1)),
        }
    }

    /// Fire-and-forget kill of `pid`; the exit status is never observed.
    pub fn kill_local(&self, pid: Pid) -> KillOutcome {
        if pid == NO_PID {
            error!(target: "reap.exec.kill", pid, "process kill failed: no process id recorded");
            return KillOutcome::NoProcess;
        }

        let spec = self.command_for(pid);
        info!(target: "reap.exec.kill", pid, cmd = %spec, "killing process");

        match launch_observed(self.launcher.as_ref(), self.observer.as_deref(), &spec) {
            Ok(receipt) => KillOutcome::Launched(receipt),
            Err(e) => {
                error!(target: "reap.exec.kill", pid, cmd = %spec, error = %e, "process kill failed");
                KillOutcome::LaunchFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingLauncher, RecordingObserver};

    use std::{fmt, sync::Mutex};

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
    };
    use tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt},
    };

    /// Keeps the level and message of every event it sees.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    struct Message(String);

    impl Visit for Message {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut msg = Message(String::new());
            event.record(&mut msg);
            self.0.lock().unwrap().push((*event.metadata().level(), msg.0));
        }
    }

    #[test]
    fn zero_pid_launches_nothing() {
        let launcher = Arc::new(RecordingLauncher::new());
        let killer = ProcessKiller::new(launcher.clone());

        let outcome = killer.kill_local(NO_PID);

        assert!(matches!(outcome, KillOutcome::NoProcess));
        assert!(!outcome.attempted());
        assert!(launcher.launched().is_empty());
    }

    #[test]
    fn zero_pid_logs_an_error() {
        let captured = Captured::default();
        let killer = ProcessKiller::new(Arc::new(RecordingLauncher::new()));

        tracing::subscriber::with_default(
            tracing_subscriber::registry().with(captured.clone()),
            || killer.kill_local(NO_PID),
        );

        let events = captured.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Level::ERROR);
        assert!(events[0].1.contains("no process id recorded"));
    }

    #[test]
    fn kills_with_sudo_and_sigkill() {
        let launcher = Arc::new(RecordingLauncher::new());
        let killer = ProcessKiller::new(launcher.clone());

        let outcome = killer.kill_local(1234);

        assert!(matches!(outcome, KillOutcome::Launched(_)));
        let launched = launcher.launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].argv(), vec!["sudo", "kill", "-9", "1234"]);
    }

    #[test]
    fn without_sudo_runs_kill_directly() {
        let launcher = Arc::new(RecordingLauncher::new());
        let killer = ProcessKiller::new(launcher.clone())
            .with_config(KillConfig::default().with_sudo(None).with_signal(15));

        killer.kill_local(77);

        assert_eq!(launcher.launched()[0].argv(), vec!["kill", "-15", "77"]);
    }

    #[test]
    fn launch_failure_is_reported_not_raised() {
        let launcher = Arc::new(RecordingLauncher::failing());
        let observer = Arc::new(RecordingObserver::default());
        let killer = ProcessKiller::new(launcher.clone()).with_observer(observer.clone());

        let outcome = killer.kill_local(99);

        assert!(matches!(outcome, KillOutcome::LaunchFailed(ExecError::Spawn(_))));
        assert!(outcome.attempted());
        assert_eq!(observer.results(), vec![false]);
    }
}

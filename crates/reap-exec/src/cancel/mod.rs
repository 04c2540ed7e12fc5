//! Cancellation of cluster (YARN) applications through generated kill scripts.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use reap_model::ApplicationId;
use tracing::{debug, error, info};

use crate::{
    error::ExecError,
    launch::{LaunchObserver, LaunchReceipt, LaunchSpec, Launcher, launch_observed},
};

mod script;
pub use script::{KILL_SCRIPT_EXT, KillScript};

#[derive(Debug, Clone)]
pub struct CancelConfig {
    /// Environment file sourced by every kill script, if any.
    pub env_file: Option<PathBuf>,
    /// Command the script runs, followed by the application id.
    pub kill_command: String,
    /// Interpreter used to run the script.
    pub shell: String,
    /// Program used to switch to the tenant identity.
    pub sudo: String,
}

impl Default for CancelConfig {
    fn default() -> Self {
        Self {
            env_file: None,
            kill_command: "yarn application -kill".to_string(),
            shell: "sh".to_string(),
            sudo: "sudo".to_string(),
        }
    }
}

impl CancelConfig {
    pub fn with_env_file(mut self, env_file: impl Into<PathBuf>) -> Self {
        self.env_file = Some(env_file.into());
        self
    }

    pub fn with_kill_command(mut self, kill_command: impl Into<String>) -> Self {
        self.kill_command = kill_command.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.kill_command.trim().is_empty() {
            return Err("kill command is empty".into());
        }
        if self.shell.trim().is_empty() {
            return Err("shell is empty".into());
        }
        if self.sudo.trim().is_empty() {
            return Err("sudo program is empty".into());
        }
        Ok(())
    }
}

/// Result of a cancellation attempt. Failures are logged, never returned.
#[derive(Debug)]
pub enum CancelOutcome {
    /// The id list was empty.
    NothingToCancel,
    /// The kill script for `app_id` was spawned.
    Launched {
        app_id: ApplicationId,
        script: PathBuf,
        /// `false` if an existing script was reused.
        written: bool,
        receipt: LaunchReceipt,
    },
    /// Preparing or launching the kill script failed.
    Failed {
        app_id: ApplicationId,
        error: ExecError,
    },
}

/// Writes and runs kill scripts for cluster applications.
pub struct JobCanceller {
    launcher: Arc<dyn Launcher>,
    observer: Option<Arc<dyn LaunchObserver>>,
    config: CancelConfig,
}

impl JobCanceller {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            launcher,
            observer: None,
            config: CancelConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CancelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LaunchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &CancelConfig {
        &self.config
    }

    /// Cancel the most recent application in `app_ids`.
    ///
    /// Earlier ids are treated as superseded. The kill script is written to
    /// `work_dir` only if absent, then run as `sh <script>`, prefixed with
    /// `sudo -u <tenant>` when a tenant is given.
    pub async fn cancel(
        &self,
        app_ids: &[ApplicationId],
        tenant: Option<&str>,
        work_dir: &Path,
    ) -> CancelOutcome {
        let Some(app_id) = app_ids.last() else {
            debug!(target: "reap.exec.cancel", "no application ids; nothing to cancel");
            return CancelOutcome::NothingToCancel;
        };
        if app_ids.len() > 1 {
            debug!(
                target: "reap.exec.cancel",
                %app_id,
                skipped = app_ids.len() - 1,
                "cancelling most recent application only"
            );
        }

        match self.try_cancel(app_id, tenant, work_dir).await {
            Ok((script, written, receipt)) => CancelOutcome::Launched {
                app_id: app_id.clone(),
                script,
                written,
                receipt,
            },
            Err(e) => {
                error!(target: "reap.exec.cancel", %app_id, error = %e, "kill application failed");
                CancelOutcome::Failed {
                    app_id: app_id.clone(),
                    error: e,
                }
            }
        }
    }

    /// The command that runs `script`, as `tenant` if given.
    pub fn run_command(&self, script: &Path, tenant: Option<&str>) -> LaunchSpec {
        let script = script.display().to_string();
        match tenant.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tenant) => LaunchSpec::new(self.config.sudo.clone()).args([
                "-u",
                tenant,
                self.config.shell.as_str(),
                script.as_str(),
            ]),
            None => LaunchSpec::new(self.config.shell.clone()).arg(script),
        }
    }

    async fn try_cancel(
        &self,
        app_id: &ApplicationId,
        tenant: Option<&str>,
        work_dir: &Path,
    ) -> Result<(PathBuf, bool, LaunchReceipt), ExecError> {
        let script = KillScript::new(
            app_id,
            work_dir,
            self.config.env_file.as_deref(),
            &self.config.kill_command,
        );
        let written = script.write_if_absent().await?;
        if written {
            debug!(target: "reap.exec.cancel", path = %script.path().display(), "kill script written");
        } else {
            debug!(target: "reap.exec.cancel", path = %script.path().display(), "reusing existing kill script");
        }

        let spec = self.run_command(script.path(), tenant);
        info!(target: "reap.exec.cancel", %app_id, cmd = %spec, "kill cmd");

        let receipt = launch_observed(self.launcher.as_ref(), self.observer.as_deref(), &spec)?;
        Ok((script.path().to_path_buf(), written, receipt))
    }
}

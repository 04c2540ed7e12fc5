use std::time::Duration;

use reap_model::TaskId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogFetchError {
    #[error("host {0} is not local; a remote log client is required")]
    RemoteHost(String),
    #[error("failed to read log {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("log service unavailable: {0}")]
    Unavailable(String),
}

/// Why a cluster-job cancellation sequence stopped.
#[derive(Error, Debug)]
pub enum TerminationCause {
    #[error("task instance work dir is empty")]
    MissingWorkDir,
    #[error("log fetch failed: {0}")]
    LogFetch(#[from] LogFetchError),
    #[error("log fetch timed out after {0:?}")]
    FetchTimeout(Duration),
    #[error("termination cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
#[error("job cancellation failed for task {task}: {cause}")]
pub struct TerminationError {
    pub task: TaskId,
    #[source]
    pub cause: TerminationCause,
}

impl TerminationError {
    pub fn new(task: TaskId, cause: TerminationCause) -> Self {
        Self { task, cause }
    }

    /// Returns `true` if the task had no work directory to place a kill script in.
    pub fn is_missing_work_dir(&self) -> bool {
        matches!(self.cause, TerminationCause::MissingWorkDir)
    }
}

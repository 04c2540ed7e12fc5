use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{NO_PID, Pid, TaskId};

/// Snapshot of a task instance as seen by the termination workflow.
///
/// Produced by the scheduler; this crate never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    /// Task instance identifier.
    pub id: TaskId,
    /// Local process id, [`NO_PID`] when the process was never started.
    #[serde(default)]
    pub pid: Pid,
    /// Worker host the task ran on.
    pub host: String,
    /// Execution log path on `host`.
    pub log_path: PathBuf,
    /// Execution work directory; kill scripts are placed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
    /// Identity the kill script runs as (`sudo -u <tenant>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl TaskDescriptor {
    pub fn new(id: impl Into<TaskId>, host: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            pid: NO_PID,
            host: host.into(),
            log_path: log_path.into(),
            work_dir: None,
            tenant: None,
        }
    }

    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Returns `true` if a process id was ever recorded.
    pub fn has_pid(&self) -> bool {
        self.pid != NO_PID
    }

    /// Work directory, treating an empty path the same as an absent one.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Tenant, treating an empty or blank string as absent.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_work_dir_reads_as_absent() {
        let task = TaskDescriptor::new(7u64, "worker-1", "/logs/7.log").with_work_dir("");
        assert!(task.work_dir().is_none());

        let task = task.with_work_dir("/data/exec/7");
        assert_eq!(task.work_dir(), Some(Path::new("/data/exec/7")));
    }

    #[test]
    fn blank_tenant_reads_as_absent() {
        let task = TaskDescriptor::new("t", "h", "/l").with_tenant("  ");
        assert!(task.tenant().is_none());
        assert_eq!(task.with_tenant("etl").tenant(), Some("etl"));
    }

    #[test]
    fn pid_defaults_to_sentinel() {
        let task = TaskDescriptor::new("t", "h", "/l");
        assert!(!task.has_pid());
        assert!(task.with_pid(1234).has_pid());
    }

    #[test]
    fn serde_uses_camel_case_and_defaults() {
        let json = r#"{"id":"42","host":"w1","logPath":"/logs/42.log","workDir":"/exec/42"}"#;
        let task: TaskDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId::from("42"));
        assert_eq!(task.pid, NO_PID);
        assert_eq!(task.work_dir(), Some(Path::new("/exec/42")));
        assert!(task.tenant.is_none());

        let back = serde_json::to_string(&task).unwrap();
        assert!(back.contains("\"logPath\""));
        assert!(!back.contains("tenant"));
    }
}

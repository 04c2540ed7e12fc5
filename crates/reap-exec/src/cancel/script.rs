use std::{
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use reap_model::ApplicationId;
use tokio::fs;

use crate::error::ExecError;

/// Extension of generated kill scripts.
pub const KILL_SCRIPT_EXT: &str = "kill";

/// Write-once shell script that cancels one cluster application.
///
/// Lives at `<work_dir>/<app_id>.kill`. Once the file exists it is reused
/// verbatim and never rewritten or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillScript {
    path: PathBuf,
    body: String,
}

impl KillScript {
    pub fn new(
        app_id: &ApplicationId,
        work_dir: &Path,
        env_file: Option<&Path>,
        kill_command: &str,
    ) -> Self {
        Self {
            path: Self::path_for(work_dir, app_id),
            body: render(app_id, env_file, kill_command),
        }
    }

    pub fn path_for(work_dir: &Path, app_id: &ApplicationId) -> PathBuf {
        work_dir.join(format!("{app_id}.{KILL_SCRIPT_EXT}"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Create the script unless it already exists.
    ///
    /// Returns `true` if this call wrote the file. The body is written to a
    /// temp file beside the script and published with a no-clobber rename, so
    /// the script path is either absent or holds a complete body. Concurrent
    /// writers for the same id leave exactly one file behind.
    pub async fn write_if_absent(&self) -> Result<bool, ExecError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| self.script_error(e))?;
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(false);
        }

        let path = self.path.clone();
        let body = self.body.clone();
        tokio::task::spawn_blocking(move || publish(&dir, &path, &body))
            .await
            .map_err(|e| self.script_error(io::Error::other(e)))?
            .map_err(|e| self.script_error(e))
    }

    fn script_error(&self, e: std::io::Error) -> ExecError {
        ExecError::Script {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Write `body` to a temp file in `dir`, then move it to `path` unless `path`
/// already exists. An unpublished temp file is removed on drop.
fn publish(dir: &Path, path: &Path, body: &str) -> io::Result<bool> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".reap-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        // Tenants run the script through sudo, so it must stay world-readable.
        builder.permissions(Permissions::from_mode(0o644));
    }

    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

fn render(app_id: &ApplicationId, env_file: Option<&Path>, kill_command: &str) -> String {
    let mut body = String::with_capacity(128);
    body.push_str("#!/bin/sh\n");
    body.push_str("BASEDIR=$(cd `dirname $0`; pwd)\n");
    body.push_str("cd $BASEDIR\n");
    if let Some(env_file) = env_file {
        body.push_str(&format!("source {}\n", env_file.display()));
    }
    body.push('\n');
    body.push_str(&format!("{kill_command} {app_id}\n"));
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str) -> ApplicationId {
        ApplicationId::new(id).unwrap()
    }

    #[test]
    fn renders_fixed_template() {
        let script = KillScript::new(
            &app("application_1_0001"),
            Path::new("/exec/7"),
            None,
            "yarn application -kill",
        );
        assert_eq!(script.path(), Path::new("/exec/7/application_1_0001.kill"));
        assert_eq!(
            script.body(),
            "#!/bin/sh\n\
             BASEDIR=$(cd `dirname $0`; pwd)\n\
             cd $BASEDIR\n\
             \n\
             yarn application -kill application_1_0001\n"
        );
    }

    #[test]
    fn sources_env_file_when_configured() {
        let script = KillScript::new(
            &app("app_2"),
            Path::new("/w"),
            Some(Path::new("/etc/reap/env.sh")),
            "yarn application -kill",
        );
        let lines: Vec<&str> = script.body().lines().collect();
        assert_eq!(lines[3], "source /etc/reap/env.sh");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "yarn application -kill app_2");
    }

    #[tokio::test]
    async fn second_write_keeps_first_content() {
        let dir = tempfile::tempdir().unwrap();
        let id = app("app_9");

        let first = KillScript::new(&id, dir.path(), None, "yarn application -kill");
        assert!(first.write_if_absent().await.unwrap());

        let second = KillScript::new(&id, dir.path(), None, "other-cli kill");
        assert!(!second.write_if_absent().await.unwrap());

        let on_disk = std::fs::read_to_string(first.path()).unwrap();
        assert_eq!(on_disk, first.body());
    }

    #[tokio::test]
    async fn creates_missing_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let script = KillScript::new(&app("app_1"), &nested, None, "yarn application -kill");

        assert!(script.write_if_absent().await.unwrap());
        assert!(nested.join("app_1.kill").is_file());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_writers_publish_one_complete_script() {
        let dir = tempfile::tempdir().unwrap();
        let id = app("application_3_0007");

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let script = KillScript::new(&id, dir.path(), None, "yarn application -kill");
                tokio::spawn(async move { script.write_if_absent().await.unwrap() })
            })
            .collect();
        let mut written = 0;
        for w in writers {
            if w.await.unwrap() {
                written += 1;
            }
        }

        assert_eq!(written, 1);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["application_3_0007.kill"]);
        let expected = KillScript::new(&id, dir.path(), None, "yarn application -kill");
        assert_eq!(std::fs::read_to_string(expected.path()).unwrap(), expected.body());
    }
}

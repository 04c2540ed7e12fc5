use std::{io::ErrorKind, path::Path};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::LogFetchError;

/// Source of a task's execution log.
#[async_trait]
pub trait LogFetcher: Send + Sync {
    /// Full log text at `path` on `host`. A missing log reads as empty.
    async fn fetch_log(&self, host: &str, path: &Path) -> Result<String, LogFetchError>;
}

/// Reads logs of tasks that ran on this host straight from disk.
///
/// Any other host yields [`LogFetchError::RemoteHost`].
#[derive(Debug, Clone)]
pub struct LocalLogFetcher {
    local_names: Vec<String>,
}

impl LocalLogFetcher {
    pub fn new() -> Self {
        let mut local_names = vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
            "::1".to_string(),
        ];
        if let Some(name) = hostname::get().ok().and_then(|h| h.into_string().ok()) {
            local_names.push(name.to_ascii_lowercase());
        }
        Self { local_names }
    }

    /// Also treat `name` as this host.
    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        self.local_names.push(name.into().to_ascii_lowercase());
        self
    }

    /// A blank host names no machine and is never local.
    pub fn is_local(&self, host: &str) -> bool {
        let host = strip_port(host.trim()).to_ascii_lowercase();
        !host.is_empty() && self.local_names.iter().any(|n| *n == host)
    }
}

impl Default for LocalLogFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogFetcher for LocalLogFetcher {
    async fn fetch_log(&self, host: &str, path: &Path) -> Result<String, LogFetchError> {
        if !self.is_local(host) {
            return Err(LogFetchError::RemoteHost(host.to_string()));
        }

        trace!(target: "reap.core.logs", path = %path.display(), "reading local log");
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(target: "reap.core.logs", path = %path.display(), "log not found; treating as empty");
                Ok(String::new())
            }
            Err(e) => Err(LogFetchError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// `host:port` -> `host`; bare IPv6 addresses are left alone.
fn strip_port(host: &str) -> &str {
    match host.split_once(':') {
        Some((name, port)) if !port.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_names_are_local() {
        let fetcher = LocalLogFetcher::new();
        assert!(fetcher.is_local("localhost"));
        assert!(fetcher.is_local("LOCALHOST:1234"));
        assert!(fetcher.is_local("127.0.0.1:50051"));
        assert!(fetcher.is_local("::1"));
        assert!(!fetcher.is_local("10.1.2.3"));
    }

    #[test]
    fn aliases_extend_local_names() {
        let fetcher = LocalLogFetcher::new().with_alias("Worker-7");
        assert!(fetcher.is_local("worker-7"));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let log = LocalLogFetcher::new().fetch_log("localhost", &path).await.unwrap();
        assert_eq!(log, "line one\nline two\n");
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = LocalLogFetcher::new()
            .fetch_log("127.0.0.1", &dir.path().join("nope.log"))
            .await
            .unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn remote_host_is_refused() {
        let err = LocalLogFetcher::new()
            .fetch_log("10.9.8.7", Path::new("/logs/x.log"))
            .await
            .unwrap_err();
        assert!(matches!(err, LogFetchError::RemoteHost(ref h) if h == "10.9.8.7"));
    }

    #[tokio::test]
    async fn blank_host_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        std::fs::write(&path, "application_1_1\n").unwrap();

        let fetcher = LocalLogFetcher::new();
        assert!(!fetcher.is_local(""));
        assert!(!fetcher.is_local("  "));
        let err = fetcher.fetch_log("", &path).await.unwrap_err();
        assert!(matches!(err, LogFetchError::RemoteHost(ref h) if h.is_empty()));
    }
}

use std::time::Duration;

const DEFAULT_GRACE_MS: u64 = 1_000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct TerminationConfig {
    /// Pause before reading the log, so the killed process can flush its last lines.
    pub grace_period: Duration,
    /// Upper bound on the log fetch; `None` waits for the fetcher indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(DEFAULT_GRACE_MS),
            fetch_timeout: Some(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)),
        }
    }
}

impl TerminationConfig {
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout == Some(Duration::ZERO) {
            return Err("fetch timeout must be positive".into());
        }
        Ok(())
    }
}

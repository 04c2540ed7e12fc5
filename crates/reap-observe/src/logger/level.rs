use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// A validated `EnvFilter` directive, e.g. `info` or `warn,reap.exec=debug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(directive: impl Into<String>) -> Result<Self, LoggerError> {
        let directive = directive.into();
        EnvFilter::try_new(&directive)
            .map_err(|_| LoggerError::InvalidLogLevel(directive.clone()))?;
        Ok(Self(directive))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn to_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.0).map_err(|_| LoggerError::InvalidLogLevel(self.0.clone()))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

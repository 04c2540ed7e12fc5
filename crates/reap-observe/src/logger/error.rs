use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {given:?}; expected one of {expected}")]
    InvalidFormat { given: String, expected: String },
    #[error("journald output needs linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("logger setup failed: {0}")]
    InitializationFailed(String),
    #[error("bad log filter directive {0:?}")]
    InvalidLogLevel(String),
}

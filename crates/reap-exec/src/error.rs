use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("no async runtime available to supervise the child process")]
    NoRuntime,
    #[error("kill script {path}: {reason}")]
    Script { path: String, reason: String },
}

pub type ExecResult<T> = Result<T, ExecError>;

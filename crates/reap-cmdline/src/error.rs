use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CmdlineError {
    #[error("command line is empty: no executable")]
    Empty,
    #[error("{context}: {token:?}")]
    EmbeddedQuote {
        token: String,
        context: &'static str,
    },
    #[error("executable {0:?} cannot be resolved, even after re-tokenizing the command line")]
    Unresolvable(String),
}

pub type CmdlineResult<T> = Result<T, CmdlineError>;

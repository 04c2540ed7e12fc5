//! Task termination: kill the local process, then cancel the cluster
//! applications it left behind, discovered from the task's execution log.
mod error;
pub use error::{LogFetchError, TerminationCause, TerminationError};

mod config;
pub use config::TerminationConfig;

mod logs;
pub use logs::{LocalLogFetcher, LogFetcher};

mod scrape;
pub use scrape::{AppIdExtractor, YarnLogScraper};

mod orchestrator;
pub use orchestrator::{TerminationOrchestrator, TerminationReport};

pub mod prelude {
    pub use crate::{
        AppIdExtractor, LocalLogFetcher, LogFetcher, TerminationConfig, TerminationError,
        TerminationOrchestrator, TerminationReport, YarnLogScraper,
    };
}

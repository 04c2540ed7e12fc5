use std::{future::Future, sync::Arc};

use reap_exec::{CancelOutcome, JobCanceller, KillOutcome, ProcessKiller};
use reap_model::TaskDescriptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::{
    config::TerminationConfig,
    error::{TerminationCause, TerminationError},
    logs::LogFetcher,
    scrape::{AppIdExtractor, YarnLogScraper},
};

/// What [`TerminationOrchestrator::kill`] did.
#[derive(Debug)]
pub struct TerminationReport {
    pub local: KillOutcome,
    /// `None` when no local kill was attempted, so cluster cleanup was skipped.
    pub cluster: Option<Result<CancelOutcome, TerminationError>>,
}

/// Kills a task's local process and cancels the cluster applications
/// recorded in its execution log.
pub struct TerminationOrchestrator {
    killer: ProcessKiller,
    canceller: JobCanceller,
    fetcher: Arc<dyn LogFetcher>,
    extractor: Arc<dyn AppIdExtractor>,
    config: TerminationConfig,
    shutdown: Option<CancellationToken>,
}

impl TerminationOrchestrator {
    pub fn new(killer: ProcessKiller, canceller: JobCanceller, fetcher: Arc<dyn LogFetcher>) -> Self {
        Self {
            killer,
            canceller,
            fetcher,
            extractor: Arc::new(YarnLogScraper),
            config: TerminationConfig::default(),
            shutdown: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn AppIdExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_config(mut self, config: TerminationConfig) -> Self {
        self.config = config;
        self
    }

    /// Abort the grace pause and log fetch once `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Kill the task's process, then cancel its cluster applications.
    ///
    /// Never fails: every fault is logged and recorded in the report. Cluster
    /// cleanup is skipped only when the task never recorded a pid.
    #[instrument(level = "info", skip(self, task), fields(task = %task.id, pid = task.pid))]
    pub async fn kill(&self, task: &TaskDescriptor) -> TerminationReport {
        let local = self.killer.kill_local(task.pid);
        if !local.attempted() {
            return TerminationReport { local, cluster: None };
        }

        let cluster = self.kill_yarn_job(task).await;
        if let Err(e) = &cluster {
            error!(target: "reap.core", error = %e, "kill failed");
        }
        TerminationReport {
            local,
            cluster: Some(cluster),
        }
    }

    /// Find the task's cluster applications in its log and cancel the latest.
    ///
    /// An empty log is not an error. An empty work directory is, and nothing
    /// is written in that case.
    #[instrument(level = "debug", skip(self, task), fields(task = %task.id, host = %task.host))]
    pub async fn kill_yarn_job(&self, task: &TaskDescriptor) -> Result<CancelOutcome, TerminationError> {
        self.run_sequence(task).await.map_err(|cause| {
            error!(target: "reap.core", task = %task.id, error = %cause, "kill yarn job failed");
            TerminationError::new(task.id.clone(), cause)
        })
    }

    async fn run_sequence(&self, task: &TaskDescriptor) -> Result<CancelOutcome, TerminationCause> {
        self.guarded(tokio::time::sleep(self.config.grace_period)).await?;

        let log = self.fetch(task).await?;
        if log.is_empty() {
            info!(target: "reap.core", log = %task.log_path.display(), "execution log is empty; nothing to cancel");
            return Ok(CancelOutcome::NothingToCancel);
        }

        let app_ids = self.extractor.extract(&log);
        debug!(target: "reap.core", found = app_ids.len(), "application ids extracted");

        let Some(work_dir) = task.work_dir() else {
            error!(target: "reap.core", "task instance work dir is empty");
            return Err(TerminationCause::MissingWorkDir);
        };

        if app_ids.is_empty() {
            return Ok(CancelOutcome::NothingToCancel);
        }
        Ok(self.canceller.cancel(&app_ids, task.tenant(), work_dir).await)
    }

    async fn fetch(&self, task: &TaskDescriptor) -> Result<String, TerminationCause> {
        let fetch = self.fetcher.fetch_log(&task.host, &task.log_path);
        let log = match self.config.fetch_timeout {
            Some(limit) => self
                .guarded(tokio::time::timeout(limit, fetch))
                .await?
                .map_err(|_| TerminationCause::FetchTimeout(limit))?,
            None => self.guarded(fetch).await?,
        };
        Ok(log?)
    }

    async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, TerminationCause> {
        match &self.shutdown {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(TerminationCause::Cancelled),
                out = fut => Ok(out),
            },
            None => Ok(fut.await),
        }
    }
}

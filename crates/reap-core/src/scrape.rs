use std::sync::LazyLock;

use regex::Regex;
use reap_model::ApplicationId;
use tracing::info;

static YARN_APP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"application_\d+_\d+").expect("application id pattern is valid"));

/// Pulls cluster application ids out of free-text log output.
pub trait AppIdExtractor: Send + Sync {
    /// Ids in order of first appearance, without duplicates.
    fn extract(&self, log: &str) -> Vec<ApplicationId>;
}

/// Finds YARN ids of the form `application_<cluster-ts>_<seq>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YarnLogScraper;

impl AppIdExtractor for YarnLogScraper {
    fn extract(&self, log: &str) -> Vec<ApplicationId> {
        let mut ids: Vec<ApplicationId> = Vec::new();
        for line in log.lines() {
            for m in YARN_APP_ID.find_iter(line) {
                let Ok(id) = ApplicationId::new(m.as_str()) else {
                    continue;
                };
                if !ids.contains(&id) {
                    info!(target: "reap.core.scrape", app_id = %id, "found application id");
                    ids.push(id);
                }
            }
        }
        ids
    }
}

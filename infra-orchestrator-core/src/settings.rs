//! Tunables of the aggregation runs

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// GitHub 列表接口单页上限
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreSettings {
    /// Leading entries of the filtered repository list that receive stats
    pub stats_window: usize,
    /// Most recently updated repositories queried for the commit feed
    pub commit_repo_fanout: usize,
    /// Commits fetched from each of those repositories
    pub commits_per_repo: u32,
    /// Maximum length of the published commit feed
    pub commit_feed_limit: usize,
    /// Retries for transient HTTP failures
    pub max_retries: u32,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            stats_window: 50,
            commit_repo_fanout: 10,
            commits_per_repo: 10,
            commit_feed_limit: 50,
            max_retries: 2,
        }
    }
}

impl CoreSettings {
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("statsWindow", self.stats_window),
            ("commitRepoFanout", self.commit_repo_fanout),
            ("commitFeedLimit", self.commit_feed_limit),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(CoreError::ValidationError(format!(
                "{field} must be at least 1"
            )));
        }
        if self.commits_per_repo == 0 || self.commits_per_repo > MAX_PAGE_SIZE {
            return Err(CoreError::ValidationError(format!(
                "commitsPerRepo must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.max_retries > 10 {
            return Err(CoreError::ValidationError(
                "maxRetries must be at most 10".to_string(),
            ));
        }
        Ok(())
    }
}

//! Aggregation run reports

use serde::{Deserialize, Serialize};

/// Outcome of a stats enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    /// Repositories that received stats in this run
    pub enriched: usize,
    /// Repositories skipped because their stats were already cached
    pub cached: usize,
    /// Repositories whose probes failed (stats left absent)
    pub failed: usize,
    /// Another run was in progress; nothing was done
    pub skipped_busy: bool,
}

/// Outcome of a commit feed aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitFeedReport {
    /// Repositories queried
    pub sources: usize,
    /// Repositories whose fetch failed and contributed nothing
    pub failed_sources: usize,
    /// Commits published
    pub commits: usize,
    pub skipped_busy: bool,
}

/// A credential whose zone listing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFetchFailure {
    pub account_id: String,
    pub reason: String,
}

/// Outcome of a zone aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRefreshReport {
    /// Credentials fetched and published
    pub fetched: usize,
    /// Credentials skipped because their slot was cached
    pub cached: usize,
    pub failures: Vec<ZoneFetchFailure>,
    pub skipped_busy: bool,
}

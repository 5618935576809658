//! Bulk record rewrite type definitions

use serde::{Deserialize, Serialize};

use infra_orchestrator_provider::DnsRecordType;

fn default_record_type() -> DnsRecordType {
    DnsRecordType::A
}

/// Rewrite every record whose content equals `old_value` to `new_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRewriteRequest {
    pub old_value: String,
    pub new_value: String,
    #[serde(default = "default_record_type")]
    pub record_type: DnsRecordType,
}

impl BulkRewriteRequest {
    /// Address-record rewrite (`A`)
    pub fn address(old_value: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            old_value: old_value.into(),
            new_value: new_value.into(),
            record_type: default_record_type(),
        }
    }
}

/// A zone or record the rewrite could not process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub zone_id: String,
    pub zone_name: String,
    /// `None` when the whole zone failed (listing, missing credential)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRewriteReport {
    /// Records confirmed updated
    pub updated_records: usize,
    /// Zones with at least one confirmed update
    pub touched_zones: usize,
    /// Zones whose records could be listed
    pub zones_scanned: usize,
    pub failures: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BulkRewriteOutcome {
    /// The candidate zone set was empty; no request was issued
    NothingToDo,
    Completed(BulkRewriteReport),
}

/// Progress of the rewrite executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BulkState {
    #[default]
    Idle,
    Validating,
    /// `index` is 1-based
    Running { index: usize, total: usize },
    Done(BulkRewriteReport),
}

impl BulkState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Validating | Self::Running { .. })
    }
}

//! 类型定义模块

mod bulk;
mod report;
mod repository;
mod zone;

pub use bulk::{BulkFailure, BulkRewriteOutcome, BulkRewriteReport, BulkRewriteRequest, BulkState};
pub use report::{CommitFeedReport, EnrichmentReport, ZoneFetchFailure, ZoneRefreshReport};
pub use repository::{
    BatchDeleteFailure, BatchDeleteResult, FeedCommit, RepoFilter, RepoKey, RepoSort, RepoStats,
    RepositoryPatch, Visibility,
};
pub use zone::{AppZone, ZoneFilter};

// Re-export provider 库的公共类型
pub use infra_orchestrator_provider::{
    Commit, CreateDnsRecordRequest, CreateRepoRequest, DnsAccount, DnsRecord, DnsRecordType,
    PageProbe, ProbeKind, Repository, UpdateDnsRecordRequest, User, Zone, ZoneOwner, ZoneStatus,
};

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    Commit, CreateDnsRecordRequest, CreateRepoRequest, DnsAccount, DnsRecord, PageProbe,
    ProbeKind, Repository, UpdateDnsRecordRequest, User, Zone,
};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: Option<u16>,
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 仓库 `owner/name`
    pub repository: Option<String>,
    /// 记录名称（用于 `RecordExists` 等错误）
    pub record_name: Option<String>,
    /// 记录 ID（用于 `RecordNotFound` 等错误）
    pub record_id: Option<String>,
    /// Zone（用于 `DomainNotFound` 等错误）
    pub zone: Option<String>,
    /// 剩余调用配额（`x-ratelimit-remaining`）
    pub rate_limit_remaining: Option<u64>,
}

impl ErrorContext {
    pub fn repository(owner: &str, name: &str) -> Self {
        Self {
            repository: Some(format!("{owner}/{name}")),
            ..Self::default()
        }
    }

    pub fn zone(zone_id: &str) -> Self {
        Self {
            zone: Some(zone_id.to_string()),
            ..Self::default()
        }
    }

    pub fn record(zone_id: &str, record_id: Option<&str>, record_name: Option<&str>) -> Self {
        Self {
            zone: Some(zone_id.to_string()),
            record_id: record_id.map(str::to_string),
            record_name: record_name.map(str::to_string),
            ..Self::default()
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code.or_else(|| raw.status.map(|s| s.to_string())),
            raw_message: raw.message,
        }
    }
}

/// Source-hosting service (repositories, branches, commits).
///
/// One HTTP call per logical operation; implementations hold their own token.
#[async_trait]
pub trait RepoService: Send + Sync {
    /// Service identifier.
    fn id(&self) -> &'static str;

    /// The authenticated user.
    async fn get_user(&self) -> Result<User>;

    /// Every repository the token can see, newest update first.
    async fn list_repos(&self) -> Result<Vec<Repository>>;

    /// Create a repository owned by the authenticated user.
    async fn create_repo(&self, req: &CreateRepoRequest) -> Result<Repository>;

    /// Rename a repository and return its confirmed new state.
    async fn rename_repo(&self, owner: &str, name: &str, new_name: &str) -> Result<Repository>;

    /// Delete a repository.
    async fn delete_repo(&self, owner: &str, name: &str) -> Result<()>;

    /// Single-item page request against a listing endpoint.
    ///
    /// Returns [`ProviderError::EmptyRepository`] when the repository has no commits yet.
    async fn probe_count(&self, owner: &str, name: &str, kind: ProbeKind) -> Result<PageProbe>;

    /// One page of the commit history, newest first.
    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>>;
}

/// DNS-management service (zones, records).
///
/// Every call carries the credential it runs under, so one client serves any
/// number of accounts.
#[async_trait]
pub trait DnsService: Send + Sync {
    /// Service identifier.
    fn id(&self) -> &'static str;

    /// Check that the credential is accepted.
    async fn validate_account(&self, account: &DnsAccount) -> Result<bool>;

    /// All zones visible to the credential.
    async fn list_zones(&self, account: &DnsAccount) -> Result<Vec<Zone>>;

    /// All records of a zone.
    async fn list_records(&self, account: &DnsAccount, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record.
    async fn create_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        req: &CreateDnsRecordRequest,
    ) -> Result<DnsRecord>;

    /// Replace a record.
    async fn update_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord>;

    /// Delete a record.
    async fn delete_record(&self, account: &DnsAccount, zone_id: &str, record_id: &str)
    -> Result<()>;
}

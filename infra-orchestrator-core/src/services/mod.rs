//! 业务逻辑服务层

mod account_service;
mod bulk_rewrite_service;
mod commit_feed_service;
mod dns_record_service;
mod repository_service;
mod stats_service;
mod zone_service;

pub use account_service::AccountService;
pub use bulk_rewrite_service::BulkRewriteService;
pub use commit_feed_service::CommitFeedService;
pub use dns_record_service::DnsRecordService;
pub use repository_service::RepositoryService;
pub use stats_service::StatsService;
pub use zone_service::ZoneService;

use std::sync::Arc;

use infra_orchestrator_provider::{DnsAccount, DnsService, ProviderError, RepoService};

use crate::error::{CoreError, CoreResult};
use crate::settings::CoreSettings;
use crate::store::SharedStore;

/// 服务上下文 - 持有所有依赖
///
/// 平台层创建此上下文，并注入远程服务实现和共享 store。
pub struct ServiceContext {
    /// 代码托管服务
    pub repo_service: Arc<dyn RepoService>,
    /// DNS 服务（凭证随调用传入）
    pub dns_service: Arc<dyn DnsService>,
    /// 共享 store
    pub store: SharedStore,
    /// 运行参数
    pub settings: CoreSettings,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        repo_service: Arc<dyn RepoService>,
        dns_service: Arc<dyn DnsService>,
        store: SharedStore,
        settings: CoreSettings,
    ) -> Self {
        Self {
            repo_service,
            dns_service,
            store,
            settings,
        }
    }

    /// 获取已配置的 DNS 账户（克隆，调用方不持锁）
    pub async fn account(&self, account_id: &str) -> CoreResult<DnsAccount> {
        self.store
            .read()
            .await
            .account(account_id)
            .cloned()
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// 结束会话：清空 store
    pub async fn end_session(&self) {
        self.store.write().await.clear();
        log::warn!("Source-hosting token rejected, session cleared");
    }

    /// 处理代码托管服务的错误
    ///
    /// 凭证失效时结束会话并返回 `SessionExpired`；其余错误原样包装。
    pub async fn handle_repo_error(&self, err: ProviderError) -> CoreError {
        if err.is_auth_failure() {
            self.end_session().await;
            return CoreError::SessionExpired;
        }
        CoreError::Provider(err)
    }
}

/// 按 `is_expected` 选择日志级别
pub(crate) fn log_failure(context: &str, err: &ProviderError) {
    if err.is_expected() {
        log::warn!("{context}: {err}");
    } else {
        log::error!("{context}: {err}");
    }
}

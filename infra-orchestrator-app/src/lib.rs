//! Application bootstrap for Infra Orchestrator.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (service injection)
//! and `AppConfig` (file/environment configuration).

pub mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use infra_orchestrator_core::error::{CoreError, CoreResult};
use infra_orchestrator_core::services::{
    AccountService, BulkRewriteService, CommitFeedService, DnsRecordService, RepositoryService,
    ServiceContext, StatsService, ZoneService,
};
use infra_orchestrator_core::types::{CommitFeedReport, EnrichmentReport, ZoneRefreshReport};
use infra_orchestrator_core::{CoreSettings, ReconciliationStore, SharedStore};
use infra_orchestrator_provider::{DnsAccount, DnsService, RepoService, User};
use serde::Serialize;

pub use config::{AccountConfig, AppConfig, ConfigError};

/// Result of one full synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Repositories in the store after the refresh
    pub repositories: usize,
    pub stats: EnrichmentReport,
    pub feed: CommitFeedReport,
    pub zones: ZoneRefreshReport,
}

/// Application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (remote services, store, settings)
    pub ctx: Arc<ServiceContext>,
    pub account_service: AccountService,
    pub repository_service: RepositoryService,
    pub stats_service: StatsService,
    pub commit_feed_service: CommitFeedService,
    pub zone_service: ZoneService,
    pub dns_record_service: DnsRecordService,
    pub bulk_rewrite_service: BulkRewriteService,
    /// Whether account restoration has completed
    pub restore_completed: AtomicBool,
}

impl AppState {
    /// Startup sequence: account restoration → user profile.
    pub async fn run_startup(&self, accounts: Vec<DnsAccount>) -> CoreResult<User> {
        self.run_account_restore(accounts).await;
        let user = self.repository_service.load_user().await?;
        log::info!("Signed in as {}", user.login);
        Ok(user)
    }

    /// Restore DNS accounts. Sets `restore_completed` to `true` when done.
    pub async fn run_account_restore(&self, accounts: Vec<DnsAccount>) -> usize {
        let total = accounts.len();
        let restored = self.account_service.restore_accounts(accounts).await.len();
        if restored < total {
            log::warn!("{} of {total} account(s) were skipped", total - restored);
        }
        self.restore_completed.store(true, Ordering::SeqCst);
        restored
    }

    /// Refresh repositories, then run stats, commit feed and zone aggregation.
    ///
    /// Zone aggregation does not depend on the source-hosting token; a session
    /// expiry still surfaces as an error.
    pub async fn sync(&self) -> CoreResult<SyncSummary> {
        let repositories = self.repository_service.refresh_repositories().await?;

        let (stats, feed, zones) = tokio::join!(
            self.stats_service.enrich(),
            self.commit_feed_service.refresh(),
            self.zone_service.refresh_zones(false),
        );

        Ok(SyncSummary {
            repositories,
            stats: stats?,
            feed: feed?,
            zones,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.ctx.store
    }
}

/// Builder for constructing `AppState`.
///
/// # Required
/// - `repo_service` — source-hosting client
/// - `dns_service` — DNS client
///
/// # Optional
/// - `store` — defaults to an empty `ReconciliationStore`
/// - `settings` — defaults to `CoreSettings::default()`
pub struct AppStateBuilder {
    repo_service: Option<Arc<dyn RepoService>>,
    dns_service: Option<Arc<dyn DnsService>>,
    store: Option<SharedStore>,
    settings: Option<CoreSettings>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repo_service: None,
            dns_service: None,
            store: None,
            settings: None,
        }
    }

    #[must_use]
    pub fn repo_service(mut self, service: Arc<dyn RepoService>) -> Self {
        self.repo_service = Some(service);
        self
    }

    #[must_use]
    pub fn dns_service(mut self, service: Arc<dyn DnsService>) -> Self {
        self.dns_service = Some(service);
        self
    }

    #[must_use]
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: CoreSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if a required service is missing
    /// or the settings are invalid.
    pub fn build(self) -> CoreResult<AppState> {
        let repo_service = self
            .repo_service
            .ok_or_else(|| CoreError::ValidationError("repo_service is required".to_string()))?;
        let dns_service = self
            .dns_service
            .ok_or_else(|| CoreError::ValidationError("dns_service is required".to_string()))?;
        let store = self.store.unwrap_or_else(ReconciliationStore::shared);
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let ctx = Arc::new(ServiceContext::new(
            repo_service,
            dns_service,
            store,
            settings,
        ));

        Ok(AppState {
            account_service: AccountService::new(Arc::clone(&ctx)),
            repository_service: RepositoryService::new(Arc::clone(&ctx)),
            stats_service: StatsService::new(Arc::clone(&ctx)),
            commit_feed_service: CommitFeedService::new(Arc::clone(&ctx)),
            zone_service: ZoneService::new(Arc::clone(&ctx)),
            dns_record_service: DnsRecordService::new(Arc::clone(&ctx)),
            bulk_rewrite_service: BulkRewriteService::new(Arc::clone(&ctx)),
            ctx,
            restore_completed: AtomicBool::new(false),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

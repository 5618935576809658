//! 仓库统计（分支数、提交数）补全
//!
//! 对过滤后列表的前 `stats_window` 个仓库，各发两次单条分页请求，
//! 由最后一页页码推出数量。已有统计的仓库跳过。

use std::sync::Arc;

use infra_orchestrator_provider::{ProbeKind, ProviderError, Repository};

use crate::error::CoreResult;
use crate::services::{ServiceContext, log_failure};
use crate::types::{EnrichmentReport, RepoKey, RepoStats};
use crate::utils::busy::BusyFlag;

pub struct StatsService {
    ctx: Arc<ServiceContext>,
    busy: BusyFlag,
}

impl StatsService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.busy.is_busy()
    }

    /// 为工作集中缺少统计的仓库补全统计
    ///
    /// 仓库逐个处理；单个失败只记录日志。运行中再次调用直接返回 `skipped_busy`。
    pub async fn enrich(&self) -> CoreResult<EnrichmentReport> {
        let Some(_guard) = self.busy.try_acquire() else {
            log::debug!("Stats enrichment already running, skipped");
            return Ok(EnrichmentReport {
                skipped_busy: true,
                ..EnrichmentReport::default()
            });
        };

        let working_set: Vec<Repository> = {
            let store = self.ctx.store.read().await;
            store
                .filtered_repositories()
                .into_iter()
                .take(self.ctx.settings.stats_window)
                .collect()
        };

        let mut report = EnrichmentReport::default();
        for repo in working_set {
            let key = RepoKey::of(&repo);
            if self.ctx.store.read().await.has_stats(&key) {
                report.cached += 1;
                continue;
            }

            match self.probe(&key).await {
                Ok(stats) => {
                    if self.ctx.store.write().await.insert_stats(key, stats) {
                        report.enriched += 1;
                    }
                }
                Err(e) if e.is_auth_failure() => {
                    return Err(self.ctx.handle_repo_error(e).await);
                }
                Err(e) => {
                    log_failure(&format!("Failed to load stats for {key}"), &e);
                    report.failed += 1;
                }
            }
        }

        log::debug!(
            "Stats enrichment done: {} enriched, {} cached, {} failed",
            report.enriched,
            report.cached,
            report.failed
        );
        Ok(report)
    }

    /// 并发探测分支数与提交数
    async fn probe(&self, key: &RepoKey) -> Result<RepoStats, ProviderError> {
        let (branches, commits) = tokio::join!(
            self.count(key, ProbeKind::Branches),
            self.count(key, ProbeKind::Commits)
        );
        Ok(RepoStats {
            branches: branches?,
            commits: commits?,
        })
    }

    /// 空仓库 → 0；无分页信息 → 1；否则为最后一页页码
    async fn count(&self, key: &RepoKey, kind: ProbeKind) -> Result<u32, ProviderError> {
        match self
            .ctx
            .repo_service
            .probe_count(&key.owner, &key.name, kind)
            .await
        {
            Ok(probe) => Ok(probe.count()),
            Err(ProviderError::EmptyRepository { .. }) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::error::CoreError;
    use crate::settings::CoreSettings;
    use crate::test_utils::{
        ProbeScript, create_test_context, create_test_context_with, repo,
    };
    use infra_orchestrator_provider::PageProbe;

    #[tokio::test]
    async fn derives_counts_from_probe_outcomes() {
        let h = create_test_context();
        h.store.write().await.replace_repositories(vec![
            repo("octo", "empty", 1),
            repo("octo", "small", 2),
            repo("octo", "large", 3),
        ]);
        for kind in [ProbeKind::Branches, ProbeKind::Commits] {
            h.repos.set_probe("octo/empty", kind, ProbeScript::Empty).await;
        }
        h.repos
            .set_probe(
                "octo/large",
                ProbeKind::Commits,
                ProbeScript::Page(PageProbe::LastPage(347)),
            )
            .await;

        let report = StatsService::new(h.ctx.clone()).enrich().await.unwrap();

        assert_eq!(report.enriched, 3);
        let store = h.store.read().await;
        assert_eq!(
            store.stats(&RepoKey::new("octo", "empty")),
            Some(RepoStats { branches: 0, commits: 0 })
        );
        assert_eq!(
            store.stats(&RepoKey::new("octo", "small")),
            Some(RepoStats { branches: 1, commits: 1 })
        );
        assert_eq!(
            store.stats(&RepoKey::new("octo", "large")),
            Some(RepoStats { branches: 1, commits: 347 })
        );
    }

    #[tokio::test]
    async fn second_run_issues_no_probes() {
        let h = create_test_context();
        h.store
            .write()
            .await
            .replace_repositories(vec![repo("octo", "a", 1), repo("octo", "b", 2)]);
        let svc = StatsService::new(h.ctx.clone());

        svc.enrich().await.unwrap();
        let after_first = h.repos.probe_calls.load(Ordering::SeqCst);
        assert_eq!(after_first, 4);

        let report = svc.enrich().await.unwrap();
        assert_eq!(h.repos.probe_calls.load(Ordering::SeqCst), after_first);
        assert_eq!(report.cached, 2);
        assert_eq!(report.enriched, 0);
    }

    #[tokio::test]
    async fn failure_leaves_stats_absent_and_continues() {
        let h = create_test_context();
        h.store
            .write()
            .await
            .replace_repositories(vec![repo("octo", "bad", 2), repo("octo", "good", 1)]);
        h.repos
            .set_probe("octo/bad", ProbeKind::Branches, ProbeScript::Fail)
            .await;

        let report = StatsService::new(h.ctx.clone()).enrich().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.enriched, 1);
        let store = h.store.read().await;
        assert!(!store.has_stats(&RepoKey::new("octo", "bad")));
        assert!(store.has_stats(&RepoKey::new("octo", "good")));
    }

    #[tokio::test]
    async fn only_the_window_is_enriched() {
        let h = create_test_context_with(CoreSettings {
            stats_window: 2,
            ..CoreSettings::default()
        });
        h.store.write().await.replace_repositories(vec![
            repo("octo", "oldest", 1),
            repo("octo", "middle", 2),
            repo("octo", "newest", 3),
        ]);

        StatsService::new(h.ctx.clone()).enrich().await.unwrap();

        let store = h.store.read().await;
        assert!(store.has_stats(&RepoKey::new("octo", "newest")));
        assert!(store.has_stats(&RepoKey::new("octo", "middle")));
        assert!(!store.has_stats(&RepoKey::new("octo", "oldest")));
    }

    #[tokio::test]
    async fn busy_run_is_skipped() {
        let h = create_test_context();
        h.store
            .write()
            .await
            .replace_repositories(vec![repo("octo", "a", 1)]);
        let svc = StatsService::new(h.ctx.clone());

        let _held = svc.busy.try_acquire();
        let report = svc.enrich().await.unwrap();

        assert!(report.skipped_busy);
        assert_eq!(h.repos.probe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn revoked_token_ends_session() {
        let h = create_test_context();
        h.store
            .write()
            .await
            .replace_repositories(vec![repo("octo", "a", 1)]);
        h.repos.revoke_token();

        let err = StatsService::new(h.ctx.clone()).enrich().await.unwrap_err();

        assert!(matches!(err, CoreError::SessionExpired));
        assert!(h.store.read().await.repositories().is_empty());
    }
}

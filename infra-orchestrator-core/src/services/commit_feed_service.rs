//! 最近提交聚合
//!
//! 取最近更新的若干仓库，并发拉取各自最新提交，合并后按时间倒序截断发布。

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use infra_orchestrator_provider::{ProviderError, Repository};

use crate::error::CoreResult;
use crate::services::{ServiceContext, log_failure};
use crate::types::{CommitFeedReport, FeedCommit, RepoKey};
use crate::utils::busy::BusyFlag;

pub struct CommitFeedService {
    ctx: Arc<ServiceContext>,
    busy: BusyFlag,
}

impl CommitFeedService {
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

    /// 重建提交流
    ///
    /// 单个仓库失败时贡献空列表；全部请求结束后才合并。
    pub async fn refresh(&self) -> CoreResult<CommitFeedReport> {
        let Some(_guard) = self.busy.try_acquire() else {
            log::debug!("Commit feed refresh already running, skipped");
            return Ok(CommitFeedReport {
                skipped_busy: true,
                ..CommitFeedReport::default()
            });
        };

        let settings = &self.ctx.settings;
        let sources = {
            let store = self.ctx.store.read().await;
            most_recently_updated(store.repositories(), settings.commit_repo_fanout)
        };

        let fetches = sources.iter().map(|key| async move {
            let result = self
                .ctx
                .repo_service
                .list_commits(&key.owner, &key.name, 1, settings.commits_per_repo)
                .await;
            (key, result)
        });

        let mut report = CommitFeedReport {
            sources: sources.len(),
            ..CommitFeedReport::default()
        };
        let mut feed = Vec::new();
        for (key, result) in join_all(fetches).await {
            match result {
                Ok(commits) => feed.extend(commits.into_iter().map(|commit| FeedCommit {
                    commit,
                    repo: key.clone(),
                })),
                // 空仓库没有提交，不算失败
                Err(ProviderError::EmptyRepository { .. }) => {}
                Err(e) if e.is_auth_failure() => {
                    return Err(self.ctx.handle_repo_error(e).await);
                }
                Err(e) => {
                    log_failure(&format!("Failed to load commits of {key}"), &e);
                    report.failed_sources += 1;
                }
            }
        }

        let feed = rank(feed, settings.commit_feed_limit);
        {
            let mut store = self.ctx.store.write().await;
            store.replace_commits(feed);
            report.commits = store.commits().len();
        }

        log::debug!(
            "Commit feed rebuilt from {} repositories ({} failed): {} commits",
            report.sources,
            report.failed_sources,
            report.commits
        );
        Ok(report)
    }
}

/// 按更新时间倒序取前 `limit` 个仓库
fn most_recently_updated(repos: &[Repository], limit: usize) -> Vec<RepoKey> {
    let mut sorted: Vec<&Repository> = repos.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.into_iter().take(limit).map(RepoKey::of).collect()
}

/// 稳定排序（作者时间倒序，无时间的排最后），按 sha 去重后截断
///
/// fork 之间共享历史，同一 sha 只保留排在前面的一条。
fn rank(mut feed: Vec<FeedCommit>, limit: usize) -> Vec<FeedCommit> {
    feed.sort_by(|a, b| b.commit.authored_at.cmp(&a.commit.authored_at));
    let mut seen = HashSet::with_capacity(feed.len());
    feed.retain(|c| seen.insert(c.commit.sha.clone()));
    feed.truncate(limit);
    feed
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::settings::CoreSettings;
    use crate::test_utils::{commit, create_test_context, create_test_context_with, repo};

    #[test]
    fn ranking_is_stable_and_newest_first() {
        let key = RepoKey::new("octo", "a");
        let tag = |sha: &str, minutes| FeedCommit {
            commit: commit(sha, minutes),
            repo: key.clone(),
        };
        let mut undated = tag("none", 0);
        undated.commit.authored_at = None;

        let ranked = rank(
            vec![tag("old", 1), undated, tag("tie-1", 5), tag("tie-2", 5), tag("new", 9)],
            4,
        );

        let shas: Vec<&str> = ranked.iter().map(|c| c.commit.sha.as_str()).collect();
        assert_eq!(shas, ["new", "tie-1", "tie-2", "old"]);
    }

    #[tokio::test]
    async fn merges_sources_and_tolerates_failures() {
        let h = create_test_context();
        h.store.write().await.replace_repositories(vec![
            repo("octo", "a", 1),
            repo("octo", "b", 2),
            repo("octo", "c", 3),
        ]);
        h.repos
            .set_commits("octo/a", vec![commit("a1", 30), commit("a2", 10)])
            .await;
        h.repos
            .set_commits("octo/b", vec![commit("b1", 20)])
            .await;
        h.repos.fail_repo("octo/c").await;

        let report = CommitFeedService::new(h.ctx.clone())
            .refresh()
            .await
            .unwrap();

        assert_eq!(report.sources, 3);
        assert_eq!(report.failed_sources, 1);
        let store = h.store.read().await;
        let feed: Vec<(&str, String)> = store
            .commits()
            .iter()
            .map(|c| (c.commit.sha.as_str(), c.repo.name.clone()))
            .collect();
        assert_eq!(
            feed,
            [
                ("a1", "a".to_string()),
                ("b1", "b".to_string()),
                ("a2", "a".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn respects_fanout_and_feed_limit() {
        let h = create_test_context_with(CoreSettings {
            commit_repo_fanout: 2,
            commits_per_repo: 3,
            commit_feed_limit: 4,
            ..CoreSettings::default()
        });
        let repos: Vec<_> = (1..=5).map(|i| repo("octo", &format!("r{i}"), i)).collect();
        h.store.write().await.replace_repositories(repos);
        for i in 1..=5 {
            let commits = (0..5)
                .map(|n| commit(&format!("r{i}-{n}"), i64::from(i * 10 + n)))
                .collect();
            h.repos.set_commits(&format!("octo/r{i}"), commits).await;
        }

        let report = CommitFeedService::new(h.ctx.clone())
            .refresh()
            .await
            .unwrap();

        assert_eq!(h.repos.commit_calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.commits, 4);
        let store = h.store.read().await;
        assert!(
            store
                .commits()
                .iter()
                .all(|c| c.repo.name == "r5" || c.repo.name == "r4")
        );
        assert!(
            store
                .commits()
                .windows(2)
                .all(|w| w[0].commit.authored_at >= w[1].commit.authored_at)
        );
    }

    #[tokio::test]
    async fn shared_history_is_deduplicated_before_the_limit() {
        let h = create_test_context_with(CoreSettings {
            commit_feed_limit: 3,
            ..CoreSettings::default()
        });
        h.store.write().await.replace_repositories(vec![
            repo("octo", "upstream", 2),
            repo("fork", "upstream", 1),
        ]);
        h.repos
            .set_commits("octo/upstream", vec![commit("s1", 30), commit("s2", 20)])
            .await;
        h.repos
            .set_commits(
                "fork/upstream",
                vec![commit("s1", 30), commit("s2", 20), commit("f3", 10)],
            )
            .await;

        let report = CommitFeedService::new(h.ctx.clone())
            .refresh()
            .await
            .unwrap();

        let store = h.store.read().await;
        let shas: Vec<&str> = store.commits().iter().map(|c| c.commit.sha.as_str()).collect();
        assert_eq!(shas, ["s1", "s2", "f3"]);
        assert_eq!(report.commits, 3);
        assert_eq!(store.commits()[0].repo, RepoKey::new("octo", "upstream"));
    }

    #[tokio::test]
    async fn feed_never_exceeds_default_limit() {
        let h = create_test_context();
        let repos: Vec<_> = (1..=10).map(|i| repo("octo", &format!("r{i}"), i)).collect();
        h.store.write().await.replace_repositories(repos);
        for i in 1..=10 {
            let commits = (0..10)
                .map(|n| commit(&format!("r{i}-{n}"), i64::from(i * 100 + n)))
                .collect();
            h.repos.set_commits(&format!("octo/r{i}"), commits).await;
        }

        let report = CommitFeedService::new(h.ctx.clone())
            .refresh()
            .await
            .unwrap();

        assert_eq!(report.commits, 50);
        assert_eq!(h.store.read().await.commits().len(), 50);
    }
}

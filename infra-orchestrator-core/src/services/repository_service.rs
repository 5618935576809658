//! 仓库管理服务

use std::sync::Arc;

use infra_orchestrator_provider::{CreateRepoRequest, Repository, User};

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::{BatchDeleteFailure, BatchDeleteResult, RepoKey, RepositoryPatch};
use crate::utils::validation::validate_repo_name;

/// 仓库管理服务
///
/// 本地状态只在远程确认成功后更新。
pub struct RepositoryService {
    ctx: Arc<ServiceContext>,
}

impl RepositoryService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 加载当前用户
    pub async fn load_user(&self) -> CoreResult<User> {
        match self.ctx.repo_service.get_user().await {
            Ok(user) => {
                self.ctx.store.write().await.set_user(user.clone());
                Ok(user)
            }
            Err(e) => Err(self.ctx.handle_repo_error(e).await),
        }
    }

    /// 重新拉取仓库列表并整体替换，返回仓库数量
    pub async fn refresh_repositories(&self) -> CoreResult<usize> {
        match self.ctx.repo_service.list_repos().await {
            Ok(repos) => {
                let mut store = self.ctx.store.write().await;
                store.replace_repositories(repos);
                Ok(store.repositories().len())
            }
            Err(e) => Err(self.ctx.handle_repo_error(e).await),
        }
    }

    /// 创建仓库，成功后插入列表最前
    pub async fn create_repository(&self, request: CreateRepoRequest) -> CoreResult<Repository> {
        validate_repo_name(&request.name)?;
        let request = CreateRepoRequest {
            name: request.name.trim().to_string(),
            ..request
        };

        match self.ctx.repo_service.create_repo(&request).await {
            Ok(repo) => {
                self.ctx.store.write().await.insert_repository(repo.clone());
                log::info!("Repository created: {}", repo.full_name());
                Ok(repo)
            }
            Err(e) => Err(self.ctx.handle_repo_error(e).await),
        }
    }

    /// 重命名仓库，成功后按确认后的状态更新本地条目
    pub async fn rename_repository(&self, key: &RepoKey, new_name: &str) -> CoreResult<Repository> {
        let new_name = new_name.trim();
        validate_repo_name(new_name)?;
        if new_name == key.name {
            return Err(CoreError::ValidationError(
                "New name is identical to the current name".to_string(),
            ));
        }
        self.ensure_known(key).await?;

        let confirmed = match self
            .ctx
            .repo_service
            .rename_repo(&key.owner, &key.name, new_name)
            .await
        {
            Ok(repo) => repo,
            Err(e) => return Err(self.ctx.handle_repo_error(e).await),
        };

        let mut store = self.ctx.store.write().await;
        let new_key = store.apply_repository_patch(key, RepositoryPatch::confirmed(&confirmed))?;
        log::info!("Repository renamed: {key} -> {new_key}");
        store
            .repository(&new_key)
            .cloned()
            .ok_or_else(|| CoreError::RepositoryNotFound(new_key.to_string()))
    }

    /// 删除仓库
    pub async fn delete_repository(&self, key: &RepoKey) -> CoreResult<()> {
        self.ensure_known(key).await?;
        if let Err(e) = self.ctx.repo_service.delete_repo(&key.owner, &key.name).await {
            return Err(self.ctx.handle_repo_error(e).await);
        }
        self.ctx.store.write().await.remove_repository(key);
        log::info!("Repository deleted: {key}");
        Ok(())
    }

    /// 依次删除已选中的仓库
    ///
    /// 单个失败会被记录并继续；凭证失效则立即结束会话。
    pub async fn delete_selected(&self) -> CoreResult<BatchDeleteResult> {
        let selected = self.ctx.store.read().await.selected();
        let mut result = BatchDeleteResult::default();

        for key in selected {
            match self.ctx.repo_service.delete_repo(&key.owner, &key.name).await {
                Ok(()) => {
                    self.ctx.store.write().await.remove_repository(&key);
                    result.success_count += 1;
                }
                Err(e) if e.is_auth_failure() => {
                    return Err(self.ctx.handle_repo_error(e).await);
                }
                Err(e) => {
                    log_failure(&format!("Failed to delete {key}"), &e);
                    result.failures.push(BatchDeleteFailure {
                        repo: key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        result.failed_count = result.failures.len();
        Ok(result)
    }

    async fn ensure_known(&self, key: &RepoKey) -> CoreResult<()> {
        if self.ctx.store.read().await.repository(key).is_some() {
            Ok(())
        } else {
            Err(CoreError::RepositoryNotFound(key.to_string()))
        }
    }
}

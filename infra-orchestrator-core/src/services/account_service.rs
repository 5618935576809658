//! DNS 账户管理服务
//!
//! 账户仅存在于 store 中；持久化由平台层负责。

use std::sync::Arc;

use infra_orchestrator_provider::DnsAccount;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::utils::validation::require_non_empty;

/// DNS 账户管理服务
pub struct AccountService {
    ctx: Arc<ServiceContext>,
}

impl AccountService {
    /// 创建账户服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 添加账户并生成本地 ID
    pub async fn add_account(
        &self,
        name: &str,
        email: &str,
        api_key: &str,
    ) -> CoreResult<DnsAccount> {
        let account = DnsAccount {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            api_key: api_key.trim().to_string(),
        };
        Self::validate(&account)?;

        self.ctx.store.write().await.upsert_account(account.clone());
        log::info!("Account added: {} ({})", account.name, account.id);
        Ok(account)
    }

    /// 恢复已保存的账户（配置文件等）；缺少 ID 的账户会生成新 ID
    ///
    /// 无效条目被跳过并记录日志，返回实际恢复的账户。
    pub async fn restore_accounts(&self, accounts: Vec<DnsAccount>) -> Vec<DnsAccount> {
        let mut restored = Vec::with_capacity(accounts.len());
        let mut store = self.ctx.store.write().await;

        for mut account in accounts {
            if account.id.trim().is_empty() {
                account.id = uuid::Uuid::new_v4().to_string();
            }
            if let Err(e) = Self::validate(&account) {
                log::warn!("Skipping account '{}': {e}", account.name);
                continue;
            }
            store.upsert_account(account.clone());
            restored.push(account);
        }

        log::info!("Restored {} account(s)", restored.len());
        restored
    }

    /// 删除账户，同时移除其 zone 与记录缓存
    pub async fn remove_account(&self, account_id: &str) -> CoreResult<DnsAccount> {
        let removed = self
            .ctx
            .store
            .write()
            .await
            .remove_account(account_id)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;
        log::info!("Account removed: {account_id}");
        Ok(removed)
    }

    /// 列出所有账户
    pub async fn list_accounts(&self) -> Vec<DnsAccount> {
        self.ctx.store.read().await.accounts().to_vec()
    }

    /// 向远程服务验证账户凭证
    pub async fn verify_account(&self, account_id: &str) -> CoreResult<bool> {
        let account = self.ctx.account(account_id).await?;
        Ok(self.ctx.dns_service.validate_account(&account).await?)
    }

    fn validate(account: &DnsAccount) -> CoreResult<()> {
        require_non_empty("Account name", &account.name)?;
        require_non_empty("API key", &account.api_key)?;
        if !account.email.is_empty() && !account.email.contains('@') {
            return Err(CoreError::ValidationError(format!(
                "Invalid email address: {}",
                account.email
            )));
        }
        Ok(())
    }
}

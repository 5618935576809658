//! Zone 聚合服务
//!
//! 逐个账户拉取 zone，每个账户成功后立即发布到 store。

use std::sync::Arc;

use infra_orchestrator_provider::ZoneOwner;

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::{AppZone, ZoneFetchFailure, ZoneFilter, ZoneRefreshReport};
use crate::utils::busy::BusyFlag;

pub struct ZoneService {
    ctx: Arc<ServiceContext>,
    busy: BusyFlag,
}

impl ZoneService {
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

    /// 拉取所有账户的 zone
    ///
    /// 已缓存的账户跳过（`force` 时重新拉取）。单个账户失败只记录日志，
    /// 其槽位保持原状。
    pub async fn refresh_zones(&self, force: bool) -> ZoneRefreshReport {
        let Some(_guard) = self.busy.try_acquire() else {
            log::debug!("Zone refresh already running, skipped");
            return ZoneRefreshReport {
                skipped_busy: true,
                ..ZoneRefreshReport::default()
            };
        };

        let accounts = self.ctx.store.read().await.accounts().to_vec();
        let mut report = ZoneRefreshReport::default();

        for account in accounts {
            if !force && self.ctx.store.read().await.has_zones(&account.id) {
                report.cached += 1;
                continue;
            }

            match self.ctx.dns_service.list_zones(&account).await {
                Ok(zones) => {
                    let count = zones.len();
                    if self.ctx.store.write().await.replace_zones(&account.id, zones) {
                        log::debug!("Account {} published {count} zones", account.id);
                        report.fetched += 1;
                    }
                }
                Err(e) => {
                    log_failure(&format!("Failed to list zones of account {}", account.id), &e);
                    report.failures.push(ZoneFetchFailure {
                        account_id: account.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// 重新拉取单个账户的 zone
    pub async fn refresh_account(&self, account_id: &str) -> CoreResult<Vec<AppZone>> {
        let account = self.ctx.account(account_id).await?;
        let zones = self.ctx.dns_service.list_zones(&account).await?;

        let mut store = self.ctx.store.write().await;
        if !store.replace_zones(account_id, zones) {
            // 拉取期间账户被删除
            return Err(CoreError::AccountNotFound(account_id.to_string()));
        }
        Ok(store
            .zones()
            .into_iter()
            .filter(|z| z.credential_id == account_id)
            .collect())
    }

    /// 所有 zone
    pub async fn zones(&self) -> Vec<AppZone> {
        self.ctx.store.read().await.zones()
    }

    /// 按当前过滤条件筛选的 zone
    pub async fn filtered_zones(&self) -> Vec<AppZone> {
        self.ctx.store.read().await.filtered_zones()
    }

    pub async fn set_filter(&self, filter: ZoneFilter) {
        self.ctx.store.write().await.set_zone_filter(filter);
    }

    /// zone 所属的服务端账户（去重）
    pub async fn owner_accounts(&self) -> Vec<ZoneOwner> {
        self.ctx.store.read().await.owner_accounts()
    }
}

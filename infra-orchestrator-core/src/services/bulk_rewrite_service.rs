//! 批量记录改写
//!
//! 对当前过滤出的 zone 逐个执行：列出记录 → 挑出内容等于旧值的记录 → 逐条改写。
//! 单个 zone 或单条记录失败只记入报告，不影响后续 zone。

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;

use infra_orchestrator_provider::{DnsRecord, UpdateDnsRecordRequest};

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::{
    AppZone, BulkFailure, BulkRewriteOutcome, BulkRewriteReport, BulkRewriteRequest, BulkState,
};
use crate::utils::busy::BusyFlag;
use crate::utils::validation::require_non_empty;

pub struct BulkRewriteService {
    ctx: Arc<ServiceContext>,
    busy: BusyFlag,
    state: watch::Sender<BulkState>,
}

impl BulkRewriteService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let (state, _) = watch::channel(BulkState::Idle);
        Self {
            ctx,
            busy: BusyFlag::new(),
            state,
        }
    }

    /// 当前状态
    pub fn state(&self) -> BulkState {
        self.state.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<BulkState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.busy.is_busy()
    }

    /// 执行一次批量改写
    ///
    /// 一旦进入 `Running` 就会走完所有候选 zone，没有中止路径。
    pub async fn run(&self, req: BulkRewriteRequest) -> CoreResult<BulkRewriteOutcome> {
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(CoreError::Busy("Bulk rewrite already running".to_string()));
        };

        self.state.send_replace(BulkState::Validating);
        let candidates = match self.validate(&req).await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.state.send_replace(BulkState::Idle);
                return Err(e);
            }
        };
        if candidates.is_empty() {
            log::info!("Bulk rewrite: no candidate zones");
            self.state.send_replace(BulkState::Idle);
            return Ok(BulkRewriteOutcome::NothingToDo);
        }

        let total = candidates.len();
        log::info!(
            "Bulk rewrite {} {} -> {} over {total} zones",
            req.record_type,
            req.old_value,
            req.new_value
        );

        let mut report = BulkRewriteReport::default();
        for (i, zone) in candidates.iter().enumerate() {
            self.state.send_replace(BulkState::Running {
                index: i + 1,
                total,
            });
            self.rewrite_zone(zone, &req, &mut report).await;
        }

        log::info!(
            "Bulk rewrite done: {} records in {} zones, {} failures",
            report.updated_records,
            report.touched_zones,
            report.failures.len()
        );
        self.state.send_replace(BulkState::Done(report.clone()));
        Ok(BulkRewriteOutcome::Completed(report))
    }

    /// 校验请求并返回候选 zone
    ///
    /// 同一 zone 可能经多个凭证可见，只保留排序后的第一个凭证。
    async fn validate(&self, req: &BulkRewriteRequest) -> CoreResult<Vec<AppZone>> {
        require_non_empty("Old value", &req.old_value)?;
        require_non_empty("New value", &req.new_value)?;
        if req.old_value.trim() == req.new_value.trim() {
            return Err(CoreError::ValidationError(
                "Old and new values are identical".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let candidates: Vec<AppZone> = self
            .ctx
            .store
            .read()
            .await
            .filtered_zones()
            .into_iter()
            .filter(|z| seen.insert(z.id().to_string()))
            .collect();
        Ok(candidates)
    }

    async fn rewrite_zone(
        &self,
        zone: &AppZone,
        req: &BulkRewriteRequest,
        report: &mut BulkRewriteReport,
    ) {
        let zone_failure = |reason: String| BulkFailure {
            zone_id: zone.id().to_string(),
            zone_name: zone.name().to_string(),
            record_id: None,
            reason,
        };

        let account = match self.ctx.account(&zone.credential_id).await {
            Ok(account) => account,
            Err(e) => {
                log::warn!("Bulk rewrite skipped {}: {e}", zone.name());
                report.failures.push(zone_failure(e.to_string()));
                return;
            }
        };

        let records = match self.ctx.dns_service.list_records(&account, zone.id()).await {
            Ok(records) => records,
            Err(e) => {
                log_failure(&format!("Failed to list records of {}", zone.name()), &e);
                report.failures.push(zone_failure(e.to_string()));
                return;
            }
        };
        report.zones_scanned += 1;

        let old_value = req.old_value.trim();
        let new_value = req.new_value.trim();
        let matching: Vec<&DnsRecord> = records
            .iter()
            .filter(|r| r.record_type == req.record_type && r.content == old_value)
            .collect();

        let mut updated = 0;
        for record in matching {
            let update = UpdateDnsRecordRequest::rewrite_content(record, new_value);
            match self
                .ctx
                .dns_service
                .update_record(&account, zone.id(), &record.id, &update)
                .await
            {
                Ok(_) => updated += 1,
                Err(e) => {
                    log_failure(
                        &format!("Failed to rewrite {} in {}", record.name, zone.name()),
                        &e,
                    );
                    report.failures.push(BulkFailure {
                        record_id: Some(record.id.clone()),
                        ..zone_failure(e.to_string())
                    });
                }
            }
        }

        if updated == 0 {
            return;
        }
        report.updated_records += updated;
        report.touched_zones += 1;

        if self.ctx.store.read().await.has_records(zone.id()) {
            match self.ctx.dns_service.list_records(&account, zone.id()).await {
                Ok(fresh) => {
                    self.ctx.store.write().await.replace_records(zone.id(), fresh);
                }
                Err(e) => log_failure(&format!("Failed to refresh records of {}", zone.name()), &e),
            }
        }
    }
}

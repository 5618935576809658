//! DNS 记录服务
//!
//! 记录列表按 zone 缓存；写操作成功后重新拉取该 zone 的记录。

use std::sync::Arc;

use infra_orchestrator_provider::{
    CreateDnsRecordRequest, DnsAccount, DnsRecord, UpdateDnsRecordRequest,
};

use crate::error::{CoreError, CoreResult};
use crate::services::{ServiceContext, log_failure};
use crate::types::AppZone;
use crate::utils::validation::validate_record_fields;

pub struct DnsRecordService {
    ctx: Arc<ServiceContext>,
}

impl DnsRecordService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 解析账户及其名下的 zone
    async fn resolve(&self, account_id: &str, zone_id: &str) -> CoreResult<(AppZone, DnsAccount)> {
        let account = self.ctx.account(account_id).await?;
        let zone = self
            .ctx
            .store
            .read()
            .await
            .zone_for(account_id, zone_id)
            .ok_or_else(|| CoreError::ZoneNotFound(zone_id.to_string()))?;
        Ok((zone, account))
    }

    /// 获取 zone 的记录（缓存命中时不发请求）
    pub async fn list_records(&self, account_id: &str, zone_id: &str) -> CoreResult<Vec<DnsRecord>> {
        {
            let store = self.ctx.store.read().await;
            let owned = store.zone_for(account_id, zone_id).is_some();
            if let (true, Some(cached)) = (owned, store.records(zone_id)) {
                return Ok(cached.to_vec());
            }
        }
        self.fetch_records(account_id, zone_id).await
    }

    /// 强制重新拉取 zone 的记录
    pub async fn fetch_records(&self, account_id: &str, zone_id: &str) -> CoreResult<Vec<DnsRecord>> {
        let (zone, account) = self.resolve(account_id, zone_id).await?;
        let records = self
            .ctx
            .dns_service
            .list_records(&account, zone.id())
            .await?;
        self.ctx
            .store
            .write()
            .await
            .replace_records(zone_id, records.clone());
        Ok(records)
    }

    pub async fn create_record(
        &self,
        account_id: &str,
        zone_id: &str,
        req: &CreateDnsRecordRequest,
    ) -> CoreResult<DnsRecord> {
        validate_record_fields(&req.name, &req.content, req.ttl)?;
        let (zone, account) = self.resolve(account_id, zone_id).await?;

        let created = self
            .ctx
            .dns_service
            .create_record(&account, zone.id(), req)
            .await?;
        log::info!("Created {} record {} in {}", created.record_type, created.name, zone.name());

        self.refetch(account_id, zone_id).await;
        Ok(created)
    }

    pub async fn update_record(
        &self,
        account_id: &str,
        zone_id: &str,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> CoreResult<DnsRecord> {
        validate_record_fields(&req.name, &req.content, req.ttl)?;
        let (zone, account) = self.resolve(account_id, zone_id).await?;

        let updated = self
            .ctx
            .dns_service
            .update_record(&account, zone.id(), record_id, req)
            .await?;
        log::info!("Updated record {record_id} in {}", zone.name());

        self.refetch(account_id, zone_id).await;
        Ok(updated)
    }

    pub async fn delete_record(
        &self,
        account_id: &str,
        zone_id: &str,
        record_id: &str,
    ) -> CoreResult<()> {
        let (zone, account) = self.resolve(account_id, zone_id).await?;

        self.ctx
            .dns_service
            .delete_record(&account, zone.id(), record_id)
            .await?;
        log::info!("Deleted record {record_id} from {}", zone.name());

        self.refetch(account_id, zone_id).await;
        Ok(())
    }

    /// 写操作后的刷新；失败只记录日志，写操作本身已成功
    async fn refetch(&self, account_id: &str, zone_id: &str) {
        if let Err(e) = self.fetch_records(account_id, zone_id).await {
            match e {
                CoreError::Provider(ref pe) => {
                    log_failure(&format!("Failed to refresh records of {zone_id}"), pe);
                }
                other => log::warn!("Failed to refresh records of {zone_id}: {other}"),
            }
        }
    }
}

//! Cloudflare `DnsService` 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::providers::common::relative_to_full_name;
use crate::traits::{DnsService, ErrorContext};
use crate::types::{
    CreateDnsRecordRequest, DnsAccount, DnsRecord, DnsRecordType, UpdateDnsRecordRequest, Zone,
    ZoneOwner, ZoneStatus,
};

use super::types::CloudflareRecordBody;
use super::{
    CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS,
    MAX_PAGE_SIZE_ZONES,
};

impl CloudflareProvider {
    /// 将 Cloudflare zone 转换为 `Zone`
    pub(crate) fn convert_zone(zone: CloudflareZone) -> Zone {
        let owner_name = if zone.account.name.is_empty() {
            zone.account.id.clone()
        } else {
            zone.account.name
        };
        Zone {
            id: zone.id,
            name: zone.name,
            status: ZoneStatus::parse(&zone.status),
            owner: ZoneOwner {
                id: zone.account.id,
                name: owner_name,
            },
        }
    }

    /// 将 Cloudflare 记录转换为 `DnsRecord`（保留完整域名）
    pub(crate) fn convert_record(record: CloudflareDnsRecord, zone_id: &str) -> DnsRecord {
        DnsRecord {
            id: record.id,
            zone_id: zone_id.to_string(),
            record_type: DnsRecordType::from(record.record_type.as_str()),
            name: record.name,
            content: record.content,
            ttl: record.ttl,
            proxied: record.proxied,
            priority: record.priority,
            updated_at: record
                .modified_on
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// 记录名可能是相对名，写入前补全为完整域名
    async fn qualify_name(&self, account: &DnsAccount, zone_id: &str, name: &str) -> Result<String> {
        if name.contains('.') && name != "@" {
            return Ok(name.trim_end_matches('.').to_string());
        }
        let zone: CloudflareZone = self
            .get(&format!("/zones/{zone_id}"), account, ErrorContext::zone(zone_id))
            .await?;
        Ok(relative_to_full_name(name, &zone.name))
    }

    fn record_body(
        record_type: &DnsRecordType,
        name: String,
        content: &str,
        ttl: u32,
        proxied: Option<bool>,
        priority: Option<u16>,
    ) -> CloudflareRecordBody {
        CloudflareRecordBody {
            record_type: record_type.as_str().to_string(),
            name,
            content: content.to_string(),
            ttl,
            priority,
            proxied,
        }
    }
}

#[async_trait]
impl DnsService for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn validate_account(&self, account: &DnsAccount) -> Result<bool> {
        #[derive(Deserialize)]
        struct VerifyResponse {
            status: String,
        }

        // Global API Key 没有 token verify 端点，改用 /user
        if account.email.trim().is_empty() {
            let resp: VerifyResponse = self
                .get("/user/tokens/verify", account, ErrorContext::default())
                .await?;
            Ok(resp.status == "active")
        } else {
            self.get::<serde_json::Value>("/user", account, ErrorContext::default())
                .await
                .map(|_| true)
        }
    }

    async fn list_zones(&self, account: &DnsAccount) -> Result<Vec<Zone>> {
        let zones: Vec<CloudflareZone> = self
            .get_all_pages("/zones", MAX_PAGE_SIZE_ZONES, account, ErrorContext::default())
            .await?;
        log::debug!(
            "[cloudflare] account {} lists {} zones",
            account.name,
            zones.len()
        );
        Ok(zones.into_iter().map(Self::convert_zone).collect())
    }

    async fn list_records(&self, account: &DnsAccount, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let records: Vec<CloudflareDnsRecord> = self
            .get_all_pages(
                &format!("/zones/{zone_id}/dns_records"),
                MAX_PAGE_SIZE_RECORDS,
                account,
                ErrorContext::zone(zone_id),
            )
            .await?;
        Ok(records
            .into_iter()
            .map(|r| Self::convert_record(r, zone_id))
            .collect())
    }

    async fn create_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        req: &CreateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        let name = self.qualify_name(account, zone_id, &req.name).await?;
        let ctx = ErrorContext::record(zone_id, None, Some(&name));
        let body = Self::record_body(
            &req.record_type,
            name,
            &req.content,
            req.ttl,
            req.proxied,
            req.priority,
        );

        let record: CloudflareDnsRecord = self
            .post(&format!("/zones/{zone_id}/dns_records"), account, &body, ctx)
            .await?;
        Ok(Self::convert_record(record, zone_id))
    }

    async fn update_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        let name = self.qualify_name(account, zone_id, &req.name).await?;
        let ctx = ErrorContext::record(zone_id, Some(record_id), Some(&name));
        let body = Self::record_body(
            &req.record_type,
            name,
            &req.content,
            req.ttl,
            req.proxied,
            req.priority,
        );

        let record: CloudflareDnsRecord = self
            .put(
                &format!("/zones/{zone_id}/dns_records/{record_id}"),
                account,
                &body,
                ctx,
            )
            .await?;
        Ok(Self::convert_record(record, zone_id))
    }

    async fn delete_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        record_id: &str,
    ) -> Result<()> {
        self.delete(
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            account,
            ErrorContext::record(zone_id, Some(record_id), None),
        )
        .await
    }
}

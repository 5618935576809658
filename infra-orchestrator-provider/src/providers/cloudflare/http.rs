//! Cloudflare HTTP 请求方法

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::DnsAccount;

use super::types::CloudflareResultInfo;
use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// 附加认证头
    ///
    /// 有邮箱时使用 Global API Key（`X-Auth-Email` + `X-Auth-Key`），否则视为 API Token。
    fn authorize(builder: RequestBuilder, account: &DnsAccount) -> RequestBuilder {
        if account.email.trim().is_empty() {
            builder.bearer_auth(&account.api_key)
        } else {
            builder
                .header("X-Auth-Email", &account.email)
                .header("X-Auth-Key", &account.api_key)
        }
    }

    /// 执行请求并解包 Cloudflare 响应信封
    ///
    /// `success == false` 与非 2xx 状态一样经由错误映射处理。
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        account: &DnsAccount,
        body: Option<&B>,
        ctx: ErrorContext,
    ) -> Result<CloudflareResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);
        let mut builder = Self::authorize(self.client.request(method.clone(), &url), account);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = HttpUtils::execute_request_with_retry(
            builder,
            self.provider_name(),
            method.as_str(),
            &url,
            self.max_retries,
        )
        .await?;

        let Ok(envelope) = serde_json::from_str::<CloudflareResponse<T>>(&response.body) else {
            if response.is_success() {
                return HttpUtils::parse_json(&response.body, self.provider_name());
            }
            // 非 JSON 的错误响应（代理、网关等），按状态码映射
            return Err(self.map_error(
                RawApiError::with_status(
                    response.status,
                    crate::utils::log_sanitizer::truncate_for_log(&response.body),
                ),
                ctx,
            ));
        };

        if !envelope.success || !response.is_success() {
            return Err(self.envelope_error(response.status, &envelope, ctx));
        }

        Ok(envelope)
    }

    /// 失败信封 → `ProviderError`
    ///
    /// 只记 debug：日志级别由调用方按 `is_expected` 决定。
    fn envelope_error<T>(
        &self,
        status: u16,
        envelope: &CloudflareResponse<T>,
        ctx: ErrorContext,
    ) -> ProviderError {
        let (code, message) = envelope.first_error();
        log::debug!("[cloudflare] API error {code}: {message}");
        let raw = if code.is_empty() {
            RawApiError::with_status(status, message)
        } else {
            RawApiError {
                status: Some(status),
                code: Some(code),
                message,
            }
        };
        self.map_error(raw, ctx)
    }

    /// GET 单个资源
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        account: &DnsAccount,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.send::<T, ()>(Method::GET, path, account, None, ctx)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// GET 列表，逐页拉取直到最后一页
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: u32,
        account: &DnsAccount,
        ctx: ErrorContext,
    ) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1_u32;

        loop {
            let paged = format!("{path}{separator}page={page}&per_page={per_page}");
            let envelope = self
                .send::<Vec<T>, ()>(Method::GET, &paged, account, None, ctx.clone())
                .await?;
            let batch = envelope.result.unwrap_or_default();
            let fetched = batch.len();
            items.extend(batch);

            if !has_more_pages(envelope.result_info.as_ref(), fetched, per_page) {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// POST，返回新建资源
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        account: &DnsAccount,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.send(Method::POST, path, account, Some(body), ctx)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// PUT，整体覆盖资源
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        account: &DnsAccount,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.send(Method::PUT, path, account, Some(body), ctx)
            .await?
            .result
            .ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }

    /// DELETE
    pub(crate) async fn delete(
        &self,
        path: &str,
        account: &DnsAccount,
        ctx: ErrorContext,
    ) -> Result<()> {
        self.send::<serde_json::Value, ()>(Method::DELETE, path, account, None, ctx)
            .await
            .map(|_| ())
    }
}

/// 是否还有下一页
///
/// 优先使用 `total_pages`；缺失时以"本页不满"为结束标志。
fn has_more_pages(info: Option<&CloudflareResultInfo>, fetched: usize, per_page: u32) -> bool {
    match info {
        Some(CloudflareResultInfo {
            page,
            total_pages: Some(total),
            ..
        }) => page < total,
        _ => fetched >= per_page as usize && fetched > 0,
    }
}

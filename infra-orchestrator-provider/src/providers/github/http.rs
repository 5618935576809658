//! GitHub HTTP 请求方法

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::{HttpResponse, HttpUtils};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::types::GithubErrorBody;
use super::{GITHUB_API_VERSION, GithubProvider};

impl GithubProvider {
    /// 发送请求；非 2xx 响应经由错误映射转换
    pub(crate) async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mut ctx: ErrorContext,
    ) -> Result<HttpResponse> {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
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

        if response.is_success() {
            return Ok(response);
        }

        let error_body: GithubErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
        let message = if error_body.message.is_empty() {
            truncate_for_log(&response.body)
        } else {
            error_body.message
        };
        let field = error_body.errors.into_iter().find_map(|e| e.field.or(e.code));

        ctx.rate_limit_remaining = response.rate_limit_remaining;
        Err(self.map_error(
            RawApiError {
                status: Some(response.status),
                code: field,
                message,
            },
            ctx,
        ))
    }

    /// GET 并解析 JSON
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let response = self.request::<()>(Method::GET, path, None, ctx).await?;
        HttpUtils::parse_json(&response.body, self.provider_name())
    }

    /// GET 列表，逐页拉取直到遇到不满的一页
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: u32,
        ctx: ErrorContext,
    ) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1_u32;

        loop {
            let batch: Vec<T> = self
                .get(
                    &format!("{path}{separator}per_page={per_page}&page={page}"),
                    ctx.clone(),
                )
                .await?;
            let fetched = batch.len();
            items.extend(batch);

            if fetched < per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// 带请求体的写操作（POST/PATCH），返回解析后的资源
    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let response = self.request(method, path, Some(body), ctx).await?;
        HttpUtils::parse_json(&response.body, self.provider_name())
    }

    /// DELETE（成功时为 204 No Content）
    pub(crate) async fn delete(&self, path: &str, ctx: ErrorContext) -> Result<()> {
        self.request::<()>(Method::DELETE, path, None, ctx)
            .await
            .map(|_| ())
    }
}

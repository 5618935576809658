//! GitHub error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::GithubProvider;

/// GitHub 以 HTTP 状态码区分错误，`code` 仅在 422 时携带出错字段
impl ProviderErrorMapper for GithubProvider {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match raw.status {
            Some(401) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            // 主限流与权限不足都是 403，靠剩余配额区分
            Some(403) if context.rate_limit_remaining == Some(0) => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },
            Some(403) => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            Some(404) => ProviderError::NotFound {
                provider,
                resource: context
                    .repository
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            // Git Repository is empty
            Some(409) => ProviderError::EmptyRepository {
                provider,
                repository: context
                    .repository
                    .unwrap_or_else(|| "<unknown>".to_string()),
            },
            Some(422) => ProviderError::InvalidParameter {
                provider,
                param: raw.code.unwrap_or_else(|| "general".to_string()),
                detail: raw.message,
            },
            _ => self.unknown_error(raw),
        }
    }
}

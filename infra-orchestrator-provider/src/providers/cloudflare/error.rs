//! Cloudflare 错误映射
//!
//! 错误码参考 <https://developers.cloudflare.com/fundamentals/api/troubleshooting/>。
//! `success: false` 信封和传输层失败都走这里。

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// 凭证无效：请求头格式错误、未知 key/email、token 无权限
const AUTH_CODES: &[&str] = &["6003", "6103", "6111", "9103", "9106", "9109", "10000"];

/// 同名/同内容记录已存在
const RECORD_EXISTS_CODES: &[&str] = &["81053", "81054", "81055", "81056", "81057", "81058"];

/// 记录不存在
const RECORD_NOT_FOUND: &str = "81044";
/// 记录数达到套餐上限
const RECORD_QUOTA: &str = "81045";
/// 路由失败，通常是 zone id 无效
const ZONE_ROUTING_CODES: &[&str] = &["7000", "7003"];

/// 参数校验错误对应的字段
fn invalid_field(code: &str) -> Option<&'static str> {
    match code {
        "9000" => Some("name"),
        "9005" | "9006" | "9009" => Some("content"),
        "9021" => Some("ttl"),
        "9041" => Some("proxied"),
        "1004" => Some("general"),
        _ => None,
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "<unknown>".to_string())
}

impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();

        let Some(code) = raw.code.as_deref() else {
            // 没有错误码（网关、代理返回的页面），按状态码兜底
            return match raw.status {
                Some(401) => ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(403) => ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(404) => ProviderError::DomainNotFound {
                    provider,
                    domain: or_unknown(context.zone),
                    raw_message: Some(raw.message),
                },
                _ => self.unknown_error(raw),
            };
        };

        if AUTH_CODES.contains(&code) {
            ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            }
        } else if let Some(param) = invalid_field(code) {
            ProviderError::InvalidParameter {
                provider,
                param: param.to_string(),
                detail: raw.message,
            }
        } else if RECORD_EXISTS_CODES.contains(&code) {
            ProviderError::RecordExists {
                provider,
                record_name: or_unknown(context.record_name),
                raw_message: Some(raw.message),
            }
        } else if code == RECORD_NOT_FOUND {
            ProviderError::RecordNotFound {
                provider,
                record_id: or_unknown(context.record_id),
                raw_message: Some(raw.message),
            }
        } else if code == RECORD_QUOTA {
            ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            }
        } else if ZONE_ROUTING_CODES.contains(&code) {
            ProviderError::DomainNotFound {
                provider,
                domain: or_unknown(context.zone),
                raw_message: Some(raw.message),
            }
        } else {
            self.unknown_error(raw)
        }
    }
}

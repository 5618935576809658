//! Shared request flow for the GitHub and Cloudflare clients.
//!
//! Each client builds its own `RequestBuilder` (auth headers differ) and
//! interprets status and body itself; this module sends, logs, retries
//! transient failures and captures the headers pagination depends on.

use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// First backoff step; doubles per attempt
const BASE_BACKOFF: Duration = Duration::from_millis(100);
/// Backoff ceiling
const MAX_BACKOFF: Duration = Duration::from_secs(10);
/// Longest `Retry-After` we are willing to wait
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Status, body and the headers the clients care about.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Link` header (pagination continuation)
    pub link: Option<String>,
    /// `x-ratelimit-remaining`
    pub rate_limit_remaining: Option<u64>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|v| v.trim().parse().ok())
}

/// Statuses that are worth retrying, mapped to the error the caller sees
/// once retries run out.
fn transient_status_error(
    provider: &str,
    status: u16,
    retry_after: Option<u64>,
    body: &str,
) -> Option<ProviderError> {
    match status {
        429 => Some(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after,
            raw_message: Some(truncate_for_log(body)),
        }),
        502..=504 => Some(ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("HTTP {status}: {}", truncate_for_log(body)),
        }),
        _ => None,
    }
}

fn transport_error(provider: &str, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            detail: err.to_string(),
        }
    } else {
        ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: err.to_string(),
        }
    }
}

/// `Retry-After` when the service sent one, exponential backoff otherwise.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    match error {
        ProviderError::RateLimited {
            retry_after: Some(secs),
            ..
        } => Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS)),
        _ => BASE_BACKOFF
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(MAX_BACKOFF),
    }
}

/// HTTP helpers shared by the clients
pub struct HttpUtils;

impl HttpUtils {
    /// Send once. Any status comes back as `Ok` except 429 and 502-504,
    /// which become retryable errors.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<HttpResponse, ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status = response.status().as_u16();
        // 读取 body 会消耗 response，先取 header
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;
        log::debug!(
            "[{provider_name}] {status} {}",
            truncate_for_log(&body)
        );

        let retry_after = header_u64(&headers, "retry-after");
        if let Some(err) = transient_status_error(provider_name, status, retry_after, &body) {
            log::warn!("[{provider_name}] {method_name} {url} answered HTTP {status}");
            return Err(err);
        }

        Ok(HttpResponse {
            status,
            link: header_str(&headers, "link"),
            rate_limit_remaining: header_u64(&headers, "x-ratelimit-remaining"),
            body,
        })
    }

    /// Deserialize a response body, logging the raw text on failure.
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!(
                "[{provider_name}] Unexpected response shape ({e}): {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Send with up to `max_retries` retries of transient failures.
    ///
    /// Requests whose body cannot be cloned (streams) are sent exactly once.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
        max_retries: u32,
    ) -> Result<HttpResponse, ProviderError> {
        let mut attempt = 0;
        loop {
            let request = match request_builder.try_clone() {
                Some(request) if attempt < max_retries => request,
                // 最后一次尝试（或无法克隆）直接消耗原始 builder
                _ => {
                    return Self::execute_request(request_builder, provider_name, method_name, url)
                        .await;
                }
            };

            match Self::execute_request(request, provider_name, method_name, url).await {
                Err(e) if e.is_transient() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{provider_name}] Attempt {}/{} failed, retrying in {}ms: {e}",
                        attempt + 1,
                        max_retries + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

//! Cloudflare DNS client

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::{DEFAULT_MAX_RETRIES, create_http_client};

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare Zones API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare DNS client.
///
/// Holds no credential itself: every call is authorized with the
/// [`DnsAccount`](crate::DnsAccount) passed to it.
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) max_retries: u32,
}

impl CloudflareProvider {
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
            base_url: CF_API_BASE.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Point the client at another API root (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the number of retries for transient failures.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for CloudflareProvider {
    fn default() -> Self {
        Self::new()
    }
}

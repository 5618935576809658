//! GitHub REST v3 client

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::providers::common::{DEFAULT_MAX_RETRIES, create_http_client};
use crate::utils::log_sanitizer::mask_secret;

pub(crate) const GITHUB_API_BASE: &str = "https://api.github.com";
/// `X-GitHub-Api-Version` sent with every request
pub(crate) const GITHUB_API_VERSION: &str = "2022-11-28";
/// GitHub 列表接口单页最大条数
pub(crate) const MAX_PAGE_SIZE_REPOS: u32 = 100;

/// GitHub client bound to a single personal access token.
pub struct GithubProvider {
    pub(crate) client: Client,
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) max_retries: u32,
}

impl std::fmt::Debug for GithubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubProvider")
            .field("token", &mask_secret(&self.token))
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GithubProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            token: token.into(),
            base_url: GITHUB_API_BASE.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Point the client at another API root (GitHub Enterprise, test servers).
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

//! # infra-orchestrator-provider
//!
//! Typed clients for the remote services Infra Orchestrator aggregates:
//! a source-hosting service (repositories, branches, commits) and a
//! DNS-management service (zones, records).
//!
//! ## Supported Services
//!
//! | Service | Trait | Feature Flag | Auth Method |
//! |---------|-------|-------------|-------------|
//! | [GitHub](https://docs.github.com/rest) | [`RepoService`] | `github` | Bearer Token |
//! | [Cloudflare](https://developers.cloudflare.com/api/) | [`DnsService`] | `cloudflare` | API Token or Global API Key |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)* — Enable both clients.
//! - **`github`** / **`cloudflare`** — Enable a single client.
//! - **`rustls`** *(default)* / **`native-tls`** — TLS backend.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use infra_orchestrator_provider::{
//!     CloudflareProvider, DnsAccount, DnsService, GithubProvider, ProbeKind, RepoService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let github = GithubProvider::new("ghp_xxx");
//!     for repo in github.list_repos().await? {
//!         let commits = github
//!             .probe_count(&repo.owner, &repo.name, ProbeKind::Commits)
//!             .await?;
//!         println!("{} ~{} commits", repo.full_name(), commits.count());
//!     }
//!
//!     let account = DnsAccount {
//!         id: "main".to_string(),
//!         name: "Main".to_string(),
//!         email: String::new(),
//!         api_key: "cf-token".to_string(),
//!     };
//!     let cloudflare = CloudflareProvider::new();
//!     for zone in cloudflare.list_zones(&account).await? {
//!         println!("{} ({:?})", zone.name, zone.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::InvalidCredentials`] — authentication failed
//! - [`ProviderError::EmptyRepository`] — the repository has no commits yet (HTTP 409)
//! - [`ProviderError::RateLimited`] — API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`] — network connectivity issue (retryable)
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are automatically
//! retried with exponential backoff.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export service traits (internal mapping traits are not exported)
pub use traits::{DnsService, RepoService};

// Re-export types
pub use types::{
    Commit, CreateDnsRecordRequest, CreateRepoRequest, DnsAccount, DnsRecord, DnsRecordType,
    PageProbe, ProbeKind, Repository, UpdateDnsRecordRequest, User, Zone, ZoneOwner, ZoneStatus,
    parse_last_page,
};

// Re-export utils module
pub use utils::datetime;

// Re-export concrete clients (behind feature flags)
#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;

#[cfg(feature = "github")]
pub use providers::GithubProvider;

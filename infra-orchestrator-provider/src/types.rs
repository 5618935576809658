use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::log_sanitizer::mask_secret;

// ============ Pagination ============

/// Outcome of a single-item paginated request used to infer a collection size.
///
/// With a page size of 1 the last page number equals the item count, so the
/// collection never has to be fetched in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "page")]
pub enum PageProbe {
    /// The response carried no continuation metadata: everything fit on one page.
    SinglePage,
    /// The continuation metadata pointed at this last page.
    LastPage(u32),
}

impl PageProbe {
    /// Build a probe from a raw `Link` header value.
    ///
    /// A header without a `rel="last"` entry is treated like a missing header.
    pub fn from_link_header(link: Option<&str>) -> Self {
        link.and_then(parse_last_page)
            .map_or(Self::SinglePage, Self::LastPage)
    }

    /// Page-derived item count.
    ///
    /// `SinglePage` yields 1: the true count is only known to be "at least one".
    pub fn count(&self) -> u32 {
        match self {
            Self::SinglePage => 1,
            Self::LastPage(page) => *page,
        }
    }
}

/// Extract the `page` query value of the `rel="last"` entry of a `Link` header.
///
/// ```text
/// <https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next",
/// <https://api.github.com/repositories/1/commits?per_page=1&page=347>; rel="last"
/// ```
pub fn parse_last_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let url = parts.next()?.trim().trim_start_matches('<').trim_end_matches('>');
        let is_last = parts.any(|p| {
            let p = p.trim();
            p == "rel=\"last\"" || p == "rel=last"
        });
        if !is_last {
            return None;
        }
        let query = url.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == "page" {
                value.parse().ok()
            } else {
                None
            }
        })
    })
}

// ============ Source hosting ============

/// Which collection of a repository a count probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Branch listing.
    Branches,
    /// Commit listing.
    Commits,
}

impl ProbeKind {
    /// Path segment of the listing endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Commits => "commits",
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// The authenticated user of the source-hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login handle.
    pub login: String,
    /// Display name, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Number of public repositories.
    pub public_repos: u32,
}

/// A repository as returned by the source-hosting service.
///
/// Identity is the `(owner, name)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Whether the repository is private.
    pub private: bool,
    /// Whether the repository is a fork.
    pub fork: bool,
    /// Star count.
    pub stars: u32,
    /// Fork count.
    pub forks: u32,
    /// Last update time.
    #[serde(with = "crate::utils::datetime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Primary language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Clone URL.
    pub clone_url: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

impl Repository {
    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Request to create a repository for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepoRequest {
    /// Repository name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Create as private.
    #[serde(default)]
    pub private: bool,
    /// Initialize with a README so the repository is not empty.
    #[serde(default)]
    pub auto_init: bool,
}

/// A commit as returned by the commit-listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Content hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Author display name.
    pub author: String,
    /// Author timestamp.
    #[serde(with = "crate::utils::datetime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authored_at: Option<DateTime<Utc>>,
    /// Web URL of the commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl Commit {
    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

// ============ DNS ============

/// A local DNS credential.
///
/// `id` is generated locally; it is distinct from the provider-side account
/// ([`ZoneOwner`]) that owns a zone. `Debug` masks the key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsAccount {
    /// Locally generated identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email. Empty means `api_key` is a bearer token.
    #[serde(default)]
    pub email: String,
    /// Global API key or API token.
    pub api_key: String,
}

impl std::fmt::Debug for DnsAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsAccount")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("api_key", &mask_secret(&self.api_key))
            .finish()
    }
}

/// Status of a zone within the DNS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Zone is active and resolving.
    Active,
    /// Zone is waiting for nameserver delegation.
    Pending,
    /// Zone is being set up.
    Initializing,
    /// Zone was moved away.
    Moved,
    /// Zone was deactivated.
    Deactivated,
    /// Status could not be determined.
    Unknown,
}

impl ZoneStatus {
    /// Parse the provider's status string.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "pending" => Self::Pending,
            "initializing" => Self::Initializing,
            "moved" => Self::Moved,
            "deactivated" => Self::Deactivated,
            _ => Self::Unknown,
        }
    }
}

/// The provider-side account that owns a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneOwner {
    /// Provider account id.
    pub id: String,
    /// Provider account name.
    pub name: String,
}

/// A zone managed by the DNS provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Provider zone id.
    pub id: String,
    /// Domain name (e.g. `"example.com"`).
    pub name: String,
    /// Current status.
    pub status: ZoneStatus,
    /// Owning provider-side account.
    pub owner: ZoneOwner,
}

/// DNS record type.
///
/// Serialized as the uppercase wire string. Types without a dedicated variant
/// are kept verbatim in [`Other`](Self::Other) so listing a zone never fails on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
    /// Any other type, uppercase.
    Other(String),
}

impl DnsRecordType {
    /// Uppercase wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for DnsRecordType {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            "NS" => Self::Ns,
            "SRV" => Self::Srv,
            "CAA" => Self::Caa,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DnsRecordType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<DnsRecordType> for String {
    fn from(value: DnsRecordType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Provider record id.
    pub id: String,
    /// Zone the record belongs to.
    pub zone_id: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// Fully qualified record name, as the provider reports it.
    pub name: String,
    /// Record value.
    pub content: String,
    /// Time to live in seconds (1 = automatic).
    pub ttl: u32,
    /// Whether the provider's proxy is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// Priority (MX/SRV).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Last modification time.
    #[serde(with = "crate::utils::datetime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request to create a DNS record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDnsRecordRequest {
    /// Record type.
    pub record_type: DnsRecordType,
    /// Record name.
    pub name: String,
    /// Record value.
    pub content: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Enable the provider's proxy.
    pub proxied: Option<bool>,
    /// Priority (MX/SRV).
    pub priority: Option<u16>,
}

/// Full replacement of an existing DNS record.
///
/// Every field is sent, so the provider never falls back to defaults for
/// fields the caller meant to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDnsRecordRequest {
    /// Record type.
    pub record_type: DnsRecordType,
    /// Record name.
    pub name: String,
    /// Record value.
    pub content: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Enable the provider's proxy.
    pub proxied: Option<bool>,
    /// Priority (MX/SRV).
    pub priority: Option<u16>,
}

impl UpdateDnsRecordRequest {
    /// Request that rewrites only the content of `record`.
    pub fn rewrite_content(record: &DnsRecord, content: impl Into<String>) -> Self {
        Self {
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: content.into(),
            ttl: record.ttl,
            proxied: record.proxied,
            priority: record.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_debug_masks_the_key() {
        let account = DnsAccount {
            id: "a1".to_string(),
            name: "main".to_string(),
            email: String::new(),
            api_key: "cf-secret-token-value".to_string(),
        };
        let printed = format!("{account:?}");
        assert!(printed.contains("cf-s****"));
        assert!(!printed.contains("secret-token"));
    }

    #[test]
    fn last_page_from_github_link_header() {
        let link = "<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel=\"next\", \
                    <https://api.github.com/repositories/1/commits?per_page=1&page=347>; rel=\"last\"";
        assert_eq!(parse_last_page(link), Some(347));
        assert_eq!(PageProbe::from_link_header(Some(link)).count(), 347);
    }

    #[test]
    fn last_page_ignores_page_named_params() {
        let link = "<https://api.github.com/x?per_page=1&pages=9&page=12>; rel=\"last\"";
        assert_eq!(parse_last_page(link), Some(12));
    }

    #[test]
    fn link_header_without_last_counts_as_single_page() {
        let link = "<https://api.github.com/x?page=1>; rel=\"prev\"";
        assert_eq!(PageProbe::from_link_header(Some(link)), PageProbe::SinglePage);
        assert_eq!(PageProbe::from_link_header(Some(link)).count(), 1);
    }

    #[test]
    fn missing_link_header_counts_one() {
        assert_eq!(PageProbe::from_link_header(None).count(), 1);
    }

    #[test]
    fn record_type_keeps_unknown_types() {
        assert_eq!(DnsRecordType::from("a"), DnsRecordType::A);
        assert_eq!(
            DnsRecordType::from("https"),
            DnsRecordType::Other("HTTPS".to_string())
        );
        let json = serde_json::to_string(&DnsRecordType::Aaaa).unwrap();
        assert_eq!(json, "\"AAAA\"");
        let back: DnsRecordType = serde_json::from_str("\"PTR\"").unwrap();
        assert_eq!(back.as_str(), "PTR");
    }

    #[test]
    fn zone_status_parse() {
        assert_eq!(ZoneStatus::parse("active"), ZoneStatus::Active);
        assert_eq!(ZoneStatus::parse("PENDING"), ZoneStatus::Pending);
        assert_eq!(ZoneStatus::parse("weird"), ZoneStatus::Unknown);
    }

    #[test]
    fn rewrite_content_preserves_other_fields() {
        let record = DnsRecord {
            id: "r1".into(),
            zone_id: "z1".into(),
            record_type: DnsRecordType::A,
            name: "www.example.com".into(),
            content: "1.1.1.1".into(),
            ttl: 300,
            proxied: Some(true),
            priority: None,
            updated_at: None,
        };
        let req = UpdateDnsRecordRequest::rewrite_content(&record, "2.2.2.2");
        assert_eq!(req.content, "2.2.2.2");
        assert_eq!(req.record_type, DnsRecordType::A);
        assert_eq!(req.name, "www.example.com");
        assert_eq!(req.ttl, 300);
        assert_eq!(req.proxied, Some(true));
    }

    #[test]
    fn commit_summary_is_first_line() {
        let commit = Commit {
            sha: "abc".into(),
            message: "Fix bug\n\nLonger body".into(),
            author: "octo".into(),
            authored_at: None,
            html_url: None,
        };
        assert_eq!(commit.summary(), "Fix bug");
    }
}

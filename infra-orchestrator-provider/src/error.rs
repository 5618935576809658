use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned by every remote operation.
///
/// Every variant names the `provider` (`"github"`, `"cloudflare"`) that produced
/// it. `NetworkError`, `Timeout` and `RateLimited` are transient and retried by
/// the HTTP layer; everything else is an answer from the service and is final.
///
/// Serialized with a `code` tag so callers can match on the kind without
/// parsing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection refused, reset, DNS failure, or a 502-504 from a gateway.
    NetworkError { provider: String, detail: String },

    Timeout { provider: String, detail: String },

    /// HTTP 429, or GitHub's 403 with `x-ratelimit-remaining: 0`.
    RateLimited {
        provider: String,
        /// Seconds to wait, from `Retry-After`
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    /// Token or API key rejected (expired, revoked, malformed).
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    /// Credential accepted but lacks the scope for this call.
    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// GitHub answers 409 when listing commits or branches of a repository
    /// without commits. Callers read it as a count of zero.
    EmptyRepository {
        provider: String,
        /// `owner/name`
        repository: String,
    },

    /// Repository or user missing (or invisible to the token).
    NotFound {
        provider: String,
        resource: String,
        raw_message: Option<String>,
    },

    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    /// Zone unknown to the credential.
    DomainNotFound {
        provider: String,
        /// Zone id or domain name
        domain: String,
        raw_message: Option<String>,
    },

    /// Bad TTL, malformed address, taken repository name...
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    /// Plan limit reached (e.g. record count). Not transient.
    QuotaExceeded {
        provider: String,
        raw_message: Option<String>,
    },

    /// Response body did not have the expected shape.
    ParseError { provider: String, detail: String },

    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

impl ProviderError {
    /// Service that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::EmptyRepository { provider, .. }
            | Self::NotFound { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    /// Caused by input or remote state rather than a fault: log at `warn`,
    /// everything else at `error`.
    ///
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::EmptyRepository { .. }
                | Self::NotFound { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::DomainNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
        )
    }

    /// Worth retrying after a delay.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// The credential itself was rejected.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidCredentials { .. })
    }
}

/// `"<what>"` or `"<what>: <message>"`
fn with_message(f: &mut fmt::Formatter<'_>, what: &str, message: Option<&str>) -> fmt::Result {
    match message {
        Some(msg) => write!(f, "{what}: {msg}"),
        None => f.write_str(what),
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.provider())?;
        match self {
            Self::NetworkError { detail, .. } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail, .. } => write!(f, "Request timeout: {detail}"),
            Self::RateLimited {
                retry_after: Some(secs),
                ..
            } => write!(f, "Rate limited (retry after {secs}s)"),
            Self::RateLimited { .. } => f.write_str("Rate limited"),
            Self::InvalidCredentials { raw_message, .. } => {
                with_message(f, "Invalid credentials", raw_message.as_deref())
            }
            Self::PermissionDenied { raw_message, .. } => {
                with_message(f, "Permission denied", raw_message.as_deref())
            }
            Self::EmptyRepository { repository, .. } => {
                write!(f, "Repository '{repository}' is empty")
            }
            Self::NotFound { resource, .. } => write!(f, "'{resource}' not found"),
            Self::RecordExists { record_name, .. } => {
                write!(f, "Record '{record_name}' already exists")
            }
            Self::RecordNotFound { record_id, .. } => write!(f, "Record '{record_id}' not found"),
            Self::DomainNotFound {
                domain,
                raw_message,
                ..
            } => with_message(
                f,
                &format!("Domain '{domain}' not found"),
                raw_message.as_deref(),
            ),
            Self::InvalidParameter { param, detail, .. } => {
                write!(f, "Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { .. } => f.write_str("Quota exceeded"),
            Self::ParseError { detail, .. } => write!(f, "Parse error: {detail}"),
            Self::Unknown { raw_message, .. } => f.write_str(raw_message),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn gh(raw_message: Option<&str>) -> ProviderError {
        ProviderError::InvalidCredentials {
            provider: "github".to_string(),
            raw_message: raw_message.map(str::to_string),
        }
    }

    #[test]
    fn display_prefixes_the_provider() {
        let cases = [
            (gh(Some("Bad credentials")), "[github] Invalid credentials: Bad credentials"),
            (gh(None), "[github] Invalid credentials"),
            (
                ProviderError::EmptyRepository {
                    provider: "github".into(),
                    repository: "octo/empty".into(),
                },
                "[github] Repository 'octo/empty' is empty",
            ),
            (
                ProviderError::RateLimited {
                    provider: "cloudflare".into(),
                    retry_after: Some(30),
                    raw_message: None,
                },
                "[cloudflare] Rate limited (retry after 30s)",
            ),
            (
                ProviderError::DomainNotFound {
                    provider: "cloudflare".into(),
                    domain: "023e105f".into(),
                    raw_message: Some("Invalid zone identifier".into()),
                },
                "[cloudflare] Domain '023e105f' not found: Invalid zone identifier",
            ),
            (
                ProviderError::Unknown {
                    provider: "cloudflare".into(),
                    raw_code: Some("1234".into()),
                    raw_message: "something broke".into(),
                },
                "[cloudflare] something broke",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn serialized_with_code_tag() {
        let err = ProviderError::RateLimited {
            provider: "github".to_string(),
            retry_after: Some(60),
            raw_message: None,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "RateLimited");
        assert_eq!(json["retry_after"], 60);
    }

    #[test]
    fn classification() {
        let empty = ProviderError::EmptyRepository {
            provider: "github".into(),
            repository: "a/b".into(),
        };
        let network = ProviderError::NetworkError {
            provider: "github".into(),
            detail: "reset".into(),
        };

        assert!(empty.is_expected() && !empty.is_transient() && !empty.is_auth_failure());
        assert!(!network.is_expected() && network.is_transient());
        assert!(gh(None).is_auth_failure() && gh(None).is_expected());
        assert!(
            !ProviderError::PermissionDenied {
                provider: "github".into(),
                raw_message: None,
            }
            .is_auth_failure()
        );
        assert_eq!(network.provider(), "github");
    }
}

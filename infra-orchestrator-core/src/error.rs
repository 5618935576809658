//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use infra_orchestrator_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Repository not found in the local store
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    /// Zone not found in the local store
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The source-hosting token was rejected; the session has been torn down
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Another run of the same operation is in progress
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::AccountNotFound(_)
            | Self::RepositoryNotFound(_)
            | Self::ZoneNotFound(_)
            | Self::ValidationError(_)
            | Self::SessionExpired
            | Self::Busy(_) => true,
            Self::Provider(e) => e.is_expected(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_convert_and_keep_classification() {
        let err: CoreError = ProviderError::NetworkError {
            provider: "github".into(),
            detail: "connection reset".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Provider(_)));
        assert_eq!(
            err.is_expected(),
            ProviderError::NetworkError {
                provider: "github".into(),
                detail: "connection reset".into(),
            }
            .is_expected()
        );
    }

    #[test]
    fn local_errors_are_expected() {
        assert!(CoreError::ValidationError("empty".into()).is_expected());
        assert!(CoreError::SessionExpired.is_expected());
        assert!(CoreError::Busy("bulk rewrite".into()).is_expected());
    }

    #[test]
    fn serializes_with_code_tag() {
        let json = serde_json::to_value(CoreError::ZoneNotFound("z1".into())).unwrap();
        assert_eq!(json["code"], "ZoneNotFound");
        assert_eq!(json["details"], "z1");
    }
}

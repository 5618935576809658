//! Application configuration.
//!
//! Loaded from the JSON file named by `INFRA_ORCHESTRATOR_CONFIG`, or from
//! `GITHUB_TOKEN` and `CLOUDFLARE_ACCOUNTS` (a JSON array) when no file is set.

use std::path::{Path, PathBuf};

use infra_orchestrator_core::CoreSettings;
use infra_orchestrator_provider::DnsAccount;
use serde::{Deserialize, Serialize};

/// Path of the JSON config file
pub const CONFIG_PATH_ENV: &str = "INFRA_ORCHESTRATOR_CONFIG";
/// Source-hosting token (also fills an empty `githubToken` in the file)
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// JSON array of DNS accounts
pub const CLOUDFLARE_ACCOUNTS_ENV: &str = "CLOUDFLARE_ACCOUNTS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A DNS account entry; `id` is generated when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Empty means `api_key` is an API token
    #[serde(default)]
    pub email: String,
    pub api_key: String,
}

impl From<AccountConfig> for DnsAccount {
    fn from(value: AccountConfig) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            api_key: value.api_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub github_token: String,
    #[serde(default)]
    pub cloudflare_accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub settings: CoreSettings,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = if let Some(path) = var(CONFIG_PATH_ENV) {
            log::info!("Loading configuration from {path}");
            Self::parse_file(Path::new(&path))?
        } else {
            let cloudflare_accounts = match var(CLOUDFLARE_ACCOUNTS_ENV) {
                Some(raw) => serde_json::from_str(&raw)?,
                None => Vec::new(),
            };
            Self {
                github_token: String::new(),
                cloudflare_accounts,
                settings: CoreSettings::default(),
            }
        };

        if config.github_token.trim().is_empty() {
            config.github_token =
                var(GITHUB_TOKEN_ENV).ok_or(ConfigError::MissingVar(GITHUB_TOKEN_ENV))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::parse_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.github_token.trim().is_empty() {
            return Err(ConfigError::Invalid("githubToken cannot be empty".to_string()));
        }
        if let Some(index) = self
            .cloudflare_accounts
            .iter()
            .position(|a| a.name.trim().is_empty() || a.api_key.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "cloudflareAccounts[{index}] needs a name and an apiKey"
            )));
        }
        self.settings
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// DNS accounts to restore into the store.
    pub fn accounts(&self) -> Vec<DnsAccount> {
        self.cloudflare_accounts
            .iter()
            .cloned()
            .map(DnsAccount::from)
            .collect()
    }
}

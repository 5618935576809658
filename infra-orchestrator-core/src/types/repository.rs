//! Repository-side type definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use infra_orchestrator_provider::{Commit, Repository};

/// Repository identity: `owner/name`.
///
/// Owner and name only ever change together, through a confirmed rename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoKey {
    pub owner: String,
    pub name: String,
}

impl RepoKey {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn of(repo: &Repository) -> Self {
        Self::new(repo.owner.clone(), repo.name.clone())
    }

    /// Whether the repository carries this identity.
    pub fn matches(&self, repo: &Repository) -> bool {
        self.owner == repo.owner && self.name == repo.name
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Page-derived branch and commit counts.
///
/// Approximate by construction: a repository with one page of results reports 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub branches: u32,
    pub commits: u32,
}

/// A commit of the aggregated feed, tagged with the repository it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCommit {
    #[serde(flatten)]
    pub commit: Commit,
    pub repo: RepoKey,
}

/// Confirmed changes to apply to a cached repository.
///
/// Built from the state the remote service returned; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryPatch {
    pub owner: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub private: Option<bool>,
    pub default_branch: Option<String>,
    pub clone_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepositoryPatch {
    /// Patch carrying everything the remote service confirmed.
    #[must_use]
    pub fn confirmed(repo: &Repository) -> Self {
        Self {
            owner: Some(repo.owner.clone()),
            name: Some(repo.name.clone()),
            description: Some(repo.description.clone()),
            private: Some(repo.private),
            default_branch: repo.default_branch.clone(),
            clone_url: Some(repo.clone_url.clone()),
            updated_at: repo.updated_at,
        }
    }

    /// Identity of the entry once the patch is applied to `current`.
    pub fn target_key(&self, current: &RepoKey) -> RepoKey {
        RepoKey::new(
            self.owner.clone().unwrap_or_else(|| current.owner.clone()),
            self.name.clone().unwrap_or_else(|| current.name.clone()),
        )
    }

    pub(crate) fn apply_to(self, repo: &mut Repository) {
        if let Some(owner) = self.owner {
            repo.owner = owner;
        }
        if let Some(name) = self.name {
            repo.name = name;
        }
        if let Some(description) = self.description {
            repo.description = description;
        }
        if let Some(private) = self.private {
            repo.private = private;
        }
        if let Some(branch) = self.default_branch {
            repo.default_branch = Some(branch);
        }
        if let Some(url) = self.clone_url {
            repo.clone_url = url;
        }
        if let Some(updated_at) = self.updated_at {
            repo.updated_at = Some(updated_at);
        }
    }
}

/// Visibility filter of the repository list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    All,
    Public,
    Private,
    /// Forks only
    Forks,
    /// Non-forks only
    Sources,
}

impl Visibility {
    pub fn accepts(self, repo: &Repository) -> bool {
        match self {
            Self::All => true,
            Self::Public => !repo.private,
            Self::Private => repo.private,
            Self::Forks => repo.fork,
            Self::Sources => !repo.fork,
        }
    }
}

/// Sort order of the repository list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSort {
    /// Most recently updated first
    #[default]
    Updated,
    /// Case-insensitive, ascending
    Name,
    /// Most stars first
    Stars,
}

/// Active repository filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoFilter {
    /// Case-insensitive substring over name, owner, description and language
    pub search: String,
    pub visibility: Visibility,
    pub sort: RepoSort,
}

impl RepoFilter {
    pub fn accepts(&self, repo: &Repository) -> bool {
        if !self.visibility.accepts(repo) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(repo.name.as_str()),
            Some(repo.owner.as_str()),
            repo.description.as_deref(),
            repo.language.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// 批量删除失败项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteFailure {
    pub repo: RepoKey,
    pub reason: String,
}

/// 批量删除结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BatchDeleteFailure>,
}

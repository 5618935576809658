//! In-memory reconciliation store
//!
//! The single place where remote listings are published and confirmed local
//! mutations are applied. Nothing here performs I/O: services fetch, then take
//! the write lock only to publish.
//!
//! Invariants kept by every operation:
//! - identities are unique per collection (repositories by [`RepoKey`], commits
//!   by sha, accounts by id, records by id);
//! - stats, selection and feed entries only reference repositories in the store;
//! - every zone slot belongs to a configured account;
//! - an entry is either written whole or not at all.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use infra_orchestrator_provider::{DnsAccount, DnsRecord, Repository, User, Zone, ZoneOwner};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    AppZone, FeedCommit, RepoFilter, RepoKey, RepoSort, RepoStats, RepositoryPatch, ZoneFilter,
};

/// Store handle shared by every service.
pub type SharedStore = Arc<RwLock<ReconciliationStore>>;

#[derive(Debug, Default)]
pub struct ReconciliationStore {
    user: Option<User>,
    repositories: Vec<Repository>,
    stats: HashMap<RepoKey, RepoStats>,
    commits: Vec<FeedCommit>,
    selection: HashSet<RepoKey>,
    repo_filter: RepoFilter,
    accounts: Vec<DnsAccount>,
    /// credential id -> zones listed with it
    zones: HashMap<String, Vec<Zone>>,
    /// zone id -> records
    records: HashMap<String, Vec<DnsRecord>>,
    zone_filter: ZoneFilter,
}

impl ReconciliationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh store for sharing between services.
    #[must_use]
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Session teardown: forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ============ User ============

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    // ============ Repositories ============

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn repository(&self, key: &RepoKey) -> Option<&Repository> {
        self.repositories.iter().find(|r| key.matches(r))
    }

    /// Replace the repository list with a fresh listing.
    ///
    /// Duplicates keep their first occurrence. Stats, selection and feed
    /// entries of repositories that disappeared are dropped.
    pub fn replace_repositories(&mut self, items: Vec<Repository>) {
        let mut seen = HashSet::with_capacity(items.len());
        self.repositories = items
            .into_iter()
            .filter(|r| seen.insert(RepoKey::of(r)))
            .collect();

        self.stats.retain(|key, _| seen.contains(key));
        self.selection.retain(|key| seen.contains(key));
        self.commits.retain(|c| seen.contains(&c.repo));
    }

    /// Insert a newly created repository at the front, replacing a same-key entry.
    pub fn insert_repository(&mut self, repo: Repository) {
        let key = RepoKey::of(&repo);
        self.repositories.retain(|r| !key.matches(r));
        self.repositories.insert(0, repo);
    }

    /// Apply a confirmed mutation to a cached repository.
    ///
    /// A rename moves the entry's stats, selection membership and feed tags to
    /// the new identity. Returns the identity after the patch.
    pub fn apply_repository_patch(
        &mut self,
        key: &RepoKey,
        patch: RepositoryPatch,
    ) -> CoreResult<RepoKey> {
        let target = patch.target_key(key);
        if target != *key && self.repository(&target).is_some() {
            return Err(CoreError::ValidationError(format!(
                "Repository {target} already exists"
            )));
        }

        let repo = self
            .repositories
            .iter_mut()
            .find(|r| key.matches(r))
            .ok_or_else(|| CoreError::RepositoryNotFound(key.to_string()))?;
        patch.apply_to(repo);

        if target != *key {
            if let Some(stats) = self.stats.remove(key) {
                self.stats.insert(target.clone(), stats);
            }
            if self.selection.remove(key) {
                self.selection.insert(target.clone());
            }
            for commit in self.commits.iter_mut().filter(|c| c.repo == *key) {
                commit.repo = target.clone();
            }
        }

        Ok(target)
    }

    /// Remove a repository together with everything that references it.
    pub fn remove_repository(&mut self, key: &RepoKey) -> Option<Repository> {
        let index = self.repositories.iter().position(|r| key.matches(r))?;
        let removed = self.repositories.remove(index);
        self.stats.remove(key);
        self.selection.remove(key);
        self.commits.retain(|c| c.repo != *key);
        Some(removed)
    }

    pub fn repo_filter(&self) -> &RepoFilter {
        &self.repo_filter
    }

    pub fn set_repo_filter(&mut self, filter: RepoFilter) {
        self.repo_filter = filter;
    }

    /// Repositories passing the active filter, in the active sort order.
    pub fn filtered_repositories(&self) -> Vec<Repository> {
        let mut items: Vec<Repository> = self
            .repositories
            .iter()
            .filter(|r| self.repo_filter.accepts(r))
            .cloned()
            .collect();

        match self.repo_filter.sort {
            // 无更新时间的排在最后
            RepoSort::Updated => items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            RepoSort::Name => items.sort_by_key(|r| r.name.to_lowercase()),
            RepoSort::Stars => items.sort_by(|a, b| b.stars.cmp(&a.stars)),
        }
        items
    }

    // ============ Stats ============

    /// Record stats for a repository still in the store.
    ///
    /// Existing entries are kept: returns `false` when nothing was written.
    pub fn insert_stats(&mut self, key: RepoKey, stats: RepoStats) -> bool {
        if self.repository(&key).is_none() || self.stats.contains_key(&key) {
            return false;
        }
        self.stats.insert(key, stats);
        true
    }

    pub fn stats(&self, key: &RepoKey) -> Option<RepoStats> {
        self.stats.get(key).copied()
    }

    pub fn has_stats(&self, key: &RepoKey) -> bool {
        self.stats.contains_key(key)
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    // ============ Commit feed ============

    pub fn commits(&self) -> &[FeedCommit] {
        &self.commits
    }

    /// Publish a rebuilt feed. Entries of unknown repositories and repeated
    /// shas are dropped, order is kept.
    pub fn replace_commits(&mut self, items: Vec<FeedCommit>) {
        let mut seen = HashSet::with_capacity(items.len());
        let known: HashSet<RepoKey> = self.repositories.iter().map(RepoKey::of).collect();
        self.commits = items
            .into_iter()
            .filter(|c| known.contains(&c.repo) && seen.insert(c.commit.sha.clone()))
            .collect();
    }

    // ============ Selection ============

    /// Add a repository to the selection. Unknown repositories are ignored.
    pub fn select(&mut self, key: &RepoKey) -> bool {
        self.repository(key).is_some() && self.selection.insert(key.clone())
    }

    pub fn deselect(&mut self, key: &RepoKey) -> bool {
        self.selection.remove(key)
    }

    /// Flip membership; returns whether the repository is selected afterwards.
    pub fn toggle_selection(&mut self, key: &RepoKey) -> bool {
        if self.selection.remove(key) {
            false
        } else {
            self.select(key)
        }
    }

    pub fn is_selected(&self, key: &RepoKey) -> bool {
        self.selection.contains(key)
    }

    /// Selected repositories, sorted.
    pub fn selected(&self) -> Vec<RepoKey> {
        let mut keys: Vec<RepoKey> = self.selection.iter().cloned().collect();
        keys.sort();
        keys
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ============ Accounts ============

    pub fn accounts(&self) -> &[DnsAccount] {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&DnsAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Add an account, replacing one with the same id in place.
    pub fn upsert_account(&mut self, account: DnsAccount) {
        match self.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => self.accounts.push(account),
        }
    }

    /// Remove an account with its zone slot and the record lists of those zones.
    pub fn remove_account(&mut self, id: &str) -> Option<DnsAccount> {
        let index = self.accounts.iter().position(|a| a.id == id)?;
        let account = self.accounts.remove(index);

        if let Some(zones) = self.zones.remove(id) {
            self.drop_orphaned_records(zones.iter().map(|z| z.id.as_str()));
        }
        if self.zone_filter.credential_id.as_deref() == Some(id) {
            self.zone_filter.credential_id = None;
        }
        Some(account)
    }

    // ============ Zones ============

    /// Publish the zones listed with one credential.
    ///
    /// Ignored (returns `false`) when the account is no longer configured.
    pub fn replace_zones(&mut self, credential_id: &str, zones: Vec<Zone>) -> bool {
        if self.account(credential_id).is_none() {
            return false;
        }
        let mut seen = HashSet::with_capacity(zones.len());
        let zones: Vec<Zone> = zones
            .into_iter()
            .filter(|z| seen.insert(z.id.clone()))
            .collect();

        if let Some(previous) = self.zones.insert(credential_id.to_string(), zones) {
            self.drop_orphaned_records(
                previous
                    .iter()
                    .filter(|z| !seen.contains(&z.id))
                    .map(|z| z.id.as_str()),
            );
        }
        true
    }

    /// Drop cached records of zones no credential lists any more.
    fn drop_orphaned_records<'a>(&mut self, zone_ids: impl Iterator<Item = &'a str>) {
        for zone_id in zone_ids {
            if self.zone(zone_id).is_none() {
                self.records.remove(zone_id);
            }
        }
    }

    /// Whether the credential's slot has been fetched.
    pub fn has_zones(&self, credential_id: &str) -> bool {
        self.zones.contains_key(credential_id)
    }

    /// All zones, in account order.
    pub fn zones(&self) -> Vec<AppZone> {
        self.accounts
            .iter()
            .filter_map(|a| self.zones.get(&a.id).map(|zones| (a, zones)))
            .flat_map(|(account, zones)| {
                zones
                    .iter()
                    .map(|z| AppZone::from_provider(z.clone(), account.id.clone()))
            })
            .collect()
    }

    /// A zone as listed with one credential.
    ///
    /// The same zone may be visible through several credentials; each slot
    /// is looked up on its own.
    pub fn zone_for(&self, credential_id: &str, zone_id: &str) -> Option<AppZone> {
        self.zones
            .get(credential_id)?
            .iter()
            .find(|z| z.id == zone_id)
            .map(|z| AppZone::from_provider(z.clone(), credential_id))
    }

    /// A zone listed with any credential.
    pub fn zone(&self, zone_id: &str) -> Option<AppZone> {
        self.zones.iter().find_map(|(credential_id, zones)| {
            zones
                .iter()
                .find(|z| z.id == zone_id)
                .map(|z| AppZone::from_provider(z.clone(), credential_id.clone()))
        })
    }

    pub fn zone_filter(&self) -> &ZoneFilter {
        &self.zone_filter
    }

    pub fn set_zone_filter(&mut self, filter: ZoneFilter) {
        self.zone_filter = filter;
    }

    /// Zones passing the active filter, sorted by domain name.
    pub fn filtered_zones(&self) -> Vec<AppZone> {
        let mut items: Vec<AppZone> = self
            .zones()
            .into_iter()
            .filter(|z| self.zone_filter.accepts(z))
            .collect();
        items.sort_by(|a, b| {
            a.zone
                .name
                .to_lowercase()
                .cmp(&b.zone.name.to_lowercase())
                .then_with(|| a.credential_id.cmp(&b.credential_id))
        });
        items
    }

    /// Distinct provider-side owner accounts among the configured zones.
    pub fn owner_accounts(&self) -> Vec<ZoneOwner> {
        self.zones
            .values()
            .flatten()
            .map(|z| z.owner.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // ============ Records ============

    pub fn records(&self, zone_id: &str) -> Option<&[DnsRecord]> {
        self.records.get(zone_id).map(Vec::as_slice)
    }

    pub fn has_records(&self, zone_id: &str) -> bool {
        self.records.contains_key(zone_id)
    }

    /// Publish the full record list of a known zone.
    pub fn replace_records(&mut self, zone_id: &str, records: Vec<DnsRecord>) -> bool {
        if self.zone(zone_id).is_none() {
            return false;
        }
        let mut seen = HashSet::with_capacity(records.len());
        let records = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        self.records.insert(zone_id.to_string(), records);
        true
    }

    pub fn remove_zone_records(&mut self, zone_id: &str) -> Option<Vec<DnsRecord>> {
        self.records.remove(zone_id)
    }
}

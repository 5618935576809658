//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use infra_orchestrator_provider::{
    Commit, CreateDnsRecordRequest, CreateRepoRequest, DnsAccount, DnsRecord, DnsRecordType,
    DnsService, PageProbe, ProbeKind, ProviderError, RepoService, Repository, Result,
    UpdateDnsRecordRequest, User, Zone, ZoneOwner, ZoneStatus,
};

use crate::services::ServiceContext;
use crate::settings::CoreSettings;
use crate::store::{ReconciliationStore, SharedStore};

// ===== 数据工厂 =====

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// `stars` 同时决定更新时间：数值越大越新
pub fn repo(owner: &str, name: &str, stars: u32) -> Repository {
    Repository {
        owner: owner.to_string(),
        name: name.to_string(),
        private: false,
        fork: false,
        stars,
        forks: 0,
        updated_at: Some(base_time() + Duration::days(i64::from(stars))),
        language: None,
        clone_url: format!("https://github.com/{owner}/{name}.git"),
        description: None,
        default_branch: Some("main".to_string()),
    }
}

/// `minutes` 为相对基准时间的提交时间
pub fn commit(sha: &str, minutes: i64) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: format!("commit {sha}"),
        author: "octocat".to_string(),
        authored_at: Some(base_time() + Duration::minutes(minutes)),
        html_url: None,
    }
}

pub fn account(id: &str) -> DnsAccount {
    DnsAccount {
        id: id.to_string(),
        name: format!("Account {id}"),
        email: String::new(),
        api_key: format!("key-{id}"),
    }
}

pub fn zone(id: &str, name: &str, status: ZoneStatus, owner: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: name.to_string(),
        status,
        owner: ZoneOwner {
            id: owner.to_string(),
            name: format!("Owner {owner}"),
        },
    }
}

pub fn record(id: &str, zone_id: &str, record_type: DnsRecordType, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        record_type,
        name: format!("{id}.example.com"),
        content: content.to_string(),
        ttl: 300,
        proxied: Some(false),
        priority: None,
        updated_at: None,
    }
}

fn network_error(provider: &str, detail: &str) -> ProviderError {
    ProviderError::NetworkError {
        provider: provider.to_string(),
        detail: detail.to_string(),
    }
}

fn invalid_credentials(provider: &str) -> ProviderError {
    ProviderError::InvalidCredentials {
        provider: provider.to_string(),
        raw_message: None,
    }
}

// ===== MockRepoService =====

/// 探测结果脚本
#[derive(Debug, Clone, Copy)]
pub enum ProbeScript {
    Page(PageProbe),
    Empty,
    Fail,
}

pub struct MockRepoService {
    repos: RwLock<Vec<Repository>>,
    probes: RwLock<HashMap<(String, ProbeKind), ProbeScript>>,
    commits: RwLock<HashMap<String, Vec<Commit>>>,
    /// full name -> 所有调用失败
    failing: RwLock<HashSet<String>>,
    /// 为 true 时所有调用返回 `InvalidCredentials`
    token_revoked: AtomicBool,
    pub probe_calls: AtomicUsize,
    pub commit_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockRepoService {
    pub fn new() -> Self {
        Self {
            repos: RwLock::new(Vec::new()),
            probes: RwLock::new(HashMap::new()),
            commits: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            token_revoked: AtomicBool::new(false),
            probe_calls: AtomicUsize::new(0),
            commit_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_repos(&self, repos: Vec<Repository>) {
        *self.repos.write().await = repos;
    }

    pub async fn set_probe(&self, full_name: &str, kind: ProbeKind, script: ProbeScript) {
        self.probes
            .write()
            .await
            .insert((full_name.to_string(), kind), script);
    }

    pub async fn set_commits(&self, full_name: &str, commits: Vec<Commit>) {
        self.commits
            .write()
            .await
            .insert(full_name.to_string(), commits);
    }

    pub async fn fail_repo(&self, full_name: &str) {
        self.failing.write().await.insert(full_name.to_string());
    }

    pub fn revoke_token(&self) {
        self.token_revoked.store(true, Ordering::SeqCst);
    }

    async fn check(&self, full_name: &str) -> Result<()> {
        if self.token_revoked.load(Ordering::SeqCst) {
            return Err(invalid_credentials("github"));
        }
        if self.failing.read().await.contains(full_name) {
            return Err(network_error("github", "connection reset"));
        }
        Ok(())
    }
}

#[async_trait]
impl RepoService for MockRepoService {
    fn id(&self) -> &'static str {
        "mock-github"
    }

    async fn get_user(&self) -> Result<User> {
        self.check("").await?;
        Ok(User {
            login: "octocat".to_string(),
            name: Some("Octo Cat".to_string()),
            avatar_url: None,
            public_repos: u32::try_from(self.repos.read().await.len()).unwrap_or(u32::MAX),
        })
    }

    async fn list_repos(&self) -> Result<Vec<Repository>> {
        self.check("").await?;
        Ok(self.repos.read().await.clone())
    }

    async fn create_repo(&self, req: &CreateRepoRequest) -> Result<Repository> {
        self.check("").await?;
        let mut created = repo("octocat", &req.name, 0);
        created.private = req.private;
        created.description.clone_from(&req.description);
        self.repos.write().await.insert(0, created.clone());
        Ok(created)
    }

    async fn rename_repo(&self, owner: &str, name: &str, new_name: &str) -> Result<Repository> {
        self.check(&format!("{owner}/{name}")).await?;
        let mut repos = self.repos.write().await;
        let repo = repos
            .iter_mut()
            .find(|r| r.owner == owner && r.name == name)
            .ok_or_else(|| ProviderError::NotFound {
                provider: "github".to_string(),
                resource: format!("{owner}/{name}"),
                raw_message: None,
            })?;
        repo.name = new_name.to_string();
        Ok(repo.clone())
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check(&format!("{owner}/{name}")).await?;
        self.repos
            .write()
            .await
            .retain(|r| !(r.owner == owner && r.name == name));
        Ok(())
    }

    async fn probe_count(&self, owner: &str, name: &str, kind: ProbeKind) -> Result<PageProbe> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let full_name = format!("{owner}/{name}");
        self.check(&full_name).await?;
        let script = self
            .probes
            .read()
            .await
            .get(&(full_name.clone(), kind))
            .copied()
            .unwrap_or(ProbeScript::Page(PageProbe::SinglePage));
        match script {
            ProbeScript::Page(probe) => Ok(probe),
            ProbeScript::Empty => Err(ProviderError::EmptyRepository {
                provider: "github".to_string(),
                repository: full_name,
            }),
            ProbeScript::Fail => Err(network_error("github", "probe failed")),
        }
    }

    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        _page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let full_name = format!("{owner}/{name}");
        self.check(&full_name).await?;
        let mut commits = self
            .commits
            .read()
            .await
            .get(&full_name)
            .cloned()
            .unwrap_or_default();
        commits.truncate(per_page as usize);
        Ok(commits)
    }
}

// ===== MockDnsService =====

pub struct MockDnsService {
    /// account id -> zones
    zones: RwLock<HashMap<String, Vec<Zone>>>,
    /// zone id -> records
    records: RwLock<HashMap<String, Vec<DnsRecord>>>,
    failing_accounts: RwLock<HashSet<String>>,
    failing_zones: RwLock<HashSet<String>>,
    failing_records: RwLock<HashSet<String>>,
    next_id: AtomicUsize,
    pub list_zones_calls: AtomicUsize,
    pub list_records_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl MockDnsService {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            failing_accounts: RwLock::new(HashSet::new()),
            failing_zones: RwLock::new(HashSet::new()),
            failing_records: RwLock::new(HashSet::new()),
            next_id: AtomicUsize::new(1),
            list_zones_calls: AtomicUsize::new(0),
            list_records_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_zones(&self, account_id: &str, zones: Vec<Zone>) {
        self.zones
            .write()
            .await
            .insert(account_id.to_string(), zones);
    }

    pub async fn set_records(&self, zone_id: &str, records: Vec<DnsRecord>) {
        self.records
            .write()
            .await
            .insert(zone_id.to_string(), records);
    }

    pub async fn records_of(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.records
            .read()
            .await
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    /// 该账户的调用返回 `InvalidCredentials`
    pub async fn fail_account(&self, account_id: &str) {
        self.failing_accounts
            .write()
            .await
            .insert(account_id.to_string());
    }

    /// 该 zone 的 `list_records` 返回网络错误
    pub async fn fail_zone(&self, zone_id: &str) {
        self.failing_zones.write().await.insert(zone_id.to_string());
    }

    /// 该记录的 `update_record` 返回网络错误
    pub async fn fail_record(&self, record_id: &str) {
        self.failing_records
            .write()
            .await
            .insert(record_id.to_string());
    }

    async fn check_account(&self, account: &DnsAccount) -> Result<()> {
        if self.failing_accounts.read().await.contains(&account.id) {
            return Err(invalid_credentials("cloudflare"));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsService for MockDnsService {
    fn id(&self) -> &'static str {
        "mock-cloudflare"
    }

    async fn validate_account(&self, account: &DnsAccount) -> Result<bool> {
        Ok(!self.failing_accounts.read().await.contains(&account.id))
    }

    async fn list_zones(&self, account: &DnsAccount) -> Result<Vec<Zone>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        self.check_account(account).await?;
        Ok(self
            .zones
            .read()
            .await
            .get(&account.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_records(&self, account: &DnsAccount, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.list_records_calls.fetch_add(1, Ordering::SeqCst);
        self.check_account(account).await?;
        if self.failing_zones.read().await.contains(zone_id) {
            return Err(network_error("cloudflare", "zone listing failed"));
        }
        Ok(self.records_of(zone_id).await)
    }

    async fn create_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        req: &CreateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        self.check_account(account).await?;
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = DnsRecord {
            id,
            zone_id: zone_id.to_string(),
            record_type: req.record_type.clone(),
            name: req.name.clone(),
            content: req.content.clone(),
            ttl: req.ttl,
            proxied: req.proxied,
            priority: req.priority,
            updated_at: None,
        };
        self.records
            .write()
            .await
            .entry(zone_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_account(account).await?;
        if self.failing_records.read().await.contains(record_id) {
            return Err(network_error("cloudflare", "update failed"));
        }
        let mut records = self.records.write().await;
        let record = records
            .get_mut(zone_id)
            .and_then(|list| list.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "cloudflare".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        record.record_type = req.record_type.clone();
        record.name.clone_from(&req.name);
        record.content.clone_from(&req.content);
        record.ttl = req.ttl;
        record.proxied = req.proxied;
        record.priority = req.priority;
        Ok(record.clone())
    }

    async fn delete_record(
        &self,
        account: &DnsAccount,
        zone_id: &str,
        record_id: &str,
    ) -> Result<()> {
        self.check_account(account).await?;
        if let Some(list) = self.records.write().await.get_mut(zone_id) {
            list.retain(|r| r.id != record_id);
        }
        Ok(())
    }
}

// ===== 工厂方法 =====

pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub repos: Arc<MockRepoService>,
    pub dns: Arc<MockDnsService>,
    pub store: SharedStore,
}

/// 创建测试用 `ServiceContext`（默认设置）
pub fn create_test_context() -> TestHarness {
    create_test_context_with(CoreSettings::default())
}

pub fn create_test_context_with(settings: CoreSettings) -> TestHarness {
    let repos = Arc::new(MockRepoService::new());
    let dns = Arc::new(MockDnsService::new());
    let store = ReconciliationStore::shared();
    let ctx = Arc::new(ServiceContext::new(
        repos.clone(),
        dns.clone(),
        store.clone(),
        settings,
    ));
    TestHarness {
        ctx,
        repos,
        dns,
        store,
    }
}

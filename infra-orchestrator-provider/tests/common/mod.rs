//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use infra_orchestrator_provider::{
    CloudflareProvider, CreateDnsRecordRequest, DnsAccount, DnsRecord, DnsRecordType, DnsService,
    GithubProvider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// GitHub 测试客户端
pub fn github() -> Option<GithubProvider> {
    env::var("GITHUB_TOKEN").ok().map(GithubProvider::new)
}

/// Cloudflare 测试上下文 - 封装客户端、账户和测试域名
pub struct CloudflareContext {
    pub provider: CloudflareProvider,
    pub account: DnsAccount,
    pub domain: String,
}

impl CloudflareContext {
    /// `CLOUDFLARE_EMAIL` 存在时使用 Global API Key，否则视为 API Token
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("CLOUDFLARE_API_KEY").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;
        let email = env::var("CLOUDFLARE_EMAIL").unwrap_or_default();

        Some(Self {
            provider: CloudflareProvider::new(),
            account: DnsAccount {
                id: "integration".to_string(),
                name: "integration".to_string(),
                email,
                api_key,
            },
            domain,
        })
    }

    /// 查找测试域名的 zone id
    pub async fn find_zone_id(&self) -> Option<String> {
        let zones = self.provider.list_zones(&self.account).await.ok()?;
        zones
            .into_iter()
            .find(|z| z.name == self.domain)
            .map(|z| z.id)
    }

    /// 创建测试 A 记录
    pub async fn create_test_record(&self, zone_id: &str, content: &str) -> Option<DnsRecord> {
        let request = CreateDnsRecordRequest {
            record_type: DnsRecordType::A,
            name: generate_test_record_name(),
            content: content.to_string(),
            ttl: 300,
            proxied: Some(false),
            priority: None,
        };
        self.provider
            .create_record(&self.account, zone_id, &request)
            .await
            .ok()
    }

    /// 查找并清理所有测试记录（以 _test- 开头的记录）
    pub async fn cleanup_all_test_records(&self, zone_id: &str) {
        if let Ok(records) = self.provider.list_records(&self.account, zone_id).await {
            for record in records {
                if record.name.starts_with("_test-") {
                    let _ = self
                        .provider
                        .delete_record(&self.account, zone_id, &record.id)
                        .await;
                }
            }
        }
    }
}

//! GitHub `RepoService` 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::error::Result;
use crate::traits::{ErrorContext, RepoService};
use crate::types::{Commit, CreateRepoRequest, PageProbe, ProbeKind, Repository, User};

use super::types::{CreateRepoBody, GithubCommit, GithubRepo, GithubUser, RenameRepoBody};
use super::{GithubProvider, MAX_PAGE_SIZE_REPOS};

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn repo_path(owner: &str, name: &str) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(name)
    )
}

impl GithubProvider {
    pub(crate) fn convert_repo(repo: GithubRepo) -> Repository {
        Repository {
            owner: repo.owner.login,
            name: repo.name,
            private: repo.private,
            fork: repo.fork,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated_at: parse_timestamp(repo.updated_at.as_deref()),
            language: repo.language,
            clone_url: repo.clone_url,
            description: repo.description,
            default_branch: repo.default_branch,
        }
    }

    pub(crate) fn convert_commit(commit: GithubCommit) -> Commit {
        let (author_name, date) = commit
            .commit
            .author
            .map_or((None, None), |a| (a.name, a.date));
        let author = commit
            .author
            .map(|a| a.login)
            .or(author_name)
            .unwrap_or_else(|| "unknown".to_string());
        Commit {
            sha: commit.sha,
            message: commit.commit.message,
            author,
            authored_at: parse_timestamp(date.as_deref()),
            html_url: commit.html_url,
        }
    }
}

#[async_trait]
impl RepoService for GithubProvider {
    fn id(&self) -> &'static str {
        "github"
    }

    async fn get_user(&self) -> Result<User> {
        let user: GithubUser = self.get("/user", ErrorContext::default()).await?;
        Ok(User {
            login: user.login,
            name: user.name,
            avatar_url: user.avatar_url,
            public_repos: user.public_repos,
        })
    }

    async fn list_repos(&self) -> Result<Vec<Repository>> {
        let repos: Vec<GithubRepo> = self
            .get_all_pages(
                "/user/repos?sort=updated&affiliation=owner,collaborator,organization_member",
                MAX_PAGE_SIZE_REPOS,
                ErrorContext::default(),
            )
            .await?;
        log::debug!("[github] listed {} repositories", repos.len());
        Ok(repos.into_iter().map(Self::convert_repo).collect())
    }

    async fn create_repo(&self, req: &CreateRepoRequest) -> Result<Repository> {
        let body = CreateRepoBody {
            name: &req.name,
            description: req.description.as_deref(),
            private: req.private,
            auto_init: req.auto_init,
        };
        let repo: GithubRepo = self
            .send_json(Method::POST, "/user/repos", &body, ErrorContext::default())
            .await?;
        Ok(Self::convert_repo(repo))
    }

    async fn rename_repo(&self, owner: &str, name: &str, new_name: &str) -> Result<Repository> {
        let repo: GithubRepo = self
            .send_json(
                Method::PATCH,
                &repo_path(owner, name),
                &RenameRepoBody { name: new_name },
                ErrorContext::repository(owner, name),
            )
            .await?;
        Ok(Self::convert_repo(repo))
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<()> {
        self.delete(&repo_path(owner, name), ErrorContext::repository(owner, name))
            .await
    }

    async fn probe_count(&self, owner: &str, name: &str, kind: ProbeKind) -> Result<PageProbe> {
        let path = format!("{}/{}?per_page=1", repo_path(owner, name), kind.path_segment());
        let response = self
            .request::<()>(Method::GET, &path, None, ErrorContext::repository(owner, name))
            .await?;
        Ok(PageProbe::from_link_header(response.link.as_deref()))
    }

    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>> {
        let path = format!(
            "{}/commits?per_page={per_page}&page={page}",
            repo_path(owner, name)
        );
        let commits: Vec<GithubCommit> = self
            .get(&path, ErrorContext::repository(owner, name))
            .await?;
        Ok(commits.into_iter().map(Self::convert_commit).collect())
    }
}

//! GitHub REST client implementing [`IssueCommentHost`].
//!
//! Endpoints used:
//! - `GET   /repos/{owner}/{repo}/issues/{n}/comments` (paged, 100 per page)
//! - `POST  /repos/{owner}/{repo}/issues/{n}/comments`
//! - `PATCH /repos/{owner}/{repo}/issues/comments/{id}`

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RepoOptions;
use crate::error::{HostApiError, HostResult};
use crate::host::{CommentRef, IssueComment, IssueCommentHost};

/// Public GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

/// Connection settings for [`GitHubClient`].
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base URL, e.g. `https://api.github.com` or a GHES `/api/v3` root.
    pub api_url: String,
    /// Installation or personal access token.
    pub token: String,
}

impl GitHubConfig {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireComment {
    id: u64,
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    body: Option<String>,
}

impl From<WireComment> for IssueComment {
    fn from(wire: WireComment) -> Self {
        IssueComment {
            id: wire.id,
            // Comments from deleted accounts come back with a null user
            author: wire.user.map(|u| u.login).unwrap_or_default(),
            body: wire.body.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCommentRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

/// Issue comment client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a new client.
    pub fn new(config: GitHubConfig) -> HostResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("styled-proverbs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostApiError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

/// Map a non-success response to [`HostApiError::Status`].
///
/// GitHub error bodies carry a `message` field; anything else is passed
/// through as raw text.
async fn check_status(response: Response) -> HostResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<WireError>(&text) {
        Ok(err) => err.message,
        Err(_) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => text,
    };

    Err(HostApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IssueCommentHost for GitHubClient {
    async fn list_comments(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
    ) -> HostResult<Vec<IssueComment>> {
        let path = format!(
            "/repos/{}/{}/issues/{}/comments",
            repo.owner, repo.repo, issue_number
        );

        let mut comments = Vec::new();
        let mut page = 1usize;
        loop {
            debug!(%repo, issue_number, page, "Listing issue comments");
            let response = self
                .request(Method::GET, &path)
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await?;
            let batch: Vec<WireComment> = check_status(response).await?.json().await?;
            let last = batch.len() < PER_PAGE;
            comments.extend(batch.into_iter().map(IssueComment::from));
            if last {
                break;
            }
            page += 1;
        }

        Ok(comments)
    }

    async fn create_comment(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        let path = format!(
            "/repos/{}/{}/issues/{}/comments",
            repo.owner, repo.repo, issue_number
        );
        debug!(%repo, issue_number, "Creating issue comment");

        let response = self
            .request(Method::POST, &path)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        let created: WireCommentRef = check_status(response).await?.json().await?;
        Ok(CommentRef { id: created.id })
    }

    async fn update_comment(
        &self,
        repo: &RepoOptions,
        comment_id: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        let path = format!(
            "/repos/{}/{}/issues/comments/{}",
            repo.owner, repo.repo, comment_id
        );
        debug!(%repo, comment_id, "Updating issue comment");

        let response = self
            .request(Method::PATCH, &path)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        let updated: WireCommentRef = check_status(response).await?.json().await?;
        Ok(CommentRef { id: updated.id })
    }
}

//! Ambient execution context supplied by the GitHub Actions runner.
//!
//! The context is loaded once at startup and passed by reference into the
//! resolver and the body renderer. Nothing in the pipeline reads process
//! environment on its own.

use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Read-only facts about the current automation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientContext {
    /// Repository owner (user or organization login).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Issue or pull request number of the triggering event, if any.
    pub issue_number: Option<u64>,

    /// Commit SHA that triggered the run.
    pub commit_sha: String,
}

impl AmbientContext {
    /// Create a context from explicit values.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        issue_number: Option<u64>,
        commit_sha: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            issue_number,
            commit_sha: commit_sha.into(),
        }
    }

    /// Load the context from the standard `GITHUB_*` environment variables.
    ///
    /// `GITHUB_REPOSITORY` and `GITHUB_SHA` are required. The issue number is
    /// read from the event payload at `GITHUB_EVENT_PATH`; a missing or
    /// unreadable payload leaves it unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let repository = required_env("GITHUB_REPOSITORY")?;
        let (owner, repo) = split_repository(&repository)?;
        let commit_sha = required_env("GITHUB_SHA")?;

        let issue_number = std::env::var("GITHUB_EVENT_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .and_then(|p| read_event_number(Path::new(&p)));

        debug!(%owner, %repo, ?issue_number, "Loaded ambient context");

        Ok(Self {
            owner,
            repo,
            issue_number,
            commit_sha,
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Environment {
            name,
            reason: "not set".to_string(),
        }),
    }
}

/// Split `owner/repo` into its two parts.
fn split_repository(repository: &str) -> Result<(String, String), ConfigError> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::Environment {
            name: "GITHUB_REPOSITORY",
            reason: format!("expected owner/repo, got {repository:?}"),
        }),
    }
}

fn read_event_number(path: &Path) -> Option<u64> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read event payload");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(payload) => event_number(&payload),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Event payload is not valid JSON");
            None
        }
    }
}

/// Extract the issue/PR number from a webhook payload.
///
/// Checks `pull_request.number`, then `issue.number`, then a top-level
/// `number`.
pub fn event_number(payload: &Value) -> Option<u64> {
    payload
        .pointer("/pull_request/number")
        .or_else(|| payload.pointer("/issue/number"))
        .or_else(|| payload.get("number"))
        .and_then(Value::as_u64)
}

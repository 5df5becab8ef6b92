//! In-memory fake host (testing only)
//!
//! `MemoryCommentHost` satisfies the [`IssueCommentHost`] contract without
//! any network access. It records every call so tests can assert on exactly
//! which mutations a pipeline performed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::RepoOptions;
use crate::error::{HostApiError, HostResult};
use crate::host::{CommentRef, IssueComment, IssueCommentHost};

/// Default author recorded on comments created through the fake.
pub const FAKE_BOT_LOGIN: &str = "github-actions[bot]";

/// One call observed by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    List {
        repo: String,
        issue_number: u64,
    },
    Create {
        repo: String,
        issue_number: u64,
        body: String,
    },
    Update {
        repo: String,
        comment_id: u64,
        body: String,
    },
}

#[derive(Debug, Default)]
struct HostState {
    /// (repo, issue) -> comments in creation order
    threads: BTreeMap<(String, u64), Vec<IssueComment>>,
    /// comment id -> (repo, issue)
    index: HashMap<u64, (String, u64)>,
    next_id: u64,
    calls: Vec<HostCall>,
    failures: HashMap<u64, HostApiError>,
}

/// In-memory comment host keyed by `owner/repo` and issue number.
#[derive(Debug)]
pub struct MemoryCommentHost {
    bot_login: String,
    state: Mutex<HostState>,
}

impl Default for MemoryCommentHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCommentHost {
    pub fn new() -> Self {
        Self::with_bot_login(FAKE_BOT_LOGIN)
    }

    /// Fake whose created comments are authored by `login`.
    pub fn with_bot_login(login: impl Into<String>) -> Self {
        Self {
            bot_login: login.into(),
            state: Mutex::new(HostState {
                next_id: 1,
                ..HostState::default()
            }),
        }
    }

    /// Insert an existing comment and return its id.
    pub fn seed_comment(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        author: &str,
        body: &str,
    ) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        Self::insert(&mut state, repo, issue_number, id, author, body);
        id
    }

    /// Insert an existing comment with a fixed id.
    pub fn seed_comment_with_id(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        id: u64,
        author: &str,
        body: &str,
    ) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id + 1);
        Self::insert(&mut state, repo, issue_number, id, author, body);
    }

    /// Make every call touching `issue_number` fail with `error`.
    pub fn fail_issue(&self, issue_number: u64, error: HostApiError) {
        self.state.lock().unwrap().failures.insert(issue_number, error);
    }

    /// Comments currently on an issue.
    pub fn comments(&self, repo: &RepoOptions, issue_number: u64) -> Vec<IssueComment> {
        let state = self.state.lock().unwrap();
        state
            .threads
            .get(&(repo.to_string(), issue_number))
            .cloned()
            .unwrap_or_default()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Create calls received so far.
    pub fn create_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Create { .. }))
            .collect()
    }

    /// Update calls received so far.
    pub fn update_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Update { .. }))
            .collect()
    }

    fn insert(
        state: &mut HostState,
        repo: &RepoOptions,
        issue_number: u64,
        id: u64,
        author: &str,
        body: &str,
    ) {
        let key = (repo.to_string(), issue_number);
        state.index.insert(id, key.clone());
        state.threads.entry(key).or_default().push(IssueComment {
            id,
            author: author.to_string(),
            body: body.to_string(),
        });
    }

    fn check_failure(state: &HostState, issue_number: u64) -> HostResult<()> {
        match state.failures.get(&issue_number) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IssueCommentHost for MemoryCommentHost {
    async fn list_comments(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
    ) -> HostResult<Vec<IssueComment>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::List {
            repo: repo.to_string(),
            issue_number,
        });
        Self::check_failure(&state, issue_number)?;
        Ok(state
            .threads
            .get(&(repo.to_string(), issue_number))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_comment(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::Create {
            repo: repo.to_string(),
            issue_number,
            body: body.to_string(),
        });
        Self::check_failure(&state, issue_number)?;
        let id = state.next_id;
        state.next_id += 1;
        let author = self.bot_login.clone();
        Self::insert(&mut state, repo, issue_number, id, &author, body);
        Ok(CommentRef { id })
    }

    async fn update_comment(
        &self,
        repo: &RepoOptions,
        comment_id: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::Update {
            repo: repo.to_string(),
            comment_id,
            body: body.to_string(),
        });
        let key = state
            .index
            .get(&comment_id)
            .cloned()
            .filter(|(r, _)| *r == repo.to_string())
            .ok_or_else(|| HostApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })?;
        Self::check_failure(&state, key.1)?;
        let comment = state
            .threads
            .get_mut(&key)
            .and_then(|thread| thread.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| HostApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })?;
        comment.body = body.to_string();
        Ok(CommentRef { id: comment_id })
    }
}

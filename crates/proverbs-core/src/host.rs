//! Host issue-tracker capability interface.
//!
//! The pipeline only needs three calls from the host: list comments on an
//! issue, create a comment, and update a comment. [`crate::github`] provides
//! the REST implementation; [`crate::fakes`] provides an in-memory one.

use async_trait::async_trait;

use crate::config::RepoOptions;
use crate::error::HostResult;

/// A comment as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    /// Login of the comment author.
    pub author: String,
    pub body: String,
}

/// Reference returned by create and update calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRef {
    pub id: u64,
}

/// Comment operations on a host issue tracker.
///
/// Errors are opaque [`crate::error::HostApiError`] values and are passed
/// through by callers unchanged.
#[async_trait]
pub trait IssueCommentHost: Send + Sync {
    /// List every comment on an issue, in host order (oldest first on GitHub).
    async fn list_comments(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
    ) -> HostResult<Vec<IssueComment>>;

    /// Create a comment on an issue.
    async fn create_comment(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        body: &str,
    ) -> HostResult<CommentRef>;

    /// Replace the body of an existing comment.
    async fn update_comment(
        &self,
        repo: &RepoOptions,
        comment_id: u64,
        body: &str,
    ) -> HostResult<CommentRef>;
}

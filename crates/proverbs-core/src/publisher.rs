//! Create-or-update of the bot comment.

use serde::Serialize;
use tracing::info;

use crate::config::ConfigOptions;
use crate::error::HostResult;
use crate::host::IssueCommentHost;

/// What a publish call will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDescriptor {
    /// Existing bot comment to overwrite, if one was located.
    pub comment_id: Option<u64>,
    pub body: String,
}

/// Mutation performed by [`publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PublishOutcome {
    Created { comment_id: u64 },
    Updated { comment_id: u64 },
}

impl PublishOutcome {
    pub fn comment_id(&self) -> u64 {
        match self {
            PublishOutcome::Created { comment_id } | PublishOutcome::Updated { comment_id } => {
                *comment_id
            }
        }
    }
}

/// Issue exactly one create or update call for `descriptor`.
///
/// No retries; host errors propagate unchanged.
pub async fn publish(
    host: &dyn IssueCommentHost,
    descriptor: &ConfigOptions,
    comment: CommentDescriptor,
) -> HostResult<PublishOutcome> {
    let repo = descriptor.repo_options();
    let request_id = descriptor.request_id();

    let outcome = match comment.comment_id {
        Some(id) => {
            let updated = host.update_comment(repo, id, &comment.body).await?;
            PublishOutcome::Updated {
                comment_id: updated.id,
            }
        }
        None => {
            let created = host
                .create_comment(repo, request_id, &comment.body)
                .await?;
            PublishOutcome::Created {
                comment_id: created.id,
            }
        }
    };

    info!(%repo, request_id, ?outcome, "Published proverb comment");
    Ok(outcome)
}

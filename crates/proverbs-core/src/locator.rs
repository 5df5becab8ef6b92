//! Prior bot comment lookup.

use tracing::debug;

use crate::config::ConfigOptions;
use crate::error::HostResult;
use crate::host::{IssueComment, IssueCommentHost};

/// Login GitHub assigns to comments made with the workflow `GITHUB_TOKEN`.
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// Find the comment a previous run left on the descriptor's target.
///
/// Returns the id of the first comment (in host order) authored by
/// `bot_login`, or `None` when there is none. Later bot comments are never
/// touched. Host errors are returned unchanged.
pub async fn locate(
    host: &dyn IssueCommentHost,
    descriptor: &ConfigOptions,
    bot_login: &str,
) -> HostResult<Option<u64>> {
    let comments = host
        .list_comments(descriptor.repo_options(), descriptor.request_id())
        .await?;
    let found = first_authored_by(&comments, bot_login);

    debug!(
        repo = %descriptor.repo_options(),
        request_id = descriptor.request_id(),
        total = comments.len(),
        found = ?found,
        "Located prior bot comment"
    );
    Ok(found)
}

fn first_authored_by(comments: &[IssueComment], login: &str) -> Option<u64> {
    comments.iter().find(|c| c.author == login).map(|c| c.id)
}

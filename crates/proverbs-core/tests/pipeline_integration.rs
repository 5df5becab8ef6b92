//! Integration tests for the batch pipeline with MemoryCommentHost.

use async_trait::async_trait;
use proverbs_core::error::{ActionError, ConfigError, HostApiError, HostResult, ValueError};
use proverbs_core::fakes::{HostCall, MemoryCommentHost};
use proverbs_core::{
    locate, AmbientContext, BatchOrchestrator, CommentRef, ConfigResolver, IssueComment,
    IssueCommentHost, PartialConfigOptions, PublishOutcome, RenderEndpoint, RepoOptions,
    RunInputs, StyleDefaults, DEFAULT_BOT_LOGIN,
};
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://proverbs.example.com/api";
const EXPECTED_BODY: &str = "![Styled Proverbs](https://proverbs.example.com/api?theme=light&layout=classic)\n\nTriggered by commit: abc123";

fn repo() -> RepoOptions {
    RepoOptions {
        owner: "o".to_string(),
        repo: "r".to_string(),
    }
}

fn orchestrator(host: Arc<dyn IssueCommentHost>, inputs: RunInputs) -> BatchOrchestrator {
    let context = AmbientContext::new("o", "r", None, "abc123");
    let resolver = ConfigResolver::new(inputs, StyleDefaults::default(), context);
    BatchOrchestrator::new(host, resolver, RenderEndpoint::parse(ENDPOINT).unwrap())
}

fn batch(value: serde_json::Value) -> Vec<PartialConfigOptions> {
    serde_json::from_value(value).expect("valid batch")
}

/// Test: no prior bot comment leads to exactly one create
#[tokio::test]
async fn test_creates_comment_when_none_exists() {
    let host = Arc::new(MemoryCommentHost::new());
    let summary = orchestrator(host.clone(), RunInputs::default())
        .run(batch(json!([{ "resourceOptions": { "requestId": 9 } }])))
        .await
        .expect("batch failed");

    assert_eq!(summary.created_count(), 1);
    assert_eq!(summary.updated_count(), 0);
    assert_eq!(
        host.create_calls(),
        vec![HostCall::Create {
            repo: "o/r".to_string(),
            issue_number: 9,
            body: EXPECTED_BODY.to_string(),
        }]
    );
    assert!(host.update_calls().is_empty());
}

/// Test: a prior bot comment is updated in place
#[tokio::test]
async fn test_updates_existing_bot_comment() {
    let host = Arc::new(MemoryCommentHost::new());
    host.seed_comment_with_id(&repo(), 9, 42, DEFAULT_BOT_LOGIN, "old proverb");

    let summary = orchestrator(host.clone(), RunInputs::default())
        .run(batch(json!([{ "resourceOptions": { "requestId": 9 } }])))
        .await
        .expect("batch failed");

    assert_eq!(
        summary.entries[0].outcome,
        PublishOutcome::Updated { comment_id: 42 }
    );
    assert_eq!(
        host.update_calls(),
        vec![HostCall::Update {
            repo: "o/r".to_string(),
            comment_id: 42,
            body: EXPECTED_BODY.to_string(),
        }]
    );
    assert!(host.create_calls().is_empty());
}

/// Test: running twice leaves one bot comment carrying the second body
#[tokio::test]
async fn test_repeated_runs_are_idempotent() {
    let host = Arc::new(MemoryCommentHost::new());
    host.seed_comment(&repo(), 9, "alice", "nice PR");

    let entries = json!([{ "resourceOptions": { "requestId": 9 } }]);
    orchestrator(host.clone(), RunInputs::default())
        .run(batch(entries.clone()))
        .await
        .expect("first run failed");

    let dark = RunInputs::new(Some("dark".to_string()), None, None);
    orchestrator(host.clone(), dark)
        .run(batch(entries))
        .await
        .expect("second run failed");

    let bot_comments: Vec<_> = host
        .comments(&repo(), 9)
        .into_iter()
        .filter(|c| c.author == DEFAULT_BOT_LOGIN)
        .collect();
    assert_eq!(bot_comments.len(), 1);
    assert!(bot_comments[0].body.contains("theme=dark&layout=classic"));
    assert_eq!(host.comments(&repo(), 9).len(), 2);
}

/// Test: only the first of several bot comments is touched
#[tokio::test]
async fn test_only_first_bot_comment_is_updated() {
    let host = Arc::new(MemoryCommentHost::new());
    host.seed_comment_with_id(&repo(), 4, 10, "alice", "hi");
    host.seed_comment_with_id(&repo(), 4, 11, DEFAULT_BOT_LOGIN, "first");
    host.seed_comment_with_id(&repo(), 4, 12, DEFAULT_BOT_LOGIN, "second");

    let descriptor = ConfigResolver::new(
        RunInputs::default(),
        StyleDefaults::default(),
        AmbientContext::new("o", "r", Some(4), "abc123"),
    )
    .resolve(&PartialConfigOptions::default())
    .unwrap();
    assert_eq!(
        locate(host.as_ref(), &descriptor, DEFAULT_BOT_LOGIN)
            .await
            .unwrap(),
        Some(11)
    );

    orchestrator(host.clone(), RunInputs::default())
        .run(vec![PartialConfigOptions::for_request(4)])
        .await
        .expect("batch failed");

    let comments = host.comments(&repo(), 4);
    assert_eq!(comments[1].body, EXPECTED_BODY);
    assert_eq!(comments[2].body, "second");
}

/// Test: a failing entry does not stop an independent one from publishing
#[tokio::test]
async fn test_batch_entries_are_independent() {
    let host = Arc::new(MemoryCommentHost::new());
    let result = orchestrator(host.clone(), RunInputs::default())
        .run(batch(json!([
            { "resourceOptions": { "requestId": "not-a-number" } },
            { "resourceOptions": { "requestId": 7 } }
        ])))
        .await;

    let err = result.expect_err("batch should fail");
    assert!(matches!(
        err,
        ActionError::Value(ValueError::NotPositiveInteger { .. })
    ));
    assert_eq!(host.create_calls().len(), 1);
    assert_eq!(host.comments(&repo(), 7).len(), 1);
}

/// Test: host failures propagate unchanged while other targets still complete
#[tokio::test]
async fn test_host_error_propagates_verbatim() {
    let host = Arc::new(MemoryCommentHost::new());
    let forbidden = HostApiError::Status {
        status: 403,
        message: "Resource not accessible by integration".to_string(),
    };
    host.fail_issue(3, forbidden.clone());

    let err = orchestrator(host.clone(), RunInputs::default())
        .run(vec![
            PartialConfigOptions::for_request(5),
            PartialConfigOptions::for_request(3),
        ])
        .await
        .expect_err("batch should fail");

    match err {
        ActionError::HostApi(e) => assert_eq!(e, forbidden),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(host.comments(&repo(), 5).len(), 1);
    assert!(host.comments(&repo(), 3).is_empty());
}

/// Test: the first failure in batch order is the one reported
#[tokio::test]
async fn test_first_failure_in_batch_order_is_reported() {
    let host = Arc::new(MemoryCommentHost::new());
    host.fail_issue(
        2,
        HostApiError::Status {
            status: 404,
            message: "Not Found".to_string(),
        },
    );

    let err = orchestrator(host, RunInputs::default())
        .run(batch(json!([
            { "resourceOptions": { "requestId": 2 } },
            { "resourceOptions": { "requestId": 0 } }
        ])))
        .await
        .expect_err("batch should fail");

    assert!(matches!(
        err,
        ActionError::HostApi(HostApiError::Status { status: 404, .. })
    ));
}

/// Test: entries sharing a target are serialized, so no duplicate is created
#[tokio::test]
async fn test_same_target_entries_do_not_duplicate() {
    let host = Arc::new(MemoryCommentHost::new());
    let summary = orchestrator(host.clone(), RunInputs::default())
        .run(batch(json!([
            { "resourceOptions": { "requestId": 6 }, "styleOptions": { "theme": "dark" } },
            { "resourceOptions": { "requestId": "6" }, "styleOptions": { "theme": "sepia" } }
        ])))
        .await
        .expect("batch failed");

    assert_eq!(summary.created_count(), 1);
    assert_eq!(summary.updated_count(), 1);
    let comments = host.comments(&repo(), 6);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.contains("theme=sepia"));
}

/// Test: many distinct targets all complete
#[tokio::test]
async fn test_many_targets_run_concurrently() {
    let host = Arc::new(MemoryCommentHost::new());
    let partials = (1..=20u64).map(PartialConfigOptions::for_request).collect();

    let summary = orchestrator(host.clone(), RunInputs::default())
        .run(partials)
        .await
        .expect("batch failed");

    assert_eq!(summary.created_count(), 20);
    let mut indices: Vec<_> = summary.entries.iter().map(|e| e.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
}

/// Test: the implicit entry falls back to the request-id input
#[tokio::test]
async fn test_implicit_entry_uses_inputs() {
    let host = Arc::new(MemoryCommentHost::new());
    let inputs = RunInputs::new(None, Some("grid".to_string()), Some("15".to_string()));

    orchestrator(host.clone(), inputs)
        .run_source(None)
        .await
        .expect("batch failed");

    let comments = host.comments(&repo(), 15);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.contains("theme=light&layout=grid"));
}

/// Test: a malformed batch file fails before any host call
#[tokio::test]
async fn test_malformed_batch_file_fails_before_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(&path, "[{\"resourceOptions\": ").unwrap();

    let host = Arc::new(MemoryCommentHost::new());
    let err = orchestrator(host.clone(), RunInputs::default())
        .run_source(Some(&path))
        .await
        .expect_err("should fail");

    assert!(matches!(err, ActionError::Config(ConfigError::ParseBatch { .. })));
    assert!(host.calls().is_empty());
}

/// Test: a custom bot login is used to find prior comments
#[tokio::test]
async fn test_custom_bot_login() {
    let host = Arc::new(MemoryCommentHost::with_bot_login("proverbs-app[bot]"));
    host.seed_comment_with_id(&repo(), 8, 3, DEFAULT_BOT_LOGIN, "other automation");
    host.seed_comment_with_id(&repo(), 8, 4, "proverbs-app[bot]", "ours");

    let summary = orchestrator(host.clone(), RunInputs::default())
        .with_bot_login("proverbs-app[bot]")
        .run(vec![PartialConfigOptions::for_request(8)])
        .await
        .expect("batch failed");

    assert_eq!(
        summary.entries[0].outcome,
        PublishOutcome::Updated { comment_id: 4 }
    );
    assert_eq!(host.comments(&repo(), 8)[0].body, "other automation");
}

/// Host that panics while listing one issue and delegates everything else.
struct PanickingHost {
    inner: Arc<MemoryCommentHost>,
    panic_on_issue: u64,
}

#[async_trait]
impl IssueCommentHost for PanickingHost {
    async fn list_comments(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
    ) -> HostResult<Vec<IssueComment>> {
        if issue_number == self.panic_on_issue {
            panic!("host crashed listing issue {issue_number}");
        }
        self.inner.list_comments(repo, issue_number).await
    }

    async fn create_comment(
        &self,
        repo: &RepoOptions,
        issue_number: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        self.inner.create_comment(repo, issue_number, body).await
    }

    async fn update_comment(
        &self,
        repo: &RepoOptions,
        comment_id: u64,
        body: &str,
    ) -> HostResult<CommentRef> {
        self.inner.update_comment(repo, comment_id, body).await
    }
}

/// Test: a panicking pipeline task fails the batch without stopping its siblings
#[tokio::test]
async fn test_panicking_task_is_reported_and_siblings_publish() {
    let inner = Arc::new(MemoryCommentHost::new());
    let host = Arc::new(PanickingHost {
        inner: inner.clone(),
        panic_on_issue: 3,
    });

    let err = orchestrator(host, RunInputs::default())
        .run(vec![
            PartialConfigOptions::for_request(3),
            PartialConfigOptions::for_request(4),
        ])
        .await
        .expect_err("panicking task should fail the batch");

    assert!(matches!(err, ActionError::Task(_)), "got {err:?}");
    assert!(inner.comments(&repo(), 3).is_empty());
    let sibling = inner.comments(&repo(), 4);
    assert_eq!(sibling.len(), 1);
    assert_eq!(sibling[0].body, EXPECTED_BODY);
}

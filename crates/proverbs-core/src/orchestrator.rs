//! Concurrent batch execution.
//!
//! Each batch entry runs resolve -> locate -> render -> publish. Entries that
//! resolve to the same issue are chained on one task so the second sees the
//! comment the first one created; distinct issues run on separate tasks.
//! Failure is fail-slow: every task runs to completion and the first failure
//! in batch order is returned.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::batch;
use crate::body::RenderEndpoint;
use crate::config::{ConfigOptions, ConfigResolver, PartialConfigOptions};
use crate::error::{ActionError, Result};
use crate::host::IssueCommentHost;
use crate::locator::{locate, DEFAULT_BOT_LOGIN};
use crate::publisher::{publish, CommentDescriptor, PublishOutcome};

/// Result of one successfully published batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    /// Position of the entry in the batch.
    pub index: usize,
    pub request_id: u64,
    pub outcome: PublishOutcome,
}

/// Outcomes of a batch in which every entry succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub entries: Vec<EntryOutcome>,
}

impl BatchSummary {
    pub fn created_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, PublishOutcome::Created { .. }))
            .count()
    }

    pub fn updated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, PublishOutcome::Updated { .. }))
            .count()
    }
}

type EntryResult = (usize, Result<EntryOutcome>);

/// Drives every batch entry through the publish pipeline.
#[derive(Clone)]
pub struct BatchOrchestrator {
    host: Arc<dyn IssueCommentHost>,
    resolver: Arc<ConfigResolver>,
    endpoint: RenderEndpoint,
    bot_login: String,
}

impl BatchOrchestrator {
    pub fn new(
        host: Arc<dyn IssueCommentHost>,
        resolver: ConfigResolver,
        endpoint: RenderEndpoint,
    ) -> Self {
        Self {
            host,
            resolver: Arc::new(resolver),
            endpoint,
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
        }
    }

    /// Identify prior comments by `login` instead of `github-actions[bot]`.
    pub fn with_bot_login(mut self, login: impl Into<String>) -> Self {
        self.bot_login = login.into();
        self
    }

    /// Expand `source` and run the resulting batch.
    ///
    /// A malformed batch file fails before any pipeline starts.
    pub async fn run_source(&self, source: Option<&Path>) -> Result<BatchSummary> {
        let partials = batch::expand(source).await?;
        self.run(partials).await
    }

    /// Run every partial config concurrently and wait for all of them.
    pub async fn run(&self, partials: Vec<PartialConfigOptions>) -> Result<BatchSummary> {
        if partials.is_empty() {
            warn!("Batch is empty, nothing to publish");
            return Ok(BatchSummary::default());
        }

        let total = partials.len();
        let mut results: Vec<Option<Result<EntryOutcome>>> = (0..total).map(|_| None).collect();

        // Group resolved descriptors by target issue, keeping batch order.
        let mut groups: Vec<Vec<(usize, ConfigOptions)>> = Vec::new();
        let mut group_of: HashMap<u64, usize> = HashMap::new();
        for (index, partial) in partials.iter().enumerate() {
            match self.resolver.resolve(partial) {
                Ok(descriptor) => {
                    let slot = *group_of.entry(descriptor.request_id()).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[slot].push((index, descriptor));
                }
                Err(e) => {
                    error!(index, error = %e, "Failed to resolve batch entry");
                    results[index] = Some(Err(e.into()));
                }
            }
        }

        info!(
            entries = total,
            targets = groups.len(),
            "Publishing proverb comments"
        );

        let mut handles: Vec<(Vec<usize>, JoinHandle<Vec<EntryResult>>)> = Vec::new();
        for group in groups {
            let indices = group.iter().map(|(i, _)| *i).collect();
            let this = self.clone();
            handles.push((indices, tokio::spawn(async move { this.run_group(group).await })));
        }

        let (indices, tasks): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (indices, joined) in indices.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(entries) => {
                    for (index, result) in entries {
                        results[index] = Some(result);
                    }
                }
                Err(e) => {
                    error!(error = %e, ?indices, "Pipeline task aborted");
                    for index in indices {
                        results[index] = Some(Err(ActionError::Task(e.to_string())));
                    }
                }
            }
        }

        let mut summary = BatchSummary::default();
        let mut first_error = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Some(Ok(entry)) => summary.entries.push(entry),
                Some(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                None => {
                    first_error.get_or_insert(ActionError::Task(format!(
                        "batch entry {index} produced no result"
                    )));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    created = summary.created_count(),
                    updated = summary.updated_count(),
                    "Batch completed"
                );
                Ok(summary)
            }
        }
    }

    /// Run entries targeting one issue, one after another.
    async fn run_group(&self, group: Vec<(usize, ConfigOptions)>) -> Vec<EntryResult> {
        let mut results = Vec::with_capacity(group.len());
        for (index, descriptor) in group {
            let span = info_span!("entry", index, request_id = descriptor.request_id());
            let result = self.run_entry(index, &descriptor).instrument(span).await;
            if let Err(e) = &result {
                error!(
                    index,
                    request_id = descriptor.request_id(),
                    error = %e,
                    "Batch entry failed"
                );
            }
            results.push((index, result));
        }
        results
    }

    async fn run_entry(&self, index: usize, descriptor: &ConfigOptions) -> Result<EntryOutcome> {
        let existing = locate(self.host.as_ref(), descriptor, &self.bot_login).await?;
        let body = self.endpoint.render_body(
            descriptor.style_options(),
            &self.resolver.context().commit_sha,
        );
        let outcome = publish(
            self.host.as_ref(),
            descriptor,
            CommentDescriptor {
                comment_id: existing,
                body,
            },
        )
        .await?;

        Ok(EntryOutcome {
            index,
            request_id: descriptor.request_id(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, outcome: PublishOutcome) -> EntryOutcome {
        EntryOutcome {
            index,
            request_id: index as u64 + 1,
            outcome,
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary {
            entries: vec![
                entry(0, PublishOutcome::Created { comment_id: 1 }),
                entry(1, PublishOutcome::Updated { comment_id: 2 }),
                entry(2, PublishOutcome::Updated { comment_id: 3 }),
            ],
        };
        assert_eq!(summary.created_count(), 1);
        assert_eq!(summary.updated_count(), 2);
    }

    #[test]
    fn test_summary_serializes_for_logging() {
        let summary = BatchSummary {
            entries: vec![entry(0, PublishOutcome::Created { comment_id: 7 })],
        };
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({
                "entries": [{
                    "index": 0,
                    "request_id": 1,
                    "outcome": { "action": "created", "comment_id": 7 }
                }]
            })
        );
    }
}

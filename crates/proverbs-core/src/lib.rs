//! Styled Proverbs core library
//!
//! Keeps exactly one bot-authored proverb comment on each targeted issue or
//! pull request:
//! - Expands an optional JSON batch file into partial configs
//! - Resolves each partial against action inputs, defaults, and run context
//! - Finds the previous bot comment and updates it, or creates a new one
//! - Runs independent targets concurrently on Tokio

pub mod batch;
pub mod body;
pub mod config;
pub mod context;
pub mod error;
pub mod fakes;
pub mod github;
pub mod host;
pub mod locator;
pub mod orchestrator;
pub mod publisher;
pub mod telemetry;

pub use body::{RenderEndpoint, DEFAULT_RENDER_ENDPOINT};
pub use config::{
    ConfigOptions, ConfigResolver, PartialConfigOptions, RepoOptions, ResourceOptions, RunInputs,
    StyleDefaults, StyleOptions,
};
pub use context::AmbientContext;
pub use error::{ActionError, ConfigError, HostApiError, Result, ValueError};
pub use github::{GitHubClient, GitHubConfig, DEFAULT_API_URL};
pub use host::{CommentRef, IssueComment, IssueCommentHost};
pub use locator::{locate, DEFAULT_BOT_LOGIN};
pub use orchestrator::{BatchOrchestrator, BatchSummary, EntryOutcome};
pub use publisher::{publish, CommentDescriptor, PublishOutcome};
pub use telemetry::init_tracing;

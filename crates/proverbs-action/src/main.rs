//! Styled Proverbs - GitHub Action entry point
//!
//! Posts a themed proverb image as a comment on an issue or pull request and
//! keeps updating that same comment on later runs.
//!
//! Every flag can also be supplied through the `INPUT_*` variable the Actions
//! runner exports for the matching `with:` input.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use proverbs_core::config::non_empty;
use proverbs_core::{
    init_tracing, AmbientContext, BatchOrchestrator, ConfigResolver, GitHubClient, GitHubConfig,
    RenderEndpoint, RunInputs, StyleDefaults, DEFAULT_API_URL, DEFAULT_BOT_LOGIN,
    DEFAULT_RENDER_ENDPOINT,
};
use tracing::{debug, error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "styled-proverbs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Post or update a styled proverb comment on GitHub issues and PRs", long_about = None)]
struct Cli {
    /// Token used to call the GitHub API
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Proverb card theme (default: light)
    #[arg(long, env = "INPUT_THEME")]
    theme: Option<String>,

    /// Proverb card layout (default: classic)
    #[arg(long, env = "INPUT_LAYOUT")]
    layout: Option<String>,

    /// Issue or pull request number (default: the triggering event's number)
    #[arg(long, env = "INPUT_REQUEST_ID")]
    request_id: Option<String>,

    /// JSON batch file listing one partial config per target
    #[arg(long, env = "INPUT_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Base URL of the proverb image renderer
    #[arg(long, env = "INPUT_ENDPOINT", default_value = DEFAULT_RENDER_ENDPOINT)]
    endpoint: String,

    /// Login whose comments count as ours
    #[arg(long, env = "INPUT_BOT_LOGIN", default_value = DEFAULT_BOT_LOGIN)]
    bot_login: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "Styled Proverbs failed");
            println!("{}", workflow_error(&message));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let token = non_empty(cli.github_token)
        .ok_or_else(|| anyhow!("the github-token input is required"))?;

    let context =
        AmbientContext::from_env().context("Failed to read the GitHub Actions run context")?;
    let endpoint = non_empty(Some(cli.endpoint))
        .unwrap_or_else(|| DEFAULT_RENDER_ENDPOINT.to_string());
    let endpoint = RenderEndpoint::parse(&endpoint)?;
    let bot_login =
        non_empty(Some(cli.bot_login)).unwrap_or_else(|| DEFAULT_BOT_LOGIN.to_string());
    let api_url = non_empty(Some(cli.api_url)).unwrap_or_else(|| DEFAULT_API_URL.to_string());

    info!(
        repo = %format!("{}/{}", context.owner, context.repo),
        commit = %context.commit_sha,
        "Starting Styled Proverbs"
    );

    let inputs = RunInputs::new(cli.theme, cli.layout, cli.request_id);
    let resolver = ConfigResolver::new(inputs, StyleDefaults::default(), context);
    let client = GitHubClient::new(GitHubConfig::new(api_url, token))
        .context("Failed to create GitHub client")?;

    let orchestrator =
        BatchOrchestrator::new(Arc::new(client), resolver, endpoint).with_bot_login(bot_login);

    let source = cli
        .config_file
        .filter(|p| !p.as_os_str().is_empty());
    let summary = orchestrator.run_source(source.as_deref()).await?;

    info!(
        created = summary.created_count(),
        updated = summary.updated_count(),
        "Styled Proverbs finished"
    );
    let summary = serde_json::to_string(&summary).context("Failed to encode batch summary")?;
    debug!(%summary, "Batch summary");
    Ok(())
}

/// Format a `::error::` workflow command, escaping the characters the runner
/// treats specially in command data.
fn workflow_error(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

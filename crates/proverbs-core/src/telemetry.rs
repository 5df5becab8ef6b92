//! Tracing setup for the action binary.
//!
//! The Actions runner scans stdout line by line for workflow commands such as
//! `::error::`, so every log line goes to stderr instead. A stray log line on
//! stdout that starts with `::` would otherwise be executed as a command.
//!
//! Filtering comes from `RUST_LOG` when it is set. Otherwise our own crates log
//! at the requested level and dependencies (`reqwest`, `hyper`) stay at `warn`.
//! When a workflow is re-run with debug logging enabled, the runner sets
//! `RUNNER_DEBUG=1` and the default is raised to `debug`.
//!
//! `--json` switches to newline-delimited JSON for runners that ship step logs
//! to an aggregator. Colour codes are disabled in the plain format because the
//! runner stores raw step output.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Variable the runner sets when step debug logging is enabled.
const RUNNER_DEBUG_VAR: &str = "RUNNER_DEBUG";

const OWN_TARGETS: [&str; 2] = ["proverbs_core", "styled_proverbs"];

/// Initialise the global tracing subscriber on stderr.
///
/// `level` is the verbosity for this action's own crates when `RUST_LOG` is
/// not set. Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let runner_debug = std::env::var(RUNNER_DEBUG_VAR).is_ok_and(|v| v == "1");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level, runner_debug)));

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_ansi(false))
            .try_init()
            .ok();
    }
}

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(level: Level, runner_debug: bool) -> String {
    let level = if runner_debug && level < Level::DEBUG {
        Level::DEBUG
    } else {
        level
    };
    let own = OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={}", level.as_str().to_lowercase()))
        .collect::<Vec<_>>()
        .join(",");
    format!("warn,{own}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }

    #[test]
    fn test_default_directives_scope_level_to_own_crates() {
        assert_eq!(
            default_directives(Level::INFO, false),
            "warn,proverbs_core=info,styled_proverbs=info"
        );
    }

    #[test]
    fn test_runner_debug_raises_default_level() {
        assert_eq!(
            default_directives(Level::INFO, true),
            "warn,proverbs_core=debug,styled_proverbs=debug"
        );
        // Already more verbose than debug
        assert_eq!(
            default_directives(Level::TRACE, true),
            "warn,proverbs_core=trace,styled_proverbs=trace"
        );
    }
}

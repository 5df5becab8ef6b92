//! Batch source expansion.

use std::path::Path;

use tracing::{debug, info};

use crate::config::PartialConfigOptions;
use crate::error::ConfigError;

/// File extensions parsed as batch files.
const BATCH_EXTENSIONS: &[&str] = &["json"];

/// Expand a batch source into the partial configs to resolve.
///
/// An existing `.json` file is parsed as an array of partial configs (which
/// may be empty). Anything else, including no source at all, yields one empty
/// partial so the run targets the ambient resource.
pub async fn expand(source: Option<&Path>) -> Result<Vec<PartialConfigOptions>, ConfigError> {
    let Some(path) = source.filter(|p| is_batch_file(p)) else {
        debug!(?source, "No batch file, using single implicit entry");
        return Ok(vec![PartialConfigOptions::default()]);
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ReadBatch {
            path: path.to_path_buf(),
            source,
        })?;

    let entries: Vec<PartialConfigOptions> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseBatch {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), entries = entries.len(), "Loaded batch file");
    Ok(entries)
}

fn is_batch_file(path: &Path) -> bool {
    let recognized = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            BATCH_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);
    recognized && path.is_file()
}

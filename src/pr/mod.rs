pub mod directive;
pub mod types;

pub use types::{ChangelogOptions, FetchedPullRequest, PullRequest};

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Failed to read pull request records: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse pull request records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load already-fetched pull requests from a JSON file.
///
/// The file holds an array of GitHub pull request objects (see
/// `FetchedPullRequest`). Labels are remapped through `category_map`.
#[instrument(skip(category_map), fields(path = %path.display()))]
pub fn load_records(
    path: &Path,
    category_map: &HashMap<String, String>,
    options: ChangelogOptions,
) -> Result<Vec<PullRequest>, PrError> {
    let contents = std::fs::read_to_string(path)?;
    debug!(bytes = contents.len(), "read pull request records");
    parse_records(&contents, category_map, options)
}

/// Parse a JSON array of fetched pull requests into records.
pub fn parse_records(
    json: &str,
    category_map: &HashMap<String, String>,
    options: ChangelogOptions,
) -> Result<Vec<PullRequest>, PrError> {
    let fetched: Vec<FetchedPullRequest> = serde_json::from_str(json)?;
    debug!(records = fetched.len(), "parsed pull request records");
    Ok(fetched
        .into_iter()
        .map(|f| PullRequest::from_fetched(f, category_map, options))
        .collect())
}

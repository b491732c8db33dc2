use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::directive::{self, ParsedDirective};

/// Presentation flags applied when rendering the changelog header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangelogOptions {
    /// Append `([author](author_url))` to the header
    pub include_author: bool,
    /// Append `[\#number](url)` to the header
    pub include_link: bool,
}

/// A merged pull request, as handed over by the fetch layer.
///
/// The directive in the body is parsed on first access to any of
/// `version_filter`, `label_filter`, `change_text_header` or
/// `change_text_body`, and the result is kept for the lifetime of the record.
#[derive(Debug)]
pub struct PullRequest {
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) html_url: String,
    pub(crate) author: String,
    pub(crate) author_url: String,
    pub(crate) merged_at: Option<String>,
    pub(crate) merge_commit: String,
    pub(crate) base_commit: String,
    pub(crate) labels: Vec<String>,
    pub(crate) options: ChangelogOptions,
    parsed: OnceLock<ParsedDirective>,
}

impl PullRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        number: u64,
        title: impl Into<String>,
        body: impl Into<String>,
        html_url: impl Into<String>,
        author: impl Into<String>,
        author_url: impl Into<String>,
        merged_at: Option<String>,
        merge_commit: impl Into<String>,
        base_commit: impl Into<String>,
        labels: Vec<String>,
        options: ChangelogOptions,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            body: body.into(),
            html_url: html_url.into(),
            author: author.into(),
            author_url: author_url.into(),
            merged_at,
            merge_commit: merge_commit.into(),
            base_commit: base_commit.into(),
            labels,
            options,
            parsed: OnceLock::new(),
        }
    }

    /// Build a record from fetched GitHub data, remapping each label through
    /// `category_map`. Labels without a mapping pass through unchanged.
    pub fn from_fetched(
        fetched: FetchedPullRequest,
        category_map: &HashMap<String, String>,
        options: ChangelogOptions,
    ) -> Self {
        let labels = fetched
            .labels
            .into_iter()
            .map(|l| category_map.get(&l.name).cloned().unwrap_or(l.name))
            .collect();

        Self::new(
            fetched.number,
            fetched.title,
            fetched.body.unwrap_or_default(),
            fetched.html_url,
            fetched.user.login,
            fetched.user.html_url,
            fetched.merged_at,
            fetched.merge_commit_sha.unwrap_or_default(),
            fetched.base.sha,
            labels,
            options,
        )
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Version tokens from the directive's metadata block.
    pub fn version_filter(&self) -> &[String] {
        &self.parsed().version_filter
    }

    /// Label tokens from the directive's metadata block, or the GitHub labels
    /// when the directive named none.
    pub fn label_filter(&self) -> &[String] {
        &self.parsed().label_filter
    }

    /// The rendered single-line changelog entry.
    pub fn change_text_header(&self) -> &str {
        &self.parsed().header
    }

    /// The body with the directive stripped.
    pub fn change_text_body(&self) -> &str {
        &self.parsed().body
    }

    fn parsed(&self) -> &ParsedDirective {
        self.parsed.get_or_init(|| directive::parse(self))
    }

    #[cfg(test)]
    pub(crate) fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }
}

// Record fields read by the grouping and emit layers.
#[allow(dead_code)]
impl PullRequest {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn url(&self) -> &str {
        &self.html_url
    }

    pub fn merged_at(&self) -> Option<&str> {
        self.merged_at.as_deref()
    }

    /// Merge commit id.
    pub fn commit(&self) -> &str {
        &self.merge_commit
    }

    pub fn base_commit(&self) -> &str {
        &self.base_commit
    }

    /// Labels from GitHub, already passed through the category mapping.
    pub fn github_labels(&self) -> &[String] {
        &self.labels
    }
}

/// Pull request JSON as produced by the fetch layer (GitHub REST shape).
#[derive(Debug, Clone, Deserialize)]
pub struct FetchedPullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub base: CommitRef,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

//! Changelog directive parsing.
//!
//! A pull request body may carry a directive line of the form
//!
//! ```text
//! cl[ or changelog][: ] [bracket-metadata] [override message]
//! ```
//!
//! e.g. `cl: [3.5, Bug] Fixed race in scheduler`. The bracketed metadata is a
//! comma separated list where `MAJOR.MINOR` tokens select release versions and
//! every other token is a label. The text after the metadata replaces the PR
//! title as the changelog line.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::types::PullRequest;

/// Directive detector: `cl` or `changelog` at the start of a line, then
/// everything up to the end of the body.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static DIRECTIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?imsR)^(cl|changelog)\b[\s:]*(.*)$").unwrap());

/// Metadata bracket extractor: a `[...]` block at the very start of the
/// directive remainder, on a single line.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static METADATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*?)\]").unwrap());

/// Override message extractor: whatever follows an optional leading
/// bracket block, without surrounding whitespace.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static MESSAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?:\[.*?\])?\s*(.*?)\s*$").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9]+\.[0-9]+\s*$").unwrap());

/// Everything derived from one pass over a pull request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDirective {
    /// `MAJOR.MINOR` tokens from the metadata block, in order
    pub version_filter: Vec<String>,
    /// Other metadata tokens, or the GitHub labels when there are none
    pub label_filter: Vec<String>,
    /// Rendered changelog line
    pub header: String,
    /// Body with the directive removed
    pub body: String,
}

/// Parse the changelog directive out of a pull request.
///
/// Never fails: a body without a directive yields the (decorated) title,
/// the unchanged body, no versions and the GitHub labels.
pub fn parse(pr: &PullRequest) -> ParsedDirective {
    let mut header = pr.title.clone();
    if pr.options.include_link {
        header = add_link(pr, &header);
    }
    if pr.options.include_author {
        header = add_author(pr, &header);
    }

    let mut body = pr.body.clone();
    let mut version_filter = Vec::new();
    let mut label_filter = Vec::new();

    if let Some(rest) = find_directive(&pr.body) {
        if let Some(message) = extract_message(rest) {
            header = format_change_text(message, &suffixes(pr));
        }

        if let Some(meta) = extract_metadata(rest) {
            let (versions, labels) = split_metadata(meta);
            version_filter = versions;
            label_filter = labels;
        }

        body = strip_directives(&pr.body);
        debug!(
            pr = pr.number,
            versions = version_filter.len(),
            labels = label_filter.len(),
            "found changelog directive"
        );
    }

    if label_filter.is_empty() {
        label_filter = pr.labels.clone();
    }

    ParsedDirective {
        version_filter,
        label_filter,
        header,
        body,
    }
}

/// Text following the first directive marker, or `None` when the body has no
/// directive.
pub fn find_directive(body: &str) -> Option<&str> {
    DIRECTIVE_PATTERN
        .captures(body)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Interior of the leading `[...]` block of a directive remainder.
pub fn extract_metadata(rest: &str) -> Option<&str> {
    METADATA_PATTERN
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Custom changelog message of a directive remainder, if it is not blank.
pub fn extract_message(rest: &str) -> Option<&str> {
    MESSAGE_PATTERN
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|msg| !msg.trim().is_empty())
}

/// Split metadata on commas into version tokens and label tokens.
/// Blank tokens are dropped.
pub fn split_metadata(meta: &str) -> (Vec<String>, Vec<String>) {
    let mut versions = Vec::new();
    let mut labels = Vec::new();
    for part in meta.split(',') {
        if is_version(part) {
            versions.push(part.trim().to_string());
        } else if !part.trim().is_empty() {
            labels.push(part.trim().to_string());
        }
    }
    (versions, labels)
}

pub fn is_version(token: &str) -> bool {
    VERSION_PATTERN.is_match(token)
}

/// Remove every directive occurrence from the body.
pub fn strip_directives(body: &str) -> String {
    DIRECTIVE_PATTERN.replace_all(body, "").into_owned()
}

fn link_suffix(pr: &PullRequest) -> String {
    format!("[\\#{}]({})", pr.number, pr.html_url)
}

fn author_suffix(pr: &PullRequest) -> String {
    format!("([{}]({}))", pr.author, pr.author_url)
}

fn add_link(pr: &PullRequest, text: &str) -> String {
    format!("{} {}", text.trim(), link_suffix(pr))
}

fn add_author(pr: &PullRequest, text: &str) -> String {
    format!("{} {}", text.trim(), author_suffix(pr))
}

/// Enabled header suffixes, link first.
fn suffixes(pr: &PullRequest) -> Vec<String> {
    let mut out = Vec::with_capacity(2);
    if pr.options.include_link {
        out.push(link_suffix(pr));
    }
    if pr.options.include_author {
        out.push(author_suffix(pr));
    }
    out
}

/// Compose an override message with its suffixes in a single step.
///
/// Unlike the title path, the message is always trimmed, even with no
/// suffixes enabled.
// TODO: confirm with the release owners whether the title path should trim an
// undecorated title the same way; both paths are kept separate until then.
pub fn format_change_text(message: &str, suffixes: &[String]) -> String {
    std::iter::once(message.trim())
        .chain(suffixes.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::types::ChangelogOptions;

    fn pr_with(body: &str, labels: &[&str], options: ChangelogOptions) -> PullRequest {
        PullRequest::new(
            42,
            "PR title",
            body,
            "http://x/42",
            "alice",
            "http://x/alice",
            None,
            "abc123",
            "def456",
            labels.iter().map(|l| l.to_string()).collect(),
            options,
        )
    }

    fn plain(body: &str) -> PullRequest {
        pr_with(body, &["feature", "ui"], ChangelogOptions::default())
    }

    fn decorated(body: &str) -> PullRequest {
        pr_with(
            body,
            &[],
            ChangelogOptions {
                include_author: true,
                include_link: true,
            },
        )
    }

    #[test]
    fn test_directive_with_metadata_and_message() {
        let pr = plain("cl: [3.5, Bug] Fixed it");
        assert_eq!(pr.version_filter(), ["3.5"]);
        assert_eq!(pr.label_filter(), ["Bug"]);
        assert_eq!(pr.change_text_header(), "Fixed it");
        assert_eq!(pr.change_text_body(), "");
    }

    #[test]
    fn test_override_with_link_and_author() {
        let pr = decorated("cl: [3.5, Bug] Fixed it");
        assert_eq!(
            pr.change_text_header(),
            "Fixed it [\\#42](http://x/42) ([alice](http://x/alice))"
        );
    }

    #[test]
    fn test_override_with_link_only() {
        let pr = pr_with(
            "changelog Improved startup time",
            &[],
            ChangelogOptions {
                include_author: false,
                include_link: true,
            },
        );
        assert_eq!(pr.change_text_header(), "Improved startup time [\\#42](http://x/42)");
    }

    #[test]
    fn test_override_with_author_only() {
        let pr = pr_with(
            "cl Improved startup time",
            &[],
            ChangelogOptions {
                include_author: true,
                include_link: false,
            },
        );
        assert_eq!(pr.change_text_header(), "Improved startup time ([alice](http://x/alice))");
    }

    #[test]
    fn test_no_directive() {
        let pr = plain("no directive here");
        assert!(pr.version_filter().is_empty());
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
        assert_eq!(pr.change_text_header(), "PR title");
        assert_eq!(pr.change_text_body(), "no directive here");
    }

    #[test]
    fn test_no_directive_decorates_title() {
        let pr = decorated("nothing to see");
        assert_eq!(
            pr.change_text_header(),
            "PR title [\\#42](http://x/42) ([alice](http://x/alice))"
        );
        assert_eq!(pr.change_text_body(), "nothing to see");
    }

    #[test]
    fn test_blank_metadata_falls_back() {
        let pr = plain("changelog [  ]");
        assert!(pr.version_filter().is_empty());
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
        assert_eq!(pr.change_text_header(), "PR title");
    }

    #[test]
    fn test_bare_marker() {
        let pr = plain("Some context\ncl");
        assert!(pr.version_filter().is_empty());
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
        assert_eq!(pr.change_text_header(), "PR title");
        assert_eq!(pr.change_text_body(), "Some context\n");
    }

    #[test]
    fn test_message_without_metadata() {
        let pr = plain("changelog Improved startup time");
        assert_eq!(pr.change_text_header(), "Improved startup time");
        assert!(pr.version_filter().is_empty());
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
    }

    #[test]
    fn test_versions_only_falls_back_to_github_labels() {
        let pr = plain("cl: [3.5, 4.0]");
        assert_eq!(pr.version_filter(), ["3.5", "4.0"]);
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
    }

    #[test]
    fn test_token_order_preserved() {
        let pr = plain("cl [Kernel, 3.5, , Cypher ,4.1,  Docs] Message");
        assert_eq!(pr.version_filter(), ["3.5", "4.1"]);
        assert_eq!(pr.label_filter(), ["Kernel", "Cypher", "Docs"]);
    }

    #[test]
    fn test_directive_case_insensitive() {
        let pr = plain("Intro text\n\nChangeLog: [3.4] Better errors");
        assert_eq!(pr.version_filter(), ["3.4"]);
        assert_eq!(pr.change_text_header(), "Better errors");
        assert_eq!(pr.change_text_body(), "Intro text\n\n");
    }

    #[test]
    fn test_marker_must_start_line() {
        let pr = plain("please add a cl: [3.5] entry");
        assert!(pr.version_filter().is_empty());
        assert_eq!(pr.change_text_header(), "PR title");
    }

    #[test]
    fn test_marker_must_be_whole_word() {
        let pr = plain("cleanup of the scheduler");
        assert_eq!(pr.change_text_header(), "PR title");
        assert_eq!(pr.change_text_body(), "cleanup of the scheduler");
    }

    #[test]
    fn test_crlf_body() {
        let pr = plain("Description\r\ncl: [3.5, Bug] Fixed it\r\n");
        assert_eq!(pr.version_filter(), ["3.5"]);
        assert_eq!(pr.label_filter(), ["Bug"]);
        assert_eq!(pr.change_text_header(), "Fixed it");
        assert_eq!(pr.change_text_body(), "Description\r\n");
    }

    #[test]
    fn test_empty_body() {
        let pr = plain("");
        assert_eq!(pr.change_text_header(), "PR title");
        assert_eq!(pr.change_text_body(), "");
        assert_eq!(pr.label_filter(), ["feature", "ui"]);
    }

    #[test]
    fn test_multiline_message_kept() {
        let pr = plain("cl: [Bug]\nFirst line\nsecond line\n\n");
        assert_eq!(pr.label_filter(), ["Bug"]);
        assert_eq!(pr.change_text_header(), "First line\nsecond line");
    }

    #[test]
    fn test_body_never_contains_marker() {
        for body in ["cl", "text\ncl: x", "a\nchangelog\n[1.0] m", "CL: [Bug]"] {
            let pr = plain(body);
            let stripped = pr.change_text_body().to_lowercase();
            assert!(!stripped.lines().any(|l| l.starts_with("cl") || l.starts_with("changelog")));
        }
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let pr = decorated("cl: [3.5, Bug] Fixed it");
        let first = pr.change_text_header().to_string();
        assert_eq!(pr.change_text_header(), first);
        assert_eq!(pr.label_filter(), pr.label_filter());
        assert!(std::ptr::eq(pr.version_filter(), pr.version_filter()));
    }

    #[test]
    fn test_concurrent_access_parses_once() {
        let pr = plain("cl: [3.5, Bug] Fixed it");
        let headers: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| pr.change_text_header().as_ptr() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(headers.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_title_untrimmed_without_flags() {
        let mut pr = plain("no directive");
        pr.title = "  Spaced title ".to_string();
        assert_eq!(pr.change_text_header(), "  Spaced title ");
    }

    #[test]
    fn test_find_directive() {
        assert_eq!(find_directive("cl: [1.0] x"), Some("[1.0] x"));
        assert_eq!(find_directive("changelog"), Some(""));
        assert_eq!(find_directive("hello\nCL   message"), Some("message"));
        assert_eq!(find_directive("no marker"), None);
    }

    #[test]
    fn test_extract_metadata() {
        assert_eq!(extract_metadata("[3.5, Bug] Fixed"), Some("3.5, Bug"));
        assert_eq!(extract_metadata("[] Fixed"), Some(""));
        assert_eq!(extract_metadata("Fixed [3.5]"), None);
        assert_eq!(extract_metadata("[3.5\n] Fixed"), None);
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message("[3.5, Bug]  Fixed it  "), Some("Fixed it"));
        assert_eq!(extract_message("Fixed it"), Some("Fixed it"));
        assert_eq!(extract_message("[3.5]"), None);
        assert_eq!(extract_message("   "), None);
    }

    #[test]
    fn test_is_version() {
        assert!(is_version("3.5"));
        assert!(is_version(" 10.12 "));
        assert!(!is_version("3"));
        assert!(!is_version("3.5.1"));
        assert!(!is_version("v3.5"));
        assert!(!is_version("Bug"));
    }

    #[test]
    fn test_format_change_text() {
        assert_eq!(format_change_text("  msg ", &[]), "msg");
        assert_eq!(
            format_change_text("msg", &["a".to_string(), "b".to_string()]),
            "msg a b"
        );
    }
}

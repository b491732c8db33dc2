/// A single changelog line derived from one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// PR number
    pub number: u64,
    /// Rendered changelog line
    pub header: String,
    /// PR description without the changelog directive
    pub body: String,
    /// Release versions the entry is pinned to (empty means any)
    pub versions: Vec<String>,
    /// Labels the entry is filed under
    pub labels: Vec<String>,
}

impl ChangelogEntry {
    /// Comma separated filter list, or `-` when empty.
    pub fn display_list(items: &[String]) -> String {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    }
}

/// Changelog for a set of pull requests, in input order.
#[derive(Debug)]
pub struct Report {
    pub entries: Vec<ChangelogEntry>,
}

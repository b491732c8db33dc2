pub mod types;

pub use types::{ChangelogEntry, Report};

use crate::pr::PullRequest;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write changelog file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report with one entry per pull request.
pub fn build(prs: &[PullRequest]) -> Report {
    let entries = prs
        .iter()
        .map(|pr| ChangelogEntry {
            number: pr.number(),
            header: pr.change_text_header().to_string(),
            body: pr.change_text_body().trim().to_string(),
            versions: pr.version_filter().to_vec(),
            labels: pr.label_filter().to_vec(),
        })
        .collect();

    Report { entries }
}

/// Output the changelog to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(entries = report.entries.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing changelog to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing changelog to file");
            std::fs::write(path, render_markdown(report))?;
            Ok(())
        }
    }
}

/// Print the changelog to the terminal with colors:
///
/// ```text
/// #42 Fixed race in scheduler
///     versions: 3.5 | labels: Bug
/// ```
fn print_terminal_report(report: &Report) {
    println!();
    if report.entries.is_empty() {
        println!("  No changelog entries.");
    }
    for entry in &report.entries {
        println!(
            "{} {}",
            format!("#{}", entry.number).cyan().bold(),
            entry.header
        );
        println!(
            "    versions: {} | labels: {}",
            ChangelogEntry::display_list(&entry.versions).yellow(),
            ChangelogEntry::display_list(&entry.labels).green()
        );
    }
    println!();
}

/// Render the changelog as markdown:
///
/// ```text
/// - Fixed race in scheduler
///   *versions: 3.5 | labels: Bug*
///
///   > longer description
/// ```
fn render_markdown(report: &Report) -> String {
    let mut md = String::from("# Changelog\n\n");
    for entry in &report.entries {
        md.push_str(&format!("- {}\n", entry.header));
        md.push_str(&format!(
            "  *versions: {} | labels: {}*\n",
            ChangelogEntry::display_list(&entry.versions),
            ChangelogEntry::display_list(&entry.labels)
        ));
        if !entry.body.is_empty() {
            md.push('\n');
            for line in entry.body.lines() {
                if line.trim().is_empty() {
                    md.push_str("  >\n");
                } else {
                    md.push_str(&format!("  > {}\n", line.trim_end()));
                }
            }
        }
    }
    md
}

mod config;
mod pr;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Changelog — CLI tool that turns merged GitHub Pull Requests into
/// changelog entries using the `cl:` / `changelog:` directive in each PR description.
#[derive(Parser, Debug)]
#[command(name = "pr-changelog", version, about)]
struct Cli {
    /// JSON file holding an array of fetched GitHub pull requests
    ///
    /// Not required when --mock is used.
    input: Option<PathBuf>,

    /// Optional output file path for the markdown changelog
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to .pr-changelog.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Credit the PR author on each entry
    #[arg(long)]
    include_author: bool,

    /// Link each entry back to its PR
    #[arg(long)]
    include_link: bool,

    /// Use built-in mock PR data for demo purposes
    #[arg(long)]
    r#mock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    let options = config.options(cli.include_author, cli.include_link);
    debug!(include_author = options.include_author, include_link = options.include_link, categories = config.categories.len(), "resolved options");

    let pull_requests = if cli.r#mock {
        info!("using mock PR data for demo");
        let records = include_str!("../tests/fixtures/sample_prs.json");
        pr::parse_records(records, &config.categories, options)?
    } else {
        let input = cli.input.as_deref().ok_or(
            "Input file is required unless --mock is used. Usage: pr-changelog <FILE> or pr-changelog --mock",
        )?;

        let _main_span = info_span!("pr_changelog", input = %input.display()).entered();

        info!("loading pull request records");
        pr::load_records(input, &config.categories, options)?
    };
    info!(records = pull_requests.len(), "loaded pull requests");

    info!("building changelog");
    let built_report = report::build(&pull_requests);
    report::output(&built_report, cli.output.as_deref())?;
    info!(entries = built_report.entries.len(), "done");

    Ok(())
}

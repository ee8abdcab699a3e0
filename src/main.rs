//! Commit tag usage report generator
//!
//! Fetches a repository's commits from GitHub and writes the report to disk.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use tagstats::analysis::aggregate;
use tagstats::cli::Cli;
use tagstats::config::{FileConfig, Settings};
use tagstats::plotting::{write_report_async, ReportTheme};
use tagstats::source::{fetch_all_commits, GitHubSource};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the verbosity flags
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file = FileConfig::load(cli.config_file.as_deref())?;
    let settings = Settings::resolve(&cli, file)?;
    let classifier = settings.classifier();

    info!(
        "Analyzing {}/{} ({})",
        settings.github.owner,
        settings.github.repo,
        if settings.branch.is_empty() { "default branch" } else { settings.branch.as_str() }
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping retrieval");
            on_signal.cancel();
        }
    });

    let source =
        GitHubSource::new(settings.github.clone()).context("Failed to create GitHub client")?;
    let outcome = fetch_all_commits(&source, &settings.branch, &settings.pagination, &cancel)
        .await
        .context("Failed to fetch commit history")?;

    if let Some(failure) = &outcome.failure {
        warn!(
            "Report is partial: retrieval stopped after {} pages ({})",
            outcome.pages_fetched, failure
        );
    }
    if outcome.truncated {
        warn!("Report covers only the first {} pages", outcome.pages_fetched);
    }

    let data = aggregate(outcome.records, &classifier);
    info!(
        "{} commits, {} AI-tagged ({:.2}%)",
        data.totals.total_commits, data.totals.tagged_commits, data.totals.ai_percentage
    );

    let plan = settings.layout.plan(&data, classifier.rules());
    let path = write_report_async(plan, ReportTheme::default(), settings.output.clone())
        .await
        .context("Failed to write report")?;
    println!("{}", path.display());
    Ok(())
}

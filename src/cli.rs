use clap::Parser;
use std::path::PathBuf;

use crate::analysis::AiUsageRule;
use crate::plotting::{PieSource, SectionKind};
use crate::source::FailurePolicy;

/// Commit tag usage report generator
#[derive(Parser, Debug, Default)]
#[command(name = "tagstats")]
#[command(
    about = "Fetches a GitHub repository's commits, classifies them by message tags \
             and renders a usage report"
)]
#[command(version)]
pub struct Cli {
    /// Repository owner (user or organisation)
    #[arg(short = 'o', long, value_name = "OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(short = 'r', long, value_name = "REPO")]
    pub repo: Option<String>,

    /// Branch, tag or commit SHA to walk (defaults to the repository's default branch)
    #[arg(short = 'b', long, value_name = "REF")]
    pub branch: Option<String>,

    /// Access token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Only commits after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(short = 'S', long, value_name = "DATE")]
    pub since: Option<String>,

    /// Only commits before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(short = 'U', long, value_name = "DATE")]
    pub until: Option<String>,

    /// Output file; `.png` renders a bitmap, anything else SVG
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Base URL of the GitHub API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Commits requested per page
    #[arg(long, value_name = "N")]
    pub per_page: Option<u32>,

    /// Stop after this many pages even if more are advertised
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// What to do when a page fails after earlier pages succeeded: partial or abort
    #[arg(long, value_name = "POLICY")]
    pub failure_policy: Option<FailurePolicy>,

    /// Which commits count as AI-tagged: any, tag:<name> or marker:<text>
    #[arg(long, value_name = "RULE")]
    pub ai_rule: Option<AiUsageRule>,

    /// Pie chart contents: ai, tags or none
    #[arg(long, value_name = "SOURCE")]
    pub pie: Option<PieSource>,

    /// Comma separated section order, e.g. header,summary,authors:bars,tags:grid,legend
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub sections: Option<Vec<SectionKind>>,

    /// Report title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Verbose output (debug level logging)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Info
        }
    }
}

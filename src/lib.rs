//! # Commit Tag Usage Reports
//!
//! `tagstats` fetches a repository's commit history from the GitHub REST API,
//! classifies every commit message by the tags it mentions (`feat`, `fix`,
//! `ai`, ...) and lays the resulting statistics out as a single-page report.
//!
//! The pipeline has four stages:
//!
//! - [`source`]: paginated retrieval behind the [`source::CommitSource`] trait
//! - [`analysis`]: tag classification and per-author / per-tag aggregation
//! - [`plotting`]: geometry, two-phase report layout and rendering to SVG or PNG
//! - [`config`]: CLI flags merged with an optional TOML file
//!
//! ## Example
//!
//! ```no_run
//! use tagstats::analysis::{aggregate, TagClassifier};
//! use tagstats::plotting::{write_report, ReportLayout, ReportTheme};
//! use tagstats::source::{fetch_all_commits, GitHubConfig, GitHubSource, PaginationOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> tagstats::error::Result<()> {
//! let source = GitHubSource::new(GitHubConfig::new("rust-lang", "rust"))?;
//! let options = PaginationOptions::default();
//! let outcome = fetch_all_commits(&source, "master", &options, &CancellationToken::new()).await?;
//!
//! let classifier = TagClassifier::default();
//! let data = aggregate(outcome.records, &classifier);
//! let plan = ReportLayout::default().plan(&data, classifier.rules());
//! write_report(&plan, &ReportTheme::default(), "report.svg".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod plotting;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use error::{ReportError, Result};
pub use types::{Commit, FrequencyTable, RawCommit, ReportData, ReportTotals};

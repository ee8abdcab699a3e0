use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

use super::CommitSource;
use crate::error::{ReportError, Result};
use crate::types::RawCommit;

/// Upper bound on requested pages in case a source never clears its cue.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// What to do when a page fails after earlier pages succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the commits collected so far and report on them.
    #[default]
    Partial,
    /// Fail the whole run.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partial" => Ok(FailurePolicy::Partial),
            "abort" => Ok(FailurePolicy::Abort),
            _ => Err(format!(
                "Invalid failure policy: {}. Valid options: partial, abort",
                s
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Partial => write!(f, "partial"),
            FailurePolicy::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    pub max_pages: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// The records collected by [`fetch_all_commits`].
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawCommit>,
    pub pages_fetched: u32,
    /// The error that stopped pagination early under [`FailurePolicy::Partial`].
    pub failure: Option<ReportError>,
    /// Set when the page limit stopped pagination while the source still
    /// advertised a next page.
    pub truncated: bool,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && !self.truncated
    }
}

/// Fetch every page of `branch`, starting at page 1 and following the
/// continuation cue.
///
/// Pages are requested strictly in order and only when the previous page
/// advertised a `next` relation. A failure on the first page is always an
/// error. Cancelling `cancel` drops everything collected so far.
pub async fn fetch_all_commits<S>(
    source: &S,
    branch: &str,
    options: &PaginationOptions,
    cancel: &CancellationToken,
) -> Result<FetchOutcome>
where
    S: CommitSource + ?Sized,
{
    let mut outcome = FetchOutcome::default();
    let mut page = 1u32;

    loop {
        if outcome.pages_fetched >= options.max_pages {
            warn!(
                "Stopped after {} pages although the source advertised more; \
                 the report may be incomplete",
                outcome.pages_fetched
            );
            outcome.truncated = true;
            break;
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReportError::Cancelled),
            response = source.fetch_page(branch, page) => response,
        };

        match response {
            Ok(commit_page) => {
                outcome.pages_fetched += 1;
                let has_next = commit_page.has_next();
                debug!(
                    "Fetched page {} ({} records, next page: {})",
                    page,
                    commit_page.records.len(),
                    has_next
                );
                outcome.records.extend(commit_page.records);
                if !has_next {
                    break;
                }
                page += 1;
            }
            Err(e) if outcome.pages_fetched == 0 => return Err(e),
            Err(e) if options.failure_policy == FailurePolicy::Abort => return Err(e),
            Err(e) => {
                warn!(
                    "Fetching page {} failed ({}); continuing with {} records from {} pages",
                    page,
                    e,
                    outcome.records.len(),
                    outcome.pages_fetched
                );
                outcome.failure = Some(e);
                break;
            }
        }
    }

    info!(
        "Collected {} commit records from {} pages",
        outcome.records.len(),
        outcome.pages_fetched
    );
    Ok(outcome)
}

//! Commit retrieval: the [`CommitSource`] seam, the GitHub adapter and the
//! pagination controller that drives it.

pub mod github;
pub mod pagination;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RawCommit;

pub use github::{GitHubConfig, GitHubSource};
pub use pagination::{fetch_all_commits, FailurePolicy, FetchOutcome, PaginationOptions};

/// The relations advertised by a `Link` response header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationCue {
    relations: Vec<String>,
}

impl ContinuationCue {
    pub fn new<I, S>(relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relations: relations.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a header of the form `<url>; rel="next", <url>; rel="last"`.
    ///
    /// A single link may carry several space separated relation types.
    pub fn from_link_header(value: &str) -> Self {
        let relations = value
            .split(',')
            .flat_map(|link| link.split(';').skip(1))
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                if name.trim().eq_ignore_ascii_case("rel") {
                    Some(value.trim().trim_matches('"').to_string())
                } else {
                    None
                }
            })
            .flat_map(|rel| {
                rel.split_whitespace()
                    .map(|r| r.to_ascii_lowercase())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { relations }
    }

    pub fn has_next(&self) -> bool {
        self.relations.iter().any(|r| r == "next")
    }

    pub fn relations(&self) -> &[String] {
        &self.relations
    }
}

/// One page of commit records.
#[derive(Debug, Clone, Default)]
pub struct CommitPage {
    pub records: Vec<RawCommit>,
    /// `None` when the response carried no continuation cue at all.
    pub cue: Option<ContinuationCue>,
}

impl CommitPage {
    pub fn has_next(&self) -> bool {
        self.cue.as_ref().is_some_and(ContinuationCue::has_next)
    }
}

/// Something that serves commit history one page at a time.
///
/// Pages are numbered from 1. A non-success answer must be reported as
/// [`crate::error::ReportError::FetchFailed`].
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn fetch_page(&self, branch: &str, page: u32) -> Result<CommitPage>;
}

//! Error type shared by the fetch, analysis and plotting layers.

use thiserror::Error;

/// Everything that can go wrong between requesting the first commit page and
/// writing the finished report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The commit source answered with a non-success status.
    #[error("commit source returned status {status}")]
    FetchFailed { status: u16 },

    /// Transport-level failure (connection refused, timeout, TLS...).
    #[error("request to commit source failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A page body that is not a JSON array of commit objects.
    #[error("could not decode commit page: {0}")]
    Decode(#[from] serde_json::Error),

    /// A commit record without a message or without any author identity.
    #[error("malformed commit record: {reason}")]
    MalformedCommitRecord { reason: String },

    /// Empty or degenerate data handed to the chart geometry functions.
    #[error("invalid chart input: {0}")]
    InvalidChartInput(String),

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The run was cancelled while commits were being fetched.
    #[error("operation cancelled")]
    Cancelled,
}

impl ReportError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ReportError::MalformedCommitRecord {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_chart(reason: impl Into<String>) -> Self {
        ReportError::InvalidChartInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

//! # Common Types
//!
//! This module contains the types passed between the fetch, analysis and
//! plotting layers: commit records in their wire and validated shapes,
//! frequency tables and the report totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::ReportError;

/// One commit object as returned by the GitHub commits endpoint.
///
/// Every field is optional so that a single odd record never fails the whole
/// page; validation happens in [`Commit::try_from`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCommit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub commit: Option<RawCommitDetails>,
    /// The linked GitHub account; `null` when the author email is not
    /// associated with an account.
    #[serde(default)]
    pub author: Option<RawAccount>,
    /// Why the element could not be decoded. A rejected record never
    /// validates.
    #[serde(skip)]
    pub rejected: Option<String>,
}

impl RawCommit {
    /// Decode one element of a commit page.
    ///
    /// Elements with wrong-typed fields, or that are not objects at all, come
    /// back rejected instead of failing the whole page.
    pub fn from_value(value: serde_json::Value) -> Self {
        let sha = value.get("sha").and_then(|v| v.as_str()).map(str::to_string);
        serde_json::from_value(value).unwrap_or_else(|e| RawCommit {
            sha,
            rejected: Some(e.to_string()),
            ..RawCommit::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCommitDetails {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<RawSignature>,
}

/// The git author signature embedded in a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAccount {
    #[serde(default)]
    pub login: Option<String>,
}

/// A validated commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: Option<String>,
    pub message: String,
    /// GitHub login when available, otherwise the author email or name.
    pub author: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn new(message: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            sha: None,
            message: message.into(),
            author: author.into(),
            timestamp: None,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl TryFrom<RawCommit> for Commit {
    type Error = ReportError;

    fn try_from(raw: RawCommit) -> Result<Self, Self::Error> {
        let sha = raw.sha;
        if let Some(reason) = raw.rejected {
            return Err(ReportError::malformed(format!("{}: {}", describe(&sha), reason)));
        }
        let details = raw
            .commit
            .ok_or_else(|| {
                ReportError::malformed(format!("{} has no commit details", describe(&sha)))
            })?;
        let message = details
            .message
            .ok_or_else(|| ReportError::malformed(format!("{} has no message", describe(&sha))))?;

        let signature = details.author.unwrap_or_default();
        let login = raw.author.as_ref().and_then(|a| non_empty(a.login.as_ref()));
        let author = login
            .or_else(|| non_empty(signature.email.as_ref()))
            .or_else(|| non_empty(signature.name.as_ref()))
            .map(str::to_string)
            .ok_or_else(|| {
                ReportError::malformed(format!("{} has no author identity", describe(&sha)))
            })?;

        let timestamp = signature
            .date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc));

        Ok(Commit {
            sha,
            message,
            author,
            timestamp,
        })
    }
}

fn describe(sha: &Option<String>) -> String {
    match sha {
        Some(sha) => format!("commit {}", sha),
        None => "commit without sha".to_string(),
    }
}

/// An ordered mapping from a key (author or tag) to an occurrence count.
///
/// Iteration follows first-seen order; use [`FrequencyTable::sorted_by_count`]
/// for display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `key` by one, inserting it with a zero count first if absent.
    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, amount: usize) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), 0));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1 += amount;
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn sum(&self) -> usize {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn max(&self) -> Option<usize> {
        self.entries.iter().map(|(_, v)| *v).max()
    }

    /// Entries sorted by descending count; ties keep first-seen order.
    pub fn sorted_by_count(&self) -> Vec<(String, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Order-free view, used to compare tables as mappings.
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.entries.iter().cloned().collect()
    }
}

/// Scalar totals shown in the summary block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportTotals {
    pub total_commits: usize,
    /// Commits counted as AI-tagged under the configured rule.
    pub tagged_commits: usize,
    pub ai_percentage: f64,
    /// Records dropped because they were malformed.
    pub skipped_records: usize,
}

impl ReportTotals {
    pub fn new(total_commits: usize, tagged_commits: usize, skipped_records: usize) -> Self {
        let ai_percentage = if total_commits > 0 {
            tagged_commits as f64 / total_commits as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_commits,
            tagged_commits,
            ai_percentage,
            skipped_records,
        }
    }
}

/// The result of aggregating a commit history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportData {
    pub authors: FrequencyTable,
    pub tags: FrequencyTable,
    pub totals: ReportTotals,
}

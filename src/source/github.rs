use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::header::{ACCEPT, LINK};
use reqwest::Client;
use std::time::Duration;

use super::{CommitPage, CommitSource, ContinuationCue};
use crate::error::{ReportError, Result};
use crate::types::RawCommit;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
const USER_AGENT: &str = concat!("tagstats/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the GitHub commits endpoint.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            since: None,
            until: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`CommitSource`] backed by `GET /repos/{owner}/{repo}/commits`.
pub struct GitHubSource {
    client: Client,
    config: GitHubConfig,
}

impl GitHubSource {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn commits_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/commits",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    fn query(&self, branch: &str, page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", self.config.per_page.to_string()),
        ];
        if !branch.is_empty() {
            query.push(("sha", branch.to_string()));
        }
        if let Some(since) = self.config.since {
            query.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(until) = self.config.until {
            query.push(("until", until.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        query
    }
}

#[async_trait]
impl CommitSource for GitHubSource {
    async fn fetch_page(&self, branch: &str, page: u32) -> Result<CommitPage> {
        let mut request = self
            .client
            .get(self.commits_url())
            .header(ACCEPT, "application/vnd.github+json")
            .query(&self.query(branch, page));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let cue = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(ContinuationCue::from_link_header);
        let body = response.text().await?;
        let elements: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        let records: Vec<RawCommit> = elements.into_iter().map(RawCommit::from_value).collect();
        debug!(
            "page {} of {}/{}: {} records, next={}",
            page,
            self.config.owner,
            self.config.repo,
            records.len(),
            cue.as_ref().is_some_and(ContinuationCue::has_next)
        );

        Ok(CommitPage { records, cue })
    }
}

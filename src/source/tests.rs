use super::*;
use crate::error::ReportError;
use crate::types::{RawCommit, RawCommitDetails};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

enum Scripted {
    Page { records: usize, cue: Option<&'static str> },
    Status(u16),
}

/// Serves a fixed script of pages and remembers which pages were asked for.
struct ScriptedSource {
    script: Vec<Scripted>,
    requested: Mutex<Vec<u32>>,
}

impl ScriptedSource {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

fn record(n: usize) -> RawCommit {
    RawCommit {
        sha: Some(format!("sha{}", n)),
        commit: Some(RawCommitDetails {
            message: Some(format!("feat: change {}", n)),
            author: None,
        }),
        ..RawCommit::default()
    }
}

#[async_trait::async_trait]
impl CommitSource for ScriptedSource {
    async fn fetch_page(&self, _branch: &str, page: u32) -> crate::error::Result<CommitPage> {
        self.requested.lock().unwrap().push(page);
        let step = self
            .script
            .get(page as usize - 1)
            .unwrap_or_else(|| panic!("page {} was never cued", page));
        match step {
            Scripted::Page { records, cue } => Ok(CommitPage {
                records: (0..*records).map(record).collect(),
                cue: cue.map(ContinuationCue::from_link_header),
            }),
            Scripted::Status(status) => Err(ReportError::FetchFailed { status: *status }),
        }
    }
}

/// Always claims there is another page.
struct EndlessSource;

#[async_trait::async_trait]
impl CommitSource for EndlessSource {
    async fn fetch_page(&self, _branch: &str, _page: u32) -> crate::error::Result<CommitPage> {
        Ok(CommitPage {
            records: vec![record(0)],
            cue: Some(ContinuationCue::new(["next"])),
        })
    }
}

const NEXT: &str = concat!(
    r#"<https://api.github.com/repos/o/r/commits?page=2>; rel="next", "#,
    r#"<https://api.github.com/repos/o/r/commits?page=9>; rel="last""#,
);
const LAST_ONLY: &str = concat!(
    r#"<https://api.github.com/repos/o/r/commits?page=1>; rel="first", "#,
    r#"<https://api.github.com/repos/o/r/commits?page=1>; rel="prev""#,
);

async fn fetch_with_defaults(source: &ScriptedSource) -> crate::error::Result<FetchOutcome> {
    fetch_all_commits(source, "main", &PaginationOptions::default(), &CancellationToken::new())
        .await
}

#[test]
fn test_link_header_relations() {
    let cue = ContinuationCue::from_link_header(NEXT);
    assert_eq!(cue.relations(), &["next".to_string(), "last".to_string()]);
    assert!(cue.has_next());

    assert!(!ContinuationCue::from_link_header(LAST_ONLY).has_next());
    assert!(!ContinuationCue::from_link_header("").has_next());
}

#[test]
fn test_link_header_multiple_relations_in_one_link() {
    let cue = ContinuationCue::from_link_header(r#"<https://x/?page=2>; rel="NEXT last""#);
    assert!(cue.has_next());
    assert_eq!(cue.relations().len(), 2);
}

#[tokio::test]
async fn test_fetches_exactly_the_cued_pages() {
    let source = ScriptedSource::new(vec![
        Scripted::Page { records: 3, cue: Some(NEXT) },
        Scripted::Page { records: 2, cue: None },
    ]);

    let outcome = fetch_with_defaults(&source).await.unwrap();

    assert_eq!(source.requested(), vec![1, 2]);
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.records.len(), 5);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_cue_without_next_relation_terminates() {
    let source = ScriptedSource::new(vec![Scripted::Page { records: 1, cue: Some(LAST_ONLY) }]);

    let outcome = assert_ok!(fetch_with_defaults(&source).await);

    assert_eq!(source.requested(), vec![1]);
    assert_eq!(outcome.records.len(), 1);
}

#[tokio::test]
async fn test_records_keep_page_order() {
    let source = ScriptedSource::new(vec![
        Scripted::Page { records: 2, cue: Some(NEXT) },
        Scripted::Page { records: 1, cue: Some(NEXT) },
        Scripted::Page { records: 1, cue: None },
    ]);

    let outcome = fetch_with_defaults(&source).await.unwrap();

    let shas: Vec<_> = outcome.records.iter().map(|r| r.sha.clone().unwrap()).collect();
    assert_eq!(shas, vec!["sha0", "sha1", "sha0", "sha0"]);
    assert_eq!(outcome.pages_fetched, 3);
}

#[tokio::test]
async fn test_first_page_failure_is_an_error() {
    let source = ScriptedSource::new(vec![Scripted::Status(401)]);

    let result = fetch_with_defaults(&source).await;

    let err = assert_err!(result);
    assert!(matches!(err, ReportError::FetchFailed { status: 401 }));
    assert_eq!(source.requested(), vec![1]);
}

#[tokio::test]
async fn test_partial_policy_keeps_collected_records() {
    let source = ScriptedSource::new(vec![
        Scripted::Page { records: 4, cue: Some(NEXT) },
        Scripted::Status(502),
    ]);

    let outcome = fetch_with_defaults(&source).await.unwrap();

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.pages_fetched, 1);
    assert!(matches!(outcome.failure, Some(ReportError::FetchFailed { status: 502 })));
    assert!(!outcome.is_complete());
}

#[tokio::test]
async fn test_abort_policy_discards_progress() {
    let source = ScriptedSource::new(vec![
        Scripted::Page { records: 4, cue: Some(NEXT) },
        Scripted::Status(500),
    ]);
    let options = PaginationOptions {
        failure_policy: FailurePolicy::Abort,
        ..PaginationOptions::default()
    };

    let result = fetch_all_commits(&source, "main", &options, &CancellationToken::new()).await;

    assert!(matches!(result, Err(ReportError::FetchFailed { status: 500 })));
    assert_eq!(source.requested(), vec![1, 2]);
}

#[tokio::test]
async fn test_page_limit_bounds_a_cue_that_never_clears() {
    let options = PaginationOptions {
        max_pages: 25,
        ..PaginationOptions::default()
    };

    let outcome = fetch_all_commits(&EndlessSource, "main", &options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.pages_fetched, 25);
    assert_eq!(outcome.records.len(), 25);
    assert!(outcome.truncated);
}

#[tokio::test]
async fn test_cancelled_fetch_returns_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let options = PaginationOptions::default();
    let result = fetch_all_commits(&EndlessSource, "main", &options, &cancel).await;

    assert!(matches!(result, Err(ReportError::Cancelled)));
}

/// Serves page 1, then parks every later request until released.
struct StallingSource {
    started: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl CommitSource for StallingSource {
    async fn fetch_page(&self, _branch: &str, page: u32) -> crate::error::Result<CommitPage> {
        if page > 1 {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(CommitPage {
            records: vec![record(page as usize)],
            cue: Some(ContinuationCue::new(["next"])),
        })
    }
}

#[tokio::test]
async fn test_cancel_during_inflight_request_discards_records() {
    let source = Arc::new(StallingSource {
        started: Notify::new(),
        release: Notify::new(),
    });
    let cancel = CancellationToken::new();

    let fetch = tokio::spawn({
        let source = Arc::clone(&source);
        let cancel = cancel.clone();
        async move {
            let options = PaginationOptions::default();
            fetch_all_commits(source.as_ref(), "main", &options, &cancel).await
        }
    });

    source.started.notified().await;
    cancel.cancel();

    let result = fetch.await.unwrap();
    assert!(matches!(result, Err(ReportError::Cancelled)));
}

#[test]
fn test_failure_policy_parsing() {
    assert_eq!("partial".parse::<FailurePolicy>(), Ok(FailurePolicy::Partial));
    assert_eq!("ABORT".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
    assert!("retry".parse::<FailurePolicy>().is_err());
}

use log::{debug, warn};

use super::classify::TagClassifier;
use crate::types::{Commit, FrequencyTable, RawCommit, ReportData, ReportTotals};

/// Folds commits into author and tag frequency tables.
pub struct Aggregator<'c> {
    classifier: &'c TagClassifier,
    authors: FrequencyTable,
    tags: FrequencyTable,
    total_commits: usize,
    tagged_commits: usize,
    skipped_records: usize,
}

impl<'c> Aggregator<'c> {
    pub fn new(classifier: &'c TagClassifier) -> Self {
        Self {
            classifier,
            authors: FrequencyTable::new(),
            tags: FrequencyTable::new(),
            total_commits: 0,
            tagged_commits: 0,
            skipped_records: 0,
        }
    }

    pub fn add(&mut self, commit: &Commit) {
        let (tags, ai_tagged) = self.classifier.inspect(&commit.message);
        self.authors.increment(&commit.author);
        for tag in tags.iter() {
            self.tags.increment(tag);
        }
        self.total_commits += 1;
        if ai_tagged {
            self.tagged_commits += 1;
        }
    }

    /// Validate a wire record and add it; malformed records are skipped.
    pub fn add_record(&mut self, record: RawCommit) {
        match Commit::try_from(record) {
            Ok(commit) => self.add(&commit),
            Err(e) => {
                warn!("Skipping {}", e);
                self.skipped_records += 1;
            }
        }
    }

    pub fn finish(self) -> ReportData {
        let totals =
            ReportTotals::new(self.total_commits, self.tagged_commits, self.skipped_records);
        debug!(
            "Aggregated {} commits from {} authors, {} tagged ({:.2}%), {} skipped",
            totals.total_commits,
            self.authors.len(),
            totals.tagged_commits,
            totals.ai_percentage,
            totals.skipped_records
        );
        ReportData {
            authors: self.authors,
            tags: self.tags,
            totals,
        }
    }
}

/// Aggregate raw commit records in a single pass.
pub fn aggregate<I>(records: I, classifier: &TagClassifier) -> ReportData
where
    I: IntoIterator<Item = RawCommit>,
{
    let mut aggregator = Aggregator::new(classifier);
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.finish()
}

/// Aggregate already validated commits.
pub fn aggregate_commits(commits: &[Commit], classifier: &TagClassifier) -> ReportData {
    let mut aggregator = Aggregator::new(classifier);
    for commit in commits {
        aggregator.add(commit);
    }
    aggregator.finish()
}

use super::*;
use crate::types::{Commit, RawAccount, RawCommit, RawCommitDetails, RawSignature};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn tags_of(classifier: &TagClassifier, message: &str) -> Vec<String> {
    classifier.classify(message).iter().map(str::to_string).collect()
}

fn scenario_commits() -> Vec<Commit> {
    vec![
        Commit::new("fix: bug", "a"),
        Commit::new("feat+ai: new", "b"),
        Commit::new("chore", "a"),
    ]
}

fn map(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_classify_is_case_insensitive() {
    let classifier = TagClassifier::default();
    assert_eq!(classifier.classify("FEAT: x"), classifier.classify("feat: x"));
    assert_eq!(tags_of(&classifier, "Fix: Null Pointer"), vec!["fix"]);
}

#[test]
fn test_classify_matches_several_tags() {
    let classifier = TagClassifier::default();
    assert_eq!(tags_of(&classifier, "fix(ai): tighten prompt"), vec!["fix", "ai"]);
    assert_eq!(tags_of(&classifier, "docs and test updates"), vec!["docs", "test"]);
}

#[test]
fn test_ia_folds_into_ai() {
    let classifier = TagClassifier::default();
    assert_eq!(classifier.classify("ia: generated"), classifier.classify("ai: generated"));
    // Both spellings in one message still produce a single tag.
    assert_eq!(tags_of(&classifier, "ia + ai"), vec!["ai"]);
}

#[test]
fn test_classify_without_match() {
    let classifier = TagClassifier::default();
    assert!(classifier.classify("Update README.md").is_empty());
    assert!(classifier.classify("").is_empty());
}

#[test]
fn test_ai_usage_rules() {
    let any = TagClassifier::new(DEFAULT_RULES.clone(), AiUsageRule::AnyTag);
    let tag = TagClassifier::new(DEFAULT_RULES.clone(), AiUsageRule::Tag("ai".to_string()));
    let marker = TagClassifier::new(
        DEFAULT_RULES.clone(),
        AiUsageRule::Marker("IA-(Projeto-X)".to_string()),
    );

    assert!(any.inspect("fix: bug").1);
    assert!(!tag.inspect("fix: bug").1);
    assert!(tag.inspect("feat+ai: new").1);
    assert!(tag.inspect("IA: generated").1);
    assert!(!marker.inspect("feat+ai: new").1);
    assert!(marker.inspect("feat: login ia-(projeto-x)").1);
}

#[test]
fn test_ai_usage_rule_parsing() {
    assert_eq!("any".parse::<AiUsageRule>(), Ok(AiUsageRule::AnyTag));
    assert_eq!("tag:AI".parse::<AiUsageRule>(), Ok(AiUsageRule::Tag("ai".to_string())));
    assert_eq!(
        "marker:IA-(Projeto-X)".parse::<AiUsageRule>(),
        Ok(AiUsageRule::Marker("IA-(Projeto-X)".to_string()))
    );
    assert!("tag:".parse::<AiUsageRule>().is_err());
    assert!("everything".parse::<AiUsageRule>().is_err());
    assert_eq!(AiUsageRule::Tag("ai".to_string()).to_string(), "tag:ai");
}

#[test]
fn test_custom_rules() {
    let classifier = TagClassifier::new(
        vec![TagRule::new("perf", "Performance"), TagRule::alias("copilot", "ai", "Copilot")],
        AiUsageRule::Tag("ai".to_string()),
    );
    let (tags, ai) = classifier.inspect("perf: Copilot suggested cache");
    assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["perf", "ai"]);
    assert!(ai);
}

#[test]
fn test_scenario_counts() {
    let classifier = TagClassifier::default();
    let data = aggregate_commits(&scenario_commits(), &classifier);

    assert_eq!(data.authors.to_map(), map(&[("a", 2), ("b", 1)]));
    assert_eq!(
        data.tags.to_map(),
        map(&[("fix", 1), ("feat", 1), ("ai", 1), ("chore", 1)])
    );
    assert_eq!(data.totals.total_commits, 3);
    // Every message carries a recognized tag under the default rule.
    assert_eq!(data.totals.tagged_commits, 3);
    assert_eq!(data.totals.ai_percentage, 100.0);
}

#[test]
fn test_scenario_with_ai_tag_rule() {
    let classifier = TagClassifier::new(DEFAULT_RULES.clone(), AiUsageRule::Tag("ai".to_string()));
    let data = aggregate_commits(&scenario_commits(), &classifier);

    assert_eq!(data.totals.tagged_commits, 1);
    assert!((data.totals.ai_percentage - 33.333).abs() < 0.01);
}

#[test]
fn test_percentage_two_of_three() {
    let classifier = TagClassifier::default();
    let commits = vec![
        Commit::new("fix: bug", "a"),
        Commit::new("feat+ai: new", "b"),
        Commit::new("Update README.md", "a"),
    ];
    let totals = aggregate_commits(&commits, &classifier).totals;
    assert_eq!(totals.tagged_commits, 2);
    assert_eq!(format!("{:.2}", totals.ai_percentage), "66.67");
}

#[test]
fn test_empty_history() {
    let data = aggregate(Vec::new(), &TagClassifier::default());
    assert_eq!(data.totals.total_commits, 0);
    assert_eq!(data.totals.tagged_commits, 0);
    assert_eq!(data.totals.ai_percentage, 0.0);
    assert!(data.authors.is_empty());
    assert!(data.tags.is_empty());
}

#[test]
fn test_tag_sum_bounds_tagged_commits() {
    let classifier = TagClassifier::default();
    let single = vec![Commit::new("fix: a", "x"), Commit::new("feat: b", "y")];
    let data = aggregate_commits(&single, &classifier);
    assert_eq!(data.tags.sum(), data.totals.tagged_commits);

    let data = aggregate_commits(&scenario_commits(), &classifier);
    assert!(data.tags.sum() > data.totals.tagged_commits);
}

#[test]
fn test_aggregation_is_order_independent() {
    let classifier = TagClassifier::default();
    let mut commits = scenario_commits();
    commits.push(Commit::new("refactor: split module", "c"));
    commits.push(Commit::new("style", "b"));
    let forward = aggregate_commits(&commits, &classifier);
    commits.reverse();
    let backward = aggregate_commits(&commits, &classifier);

    assert_eq!(forward.authors.to_map(), backward.authors.to_map());
    assert_eq!(forward.tags.to_map(), backward.tags.to_map());
    assert_eq!(forward.totals, backward.totals);
}

#[test]
fn test_malformed_records_are_skipped() {
    let good = RawCommit {
        sha: Some("abc".to_string()),
        commit: Some(RawCommitDetails {
            message: Some("feat: login".to_string()),
            author: Some(RawSignature {
                name: Some("Ana".to_string()),
                email: Some("ana@example.com".to_string()),
                date: Some("2024-04-02T10:00:00Z".to_string()),
            }),
        }),
        author: Some(RawAccount {
            login: Some("ana".to_string()),
        }),
        ..RawCommit::default()
    };
    let no_message = RawCommit {
        sha: Some("def".to_string()),
        commit: Some(RawCommitDetails {
            message: None,
            author: good.commit.as_ref().unwrap().author.clone(),
        }),
        ..RawCommit::default()
    };
    let no_details = RawCommit::default();

    let data = aggregate(vec![good, no_message, no_details], &TagClassifier::default());

    assert_eq!(data.totals.total_commits, 1);
    assert_eq!(data.totals.skipped_records, 2);
    assert_eq!(data.authors.get("ana"), Some(1));
}

#[test]
fn test_author_identity_falls_back_to_email() {
    let raw = RawCommit {
        sha: None,
        commit: Some(RawCommitDetails {
            message: Some("chore".to_string()),
            author: Some(RawSignature {
                name: Some("Bruno".to_string()),
                email: Some("bruno@example.com".to_string()),
                date: None,
            }),
        }),
        author: Some(RawAccount {
            login: Some("  ".to_string()),
        }),
        ..RawCommit::default()
    };
    let commit = Commit::try_from(raw).unwrap();
    assert_eq!(commit.author, "bruno@example.com");
    assert_eq!(commit.timestamp, None);
}

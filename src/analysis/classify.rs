use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tag keyword and the canonical tag it counts toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub keyword: String,
    pub canonical: String,
    pub description: String,
}

impl TagRule {
    pub fn new(keyword: &str, description: &str) -> Self {
        Self::alias(keyword, keyword, description)
    }

    /// A keyword folded into another canonical tag, like `ia` into `ai`.
    pub fn alias(keyword: &str, canonical: &str, description: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            canonical: canonical.to_string(),
            description: description.to_string(),
        }
    }
}

/// The built-in rule list, in matching order.
pub static DEFAULT_RULES: Lazy<Vec<TagRule>> = Lazy::new(|| {
    vec![
        TagRule::new("feat", "New feature"),
        TagRule::new("fix", "Bug fix"),
        TagRule::new("docs", "Documentation only"),
        TagRule::new("style", "Formatting, no behaviour change"),
        TagRule::new("refactor", "Restructuring without behaviour change"),
        TagRule::new("test", "Adding or updating tests"),
        TagRule::new("chore", "Build, tooling and maintenance"),
        TagRule::new("ai", "Change produced with AI assistance"),
        TagRule::alias("ia", "ai", "Change produced with AI assistance (counted as ai)"),
    ]
});

/// Decides which commits count as AI-tagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AiUsageRule {
    /// Any recognized tag in the message.
    #[default]
    AnyTag,
    /// The message carries this canonical tag.
    Tag(String),
    /// The message contains this literal marker, ignoring case.
    Marker(String),
}

impl FromStr for AiUsageRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            format!(
                "Invalid AI usage rule: {}. Valid options: any, tag:<name>, marker:<text>",
                s
            )
        };
        match s.split_once(':') {
            None if s.eq_ignore_ascii_case("any") => Ok(AiUsageRule::AnyTag),
            Some((kind, value)) if !value.is_empty() => match kind.to_lowercase().as_str() {
                "tag" => Ok(AiUsageRule::Tag(value.to_lowercase())),
                "marker" => Ok(AiUsageRule::Marker(value.to_string())),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for AiUsageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiUsageRule::AnyTag => write!(f, "any"),
            AiUsageRule::Tag(tag) => write!(f, "tag:{}", tag),
            AiUsageRule::Marker(marker) => write!(f, "marker:{}", marker),
        }
    }
}

/// The canonical tags matched by one message, without duplicates, in rule
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet<'a> {
    tags: Vec<&'a str>,
}

impl<'a> TagSet<'a> {
    fn insert(&mut self, tag: &'a str) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Classifies commit messages against an ordered rule list.
#[derive(Debug, Clone)]
pub struct TagClassifier {
    rules: Vec<TagRule>,
    keywords: Vec<String>,
    ai_rule: AiUsageRule,
    marker: Option<String>,
}

impl TagClassifier {
    pub fn new(rules: Vec<TagRule>, ai_rule: AiUsageRule) -> Self {
        let keywords = rules.iter().map(|r| r.keyword.to_lowercase()).collect();
        let marker = match &ai_rule {
            AiUsageRule::Marker(marker) => Some(marker.to_lowercase()),
            _ => None,
        };
        Self {
            rules,
            keywords,
            ai_rule,
            marker,
        }
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Every canonical tag whose keyword occurs anywhere in `message`.
    pub fn classify(&self, message: &str) -> TagSet<'_> {
        self.classify_lowered(&message.to_lowercase())
    }

    fn classify_lowered(&self, lowered: &str) -> TagSet<'_> {
        let mut tags = TagSet::default();
        for (rule, keyword) in self.rules.iter().zip(&self.keywords) {
            if !keyword.is_empty() && lowered.contains(keyword.as_str()) {
                tags.insert(rule.canonical.as_str());
            }
        }
        tags
    }

    /// Classify `message` and decide whether it counts as AI-tagged.
    pub fn inspect(&self, message: &str) -> (TagSet<'_>, bool) {
        let lowered = message.to_lowercase();
        let tags = self.classify_lowered(&lowered);
        let ai_tagged = match &self.ai_rule {
            AiUsageRule::AnyTag => !tags.is_empty(),
            AiUsageRule::Tag(tag) => tags.contains(tag),
            AiUsageRule::Marker(_) => self
                .marker
                .as_deref()
                .is_some_and(|marker| lowered.contains(marker)),
        };
        (tags, ai_tagged)
    }
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.clone(), AiUsageRule::default())
    }
}

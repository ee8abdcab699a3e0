//! Run settings: CLI flags layered over an optional TOML file layered over
//! defaults.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AiUsageRule, TagClassifier, TagRule, DEFAULT_RULES};
use crate::cli::Cli;
use crate::plotting::{PieSource, ReportLayout, ReportMeta, SectionKind};
use crate::source::github::{GitHubConfig, DEFAULT_API_URL, DEFAULT_PER_PAGE};
use crate::source::pagination::DEFAULT_MAX_PAGES;
use crate::source::{FailurePolicy, PaginationOptions};

/// GitHub caps `per_page` at 100.
const MAX_PER_PAGE: u32 = 100;

/// A tag rule declared in the configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleConfig {
    pub keyword: String,
    #[serde(default)]
    pub canonical: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Contents of the TOML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub output: Option<PathBuf>,
    pub api_url: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub failure_policy: Option<FailurePolicy>,
    pub ai_rule: Option<String>,
    pub pie: Option<PieSource>,
    pub sections: Option<Vec<String>>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub rules: Option<Vec<RuleConfig>>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the explicit file, or the default location when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagstats").join("config.toml"))
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| anyhow!("Invalid date: {}. Use RFC 3339 or YYYY-MM-DD", value))
}

/// Header line describing the analysed window.
pub fn period_label(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> String {
    let fmt = |d: DateTime<Utc>| d.format("%Y-%m-%d").to_string();
    format!(
        "Period: {} to {}",
        since.map(fmt).unwrap_or_else(|| "beginning".to_string()),
        until.map(fmt).unwrap_or_else(|| "now".to_string())
    )
}

/// Default output name, e.g. `commit-report-20240420-153000.svg`.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!("commit-report-{}.svg", Local::now().format("%Y%m%d-%H%M%S")))
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub github: GitHubConfig,
    pub branch: String,
    pub pagination: PaginationOptions,
    pub ai_rule: AiUsageRule,
    pub rules: Vec<TagRule>,
    pub layout: ReportLayout,
    pub output: PathBuf,
}

impl Settings {
    /// Merge CLI flags over file values over defaults, and validate.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let owner = cli
            .owner
            .clone()
            .or(file.owner)
            .context("Repository owner is required (--owner or `owner` in the config file)")?;
        let repo = cli
            .repo
            .clone()
            .or(file.repo)
            .context("Repository name is required (--repo or `repo` in the config file)")?;

        let since = cli.since.as_deref().or(file.since.as_deref()).map(parse_date).transpose()?;
        let until = cli.until.as_deref().or(file.until.as_deref()).map(parse_date).transpose()?;
        if let (Some(since), Some(until)) = (since, until) {
            if since > until {
                bail!("--since ({}) is after --until ({})", since, until);
            }
        }

        let per_page = cli.per_page.or(file.per_page).unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            bail!("per_page must be between 1 and {}, got {}", MAX_PER_PAGE, per_page);
        }
        let max_pages = cli.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            bail!("max_pages must be at least 1");
        }

        let ai_rule = match (&cli.ai_rule, &file.ai_rule) {
            (Some(rule), _) => rule.clone(),
            (None, Some(rule)) => rule.parse::<AiUsageRule>().map_err(|e| anyhow!(e))?,
            (None, None) => AiUsageRule::default(),
        };

        let sections = match (&cli.sections, &file.sections) {
            (Some(sections), _) => sections.clone(),
            (None, Some(names)) => names
                .iter()
                .map(|name| name.parse::<SectionKind>().map_err(|e| anyhow!(e)))
                .collect::<Result<Vec<_>>>()?,
            (None, None) => SectionKind::default_order(),
        };

        let rules = match file.rules {
            Some(rules) if rules.is_empty() => bail!("`rules` must declare at least one tag rule"),
            Some(rules) => rules
                .into_iter()
                .map(|r| {
                    // Tag names compare lower-cased, like `tag:<name>` rules
                    let canonical = r.canonical.as_ref().unwrap_or(&r.keyword).to_lowercase();
                    let description = r.description.unwrap_or_else(|| canonical.clone());
                    TagRule::alias(&r.keyword, &canonical, &description)
                })
                .collect(),
            None => DEFAULT_RULES.clone(),
        };
        if let AiUsageRule::Tag(tag) = &ai_rule {
            if !rules.iter().any(|r| &r.canonical == tag) {
                bail!("AI usage rule names tag `{}`, which no tag rule produces", tag);
            }
        }

        let defaults = ReportMeta::default();
        let layout = ReportLayout {
            sections,
            pie: cli.pie.or(file.pie).unwrap_or_default(),
            meta: ReportMeta {
                title: cli.title.clone().or(file.title).unwrap_or(defaults.title),
                subtitle: file.subtitle.unwrap_or_else(|| {
                    format!("{}/{} commit tags by author and category", owner, repo)
                }),
                period: period_label(since, until),
            },
            ..ReportLayout::default()
        };

        let github = GitHubConfig {
            api_url: cli
                .api_url
                .clone()
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: cli.token.clone().or(file.token).filter(|t| !t.is_empty()),
            per_page,
            since,
            until,
            ..GitHubConfig::new(owner, repo)
        };

        Ok(Settings {
            github,
            branch: cli.branch.clone().or(file.branch).unwrap_or_default(),
            pagination: PaginationOptions {
                max_pages,
                failure_policy: cli.failure_policy.or(file.failure_policy).unwrap_or_default(),
            },
            ai_rule,
            rules,
            layout,
            output: cli.output.clone().or(file.output).unwrap_or_else(default_output_path),
        })
    }

    pub fn classifier(&self) -> TagClassifier {
        TagClassifier::new(self.rules.clone(), self.ai_rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(owner: &str, repo: &str) -> Cli {
        Cli {
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
            ..Cli::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(&cli("tpjtiago", "analyzer"), FileConfig::default()).unwrap();

        assert_eq!(settings.github.api_url, DEFAULT_API_URL);
        assert_eq!(settings.github.per_page, DEFAULT_PER_PAGE);
        assert_eq!(settings.branch, "");
        assert_eq!(settings.pagination, PaginationOptions::default());
        assert_eq!(settings.ai_rule, AiUsageRule::AnyTag);
        assert_eq!(settings.rules, *DEFAULT_RULES);
        assert_eq!(settings.layout.sections, SectionKind::default_order());
        assert_eq!(settings.layout.meta.period, "Period: beginning to now");
        assert!(settings.output.to_string_lossy().starts_with("commit-report-"));
    }

    #[test]
    fn test_missing_repository_is_rejected() {
        let err = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::parse(
            r#"
            owner = "file-owner"
            repo = "file-repo"
            branch = "develop"
            ai_rule = "tag:ai"
            failure_policy = "abort"
            pie = "tags"
            sections = ["header", "tags:bars"]
            since = "2024-04-01"
            until = "2024-04-20"
            "#,
        )
        .unwrap();
        let mut args = cli("cli-owner", "cli-repo");
        args.ai_rule = Some(AiUsageRule::Marker("IA-(Projeto-X)".to_string()));

        let settings = Settings::resolve(&args, file).unwrap();

        assert_eq!(settings.github.owner, "cli-owner");
        assert_eq!(settings.branch, "develop");
        assert_eq!(settings.ai_rule, AiUsageRule::Marker("IA-(Projeto-X)".to_string()));
        assert_eq!(settings.pagination.failure_policy, FailurePolicy::Abort);
        assert_eq!(settings.layout.pie, PieSource::Tags);
        assert_eq!(settings.layout.sections.len(), 2);
        assert_eq!(settings.layout.meta.period, "Period: 2024-04-01 to 2024-04-20");
    }

    #[test]
    fn test_custom_rules_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            owner = "o"
            repo = "r"

            [[rules]]
            keyword = "perf"
            description = "Performance"

            [[rules]]
            keyword = "copilot"
            canonical = "ai"
            "#
        )
        .unwrap();

        let config = FileConfig::load(Some(file.path())).unwrap();
        let settings = Settings::resolve(&Cli::default(), config).unwrap();

        assert_eq!(
            settings.rules,
            vec![
                TagRule::new("perf", "Performance"),
                TagRule::alias("copilot", "ai", "ai"),
            ]
        );
    }

    #[test]
    fn test_rule_tags_match_case_insensitively() {
        let file = FileConfig::parse(
            r#"
            [[rules]]
            keyword = "copilot"
            canonical = "AI"
            "#,
        )
        .unwrap();
        let mut args = cli("o", "r");
        args.ai_rule = Some("tag:ai".parse().unwrap());

        let settings = Settings::resolve(&args, file).unwrap();
        assert_eq!(settings.rules[0].canonical, "ai");
        assert!(settings.classifier().inspect("Copilot: draft parser").1);
    }

    #[test]
    fn test_ai_tag_without_producing_rule_is_rejected() {
        let mut args = cli("o", "r");
        args.ai_rule = Some(AiUsageRule::Tag("copilot".to_string()));

        let err = Settings::resolve(&args, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("copilot"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(FileConfig::parse("unknown_key = 1").is_err());
        assert!(FileConfig::parse("failure_policy = \"retry\"").is_err());

        let mut args = cli("o", "r");
        args.per_page = Some(500);
        assert!(Settings::resolve(&args, FileConfig::default()).is_err());

        let mut args = cli("o", "r");
        args.since = Some("2024-05-01".to_string());
        args.until = Some("2024-04-01".to_string());
        assert!(Settings::resolve(&args, FileConfig::default()).is_err());

        let file = FileConfig {
            sections: Some(vec!["footer".to_string()]),
            ..FileConfig::default()
        };
        assert!(Settings::resolve(&cli("o", "r"), file).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-04-20").unwrap().to_rfc3339(),
            "2024-04-20T00:00:00+00:00"
        );
        assert_eq!(
            parse_date("2024-04-20T12:30:00-03:00").unwrap().to_rfc3339(),
            "2024-04-20T15:30:00+00:00"
        );
        assert!(parse_date("20/04/2024").is_err());
    }
}

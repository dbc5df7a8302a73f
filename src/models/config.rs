//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Subreddits to crawl, in order
    #[serde(default = "defaults::forums")]
    pub forums: Vec<String>,

    /// Search, fan-out and fallback behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Forum API endpoints and HTTP client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Youth detection and summary settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Theme taxonomy, in declaration order
    #[serde(default = "defaults::themes")]
    pub themes: Vec<ThemeConfig>,

    /// Output table settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or the defaults when the file does not exist.
    ///
    /// Any other failure (unreadable file, malformed TOML) is returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No config at {:?}. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.forums.is_empty() {
            return Err(AppError::validation("No forums defined"));
        }
        if self.forums.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::validation("forums contains an empty name"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.page_size == 0 || self.api.page_size > 100 {
            return Err(AppError::validation("api.page_size must be in 1..=100"));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(AppError::validation("api.timeout_secs must be > 0 when set"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.chunk_max_len == 0 {
            return Err(AppError::validation("crawler.chunk_max_len must be > 0"));
        }
        if self.crawler.search_limit == 0 {
            return Err(AppError::validation("crawler.search_limit must be > 0"));
        }
        if self.classifier.min_age > self.classifier.max_age {
            return Err(AppError::validation(
                "classifier.min_age must not exceed classifier.max_age",
            ));
        }
        if self.themes.is_empty() {
            return Err(AppError::validation("No themes defined"));
        }

        let mut seen = HashSet::new();
        for theme in &self.themes {
            if theme.name.trim().is_empty() {
                return Err(AppError::validation("Theme with empty name"));
            }
            if !seen.insert(theme.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Theme '{}' is defined twice",
                    theme.name
                )));
            }
            if theme.keywords.is_empty() {
                return Err(AppError::validation(format!(
                    "Theme '{}' has no keywords",
                    theme.name
                )));
            }
            if theme.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(AppError::validation(format!(
                    "Theme '{}' contains an empty keyword",
                    theme.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forums: defaults::forums(),
            crawler: CrawlerConfig::default(),
            api: ApiConfig::default(),
            classifier: ClassifierConfig::default(),
            themes: defaults::themes(),
            output: OutputConfig::default(),
        }
    }
}

/// Search ordering accepted by the forum search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Relevance => "relevance",
            SearchSort::Hot => "hot",
            SearchSort::Top => "top",
            SearchSort::New => "new",
            SearchSort::Comments => "comments",
        }
    }
}

/// Time window accepted by the forum search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::All => "all",
        }
    }
}

/// Crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Rate gate capacity: maximum in-flight network operations
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Character budget for one disjunctive search query
    #[serde(default = "defaults::chunk_max_len")]
    pub chunk_max_len: usize,

    #[serde(default = "defaults::search_sort")]
    pub search_sort: SearchSort,

    #[serde(default = "defaults::search_time_range")]
    pub search_time_range: TimeRange,

    /// Maximum results collected per query chunk
    #[serde(default = "defaults::search_limit")]
    pub search_limit: usize,

    /// Size of the recency listing used when no search produced results
    #[serde(default = "defaults::fallback_limit")]
    pub fallback_limit: usize,

    /// Maximum number of "more comments" stubs expanded per post
    #[serde(default = "defaults::comment_expand_limit")]
    pub comment_expand_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            chunk_max_len: defaults::chunk_max_len(),
            search_sort: defaults::search_sort(),
            search_time_range: defaults::search_time_range(),
            search_limit: defaults::search_limit(),
            fallback_limit: defaults::fallback_limit(),
            comment_expand_limit: defaults::comment_expand_limit(),
        }
    }
}

/// Forum API endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// OAuth token endpoint
    #[serde(default = "defaults::auth_url")]
    pub auth_url: String,

    /// Base URL for authenticated API calls
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Listing page size (the API caps this at 100)
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Per-request timeout in seconds; unset means requests never time out
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            auth_url: defaults::auth_url(),
            api_url: defaults::api_url(),
            page_size: defaults::page_size(),
            timeout_secs: None,
        }
    }
}

/// Youth detection and summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Whole-word phrases that indicate a young author
    #[serde(default = "defaults::youth_phrases")]
    pub youth_phrases: Vec<String>,

    /// Lowest self-reported age counted as a minor
    #[serde(default = "defaults::min_age")]
    pub min_age: u32,

    /// Highest self-reported age counted as a minor
    #[serde(default = "defaults::max_age")]
    pub max_age: u32,

    /// Summary used when no sentence carries a hit; `{theme}` is substituted
    #[serde(default = "defaults::fallback_summary")]
    pub fallback_summary: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            youth_phrases: defaults::youth_phrases(),
            min_age: defaults::min_age(),
            max_age: defaults::max_age(),
            fallback_summary: defaults::fallback_summary(),
        }
    }
}

/// One theme of the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ThemeConfig {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Output table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
        }
    }
}

mod defaults {
    use super::{SearchSort, ThemeConfig, TimeRange};

    pub fn forums() -> Vec<String> {
        [
            "teenagers",
            "privacy",
            "AdviceForTeens",
            "mentalhealth",
            "therapists",
            "relationship_advice",
            "AskReddit",
            "DecidingToBeBetter",
            "dating_advice",
            "TooAfraidToAsk",
            "internetparents",
            "depression",
            "Parenting",
            "Productivitycafe",
            "regretfulparents",
            "parentingteenagers",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    // Crawler defaults
    pub fn max_concurrent() -> usize {
        60
    }
    pub fn chunk_max_len() -> usize {
        450
    }
    pub fn search_sort() -> SearchSort {
        SearchSort::New
    }
    pub fn search_time_range() -> TimeRange {
        TimeRange::All
    }
    pub fn search_limit() -> usize {
        100
    }
    pub fn fallback_limit() -> usize {
        100
    }
    pub fn comment_expand_limit() -> usize {
        50
    }

    // API defaults
    pub fn user_agent() -> String {
        "teen-crawler/0.1 (dataset research)".into()
    }
    pub fn auth_url() -> String {
        "https://www.reddit.com/api/v1/access_token".into()
    }
    pub fn api_url() -> String {
        "https://oauth.reddit.com".into()
    }
    pub fn page_size() -> usize {
        100
    }

    // Classifier defaults
    pub fn youth_phrases() -> Vec<String> {
        [
            "teen",
            "teens",
            "teenager",
            "teenagers",
            "preteen",
            "preadolescent",
            "youth",
            "youngster",
            "high school",
            "high-schooler",
            "highschooler",
            "middle school",
            "middleschooler",
            "grade 6",
            "grade 7",
            "grade 8",
            "grade 9",
            "grade 10",
            "grade 11",
            "grade 12",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
    pub fn min_age() -> u32 {
        10
    }
    pub fn max_age() -> u32 {
        19
    }
    pub fn fallback_summary() -> String {
        "This post discusses {theme}.".into()
    }

    pub fn output_path() -> String {
        "Reddit.csv".into()
    }

    pub fn themes() -> Vec<ThemeConfig> {
        vec![
            ThemeConfig::new(
                "mental_health",
                &[
                    "anxiety",
                    "depression",
                    "self-harm",
                    "panic",
                    "adhd",
                    "bipolar",
                    "eating disorder",
                    "anorexia",
                    "bulimia",
                    "trauma",
                    "ptsd",
                    "schizophrenia",
                    "psychosis",
                    "mood swings",
                    "mental illness",
                    "suicidal ideation",
                    "suicide",
                    "overdose",
                    "hopelessness",
                    "worthlessness",
                    "self hatred",
                    "self mutilation",
                    "cutting",
                    "panic attack",
                    "insomnia",
                    "hallucinations",
                    "delusion",
                    "paranoia",
                    "dissociation",
                    "intrusive thoughts",
                    "derealization",
                    "depersonalization",
                    "loneliness",
                    "isolation",
                    "numb",
                    "void",
                    "mental breakdown",
                    "meltdown",
                    "shutdown",
                    "sensory overload",
                    "fear",
                    "no will to live",
                ],
            ),
            ThemeConfig::new(
                "behavioral_health",
                &[
                    "anger",
                    "rage",
                    "addiction",
                    "substance abuse",
                    "alcohol abuse",
                    "drug abuse",
                    "binge drinking",
                    "blackout",
                    "impulse control",
                    "stress",
                    "burnout",
                    "gambling addiction",
                    "codependency",
                    "people-pleasing",
                    "manipulation",
                    "aggression",
                    "violent outburst",
                    "fight",
                    "punching",
                    "reckless behavior",
                    "risk-taking",
                    "truancy",
                    "runaway",
                    "shoplifting",
                    "stealing",
                    "lying",
                    "vandalism",
                    "self sabotage",
                    "executive dysfunction",
                    "hoarding",
                    "compulsive behavior",
                    "social anxiety",
                    "avoidance",
                    "phobias",
                    "procrastination",
                ],
            ),
            ThemeConfig::new(
                "online_safety",
                &[
                    "cyberbullying",
                    "bullying",
                    "harassment",
                    "online harassment",
                    "doxxing",
                    "grooming",
                    "groomer",
                    "blackmail",
                    "clickbait",
                    "predator",
                    "online predators",
                    "child exploitation",
                    "sex trafficking",
                    "nudes leak",
                    "snapchat leak",
                    "revenge porn",
                    "catfish",
                    "deepfake",
                    "identity theft",
                    "phishing",
                    "malware",
                    "hacked",
                    "data breach",
                    "scams",
                    "swatting",
                    "impersonation",
                    "stalking",
                    "online stalking",
                    "hate speech",
                    "death threat",
                    "trolling",
                    "flaming",
                    "fake news",
                    "disinformation",
                    "misinformation",
                    "sadfishing",
                    "stranger danger",
                ],
            ),
            ThemeConfig::new(
                "dating",
                &[
                    "heartbreak",
                    "toxic",
                    "abuse",
                    "emotional abuse",
                    "physical abuse",
                    "domestic violence",
                    "sexual assault",
                    "rape",
                    "coercion",
                    "cheating",
                    "cheater",
                    "gaslighting",
                    "love bombing",
                    "red flags",
                    "jealousy",
                    "insecurity",
                    "obsession",
                    "control",
                    "manipulation",
                    "breadcrumbing",
                    "ghosting",
                    "situationship",
                    "mixed signals",
                    "unrequited love",
                    "abandonment",
                    "attachment issues",
                    "boundaries",
                    "violated boundaries",
                    "consent",
                    "lack of consent",
                    "sexting pressure",
                    "nudes pressure",
                    "stalking ex",
                    "toxic ex",
                    "hate relationship",
                    "fight",
                ],
            ),
        ]
    }
}

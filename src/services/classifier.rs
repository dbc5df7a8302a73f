// src/services/classifier.rs

//! Youth detection, theme matching and summary extraction.

use std::ops::RangeInclusive;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use crate::models::ClassifierConfig;
use crate::services::taxonomy::{Taxonomy, ThemePatterns};

/// Self-identification phrasings: "I'm 15", "I'm 16yo", "16f", "(17m)".
const AGE_PATTERN: &str = r"(?i)\bi['’ ]?m\s+(\d{1,2})(?:yo|yrs?)?\b|\b(\d{1,2})[fm]\b|\((\d{1,2})[fm]\)";

/// First theme/keyword pair found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMatch {
    pub theme: String,
    pub keyword: String,
}

/// Outcome of classifying one aggregated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched {
        theme: String,
        keyword: String,
        summary: String,
    },
    /// No youth indicator; theme matching was not attempted
    NotYouth,
    NoTheme,
}

/// Classifies aggregated post text against the taxonomy.
#[derive(Debug, Clone)]
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
    youth: Option<Regex>,
    age: Regex,
    age_range: RangeInclusive<u32>,
    fallback_summary: String,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig, taxonomy: Arc<Taxonomy>) -> Result<Self> {
        let phrases: Vec<String> = config
            .youth_phrases
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();

        // An empty alternation would match at every word boundary.
        let youth = if phrases.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)\b(?:{})\b", phrases.join("|")))?)
        };

        Ok(Self {
            taxonomy,
            youth,
            age: Regex::new(AGE_PATTERN)?,
            age_range: config.min_age..=config.max_age,
            fallback_summary: config.fallback_summary.clone(),
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Run youth detection, then theme matching, then summary extraction.
    pub fn classify(&self, text: &str) -> Classification {
        if !self.is_youth(text) {
            return Classification::NotYouth;
        }
        let Some(found) = self.match_theme(text) else {
            return Classification::NoTheme;
        };
        let summary = self.summarize(text, &found.theme);
        Classification::Matched {
            theme: found.theme,
            keyword: found.keyword,
            summary,
        }
    }

    /// Whether the text reads as written by a minor.
    pub fn is_youth(&self, text: &str) -> bool {
        if self.youth.as_ref().is_some_and(|re| re.is_match(text)) {
            return true;
        }
        self.age.captures_iter(text).any(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .filter_map(|m| m.as_str().parse::<u32>().ok())
                .any(|age| self.age_range.contains(&age))
        })
    }

    /// First `(theme, keyword)` hit, themes and keywords in declaration order.
    pub fn match_theme(&self, text: &str) -> Option<ThemeMatch> {
        self.taxonomy.themes().iter().find_map(|theme| {
            theme.first_hit(text).map(|keyword| ThemeMatch {
                theme: theme.name().to_string(),
                keyword: keyword.to_string(),
            })
        })
    }

    /// Extract up to two sentences showing why `theme` matched.
    pub fn summarize(&self, text: &str, theme: &str) -> String {
        match self.taxonomy.theme(theme) {
            Some(patterns) => summarize_with(text, patterns)
                .unwrap_or_else(|| self.fallback_summary.replace("{theme}", theme)),
            None => self.fallback_summary.replace("{theme}", theme),
        }
    }
}

fn summarize_with(text: &str, theme: &ThemePatterns) -> Option<String> {
    let sentences = split_sentences(text);
    let hits: Vec<usize> = sentences
        .iter()
        .enumerate()
        .filter(|(_, s)| theme.is_hit(s))
        .map(|(i, _)| i)
        .collect();

    match hits.as_slice() {
        [] => None,
        [only] => {
            let context = sentences[only + 1..]
                .iter()
                .enumerate()
                .find(|(offset, _)| !hits.contains(&(only + 1 + offset)))
                .map(|(_, s)| *s);
            Some(match context {
                Some(next) => format!("{} {}", sentences[*only], next),
                None => sentences[*only].to_string(),
            })
        }
        [first, second, ..] => Some(format!("{} {}", sentences[*first], sentences[*second])),
    }
}

/// Split after `.`, `!` or `?` followed by whitespace; trimmed, non-empty.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut after_terminal = false;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if after_terminal && ch.is_whitespace() {
            sentences.push(&text[start..idx]);
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            start = chars.peek().map_or(text.len(), |(i, _)| *i);
            after_terminal = false;
            continue;
        }
        after_terminal = matches!(ch, '.' | '!' | '?');
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, ThemeConfig};

    fn classifier() -> Classifier {
        let config = Config::default();
        let taxonomy = Arc::new(Taxonomy::from_config(&config.themes).unwrap());
        Classifier::new(&config.classifier, taxonomy).unwrap()
    }

    #[test]
    fn test_age_examples() {
        let c = classifier();
        assert!(c.is_youth("I'm 15 and scared"));
        assert!(!c.is_youth("I am 45 and fine"));
        assert!(c.is_youth("16f looking for advice"));
        assert!(c.is_youth("grade 9 student"));
    }

    #[test]
    fn test_age_variants() {
        let c = classifier();
        assert!(c.is_youth("Throwaway (17m) here"));
        assert!(c.is_youth("im 13 btw"));
        assert!(c.is_youth("I’m 14"));
        assert!(c.is_youth("My TEENAGER brother"));
        assert!(c.is_youth("I'm 45, my son is 16m"));
        assert!(!c.is_youth("I'm 21 and in college"));
        assert!(!c.is_youth("I'm 150 percent sure"));
        assert!(c.is_youth("I'm 16yo and stressed"));
        assert!(c.is_youth("im 15yrs old"));
        assert!(c.is_youth("I'm 14yr old"));
        assert!(!c.is_youth("I'm 16years of debt away"));
        assert!(!c.is_youth("version 16.04 and 18fps"));
        assert!(!c.is_youth("my steens are fine"));
    }

    #[test]
    fn test_age_range_is_configurable() {
        let mut config = Config::default();
        config.classifier.youth_phrases.clear();
        config.classifier.min_age = 13;
        config.classifier.max_age = 17;
        let taxonomy = Arc::new(Taxonomy::from_config(&config.themes).unwrap());
        let c = Classifier::new(&config.classifier, taxonomy).unwrap();

        assert!(c.is_youth("I'm 13"));
        assert!(!c.is_youth("I'm 12"));
        assert!(!c.is_youth("I'm 18"));
        assert!(!c.is_youth("a teen and some text"));
    }

    #[test]
    fn test_theme_examples() {
        let c = classifier();
        assert_eq!(
            c.match_theme("Honestly I've been cutting myself again"),
            Some(ThemeMatch {
                theme: "mental_health".to_string(),
                keyword: "cutting".to_string(),
            })
        );
        assert_eq!(c.match_theme("We went to the beach and had lunch"), None);
    }

    #[test]
    fn test_theme_first_match_wins() {
        let c = classifier();
        // "fight" is in both behavioral_health and dating; declaration order decides
        let found = c.match_theme("we had a huge fight").unwrap();
        assert_eq!(found.theme, "behavioral_health");
        assert_eq!(found.keyword, "fight");
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!  Three?\nFour"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
        assert_eq!(split_sentences("v1.2 is out"), vec!["v1.2 is out"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_summary_two_hits() {
        let c = classifier();
        let text = "My anxiety is bad. Lunch was fine. The panic comes at night. More stress.";
        assert_eq!(
            c.summarize(text, "mental_health"),
            "My anxiety is bad. The panic comes at night."
        );
    }

    #[test]
    fn test_summary_single_hit_takes_following_sentence() {
        let c = classifier();
        let text = "Hello all. I have insomnia every week. It started in May. Thanks.";
        assert_eq!(
            c.summarize(text, "mental_health"),
            "I have insomnia every week. It started in May."
        );
    }

    #[test]
    fn test_summary_single_hit_at_end() {
        let c = classifier();
        let text = "Hello all. I have insomnia every week.";
        assert_eq!(
            c.summarize(text, "mental_health"),
            "I have insomnia every week."
        );
    }

    #[test]
    fn test_summary_fallback_phrase() {
        let c = classifier();
        assert_eq!(
            c.summarize("Nothing relevant.", "dating"),
            "This post discusses dating."
        );
    }

    #[test]
    fn test_summary_is_deterministic() {
        let c = classifier();
        let text = "I'm 16. Constant stress at home. Nobody listens. I feel numb.";
        let first = c.summarize(text, "mental_health");
        for _ in 0..5 {
            assert_eq!(c.summarize(text, "mental_health"), first);
        }
    }

    #[test]
    fn test_classify_age_gate_runs_first() {
        let c = classifier();
        assert_eq!(
            c.classify("I'm 30 and dealing with depression."),
            Classification::NotYouth
        );
        assert_eq!(
            c.classify("I'm 15 and we went to the beach."),
            Classification::NoTheme
        );
    }

    #[test]
    fn test_classify_match() {
        let c = classifier();
        let text = "I'm 16 and I keep having panic attacks at school. It's been really hard.";
        match c.classify(text) {
            Classification::Matched {
                theme,
                keyword,
                summary,
            } => {
                assert_eq!(theme, "mental_health");
                assert_eq!(keyword, "panic");
                assert!(summary.contains("I'm 16 and I keep having panic attacks at school."));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_taxonomy() {
        let taxonomy = Arc::new(
            Taxonomy::from_config(&[ThemeConfig::new("school", &["detention"])]).unwrap(),
        );
        let c = Classifier::new(&Config::default().classifier, taxonomy).unwrap();
        assert!(matches!(
            c.classify("teen here, got detention today"),
            Classification::Matched { .. }
        ));
    }
}

// src/services/taxonomy.rs

//! Compiled theme taxonomy.
//!
//! Each configured keyword becomes a case-insensitive, word-bounded regex.
//! The taxonomy is built once per run and shared read-only.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::ThemeConfig;

/// A keyword and its compiled whole-word matcher.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    regex: Regex,
}

impl KeywordPattern {
    pub fn new(keyword: &str) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::config("keyword must not be empty"));
        }
        let regex = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))?;
        Ok(Self {
            keyword: keyword.to_string(),
            regex,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// All patterns belonging to one theme, in declaration order.
#[derive(Debug, Clone)]
pub struct ThemePatterns {
    name: String,
    patterns: Vec<KeywordPattern>,
}

impl ThemePatterns {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[KeywordPattern] {
        &self.patterns
    }

    /// First keyword of this theme that occurs in `text`.
    pub fn first_hit(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(text))
            .map(KeywordPattern::keyword)
    }

    pub fn is_hit(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Immutable theme → keyword-pattern mapping.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    themes: Vec<ThemePatterns>,
}

impl Taxonomy {
    /// Compile a taxonomy from configuration, keeping declaration order.
    pub fn from_config(themes: &[ThemeConfig]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(themes.len());

        for theme in themes {
            let name = theme.name.trim();
            if name.is_empty() {
                return Err(AppError::config("theme name must not be empty"));
            }
            if !seen.insert(name.to_string()) {
                return Err(AppError::config(format!("duplicate theme '{name}'")));
            }
            if theme.keywords.is_empty() {
                return Err(AppError::config(format!("theme '{name}' has no keywords")));
            }

            let patterns = theme
                .keywords
                .iter()
                .map(|k| KeywordPattern::new(k))
                .collect::<Result<Vec<_>>>()
                .map_err(|e| AppError::config(format!("theme '{name}': {e}")))?;

            compiled.push(ThemePatterns {
                name: name.to_string(),
                patterns,
            });
        }

        Ok(Self { themes: compiled })
    }

    pub fn themes(&self) -> &[ThemePatterns] {
        &self.themes
    }

    pub fn theme(&self, name: &str) -> Option<&ThemePatterns> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Sorted, de-duplicated union of every keyword (lowercased).
    pub fn keywords(&self) -> Vec<String> {
        self.themes
            .iter()
            .flat_map(|t| t.patterns())
            .map(|p| p.keyword().to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_config(&[
            ThemeConfig::new("mental_health", &["panic", "panic attack", "self-harm"]),
            ThemeConfig::new("behavioral_health", &["fight", "stress"]),
            ThemeConfig::new("dating", &["Fight", "ghosting"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        let pattern = KeywordPattern::new("panic").unwrap();
        assert!(pattern.is_match("PANIC at the disco"));
        assert!(pattern.is_match("I panic."));
        assert!(!pattern.is_match("panicky feelings"));
        assert!(!pattern.is_match("hispanic"));
    }

    #[test]
    fn test_keyword_with_punctuation_is_escaped() {
        let pattern = KeywordPattern::new("self-harm").unwrap();
        assert!(pattern.is_match("thoughts of self-harm again"));
        assert!(!pattern.is_match("self harm"));
    }

    #[test]
    fn test_keywords_sorted_and_deduplicated() {
        assert_eq!(
            taxonomy().keywords(),
            vec![
                "fight",
                "ghosting",
                "panic",
                "panic attack",
                "self-harm",
                "stress"
            ]
        );
    }

    #[test]
    fn test_theme_order_is_declaration_order() {
        let tax = taxonomy();
        let names: Vec<_> = tax.themes().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["mental_health", "behavioral_health", "dating"]);
    }

    #[test]
    fn test_first_hit_follows_keyword_order() {
        let tax = taxonomy();
        let theme = tax.theme("mental_health").unwrap();
        assert_eq!(theme.first_hit("a panic attack at lunch"), Some("panic"));
        assert_eq!(theme.first_hit("nothing here"), None);
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let result = Taxonomy::from_config(&[ThemeConfig::new("x", &["ok", "  "])]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_theme() {
        let result = Taxonomy::from_config(&[
            ThemeConfig::new("x", &["a"]),
            ThemeConfig::new("x", &["b"]),
        ]);
        assert!(result.is_err());
    }
}

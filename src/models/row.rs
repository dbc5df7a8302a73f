//! Classified output records and run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One labeled post in the output table.
///
/// Field order is the column order of the written file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedRow {
    /// Subreddit the post was found in
    pub forum: String,

    /// First theme whose keyword matched
    pub theme: String,

    /// Keyword that triggered the theme
    pub keyword: String,

    pub title: String,

    /// Short extractive summary of the matched content
    pub summary: String,
}

/// Per-forum crawl result.
#[derive(Debug, Default)]
pub struct ForumOutcome {
    pub forum: String,
    pub rows: Vec<ClassifiedRow>,

    /// Distinct posts fetched and classified
    pub candidates: usize,

    /// Whether the recency listing replaced empty search results
    pub used_fallback: bool,

    /// Posts dropped by youth detection
    pub rejected_age: usize,

    /// Posts dropped for matching no theme
    pub rejected_theme: usize,
}

/// Statistics for a whole run.
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub forum_count: usize,
    pub candidate_count: usize,
    pub row_count: usize,

    /// Where the table was written; `None` when no rows matched
    pub output_location: Option<String>,
}

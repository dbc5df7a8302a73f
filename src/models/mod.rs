// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod post;
mod row;

// Re-export all public types
pub use config::{
    ApiConfig, ClassifierConfig, Config, CrawlerConfig, OutputConfig, SearchSort, ThemeConfig,
    TimeRange,
};
pub use post::{Comment, CommentForest, CommentNode, MoreComments, Post};
pub use row::{ClassifiedRow, CrawlStats, ForumOutcome};

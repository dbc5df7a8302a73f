//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Keyword taxonomy compilation (`Taxonomy`)
//! - Search query packing (`build_query_chunks`)
//! - Request admission (`RateGate`)
//! - Post loading and text aggregation (`ContentFetcher`)
//! - Youth/theme classification and summaries (`Classifier`)
//! - Per-forum crawling (`SubredditCrawler`)

pub mod chunks;
pub mod classifier;
pub mod fetcher;
pub mod gate;
pub mod pool;
pub mod subreddit;
pub mod taxonomy;

pub use chunks::{QueryChunk, build_query_chunks};
pub use classifier::{Classification, Classifier, ThemeMatch};
pub use fetcher::{ContentFetcher, FetchedPost};
pub use gate::RateGate;
pub use pool::{MergeOutcome, PostPool};
pub use subreddit::SubredditCrawler;
pub use taxonomy::{KeywordPattern, Taxonomy, ThemePatterns};

//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Crawl every configured forum and write the matched rows

pub mod crawl;

pub use crawl::{CrawlPlan, run_crawler};

//! Forum API abstraction.
//!
//! The crawl core only sees this capability set. `RedditClient` implements
//! it over the Reddit OAuth API.

pub mod reddit;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, SearchSort, TimeRange};

pub use reddit::{Credentials, RedditClient};

/// Network operations the crawler needs from a forum.
#[async_trait]
pub trait ForumApi: Send + Sync {
    /// Search one forum, returning at most `limit` posts.
    async fn search(
        &self,
        forum: &str,
        query: &str,
        sort: SearchSort,
        time_range: TimeRange,
        limit: usize,
    ) -> Result<Vec<Post>>;

    /// Newest posts of one forum.
    async fn list_recent(&self, forum: &str, limit: usize) -> Result<Vec<Post>>;

    /// Populate the body and initial comment tree of a post.
    async fn load(&self, post: &mut Post) -> Result<()>;

    /// Replace up to `limit` collapsed comment placeholders with comments.
    async fn expand_comments(&self, post: &mut Post, limit: usize) -> Result<()>;
}

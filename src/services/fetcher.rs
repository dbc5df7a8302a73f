// src/services/fetcher.rs

//! Loads a post with its comments and flattens it into one text blob.

use crate::api::ForumApi;
use crate::error::Result;
use crate::models::Post;
use crate::services::gate::RateGate;

/// A loaded post and its aggregated text.
#[derive(Debug)]
pub struct FetchedPost {
    pub post: Post,
    pub text: String,
}

/// Gated load + comment expansion for individual posts.
pub struct ContentFetcher<'a> {
    api: &'a dyn ForumApi,
    gate: &'a RateGate,
    comment_limit: usize,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(api: &'a dyn ForumApi, gate: &'a RateGate, comment_limit: usize) -> Self {
        Self {
            api,
            gate,
            comment_limit,
        }
    }

    /// Load the post body, expand its comments and aggregate the text.
    ///
    /// Each network step holds its own gate permit. Failures are returned
    /// as-is; nothing is retried.
    pub async fn fetch(&self, mut post: Post) -> Result<FetchedPost> {
        self.gate.run(self.api.load(&mut post)).await?;
        self.gate
            .run(self.api.expand_comments(&mut post, self.comment_limit))
            .await?;

        let text = post.aggregate_text();
        Ok(FetchedPost { post, text })
    }
}

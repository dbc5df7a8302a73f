// src/services/subreddit.rs

//! Per-forum crawl: search every query chunk, pool, optionally fall back to
//! the recency listing, fetch and classify.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::api::ForumApi;
use crate::error::Result;
use crate::models::{ClassifiedRow, CrawlerConfig, ForumOutcome, Post};
use crate::services::chunks::QueryChunk;
use crate::services::classifier::{Classification, Classifier};
use crate::services::fetcher::{ContentFetcher, FetchedPost};
use crate::services::gate::RateGate;
use crate::services::pool::{MergeOutcome, PostPool};

/// Crawls one forum at a time with shared, read-only run state.
pub struct SubredditCrawler<'a> {
    api: &'a dyn ForumApi,
    gate: &'a RateGate,
    classifier: &'a Classifier,
    chunks: &'a [QueryChunk],
    config: &'a CrawlerConfig,
}

impl<'a> SubredditCrawler<'a> {
    pub fn new(
        api: &'a dyn ForumApi,
        gate: &'a RateGate,
        classifier: &'a Classifier,
        chunks: &'a [QueryChunk],
        config: &'a CrawlerConfig,
    ) -> Self {
        Self {
            api,
            gate,
            classifier,
            chunks,
            config,
        }
    }

    /// Crawl one forum and return its classified rows.
    ///
    /// The first transport error aborts the forum and is returned.
    pub async fn crawl(&self, forum: &str) -> Result<ForumOutcome> {
        let mut pool = self.search(forum).await?;
        log::debug!("r/{}: {} distinct post(s) from search", forum, pool.len());

        let used_fallback = pool.is_empty();
        if used_fallback {
            self.fallback(forum, &mut pool).await?;
            log::info!(
                "r/{}: no search results, recency listing gave {} post(s)",
                forum,
                pool.len()
            );
        }

        let fetched = self.fetch_all(pool.into_posts()).await?;
        let mut outcome = ForumOutcome {
            forum: forum.to_string(),
            candidates: fetched.len(),
            used_fallback,
            ..ForumOutcome::default()
        };
        self.classify(fetched, &mut outcome);
        Ok(outcome)
    }

    /// Issue every chunk, then merge results in chunk order.
    ///
    /// All searches finish before the pool is touched, so it is settled
    /// before any fetch begins.
    async fn search(&self, forum: &str) -> Result<PostPool> {
        let results: Vec<Vec<Post>> = stream::iter(self.chunks)
            .map(|chunk| self.search_chunk(forum, chunk))
            .buffered(self.gate.capacity())
            .try_collect()
            .await?;

        let mut pool = PostPool::new();
        let mut replaced = 0;
        for post in results.into_iter().flatten() {
            if pool.merge(post) == MergeOutcome::Replaced {
                replaced += 1;
            }
        }
        if replaced > 0 {
            log::debug!("r/{}: {} duplicate(s) upgraded by score", forum, replaced);
        }
        Ok(pool)
    }

    async fn search_chunk(&self, forum: &str, chunk: &QueryChunk) -> Result<Vec<Post>> {
        let query = chunk.query();
        self.gate
            .run(self.api.search(
                forum,
                &query,
                self.config.search_sort,
                self.config.search_time_range,
                self.config.search_limit,
            ))
            .await
    }

    async fn fallback(&self, forum: &str, pool: &mut PostPool) -> Result<()> {
        let recent = self
            .gate
            .run(self.api.list_recent(forum, self.config.fallback_limit))
            .await?;
        for post in recent {
            pool.put(post);
        }
        Ok(())
    }

    async fn fetch_all(&self, posts: Vec<Post>) -> Result<Vec<FetchedPost>> {
        let fetcher = ContentFetcher::new(self.api, self.gate, self.config.comment_expand_limit);
        stream::iter(posts)
            .map(|post| fetcher.fetch(post))
            .buffered(self.gate.capacity())
            .try_collect()
            .await
    }

    fn classify(&self, fetched: Vec<FetchedPost>, outcome: &mut ForumOutcome) {
        for FetchedPost { post, text } in fetched {
            match self.classifier.classify(&text) {
                Classification::Matched {
                    theme,
                    keyword,
                    summary,
                } => outcome.rows.push(ClassifiedRow {
                    forum: outcome.forum.clone(),
                    theme,
                    keyword,
                    title: post.title,
                    summary,
                }),
                Classification::NotYouth => outcome.rejected_age += 1,
                Classification::NoTheme => outcome.rejected_theme += 1,
            }
        }
    }
}

// src/pipeline/crawl.rs

//! Crawl pipeline: every configured forum, one after another.

use std::sync::Arc;

use chrono::Utc;

use crate::api::ForumApi;
use crate::error::Result;
use crate::models::{ClassifiedRow, Config, CrawlStats};
use crate::services::{
    Classifier, QueryChunk, RateGate, SubredditCrawler, Taxonomy, build_query_chunks,
};
use crate::storage::RowStorage;

/// Shared, immutable state for one run.
pub struct CrawlPlan {
    pub classifier: Classifier,
    pub chunks: Vec<QueryChunk>,
}

impl CrawlPlan {
    /// Validate configuration and compile taxonomy, classifier and chunks.
    pub fn build(config: &Config) -> Result<Self> {
        config.validate()?;
        let taxonomy = Arc::new(Taxonomy::from_config(&config.themes)?);
        let chunks = build_query_chunks(&taxonomy.keywords(), config.crawler.chunk_max_len);
        let classifier = Classifier::new(&config.classifier, taxonomy)?;
        Ok(Self { classifier, chunks })
    }
}

/// Run the crawler over every configured forum.
///
/// Rows are written once at the end, and only when at least one matched.
pub async fn run_crawler(
    config: &Config,
    api: &dyn ForumApi,
    storage: &dyn RowStorage,
) -> Result<CrawlStats> {
    let start_time = Utc::now();
    let plan = CrawlPlan::build(config)?;
    let gate = RateGate::new(config.crawler.max_concurrent);

    log::info!(
        "Crawling {} forum(s) with {} query chunk(s), gate capacity {}",
        config.forums.len(),
        plan.chunks.len(),
        gate.capacity()
    );

    let crawler = SubredditCrawler::new(
        api,
        &gate,
        &plan.classifier,
        &plan.chunks,
        &config.crawler,
    );

    let mut rows: Vec<ClassifiedRow> = Vec::new();
    let mut candidate_count = 0;

    for (i, forum) in config.forums.iter().enumerate() {
        log::info!("[{}/{}] r/{}", i + 1, config.forums.len(), forum);

        let outcome = crawler
            .crawl(forum)
            .await
            .inspect_err(|e| log::error!("Crawl of r/{} failed: {}", forum, e))?;

        log::info!(
            "r/{}: {} candidate(s), {} row(s), {} rejected by age, {} without theme",
            forum,
            outcome.candidates,
            outcome.rows.len(),
            outcome.rejected_age,
            outcome.rejected_theme
        );
        candidate_count += outcome.candidates;
        rows.extend(outcome.rows);
    }

    let output_location = if rows.is_empty() {
        log::warn!("No matching posts found; nothing written");
        None
    } else {
        let meta = storage.write_rows(&rows).await?;
        log::debug!(
            "Wrote {} row(s) to {} at {}",
            meta.row_count,
            meta.location,
            meta.timestamp.to_rfc3339()
        );
        Some(meta.location)
    };

    Ok(CrawlStats {
        start_time,
        end_time: Utc::now(),
        forum_count: config.forums.len(),
        candidate_count,
        row_count: rows.len(),
        output_location,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::api::testing::{FakeForum, Thread};
    use crate::models::Post;
    use crate::storage::{LocalStorage, WriteMetadata};

    /// Records writes instead of touching the filesystem.
    #[derive(Default)]
    struct RecordingStorage {
        writes: Mutex<Vec<Vec<ClassifiedRow>>>,
    }

    #[async_trait]
    impl RowStorage for RecordingStorage {
        async fn write_rows(&self, rows: &[ClassifiedRow]) -> Result<WriteMetadata> {
            self.writes.lock().unwrap().push(rows.to_vec());
            Ok(WriteMetadata {
                row_count: rows.len(),
                location: "memory".to_string(),
                timestamp: Utc::now(),
            })
        }
    }

    fn config(forums: &[&str]) -> Config {
        Config {
            forums: forums.iter().map(|f| f.to_string()).collect(),
            ..Config::default()
        }
    }

    fn thread(body: &str) -> Thread {
        Thread {
            body: body.to_string(),
            ..Thread::default()
        }
    }

    #[tokio::test]
    async fn test_rows_accumulate_in_forum_order() {
        let mut api = FakeForum::default();
        api.search
            .insert("first".to_string(), vec![Post::new("a", 1, "A")]);
        api.recent
            .insert("second".to_string(), vec![Post::new("b", 1, "B")]);
        api.threads
            .insert("a".to_string(), thread("I'm 13 and the bullying won't stop."));
        api.threads
            .insert("b".to_string(), thread("16m, my ex keeps gaslighting me."));

        let storage = RecordingStorage::default();
        let stats = run_crawler(&config(&["first", "second"]), &api, &storage)
            .await
            .unwrap();

        assert_eq!(stats.forum_count, 2);
        assert_eq!(stats.row_count, 2);
        assert_eq!(stats.output_location.as_deref(), Some("memory"));

        let writes = storage.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let forums: Vec<_> = writes[0].iter().map(|r| r.forum.as_str()).collect();
        assert_eq!(forums, vec!["first", "second"]);
        assert_eq!(writes[0][0].keyword, "bullying");
        assert_eq!(writes[0][1].theme, "dating");
    }

    #[tokio::test]
    async fn test_no_rows_means_no_write() {
        let mut api = FakeForum::default();
        api.search
            .insert("AskReddit".to_string(), vec![Post::new("a", 1, "Q")]);
        api.threads
            .insert("a".to_string(), thread("I'm 35 and stress is constant."));

        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("Reddit.csv"));
        let stats = run_crawler(&config(&["AskReddit"]), &api, &storage)
            .await
            .unwrap();

        assert_eq!(stats.row_count, 0);
        assert!(stats.output_location.is_none());
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn test_forum_failure_aborts_run() {
        let mut api = FakeForum {
            fail_search_in: Some("broken".to_string()),
            ..FakeForum::default()
        };
        api.search
            .insert("ok".to_string(), vec![Post::new("a", 1, "A")]);
        api.threads
            .insert("a".to_string(), thread("I'm 13 and the bullying won't stop."));

        let storage = RecordingStorage::default();
        let result = run_crawler(&config(&["ok", "broken", "never"]), &api, &storage).await;

        assert!(result.is_err());
        assert!(storage.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_network() {
        let api = FakeForum::default();
        let storage = RecordingStorage::default();
        let mut cfg = config(&["teenagers"]);
        cfg.themes.clear();

        assert!(run_crawler(&cfg, &api, &storage).await.is_err());
        assert_eq!(api.search_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_csv_output() {
        let mut api = FakeForum::default();
        api.search.insert(
            "teenagers".to_string(),
            vec![Post::new(
                "p",
                2,
                "I'm 16 and I keep having panic attacks at school.",
            )],
        );
        api.threads
            .insert("p".to_string(), thread("It's been really hard."));

        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("Reddit.csv"));
        run_crawler(&config(&["teenagers"]), &api, &storage)
            .await
            .unwrap();

        let mut reader = csv::Reader::from_path(storage.path()).unwrap();
        let rows: Vec<ClassifiedRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].title,
            "I'm 16 and I keep having panic attacks at school."
        );
        assert_eq!(rows[0].keyword, "panic");
        assert_eq!(
            rows[0].summary,
            "I'm 16 and I keep having panic attacks at school. It's been really hard."
        );
    }
}

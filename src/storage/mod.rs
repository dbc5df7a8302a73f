//! Storage abstractions for the output table.
//!
//! A run produces exactly one artifact: a fully quoted UTF-8 CSV with the
//! columns `forum, theme, keyword, title, summary`, written once at the end.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::ClassifiedRow;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of rows written
    pub row_count: usize,
    /// Where the table ended up
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for output table backends.
#[async_trait]
pub trait RowStorage: Send + Sync {
    /// Write the complete row set, replacing any previous table.
    async fn write_rows(&self, rows: &[ClassifiedRow]) -> Result<WriteMetadata>;
}

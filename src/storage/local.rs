//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use csv::{QuoteStyle, WriterBuilder};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ClassifiedRow;
use crate::storage::{RowStorage, WriteMetadata};

/// Writes the output table to a single CSV file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing to the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Serialize rows as CSV with every field quoted.
pub fn encode_rows(rows: &[ClassifiedRow]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

#[async_trait]
impl RowStorage for LocalStorage {
    async fn write_rows(&self, rows: &[ClassifiedRow]) -> Result<WriteMetadata> {
        let bytes = encode_rows(rows)?;
        self.write_bytes(&bytes).await?;
        log::info!("{} row(s) written to {}", rows.len(), self.path.display());

        Ok(WriteMetadata {
            row_count: rows.len(),
            location: self.path.display().to_string(),
            timestamp: Utc::now(),
        })
    }
}

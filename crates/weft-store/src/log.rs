//! The append-only document log.
//!
//! The log is the single durable source of truth for a domain. Writes go
//! to the log before any index; the sync engine replays unindexed entries
//! from it after a crash or a partial failure. Entries are never mutated
//! or deleted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use weft_core::{Document, Error, Result};

// ============================================================================
// Trait
// ============================================================================

/// Durable, append-only, per-domain record of raw ingested documents.
#[async_trait]
pub trait DocumentLog: Send + Sync {
    /// Append a document, assigning its final timestamp.
    ///
    /// Returns the persisted document. Timestamps are monotonically
    /// non-decreasing within a domain; an append that would step backwards
    /// (clock skew) is clamped to the previous entry's timestamp.
    async fn append(&self, document: Document) -> Result<Document>;

    /// Read every document for a domain, in stable append order.
    ///
    /// A missing backing store is initialized empty rather than failing.
    async fn read_all(&self, domain: &str) -> Result<Vec<Document>>;
}

// ============================================================================
// JSON file backend
// ============================================================================

/// File-backed log: one `<domain>.json` array per domain under a root
/// directory.
#[derive(Debug, Clone)]
pub struct JsonDocumentLog {
    root: PathBuf,
}

impl JsonDocumentLog {
    /// Create a log rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Path of the per-domain log file.
    pub fn file_path(&self, domain: &str) -> PathBuf {
        self.root.join(format!("{domain}.json"))
    }

    fn read_file(path: &Path) -> Result<Vec<Document>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(path)?;
        let documents: Vec<Document> = serde_json::from_str(&json)?;
        Ok(documents)
    }

    fn write_file(path: &Path, documents: &[Document]) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentLog for JsonDocumentLog {
    async fn append(&self, mut document: Document) -> Result<Document> {
        document.validate()?;
        if document.domain.contains(std::path::is_separator) {
            return Err(Error::validation("domain must not contain path separators"));
        }

        let path = self.file_path(&document.domain);
        let mut documents = Self::read_file(&path)?;

        // Keep per-domain timestamps monotonic even across clock steps.
        if let Some(last) = documents.last() {
            if document.timestamp < last.timestamp {
                document.timestamp = last.timestamp;
            }
        }

        documents.push(document.clone());
        Self::write_file(&path, &documents)?;
        debug!(
            "appended document to {} ({} entries)",
            path.display(),
            documents.len()
        );
        Ok(document)
    }

    async fn read_all(&self, domain: &str) -> Result<Vec<Document>> {
        if domain.is_empty() {
            return Err(Error::validation("domain must not be empty"));
        }
        let path = self.file_path(domain);
        if !path.exists() {
            // Initialize an empty log so later syncs have a file to read.
            Self::write_file(&path, &[])?;
            return Ok(Vec::new());
        }
        Self::read_file(&path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_append_and_read_roundtrip() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        log.append(Document::new("news", "first")).await.unwrap();
        log.append(Document::new("news", "second")).await.unwrap();

        let documents = log.read_all("news").await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].text, "first");
        assert_eq!(documents[1].text, "second");
    }

    #[tokio::test]
    async fn test_read_all_missing_file_initializes_empty() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        let documents = log.read_all("fresh").await.unwrap();
        assert!(documents.is_empty());
        assert!(log.file_path("fresh").exists());
    }

    #[tokio::test]
    async fn test_append_assigns_monotonic_timestamps() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        let first = log.append(Document::new("news", "a")).await.unwrap();

        // Simulate a clock step backwards.
        let mut skewed = Document::new("news", "b");
        skewed.timestamp = first.timestamp - Duration::seconds(30);
        let second = log.append(skewed).await.unwrap();

        assert!(second.timestamp >= first.timestamp);
        let documents = log.read_all("news").await.unwrap();
        assert!(documents[0].timestamp <= documents[1].timestamp);
    }

    #[tokio::test]
    async fn test_append_order_is_stable_across_reads() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        for i in 0..5 {
            log.append(Document::new("news", format!("doc {i}")))
                .await
                .unwrap();
        }

        let once = log.read_all("news").await.unwrap();
        let twice = log.read_all("news").await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_append_rejects_missing_domain() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        let mut doc = Document::new("x", "text");
        doc.domain.clear();
        let err = log.append(doc).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_append_rejects_path_separator_in_domain() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        let err = log
            .append(Document::new("../escape", "text"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_domains_are_isolated() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        log.append(Document::new("alpha", "a")).await.unwrap();
        log.append(Document::new("beta", "b")).await.unwrap();

        assert_eq!(log.read_all("alpha").await.unwrap().len(), 1);
        assert_eq!(log.read_all("beta").await.unwrap().len(), 1);
    }

    #[test]
    fn test_file_naming_contract() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();
        assert_eq!(
            log.file_path("news"),
            dir.path().join("news.json"),
        );
    }

    #[tokio::test]
    async fn test_append_timestamps_survive_roundtrip() {
        let dir = tempdir().unwrap();
        let log = JsonDocumentLog::new(dir.path()).unwrap();

        let before = Utc::now();
        let persisted = log.append(Document::new("news", "a")).await.unwrap();
        assert!(persisted.timestamp >= before);

        let read = log.read_all("news").await.unwrap();
        assert_eq!(read[0].timestamp, persisted.timestamp);
    }
}

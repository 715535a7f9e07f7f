//! The keyword (full-text) index.
//!
//! One logical index exists per `(domain, model)` key. The trait mirrors
//! what the sync engine needs from any full-text backend: index lifecycle,
//! upsert by document id, ranked keyword query, and a timestamp-ordered
//! listing used for watermark computation and id recovery.
//!
//! [`MemoryTextIndex`] is the in-process reference backend with plain
//! term-frequency relevance. A production backend (e.g. Tantivy with BM25)
//! implements the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use log::debug;
use weft_core::{DomainKey, Error, IndexedDocument, Result};

// ============================================================================
// Trait
// ============================================================================

/// Keyword search capability, one logical index per domain key.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// Whether an index exists for the key.
    async fn exists(&self, key: &DomainKey) -> Result<bool>;

    /// Create an empty index for the key. Creating an existing index is a
    /// no-op.
    async fn create(&self, key: &DomainKey) -> Result<()>;

    /// Insert or replace a document by its `unique_id`.
    async fn upsert(&self, key: &DomainKey, document: IndexedDocument) -> Result<()>;

    /// Ranked keyword query: results sorted by relevance, then recency.
    async fn query_text(
        &self,
        key: &DomainKey,
        query: &str,
        k: usize,
    ) -> Result<Vec<IndexedDocument>>;

    /// All documents for the key, sorted by timestamp (oldest first).
    async fn list_all(&self, key: &DomainKey) -> Result<Vec<IndexedDocument>>;
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory reference text index.
///
/// Relevance is the summed term frequency of query tokens in the document
/// text. Ties rank the more recent document first.
#[derive(Debug, Default)]
pub struct MemoryTextIndex {
    indexes: RwLock<HashMap<String, HashMap<u64, IndexedDocument>>>,
}

impl MemoryTextIndex {
    /// Create an empty index store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> Error {
        Error::backend("text index lock poisoned")
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn relevance(query_tokens: &[String], document_text: &str) -> usize {
    let doc_tokens = tokenize(document_text);
    query_tokens
        .iter()
        .map(|q| doc_tokens.iter().filter(|d| *d == q).count())
        .sum()
}

#[async_trait]
impl TextIndex for MemoryTextIndex {
    async fn exists(&self, key: &DomainKey) -> Result<bool> {
        let indexes = self.indexes.read().map_err(|_| Self::lock_err())?;
        Ok(indexes.contains_key(&key.index_name()))
    }

    async fn create(&self, key: &DomainKey) -> Result<()> {
        let mut indexes = self.indexes.write().map_err(|_| Self::lock_err())?;
        indexes.entry(key.index_name()).or_default();
        debug!("created text index {key}");
        Ok(())
    }

    async fn upsert(&self, key: &DomainKey, document: IndexedDocument) -> Result<()> {
        document.document.validate()?;
        let mut indexes = self.indexes.write().map_err(|_| Self::lock_err())?;
        let index = indexes.entry(key.index_name()).or_default();
        index.insert(document.unique_id, document);
        Ok(())
    }

    async fn query_text(
        &self,
        key: &DomainKey,
        query: &str,
        k: usize,
    ) -> Result<Vec<IndexedDocument>> {
        let query_tokens = tokenize(query);
        let indexes = self.indexes.read().map_err(|_| Self::lock_err())?;
        let index = indexes
            .get(&key.index_name())
            .ok_or_else(|| Error::not_found(format!("text index {key}")))?;

        let mut scored: Vec<(usize, &IndexedDocument)> = index
            .values()
            .map(|doc| (relevance(&query_tokens, &doc.document.text), doc))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Relevance first, recency second, id last for a stable order.
        scored.sort_by(|(sa, da), (sb, db)| {
            sb.cmp(sa)
                .then(db.document.timestamp.cmp(&da.document.timestamp))
                .then(da.unique_id.cmp(&db.unique_id))
        });

        Ok(scored.into_iter().take(k).map(|(_, d)| d.clone()).collect())
    }

    async fn list_all(&self, key: &DomainKey) -> Result<Vec<IndexedDocument>> {
        let indexes = self.indexes.read().map_err(|_| Self::lock_err())?;
        let Some(index) = indexes.get(&key.index_name()) else {
            return Ok(Vec::new());
        };
        let mut documents: Vec<IndexedDocument> = index.values().cloned().collect();
        documents.sort_by(|a, b| {
            a.document
                .timestamp
                .cmp(&b.document.timestamp)
                .then(a.unique_id.cmp(&b.unique_id))
        });
        Ok(documents)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use weft_core::Document;

    fn key() -> DomainKey {
        DomainKey::new("news", "minilm")
    }

    fn doc(id: u64, text: &str) -> IndexedDocument {
        IndexedDocument {
            unique_id: id,
            document: Document::new("news", text),
        }
    }

    #[tokio::test]
    async fn test_create_and_exists() {
        let index = MemoryTextIndex::new();
        assert!(!index.exists(&key()).await.unwrap());
        index.create(&key()).await.unwrap();
        assert!(index.exists(&key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_existing_is_noop() {
        let index = MemoryTextIndex::new();
        index.create(&key()).await.unwrap();
        index.upsert(&key(), doc(1, "hello")).await.unwrap();
        index.create(&key()).await.unwrap();
        assert_eq!(index.list_all(&key()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = MemoryTextIndex::new();
        index.upsert(&key(), doc(1, "old text")).await.unwrap();
        index.upsert(&key(), doc(1, "new text")).await.unwrap();

        let all = index.list_all(&key()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].document.text, "new text");
    }

    #[tokio::test]
    async fn test_query_matches_keyword() {
        let index = MemoryTextIndex::new();
        index.upsert(&key(), doc(1, "rust retrieval engine")).await.unwrap();
        index.upsert(&key(), doc(2, "python scripts")).await.unwrap();

        let results = index.query_text(&key(), "rust", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].unique_id, 1);
    }

    #[tokio::test]
    async fn test_query_ranks_by_term_frequency() {
        let index = MemoryTextIndex::new();
        index.upsert(&key(), doc(1, "cache")).await.unwrap();
        index.upsert(&key(), doc(2, "cache cache cache")).await.unwrap();

        let results = index.query_text(&key(), "cache", 5).await.unwrap();
        assert_eq!(results[0].unique_id, 2);
        assert_eq!(results[1].unique_id, 1);
    }

    #[tokio::test]
    async fn test_query_breaks_ties_by_recency() {
        let index = MemoryTextIndex::new();
        let mut older = doc(1, "same words");
        older.document.timestamp -= Duration::seconds(60);
        index.upsert(&key(), older).await.unwrap();
        index.upsert(&key(), doc(2, "same words")).await.unwrap();

        let results = index.query_text(&key(), "words", 5).await.unwrap();
        assert_eq!(results[0].unique_id, 2);
    }

    #[tokio::test]
    async fn test_query_is_case_insensitive() {
        let index = MemoryTextIndex::new();
        index.upsert(&key(), doc(1, "Hello World")).await.unwrap();
        let results = index.query_text(&key(), "hello", 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_query_respects_k() {
        let index = MemoryTextIndex::new();
        for id in 1..=10 {
            index.upsert(&key(), doc(id, "common term")).await.unwrap();
        }
        let results = index.query_text(&key(), "term", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_query_unknown_key_is_not_found() {
        let index = MemoryTextIndex::new();
        let err = index.query_text(&key(), "anything", 5).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_timestamp() {
        let index = MemoryTextIndex::new();
        let mut old = doc(2, "old");
        old.document.timestamp -= Duration::seconds(120);
        index.upsert(&key(), doc(1, "new")).await.unwrap();
        index.upsert(&key(), old).await.unwrap();

        let all = index.list_all(&key()).await.unwrap();
        assert_eq!(all[0].unique_id, 2);
        assert_eq!(all[1].unique_id, 1);
    }

    #[tokio::test]
    async fn test_list_all_missing_key_is_empty() {
        let index = MemoryTextIndex::new();
        assert!(index.list_all(&key()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let index = MemoryTextIndex::new();
        let other = DomainKey::new("news", "other");
        index.upsert(&key(), doc(1, "text")).await.unwrap();
        assert!(index.list_all(&other).await.unwrap().is_empty());
    }
}

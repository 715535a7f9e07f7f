//! Common types shared across the Weft crates.
//!
//! These types describe the data model: domain identity and configuration,
//! log documents, indexed documents, and chunk keys for the vector index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Domain identity
// ============================================================================

/// Identity of one retrieval namespace: a corpus paired with an embedding
/// model. Both parts are lower-cased at construction so that `"News"` and
/// `"news"` name the same domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainKey {
    /// Corpus name.
    pub domain: String,

    /// Embedding model name.
    pub model: String,
}

impl DomainKey {
    /// Create a new domain key, lower-casing both parts.
    pub fn new(domain: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
            model: model.into().to_lowercase(),
        }
    }

    /// The `<domain>_<model>` index name. This rendering is part of the
    /// on-disk contract: artifacts are named `<domain>_<model>.index` and
    /// `<domain>_<model>.json`.
    pub fn index_name(&self) -> String {
        format!("{}_{}", self.domain, self.model)
    }

    /// Parse a key back out of an artifact file stem (`<domain>_<model>`).
    ///
    /// Returns `None` for stems that do not split into exactly two parts,
    /// mirroring how domain discovery skips unrecognized files.
    pub fn from_index_stem(stem: &str) -> Option<Self> {
        let mut parts = stem.split('_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(domain), Some(model), None) if !domain.is_empty() && !model.is_empty() => {
                Some(Self::new(domain, model))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.domain, self.model)
    }
}

// ============================================================================
// Domain configuration
// ============================================================================

/// Per-domain chunking and embedding configuration.
///
/// `embedding_size` is persisted once when the domain is first created and
/// is immutable thereafter; changing it without reindexing would corrupt
/// the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Chunk window size in words.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in words.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Embedding vector dimension.
    #[serde(default = "default_embedding_size")]
    pub embedding_size: usize,
}

fn default_chunk_size() -> usize {
    500
}

fn default_overlap() -> usize {
    50
}

fn default_embedding_size() -> usize {
    128
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            embedding_size: default_embedding_size(),
        }
    }
}

impl DomainConfig {
    /// Validate the configuration.
    ///
    /// `overlap >= chunk_size` would make the chunker's stride zero or
    /// negative, so it is rejected here rather than looping forever.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        if self.embedding_size == 0 {
            return Err(Error::config("embedding_size must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A raw ingested document as recorded in the per-domain log.
///
/// The log is the only durable source of truth; the text and vector indexes
/// are rebuildable projections of it. Entries are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Owning domain name.
    pub domain: String,

    /// Raw document text.
    pub text: String,

    /// Ingestion time, assigned by the log on append. Monotonically
    /// non-decreasing per domain.
    pub timestamp: DateTime<Utc>,
}

impl Document {
    /// Create a new document stamped with the current time. The log may
    /// adjust the timestamp on append to keep per-domain order monotonic.
    pub fn new(domain: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Check required fields. A document without a domain cannot be routed
    /// to a log file or an index.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(Error::validation("document must have a domain"));
        }
        Ok(())
    }
}

/// A document as stored in the text index, carrying its allocated id.
///
/// `unique_id` is unique per logical document within a domain; all chunks
/// of one document share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document id, allocated once per logical document.
    pub unique_id: u64,

    /// The underlying log document.
    #[serde(flatten)]
    pub document: Document,
}

// ============================================================================
// Chunk identity
// ============================================================================

/// Stable key for one chunk in the vector index.
///
/// Chunks of one document share `doc_id` and are distinguished by
/// `chunk_index`, so a multi-chunk document never overwrites its own
/// entries. Retrieval groups hits back to the parent document by `doc_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Parent document id.
    pub doc_id: u64,

    /// Zero-based chunk position within the document.
    pub chunk_index: u32,
}

impl ChunkKey {
    /// Create a chunk key.
    pub fn new(doc_id: u64, chunk_index: u32) -> Self {
        Self { doc_id, chunk_index }
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.doc_id, self.chunk_index)
    }
}

// ============================================================================
// Tests
// ============================================================================

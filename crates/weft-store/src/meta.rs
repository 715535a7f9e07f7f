//! Domain metadata persistence.
//!
//! Each `(domain, model)` pair persists a small `<domain>_<model>.json`
//! metadata file recording the configuration the domain was created with.
//! `embedding_size` is the load-bearing field: it is written once and
//! validated on every later registration, because changing it without
//! reindexing corrupts the vector index.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weft_core::{DomainConfig, DomainKey, Error, Result};

/// Metadata stored alongside a domain's index artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMetadata {
    /// Embedding dimension. Immutable after first creation.
    pub embedding_size: usize,

    /// Chunk window size in words.
    pub chunk_size: usize,

    /// Chunk overlap in words.
    pub overlap: usize,

    /// Embedding provider name.
    pub provider: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl DomainMetadata {
    /// Build metadata for a newly created domain.
    pub fn new(config: DomainConfig, provider: impl Into<String>) -> Self {
        Self {
            embedding_size: config.embedding_size,
            chunk_size: config.chunk_size,
            overlap: config.overlap,
            provider: provider.into(),
            created_at: Utc::now(),
        }
    }

    /// The chunking/embedding configuration this metadata records.
    pub fn config(&self) -> DomainConfig {
        DomainConfig {
            chunk_size: self.chunk_size,
            overlap: self.overlap,
            embedding_size: self.embedding_size,
        }
    }

    /// Check a requested configuration against the persisted one.
    ///
    /// Only `embedding_size` is fatal to change; chunking parameters affect
    /// future ingests only, so a difference there is accepted.
    pub fn check_compatible(&self, requested: &DomainConfig) -> Result<()> {
        if requested.embedding_size != self.embedding_size {
            return Err(Error::config(format!(
                "domain was created with embedding_size {}, requested {}; \
                 changing it requires a full reindex",
                self.embedding_size, requested.embedding_size
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

/// Load/save capability for domain metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Load metadata for a key, `None` when the domain was never created.
    async fn load(&self, key: &DomainKey) -> Result<Option<DomainMetadata>>;

    /// Persist metadata for a key.
    async fn save(&self, key: &DomainKey, metadata: &DomainMetadata) -> Result<()>;
}

/// File-backed metadata store, one JSON file per domain key.
#[derive(Debug, Clone)]
pub struct JsonMetadataStore {
    dir: PathBuf,
}

impl JsonMetadataStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The metadata file path for a key.
    pub fn file_path(&self, key: &DomainKey) -> PathBuf {
        metadata_path(&self.dir, key)
    }
}

fn metadata_path(dir: &Path, key: &DomainKey) -> PathBuf {
    dir.join(format!("{}.json", key.index_name()))
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn load(&self, key: &DomainKey) -> Result<Option<DomainMetadata>> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let metadata: DomainMetadata = serde_json::from_str(&json)?;
        Ok(Some(metadata))
    }

    async fn save(&self, key: &DomainKey, metadata: &DomainMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.file_path(key), json)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key() -> DomainKey {
        DomainKey::new("news", "minilm")
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonMetadataStore::new(dir.path()).unwrap();

        let metadata = DomainMetadata::new(DomainConfig::default(), "ordinal");
        store.save(&key(), &metadata).await.unwrap();

        let loaded = store.load(&key()).await.unwrap().unwrap();
        assert_eq!(loaded, metadata);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonMetadataStore::new(dir.path()).unwrap();
        assert!(store.load(&key()).await.unwrap().is_none());
    }

    #[test]
    fn test_metadata_records_config() {
        let config = DomainConfig {
            chunk_size: 200,
            overlap: 20,
            embedding_size: 64,
        };
        let metadata = DomainMetadata::new(config, "ordinal");
        assert_eq!(metadata.config(), config);
        assert_eq!(metadata.provider, "ordinal");
    }

    #[test]
    fn test_check_compatible_accepts_same_embedding_size() {
        let metadata = DomainMetadata::new(DomainConfig::default(), "ordinal");
        let mut requested = DomainConfig::default();
        requested.chunk_size = 250; // chunking may differ
        assert!(metadata.check_compatible(&requested).is_ok());
    }

    #[test]
    fn test_check_compatible_rejects_embedding_size_change() {
        let metadata = DomainMetadata::new(DomainConfig::default(), "ordinal");
        let requested = DomainConfig {
            embedding_size: 256,
            ..DomainConfig::default()
        };
        let err = metadata.check_compatible(&requested).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_file_naming_contract() {
        let dir = tempdir().unwrap();
        let store = JsonMetadataStore::new(dir.path()).unwrap();
        assert_eq!(
            store.file_path(&key()),
            dir.path().join("news_minilm.json"),
        );
    }
}

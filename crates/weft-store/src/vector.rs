//! The vector (nearest-neighbor) index.
//!
//! One index instance exists per `(domain, model)` key, with a fixed
//! dimension set at creation. Entries are keyed by [`ChunkKey`] so the
//! chunks of one document never collide, and hits can still be grouped
//! back to the parent document by `doc_id`.
//!
//! [`FlatVectorIndex`] is the reference backend: an exhaustive L2 scan
//! over unit-norm vectors (equivalent to cosine ranking), persisted as a
//! `<domain>_<model>.index` artifact. The artifact's presence is how
//! domain discovery finds existing domains at startup.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use weft_core::{ChunkKey, DomainKey, Error, Result};

// ============================================================================
// Traits
// ============================================================================

/// A single chunk hit from a vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// Chunk identity.
    pub key: ChunkKey,

    /// Euclidean distance from the query vector (smaller is closer).
    pub distance: f32,
}

/// Similarity search capability for one domain's chunk vectors.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace the vector stored under a chunk key.
    ///
    /// The vector length must equal [`VectorIndex::dimension`].
    async fn upsert(&self, key: ChunkKey, vector: Vec<f32>) -> Result<()>;

    /// Nearest neighbors of the query vector, closest first.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<VectorHit>>;

    /// Persist the index artifact.
    async fn save_to_disk(&self) -> Result<()>;

    /// The fixed embedding dimension.
    fn dimension(&self) -> usize;

    /// Number of stored chunk vectors.
    async fn len(&self) -> Result<usize>;
}

/// Opens per-domain vector indexes and discovers persisted ones.
///
/// Injected into the registry so domain lifecycle code never touches
/// artifact paths directly.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Open (load or create) the index for a key with the given dimension.
    async fn open(&self, key: &DomainKey, dimension: usize) -> Result<std::sync::Arc<dyn VectorIndex>>;

    /// Keys of every persisted index artifact.
    async fn discover(&self) -> Result<Vec<DomainKey>>;
}

// ============================================================================
// Flat file-backed backend
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct FlatEntry {
    key: ChunkKey,
    vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlatIndexFile {
    dimension: usize,
    entries: Vec<FlatEntry>,
}

/// Exhaustive-scan vector index persisted as a JSON `.index` artifact.
///
/// Entries keep insertion order, so searches are deterministic across
/// runs given the same content.
#[derive(Debug)]
pub struct FlatVectorIndex {
    path: PathBuf,
    dimension: usize,
    entries: RwLock<Vec<(ChunkKey, Vec<f32>)>>,
}

impl FlatVectorIndex {
    /// Load the index artifact for `key`, or start an empty index when no
    /// artifact exists yet.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an existing artifact was built
    /// with a different dimension; re-dimensioning requires a reindex.
    pub fn open(dir: &Path, key: &DomainKey, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::config("embedding dimension must be greater than zero"));
        }
        let path = artifact_path(dir, key);
        if !path.exists() {
            return Ok(Self {
                path,
                dimension,
                entries: RwLock::new(Vec::new()),
            });
        }

        let json = std::fs::read_to_string(&path)?;
        let file: FlatIndexFile = serde_json::from_str(&json)?;
        if file.dimension != dimension {
            return Err(Error::config(format!(
                "vector index {} was built with dimension {}, requested {}",
                key, file.dimension, dimension
            )));
        }

        let entries = file.entries.into_iter().map(|e| (e.key, e.vector)).collect();
        debug!("loaded vector index {} from {}", key, path.display());
        Ok(Self {
            path,
            dimension,
            entries: RwLock::new(entries),
        })
    }

    fn lock_err() -> Error {
        Error::backend("vector index lock poisoned")
    }
}

fn artifact_path(dir: &Path, key: &DomainKey) -> PathBuf {
    dir.join(format!("{}.index", key.index_name()))
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[async_trait]
impl VectorIndex for FlatVectorIndex {
    async fn upsert(&self, key: ChunkKey, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::config(format!(
                "embedding has {} dimensions, index requires {}",
                vector.len(),
                self.dimension
            )));
        }
        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = vector,
            None => entries.push((key, vector)),
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        if vector.len() != self.dimension {
            return Err(Error::config(format!(
                "query vector has {} dimensions, index requires {}",
                vector.len(),
                self.dimension
            )));
        }
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|(key, stored)| VectorHit {
                key: *key,
                distance: euclidean(vector, stored),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.key.doc_id.cmp(&b.key.doc_id))
                .then(a.key.chunk_index.cmp(&b.key.chunk_index))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn save_to_disk(&self) -> Result<()> {
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        let file = FlatIndexFile {
            dimension: self.dimension,
            entries: entries
                .iter()
                .map(|(key, vector)| FlatEntry {
                    key: *key,
                    vector: vector.clone(),
                })
                .collect(),
        };
        let json = serde_json::to_string(&file)?;
        std::fs::write(&self.path, json)?;
        debug!("saved vector index to {}", self.path.display());
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        Ok(entries.len())
    }
}

// ============================================================================
// Flat store (open + discovery)
// ============================================================================

/// Directory-backed [`VectorStore`] over [`FlatVectorIndex`] artifacts.
#[derive(Debug, Clone)]
pub struct FlatVectorStore {
    dir: PathBuf,
}

impl FlatVectorStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The artifact path for a key.
    pub fn artifact_path(&self, key: &DomainKey) -> PathBuf {
        artifact_path(&self.dir, key)
    }
}

#[async_trait]
impl VectorStore for FlatVectorStore {
    async fn open(
        &self,
        key: &DomainKey,
        dimension: usize,
    ) -> Result<std::sync::Arc<dyn VectorIndex>> {
        let index = FlatVectorIndex::open(&self.dir, key, dimension)?;
        Ok(std::sync::Arc::new(index))
    }

    async fn discover(&self) -> Result<Vec<DomainKey>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("index") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Skip artifacts whose names don't parse as <domain>_<model>.
            if let Some(key) = DomainKey::from_index_stem(stem) {
                keys.push(key);
            }
        }
        keys.sort_by(|a, b| a.index_name().cmp(&b.index_name()));
        info!("discovered {} vector index artifacts", keys.len());
        Ok(keys)
    }
}

// ============================================================================
// Tests
// ============================================================================

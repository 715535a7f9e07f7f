//! Domain synchronization: keeping the indexes in agreement with the log.
//!
//! Two triggers drive the engine:
//!
//! - **Load** ([`SyncEngine::reconcile`]): compute the watermark (latest
//!   timestamp visible in the text index), replay every log entry above
//!   it through the chunk → embed → upsert pipeline, and persist the
//!   vector artifact. Re-running against fully-synced indexes replays
//!   nothing.
//! - **Ingest** ([`SyncEngine::ingest`]): append to the log first, then
//!   run the same pipeline for the new document only.
//!
//! Per document, all chunk vectors are upserted before the text-index
//! upsert. The text upsert is the commit point: the watermark is computed
//! from the text index, so a document that failed partway stays below the
//! watermark and is replayed on the next load. Id allocation is
//! deterministic (max + 1), so the replay re-derives the same id and its
//! chunk upserts land on the same vector keys.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use weft_core::{ChunkKey, Document, DomainConfig, DomainKey, IndexedDocument, Result};
use weft_embed::{chunker, EmbeddingAdapter};
use weft_store::{DocumentLog, TextIndex, VectorIndex};

use crate::ids::IdAllocator;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents replayed from the log.
    pub documents_replayed: usize,

    /// Chunk vectors upserted.
    pub chunks_indexed: usize,
}

impl SyncReport {
    /// A pass that found nothing to do.
    pub fn noop() -> Self {
        Self {
            documents_replayed: 0,
            chunks_indexed: 0,
        }
    }
}

/// Reconciles a domain's document log against its two indexes.
#[derive(Clone)]
pub struct SyncEngine {
    log: Arc<dyn DocumentLog>,
    text: Arc<dyn TextIndex>,
    adapter: EmbeddingAdapter,
}

impl SyncEngine {
    /// Create a sync engine over the given stores.
    pub fn new(
        log: Arc<dyn DocumentLog>,
        text: Arc<dyn TextIndex>,
        adapter: EmbeddingAdapter,
    ) -> Self {
        Self { log, text, adapter }
    }

    /// Bring the indexes up to date with the log for one domain.
    ///
    /// Idempotent: with an unchanged log and fully-synced indexes this
    /// performs zero upserts.
    pub async fn reconcile(
        &self,
        key: &DomainKey,
        config: &DomainConfig,
        vector: &dyn VectorIndex,
    ) -> Result<SyncReport> {
        if !self.text.exists(key).await? {
            self.text.create(key).await?;
        }

        let watermark = self.watermark(key).await?;
        let documents = self.log.read_all(&key.domain).await?;

        let mut report = SyncReport::noop();
        for document in documents {
            if let Some(watermark) = watermark {
                if document.timestamp <= watermark {
                    continue;
                }
            }
            let chunks = self.index_document(key, config, vector, document).await?;
            report.documents_replayed += 1;
            report.chunks_indexed += chunks;
        }

        vector.save_to_disk().await?;
        if report.documents_replayed > 0 {
            info!(
                "reconciled {key}: replayed {} documents ({} chunks)",
                report.documents_replayed, report.chunks_indexed
            );
        } else {
            debug!("reconciled {key}: already in sync");
        }
        Ok(report)
    }

    /// Ingest one new document: durable log append, then indexing.
    pub async fn ingest(
        &self,
        key: &DomainKey,
        config: &DomainConfig,
        vector: &dyn VectorIndex,
        document: Document,
    ) -> Result<IndexedDocument> {
        document.validate()?;
        if !self.text.exists(key).await? {
            self.text.create(key).await?;
        }

        // The log write must complete before any index write; if indexing
        // fails from here on, the entry is below the watermark and the
        // next reconcile picks it up.
        let persisted = self.log.append(document).await?;

        let unique_id = IdAllocator::new(&*self.text).next(key).await?;
        let indexed = self
            .apply_pipeline(key, config, vector, persisted, unique_id)
            .await?;
        vector.save_to_disk().await?;
        Ok(indexed.0)
    }

    /// Latest timestamp visible in the text index, `None` when empty.
    async fn watermark(&self, key: &DomainKey) -> Result<Option<DateTime<Utc>>> {
        let indexed = self.text.list_all(key).await?;
        Ok(indexed.last().map(|d| d.document.timestamp))
    }

    async fn index_document(
        &self,
        key: &DomainKey,
        config: &DomainConfig,
        vector: &dyn VectorIndex,
        document: Document,
    ) -> Result<usize> {
        let unique_id = IdAllocator::new(&*self.text).next(key).await?;
        let (_, chunks) = self
            .apply_pipeline(key, config, vector, document, unique_id)
            .await?;
        Ok(chunks)
    }

    /// Chunk, embed, and upsert one document under `unique_id`.
    async fn apply_pipeline(
        &self,
        key: &DomainKey,
        config: &DomainConfig,
        vector: &dyn VectorIndex,
        document: Document,
        unique_id: u64,
    ) -> Result<(IndexedDocument, usize)> {
        let chunks = chunker::split(&document.text, config.chunk_size, config.overlap)?;
        let chunk_count = chunks.len();

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let embedding = self.adapter.embed(&chunk, config.embedding_size).await?;
            vector
                .upsert(ChunkKey::new(unique_id, chunk_index as u32), embedding)
                .await?;
        }

        let indexed = IndexedDocument {
            unique_id,
            document,
        };
        self.text.upsert(key, indexed.clone()).await?;
        debug!("indexed document {unique_id} in {key} ({chunk_count} chunks)");
        Ok((indexed, chunk_count))
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("provider", &self.adapter.provider_name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

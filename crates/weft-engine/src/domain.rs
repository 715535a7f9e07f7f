//! One active retrieval domain.
//!
//! A [`Domain`] owns the handles for its `(domain, model)` namespace and
//! serializes writes through a per-domain lock, so id allocation and log
//! appends never interleave between writers. Reads take no lock; they may
//! observe the bounded not-yet-synced window the sync engine repairs on
//! the next load.

use std::sync::Arc;

use tokio::sync::Mutex;
use weft_core::{Document, DomainConfig, DomainKey, IndexedDocument, Result};
use weft_store::VectorIndex;

use crate::hybrid::{EmbeddingHit, FusedResult, HybridRetriever};
use crate::sync::{SyncEngine, SyncReport};

/// Handle to one loaded domain.
pub struct Domain {
    key: DomainKey,
    config: DomainConfig,
    vector: Arc<dyn VectorIndex>,
    sync: SyncEngine,
    retriever: HybridRetriever,
    write_lock: Mutex<()>,
}

impl Domain {
    /// Open a domain: construct the handle and reconcile its indexes
    /// against the log.
    pub(crate) async fn open(
        key: DomainKey,
        config: DomainConfig,
        vector: Arc<dyn VectorIndex>,
        sync: SyncEngine,
        retriever: HybridRetriever,
    ) -> Result<(Self, SyncReport)> {
        config.validate()?;
        let report = sync.reconcile(&key, &config, &*vector).await?;
        Ok((
            Self {
                key,
                config,
                vector,
                sync,
                retriever,
                write_lock: Mutex::new(()),
            },
            report,
        ))
    }

    /// The domain key.
    pub fn key(&self) -> &DomainKey {
        &self.key
    }

    /// The domain configuration.
    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Ingest a document into this domain.
    ///
    /// The whole append → allocate → index sequence runs under the domain
    /// write lock.
    pub async fn add_data(&self, text: impl Into<String>) -> Result<IndexedDocument> {
        let document = Document::new(self.key.domain.clone(), text);
        let _guard = self.write_lock.lock().await;
        self.sync
            .ingest(&self.key, &self.config, &*self.vector, document)
            .await
    }

    /// Keyword search over this domain.
    pub async fn text_search(&self, query: &str, k: usize) -> Result<Vec<IndexedDocument>> {
        self.retriever.text_search(&self.key, query, k).await
    }

    /// Similarity search over this domain's chunk vectors.
    pub async fn embedding_search(&self, query: &str, k: usize) -> Result<Vec<EmbeddingHit>> {
        self.retriever
            .vector_search(&*self.vector, &self.config, query, k)
            .await
    }

    /// Fused keyword + similarity search.
    pub async fn hybrid_search(&self, query: &str, k: usize) -> Result<Vec<FusedResult>> {
        self.retriever
            .hybrid_search(&self.key, &*self.vector, &self.config, query, k)
            .await
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("key", &self.key)
            .field("config", &self.config)
            .finish()
    }
}

//! The domain registry: discovery, lifecycle, and operation routing.
//!
//! The registry is handed its store handles at construction; nothing in
//! the engine reaches for process-wide state. At startup it discovers
//! previously created domains from their persisted vector-index
//! artifacts, then materializes active [`Domain`] handles lazily as
//! operations arrive.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use tokio::sync::RwLock;
use weft_core::{DomainConfig, DomainKey, Error, IndexedDocument, Result};
use weft_embed::{EmbeddingAdapter, EmbeddingProvider};
use weft_store::{DocumentLog, DomainMetadata, MetadataStore, TextIndex, VectorStore};

use crate::domain::Domain;
use crate::hybrid::{EmbeddingHit, FusedResult, HybridRetriever};
use crate::sync::SyncEngine;

// ============================================================================
// Search modes
// ============================================================================

/// Retrieval mode for [`DomainRegistry::generate_prompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Keyword search only.
    Text,
    /// Vector similarity search only.
    Embedding,
    /// Fused keyword + vector search.
    #[default]
    Hybrid,
}

impl std::str::FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "embedding" => Ok(Self::Embedding),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::config(format!(
                "invalid search mode '{other}'; choose from 'text', 'embedding', or 'hybrid'"
            ))),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Embedding => "embedding",
            Self::Hybrid => "hybrid",
        };
        write!(f, "{name}")
    }
}

/// Ranked results from one retrieval, shaped by the mode that ran.
#[derive(Debug)]
pub enum SearchResults {
    /// Keyword results.
    Text(Vec<IndexedDocument>),
    /// Document ids with best-chunk distances.
    Embedding(Vec<EmbeddingHit>),
    /// RRF-fused results.
    Hybrid(Vec<FusedResult>),
}

/// Default result count for searches, matching the original surface.
pub const DEFAULT_K: usize = 5;

// ============================================================================
// Registry
// ============================================================================

/// Tracks known domains and routes manager-level operations.
pub struct DomainRegistry {
    log: Arc<dyn DocumentLog>,
    text: Arc<dyn TextIndex>,
    vectors: Arc<dyn VectorStore>,
    metadata: Arc<dyn MetadataStore>,
    provider: Arc<dyn EmbeddingProvider>,
    known: RwLock<Vec<DomainKey>>,
    active: RwLock<HashMap<DomainKey, Arc<Domain>>>,
}

impl DomainRegistry {
    /// Construct a registry over injected store handles and discover
    /// existing domains from their persisted vector artifacts.
    pub async fn new(
        log: Arc<dyn DocumentLog>,
        text: Arc<dyn TextIndex>,
        vectors: Arc<dyn VectorStore>,
        metadata: Arc<dyn MetadataStore>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let known = vectors.discover().await?;
        info!("registry started with {} known domains", known.len());
        Ok(Self {
            log,
            text,
            vectors,
            metadata,
            provider,
            known: RwLock::new(known),
            active: RwLock::new(HashMap::new()),
        })
    }

    /// All known domain keys, active or not.
    pub async fn list_domains(&self) -> Vec<DomainKey> {
        self.known.read().await.clone()
    }

    /// Create a domain, or return the existing handle if it already
    /// exists (idempotent).
    ///
    /// For an existing domain the requested configuration is validated
    /// against the persisted metadata: the embedding size may not change.
    pub async fn add_domain(
        &self,
        domain: &str,
        model: &str,
        config: DomainConfig,
    ) -> Result<Arc<Domain>> {
        if domain.is_empty() || model.is_empty() {
            return Err(Error::validation("domain and model names are required"));
        }
        config.validate()?;
        let key = DomainKey::new(domain, model);

        let mut active = self.active.write().await;
        if let Some(existing) = active.get(&key) {
            if config.embedding_size != existing.config().embedding_size {
                return Err(Error::config(format!(
                    "domain was created with embedding_size {}, requested {}; \
                     changing it requires a full reindex",
                    existing.config().embedding_size, config.embedding_size
                )));
            }
            return Ok(existing.clone());
        }

        let config = match self.metadata.load(&key).await? {
            Some(persisted) => {
                persisted.check_compatible(&config)?;
                config
            }
            None => {
                let metadata = DomainMetadata::new(config, self.provider.name());
                self.metadata.save(&key, &metadata).await?;
                config
            }
        };

        let handle = self.open_domain(&key, config).await?;
        active.insert(key.clone(), handle.clone());
        drop(active);

        let mut known = self.known.write().await;
        if !known.contains(&key) {
            known.push(key);
        }
        Ok(handle)
    }

    /// Load a domain handle, materializing it from persisted metadata if
    /// it is not active yet. Unknown domains are created with the default
    /// configuration.
    pub async fn load_domain(&self, domain: &str, model: &str) -> Result<Arc<Domain>> {
        let key = DomainKey::new(domain, model);

        {
            let active = self.active.read().await;
            if let Some(existing) = active.get(&key) {
                return Ok(existing.clone());
            }
        }

        let config = match self.metadata.load(&key).await? {
            Some(metadata) => metadata.config(),
            None => DomainConfig::default(),
        };
        self.add_domain(domain, model, config).await
    }

    /// Ingest a document into a domain.
    pub async fn add_data(
        &self,
        domain: &str,
        model: &str,
        text: &str,
    ) -> Result<IndexedDocument> {
        if text.is_empty() {
            return Err(Error::validation("document text is required"));
        }
        let handle = self.load_domain(domain, model).await?;
        handle.add_data(text).await
    }

    /// Run a retrieval in the given mode and return its ranked results.
    ///
    /// The mode has already been parsed ([`SearchMode::from_str`]), so an
    /// invalid mode fails before any store is touched.
    pub async fn generate_prompt(
        &self,
        domain: &str,
        model: &str,
        query: &str,
        mode: SearchMode,
    ) -> Result<SearchResults> {
        let handle = self.load_domain(domain, model).await?;
        match mode {
            SearchMode::Text => Ok(SearchResults::Text(
                handle.text_search(query, DEFAULT_K).await?,
            )),
            SearchMode::Embedding => Ok(SearchResults::Embedding(
                handle.embedding_search(query, DEFAULT_K).await?,
            )),
            SearchMode::Hybrid => Ok(SearchResults::Hybrid(
                handle.hybrid_search(query, DEFAULT_K).await?,
            )),
        }
    }

    async fn open_domain(&self, key: &DomainKey, config: DomainConfig) -> Result<Arc<Domain>> {
        let vector = self.vectors.open(key, config.embedding_size).await?;
        let adapter = EmbeddingAdapter::new(self.provider.clone());
        let sync = SyncEngine::new(self.log.clone(), self.text.clone(), adapter.clone());
        let retriever = HybridRetriever::new(self.text.clone(), adapter);

        let (domain, report) = Domain::open(key.clone(), config, vector, sync, retriever).await?;
        if report.documents_replayed > 0 {
            info!(
                "domain {key} loaded, {} documents replayed",
                report.documents_replayed
            );
        }
        Ok(Arc::new(domain))
    }
}

impl std::fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("provider", &self.provider.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Hybrid retrieval: keyword and vector fan-out with rank fusion.
//!
//! Both searches run with the same `k`, then merge by reciprocal rank
//! fusion: `score(doc) = Σ 1/(rank + k)` over the lists containing the
//! document, with 1-based ranks and constant `k = 60`. A document present
//! in both lists therefore outranks a document at comparable rank in only
//! one. Exact score ties go to the more recent document.

use std::collections::HashMap;
use std::sync::Arc;

use weft_core::{DomainConfig, DomainKey, IndexedDocument, Result};
use weft_embed::EmbeddingAdapter;
use weft_store::{TextIndex, VectorIndex};

/// RRF constant: higher gives more weight to lower-ranked items.
pub const RRF_CONSTANT: u32 = 60;

/// A document-level hit from the vector index.
///
/// Chunk hits are grouped to their parent document; `distance` is the
/// closest chunk's distance.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingHit {
    /// Parent document id.
    pub doc_id: u64,

    /// Euclidean distance of the best-matching chunk.
    pub distance: f32,
}

/// A fused hybrid search result.
#[derive(Debug, Clone)]
pub struct FusedResult {
    /// The matched document.
    pub document: IndexedDocument,

    /// Combined RRF score (higher is better).
    pub score: f32,

    /// Which lists contained the document: "text", "vector", or "hybrid".
    pub source: &'static str,
}

/// Fans a query out to the text and vector indexes and fuses results.
#[derive(Clone)]
pub struct HybridRetriever {
    text: Arc<dyn TextIndex>,
    adapter: EmbeddingAdapter,
}

impl HybridRetriever {
    /// Create a retriever over the given text index and embedding adapter.
    pub fn new(text: Arc<dyn TextIndex>, adapter: EmbeddingAdapter) -> Self {
        Self { text, adapter }
    }

    /// Keyword search: ranked by relevance, then recency.
    pub async fn text_search(
        &self,
        key: &DomainKey,
        query: &str,
        k: usize,
    ) -> Result<Vec<IndexedDocument>> {
        self.text.query_text(key, query, k).await
    }

    /// Similarity search: ranked document ids with best-chunk distances.
    ///
    /// The underlying index returns `k` chunk hits; hits from chunks of
    /// the same document collapse into one entry, so fewer than `k`
    /// documents may come back.
    pub async fn vector_search(
        &self,
        vector: &dyn VectorIndex,
        config: &DomainConfig,
        query: &str,
        k: usize,
    ) -> Result<Vec<EmbeddingHit>> {
        let embedding = self.adapter.embed(query, config.embedding_size).await?;
        let chunk_hits = vector.search(&embedding, k).await?;

        let mut hits: Vec<EmbeddingHit> = Vec::new();
        for hit in chunk_hits {
            match hits.iter_mut().find(|h| h.doc_id == hit.key.doc_id) {
                Some(existing) => {
                    if hit.distance < existing.distance {
                        existing.distance = hit.distance;
                    }
                }
                // Chunk hits arrive closest-first, so first sight of a
                // document is its best chunk and order stays ranked.
                None => hits.push(EmbeddingHit {
                    doc_id: hit.key.doc_id,
                    distance: hit.distance,
                }),
            }
        }
        Ok(hits)
    }

    /// Hybrid search: both lists with the same `k`, RRF-fused, top `k`.
    pub async fn hybrid_search(
        &self,
        key: &DomainKey,
        vector: &dyn VectorIndex,
        config: &DomainConfig,
        query: &str,
        k: usize,
    ) -> Result<Vec<FusedResult>> {
        let text_results = self.text_search(key, query, k).await?;
        let vector_results = self.vector_search(vector, config, query, k).await?;

        // Resolve vector-only ids to documents through the text index.
        let all = self.text.list_all(key).await?;
        let by_id: HashMap<u64, &IndexedDocument> =
            all.iter().map(|d| (d.unique_id, d)).collect();

        let mut fused = reciprocal_rank_fusion(&text_results, &vector_results, &by_id);
        fused.truncate(k);
        Ok(fused)
    }
}

impl std::fmt::Debug for HybridRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetriever")
            .field("provider", &self.adapter.provider_name())
            .finish()
    }
}

/// Merge a text result list and a vector result list with RRF.
///
/// Vector hits that cannot be resolved to a document (not yet visible in
/// the text index) are skipped; the sync engine repairs that window on the
/// next reconciliation.
fn reciprocal_rank_fusion(
    text_results: &[IndexedDocument],
    vector_results: &[EmbeddingHit],
    by_id: &HashMap<u64, &IndexedDocument>,
) -> Vec<FusedResult> {
    let mut scores: HashMap<u64, f32> = HashMap::new();
    let mut in_text: HashMap<u64, bool> = HashMap::new();
    let mut in_vector: HashMap<u64, bool> = HashMap::new();

    for (rank, doc) in text_results.iter().enumerate() {
        let rrf = 1.0 / (RRF_CONSTANT as f32 + (rank + 1) as f32);
        *scores.entry(doc.unique_id).or_insert(0.0) += rrf;
        in_text.insert(doc.unique_id, true);
    }

    for (rank, hit) in vector_results.iter().enumerate() {
        let rrf = 1.0 / (RRF_CONSTANT as f32 + (rank + 1) as f32);
        *scores.entry(hit.doc_id).or_insert(0.0) += rrf;
        in_vector.insert(hit.doc_id, true);
    }

    let mut results: Vec<FusedResult> = scores
        .into_iter()
        .filter_map(|(id, score)| {
            let document = text_results
                .iter()
                .find(|d| d.unique_id == id)
                .or_else(|| by_id.get(&id).copied())?
                .clone();
            let source = match (in_text.contains_key(&id), in_vector.contains_key(&id)) {
                (true, true) => "hybrid",
                (true, false) => "text",
                _ => "vector",
            };
            Some(FusedResult {
                document,
                score,
                source,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.document.document.timestamp.cmp(&a.document.document.timestamp))
            .then(a.document.unique_id.cmp(&b.document.unique_id))
    });
    results
}

// ============================================================================
// Tests
// ============================================================================

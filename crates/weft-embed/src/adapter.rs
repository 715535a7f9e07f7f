//! Dimension reconciliation and normalization on top of a provider.
//!
//! Vector indexes require every entry to have exactly the domain's
//! `embedding_size` dimensions, and unit L2 norm so that Euclidean search
//! behaves as cosine similarity. The adapter enforces both on whatever raw
//! vector the provider produces.

use std::sync::Arc;

use weft_core::Result;

use crate::provider::EmbeddingProvider;

/// Adapts a raw [`EmbeddingProvider`] to a fixed target dimension.
///
/// Raw vectors longer than the target are truncated; shorter ones are
/// zero-padded. The result is L2-normalized, except for the all-zero
/// vector (possible for empty text), which is returned as-is.
#[derive(Clone)]
pub struct EmbeddingAdapter {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingAdapter {
    /// Create an adapter over the given provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Embed a text to exactly `target_dimension` unit-norm dimensions.
    pub async fn embed(&self, text: &str, target_dimension: usize) -> Result<Vec<f32>> {
        let raw = self.provider.embed_raw(text).await?;
        let mut vector = reconcile_dimension(raw, target_dimension);
        normalize_l2(&mut vector);
        Ok(vector)
    }

    /// Name of the wrapped provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for EmbeddingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingAdapter")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Truncate or zero-pad a raw vector to `target_dimension`.
pub fn reconcile_dimension(mut raw: Vec<f32>, target_dimension: usize) -> Vec<f32> {
    raw.resize(target_dimension, 0.0);
    raw
}

/// Scale a vector to unit L2 norm in place.
///
/// The zero vector is left untouched; dividing by a zero norm would
/// produce NaNs.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Embedding provider trait and the placeholder ordinal provider.
//!
//! The trait abstracts over embedding generation backends. Providers return
//! a *raw* vector of whatever length the model produces; reconciling that
//! length to a domain's fixed dimension is the adapter's job (see
//! [`crate::adapter`]), so the same provider can serve domains with
//! different embedding sizes.

use async_trait::async_trait;
use weft_core::Result;

/// Trait for generating raw text embeddings.
///
/// Implementations wrap specific embedding backends and provide a uniform
/// async interface. The trait requires `Send + Sync` to allow safe sharing
/// across async tasks.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate a raw, length-unbounded embedding for a text.
    async fn embed_raw(&self, text: &str) -> Result<Vec<f32>>;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

/// The placeholder provider: maps each character to its ordinal value.
///
/// Deterministic and dependency-free, which makes sync behavior fully
/// reproducible in tests. Any real model can be substituted behind
/// [`EmbeddingProvider`] without touching the sync engine; downstream code
/// depends only on the adapter's fixed-dimension, normalized output.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalProvider;

#[async_trait]
impl EmbeddingProvider for OrdinalProvider {
    async fn embed_raw(&self, text: &str) -> Result<Vec<f32>> {
        Ok(text.chars().map(|c| c as u32 as f32).collect())
    }

    fn name(&self) -> &str {
        "ordinal"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ordinal_embed_maps_characters() {
        let provider = OrdinalProvider;
        let raw = provider.embed_raw("ab").await.unwrap();
        assert_eq!(raw, vec![97.0, 98.0]);
    }

    #[tokio::test]
    async fn test_ordinal_embed_length_tracks_input() {
        let provider = OrdinalProvider;
        let raw = provider.embed_raw("hello world").await.unwrap();
        assert_eq!(raw.len(), 11);
    }

    #[tokio::test]
    async fn test_ordinal_embed_empty_text() {
        let provider = OrdinalProvider;
        let raw = provider.embed_raw("").await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_ordinal_embed_deterministic() {
        let provider = OrdinalProvider;
        let a = provider.embed_raw("same text").await.unwrap();
        let b = provider.embed_raw("same text").await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(OrdinalProvider.name(), "ordinal");
    }

    #[test]
    fn test_trait_object_safety() {
        fn _assert_object_safe(_: &dyn EmbeddingProvider) {}
    }
}

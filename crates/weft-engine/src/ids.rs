//! Document id allocation.
//!
//! Ids are sequential per domain: one more than the largest `unique_id`
//! already present in the text index, starting at 1 for an empty index.
//! The allocator itself is stateless; uniqueness relies on the per-domain
//! write lock serializing the read-allocate-upsert sequence, so two
//! writers can never observe the same maximum.
//!
//! Allocation is also deterministic: replaying an unindexed document after
//! a partial failure re-derives the same id it was assigned the first
//! time, so its chunk keys land on the same vector entries.

use weft_core::{DomainKey, Result};
use weft_store::TextIndex;

/// Allocates collision-free, domain-scoped document ids.
pub struct IdAllocator<'a> {
    index: &'a dyn TextIndex,
}

impl<'a> IdAllocator<'a> {
    /// Create an allocator reading from the given text index.
    pub fn new(index: &'a dyn TextIndex) -> Self {
        Self { index }
    }

    /// Next id for the domain: `1 + max(unique_id)`, or 1 when the index
    /// is empty or missing.
    ///
    /// A backend failure while reading the index surfaces as an error;
    /// an unchecked id is never returned.
    pub async fn next(&self, key: &DomainKey) -> Result<u64> {
        let documents = self.index.list_all(key).await?;
        Ok(documents
            .iter()
            .map(|d| d.unique_id)
            .max()
            .map_or(1, |max| max + 1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{Document, IndexedDocument};
    use weft_store::MemoryTextIndex;

    fn key() -> DomainKey {
        DomainKey::new("news", "minilm")
    }

    async fn upsert(index: &MemoryTextIndex, id: u64) {
        index
            .upsert(
                &key(),
                IndexedDocument {
                    unique_id: id,
                    document: Document::new("news", format!("doc {id}")),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_index_starts_at_one() {
        let index = MemoryTextIndex::new();
        let allocator = IdAllocator::new(&index);
        assert_eq!(allocator.next(&key()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_is_max_plus_one() {
        let index = MemoryTextIndex::new();
        upsert(&index, 3).await;
        upsert(&index, 7).await;

        let allocator = IdAllocator::new(&index);
        assert_eq!(allocator.next(&key()).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_sequential_ids_are_distinct() {
        let index = MemoryTextIndex::new();
        let allocator = IdAllocator::new(&index);

        let mut issued = Vec::new();
        for _ in 0..20 {
            let id = allocator.next(&key()).await.unwrap();
            assert!(!issued.contains(&id));
            issued.push(id);
            upsert(&index, id).await;
        }
        assert_eq!(issued.len(), 20);
    }

    #[tokio::test]
    async fn test_ids_are_domain_scoped() {
        let index = MemoryTextIndex::new();
        upsert(&index, 5).await;

        let other = DomainKey::new("wiki", "minilm");
        let allocator = IdAllocator::new(&index);
        assert_eq!(allocator.next(&other).await.unwrap(), 1);
    }
}

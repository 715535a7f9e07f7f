//! Storage backends for Weft.
//!
//! Three stores cooperate per retrieval domain, with very different
//! durability roles:
//!
//! - [`DocumentLog`] — append-only source of truth (`<domain>.json`).
//! - [`TextIndex`] — keyword search projection, rebuildable from the log.
//! - [`VectorIndex`] — similarity search projection, persisted as a
//!   `<domain>_<model>.index` artifact that doubles as the domain
//!   discovery marker.
//!
//! [`MetadataStore`] persists per-domain configuration
//! (`<domain>_<model>.json`), pinning the embedding dimension.
//!
//! Each capability is a trait plus an in-process reference backend;
//! production engines implement the same traits.

pub mod log;
pub mod meta;
pub mod text;
pub mod vector;

// Re-exports — traits
pub use crate::log::DocumentLog;
pub use meta::MetadataStore;
pub use text::TextIndex;
pub use vector::{VectorIndex, VectorStore};

// Re-exports — reference backends
pub use crate::log::JsonDocumentLog;
pub use meta::{DomainMetadata, JsonMetadataStore};
pub use text::MemoryTextIndex;
pub use vector::{FlatVectorIndex, FlatVectorStore, VectorHit};

//! Weft Engine — domain synchronization and hybrid retrieval.
//!
//! This crate holds the consistency machinery that keeps a domain's three
//! stores in agreement:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       weft-engine                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DomainRegistry (discovery, lifecycle, operation routing)   │
//! │  └── Domain (per-domain handle, serialized writes)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SyncEngine (watermark replay on load, pipeline on ingest)  │
//! │  IdAllocator (sequential per-domain document ids)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HybridRetriever (text/vector fan-out, RRF fusion)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store handles come in through [`DomainRegistry::new`]; the engine owns
//! no global state.

pub mod domain;
pub mod hybrid;
pub mod ids;
pub mod registry;
pub mod sync;

// Re-exports
pub use domain::Domain;
pub use hybrid::{EmbeddingHit, FusedResult, HybridRetriever, RRF_CONSTANT};
pub use ids::IdAllocator;
pub use registry::{DomainRegistry, SearchMode, SearchResults, DEFAULT_K};
pub use sync::{SyncEngine, SyncReport};

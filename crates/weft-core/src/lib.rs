//! Weft Core — shared types and errors.
//!
//! This crate provides the foundational types used across all Weft crates.
//! It has no internal Weft dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`types`]: Domain identity, configuration, documents, chunk keys

pub mod error;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use types::{ChunkKey, Document, DomainConfig, DomainKey, IndexedDocument};

//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "WEFT_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Weft commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a retrieval domain (idempotent).
    AddDomain {
        /// Domain name.
        #[arg(short, long)]
        domain: String,

        /// Embedding model name.
        #[arg(short, long)]
        model: String,

        /// Chunk window size in words.
        #[arg(long, default_value = "500")]
        chunk_size: usize,

        /// Chunk overlap in words.
        #[arg(long, default_value = "50")]
        overlap: usize,

        /// Embedding dimension (immutable once the domain exists).
        #[arg(long, default_value = "128")]
        embedding_size: usize,
    },

    /// List all known domains.
    ListDomains,

    /// Ingest a document into a domain.
    AddData {
        /// Domain name.
        #[arg(short, long)]
        domain: String,

        /// Embedding model name.
        #[arg(short, long)]
        model: String,

        /// Document text.
        #[arg(short, long)]
        text: String,
    },

    /// Search a domain and print ranked results.
    Query {
        /// Domain name.
        #[arg(short, long)]
        domain: String,

        /// Embedding model name.
        #[arg(short, long)]
        model: String,

        /// Search mode: text, embedding, or hybrid.
        #[arg(long, default_value = "hybrid")]
        mode: String,

        /// The query string.
        query: String,
    },

    /// Print version information.
    Version,
}

// ============================================================================
// Tests
// ============================================================================

//! The Weft CLI application: store wiring, command dispatch, output.

use std::str::FromStr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use weft_core::{DomainConfig, Result};
use weft_embed::OrdinalProvider;
use weft_engine::{DomainRegistry, SearchMode, SearchResults};
use weft_store::{FlatVectorStore, JsonDocumentLog, JsonMetadataStore, MemoryTextIndex};

use crate::cli::{CliArgs, Command};
use crate::config::WeftConfig;

/// The CLI application: configuration plus the registry built from it.
pub struct WeftApp {
    registry: DomainRegistry,
    version: String,
}

impl WeftApp {
    /// Build the application from loaded configuration.
    ///
    /// All store handles are constructed here and injected into the
    /// registry; nothing else in the process holds storage state.
    pub async fn from_config(config: &WeftConfig) -> Result<Self> {
        let log = Arc::new(JsonDocumentLog::new(config.log_dir())?);
        let text = Arc::new(MemoryTextIndex::new());
        let vectors = Arc::new(FlatVectorStore::new(config.vector_dir())?);
        let metadata = Arc::new(JsonMetadataStore::new(config.meta_dir())?);
        let provider = Arc::new(OrdinalProvider);

        let registry = DomainRegistry::new(log, text, vectors, metadata, provider).await?;
        Ok(Self {
            registry,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on the
    /// verbosity flags.
    pub fn init_logging(verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run one CLI command.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        match args.command {
            Some(Command::AddDomain {
                domain,
                model,
                chunk_size,
                overlap,
                embedding_size,
            }) => {
                let config = DomainConfig {
                    chunk_size,
                    overlap,
                    embedding_size,
                };
                self.registry.add_domain(&domain, &model, config).await?;
                println!("Domain {domain} with model {model} added.");
                Ok(())
            }
            Some(Command::ListDomains) => {
                let domains = self.registry.list_domains().await;
                if domains.is_empty() {
                    println!("No domains yet.");
                }
                for key in domains {
                    println!("Domain: {}, Model: {}", key.domain, key.model);
                }
                Ok(())
            }
            Some(Command::AddData {
                domain,
                model,
                text,
            }) => {
                let indexed = self.registry.add_data(&domain, &model, &text).await?;
                println!(
                    "Data added to domain {domain} with model {model} (id {}).",
                    indexed.unique_id
                );
                Ok(())
            }
            Some(Command::Query {
                domain,
                model,
                mode,
                query,
            }) => {
                // Parse the mode before touching any store.
                let mode = SearchMode::from_str(&mode)?;
                let results = self
                    .registry
                    .generate_prompt(&domain, &model, &query, mode)
                    .await?;
                print_results(&results);
                Ok(())
            }
            Some(Command::Version) => {
                println!("weft {}", self.version);
                Ok(())
            }
            None => {
                println!("weft {} — use --help for usage", self.version);
                Ok(())
            }
        }
    }
}

fn print_results(results: &SearchResults) {
    match results {
        SearchResults::Text(docs) => {
            for (rank, doc) in docs.iter().enumerate() {
                println!("{}. [{}] {}", rank + 1, doc.unique_id, doc.document.text);
            }
            if docs.is_empty() {
                println!("No results.");
            }
        }
        SearchResults::Embedding(hits) => {
            for (rank, hit) in hits.iter().enumerate() {
                println!("{}. id {} (distance {:.4})", rank + 1, hit.doc_id, hit.distance);
            }
            if hits.is_empty() {
                println!("No results.");
            }
        }
        SearchResults::Hybrid(fused) => {
            for (rank, result) in fused.iter().enumerate() {
                println!(
                    "{}. [{}] {} (score {:.4}, {})",
                    rank + 1,
                    result.document.unique_id,
                    result.document.document.text,
                    result.score,
                    result.source
                );
            }
            if fused.is_empty() {
                println!("No results.");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

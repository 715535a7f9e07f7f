//! Configuration for the Weft CLI.
//!
//! Loads from TOML files, environment variables, and defaults using the
//! `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `WEFT_CONFIG` environment variable
//! 3. XDG default: `~/.config/weft/config.toml`
//! 4. Built-in defaults

use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use weft_core::{Error, Result};

// ============================================================================
// Configuration structs
// ============================================================================

/// Main CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftConfig {
    /// Storage locations.
    pub storage: StorageConfig,
}

/// Storage directory configuration.
///
/// The three stores live in sibling directories under `data_dir` unless
/// overridden individually: `json/` for document logs, `index/` for vector
/// artifacts, `meta/` for domain metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base data directory.
    pub data_dir: Option<String>,

    /// Document log directory override.
    pub log_dir: Option<String>,

    /// Vector index directory override.
    pub vector_dir: Option<String>,

    /// Domain metadata directory override.
    pub meta_dir: Option<String>,
}

// ============================================================================
// Config loading
// ============================================================================

impl WeftConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("WEFT");
        env_opts.add_section("storage");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG
    /// default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("WEFT_CONFIG") {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir().map(|d| d.join("weft").join("config.toml"))
    }

    /// Base data directory, defaulting to `./storage`.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("storage"))
    }

    /// Directory holding per-domain `<domain>.json` logs.
    pub fn log_dir(&self) -> PathBuf {
        match &self.storage.log_dir {
            Some(p) => PathBuf::from(p),
            None => self.data_dir().join("json"),
        }
    }

    /// Directory holding `<domain>_<model>.index` vector artifacts.
    pub fn vector_dir(&self) -> PathBuf {
        match &self.storage.vector_dir {
            Some(p) => PathBuf::from(p),
            None => self.data_dir().join("index"),
        }
    }

    /// Directory holding `<domain>_<model>.json` domain metadata.
    pub fn meta_dir(&self) -> PathBuf {
        match &self.storage.meta_dir {
            Some(p) => PathBuf::from(p),
            None => self.data_dir().join("meta"),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

//! External configuration sources.
//!
//! Two JSON files drive the engine:
//!
//! - the **chunk strategy config** maps file names (grouped by file class,
//!   `pdf`/`csv`, with a `default` fallback) to a chunking strategy and its
//!   parameters;
//! - the **document profiles** map intent names to retrieval settings
//!   (file allow-list, strategy list, `top_k`, hybrid-rank flag).
//!
//! Both loaders degrade to defaults when the file is missing or malformed:
//! a misconfigured deployment keeps answering with the default behavior
//! instead of failing startup. Profiles are hot-reloadable between requests
//! via [`DocProfiles::load`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::warn;

/// Default sliding-window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default window overlap in characters.
pub const DEFAULT_OVERLAP: usize = 80;

/// Chunking parameters for one file (or the default fallback).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Strategy name: `regular`, `law`, `category`, `column_record`, `page`.
    /// Unknown or absent names fall back to `regular`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Window size for the `regular` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// Window overlap for the `regular` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<usize>,
    /// Column-index mapping for the `column_record` strategy.
    ///
    /// BTreeMap keeps field order deterministic for record construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, usize>>,
}

impl StrategyConfig {
    /// Window size, defaulting to [`DEFAULT_CHUNK_SIZE`].
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Window overlap, defaulting to [`DEFAULT_OVERLAP`].
    pub fn overlap(&self) -> usize {
        self.overlap.unwrap_or(DEFAULT_OVERLAP)
    }
}

/// Per-file chunk strategy configuration.
///
/// JSON shape mirrors the deployment config file:
///
/// ```json
/// {
///   "default": { "strategy": "regular", "chunk_size": 800, "overlap": 80 },
///   "pdf": { "statute.pdf": { "strategy": "law" } },
///   "csv": { "merchants.csv": { "strategy": "column_record", "mapping": { "name": 1 } } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Fallback strategy for files without an explicit entry
    #[serde(default = "ChunkConfig::default_strategy")]
    pub default: StrategyConfig,
    /// Per-file overrides for PDF-class files
    #[serde(default)]
    pub pdf: HashMap<String, StrategyConfig>,
    /// Per-file overrides for CSV-class files
    #[serde(default)]
    pub csv: HashMap<String, StrategyConfig>,
}

impl ChunkConfig {
    fn default_strategy() -> StrategyConfig {
        StrategyConfig {
            strategy: Some("regular".to_string()),
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
            overlap: Some(DEFAULT_OVERLAP),
            mapping: None,
        }
    }

    /// Loads the config from a JSON file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed chunk config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Resolves the strategy for a file name.
    ///
    /// Files ending in `.pdf` look in the `pdf` table, everything else in
    /// `csv`; a missing entry falls back to the default strategy.
    pub fn for_file(&self, file_name: &str) -> StrategyConfig {
        let table = if file_name.to_lowercase().ends_with(".pdf") {
            &self.pdf
        } else {
            &self.csv
        };
        table.get(file_name).cloned().unwrap_or_else(|| self.default.clone())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            default: Self::default_strategy(),
            pdf: HashMap::new(),
            csv: HashMap::new(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// Retrieval settings for one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocProfile {
    /// File allow-list; `None` searches every file
    #[serde(default)]
    pub files: Option<Vec<String>>,
    /// Strategies to search; `None` or empty issues one unfiltered search
    #[serde(default)]
    pub strategies: Option<Vec<String>>,
    /// Number of results to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Whether to apply dense+sparse score fusion before truncation
    #[serde(default)]
    pub use_hybrid_rank: bool,
}

/// Intent-to-profile mapping, loaded from `doc_profiles.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocProfiles {
    /// Profiles keyed by intent name
    #[serde(default)]
    pub intents: HashMap<String, DocProfile>,
}

impl DocProfiles {
    /// Loads profiles from a JSON file.
    ///
    /// Missing or malformed files yield an empty mapping: queries for any
    /// intent then return empty results rather than erroring, per the
    /// configuration-missing policy.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed doc profiles, using empty mapping");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Returns the profile for an intent, if configured.
    pub fn get(&self, intent: &str) -> Option<&DocProfile> {
        self.intents.get(intent)
    }
}

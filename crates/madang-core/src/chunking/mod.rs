//! Strategy-aware document chunking.
//!
//! Converts raw page/file text into an ordered sequence of [`Chunk`]
//! records tagged with the strategy that produced them. Each strategy
//! targets one document shape:
//!
//! - `regular`: fixed-size sliding character window (generic prose)
//! - `law`: hierarchical statute parsing (chapters, sections, articles,
//!   enumerated clauses)
//! - `category`: two-level heading outlines with leaf items and URLs
//! - `column_record`: one record per delimited row (CSV-like data)
//! - `page`: the whole input as a single record
//!
//! Every chunk is self-contained: it can be embedded and retrieved on its
//! own without referring to neighboring chunks. Malformed input degrades
//! gracefully (a marker line with no following content is skipped, never
//! fatal).

mod category;
mod column;
mod law;
mod regular;

pub use category::parse_category;
pub use column::chunk_column_record;
pub use law::parse_law;
pub use regular::chunk_regular;

use crate::config::StrategyConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Strategy-dependent chunk fields.
///
/// `serde_json::Map` keeps keys sorted, so serializing a chunk is
/// deterministic; the dedup fingerprint depends on that.
pub type Fields = serde_json::Map<String, Value>;

/// One retrievable unit of a source document.
///
/// A chunk is a record with a mandatory `strategy` tag plus
/// strategy-dependent fields (`text`, statute citation fields, category
/// headings, or user-mapped columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chunk {
    /// Record fields, including the `strategy` tag
    pub fields: Fields,
}

impl Chunk {
    /// Creates an empty chunk tagged with a strategy.
    pub fn new(strategy: &str) -> Self {
        let mut fields = Fields::new();
        fields.insert("strategy".to_string(), Value::String(strategy.to_string()));
        Self { fields }
    }

    /// Creates a chunk with a strategy tag and a `text` field.
    pub fn with_text(strategy: &str, text: &str) -> Self {
        let mut chunk = Self::new(strategy);
        chunk.set("text", text);
        chunk
    }

    /// Sets a string field.
    pub fn set(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    /// Sets a field to JSON null (used for absent headings/columns).
    pub fn set_null(&mut self, key: &str) {
        self.fields.insert(key.to_string(), Value::Null);
    }

    /// Returns a field as `&str` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns the strategy tag.
    pub fn strategy(&self) -> Option<&str> {
        self.get_str("strategy")
    }
}

/// Chunks raw text according to the configured strategy.
///
/// Dispatch is by strategy name; unknown or absent names fall back to the
/// `regular` sliding window.
pub fn chunk_text(raw_text: &str, config: &StrategyConfig) -> Vec<Chunk> {
    match config.strategy.as_deref() {
        Some("law") => parse_law(raw_text),
        Some("category") => parse_category(raw_text),
        Some("column_record") => chunk_column_record(raw_text, config),
        Some("page") => chunk_page(raw_text),
        _ => chunk_regular(raw_text, config.chunk_size(), config.overlap()),
    }
}

/// Passthrough strategy: the whole input as a single record.
pub fn chunk_page(text: &str) -> Vec<Chunk> {
    vec![Chunk::with_text("page", text)]
}

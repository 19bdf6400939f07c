//! Core engine for strategy-aware document retrieval.
//!
//! The pipeline runs in two phases:
//!
//! **Ingestion**: raw file text is chunked by a per-file strategy
//! ([`chunking`]), each chunk is projected to an embedding string and
//! fingerprinted for dedup, and new chunks are embedded, L2-normalized,
//! and appended to a persistent flat inner-product index with aligned
//! metadata ([`index`]).
//!
//! **Query**: a classified question routes through the intent profile
//! configured for it ([`search`]): dense retrieval with strategy/file
//! post-filters, optional BM25 hybrid re-ranking, or a structured row
//! lookup for merchant queries.
//!
//! Embedding backends are pluggable through [`embedding::Embedder`]; the
//! store is shared across threads as [`index::SharedIndex`] with ingestion
//! taking the write lock and queries reading a consistent snapshot.

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod search;

pub use chunking::{chunk_text, Chunk};
pub use config::{ChunkConfig, DocProfiles};
pub use embedding::Embedder;
pub use error::{EmbeddingError, IndexError, SearchError};
pub use index::{IndexedChunk, SearchHit, SharedIndex, VectorIndex};
pub use search::SearchEngine;

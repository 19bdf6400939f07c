//! Vector indexing and persistence.
//!
//! Three layers:
//!
//! - [`projection`]: decides what text a chunk contributes to its embedding
//! - [`flat`]: the exact inner-product index over normalized vectors
//! - [`store`]: the persistent deduplicated store pairing vectors with
//!   index-aligned metadata

pub mod flat;
pub mod projection;
pub mod store;

pub use flat::FlatIndex;
pub use projection::embedding_text;
pub use store::{IndexedChunk, SearchHit, SharedIndex, VectorIndex, METADATA_FILE, VECTORS_FILE};

//! Query-side retrieval: profile routing and hybrid re-ranking.

pub mod engine;
pub mod ranking;

pub use engine::{SearchEngine, MERCHANT_INTENT};
pub use ranking::{hybrid_rank, W_DENSE, W_SPARSE};

//! Embedding backend abstraction.
//!
//! The engine treats the embedding model as an opaque function from text to
//! fixed-dimension vectors. Production deployments implement [`Embedder`]
//! against a real model (local inference or a remote endpoint); tests and
//! offline runs use the deterministic [`HashingEmbedder`].
//!
//! Vectors are L2-normalized before indexing so that inner-product search
//! approximates cosine similarity.

use crate::error::EmbeddingError;
use sha2::{Digest, Sha256};

/// Trait for embedding backends.
///
/// # Determinism
///
/// Implementations should be deterministic for a fixed model: the dedup
/// fingerprints stored alongside vectors are only meaningful across runs if
/// the same text keeps producing the same embedding.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the index is shared behind a lock
/// and may embed from any thread.
pub trait Embedder: Send + Sync {
    /// Generates one embedding per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// L2-normalizes a vector in place.
///
/// Zero vectors are left untouched to avoid dividing by zero; they score
/// zero against everything under inner-product search, which is the
/// behavior we want for degenerate inputs.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Deterministic feature-hashing embedder for tests and offline use.
///
/// Hashes character trigrams into a fixed number of buckets with a signed
/// contribution per bucket. This is not a semantic model: similar surface
/// forms get similar vectors, which is enough to exercise the index,
/// dedup, and ranking machinery end to end without model weights.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Creates an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Returns the output vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let chars: Vec<char> = text.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        // Window of 3 chars, padded implicitly by short inputs falling
        // through to a single window.
        let window = 3.min(chars.len());
        for gram in chars.windows(window) {
            let gram_str: String = gram.iter().collect();
            let digest = Sha256::digest(gram_str.as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]);
            let idx = (bucket % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hashing_embedder_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let texts = vec!["전통시장 활성화".to_string()];

        let first = embedder.embed(&texts).unwrap();
        let second = embedder.embed(&texts).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].len(), 64);
    }

    #[test]
    fn test_hashing_embedder_distinguishes_texts() {
        let embedder = HashingEmbedder::new(64);
        let vectors = embedder
            .embed(&["market support".to_string(), "statute article".to_string()])
            .unwrap();

        assert_ne!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_hashing_embedder_empty_text() {
        let embedder = HashingEmbedder::new(16);
        let vectors = embedder.embed(&["".to_string()]).unwrap();

        assert!(vectors[0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_batch_order_preserved() {
        let embedder = HashingEmbedder::new(32);
        let a = embedder.embed(&["alpha".to_string()]).unwrap();
        let b = embedder.embed(&["beta".to_string()]).unwrap();
        let batch = embedder
            .embed(&["alpha".to_string(), "beta".to_string()])
            .unwrap();

        assert_eq!(batch[0], a[0]);
        assert_eq!(batch[1], b[0]);
    }
}

//! Persistent deduplicated vector store.
//!
//! Pairs a [`FlatIndex`] with an index-aligned metadata sequence: the
//! vector at row `i` embeds the record at `metadata[i]`. Both artifacts
//! persist together (`vectors.bin` + `metadata.json`) and are written via
//! temp-file rename so a reader never observes one without the other.
//!
//! Records are append-only. Re-ingesting a file is cheap: every chunk is
//! fingerprinted over its file name, batch ordinal, and embedding text, and
//! chunks whose fingerprint is already stored are skipped before any
//! embedding work happens.

use crate::chunking::{Chunk, Fields};
use crate::embedding::{l2_normalize, Embedder};
use crate::error::{EmbeddingError, IndexError};
use crate::index::flat::FlatIndex;
use crate::index::projection::embedding_text;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Binary vector artifact file name.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Metadata artifact file name.
pub const METADATA_FILE: &str = "metadata.json";

/// A chunk as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Monotonic id assigned at ingestion, never reused
    pub id: usize,
    /// Source file the chunk came from
    pub file_name: String,
    /// Dedup fingerprint over file name, batch ordinal, and embedding text
    pub hash: String,
    /// Strategy-dependent chunk fields
    #[serde(flatten)]
    pub fields: Fields,
}

impl IndexedChunk {
    /// Returns a field as `&str` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(serde_json::Value::as_str)
    }

    /// Returns the strategy tag.
    pub fn strategy(&self) -> Option<&str> {
        self.get_str("strategy")
    }
}

/// One search result: a stored record plus its similarity score and the
/// provenance tags describing which search path matched it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matched record
    #[serde(flatten)]
    pub chunk: IndexedChunk,
    /// Similarity score (cosine for dense hits, fused for hybrid)
    pub score: f32,
    /// Provenance tags, filled in by the routing layer
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_by: Vec<String>,
}

/// Thread-shared handle to a [`VectorIndex`].
pub type SharedIndex = Arc<RwLock<VectorIndex>>;

/// The vector store: flat index, aligned metadata, and the embedder that
/// produced the vectors.
pub struct VectorIndex {
    dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    index: Option<FlatIndex>,
    records: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Opens the store at `dir`, loading any persisted artifacts.
    ///
    /// Load failures degrade rather than fail: a missing or unreadable
    /// artifact starts the store empty, and the two artifacts only survive
    /// together. A vector file without matching metadata (or metadata
    /// without its vectors) drops both, keeping position `i` in the index
    /// aligned with record `i`. Queries against a store that never saw an
    /// index build return [`IndexError::Uninitialized`].
    pub fn open<P: AsRef<Path>>(dir: P, embedder: Arc<dyn Embedder>) -> Result<Self, IndexError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let vectors_path = dir.join(VECTORS_FILE);
        let index = if vectors_path.exists() {
            match FlatIndex::load(&vectors_path) {
                Ok(index) => {
                    info!(vectors = index.len(), "vector index loaded");
                    Some(index)
                }
                Err(e) => {
                    warn!(error = %e, "failed to load vector index, starting fresh");
                    None
                }
            }
        } else {
            None
        };

        let metadata_path = dir.join(METADATA_FILE);
        let records: Vec<IndexedChunk> = if metadata_path.exists() {
            match std::fs::read(&metadata_path)
                .map_err(IndexError::from)
                .and_then(|bytes| serde_json::from_slice(&bytes).map_err(IndexError::from))
            {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "failed to load metadata, starting empty");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        // a missing or unreadable vector file counts as zero vectors, so
        // surviving records without their vectors are dropped as well
        let vector_len = index.as_ref().map_or(0, FlatIndex::len);
        let (index, records) = if vector_len != records.len() {
            warn!(
                vectors = vector_len,
                records = records.len(),
                "vector/metadata length mismatch, dropping both"
            );
            (None, Vec::new())
        } else {
            (index, records)
        };

        info!(records = records.len(), "metadata loaded");
        Ok(Self {
            dir,
            embedder,
            index,
            records,
        })
    }

    /// Wraps the store for shared access.
    pub fn into_shared(self) -> SharedIndex {
        Arc::new(RwLock::new(self))
    }

    /// Stored records, index-aligned with the vectors.
    pub fn records(&self) -> &[IndexedChunk] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ingests a batch of chunks from one file. Returns the number of
    /// records actually added after dedup.
    ///
    /// New vectors are embedded, L2-normalized, and appended via a full
    /// index rebuild; both artifacts are then persisted together. A batch
    /// that is entirely duplicate (or empty) is a logged no-op.
    pub fn ingest(&mut self, chunks: &[Chunk], file_name: &str) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            warn!(file_name, "no chunks to ingest");
            return Ok(0);
        }

        let existing: HashSet<&str> = self.records.iter().map(|r| r.hash.as_str()).collect();

        let mut texts = Vec::new();
        let mut new_records = Vec::new();
        let mut skipped = 0usize;

        for (ordinal, chunk) in chunks.iter().enumerate() {
            let text = embedding_text(&chunk.fields);
            let hash = fingerprint(file_name, ordinal, &text);

            if existing.contains(hash.as_str()) {
                skipped += 1;
                continue;
            }

            new_records.push(IndexedChunk {
                id: self.records.len() + new_records.len(),
                file_name: file_name.to_string(),
                hash,
                fields: chunk.fields.clone(),
            });
            texts.push(text);
        }

        if skipped > 0 {
            info!(file_name, skipped, "skipped duplicate chunks");
        }
        if texts.is_empty() {
            info!(file_name, "all chunks duplicate, nothing to ingest");
            return Ok(0);
        }

        let mut vectors = self.embedder.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::BatchMismatch {
                sent: texts.len(),
                got: vectors.len(),
            }
            .into());
        }
        for vector in &mut vectors {
            l2_normalize(vector);
        }

        let dimension = vectors[0].len();
        let mut rebuilt = match &self.index {
            Some(existing_index) if !existing_index.is_empty() => {
                if existing_index.dimension() != dimension {
                    return Err(IndexError::DimensionMismatch {
                        expected: existing_index.dimension(),
                        actual: dimension,
                    });
                }
                existing_index.clone()
            }
            _ => FlatIndex::new(dimension),
        };
        for vector in &vectors {
            rebuilt.add(vector)?;
        }

        self.index = Some(rebuilt);
        let added = new_records.len();
        self.records.extend(new_records);
        self.persist()?;

        info!(
            file_name,
            added,
            total = self.records.len(),
            "ingested chunks"
        );
        Ok(added)
    }

    /// Dense search with post-filters.
    ///
    /// Oversamples three times `top_k` candidates from the index, then
    /// walks them in score order applying the strategy and file filters.
    /// The walk stops as soon as `top_k` results are collected, so heavily
    /// filtered queries can return fewer than `top_k` results even when
    /// more matches exist beyond the oversampled window.
    pub fn search(
        &self,
        query: &str,
        top_k: usize,
        strategy_filter: Option<&str>,
        file_filter: Option<&[String]>,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let index = self.index.as_ref().ok_or(IndexError::Uninitialized)?;

        let mut query_vectors = self.embedder.embed(&[query.to_string()])?;
        let mut query_vector = query_vectors
            .pop()
            .ok_or(EmbeddingError::BatchMismatch { sent: 1, got: 0 })?;
        l2_normalize(&mut query_vector);

        let candidates = index.search(&query_vector, top_k * 3)?;

        let mut hits = Vec::new();
        for (row, score) in candidates {
            if let Some(record) = self.records.get(row) {
                let strategy_ok = strategy_filter
                    .map(|s| record.strategy() == Some(s))
                    .unwrap_or(true);
                let file_ok = file_filter
                    .map(|files| files.iter().any(|f| f == &record.file_name))
                    .unwrap_or(true);

                if strategy_ok && file_ok {
                    hits.push(SearchHit {
                        chunk: record.clone(),
                        score,
                        matched_by: Vec::new(),
                    });
                }
            }

            if hits.len() >= top_k {
                break;
            }
        }

        Ok(hits)
    }

    /// Writes both artifacts, each through a temp file renamed into place.
    fn persist(&self) -> Result<(), IndexError> {
        if let Some(index) = &self.index {
            let tmp = self.dir.join(format!("{VECTORS_FILE}.tmp"));
            index.save(&tmp)?;
            std::fs::rename(&tmp, self.dir.join(VECTORS_FILE))?;
        }

        let tmp = self.dir.join(format!("{METADATA_FILE}.tmp"));
        let json = serde_json::to_vec_pretty(&self.records)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.dir.join(METADATA_FILE))?;
        Ok(())
    }
}

/// Content fingerprint for dedup: SHA-256 over file name, batch ordinal,
/// and the text that would be embedded.
fn fingerprint(file_name: &str, ordinal: usize, embed_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{file_name}-{ordinal}-{embed_text}").as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

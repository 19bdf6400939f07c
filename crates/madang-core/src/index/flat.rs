//! Flat inner-product vector index.

use crate::error::{validate_dimension, IndexError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"MDNG";
const FORMAT_VERSION: u32 = 1;

/// Largest element count a header may claim (8 GiB of f32 payload).
const MAX_TOTAL_ELEMS: usize = 1 << 31;

/// Upper bound on up-front element preallocation when reading.
const MAX_PREALLOC_ELEMS: usize = 1 << 22;

/// Exact-search index over row-major L2-normalized vectors.
///
/// Every query scores against every stored vector, so search is exact by
/// construction and results depend only on the stored set, never on build
/// order or tuning parameters. Inner product over normalized vectors equals
/// cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Creates an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Appends a vector at the next row position.
    pub fn add(&mut self, vector: &[f32]) -> Result<(), IndexError> {
        validate_dimension(self.dimension, vector.len())?;
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    /// Returns up to `k` row indices with scores, highest inner product
    /// first. Equal scores keep row order, so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        validate_dimension(self.dimension, query.len())?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| {
                let score: f32 = vector.iter().zip(query).map(|(a, b)| a * b).sum();
                (row, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// Writes the index in the binary vector format.
    ///
    /// Layout: 4-byte magic, format version, dimension, vector count (all
    /// `u32` little-endian), then the row-major `f32` payload.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), IndexError> {
        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&(self.dimension as u32).to_le_bytes())?;
        writer.write_all(&(self.len() as u32).to_le_bytes())?;
        for value in &self.vectors {
            writer.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    /// Reads an index previously written by [`FlatIndex::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, IndexError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(IndexError::Corrupt("bad magic bytes".to_string()));
        }

        let version = read_u32(reader)?;
        if version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported vector format version {version}"
            )));
        }

        let dimension = read_u32(reader)? as usize;
        let count = read_u32(reader)? as usize;

        // header values come from an untrusted file; an implausible
        // element count must fail as corrupt, not abort the process
        let total = count
            .checked_mul(dimension)
            .filter(|&t| t <= MAX_TOTAL_ELEMS)
            .ok_or_else(|| {
                IndexError::Corrupt(format!(
                    "implausible vector header: {count} vectors x {dimension} dims"
                ))
            })?;

        // cap the preallocation so an oversized count runs into
        // UnexpectedEof instead of exhausting memory
        let mut vectors = Vec::with_capacity(total.min(MAX_PREALLOC_ELEMS));
        let mut buf = [0u8; 4];
        for _ in 0..total {
            reader.read_exact(&mut buf)?;
            vectors.push(f32::from_le_bytes(buf));
        }

        Ok(Self { dimension, vectors })
    }

    /// Saves to a file, replacing any existing index.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, IndexError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_inner_product() {
        let mut index = FlatIndex::new(2);
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();
        index.add(&[0.7, 0.7]).unwrap();

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 2);
        assert_eq!(hits[2].0, 1);
    }

    #[test]
    fn test_search_ties_keep_row_order() {
        let mut index = FlatIndex::new(2);
        index.add(&[0.5, 0.5]).unwrap();
        index.add(&[0.5, 0.5]).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let mut index = FlatIndex::new(1);
        for i in 0..10 {
            index.add(&[i as f32]).unwrap();
        }

        let hits = index.search(&[1.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 9);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut index = FlatIndex::new(4);
        assert!(matches!(
            index.add(&[1.0, 2.0]),
            Err(IndexError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");

        let mut index = FlatIndex::new(3);
        index.add(&[0.1, 0.2, 0.3]).unwrap();
        index.add(&[0.4, 0.5, 0.6]).unwrap();
        index.save(&path).unwrap();

        let loaded = FlatIndex::load(&path).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 3);
    }

    fn header_bytes(dimension: u32, count: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&dimension.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn test_load_rejects_overflowing_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        std::fs::write(&path, header_bytes(u32::MAX, u32::MAX)).unwrap();

        assert!(matches!(
            FlatIndex::load(&path),
            Err(IndexError::Corrupt(_))
        ));
    }

    #[test]
    fn test_load_rejects_oversized_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        // plausible dimension, absurd count, no payload behind it
        std::fs::write(&path, header_bytes(1024, u32::MAX)).unwrap();

        assert!(matches!(
            FlatIndex::load(&path),
            Err(IndexError::Corrupt(_))
        ));
    }

    #[test]
    fn test_load_inflated_count_errors_without_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        // claims more elements than the preallocation cap but fewer than
        // the plausibility bound; the short payload must fail cheaply
        std::fs::write(&path, header_bytes(64, 1 << 20)).unwrap();

        assert!(matches!(FlatIndex::load(&path), Err(IndexError::Io(_))));
    }

    #[test]
    fn test_load_truncated_payload_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        let mut bytes = header_bytes(3, 2);
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(FlatIndex::load(&path), Err(IndexError::Io(_))));
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00").unwrap();

        assert!(matches!(
            FlatIndex::load(&path),
            Err(IndexError::Corrupt(_))
        ));
    }
}

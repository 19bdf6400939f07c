//! Path resolution for the CLI.
//!
//! The engine keeps three artifacts under one data directory: the vector
//! store (`db/`), the chunk strategy config, and the document profiles.
//! The directory resolves to the platform standard location unless
//! overridden with `--data-dir`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Chunk strategy config file name.
pub const CHUNK_CONFIG_FILENAME: &str = "chunk_config.json";

/// Document profiles file name.
pub const PROFILES_FILENAME: &str = "doc_profiles.json";

/// Subdirectory holding the vector store artifacts.
pub const DB_DIRNAME: &str = "db";

/// Embedding dimension for the built-in hashing embedder.
pub const EMBEDDING_DIMENSION: usize = 256;

/// Resolves the data directory, creating it if needed.
pub fn resolve_data_dir(custom: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match custom {
        Some(dir) => dir,
        None => ProjectDirs::from("", "", "madang")
            .context("could not determine platform data directory")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

/// Vector store directory under the data directory.
pub fn db_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_DIRNAME)
}

/// Chunk config path: an explicit override, or the file in the data
/// directory.
pub fn chunk_config_path(data_dir: &Path, custom: Option<PathBuf>) -> PathBuf {
    custom.unwrap_or_else(|| data_dir.join(CHUNK_CONFIG_FILENAME))
}

/// Profiles path: an explicit override, or the file in the data directory.
pub fn profiles_path(data_dir: &Path, custom: Option<PathBuf>) -> PathBuf {
    custom.unwrap_or_else(|| data_dir.join(PROFILES_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_data_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("nested/data");

        let resolved = resolve_data_dir(Some(custom.clone())).unwrap();
        assert_eq!(resolved, custom);
        assert!(custom.is_dir());
    }

    #[test]
    fn test_path_overrides_win() {
        let data_dir = Path::new("/data");
        let custom = PathBuf::from("/elsewhere/profiles.json");

        assert_eq!(profiles_path(data_dir, Some(custom.clone())), custom);
        assert_eq!(
            profiles_path(data_dir, None),
            Path::new("/data").join(PROFILES_FILENAME)
        );
        assert_eq!(
            chunk_config_path(data_dir, None),
            Path::new("/data").join(CHUNK_CONFIG_FILENAME)
        );
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Document store failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A rooted note store (an Obsidian vault directory, or any folder).
///
/// Paths passed to the vault are relative to its root.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Create a folder (and its parents). Creating an existing folder is a
    /// no-op.
    pub fn ensure_folder(&self, relative: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = self.resolve(relative);
        fs::create_dir_all(&path).map_err(|source| StorageError::CreateFolder {
            path: path.clone(),
            source,
        })
    }

    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.resolve(relative).exists()
    }

    /// Write a new note file
    pub fn create_note(
        &self,
        relative: impl AsRef<Path>,
        content: &str,
    ) -> Result<PathBuf, StorageError> {
        let path = self.resolve(relative);
        fs::write(&path, content).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        info!("Created note: {}", path.display());
        Ok(path)
    }

    pub fn delete(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).map_err(|source| StorageError::Delete {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Deleted note: {}", path.display());
        Ok(())
    }
}

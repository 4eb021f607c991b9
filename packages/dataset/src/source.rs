//! Byte sources a dataset can be read from.

use std::path::{Path, PathBuf};

use crate::DatasetError;

/// Something that yields the raw bytes of a CSV export.
pub trait DatasetSource {
    /// Human-readable identifier used in log lines (e.g. a path).
    fn id(&self) -> String;

    /// Reads the full contents.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the bytes cannot be read.
    fn read(&self) -> Result<Vec<u8>, DatasetError>;
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileSource {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<u8>, DatasetError> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// CSV bytes held in memory (fixtures, piped input).
#[derive(Debug, Clone)]
pub struct InMemorySource {
    id: String,
    bytes: Vec<u8>,
}

impl InMemorySource {
    /// Creates a source over `bytes`.
    #[must_use]
    pub fn new(id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            bytes: bytes.into(),
        }
    }
}

impl DatasetSource for InMemorySource {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn read(&self) -> Result<Vec<u8>, DatasetError> {
        Ok(self.bytes.clone())
    }
}

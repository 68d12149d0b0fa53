//! Document file source.

use super::parse_document;
use crate::model::error::InputError;
use crate::model::SourceNode;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A source document on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for `path`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the file cannot be opened and
    /// `InputError::Parse` for malformed content.
    pub fn load(self) -> Result<SourceNode, InputError> {
        let file = File::open(&self.path)?;
        parse_document(BufReader::new(file))
    }
}

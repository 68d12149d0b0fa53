//! Source document input.
//!
//! The diagram is fed one JSON document: the root [`SourceNode`] with its
//! nested `children`. It is read from a file when a path is given, otherwise
//! from piped stdin.
//!
//! - `file`: FileSource - document on disk
//! - `stdin`: StdinSource - document piped to the process

use crate::model::error::InputError;
use crate::model::SourceNode;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Where the source document comes from.
///
/// Sum type enforces exactly one variant.
#[derive(Debug)]
pub enum InputSource {
    /// Document file.
    File(FileSource),
    /// Piped stdin.
    Stdin(StdinSource<std::io::Stdin>),
}

impl InputSource {
    /// Read and parse the whole document.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for read failures and `InputError::Parse`
    /// when the document is not a source tree.
    pub fn load(self) -> Result<SourceNode, InputError> {
        match self {
            InputSource::File(file) => file.load(),
            InputSource::Stdin(stdin) => stdin.load(),
        }
    }
}

/// Detect the input source.
///
/// # Logic:
/// 1. If a file path is provided: FileSource
/// 2. Else if stdin is piped: StdinSource
/// 3. Else: `InputError::NoInput`
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist and
/// `InputError::NoInput` if no file is given and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}

/// Detect the input source and load the document from it.
///
/// # Errors
///
/// See [`detect_input_source`] and [`InputSource::load`].
pub fn load_document(file: Option<PathBuf>) -> Result<SourceNode, InputError> {
    detect_input_source(file)?.load()
}

/// Parse a source document from any reader.
///
/// # Errors
///
/// Returns `InputError::Parse` for malformed JSON or a missing/empty `id`.
pub fn parse_document<R: Read>(reader: R) -> Result<SourceNode, InputError> {
    let root: SourceNode = serde_json::from_reader(reader)?;
    debug!(root = %root.id, nodes = root.subtree_len(), "source document parsed");
    Ok(root)
}

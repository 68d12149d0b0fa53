//! Piped stdin source.

use super::parse_document;
use crate::model::error::InputError;
use crate::model::SourceNode;
use std::io::{BufReader, IsTerminal, Read};

/// A source document piped to the process.
///
/// Detects TTY vs piped input at construction so the viewer never blocks
/// waiting for keyboard input the user did not mean to type.
#[derive(Debug)]
pub struct StdinSource<R: Read> {
    reader: R,
}

impl StdinSource<std::io::Stdin> {
    /// Create a source reading the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is a TTY (interactive terminal).
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self { reader: stdin })
    }
}

impl<R: Read> StdinSource<R> {
    /// Create a source from any reader, bypassing the TTY check.
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Read to EOF and parse the document.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for read failures and `InputError::Parse`
    /// for malformed content.
    pub fn load(self) -> Result<SourceNode, InputError> {
        parse_document(BufReader::new(self.reader))
    }
}

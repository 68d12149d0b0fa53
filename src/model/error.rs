//! Error types for topoview.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`ViewError`] - invariant violations inside the view engine
//!   - `Config`: a required configuration value (e.g. the font spec) is missing
//!   - `MissingElement`: a rendering fixture was used before `setup()` created it
//! - [`InputError`] - source document loading failures (file, stdin, JSON)
//!
//! # Recovery Strategy
//!
//! `ViewError` is never caught inside the engine: it signals a programming
//! error at the call site and propagates to the caller. Lookups of optional
//! node decorations (headers, badges, markers) never error; a miss yields a
//! neutral value so rendering survives incomplete node metadata. Nothing in
//! the engine performs I/O, so there is no retry policy.

use std::path::PathBuf;
use thiserror::Error;

/// Invariant violations raised by the view engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// A required configuration value is absent.
    ///
    /// Raised when text has to be measured without a font spec. Fails fast:
    /// the layout cannot be computed without it.
    #[error("Missing configuration: {0}")]
    Config(&'static str),

    /// A rendering fixture expected to exist is absent.
    ///
    /// Raised when the minimap is computed for loaded content before
    /// `setup()` created the overlay fixtures.
    #[error("Missing render element: {0}")]
    MissingElement(&'static str),
}

/// Errors encountered when loading the source document.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified document does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use topoview::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// No file was given and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe a document to stdin")]
    NoInput,

    /// Generic I/O failure while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a valid source tree.
    #[error("Invalid source document: {0}")]
    Parse(#[from] serde_json::Error),
}

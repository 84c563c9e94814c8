//! Error types for the pdfslice library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfslice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or querying a layout tree.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files or talking to the conversion tool.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Neither a source path nor raw XML bytes were supplied.
    #[error("No PDF path or XML input given")]
    NoInput,

    /// The external conversion tool failed.
    #[error("PDF conversion failed: {0}")]
    Convert(String),

    /// The XML layout tree is malformed.
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// A user-supplied regular expression failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A structural node query could not be parsed.
    #[error("Invalid node query: {0}")]
    Query(String),

    /// A font id was not declared by any fontspec in the tree.
    #[error("Unknown font id: {0}")]
    UnknownFont(String),
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

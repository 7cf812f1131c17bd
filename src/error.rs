//! Error types for boxnote-html library.

use std::io;
use thiserror::Error;

/// Result type alias for boxnote-html operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during note conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The payload is not a structurally valid note: unparseable JSON,
    /// a missing `doc` or `doc.content` field, or a node without `type`.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// An image attachment could not be turned into markup.
    ///
    /// Raised by resolvers only; the renderer contains it to the image node.
    #[error("Image resolution failed: {0}")]
    ImageResolution(String),

    /// Error filling template placeholders.
    #[error("Template error: {0}")]
    Template(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedDocument(err.to_string())
    }
}

impl Error {
    /// Check if this error aborts conversion of the whole document.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedDocument(_))
    }
}

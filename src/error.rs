//! Error types for atspdf library.

use std::io;
use thiserror::Error;

use crate::model::ObjectId;

/// Result type alias for atspdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used by callers to pick a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unsupported input. User-correctable, never retried.
    Input,
    /// I/O failure reading or writing. The caller may retry once.
    Resource,
    /// Internal inconsistency in a document built by the caller.
    Logic,
    /// The operation was cancelled between page boundaries.
    Cancelled,
}

/// Error types that can occur during PDF processing and scoring.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The `%PDF-x.y` header is missing or unreadable.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// The cross-reference chain could not be followed.
    #[error("Corrupt cross-reference: {0}")]
    CorruptCrossReference(String),

    /// The document is encrypted.
    #[error("Encrypted documents are not supported")]
    UnsupportedEncryption,

    /// A stream ends before its declared length or lacks `endstream`.
    #[error("Truncated stream in object {} {}", .0.0, .0.1)]
    TruncatedStream(ObjectId),

    /// A stream uses a filter this crate cannot decode.
    #[error("Unsupported stream filter: {0}")]
    UnsupportedFilter(String),

    /// Stream data is corrupt for its declared filter.
    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    /// lopdf rejected the object syntax.
    #[error("PDF parse error: {0}")]
    PdfParse(String),

    /// A required document structure is absent (catalog, page tree).
    #[error("Missing required object: {0}")]
    MissingObject(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A reference points at an object the document does not contain.
    #[error("Dangling reference to object {} {}", .0.0, .0.1)]
    DanglingReference(ObjectId),

    /// Taxonomy category lookup failed.
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Taxonomy data could not be loaded.
    #[error("Invalid taxonomy: {0}")]
    Taxonomy(String),

    /// A result could not be rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// Processing was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Resource,
            Error::DanglingReference(_) | Error::Render(_) => ErrorKind::Logic,
            Error::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Input,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::UnsupportedEncryption,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Taxonomy(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedEncryption;
        assert_eq!(err.to_string(), "Encrypted documents are not supported");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::TruncatedStream((7, 0));
        assert_eq!(err.to_string(), "Truncated stream in object 7 0");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_lopdf_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(Error::from(lopdf::Error::IO(io_err)), Error::Io(_)));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::UnsupportedFilter("LZWDecode".into()).kind(), ErrorKind::Input);
        assert_eq!(Error::MalformedHeader("x".into()).kind(), ErrorKind::Input);
        assert_eq!(Error::DanglingReference((3, 0)).kind(), ErrorKind::Logic);
        assert_eq!(Error::PdfParse("bad dictionary".into()).kind(), ErrorKind::Input);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }
}

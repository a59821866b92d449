//! PDF parsing module.

pub mod filters;
mod options;
mod pdf_parser;
pub(crate) mod scan;
pub mod xref;

pub use options::{ErrorMode, ParseOptions, DEFAULT_MAX_REVISIONS};
pub use pdf_parser::PdfParser;

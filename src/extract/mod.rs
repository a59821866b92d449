//! Plain text extraction with optional removal of invisible runs.

mod cmap;
pub mod encoding;
mod extractor;
mod font;
mod options;

pub use cmap::ToUnicodeMap;
pub use extractor::{join_pages, PageText, TextExtractor, TextRun};
pub use font::FontDecoder;
pub use options::{ExtractOptions, DEFAULT_MIN_FONT_SIZE, DEFAULT_TOLERANCE};

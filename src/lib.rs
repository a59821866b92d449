//! # atspdf
//!
//! Invisible keyword embedding and applicant-tracking-system scoring for PDF
//! documents.
//!
//! The library reads PDF files (classic and stream cross-references,
//! incremental revisions, FlateDecode content), appends an imperceptible
//! keyword layer to every page, extracts text with or without such layers,
//! and scores the result against a reference keyword set.
//!
//! ## Quick Start
//!
//! ```no_run
//! use atspdf::{analyze_file, modify_file, KeywordSet};
//!
//! fn main() -> atspdf::Result<()> {
//!     let keywords = KeywordSet::parse("Kubernetes, Terraform");
//!
//!     // Append an invisible layer to each page, publishing atomically
//!     modify_file("resume.pdf", "resume-ats.pdf", &keywords)?;
//!
//!     let result = analyze_file("resume-ats.pdf", &keywords)?;
//!     println!("{}/100 ({})", result.score.overall, result.score.grade);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Incremental output**: modified files keep their original bytes and
//!   gain one appended revision
//! - **Visibility-aware extraction**: runs drawn in the background color, at
//!   sub-legible sizes or in render mode 3 can be excluded
//! - **Deterministic scoring**: identical inputs give identical results
//! - **Keyword taxonomy**: a built-in category store with search and merge
//! - **Parallel batch analysis**: uses Rayon across independent files

pub mod ats;
pub mod compose;
pub mod detect;
pub mod embed;
pub mod error;
pub mod extract;
pub mod io;
pub mod keywords;
pub mod model;
pub mod parser;
pub mod render;
pub mod taxonomy;
pub mod writer;

// Re-export commonly used types
pub use ats::{AnalysisInput, AtsAnalysisResult, AtsAnalyzer, AtsScore, Grade, ScoringOptions};
pub use compose::{ComposeOptions, DocumentComposer};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use embed::{CancelFlag, InvisibleStyle, KeywordEmbedder};
pub use error::{Error, ErrorKind, Result};
pub use extract::{ExtractOptions, PageText, TextExtractor, TextRun};
pub use keywords::{Keyword, KeywordSet, KeywordSource, KeywordTier};
pub use model::{Color, Document, Metadata, Page, PageSize};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::JsonFormat;
pub use taxonomy::{TaxonomyEntry, TaxonomyStore};
pub use writer::SaveMode;

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::extract::join_pages;

/// Parse a PDF file.
///
/// # Example
///
/// ```no_run
/// use atspdf::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count().unwrap());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use atspdf::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Author a new PDF with `text` as visible lines and `keywords` as an
/// invisible layer on every page.
///
/// # Example
///
/// ```no_run
/// use atspdf::{create_bytes, KeywordSet};
///
/// let pdf = create_bytes("Jane Doe\nSoftware Engineer", &KeywordSet::parse("SQL Java")).unwrap();
/// std::fs::write("resume.pdf", pdf).unwrap();
/// ```
pub fn create_bytes(text: &str, keywords: &KeywordSet) -> Result<Vec<u8>> {
    AtsPdf::new().create(text, keywords)
}

/// Append an invisible keyword layer to every page of an existing PDF.
pub fn modify_bytes(data: &[u8], keywords: &KeywordSet) -> Result<Vec<u8>> {
    AtsPdf::new().modify(data, keywords)
}

/// Modify `input` and atomically publish the result at `output`.
///
/// Returns the number of pages that received a layer.
pub fn modify_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    keywords: &KeywordSet,
) -> Result<usize> {
    AtsPdf::new().modify_file(input, output, keywords)
}

/// Extract text from PDF bytes.
pub fn extract_text_bytes(data: &[u8], options: ExtractOptions) -> Result<String> {
    let doc = parse_bytes(data)?;
    TextExtractor::new(&doc, options).extract()
}

/// Extract plain text from a PDF file, invisible runs included.
///
/// # Example
///
/// ```no_run
/// use atspdf::extract_text;
///
/// let text = extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    TextExtractor::new(&doc, ExtractOptions::default()).extract()
}

/// Score PDF bytes against `reference`.
pub fn analyze_bytes(data: &[u8], reference: &KeywordSet) -> Result<AtsAnalysisResult> {
    AtsPdf::new().analyze(data, reference)
}

/// Score a PDF file against `reference`.
pub fn analyze_file<P: AsRef<Path>>(path: P, reference: &KeywordSet) -> Result<AtsAnalysisResult> {
    AtsPdf::new().analyze_file(path, reference)
}

/// Builder that carries every option through create, modify and analyze.
///
/// # Example
///
/// ```no_run
/// use atspdf::{AtsPdf, ExtractOptions, KeywordSet};
///
/// let result = AtsPdf::new()
///     .lenient()
///     .with_extract_options(ExtractOptions::new().with_tolerance(5.0))
///     .analyze_file("resume.pdf", &KeywordSet::parse("Rust, Go"))?;
/// # Ok::<(), atspdf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct AtsPdf {
    parse_options: ParseOptions,
    compose_options: ComposeOptions,
    style: InvisibleStyle,
    extract_options: ExtractOptions,
    scoring_options: ScoringOptions,
    cancel: Option<CancelFlag>,
}

impl AtsPdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    pub fn with_compose_options(mut self, options: ComposeOptions) -> Self {
        self.compose_options = options;
        self
    }

    /// Appearance of the embedded keyword layer.
    pub fn with_style(mut self, style: InvisibleStyle) -> Self {
        self.style = style;
        self
    }

    /// Visibility settings for analysis; the line and exclusion flags are
    /// chosen by [`AtsPdf::analyze`] itself.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    pub fn with_scoring_options(mut self, options: ScoringOptions) -> Self {
        self.scoring_options = options;
        self
    }

    /// Checked between pages while embedding.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Author a new document and return its bytes.
    pub fn create(&self, text: &str, keywords: &KeywordSet) -> Result<Vec<u8>> {
        let mut composer = DocumentComposer::new(self.compose_options.clone());
        composer.add_text(text);
        let mut doc = composer.compose()?;

        KeywordEmbedder::new(self.style.clone()).embed_all(&mut doc, keywords, self.cancel.as_ref())?;
        let bytes = writer::write_full(&doc)?;

        log::info!(
            "created document: {} line(s), {} keyword(s), {} bytes",
            composer.line_count(),
            keywords.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Append a keyword layer to every page as a new revision.
    ///
    /// With an empty keyword set the input is returned unchanged.
    pub fn modify(&self, data: &[u8], keywords: &KeywordSet) -> Result<Vec<u8>> {
        self.modify_counted(data, keywords).map(|(bytes, _)| bytes)
    }

    /// Output bytes and the number of pages that received a layer.
    fn modify_counted(&self, data: &[u8], keywords: &KeywordSet) -> Result<(Vec<u8>, usize)> {
        let mut doc = parse_bytes_with_options(data, self.parse_options.clone())?;
        let embedder = KeywordEmbedder::new(self.style.clone());
        let pages = embedder.embed_all(&mut doc, keywords, self.cancel.as_ref())?;
        if pages == 0 {
            return Ok((data.to_vec(), 0));
        }

        let bytes = writer::save(&doc, SaveMode::Auto)?;
        log::info!(
            "modified document: {} page(s), {} -> {} bytes",
            pages,
            data.len(),
            bytes.len()
        );
        Ok((bytes, pages))
    }

    /// Modify `input` and atomically publish the result at `output`.
    pub fn modify_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        keywords: &KeywordSet,
    ) -> Result<usize> {
        let data = std::fs::read(input)?;
        let (bytes, pages) = self.modify_counted(&data, keywords)?;
        io::write_atomic(output, &bytes)?;
        Ok(pages)
    }

    /// Score PDF bytes against `reference`.
    pub fn analyze(&self, data: &[u8], reference: &KeywordSet) -> Result<AtsAnalysisResult> {
        self.analyze_at(data, reference, Utc::now())
    }

    /// Score PDF bytes with an explicit timestamp.
    pub fn analyze_at(
        &self,
        data: &[u8],
        reference: &KeywordSet,
        analyzed_at: DateTime<Utc>,
    ) -> Result<AtsAnalysisResult> {
        let doc = parse_bytes_with_options(data, self.parse_options.clone())?;
        let input = self.analysis_input(&doc)?;
        let analyzer = AtsAnalyzer::new(self.scoring_options.clone());
        Ok(analyzer.analyze_at(&input, reference, analyzed_at))
    }

    /// Score a PDF file against `reference`.
    pub fn analyze_file<P: AsRef<Path>>(
        &self,
        path: P,
        reference: &KeywordSet,
    ) -> Result<AtsAnalysisResult> {
        let data = std::fs::read(path)?;
        self.analyze(&data, reference)
    }

    /// Score many files in parallel. Results are in input order.
    pub fn analyze_files<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        reference: &KeywordSet,
    ) -> Vec<(PathBuf, Result<AtsAnalysisResult>)> {
        self.analyze_files_with(paths, reference, |_| {})
    }

    /// Like [`AtsPdf::analyze_files`], calling `on_done` as each file finishes.
    pub fn analyze_files_with<P, F>(
        &self,
        paths: &[P],
        reference: &KeywordSet,
        on_done: F,
    ) -> Vec<(PathBuf, Result<AtsAnalysisResult>)>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&Path) + Sync,
    {
        paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.analyze_file(path, reference);
                if let Err(e) = &result {
                    log::warn!("failed to analyze {}: {}", path.display(), e);
                }
                on_done(path);
                (path.to_path_buf(), result)
            })
            .collect()
    }

    /// Line-preserving full and visible text from one extraction pass.
    fn analysis_input(&self, doc: &Document) -> Result<AnalysisInput> {
        let full = self
            .extract_options
            .clone()
            .excluding_invisible(false)
            .preserving_lines(true);
        let visible = full.clone().excluding_invisible(true);

        let pages = TextExtractor::new(doc, full.clone()).extract_pages()?;
        Ok(AnalysisInput::new(
            join_pages(&pages, &full),
            join_pages(&pages, &visible),
        ))
    }
}

//! PDF document parser.
//!
//! The cross-reference chain is walked here, newest revision first, with a
//! revision cap and a cycle guard. lopdf then loads the object bodies, and
//! the result is reconciled against the merged cross-reference table so
//! that the newest entry for every object number is the one that counts.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::value::{entry, integer};
use crate::model::{Dictionary, Document, Object, Revision};

use super::options::{ErrorMode, ParseOptions};
use super::scan::find_bytes;
use super::xref::{self, is_chain_key, XrefEntry, XrefSection};

/// PDF document parser.
///
/// Resolves the cross-reference chain of every revision and keeps each
/// object's newest definition.
///
/// # Example
/// ```no_run
/// use atspdf::parser::PdfParser;
///
/// let doc = PdfParser::open("resume.pdf")?.parse()?;
/// println!("{} pages", doc.page_count()?);
/// # Ok::<(), atspdf::Error>(())
/// ```
pub struct PdfParser {
    data: Vec<u8>,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Ok(Self { data, options })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        Ok(Self {
            data: data.to_vec(),
            options,
        })
    }

    /// Take ownership of a byte buffer.
    pub fn from_vec(data: Vec<u8>, options: ParseOptions) -> Self {
        Self { data, options }
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { data, options })
    }

    /// Parse the bytes into a [`Document`].
    pub fn parse(&self) -> Result<Document> {
        let data = self.data.as_slice();
        let format = detect_format_from_bytes(data)?;
        if format.header_offset > 0 {
            log::debug!("header found at offset {}", format.header_offset);
        }

        let startxref = xref::find_startxref(data)?;
        let sections = xref::read_chain(data, startxref, self.options.max_revisions)?;
        let (entries, trailer) = xref::merge(&sections);

        if trailer.has(b"Encrypt") {
            return Err(Error::UnsupportedEncryption);
        }
        if !trailer.has(b"Root") {
            return Err(Error::CorruptCrossReference("trailer has no /Root".into()));
        }

        let mut inner = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::UnsupportedEncryption,
            _ => Error::from(e),
        })?;
        self.reconcile(&mut inner, &entries, &sections)?;
        inner.trailer = final_trailer(&inner.trailer, &trailer);

        log::debug!(
            "parsed {} objects from {} cross-reference section(s)",
            inner.objects.len(),
            sections.len()
        );

        Ok(Document::from_parts(
            inner,
            revisions(&sections),
            self.data.clone(),
            format.header_offset,
        ))
    }

    /// Header version without parsing the body.
    pub fn version(&self) -> Result<String> {
        Ok(detect_format_from_bytes(&self.data)?.version)
    }

    /// Make the loaded object table agree with the merged cross-reference
    /// entries: freed numbers and stale generations are dropped, and objects
    /// the table names but lopdf could not load are reported.
    fn reconcile(
        &self,
        inner: &mut LopdfDocument,
        entries: &BTreeMap<u32, XrefEntry>,
        sections: &[XrefSection],
    ) -> Result<()> {
        let wanted: BTreeMap<u32, u16> = entries
            .iter()
            .filter_map(|(&number, entry)| match *entry {
                XrefEntry::Free => None,
                XrefEntry::InUse { generation, .. } => Some((number, generation)),
                XrefEntry::Compressed { .. } => Some((number, 0)),
            })
            .collect();

        let before = inner.objects.len();
        inner
            .objects
            .retain(|(number, generation), _| match wanted.get(number) {
                Some(g) => g == generation,
                None => !entries.contains_key(number),
            });
        if inner.objects.len() < before {
            log::debug!(
                "dropped {} object(s) shadowed by newer cross-reference entries",
                before - inner.objects.len()
            );
        }

        // Object stream containers and xref streams may be consumed by the
        // loader; their absence is expected.
        let mut structural: HashSet<u32> = entries
            .values()
            .filter_map(|entry| match entry {
                XrefEntry::Compressed { container, .. } => Some(*container),
                _ => None,
            })
            .collect();
        let stream_offsets: HashSet<usize> = sections
            .iter()
            .filter(|s| s.is_stream)
            .map(|s| s.offset)
            .collect();

        for (&number, &generation) in &wanted {
            let id = (number, generation);
            if inner.objects.contains_key(&id) || structural.contains(&number) {
                continue;
            }
            let offset = match entries.get(&number) {
                Some(XrefEntry::InUse { offset, .. }) => Some(*offset),
                _ => None,
            };
            if offset.is_some_and(|o| stream_offsets.contains(&o)) {
                structural.insert(number);
                continue;
            }
            let err = match offset {
                Some(o) if is_truncated_stream(&self.data, o) => Error::TruncatedStream(id),
                Some(o) => Error::PdfParse(format!(
                    "object {} {} at offset {} could not be read",
                    number, generation, o
                )),
                None => Error::MissingObject(format!("compressed object {} {}", number, generation)),
            };
            self.recover(err, number)?;
        }
        inner.max_id = inner
            .max_id
            .max(entries.keys().next_back().copied().unwrap_or(0));
        Ok(())
    }

    /// Apply the error mode to a per-object failure.
    fn recover(&self, err: Error, number: u32) -> Result<()> {
        let fatal = matches!(err, Error::UnsupportedFilter(_) | Error::Io(_));
        match self.options.error_mode {
            ErrorMode::Lenient if !fatal => {
                log::warn!("skipping object {}: {}", number, err);
                Ok(())
            }
            _ => Err(err),
        }
    }
}

/// Whether the object at `offset` opens a stream that never closes before
/// its `endobj` (or the end of file).
fn is_truncated_stream(data: &[u8], offset: usize) -> bool {
    let Some(region) = data.get(offset..) else {
        return false;
    };
    let region = match find_bytes(region, b"endobj") {
        Some(end) => &region[..end],
        None => region,
    };
    find_bytes(region, b"stream").is_some() && find_bytes(region, b"endstream").is_none()
}

/// lopdf's newest trailer, completed with older keys from the chain.
fn final_trailer(loaded: &Dictionary, merged: &Dictionary) -> Dictionary {
    let mut trailer = Dictionary::new();
    for (key, value) in loaded.iter() {
        if !is_chain_key(key) {
            trailer.set(key.clone(), value.clone());
        }
    }
    for (key, value) in merged.iter() {
        if !trailer.has(key) && !matches!(value, Object::Null) {
            trailer.set(key.clone(), value.clone());
        }
    }
    trailer
}

/// Revisions oldest first, excluding the auxiliary `/XRefStm` sections of
/// hybrid files.
fn revisions(sections: &[XrefSection]) -> Vec<Revision> {
    let auxiliary: HashSet<usize> = sections
        .iter()
        .filter(|s| !s.is_stream)
        .filter_map(|s| entry(&s.trailer, b"XRefStm").and_then(integer))
        .map(|offset| offset as usize)
        .collect();

    sections
        .iter()
        .rev()
        .filter(|s| !auxiliary.contains(&s.offset))
        .map(|s| Revision {
            xref_offset: s.offset,
            entry_count: s.entries.len(),
            cross_reference_stream: s.is_stream,
        })
        .collect()
}

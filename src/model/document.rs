//! Document-level types.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::{array, dict_of, dict_of_mut, entry, has_type, integer, name_object, number, reference};
use super::{Dictionary, Object, ObjectId, Page, Stream};
use crate::error::{Error, Result};

/// Reference chains longer than this are treated as broken.
const MAX_REFERENCE_DEPTH: usize = 32;

/// Letter size, used when a page carries no usable `/MediaBox`.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

static NULL: Object = Object::Null;

/// One cross-reference section of a loaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Byte offset named by `startxref` (or `/Prev`) for this revision
    pub xref_offset: usize,
    /// Number of entries the section defines
    pub entry_count: usize,
    /// Whether the section is a cross-reference stream
    pub cross_reference_stream: bool,
}

/// An in-memory PDF document backed by a [`lopdf::Document`].
///
/// A document is either built fresh with [`Document::new`] or produced by
/// [`crate::parser::PdfParser`]. Loaded documents remember their source bytes
/// and which objects were touched since, so they can be saved as an
/// incremental revision. All mutation goes through this type so that the
/// change set stays accurate.
#[derive(Debug, Clone)]
pub struct Document {
    inner: lopdf::Document,

    /// Parsed revisions, oldest first (empty for fresh documents)
    pub revisions: Vec<Revision>,

    source: Option<Vec<u8>>,
    header_offset: usize,
    changed: BTreeSet<ObjectId>,
}

impl Document {
    /// Create a document with an empty page tree.
    pub fn new() -> Self {
        let mut inner = lopdf::Document::with_version("1.7");

        let mut pages = Dictionary::new();
        pages.set("Type", name_object("Pages"));
        pages.set("Kids", Vec::<Object>::new());
        pages.set("Count", 0i64);
        inner.objects.insert((2, 0), Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", name_object("Catalog"));
        catalog.set("Pages", Object::Reference((2, 0)));
        inner.objects.insert((1, 0), Object::Dictionary(catalog));

        inner.trailer.set("Root", Object::Reference((1, 0)));
        inner.max_id = 2;

        Self {
            changed: inner.objects.keys().copied().collect(),
            inner,
            revisions: Vec::new(),
            source: None,
            header_offset: 0,
        }
    }

    pub(crate) fn from_parts(
        mut inner: lopdf::Document,
        revisions: Vec<Revision>,
        source: Vec<u8>,
        header_offset: usize,
    ) -> Self {
        let declared = entry(&inner.trailer, b"Size")
            .and_then(integer)
            .map(|size| size.clamp(1, u32::MAX as i64) as u32 - 1)
            .unwrap_or(0);
        let highest = inner.objects.keys().map(|(n, _)| *n).max().unwrap_or(0);
        inner.max_id = inner.max_id.max(highest).max(declared);

        Self {
            inner,
            revisions,
            source: Some(source),
            header_offset,
            changed: BTreeSet::new(),
        }
    }

    /// The underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Header version (e.g., "1.7").
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Object table.
    pub fn objects(&self) -> &BTreeMap<ObjectId, Object> {
        &self.inner.objects
    }

    /// Merged trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        &self.inner.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Dictionary {
        &mut self.inner.trailer
    }

    /// Highest object number in use.
    pub fn max_id(&self) -> u32 {
        self.inner.max_id
    }

    /// Bytes this document was parsed from.
    pub fn source(&self) -> Option<&[u8]> {
        self.source.as_deref()
    }

    /// Offset of `%PDF-` in the source; nonzero when junk precedes it.
    pub fn header_offset(&self) -> usize {
        self.header_offset
    }

    /// The newest cross-reference section, for `/Prev`.
    pub fn last_revision(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Offset of the newest cross-reference section.
    pub fn last_xref_offset(&self) -> Option<usize> {
        self.last_revision().map(|r| r.xref_offset)
    }

    /// Objects added or replaced since the document was loaded or created.
    pub fn changed_ids(&self) -> &BTreeSet<ObjectId> {
        &self.changed
    }

    pub fn get_object(&self, id: ObjectId) -> Result<&Object> {
        self.inner
            .objects
            .get(&id)
            .ok_or_else(|| Error::MissingObject(format!("object {} {}", id.0, id.1)))
    }

    /// Mutable access to an object; it is marked as changed.
    pub fn get_object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        match self.inner.objects.get_mut(&id) {
            Some(obj) => {
                self.changed.insert(id);
                Ok(obj)
            }
            None => Err(Error::MissingObject(format!("object {} {}", id.0, id.1))),
        }
    }

    /// Follow references until a direct object is reached.
    ///
    /// A reference to an absent object resolves to `null`.
    pub fn resolve<'a>(&'a self, mut obj: &'a Object) -> Result<&'a Object> {
        for _ in 0..MAX_REFERENCE_DEPTH {
            match obj {
                Object::Reference(id) => match self.inner.objects.get(id) {
                    Some(target) => obj = target,
                    None => return Ok(&NULL),
                },
                _ => return Ok(obj),
            }
        }
        Err(Error::MissingObject("reference chain too long".into()))
    }

    /// Resolve `key` of `dict` to a direct object.
    pub fn resolve_entry<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        entry(dict, key).and_then(|obj| self.resolve(obj).ok())
    }

    /// Dictionary of a dictionary or stream object.
    pub fn get_dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        dict_of(self.get_object(id)?).ok_or_else(|| {
            Error::MissingObject(format!("object {} {} is not a dictionary", id.0, id.1))
        })
    }

    pub fn get_dictionary_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        dict_of_mut(self.get_object_mut(id)?).ok_or_else(|| {
            Error::MissingObject(format!("object {} {} is not a dictionary", id.0, id.1))
        })
    }

    /// Add an object under the next free number.
    pub fn add_object(&mut self, obj: impl Into<Object>) -> ObjectId {
        self.inner.max_id += 1;
        let id = (self.inner.max_id, 0);
        self.inner.objects.insert(id, obj.into());
        self.changed.insert(id);
        id
    }

    /// Insert or replace an object.
    pub fn set_object(&mut self, id: ObjectId, obj: impl Into<Object>) {
        self.inner.max_id = self.inner.max_id.max(id.0);
        self.inner.objects.insert(id, obj.into());
        self.changed.insert(id);
    }

    /// The document catalog (`/Root`).
    pub fn catalog(&self) -> Result<&Dictionary> {
        let root = entry(&self.inner.trailer, b"Root")
            .ok_or_else(|| Error::MissingObject("trailer has no /Root".into()))?;
        dict_of(self.resolve(root)?).ok_or_else(|| Error::MissingObject("catalog".into()))
    }

    fn pages_root_id(&self) -> Result<ObjectId> {
        entry(self.catalog()?, b"Pages")
            .and_then(reference)
            .ok_or_else(|| Error::MissingObject("page tree root".into()))
    }

    /// Page object ids in document order.
    pub fn page_ids(&self) -> Result<Vec<ObjectId>> {
        let root = self.pages_root_id()?;
        let mut ids = Vec::new();
        let mut visited = HashSet::new();
        self.collect_pages(root, &mut ids, &mut visited)?;
        Ok(ids)
    }

    fn collect_pages(
        &self,
        node: ObjectId,
        ids: &mut Vec<ObjectId>,
        visited: &mut HashSet<ObjectId>,
    ) -> Result<()> {
        if !visited.insert(node) {
            log::warn!("page tree revisits object {} {}, skipping", node.0, node.1);
            return Ok(());
        }
        let dict = self.get_dictionary(node)?;
        let kids = self.resolve_entry(dict, b"Kids").and_then(array);

        match kids {
            Some(kids) if !has_type(dict, b"Page") => {
                for kid in kids {
                    if let Some(kid_id) = reference(kid) {
                        if self.inner.objects.contains_key(&kid_id) {
                            self.collect_pages(kid_id, ids, visited)?;
                        }
                    }
                }
            }
            _ => ids.push(node),
        }
        Ok(())
    }

    pub fn page_count(&self) -> Result<u32> {
        Ok(self.page_ids()?.len() as u32)
    }

    /// Page by number (1-indexed).
    pub fn page(&self, number: u32) -> Result<Page> {
        let ids = self.page_ids()?;
        let total = ids.len() as u32;
        if number == 0 || number > total {
            return Err(Error::PageOutOfRange(number, total));
        }
        self.build_page(number, ids[(number - 1) as usize])
    }

    /// All pages in document order.
    pub fn pages(&self) -> Result<Vec<Page>> {
        self.page_ids()?
            .into_iter()
            .enumerate()
            .map(|(i, id)| self.build_page(i as u32 + 1, id))
            .collect()
    }

    fn build_page(&self, number: u32, id: ObjectId) -> Result<Page> {
        let media_box = match self.inherited_attribute(id, b"MediaBox")? {
            Some(obj) => read_rect(self, obj)?.unwrap_or(DEFAULT_MEDIA_BOX),
            None => DEFAULT_MEDIA_BOX,
        };
        let rotation = match self.inherited_attribute(id, b"Rotate")? {
            Some(obj) => integer(self.resolve(obj)?).unwrap_or(0),
            None => 0,
        };

        let mut page = Page::new(number, id, media_box);
        page.rotation = rotation.rem_euclid(360) as u16;
        page.content_refs = self.content_refs(id)?;
        Ok(page)
    }

    /// Look up a page attribute, walking `/Parent` for inheritable keys.
    pub fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut current = self.get_dictionary(page_id)?;
        for _ in 0..MAX_REFERENCE_DEPTH {
            if let Some(value) = entry(current, key) {
                return Ok(Some(value));
            }
            match entry(current, b"Parent").and_then(reference) {
                Some(parent) => current = self.get_dictionary(parent)?,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    /// The page's resource dictionary, inherited and resolved, as an owned copy.
    pub fn effective_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.inherited_attribute(page_id, b"Resources")? {
            Some(obj) => Ok(dict_of(self.resolve(obj)?).cloned().unwrap_or_default()),
            None => Ok(Dictionary::new()),
        }
    }

    /// Object ids of the page's content streams, in order.
    pub fn content_refs(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let page = self.get_dictionary(page_id)?;
        let refs = match entry(page, b"Contents") {
            Some(Object::Reference(id)) => match self.get_object(*id) {
                Ok(Object::Array(items)) => items.iter().filter_map(reference).collect(),
                _ => vec![*id],
            },
            Some(Object::Array(items)) => items.iter().filter_map(reference).collect(),
            _ => Vec::new(),
        };
        Ok(refs)
    }

    /// Decoded content of every stream on the page, joined by newlines.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for id in self.content_refs(page_id)? {
            let Some(Object::Stream(stream)) = self.inner.objects.get(&id) else {
                log::debug!("content reference {} {} is not a stream", id.0, id.1);
                continue;
            };
            if !content.is_empty() {
                content.push(b'\n');
            }
            content.extend_from_slice(&crate::parser::filters::decode_stream(stream)?);
        }
        Ok(content)
    }

    /// Put a content stream in front of the page's existing ones.
    pub fn prepend_content(&mut self, page_id: ObjectId, stream_id: ObjectId) -> Result<()> {
        let mut refs = vec![Object::Reference(stream_id)];
        refs.extend(self.content_refs(page_id)?.into_iter().map(Object::Reference));
        let page = self.get_dictionary_mut(page_id)?;
        page.set("Contents", refs);
        Ok(())
    }

    /// Append a content stream to a page without touching the existing ones.
    ///
    /// `/Contents` becomes an array: the original reference(s) followed by
    /// `stream_id`. A shared indirect contents array is copied, not mutated.
    pub fn append_content(&mut self, page_id: ObjectId, stream_id: ObjectId) -> Result<()> {
        let mut refs: Vec<Object> = self
            .content_refs(page_id)?
            .into_iter()
            .map(Object::Reference)
            .collect();
        let page = self.get_dictionary_mut(page_id)?;
        if refs.is_empty() {
            page.set("Contents", Object::Reference(stream_id));
        } else {
            refs.push(Object::Reference(stream_id));
            page.set("Contents", refs);
        }
        Ok(())
    }

    /// Append a blank page of the given size to the root of the page tree.
    pub fn add_page(&mut self, width: f32, height: f32) -> Result<ObjectId> {
        let root = self.pages_root_id()?;

        let mut page = Dictionary::new();
        page.set("Type", name_object("Page"));
        page.set("Parent", Object::Reference(root));
        page.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
        );
        page.set("Resources", Dictionary::new());
        let page_id = self.add_object(page);

        let pages = self.get_dictionary_mut(root)?;
        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => pages.set("Kids", vec![Object::Reference(page_id)]),
        }
        let count = entry(pages, b"Count").and_then(integer).unwrap_or(0);
        pages.set("Count", count + 1);
        Ok(page_id)
    }

    /// Add a stream and return its id.
    pub fn add_stream(&mut self, stream: Stream) -> ObjectId {
        self.add_object(stream)
    }

    /// Document information from `/Info`.
    pub fn metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::with_version(self.inner.version.clone());
        metadata.page_count = self.page_count()?;
        metadata.revision_count = self.revisions.len() as u32;

        if let Some(info_dict) = self.resolve_entry(&self.inner.trailer, b"Info").and_then(dict_of) {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");
            metadata.subject = get_string_from_dict(info_dict, b"Subject");
            metadata.keywords = get_string_from_dict(info_dict, b"Keywords");
            metadata.creator = get_string_from_dict(info_dict, b"Creator");
            metadata.producer = get_string_from_dict(info_dict, b"Producer");

            if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                metadata.created = parse_pdf_date(&date_str);
            }
            if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                metadata.modified = parse_pdf_date(&date_str);
            }
        }
        Ok(metadata)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn read_rect(doc: &Document, obj: &Object) -> Result<Option<[f32; 4]>> {
    let Some(items) = array(doc.resolve(obj)?) else {
        return Ok(None);
    };
    if items.len() < 4 {
        return Ok(None);
    }
    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        match number(doc.resolve(item)?) {
            Some(v) => *slot = v,
            None => return Ok(None),
        }
    }
    Ok(Some(rect))
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Number of cross-reference revisions in the file
    pub revision_count: u32,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}

/// Decode a text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

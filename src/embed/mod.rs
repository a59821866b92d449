//! Invisible keyword embedding.
//!
//! Each embedded layer is a separate content stream appended after a page's
//! existing streams:
//!
//! ```text
//! q BT 0 Tc 0 Tw 100 Tz 0 Ts 0 Tr /FKw 0.1 Tf 1 g 1 1 Td (SQL Java) Tj ET Q
//! ```
//!
//! The existing streams are bracketed by a leading `q` stream and a trailing
//! `Q` stream, so a page that leaves its graphics state unbalanced does not
//! leak its transformation into the layer. Existing streams are never
//! decoded or rewritten, so the visible page is unchanged. Embedding twice
//! stacks two layers.

mod style;

pub use style::InvisibleStyle;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::extract::encoding::encode_win_ansi;
use crate::keywords::KeywordSet;
use crate::model::value::{dict_of, name_object};
use crate::model::{Content, Dictionary, Document, Object, ObjectId, Operation, Stream};

/// Prefix for the font resource name of the keyword layer.
const FONT_NAME_PREFIX: &str = "FKw";

/// Cooperative cancellation, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Objects shared by every page that receives a layer in one pass.
#[derive(Debug, Clone, Copy)]
struct LayerObjects {
    font: ObjectId,
    save: ObjectId,
    restore: ObjectId,
}

/// Appends invisible keyword layers to pages.
#[derive(Debug, Clone, Default)]
pub struct KeywordEmbedder {
    style: InvisibleStyle,
}

impl KeywordEmbedder {
    pub fn new(style: InvisibleStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &InvisibleStyle {
        &self.style
    }

    /// Embed `keywords` on one page. Returns false when the set is empty.
    pub fn embed_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        keywords: &KeywordSet,
    ) -> Result<bool> {
        if keywords.is_empty() {
            return Ok(false);
        }
        let shared = self.add_shared_objects(doc);
        self.embed_with(doc, page_id, shared, keywords)?;
        Ok(true)
    }

    /// Embed `keywords` on every page, checking `cancel` before each page.
    ///
    /// Returns the number of pages that received a layer.
    pub fn embed_all(
        &self,
        doc: &mut Document,
        keywords: &KeywordSet,
        cancel: Option<&CancelFlag>,
    ) -> Result<usize> {
        if keywords.is_empty() {
            log::debug!("empty keyword set, nothing to embed");
            return Ok(0);
        }

        let page_ids = doc.page_ids()?;
        let shared = self.add_shared_objects(doc);
        for page_id in &page_ids {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                return Err(Error::Cancelled);
            }
            self.embed_with(doc, *page_id, shared, keywords)?;
        }

        log::info!(
            "embedded {} keyword(s) on {} page(s)",
            keywords.len(),
            page_ids.len()
        );
        Ok(page_ids.len())
    }

    /// The operations of one keyword layer.
    pub fn layer_operations(&self, font_name: &str, keywords: &KeywordSet) -> Content {
        let (x, y) = self.style.anchor;
        let fill: Vec<Object> = self
            .style
            .fill
            .components()
            .into_iter()
            .map(Object::Real)
            .collect();

        Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tc", vec![Object::Integer(0)]),
                Operation::new("Tw", vec![Object::Integer(0)]),
                Operation::new("Tz", vec![Object::Integer(100)]),
                Operation::new("Ts", vec![Object::Integer(0)]),
                Operation::new("Tr", vec![Object::Integer(0)]),
                Operation::new(
                    "Tf",
                    vec![name_object(font_name), Object::Real(self.style.font_size)],
                ),
                Operation::new(self.style.fill.fill_operator(), fill),
                Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(&keywords.joined()))],
                ),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        }
    }

    fn add_shared_objects(&self, doc: &mut Document) -> LayerObjects {
        let mut font = Dictionary::new();
        font.set("Type", name_object("Font"));
        font.set("Subtype", name_object("Type1"));
        font.set("BaseFont", name_object(&self.style.base_font));
        font.set("Encoding", name_object("WinAnsiEncoding"));
        LayerObjects {
            font: doc.add_object(font),
            save: doc.add_stream(Stream::new(Dictionary::new(), b"q\n".to_vec())),
            restore: doc.add_stream(Stream::new(Dictionary::new(), b"Q\n".to_vec())),
        }
    }

    fn embed_with(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        shared: LayerObjects,
        keywords: &KeywordSet,
    ) -> Result<()> {
        // Work on a copy so inherited or shared dictionaries stay untouched.
        let mut resources = doc.effective_resources(page_id)?;
        let mut fonts = doc
            .resolve_entry(&resources, b"Font")
            .and_then(dict_of)
            .cloned()
            .unwrap_or_default();

        let font_name = unused_font_name(&fonts);
        fonts.set(font_name.as_bytes().to_vec(), shared.font);
        resources.set("Font", fonts);

        let content = self.layer_operations(&font_name, keywords).encode()?;
        let mut stream = Stream::new(Dictionary::new(), content);
        if self.style.compress {
            stream.compress()?;
        }
        let stream_id = doc.add_stream(stream);

        doc.get_dictionary_mut(page_id)?.set("Resources", resources);
        doc.prepend_content(page_id, shared.save)?;
        doc.append_content(page_id, shared.restore)?;
        doc.append_content(page_id, stream_id)
    }
}

/// `FKw`, then `FKw1`, `FKw2`, ... until a name is free.
fn unused_font_name(fonts: &Dictionary) -> String {
    let mut name = FONT_NAME_PREFIX.to_string();
    let mut n = 0u32;
    while fonts.has(name.as_bytes()) {
        n += 1;
        name = format!("{}{}", FONT_NAME_PREFIX, n);
    }
    name
}

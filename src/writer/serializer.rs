//! Whole-file and incremental serialization over lopdf's writer.
//!
//! Reachability, renumbering and the dangling-reference check happen here;
//! lopdf writes the bytes. Incremental saves go through
//! [`lopdf::IncrementalDocument`] so the original revision is never touched.

use std::collections::{BTreeSet, HashMap, VecDeque};

use lopdf::xref::XrefType;
use lopdf::IncrementalDocument;

use crate::error::{Error, Result};
use crate::model::value::{entry, integer, reference};
use crate::model::{Dictionary, Document, Object, ObjectId};

/// How a document is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Incremental when the document was loaded from bytes, full otherwise
    #[default]
    Auto,
    /// Rewrite every reachable object with dense numbering
    Full,
    /// Append changed objects as a new revision
    Incremental,
}

/// Serialize `doc` according to `mode`.
pub fn save(doc: &Document, mode: SaveMode) -> Result<Vec<u8>> {
    match mode {
        SaveMode::Full => write_full(doc),
        SaveMode::Auto | SaveMode::Incremental => write_incremental(doc),
    }
}

/// Write the whole document from scratch.
///
/// Objects reachable from `/Root` and `/Info` are renumbered densely from 1
/// in discovery order; everything else is dropped. A reference to an object
/// the document does not contain is a [`Error::DanglingReference`].
pub fn write_full(doc: &Document) -> Result<Vec<u8>> {
    let root = entry(doc.trailer(), b"Root")
        .and_then(reference)
        .ok_or_else(|| Error::MissingObject("trailer has no /Root".into()))?;
    let info = entry(doc.trailer(), b"Info")
        .and_then(reference)
        .filter(|id| doc.objects().contains_key(id));

    let mut order: Vec<ObjectId> = Vec::new();
    let mut numbers: HashMap<ObjectId, u32> = HashMap::new();
    let mut queue = VecDeque::new();
    for id in std::iter::once(root).chain(info) {
        if !numbers.contains_key(&id) {
            numbers.insert(id, order.len() as u32 + 1);
            order.push(id);
            queue.push_back(id);
        }
    }

    while let Some(id) = queue.pop_front() {
        let obj = doc.objects().get(&id).ok_or(Error::DanglingReference(id))?;
        let mut missing = None;
        for_each_reference(obj, &mut |child| {
            if missing.is_some() || numbers.contains_key(&child) {
                return;
            }
            if !doc.objects().contains_key(&child) {
                missing = Some(child);
                return;
            }
            numbers.insert(child, order.len() as u32 + 1);
            order.push(child);
            queue.push_back(child);
        });
        if let Some(child) = missing {
            return Err(Error::DanglingReference(child));
        }
    }

    let renumber = |id: ObjectId| (numbers.get(&id).copied().unwrap_or(0), 0u16);

    let mut out_doc = lopdf::Document::with_version(doc.version());
    for (i, id) in order.iter().enumerate() {
        let mut obj = doc.objects()[id].clone();
        map_references(&mut obj, &renumber);
        out_doc.objects.insert((i as u32 + 1, 0), obj);
    }
    out_doc.max_id = order.len() as u32;
    out_doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;

    out_doc.trailer.set("Size", Object::Integer(order.len() as i64 + 1));
    out_doc.trailer.set("Root", renumber(root));
    if let Some(info) = info {
        out_doc.trailer.set("Info", renumber(info));
    }
    if let Some(file_id) = entry(doc.trailer(), b"ID") {
        out_doc.trailer.set("ID", file_id.clone());
    }

    let mut out = Vec::new();
    out_doc.save_to(&mut out)?;

    log::debug!("wrote {} objects ({} bytes)", order.len(), out.len());
    Ok(out)
}

/// Append a revision holding only the objects changed since load.
///
/// The original bytes are left untouched and the new section uses the same
/// cross-reference style as the newest existing one. Falls back to
/// [`write_full`] for documents that were not loaded from bytes, or whose
/// header does not start the file; returns the source unchanged when
/// nothing was modified.
pub fn write_incremental(doc: &Document) -> Result<Vec<u8>> {
    let (Some(source), Some(last)) = (doc.source(), doc.last_revision()) else {
        return write_full(doc);
    };
    if doc.header_offset() > 0 {
        log::info!(
            "header at offset {}; rewriting the whole file instead of appending",
            doc.header_offset()
        );
        return write_full(doc);
    }

    let changed: BTreeSet<ObjectId> = doc
        .changed_ids()
        .iter()
        .copied()
        .filter(|id| doc.objects().contains_key(id))
        .collect();
    if changed.is_empty() {
        return Ok(source.to_vec());
    }

    for id in &changed {
        let mut missing = None;
        for_each_reference(&doc.objects()[id], &mut |child| {
            if missing.is_none() && !doc.objects().contains_key(&child) {
                missing = Some(child);
            }
        });
        if let Some(child) = missing {
            return Err(Error::DanglingReference(child));
        }
    }

    let mut incremental = IncrementalDocument::create_from(source.to_vec(), doc.inner().clone());
    let update = &mut incremental.new_document;
    update.version = doc.version().to_string();
    for id in &changed {
        update.objects.insert(*id, doc.objects()[id].clone());
    }
    update.max_id = update.max_id.max(doc.max_id());
    update.reference_table.cross_reference_type = if last.cross_reference_stream {
        XrefType::CrossReferenceStream
    } else {
        XrefType::CrossReferenceTable
    };

    let declared = entry(doc.trailer(), b"Size").and_then(integer).unwrap_or(0);
    let highest = changed.iter().map(|(n, _)| *n as i64).max().unwrap_or(0);
    let size = declared.max(highest + 1).max(doc.max_id() as i64 + 1);

    let mut trailer = Dictionary::new();
    trailer.set("Size", Object::Integer(size));
    for key in [b"Root".as_slice(), b"Info", b"ID"] {
        if let Some(value) = entry(doc.trailer(), key) {
            trailer.set(key.to_vec(), value.clone());
        }
    }
    trailer.set("Prev", Object::Integer(last.xref_offset as i64));
    update.trailer = trailer;

    let mut out = Vec::with_capacity(source.len() + 1024);
    incremental.save_to(&mut out)?;

    log::debug!(
        "appended revision with {} objects, previous xref at {}",
        changed.len(),
        last.xref_offset
    );
    Ok(out)
}

/// Call `f` for every reference inside `obj`, including stream dictionaries.
fn for_each_reference(obj: &Object, f: &mut impl FnMut(ObjectId)) {
    match obj {
        Object::Reference(id) => f(*id),
        Object::Array(items) => items.iter().for_each(|item| for_each_reference(item, f)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| for_each_reference(v, f)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, v)| for_each_reference(v, f)),
        _ => {}
    }
}

/// Rewrite every reference inside `obj` through `f`.
fn map_references(obj: &mut Object, f: &impl Fn(ObjectId) -> ObjectId) {
    match obj {
        Object::Reference(id) => *id = f(*id),
        Object::Array(items) => items.iter_mut().for_each(|item| map_references(item, f)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, v)| map_references(v, f)),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .for_each(|(_, v)| map_references(v, f)),
        _ => {}
    }
}

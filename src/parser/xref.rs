//! Cross-reference tables, cross-reference streams, and revision chains.
//!
//! A file updated incrementally carries one cross-reference section per
//! revision, each trailer pointing at the previous one through `/Prev`.
//! [`read_chain`] collects those sections newest first without touching any
//! object; [`merge`] then performs one precedence pass so that the newest
//! definition of every object number wins.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::model::value::{array, entry, has_type, integer};
use crate::model::{Dictionary, Object, Stream};

use super::filters::decode_stream;
use super::scan::{rfind_bytes, Scanner};

/// How far from the end of file `startxref` is searched for.
const STARTXREF_WINDOW: usize = 1024;

/// One cross-reference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Deleted object; shadows older definitions of the same number.
    Free,
    /// Uncompressed object at a byte offset.
    InUse { offset: usize, generation: u16 },
    /// Object stored inside an object stream.
    Compressed { container: u32, index: u32 },
}

/// A single parsed cross-reference section and its trailer.
#[derive(Debug, Clone)]
pub struct XrefSection {
    /// Byte offset of the section (`xref` keyword or stream object).
    pub offset: usize,
    pub entries: BTreeMap<u32, XrefEntry>,
    pub trailer: Dictionary,
    /// True for `/Type /XRef` streams.
    pub is_stream: bool,
}

/// Locate the offset named by the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> Result<usize> {
    let window_start = data.len().saturating_sub(STARTXREF_WINDOW);
    let rel = rfind_bytes(&data[window_start..], b"startxref")
        .ok_or_else(|| Error::CorruptCrossReference("startxref not found".into()))?;

    let mut scanner = Scanner::at(data, window_start + rel + b"startxref".len());
    let offset = scanner
        .read_unsigned()
        .ok_or_else(|| Error::CorruptCrossReference("startxref has no offset".into()))?;
    if offset >= data.len() as u64 {
        return Err(Error::CorruptCrossReference(format!(
            "startxref offset {} past end of file",
            offset
        )));
    }
    Ok(offset as usize)
}

/// Parse the section at `offset`, either a classic table or an xref stream.
pub fn read_section(data: &[u8], offset: usize) -> Result<XrefSection> {
    let mut scanner = Scanner::at(data, offset);
    scanner.skip_whitespace();
    if scanner.rest().starts_with(b"xref") {
        read_table(data, scanner.pos())
    } else {
        read_stream_section(data, offset)
    }
}

fn corrupt(offset: usize, what: &str) -> Error {
    Error::CorruptCrossReference(format!("{} at offset {}", what, offset))
}

fn read_table(data: &[u8], offset: usize) -> Result<XrefSection> {
    let mut scanner = Scanner::at(data, offset);
    if !scanner.eat_keyword(b"xref") {
        return Err(corrupt(offset, "missing xref keyword"));
    }

    let mut entries = BTreeMap::new();
    loop {
        if scanner.eat_keyword(b"trailer") {
            break;
        }
        let start = scanner
            .read_unsigned()
            .ok_or_else(|| corrupt(scanner.pos(), "bad subsection header"))?;
        let count = scanner
            .read_unsigned()
            .ok_or_else(|| corrupt(scanner.pos(), "bad subsection count"))?;

        for i in 0..count {
            let field_offset = scanner
                .read_unsigned()
                .ok_or_else(|| corrupt(scanner.pos(), "bad entry offset"))?;
            let generation = scanner
                .read_unsigned()
                .ok_or_else(|| corrupt(scanner.pos(), "bad entry generation"))?;
            let kind = scanner
                .read_keyword()
                .ok_or_else(|| corrupt(scanner.pos(), "bad entry type"))?;

            let number = start
                .checked_add(i)
                .filter(|n| *n <= u32::MAX as u64)
                .ok_or_else(|| corrupt(scanner.pos(), "object number overflow"))?;
            let entry = match kind {
                b"n" => XrefEntry::InUse {
                    offset: field_offset as usize,
                    generation: generation.min(u16::MAX as u64) as u16,
                },
                b"f" => XrefEntry::Free,
                _ => return Err(corrupt(scanner.pos(), "entry type must be n or f")),
            };
            entries.entry(number as u32).or_insert(entry);
        }
    }

    let trailer = scanner
        .read_dictionary()
        .ok_or_else(|| corrupt(scanner.pos(), "trailer is not a dictionary"))?;

    Ok(XrefSection {
        offset,
        entries,
        trailer,
        is_stream: false,
    })
}

fn read_stream_section(data: &[u8], offset: usize) -> Result<XrefSection> {
    let mut scanner = Scanner::at(data, offset);
    if scanner.read_object_header().is_none() {
        return Err(corrupt(offset, "expected xref table or stream"));
    }
    let dict = scanner
        .read_dictionary()
        .ok_or_else(|| corrupt(offset, "unreadable xref stream dictionary"))?;
    if !has_type(&dict, b"XRef") {
        return Err(corrupt(offset, "stream is not /Type /XRef"));
    }
    let body = scanner
        .read_stream_body(&dict)
        .ok_or_else(|| corrupt(offset, "xref stream has no body"))?;

    let widths: Vec<usize> = entry(&dict, b"W")
        .and_then(array)
        .map(|w| w.iter().map(|v| integer(v).unwrap_or(0).max(0) as usize).collect())
        .unwrap_or_default();
    if widths.len() != 3 || widths.iter().any(|w| *w > 8) {
        return Err(corrupt(offset, "invalid /W array"));
    }

    let size = entry(&dict, b"Size").and_then(integer).unwrap_or(0);
    let index: Vec<(u64, u64)> = match entry(&dict, b"Index").and_then(array) {
        Some(items) => items
            .chunks(2)
            .filter_map(|pair| match pair {
                [a, b] => Some((integer(a)?.max(0) as u64, integer(b)?.max(0) as u64)),
                _ => None,
            })
            .collect(),
        None => vec![(0, size.max(0) as u64)],
    };

    let stream = Stream::new(dict, body.to_vec());
    let raw = decode_stream(&stream)
        .map_err(|e| Error::CorruptCrossReference(format!("xref stream: {}", e)))?;

    let row_len: usize = widths.iter().sum();
    if row_len == 0 {
        return Err(corrupt(offset, "zero-width xref rows"));
    }
    let mut rows = raw.chunks_exact(row_len);
    let mut entries = BTreeMap::new();

    for (first, count) in index {
        for i in 0..count {
            let Some(row) = rows.next() else {
                return Err(corrupt(offset, "xref stream shorter than /Index"));
            };
            let (f1, rest) = row.split_at(widths[0]);
            let (f2, f3) = rest.split_at(widths[1]);
            // A zero-width type field defaults to type 1.
            let kind = if widths[0] == 0 { 1 } else { be_number(f1) };
            let number = first
                .checked_add(i)
                .filter(|n| *n <= u32::MAX as u64)
                .ok_or_else(|| corrupt(offset, "object number overflow"))?;
            let entry = match kind {
                0 => XrefEntry::Free,
                1 => XrefEntry::InUse {
                    offset: be_number(f2) as usize,
                    generation: be_number(f3).min(u16::MAX as u64) as u16,
                },
                2 => XrefEntry::Compressed {
                    container: be_number(f2) as u32,
                    index: be_number(f3) as u32,
                },
                // Unknown types are ignored as null references.
                _ => continue,
            };
            entries.entry(number as u32).or_insert(entry);
        }
    }

    Ok(XrefSection {
        offset,
        entries,
        trailer: stream.dict,
        is_stream: true,
    })
}

fn be_number(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| acc << 8 | *b as u64)
}

/// Walk the `/Prev` chain from `start`, newest section first.
///
/// A hybrid file's `/XRefStm` section is placed before the table that names
/// it, so its entries take precedence within that revision. The number of
/// revisions is capped at `max_revisions`; revisits are treated as corrupt.
pub fn read_chain(data: &[u8], start: usize, max_revisions: usize) -> Result<Vec<XrefSection>> {
    let mut sections = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(start);
    let mut revisions = 0usize;

    while let Some(offset) = next {
        if !visited.insert(offset) {
            return Err(corrupt(offset, "cycle in /Prev chain"));
        }
        revisions += 1;
        if revisions > max_revisions {
            return Err(Error::CorruptCrossReference(format!(
                "more than {} revisions",
                max_revisions
            )));
        }

        let section = read_section(data, offset)?;
        next = prev_offset(&section.trailer, b"Prev", data.len())?;

        if !section.is_stream {
            if let Some(stm_offset) = prev_offset(&section.trailer, b"XRefStm", data.len())? {
                if visited.insert(stm_offset) {
                    match read_section(data, stm_offset) {
                        Ok(stm) => sections.push(stm),
                        Err(e) => log::warn!("ignoring unreadable /XRefStm section: {}", e),
                    }
                }
            }
        }
        sections.push(section);
    }

    log::debug!(
        "cross-reference chain: {} revision(s), {} section(s)",
        revisions,
        sections.len()
    );
    Ok(sections)
}

fn prev_offset(trailer: &Dictionary, key: &[u8], len: usize) -> Result<Option<usize>> {
    match entry(trailer, key) {
        None => Ok(None),
        Some(value) => match integer(value) {
            Some(offset) if offset >= 0 && (offset as usize) < len => Ok(Some(offset as usize)),
            _ => Err(Error::CorruptCrossReference(format!(
                "/{} does not point inside the file",
                String::from_utf8_lossy(key)
            ))),
        },
    }
}

/// Merge sections (newest first) into one entry table and one trailer.
///
/// An entry is taken only if no newer section already defined that object
/// number, so later revisions shadow earlier ones, free entries included.
/// Trailer keys follow the same rule; the chain keys `/Prev` and `/XRefStm`
/// and the stream-only keys are dropped.
pub fn merge(sections: &[XrefSection]) -> (BTreeMap<u32, XrefEntry>, Dictionary) {
    let mut entries = BTreeMap::new();
    let mut trailer = Dictionary::new();

    for section in sections {
        for (number, entry) in &section.entries {
            entries.entry(*number).or_insert(*entry);
        }
        for (key, value) in section.trailer.iter() {
            if is_chain_key(key) {
                continue;
            }
            if !trailer.has(key) {
                trailer.set(key.clone(), value.clone());
            }
        }
    }
    (entries, trailer)
}

/// Keys that describe a section itself rather than the document.
pub(crate) fn is_chain_key(key: &[u8]) -> bool {
    matches!(
        key,
        b"Prev" | b"XRefStm" | b"Type" | b"W" | b"Index" | b"Length" | b"Filter" | b"DecodeParms"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &str, trailer: &str) -> Vec<u8> {
        format!("xref\n{}trailer\n{}\n", entries, trailer).into_bytes()
    }

    #[test]
    fn test_find_startxref() {
        let data = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f\r\ntrailer\n<< >>\nstartxref\n9\n%%EOF\n";
        assert_eq!(find_startxref(data).unwrap(), 9);
    }

    #[test]
    fn test_startxref_missing_or_out_of_range() {
        assert!(matches!(
            find_startxref(b"%PDF-1.4\n%%EOF"),
            Err(Error::CorruptCrossReference(_))
        ));
        assert!(matches!(
            find_startxref(b"%PDF-1.4\nstartxref\n99999\n%%EOF"),
            Err(Error::CorruptCrossReference(_))
        ));
    }

    #[test]
    fn test_read_table_with_subsections() {
        let data = table(
            "0 2\n0000000000 65535 f\r\n0000000017 00000 n\r\n5 1\n0000000099 00002 n\r\n",
            "<< /Size 6 /Root 1 0 R >>",
        );
        let section = read_section(&data, 0).unwrap();
        assert_eq!(section.entries.len(), 3);
        assert_eq!(section.entries[&0], XrefEntry::Free);
        assert_eq!(
            section.entries[&1],
            XrefEntry::InUse {
                offset: 17,
                generation: 0
            }
        );
        assert_eq!(
            section.entries[&5],
            XrefEntry::InUse {
                offset: 99,
                generation: 2
            }
        );
        assert!(!section.is_stream);
        assert!(matches!(section.trailer.get(b"Size"), Ok(Object::Integer(6))));
    }

    #[test]
    fn test_merge_newest_wins() {
        let old = XrefSection {
            offset: 10,
            entries: [
                (1, XrefEntry::InUse { offset: 20, generation: 0 }),
                (2, XrefEntry::InUse { offset: 40, generation: 0 }),
                (3, XrefEntry::InUse { offset: 60, generation: 0 }),
            ]
            .into_iter()
            .collect(),
            trailer: [
                (b"Root".to_vec(), Object::Reference((1, 0))),
                (b"Info".to_vec(), Object::Reference((9, 0))),
            ]
            .into_iter()
            .collect(),
            is_stream: false,
        };
        let new = XrefSection {
            offset: 500,
            entries: [
                (2, XrefEntry::InUse { offset: 400, generation: 0 }),
                (3, XrefEntry::Free),
            ]
            .into_iter()
            .collect(),
            trailer: [
                (b"Root".to_vec(), Object::Reference((1, 0))),
                (b"Prev".to_vec(), Object::Integer(10)),
            ]
            .into_iter()
            .collect(),
            is_stream: false,
        };

        let (entries, trailer) = merge(&[new, old]);
        assert_eq!(entries[&1], XrefEntry::InUse { offset: 20, generation: 0 });
        assert_eq!(entries[&2], XrefEntry::InUse { offset: 400, generation: 0 });
        assert_eq!(entries[&3], XrefEntry::Free);
        assert!(trailer.has(b"Info"));
        assert!(!trailer.has(b"Prev"));
    }

    #[test]
    fn test_prev_cycle_is_corrupt() {
        let data = table("0 1\n0000000000 65535 f\r\n", "<< /Size 1 /Prev 0 >>");
        assert!(matches!(
            read_chain(&data, 0, 64),
            Err(Error::CorruptCrossReference(_))
        ));
    }

    #[test]
    fn test_revision_cap() {
        let mut data = table("0 1\n0000000000 65535 f\r\n", "<< /Size 1 >>");
        let mut prev = 0;
        for _ in 0..3 {
            let offset = data.len();
            data.extend(table("", &format!("<< /Size 1 /Prev {} >>", prev)));
            prev = offset;
        }
        assert_eq!(read_chain(&data, prev, 4).unwrap().len(), 4);
        assert!(matches!(
            read_chain(&data, prev, 3),
            Err(Error::CorruptCrossReference(_))
        ));
    }

    #[test]
    fn test_xref_stream_section() {
        // Rows: type(1) offset(2) gen(1)
        let rows: Vec<u8> = vec![0, 0, 0, 255, 1, 0, 15, 0, 2, 0, 7, 3];
        let mut data =
            format!("1 0 obj\n<< /Type /XRef /Size 3 /W [1 2 1] /Length {} >>\nstream\n", rows.len())
                .into_bytes();
        data.extend_from_slice(&rows);
        data.extend_from_slice(b"\nendstream\nendobj\n");

        let section = read_section(&data, 0).unwrap();
        assert!(section.is_stream);
        assert_eq!(section.entries[&0], XrefEntry::Free);
        assert_eq!(section.entries[&1], XrefEntry::InUse { offset: 15, generation: 0 });
        assert_eq!(section.entries[&2], XrefEntry::Compressed { container: 7, index: 3 });
    }
}

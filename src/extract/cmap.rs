//! `/ToUnicode` CMaps.
//!
//! A CMap is PostScript-like, so it goes through lopdf's content stream
//! tokenizer: the operands of `endbfchar`, `endbfrange` and
//! `endcodespacerange` carry all the mapping data.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::value::string_bytes;
use crate::model::{Content, Object};

/// Longest `bfrange` expanded; larger ranges are truncated.
const MAX_RANGE: u32 = 0x1_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodespaceRange {
    len: usize,
    low: u32,
    high: u32,
}

/// Character code to Unicode mapping from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeMap {
    codespace: Vec<CodespaceRange>,
    map: HashMap<(usize, u32), String>,
}

impl ToUnicodeMap {
    /// Parse decoded CMap bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let content = Content::decode(data)?;
        let mut cmap = ToUnicodeMap::default();

        for op in &content.operations {
            match op.operator.as_str() {
                "endcodespacerange" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let (Some(lo), Some(hi)) = (string_bytes(&pair[0]), string_bytes(&pair[1])) {
                            cmap.codespace.push(CodespaceRange {
                                len: lo.len(),
                                low: code_value(lo),
                                high: code_value(hi),
                            });
                        }
                    }
                }
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let (Some(src), Some(dst)) = (string_bytes(&pair[0]), string_bytes(&pair[1])) {
                            cmap.map.insert((src.len(), code_value(src)), utf16_be(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        cmap.add_range(&triple[0], &triple[1], &triple[2]);
                    }
                }
                _ => {}
            }
        }
        cmap.codespace.sort_by_key(|r| r.len);
        Ok(cmap)
    }

    fn add_range(&mut self, low: &Object, high: &Object, dst: &Object) {
        let (Some(low), Some(high)) = (string_bytes(low), string_bytes(high)) else {
            return;
        };
        let len = low.len();
        let (start, end) = (code_value(low), code_value(high));
        if end < start {
            return;
        }
        let end = end.min(start.saturating_add(MAX_RANGE - 1));

        match dst {
            Object::Array(items) => {
                for (code, item) in (start..=end).zip(items) {
                    if let Some(bytes) = string_bytes(item) {
                        self.map.insert((len, code), utf16_be(bytes));
                    }
                }
            }
            _ => {
                let Some(base) = string_bytes(dst) else { return };
                for (offset, code) in (start..=end).enumerate() {
                    self.map.insert((len, code), increment_last_unit(base, offset as u32));
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Split a string operand into character codes.
    ///
    /// Uses the codespace ranges when present; otherwise every code is
    /// `default_len` bytes.
    pub fn split_codes<'a>(&self, bytes: &'a [u8], default_len: usize) -> Vec<&'a [u8]> {
        let mut codes = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let len = self.code_length(&bytes[pos..]).unwrap_or(default_len);
            let end = (pos + len.max(1)).min(bytes.len());
            codes.push(&bytes[pos..end]);
            pos = end;
        }
        codes
    }

    fn code_length(&self, rest: &[u8]) -> Option<usize> {
        self.codespace
            .iter()
            .find(|r| {
                r.len <= rest.len() && {
                    let value = code_value(&rest[..r.len]);
                    (r.low..=r.high).contains(&value)
                }
            })
            .map(|r| r.len)
    }

    /// Unicode text for one character code.
    pub fn lookup(&self, code: &[u8]) -> Option<&str> {
        self.map.get(&(code.len(), code_value(code))).map(String::as_str)
    }
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| match *c {
            [hi, lo] => u16::from_be_bytes([hi, lo]),
            [b] => b as u16,
            _ => 0,
        })
        .collect();
    String::from_utf16_lossy(&units)
}

fn increment_last_unit(base: &[u8], offset: u32) -> String {
    let mut bytes = base.to_vec();
    if bytes.len() >= 2 {
        let n = bytes.len();
        let last = u16::from_be_bytes([bytes[n - 2], bytes[n - 1]]).wrapping_add(offset as u16);
        bytes[n - 2..].copy_from_slice(&last.to_be_bytes());
    } else if let Some(b) = bytes.last_mut() {
        *b = b.wrapping_add(offset as u8);
    }
    utf16_be(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0011> <0053>
endbfchar
2 beginbfrange
<0024> <0026> <0041>
<0030> <0031> [<0066006C> <00E9>]
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn test_bfchar_and_bfrange() {
        let cmap = ToUnicodeMap::parse(CMAP).unwrap();
        assert_eq!(cmap.lookup(&[0x00, 0x03]), Some(" "));
        assert_eq!(cmap.lookup(&[0x00, 0x11]), Some("S"));
        assert_eq!(cmap.lookup(&[0x00, 0x24]), Some("A"));
        assert_eq!(cmap.lookup(&[0x00, 0x26]), Some("C"));
        assert_eq!(cmap.lookup(&[0x00, 0x30]), Some("fl"));
        assert_eq!(cmap.lookup(&[0x00, 0x31]), Some("é"));
        assert_eq!(cmap.lookup(&[0x00, 0x27]), None);
    }

    #[test]
    fn test_split_codes_uses_codespace() {
        let cmap = ToUnicodeMap::parse(CMAP).unwrap();
        let codes = cmap.split_codes(&[0x00, 0x24, 0x00, 0x25, 0x01], 1);
        assert_eq!(codes, vec![&[0x00, 0x24][..], &[0x00, 0x25][..], &[0x01][..]]);
    }

    #[test]
    fn test_split_codes_without_codespace() {
        let cmap = ToUnicodeMap::parse(b"1 beginbfchar <41> <0058> endbfchar").unwrap();
        assert_eq!(cmap.split_codes(b"AB", 1).len(), 2);
        assert_eq!(cmap.lookup(b"A"), Some("X"));
    }
}

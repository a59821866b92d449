//! Per-font character decoding.

use crate::model::value::{array, entry, name};
use crate::model::{Dictionary, Document, Object};
use crate::parser::filters::decode_stream;

use super::cmap::ToUnicodeMap;
use super::encoding::{glyph_to_char, BaseEncoding};

/// Turns string operands shown with one font into Unicode.
///
/// Precedence: `/ToUnicode`, then the simple-font encoding table, then the
/// raw code point.
#[derive(Debug, Clone)]
pub struct FontDecoder {
    to_unicode: Option<ToUnicodeMap>,
    table: Option<[Option<char>; 256]>,
    code_len: usize,
}

impl FontDecoder {
    /// Decoder for a text-show with no usable font: one byte per code, raw.
    pub fn fallback() -> Self {
        Self {
            to_unicode: None,
            table: None,
            code_len: 1,
        }
    }

    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let subtype = entry(font, b"Subtype").and_then(name).unwrap_or_default();
        let composite = subtype == b"Type0";

        let to_unicode = doc
            .resolve_entry(font, b"ToUnicode")
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(stream),
                _ => None,
            })
            .and_then(|stream| match decode_stream(stream) {
                Ok(data) => ToUnicodeMap::parse(&data).ok(),
                Err(e) => {
                    log::warn!("ignoring unreadable ToUnicode map: {}", e);
                    None
                }
            })
            .filter(|map| !map.is_empty());

        let table = if composite {
            None
        } else {
            simple_font_table(doc, font, subtype)
        };

        Self {
            to_unicode,
            table,
            code_len: if composite { 2 } else { 1 },
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut text = String::new();
        match &self.to_unicode {
            Some(map) => {
                for code in map.split_codes(bytes, self.code_len) {
                    match map.lookup(code) {
                        Some(s) => text.push_str(s),
                        None => text.push(self.code_char(code)),
                    }
                }
            }
            None => {
                for code in bytes.chunks(self.code_len) {
                    text.push(self.code_char(code));
                }
            }
        }
        text
    }

    fn code_char(&self, code: &[u8]) -> char {
        if let ([byte], Some(table)) = (code, &self.table) {
            if let Some(c) = table[*byte as usize] {
                return c;
            }
        }
        let value = code.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

fn simple_font_table(doc: &Document, font: &Dictionary, subtype: &[u8]) -> Option<[Option<char>; 256]> {
    let base_font = entry(font, b"BaseFont").and_then(name).unwrap_or_default();
    let symbolic = base_font.ends_with(b"Symbol") || base_font.ends_with(b"ZapfDingbats");
    let implicit = match subtype {
        _ if symbolic => None,
        b"Type1" | b"MMType1" => Some(BaseEncoding::Standard),
        b"TrueType" => Some(BaseEncoding::WinAnsi),
        _ => None,
    };

    match doc.resolve_entry(font, b"Encoding") {
        Some(Object::Name(encoding)) => BaseEncoding::from_name(encoding)
            .or(implicit)
            .map(BaseEncoding::table),
        Some(Object::Dictionary(dict)) => {
            let base = entry(dict, b"BaseEncoding")
                .and_then(name)
                .and_then(BaseEncoding::from_name)
                .or(implicit);
            let mut table = base.map(BaseEncoding::table).unwrap_or([None; 256]);
            if let Some(differences) = doc.resolve_entry(dict, b"Differences") {
                apply_differences(&mut table, differences);
            }
            Some(table)
        }
        _ => implicit.map(BaseEncoding::table),
    }
}

/// `[code /name /name ... code /name ...]`
fn apply_differences(table: &mut [Option<char>; 256], differences: &Object) {
    let Some(items) = array(differences) else { return };
    let mut code: Option<usize> = None;
    for item in items {
        match item {
            Object::Integer(n) => code = usize::try_from(*n).ok(),
            Object::Name(glyph) => {
                if let Some(c) = code.filter(|c| *c < 256) {
                    table[c] = std::str::from_utf8(glyph).ok().and_then(glyph_to_char);
                }
                code = code.map(|c| c + 1);
            }
            _ => {}
        }
    }
}

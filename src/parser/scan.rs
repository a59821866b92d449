//! Cursor over the few token kinds cross-reference sections use.
//!
//! Object syntax proper is lopdf's job. This only reads what the revision
//! walk needs before any object is loaded: unsigned integers, bare keywords,
//! `n g obj` headers, trailer dictionaries and cross-reference stream bodies.

use crate::model::{Dictionary, Object};

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, 0 | b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

#[inline]
fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// First occurrence of `needle`.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Last occurrence of `needle`.
pub(crate) fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

pub(crate) struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    /// Skip whitespace and `%` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Consume `keyword` if it comes next, as a whole token.
    pub fn eat_keyword(&mut self, keyword: &[u8]) -> bool {
        self.skip_whitespace();
        let rest = self.rest();
        let whole = rest.starts_with(keyword)
            && rest.get(keyword.len()).map_or(true, |b| !is_regular(*b));
        if whole {
            self.advance(keyword.len());
        }
        whole
    }

    /// A bare keyword such as `n`, `f` or `obj`.
    pub fn read_keyword(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.data[start..self.pos])
    }

    pub fn read_unsigned(&mut self) -> Option<u64> {
        self.skip_whitespace();
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            value = value.checked_mul(10)?.checked_add((b - b'0') as u64)?;
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(value)
    }

    /// `n g obj`, returning the object id.
    pub fn read_object_header(&mut self) -> Option<(u32, u16)> {
        let number = self.read_unsigned().filter(|n| *n <= u32::MAX as u64)?;
        let generation = self.read_unsigned().filter(|g| *g <= u16::MAX as u64)?;
        self.eat_keyword(b"obj")
            .then_some((number as u32, generation as u16))
    }

    /// A dictionary of direct values, as found in trailers and
    /// cross-reference stream headers.
    ///
    /// Numbers, names, booleans, `n g R` references and nested arrays or
    /// dictionaries of those are kept. Strings are skipped and recorded as
    /// `null` so their presence is still visible.
    pub fn read_dictionary(&mut self) -> Option<Dictionary> {
        self.skip_whitespace();
        if !self.rest().starts_with(b"<<") {
            return None;
        }
        self.advance(2);

        let mut dict = Dictionary::new();
        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'>' if self.rest().starts_with(b">>") => {
                    self.advance(2);
                    return Some(dict);
                }
                b'/' => {
                    self.advance(1);
                    let key = self.read_name_body();
                    let value = self.read_value()?;
                    dict.set(key, value);
                }
                _ => return None,
            }
        }
    }

    /// Raw bytes of the stream body following a dictionary.
    ///
    /// A direct `/Length` is trusted when `endstream` follows it; otherwise
    /// the body runs to the next `endstream`.
    pub fn read_stream_body(&mut self, dict: &Dictionary) -> Option<&'a [u8]> {
        if !self.eat_keyword(b"stream") {
            return None;
        }
        if self.rest().starts_with(b"\r\n") {
            self.advance(2);
        } else if self.rest().starts_with(b"\n") || self.rest().starts_with(b"\r") {
            self.advance(1);
        }
        let start = self.pos;

        if let Ok(Object::Integer(len)) = dict.get(b"Length") {
            let end = usize::try_from(*len).ok().and_then(|l| start.checked_add(l));
            if let Some(end) = end.filter(|e| *e <= self.data.len()) {
                let mut tail = Scanner::at(self.data, end);
                if tail.eat_keyword(b"endstream") {
                    self.pos = tail.pos;
                    return Some(&self.data[start..end]);
                }
            }
        }

        let rel = find_bytes(self.rest(), b"endstream")?;
        let mut end = start + rel;
        if self.data[..end].ends_with(b"\r\n") {
            end -= 2;
        } else if self.data[..end].ends_with(b"\n") || self.data[..end].ends_with(b"\r") {
            end -= 1;
        }
        self.pos = start + rel + b"endstream".len();
        Some(&self.data[start..end.max(start)])
    }

    fn read_name_body(&mut self) -> Vec<u8> {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        self.data[start..self.pos].to_vec()
    }

    fn read_value(&mut self) -> Option<Object> {
        self.skip_whitespace();
        match self.peek()? {
            b'/' => {
                self.advance(1);
                Some(Object::Name(self.read_name_body()))
            }
            b'0'..=b'9' => {
                let save = self.pos;
                let first = self.read_unsigned()?;
                if self.peek() == Some(b'.') {
                    self.pos = save;
                    return self.read_real();
                }
                let after_first = self.pos;
                if let Some(generation) = self.read_unsigned() {
                    if self.eat_keyword(b"R") && first <= u32::MAX as u64 && generation <= u16::MAX as u64 {
                        return Some(Object::Reference((first as u32, generation as u16)));
                    }
                }
                self.pos = after_first;
                Some(Object::Integer(first.min(i64::MAX as u64) as i64))
            }
            b'-' | b'+' | b'.' => self.read_real(),
            b'<' if self.rest().starts_with(b"<<") => self.read_dictionary().map(Object::Dictionary),
            b'[' => {
                self.advance(1);
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    if self.peek()? == b']' {
                        self.advance(1);
                        return Some(Object::Array(items));
                    }
                    items.push(self.read_value()?);
                }
            }
            b'(' => {
                self.skip_literal_string()?;
                Some(Object::Null)
            }
            b'<' => {
                let end = find_bytes(self.rest(), b">")?;
                self.advance(end + 1);
                Some(Object::Null)
            }
            b']' | b'>' | b')' | b'{' | b'}' => None,
            _ => match self.read_keyword()? {
                b"true" => Some(Object::Boolean(true)),
                b"false" => Some(Object::Boolean(false)),
                _ => Some(Object::Null),
            },
        }
    }

    fn read_real(&mut self) -> Option<Object> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.data[start..self.pos]).ok()?;
        match text.parse::<i64>() {
            Ok(i) => Some(Object::Integer(i)),
            Err(_) => text.parse::<f32>().ok().map(Object::Real),
        }
    }

    fn skip_literal_string(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            let b = self.peek()?;
            self.advance(1);
            match b {
                b'\\' => self.advance(1),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(());
                    }
                }
                _ => {}
            }
        }
    }
}

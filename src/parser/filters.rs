//! Stream filter decoding.
//!
//! Supported: `FlateDecode` (with PNG and TIFF predictors), `ASCIIHexDecode`
//! and `ASCII85Decode`. Anything else is reported as
//! [`Error::UnsupportedFilter`] instead of returning partial data.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{Error, Result};
use crate::model::value::{dict_of, entry, integer, name};
use crate::model::{Dictionary, Object, Stream};

use super::scan::is_whitespace;

/// Filter names of a stream, in application order.
pub fn filter_names(dict: &Dictionary) -> Vec<&[u8]> {
    match entry(dict, b"Filter") {
        Some(Object::Name(filter)) => vec![filter.as_slice()],
        Some(Object::Array(items)) => items.iter().filter_map(name).collect(),
        _ => Vec::new(),
    }
}

/// Decode a stream through every filter in its `/Filter` entry.
pub fn decode_stream(stream: &Stream) -> Result<Vec<u8>> {
    let filters = filter_names(&stream.dict);
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }

    let parms = decode_parms(&stream.dict, filters.len());
    let mut data = stream.content.clone();
    for (filter, parms) in filters.iter().zip(parms.iter()) {
        data = apply_filter(filter, &data, parms.as_ref())?;
    }
    Ok(data)
}

/// `/DecodeParms` aligned with the filter list.
fn decode_parms(dict: &Dictionary, count: usize) -> Vec<Option<Dictionary>> {
    match entry(dict, b"DecodeParms").or_else(|| entry(dict, b"DP")) {
        Some(Object::Dictionary(d)) => {
            let mut parms = vec![None; count];
            if let Some(first) = parms.first_mut() {
                *first = Some(d.clone());
            }
            parms
        }
        Some(Object::Array(items)) => (0..count)
            .map(|i| items.get(i).and_then(dict_of).cloned())
            .collect(),
        _ => vec![None; count],
    }
}

fn apply_filter(filter: &[u8], data: &[u8], parms: Option<&Dictionary>) -> Result<Vec<u8>> {
    match filter {
        b"FlateDecode" | b"Fl" => {
            let inflated = flate_decode(data)?;
            match parms {
                Some(parms) => apply_predictor(inflated, parms),
                None => Ok(inflated),
            }
        }
        b"ASCIIHexDecode" | b"AHx" => ascii_hex_decode(data),
        b"ASCII85Decode" | b"A85" => ascii85_decode(data),
        other => Err(Error::UnsupportedFilter(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}

/// Inflate zlib data.
pub fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 3);
    let mut decoder = ZlibDecoder::new(data);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(e) => Err(Error::StreamDecode(format!("FlateDecode: {}", e))),
    }
}

fn parm_usize(parms: &Dictionary, key: &[u8], default: usize) -> usize {
    entry(parms, key)
        .and_then(integer)
        .filter(|v| *v > 0)
        .map(|v| v as usize)
        .unwrap_or(default)
}

fn apply_predictor(data: Vec<u8>, parms: &Dictionary) -> Result<Vec<u8>> {
    let predictor = parm_usize(parms, b"Predictor", 1);
    if predictor == 1 {
        return Ok(data);
    }

    let colors = parm_usize(parms, b"Colors", 1);
    let bits = parm_usize(parms, b"BitsPerComponent", 8);
    let columns = parm_usize(parms, b"Columns", 1);
    let pixel_bits = colors
        .checked_mul(bits)
        .ok_or_else(|| Error::StreamDecode("predictor sample size overflows".into()))?;
    let bpp = pixel_bits.div_ceil(8).max(1);
    let row_len = pixel_bits
        .checked_mul(columns)
        .ok_or_else(|| Error::StreamDecode(format!("predictor row of {} columns overflows", columns)))?
        .div_ceil(8);
    if data.is_empty() {
        return Ok(data);
    }
    if row_len > data.len() {
        return Err(Error::StreamDecode(format!(
            "predictor row of {} bytes exceeds {} bytes of data",
            row_len,
            data.len()
        )));
    }

    match predictor {
        2 => tiff_predictor(data, bpp, row_len, bits),
        10..=15 => png_predictor(&data, bpp, row_len),
        other => Err(Error::StreamDecode(format!("unknown predictor {}", other))),
    }
}

fn tiff_predictor(mut data: Vec<u8>, bpp: usize, row_len: usize, bits: usize) -> Result<Vec<u8>> {
    if bits != 8 {
        return Err(Error::StreamDecode(format!(
            "TIFF predictor with {} bits per component",
            bits
        )));
    }
    if row_len == 0 {
        return Ok(data);
    }
    for row in data.chunks_mut(row_len) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(data)
}

fn png_predictor(data: &[u8], bpp: usize, row_len: usize) -> Result<Vec<u8>> {
    let stride = row_len + 1;
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];

    for chunk in data.chunks(stride) {
        if chunk.len() < 2 {
            break;
        }
        let filter_type = chunk[0];
        let mut row = chunk[1..].to_vec();
        row.resize(row_len, 0);

        for i in 0..row_len {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };
            row[i] = match filter_type {
                0 => row[i],
                1 => row[i].wrapping_add(left),
                2 => row[i].wrapping_add(up),
                3 => row[i].wrapping_add(((left as u16 + up as u16) / 2) as u8),
                4 => row[i].wrapping_add(paeth(left, up, up_left)),
                other => {
                    return Err(Error::StreamDecode(format!(
                        "invalid PNG row filter {}",
                        other
                    )))
                }
            };
        }
        out.extend_from_slice(&row);
        prev = row;
    }
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn ascii_hex_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;
    for &b in data {
        if b == b'>' {
            break;
        }
        if is_whitespace(b) {
            continue;
        }
        let value = (b as char)
            .to_digit(16)
            .ok_or_else(|| Error::StreamDecode(format!("ASCIIHexDecode: bad byte 0x{:02X}", b)))?
            as u8;
        match high.take() {
            Some(h) => out.push(h << 4 | value),
            None => high = Some(value),
        }
    }
    if let Some(h) = high {
        out.push(h << 4);
    }
    Ok(out)
}

fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut len = 0usize;

    let body = data.strip_prefix(b"<~").unwrap_or(data);
    for &b in body {
        match b {
            b'~' => break,
            b'z' if len == 0 => out.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[len] = b - b'!';
                len += 1;
                if len == 5 {
                    out.extend_from_slice(&ascii85_group(&group)?);
                    len = 0;
                }
            }
            b if is_whitespace(b) => {}
            other => {
                return Err(Error::StreamDecode(format!(
                    "ASCII85Decode: bad byte 0x{:02X}",
                    other
                )))
            }
        }
    }

    if len == 1 {
        return Err(Error::StreamDecode("ASCII85Decode: dangling byte".into()));
    }
    if len > 1 {
        for slot in group.iter_mut().skip(len) {
            *slot = b'u' - b'!';
        }
        let decoded = ascii85_group(&group)?;
        out.extend_from_slice(&decoded[..len - 1]);
    }
    Ok(out)
}

fn ascii85_group(group: &[u8; 5]) -> Result<[u8; 4]> {
    let value = group
        .iter()
        .try_fold(0u64, |acc, &d| Some(acc * 85 + d as u64))
        .filter(|v| *v <= u32::MAX as u64)
        .ok_or_else(|| Error::StreamDecode("ASCII85Decode: group overflow".into()))?;
    Ok((value as u32).to_be_bytes())
}

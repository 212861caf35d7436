//! Stream filter codec.
//!
//! Decoding supports the general-purpose filters (`FlateDecode`,
//! `LZWDecode`, `ASCIIHexDecode`, `ASCII85Decode`, `RunLengthDecode`) and the
//! PNG/TIFF predictors of `/DecodeParms`. Image codecs and `Crypt` are
//! reported as [`Filter::Unsupported`]. Encoding only produces `FlateDecode`.

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::{Read, Write};
use weezl::{BitOrder, LzwStatus, decode::Decoder};

use crate::{PdfMateError, Result};

/// A single stream filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `FlateDecode` (zlib/deflate).
    Flate,
    /// `LZWDecode`.
    Lzw,
    /// `ASCIIHexDecode`.
    AsciiHex,
    /// `ASCII85Decode`.
    Ascii85,
    /// `RunLengthDecode`.
    RunLength,
    /// Anything else, carrying the filter name.
    Unsupported(String),
}

impl Filter {
    /// Map a filter name, including the inline-image abbreviations.
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"FlateDecode" | b"Fl" => Self::Flate,
            b"LZWDecode" | b"LZW" => Self::Lzw,
            b"ASCIIHexDecode" | b"AHx" => Self::AsciiHex,
            b"ASCII85Decode" | b"A85" => Self::Ascii85,
            b"RunLengthDecode" | b"RL" => Self::RunLength,
            other => Self::Unsupported(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// Canonical filter name.
    pub fn name(&self) -> &str {
        match self {
            Self::Flate => "FlateDecode",
            Self::Lzw => "LZWDecode",
            Self::AsciiHex => "ASCIIHexDecode",
            Self::Ascii85 => "ASCII85Decode",
            Self::RunLength => "RunLengthDecode",
            Self::Unsupported(name) => name,
        }
    }

    /// Whether this crate can decode the filter.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// One filter of a chain together with its decode parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStep {
    /// The filter.
    pub filter: Filter,
    /// Resolved `/DecodeParms` entry for this filter, if any.
    pub params: Option<Dictionary>,
}

/// Read the `/Filter` and `/DecodeParms` entries of a stream dictionary.
///
/// Indirect values are resolved against `doc`. A stream without `/Filter`
/// yields an empty chain.
pub fn filter_chain(doc: &Document, dict: &Dictionary) -> Result<Vec<FilterStep>> {
    let filters = match dict.get(b"Filter") {
        Ok(object) => match doc.dereference(object)?.1 {
            Object::Name(name) => vec![Filter::from_name(name)],
            Object::Array(items) => items
                .iter()
                .map(|item| match doc.dereference(item)?.1 {
                    Object::Name(name) => Ok(Filter::from_name(name)),
                    other => Err(PdfMateError::malformed(format!(
                        "filter entry is a {} instead of a name",
                        other.enum_variant()
                    ))),
                })
                .collect::<Result<_>>()?,
            Object::Null => Vec::new(),
            other => {
                return Err(PdfMateError::malformed(format!(
                    "/Filter is a {} instead of a name or array",
                    other.enum_variant()
                )));
            }
        },
        Err(_) => Vec::new(),
    };

    let resolve_params = |object: &Object| -> Result<Option<Dictionary>> {
        match doc.dereference(object)?.1 {
            Object::Dictionary(params) => Ok(Some(params.clone())),
            _ => Ok(None),
        }
    };

    let params: Vec<Option<Dictionary>> = match dict.get(b"DecodeParms") {
        Ok(object) => match doc.dereference(object)?.1 {
            Object::Array(items) => items.iter().map(resolve_params).collect::<Result<_>>()?,
            other => vec![resolve_params(other)?],
        },
        Err(_) => Vec::new(),
    };

    Ok(filters
        .into_iter()
        .enumerate()
        .map(|(i, filter)| FilterStep {
            filter,
            params: params.get(i).cloned().flatten(),
        })
        .collect())
}

/// Decode a stream's content through its full filter chain.
///
/// Errors carry object id `(0, 0)`; callers that know the id attach it with
/// [`PdfMateError::for_object`].
pub fn decode_stream(doc: &Document, stream: &Stream) -> Result<Vec<u8>> {
    let chain = filter_chain(doc, &stream.dict)?;
    let decoded = decode_chain(&stream.content, &chain)?;

    if let Ok(expected) = stream.dict.get(b"DL").and_then(Object::as_i64)
        && decoded.len() as i64 != expected
    {
        return Err(PdfMateError::stream_encoding(
            (0, 0),
            chain_name(&chain),
            format!(
                "decoded {} bytes but /DL declares {expected}",
                decoded.len()
            ),
        ));
    }

    Ok(decoded)
}

/// Push raw bytes through a filter chain, first filter first.
pub fn decode_chain(data: &[u8], chain: &[FilterStep]) -> Result<Vec<u8>> {
    let mut data = data.to_vec();

    for step in chain {
        let filter = step.filter.name();
        data = match &step.filter {
            Filter::Flate => flate_decode(&data)?,
            Filter::Lzw => {
                let early_change = param(step.params.as_ref(), b"EarlyChange", 1);
                lzw_decode(&data, early_change != 0)?
            }
            Filter::AsciiHex => ascii_hex_decode(&data)?,
            Filter::Ascii85 => ascii85_decode(&data)?,
            Filter::RunLength => run_length_decode(&data),
            Filter::Unsupported(name) => {
                return Err(PdfMateError::UnsupportedFilter {
                    filter: name.clone(),
                });
            }
        };

        if let Some(params) = &step.params {
            data = apply_predictor(&data, params).map_err(|reason| {
                PdfMateError::stream_encoding((0, 0), filter, reason)
            })?;
        }
    }

    Ok(data)
}

/// Deflate `data` at `level` (0-9).
pub fn encode_flate(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2),
        Compression::new(level.min(9)),
    );
    let failed = |e: std::io::Error| PdfMateError::stream_encoding((0, 0), "FlateDecode", e.to_string());
    encoder.write_all(data).map_err(failed)?;
    encoder.finish().map_err(failed)
}

fn chain_name(chain: &[FilterStep]) -> String {
    if chain.is_empty() {
        return "(none)".to_string();
    }
    chain
        .iter()
        .map(|step| step.filter.name())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn param(params: Option<&Dictionary>, key: &[u8], default: i64) -> i64 {
    params
        .and_then(|p| p.get(key).ok())
        .and_then(|v| v.as_i64().ok())
        .unwrap_or(default)
}

fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        // Truncated streams and bad trailing checksums are common; keep what
        // inflated cleanly.
        Err(e) if !out.is_empty() => {
            tracing::debug!(error = %e, recovered = out.len(), "Accepting partial deflate output");
            Ok(out)
        }
        Err(e) => Err(PdfMateError::stream_encoding(
            (0, 0),
            "FlateDecode",
            e.to_string(),
        )),
    }
}

fn lzw_decode(data: &[u8], early_change: bool) -> Result<Vec<u8>> {
    let mut decoder = if early_change {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Decoder::new(BitOrder::Msb, 8)
    };
    let mut out = Vec::new();
    let result = decoder.into_vec(&mut out).decode(data);
    match result.status {
        Ok(LzwStatus::Ok | LzwStatus::Done | LzwStatus::NoProgress) => Ok(out),
        Err(_) if !out.is_empty() => Ok(out),
        Err(e) => Err(PdfMateError::stream_encoding(
            (0, 0),
            "LZWDecode",
            e.to_string(),
        )),
    }
}

fn ascii_hex_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for &byte in data {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            b'>' => break,
            b if b.is_ascii_whitespace() || b == 0 => continue,
            other => {
                return Err(PdfMateError::stream_encoding(
                    (0, 0),
                    "ASCIIHexDecode",
                    format!("invalid hex digit 0x{other:02x}"),
                ));
            }
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    // An odd final digit is followed by an implicit 0.
    if let Some(high) = pending {
        out.push(high << 4);
    }

    Ok(out)
}

fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let mut out = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut len = 0;

    let invalid = |reason: String| PdfMateError::stream_encoding((0, 0), "ASCII85Decode", reason);

    for &byte in data {
        match byte {
            b'~' => break,
            b'z' if len == 0 => out.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[len] = byte - b'!';
                len += 1;
                if len == 5 {
                    out.extend_from_slice(&ascii85_group(&group).ok_or_else(|| {
                        invalid("group value exceeds 32 bits".to_string())
                    })?);
                    len = 0;
                }
            }
            b if b.is_ascii_whitespace() || b == 0 => continue,
            other => return Err(invalid(format!("invalid character 0x{other:02x}"))),
        }
    }

    match len {
        0 => {}
        1 => return Err(invalid("final group has a single character".to_string())),
        n => {
            for slot in group.iter_mut().skip(n) {
                *slot = 84;
            }
            let bytes = ascii85_group(&group)
                .ok_or_else(|| invalid("group value exceeds 32 bits".to_string()))?;
            out.extend_from_slice(&bytes[..n - 1]);
        }
    }

    Ok(out)
}

fn ascii85_group(digits: &[u8; 5]) -> Option<[u8; 4]> {
    let value = digits
        .iter()
        .fold(0u64, |acc, &d| acc * 85 + u64::from(d));
    u32::try_from(value).ok().map(u32::to_be_bytes)
}

fn run_length_decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i];
        i += 1;
        match length {
            128 => break,
            0..=127 => {
                let end = (i + length as usize + 1).min(data.len());
                out.extend_from_slice(&data[i..end]);
                i = end;
            }
            129..=255 => {
                if let Some(&byte) = data.get(i) {
                    out.extend(std::iter::repeat_n(byte, 257 - length as usize));
                    i += 1;
                }
            }
        }
    }

    out
}

fn apply_predictor(data: &[u8], params: &Dictionary) -> std::result::Result<Vec<u8>, String> {
    let predictor = param(Some(params), b"Predictor", 1);
    if predictor < 2 || data.is_empty() {
        return Ok(data.to_vec());
    }

    let layout = RowLayout::new(
        data.len(),
        param(Some(params), b"Colors", 1),
        param(Some(params), b"BitsPerComponent", 8),
        param(Some(params), b"Columns", 1),
    )?;

    match predictor {
        2 => tiff_predictor(data, &layout),
        10..=15 => png_predictor(data, &layout),
        other => Err(format!("unknown predictor {other}")),
    }
}

/// Row geometry of predicted image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowLayout {
    colors: usize,
    bits: usize,
    /// Bytes per row, excluding the PNG filter-type byte.
    row_len: usize,
    /// Bytes per pixel, at least 1.
    bpp: usize,
}

impl RowLayout {
    /// Validate `/DecodeParms` geometry against `data_len` bytes of input.
    ///
    /// A row is never longer than the data it is read from.
    fn new(
        data_len: usize,
        colors: i64,
        bits: i64,
        columns: i64,
    ) -> std::result::Result<Self, String> {
        let positive = |name: &str, value: i64| {
            usize::try_from(value)
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| format!("/{name} {value} is not a positive integer"))
        };
        let colors = positive("Colors", colors)?;
        let bits = positive("BitsPerComponent", bits)?;
        let columns = positive("Columns", columns)?;
        if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
            return Err(format!("/BitsPerComponent {bits} is not 1, 2, 4, 8 or 16"));
        }

        let pixel_bits = colors
            .checked_mul(bits)
            .ok_or_else(|| format!("/Colors {colors} overflows the pixel size"))?;
        let row_bits = pixel_bits
            .checked_mul(columns)
            .ok_or_else(|| format!("/Columns {columns} overflows the row size"))?;
        let row_len = row_bits.div_ceil(8);
        if row_len > data_len {
            return Err(format!(
                "row of {row_len} bytes is longer than the {data_len} bytes of data"
            ));
        }

        Ok(Self {
            colors,
            bits,
            row_len,
            bpp: pixel_bits.div_ceil(8).max(1),
        })
    }
}

fn tiff_predictor(data: &[u8], layout: &RowLayout) -> std::result::Result<Vec<u8>, String> {
    let RowLayout {
        colors,
        bits,
        row_len,
        ..
    } = *layout;
    if bits != 8 {
        return Err(format!(
            "TIFF predictor with {bits} bits per component is not supported"
        ));
    }
    let mut out = Vec::with_capacity(data.len());
    for row in data.chunks(row_len) {
        let start = out.len();
        for (i, &byte) in row.iter().enumerate() {
            let left = if i >= colors { out[start + i - colors] } else { 0 };
            out.push(byte.wrapping_add(left));
        }
    }
    Ok(out)
}

fn png_predictor(data: &[u8], layout: &RowLayout) -> std::result::Result<Vec<u8>, String> {
    let RowLayout { row_len, bpp, .. } = *layout;
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];

    for row in data.chunks(row_len + 1) {
        if row.len() < 2 {
            break;
        }
        let (kind, encoded) = (row[0], &row[1..]);
        let mut current = vec![0u8; encoded.len()];

        for i in 0..encoded.len() {
            let left = if i >= bpp { current[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };
            let predicted = match kind {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                other => return Err(format!("invalid PNG row filter {other}")),
            };
            current[i] = encoded[i].wrapping_add(predicted);
        }

        out.extend_from_slice(&current);
        prev[..current.len()].copy_from_slice(&current);
    }

    Ok(out)
}

const fn paeth(a: u8, b: u8, c: u8) -> u8 {
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

//! PDF cross-reference parsing, table and stream forms.

use crate::error::ParseError;
use crate::object::{Object, PdfStream};
use crate::parser::lexer::{is_whitespace, parse_integer, skip_whitespace};
use std::collections::BTreeMap;

/// Where an in-use object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectLocation {
    /// At an absolute byte offset in the file.
    Offset(u64),
    /// Inside a compressed object stream (PDF 1.5+).
    InStream {
        /// Object number of the containing stream.
        stream: u32,
        /// Position within the stream.
        index: u32,
    },
}

/// Object locations accumulated across all revisions of a document.
///
/// Revisions are visited newest first, so recording keeps the first
/// location seen for an id. Free entries are kept as `None`: they shadow
/// older in-use entries and still count towards the highest id.
#[derive(Debug, Default)]
pub struct XrefTable {
    entries: BTreeMap<u32, Option<ObjectLocation>>,
}

impl XrefTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry unless a newer revision already defined the id.
    pub fn record(&mut self, id: u32, location: Option<ObjectLocation>) {
        self.entries.entry(id).or_insert(location);
    }

    /// Looks up where an object lives. Free and unknown ids yield None.
    pub fn location(&self, id: u32) -> Option<ObjectLocation> {
        self.entries.get(&id).copied().flatten()
    }

    /// The highest object id any revision mentions.
    pub fn highest_id(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// Number of ids the table knows about.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no revision contributed any entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which form of cross-reference the newest revision of a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefKind {
    /// A textual `xref` table followed by a `trailer` dictionary.
    Table,
    /// A cross-reference stream object (PDF 1.5+).
    Stream,
}

/// Byte-level geometry of the newest cross-reference section, used when
/// appending an incremental update.
#[derive(Debug, Clone, Copy)]
pub struct XrefInformation {
    /// Form of the newest xref section.
    pub kind: XrefKind,
    /// Value of the trailer's `/Size` entry.
    pub item_count: i64,
    /// Byte offset of the newest xref section (the `startxref` target).
    pub start_pos: u64,
    /// Offset of the last byte of the xref table, immediately before the
    /// `trailer` keyword. Only meaningful for the table form.
    pub end_pos: u64,
    /// Offset of the last byte of the `startxref` line's EOL, so that
    /// `(end_pos, including_trailer_end_pos]` spans
    /// `trailer ... startxref\n`. Only meaningful for the table form.
    pub including_trailer_end_pos: u64,
}

/// Reads the `startxref` pointer from the file epilogue.
///
/// The pointer sits between the last `startxref` keyword and `%%EOF`,
/// within the final kilobyte of the file.
pub fn read_startxref(data: &[u8]) -> Result<u64, ParseError> {
    let keyword = b"startxref";
    let tail_len = data.len().min(1024);
    let tail = &data[data.len() - tail_len..];

    let at = tail
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .ok_or(ParseError::InvalidTrailer)?;

    let (rest, _) =
        skip_whitespace(&tail[at + keyword.len()..]).map_err(|_| ParseError::InvalidTrailer)?;
    let (_, value) = parse_integer(rest).map_err(|_| ParseError::InvalidTrailer)?;
    u64::try_from(value).map_err(|_| ParseError::InvalidTrailer)
}

/// Parses a textual xref section starting at `offset` (which must point
/// at the `xref` keyword), recording its entries into `table`. Returns
/// the absolute offset of the `trailer` keyword that follows the section.
pub fn parse_xref_table_at(
    data: &[u8],
    offset: u64,
    table: &mut XrefTable,
) -> Result<u64, ParseError> {
    let section = data.get(offset as usize..).ok_or(ParseError::InvalidXref)?;
    if !section.starts_with(b"xref") {
        return Err(ParseError::InvalidXref);
    }

    let mut rest = &section[4..];

    loop {
        let (input, _) = skip_whitespace(rest).map_err(|_| ParseError::InvalidXref)?;
        rest = input;

        if rest.starts_with(b"trailer") {
            return Ok(offset + (section.len() - rest.len()) as u64);
        }

        // Subsection header: first_id count
        let (first_id, input) = read_uint(rest)?;
        let (count, input) = read_uint(skip_ws(input))?;
        rest = skip_ws(input);

        for i in 0..count {
            let (location, input) = parse_table_entry(rest)?;
            table.record(first_id as u32 + i as u32, location);
            rest = input;
        }
    }
}

/// Parses a single 20-byte table entry: `nnnnnnnnnn ggggg n\r\n`. Free
/// entries decode to None.
fn parse_table_entry(input: &[u8]) -> Result<(Option<ObjectLocation>, &[u8]), ParseError> {
    let input = skip_ws(input);
    let (offset, input) = read_uint(input)?;
    let (_generation, input) = read_uint(skip_ws(input))?;
    let input = skip_ws(input);

    let flag = *input.first().ok_or(ParseError::InvalidXref)?;
    let location = match flag {
        b'n' => Some(ObjectLocation::Offset(offset)),
        b'f' => None,
        _ => return Err(ParseError::InvalidXref),
    };

    Ok((location, &input[1..]))
}

fn skip_ws(input: &[u8]) -> &[u8] {
    let end = input
        .iter()
        .position(|c| !is_whitespace(*c))
        .unwrap_or(input.len());
    &input[end..]
}

fn read_uint(input: &[u8]) -> Result<(u64, &[u8]), ParseError> {
    let end = input
        .iter()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return Err(ParseError::InvalidXref);
    }
    let value = std::str::from_utf8(&input[..end])
        .map_err(|_| ParseError::InvalidXref)?
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidXref)?;
    Ok((value, &input[end..]))
}

/// Parses the entries of a cross-reference stream (PDF 1.5+) into
/// `table`.
pub fn parse_xref_stream(stream: &PdfStream, table: &mut XrefTable) -> Result<(), ParseError> {
    let dict = &stream.dictionary;

    let widths = match dict.get("W") {
        Some(Object::Array(arr)) if arr.len() == 3 => arr,
        _ => return Err(ParseError::InvalidXrefStream),
    };
    let w: Vec<usize> = widths
        .iter()
        .map(|o| o.as_integer().map(|n| n as usize))
        .collect::<Option<_>>()
        .ok_or(ParseError::InvalidXrefStream)?;
    let entry_size = w[0] + w[1] + w[2];
    if entry_size == 0 {
        return Err(ParseError::InvalidXrefStream);
    }

    let size = dict
        .get("Size")
        .and_then(Object::as_integer)
        .ok_or(ParseError::InvalidXrefStream)? as u32;

    let index: Vec<(u32, u32)> = match dict.get("Index") {
        Some(Object::Array(arr)) => {
            let mut pairs = Vec::new();
            let mut iter = arr.iter();
            while let (Some(start), Some(count)) = (iter.next(), iter.next()) {
                match (start.as_integer(), count.as_integer()) {
                    (Some(s), Some(c)) => pairs.push((s as u32, c as u32)),
                    _ => return Err(ParseError::InvalidXrefStream),
                }
            }
            pairs
        }
        _ => vec![(0, size)],
    };

    let raw = stream.decoded_data()?;
    let data = apply_predictor(raw, dict, entry_size)?;

    let mut pos = 0;
    for (start, count) in index {
        for i in 0..count {
            if pos + entry_size > data.len() {
                return Err(ParseError::InvalidXrefStream);
            }
            let entry_type = if w[0] == 0 {
                1 // default type is "in use"
            } else {
                read_be(&data[pos..pos + w[0]])
            };
            let field2 = read_be(&data[pos + w[0]..pos + w[0] + w[1]]);
            let field3 = read_be(&data[pos + w[0] + w[1]..pos + entry_size]);

            let location = match entry_type {
                0 => None,
                1 => Some(ObjectLocation::Offset(field2)),
                2 => Some(ObjectLocation::InStream {
                    stream: field2 as u32,
                    index: field3 as u32,
                }),
                _ => return Err(ParseError::InvalidXrefStream),
            };

            table.record(start + i, location);
            pos += entry_size;
        }
    }

    Ok(())
}

/// Reads a big-endian integer from up to 8 bytes.
fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Undo a PNG row predictor if the stream declares one in `/DecodeParms`.
fn apply_predictor(
    data: Vec<u8>,
    dict: &crate::object::PdfDictionary,
    entry_size: usize,
) -> Result<Vec<u8>, ParseError> {
    let parms = match dict.get("DecodeParms") {
        Some(Object::Dictionary(d)) => d,
        _ => return Ok(data),
    };
    let predictor = parms
        .get("Predictor")
        .and_then(Object::as_integer)
        .unwrap_or(1);
    if predictor < 10 {
        return Ok(data);
    }
    let columns = parms
        .get("Columns")
        .and_then(Object::as_integer)
        .unwrap_or(entry_size as i64) as usize;

    let row_size = columns + 1;
    if columns == 0 || data.len() % row_size != 0 {
        return Err(ParseError::InvalidXrefStream);
    }

    let mut out = Vec::with_capacity(data.len() / row_size * columns);
    let mut prev_row = vec![0u8; columns];

    for row in data.chunks(row_size) {
        let filter = row[0];
        let mut decoded = row[1..].to_vec();
        match filter {
            0 => {}
            1 => {
                for i in 1..columns {
                    decoded[i] = decoded[i].wrapping_add(decoded[i - 1]);
                }
            }
            2 => {
                for i in 0..columns {
                    decoded[i] = decoded[i].wrapping_add(prev_row[i]);
                }
            }
            3 => {
                for i in 0..columns {
                    let left = if i > 0 { decoded[i - 1] as u16 } else { 0 };
                    let up = prev_row[i] as u16;
                    decoded[i] = decoded[i].wrapping_add(((left + up) / 2) as u8);
                }
            }
            4 => {
                for i in 0..columns {
                    let left = if i > 0 { decoded[i - 1] as i16 } else { 0 };
                    let up = prev_row[i] as i16;
                    let up_left = if i > 0 { prev_row[i - 1] as i16 } else { 0 };
                    let p = left + up - up_left;
                    let (pa, pb, pc) = ((p - left).abs(), (p - up).abs(), (p - up_left).abs());
                    let paeth = if pa <= pb && pa <= pc {
                        left
                    } else if pb <= pc {
                        up
                    } else {
                        up_left
                    };
                    decoded[i] = decoded[i].wrapping_add(paeth as u8);
                }
            }
            _ => return Err(ParseError::InvalidXrefStream),
        }
        out.extend_from_slice(&decoded);
        prev_row = decoded;
    }

    Ok(out)
}

//! PDF parsing module.
//!
//! Provides read-only access to the structure of an existing PDF: trailer,
//! cross-reference (table or stream form), and indirect objects. This is
//! the input side of the signing pipeline; the output side only ever
//! appends to a copy of the original bytes.

mod lexer;
mod objects;
mod trailer;
mod value;
mod xref;

pub use trailer::Trailer;
pub use value::{Value, ValueKind};
pub use xref::{ObjectLocation, XrefInformation, XrefKind, XrefTable};

use crate::error::{ParseError, SignResult};
use crate::object::Object;
use crate::types::ObjectId;
use objects::parse_indirect_object;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use trailer::parse_trailer;
use xref::{parse_xref_stream, parse_xref_table_at, read_startxref};

/// A PDF document reader.
#[derive(Debug)]
pub struct PdfReader {
    data: Vec<u8>,
    xref: XrefTable,
    trailer: Trailer,
    xref_info: XrefInformation,
}

impl PdfReader {
    /// Opens a PDF file for reading.
    pub fn from_file(path: impl AsRef<Path>) -> SignResult<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens a PDF from bytes.
    pub fn from_bytes(data: Vec<u8>) -> SignResult<Self> {
        if !data.starts_with(b"%PDF-") {
            return Err(ParseError::InvalidHeader.into());
        }

        let start_pos = read_startxref(&data)?;
        let (xref, trailer, xref_info) = Self::parse_revisions(&data, start_pos)?;

        if trailer.dict.contains_key("Encrypt") {
            return Err(ParseError::EncryptedPdf.into());
        }

        Ok(Self {
            data,
            xref,
            trailer,
            xref_info,
        })
    }

    /// Follows the xref chain from the newest revision backwards. Entries
    /// are recorded newest-first and the newest trailer is authoritative.
    fn parse_revisions(
        data: &[u8],
        start_pos: u64,
    ) -> Result<(XrefTable, Trailer, XrefInformation), ParseError> {
        let mut table = XrefTable::new();
        let mut newest_trailer: Option<Trailer> = None;
        let mut info: Option<XrefInformation> = None;

        let mut offset = start_pos;
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(offset) {
                return Err(ParseError::InvalidXref);
            }

            let section = data.get(offset as usize..).ok_or(ParseError::InvalidXref)?;
            let prev;

            if section.starts_with(b"xref") {
                let trailer_offset = parse_xref_table_at(data, offset, &mut table)?;

                let trailer_slice = &data[trailer_offset as usize..];
                let (rest, dict) =
                    parse_trailer(trailer_slice).map_err(|_| ParseError::InvalidTrailer)?;

                if info.is_none() {
                    let after_dict = trailer_offset + (trailer_slice.len() - rest.len()) as u64;
                    let including_trailer_end_pos = trailer_epilogue_end(data, after_dict)?;
                    info = Some(XrefInformation {
                        kind: XrefKind::Table,
                        item_count: 0, // patched below from the trailer
                        start_pos,
                        end_pos: trailer_offset - 1,
                        including_trailer_end_pos,
                    });
                }

                let trailer = Trailer::from_dictionary(dict)?;
                prev = trailer.prev;
                if newest_trailer.is_none() {
                    newest_trailer = Some(trailer);
                }
            } else {
                // Cross-reference stream (PDF 1.5+).
                let (_, (_, _, obj)) =
                    parse_indirect_object(section).map_err(|_| ParseError::InvalidXrefStream)?;
                let stream = match obj {
                    Object::Stream(s) => s,
                    _ => return Err(ParseError::InvalidXrefStream),
                };

                parse_xref_stream(&stream, &mut table)?;
                let trailer = Trailer::from_dictionary(stream.dictionary)?;

                if info.is_none() {
                    info = Some(XrefInformation {
                        kind: XrefKind::Stream,
                        item_count: 0,
                        start_pos,
                        end_pos: 0,
                        including_trailer_end_pos: 0,
                    });
                }

                prev = trailer.prev;
                if newest_trailer.is_none() {
                    newest_trailer = Some(trailer);
                }
            }

            match prev {
                Some(p) => offset = p,
                None => break,
            }
        }

        let trailer = newest_trailer.ok_or(ParseError::InvalidTrailer)?;
        let mut info = info.ok_or(ParseError::InvalidXref)?;
        info.item_count = trailer.size;

        Ok((table, trailer, info))
    }

    /// Returns the raw input bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the cross-reference table accumulated over all revisions.
    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    /// Returns the geometry of the newest cross-reference section.
    pub fn xref_information(&self) -> &XrefInformation {
        &self.xref_info
    }

    /// Returns the newest trailer dictionary as a typed accessor value.
    pub fn trailer(&self) -> Value<'_> {
        Value::new(
            self,
            ObjectId::new(0),
            Object::Dictionary(self.trailer.dict.clone()),
        )
    }

    /// Returns the parsed trailer record.
    pub fn trailer_info(&self) -> &Trailer {
        &self.trailer
    }

    /// Resolves an object by id, returning None for free or unknown ids.
    pub fn resolve(&self, id: ObjectId) -> Option<Object> {
        match self.xref.location(id.number)? {
            ObjectLocation::Offset(offset) => {
                let data = self.data.get(offset as usize..)?;
                let (_, (_, _, obj)) = parse_indirect_object(data).ok()?;
                Some(obj)
            }
            ObjectLocation::InStream { stream, index } => self.resolve_compressed(stream, index),
        }
    }

    /// Resolves an object stored inside a compressed object stream.
    fn resolve_compressed(&self, stream_num: u32, index: u32) -> Option<Object> {
        let offset = match self.xref.location(stream_num)? {
            ObjectLocation::Offset(offset) => offset,
            ObjectLocation::InStream { .. } => return None,
        };
        let data = self.data.get(offset as usize..)?;
        let (_, (_, _, stream_obj)) = parse_indirect_object(data).ok()?;

        let stream = match stream_obj {
            Object::Stream(s) => s,
            _ => return None,
        };

        let num_objects = stream.dictionary.get("N")?.as_integer()? as usize;
        let first = stream.dictionary.get("First")?.as_integer()? as usize;

        let decoded = stream.decoded_data().ok()?;
        if first > decoded.len() {
            return None;
        }

        // Header: N pairs of (object number, relative offset).
        let header = std::str::from_utf8(&decoded[..first]).ok()?;
        let nums: Vec<usize> = header
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if nums.len() < (index as usize + 1) * 2 {
            return None;
        }

        let objects_data = &decoded[first..];
        let obj_offset = nums[index as usize * 2 + 1];
        let next_offset = if (index as usize + 1) < num_objects
            && nums.len() >= (index as usize + 2) * 2
        {
            nums[(index as usize + 1) * 2 + 1]
        } else {
            objects_data.len()
        };

        let obj_data = objects_data.get(obj_offset..next_offset)?;
        let (_, obj) = objects::parse_object(obj_data).ok()?;
        Some(obj)
    }
}

/// Finds the end of the `startxref` line that follows a trailer dictionary,
/// returning the absolute offset of the last EOL byte.
fn trailer_epilogue_end(data: &[u8], from: u64) -> Result<u64, ParseError> {
    let window = data.get(from as usize..).ok_or(ParseError::InvalidTrailer)?;
    let pos = window
        .windows(9)
        .position(|w| w == b"startxref")
        .ok_or(ParseError::InvalidTrailer)?;

    let mut i = pos + 9;
    while i < window.len() && (window[i] == b' ' || window[i] == b'\t') {
        i += 1;
    }
    if i < window.len() && window[i] == b'\r' {
        i += 1;
    }
    if i < window.len() && window[i] == b'\n' {
        i += 1;
    }
    if i == pos + 9 {
        return Err(ParseError::InvalidTrailer);
    }
    Ok(from + i as u64 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal 4-object PDF with a textual xref table and
    /// accurate offsets.
    pub(crate) fn minimal_pdf() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::new();
        offsets.push(out.len());
        out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        offsets.push(out.len());
        out.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
        offsets.push(out.len());
        out.extend_from_slice(
            b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n",
        );

        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
        for off in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        out.extend_from_slice(b"trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n%%EOF\n", xref_start).as_bytes());
        out
    }

    #[test]
    fn test_parse_minimal_pdf() {
        let reader = PdfReader::from_bytes(minimal_pdf()).unwrap();
        let info = reader.xref_information();

        assert_eq!(info.kind, XrefKind::Table);
        assert_eq!(info.item_count, 4);
        assert_eq!(reader.xref().highest_id(), Some(3));

        // The trailer segment spans "trailer ... startxref\n".
        let segment = &reader.data()
            [info.end_pos as usize + 1..=info.including_trailer_end_pos as usize];
        assert!(segment.starts_with(b"trailer"));
        assert!(segment.ends_with(b"startxref\n"));
    }

    #[test]
    fn test_value_navigation() {
        let reader = PdfReader::from_bytes(minimal_pdf()).unwrap();
        let root = reader.trailer().key("Root");
        assert_eq!(root.kind(), ValueKind::Dict);
        assert_eq!(root.ptr().number, 1);
        assert_eq!(root.key("Type").name(), "Catalog");

        let pages = root.key("Pages");
        assert_eq!(pages.ptr().number, 2);
        assert_eq!(pages.key("Count").int64(), 1);

        let kids = pages.key("Kids");
        assert_eq!(kids.len(), 1);
        assert_eq!(kids.index(0).key("Type").name(), "Page");
        assert!(root.key("AcroForm").is_null());
    }

    #[test]
    fn test_invalid_header() {
        assert!(PdfReader::from_bytes(b"not a pdf".to_vec()).is_err());
    }

    #[test]
    fn test_encrypted_rejected() {
        let pdf = minimal_pdf();
        let patched = String::from_utf8(pdf)
            .unwrap()
            .replace("/Size 4", "/Size 4 /Encrypt 9 0 R");
        assert!(matches!(
            PdfReader::from_bytes(patched.into_bytes()),
            Err(crate::error::SignError::Parse(ParseError::EncryptedPdf))
        ));
    }
}

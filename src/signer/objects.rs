//! Appending indirect objects to the incremental update.

use super::{SignContext, XrefRecord};
use crate::error::{ParseError, SignResult};

impl SignContext<'_> {
    /// Appends a new indirect object and returns its id.
    ///
    /// Ids are assigned above the input's highest object id; the recorded
    /// offset points at the first byte of the `<id> 0 obj` header (one
    /// past the separating newline).
    pub(crate) fn add_object(&mut self, object: &[u8]) -> SignResult<u32> {
        if self.last_xref_id == 0 {
            self.last_xref_id = self.last_object_id_from_xref()?;
        }

        let object_id = self.last_xref_id + self.new_xref_entries.len() as u32 + 1;
        self.new_xref_entries.push(XrefRecord {
            id: object_id,
            offset: self.output.len() as u64 + 1,
        });

        self.write_object(object_id, object);
        Ok(object_id)
    }

    /// Appends a new revision of an existing object. The prior revision
    /// keeps its bytes; the updated xref entry supersedes it.
    pub(crate) fn update_object(&mut self, id: u32, object: &[u8]) {
        self.updated_xref_entries.push(XrefRecord {
            id,
            offset: self.output.len() as u64 + 1,
        });
        self.write_object(id, object);
    }

    fn write_object(&mut self, id: u32, object: &[u8]) {
        self.output
            .extend_from_slice(format!("\n{} 0 obj\n", id).as_bytes());
        self.output.extend_from_slice(trim_bytes(object));
        self.output.extend_from_slice(b"\nendobj\n");
    }

    /// One past the highest object id of the input xref.
    fn last_object_id_from_xref(&self) -> SignResult<u32> {
        let highest = self
            .reader
            .xref()
            .highest_id()
            .ok_or(ParseError::EmptyXref)?;
        Ok(highest + 1)
    }
}

/// Strips surrounding PDF whitespace.
fn trim_bytes(bytes: &[u8]) -> &[u8] {
    let is_ws = |c: &u8| matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0');
    let start = bytes.iter().position(|c| !is_ws(c)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|c| !is_ws(c)).map_or(start, |p| p + 1);
    &bytes[start..end]
}

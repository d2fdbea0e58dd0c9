//! Incremental cross-reference writers, table and stream forms.

use super::SignContext;
use crate::error::{ParseError, SignResult};
use crate::parser::XrefKind;

impl SignContext<'_> {
    /// Writes the incremental cross-reference in the same form the input
    /// uses, recording its byte offset for `startxref`.
    pub(crate) fn write_xref(&mut self) -> SignResult<()> {
        self.output.push(b'\n');
        self.new_xref_start = self.output.len() as u64;

        match self.reader.xref_information().kind {
            XrefKind::Table => self.write_incr_xref_table(),
            XrefKind::Stream => self.write_xref_stream(),
        }
    }

    /// Table form: one single-entry subsection per updated object, then
    /// one subsection covering the new objects.
    fn write_incr_xref_table(&mut self) -> SignResult<()> {
        self.output.extend_from_slice(b"xref\n");

        for entry in &self.updated_xref_entries {
            self.output
                .extend_from_slice(format!("{} 1\n", entry.id).as_bytes());
            self.output
                .extend_from_slice(format!("{:010} 00000 n\r\n", entry.offset).as_bytes());
        }

        self.output.extend_from_slice(
            format!(
                "{} {}\n",
                self.last_xref_id + 1,
                self.new_xref_entries.len()
            )
            .as_bytes(),
        );
        for entry in &self.new_xref_entries {
            self.output
                .extend_from_slice(format!("{:010} 00000 n\r\n", entry.offset).as_bytes());
        }

        Ok(())
    }

    /// Stream form: a Flate-compressed `[type, offset(4BE), generation]`
    /// row per entry, wrapped in an indirect `/XRef` stream object that
    /// also carries the trailer keys.
    fn write_xref_stream(&mut self) -> SignResult<()> {
        let mut rows = Vec::new();
        for entry in self
            .updated_xref_entries
            .iter()
            .chain(self.new_xref_entries.iter())
        {
            write_xref_stream_line(&mut rows, 1, entry.offset as u32, 0);
        }

        let stream_bytes = flate_compress(&rows)?;

        let info = self.reader.xref_information();
        let mut total_entries = info.item_count;

        let mut index = Vec::new();
        for entry in &self.updated_xref_entries {
            index.push(entry.id);
            index.push(1);
        }
        if !self.new_xref_entries.is_empty() {
            index.push(self.last_xref_id + 1);
            index.push(self.new_xref_entries.len() as u32);
            total_entries += self.new_xref_entries.len() as i64;
        }

        let mut object = Vec::new();
        object.extend_from_slice(b"<< /Type /XRef\n");
        object.extend_from_slice(format!("  /Length {}\n", stream_bytes.len()).as_bytes());
        object.extend_from_slice(b"  /Filter /FlateDecode\n");
        object.extend_from_slice(b"  /W [ 1 4 1 ]\n");
        object.extend_from_slice(format!("  /Prev {}\n", info.start_pos).as_bytes());
        object.extend_from_slice(format!("  /Size {}\n", total_entries + 1).as_bytes());

        if !index.is_empty() {
            object.extend_from_slice(b"  /Index [");
            for idx in &index {
                object.extend_from_slice(format!(" {}", idx).as_bytes());
            }
            object.extend_from_slice(b" ]\n");
        }

        object.extend_from_slice(
            format!("  /Root {} 0 R\n", self.catalog_data.object_id).as_bytes(),
        );

        let id = self.reader.trailer().key("ID");
        if !id.is_null() {
            let id0 = hex::encode(id.index(0).raw_string());
            let id1 = hex::encode(id.index(1).raw_string());
            object.extend_from_slice(format!("  /ID [<{}><{}>]\n", id0, id1).as_bytes());
        }

        object.extend_from_slice(b">>\n");
        object.extend_from_slice(b"stream\n");
        object.extend_from_slice(&stream_bytes);
        object.extend_from_slice(b"\nendstream\n");

        self.add_object(&object)?;
        Ok(())
    }
}

/// Appends one `[type, offset, generation]` row with `/W [1 4 1]` widths.
fn write_xref_stream_line(buf: &mut Vec<u8>, entry_type: u8, offset: u32, generation: u8) {
    buf.push(entry_type);
    buf.extend_from_slice(&offset.to_be_bytes());
    buf.push(generation);
}

fn flate_compress(data: &[u8]) -> SignResult<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ParseError::Decompression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ParseError::Decompression(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xref_stream_line_layout() {
        let mut buf = Vec::new();
        write_xref_stream_line(&mut buf, 1, 0x01020304, 0);
        assert_eq!(buf, vec![1, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_flate_roundtrip() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let compressed = flate_compress(b"row data").unwrap();
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"row data");
    }
}

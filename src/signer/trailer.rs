//! Trailer and file epilogue for the signed revision.

use super::SignContext;
use crate::error::SignResult;
use crate::parser::XrefKind;

impl SignContext<'_> {
    /// Writes the trailer for the incremental update.
    ///
    /// Table inputs get a textual copy of the original trailer with
    /// `/Root`, `/Size` and `/Prev` substituted; stream inputs only need
    /// the `startxref` epilogue because the xref stream object carries
    /// the trailer keys itself.
    pub(crate) fn write_trailer(&mut self) -> SignResult<()> {
        let info = self.reader.xref_information();

        if info.kind == XrefKind::Table {
            let segment = &self.reader.data()
                [info.end_pos as usize + 1..=info.including_trailer_end_pos as usize];
            let mut trailer = String::from_utf8_lossy(segment).into_owned();

            let old_root = format!("Root {}", self.catalog_data.root_string);
            let new_root = format!("Root {} 0 R", self.catalog_data.object_id);

            let old_size = format!("Size {}", info.item_count);
            let new_size = format!(
                "Size {}",
                info.item_count + self.new_xref_entries.len() as i64 + 1
            );

            let new_prev = format!("Prev {}", info.start_pos);

            trailer = trailer.replace(&old_root, &new_root);
            trailer = trailer.replace(&old_size, &new_size);

            let prev_value = self.reader.trailer().key("Prev");
            if prev_value.is_null() {
                // First incremental update: chain the original xref in
                // after the /Root entry.
                let root_with_prev = format!("{}\n  /{}", new_root, new_prev);
                trailer = trailer.replace(&new_root, &root_with_prev);
            } else {
                let old_prev = format!("Prev {}", prev_value.int64());
                trailer = trailer.replace(&old_prev, &new_prev);
            }

            let lines: Vec<String> = trailer
                .split('\n')
                .map(|line| {
                    if line.starts_with(' ') {
                        format!("    {}", line.trim())
                    } else {
                        line.to_string()
                    }
                })
                .collect();
            trailer = lines.join("\n");

            self.output.extend_from_slice(trailer.as_bytes());
        } else {
            self.output.extend_from_slice(b"startxref\n");
        }

        self.output
            .extend_from_slice(format!("{}\n", self.new_xref_start).as_bytes());
        self.output.extend_from_slice(b"%%EOF\n");

        Ok(())
    }
}

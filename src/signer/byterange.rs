//! Byte-range patching and signature insertion.
//!
//! The `/ByteRange` array describes the file's own geometry, so it can
//! only be written once the file is complete: locate the `/Contents`
//! hole, compute the four integers, patch the fixed-width placeholder in
//! place, and finally write the hex signature into the hole.

use super::placeholder::BYTE_RANGE_PLACEHOLDER;
use super::SignContext;
use crate::error::{SignResult, SignatureError};

impl SignContext<'_> {
    /// Computes `[0, b, c, d]` and patches the `/ByteRange` placeholder.
    ///
    /// `b` is the offset of the `<` that opens the `/Contents` hole, `c`
    /// the offset just past the closing `>`, and `d` the remaining tail.
    /// The patched string is right-padded with spaces to exactly the
    /// placeholder's width.
    pub(crate) fn update_byte_range(&mut self) -> SignResult<()> {
        let hole = vec![b'0'; self.signature_max_length];
        let contents_index = find(&self.output, &hole)
            .ok_or(SignatureError::PlaceholderNotFound("/Contents"))?;

        let start = contents_index as i64 - 1;
        let end = start + self.signature_max_length as i64 + 2;
        self.byte_range_values = [0, start, end, self.output.len() as i64 - end];

        let new_byte_range = format!(
            "/ByteRange [{} {} {} {}]",
            self.byte_range_values[0],
            self.byte_range_values[1],
            self.byte_range_values[2],
            self.byte_range_values[3]
        );
        if new_byte_range.len() > BYTE_RANGE_PLACEHOLDER.len() {
            return Err(SignatureError::ByteRangeOverflow {
                actual: new_byte_range.len(),
                placeholder: BYTE_RANGE_PLACEHOLDER.len(),
            }
            .into());
        }
        let mut padded = new_byte_range.into_bytes();
        padded.resize(BYTE_RANGE_PLACEHOLDER.len(), b' ');

        let placeholder_index = find(&self.output, BYTE_RANGE_PLACEHOLDER)
            .ok_or(SignatureError::PlaceholderNotFound("/ByteRange"))?;
        self.output[placeholder_index..placeholder_index + padded.len()]
            .copy_from_slice(&padded);

        Ok(())
    }

    /// Builds the CMS signature over the byte ranges and writes its hex
    /// encoding into the `/Contents` hole, zero-filled to the reserved
    /// width. A signature larger than the reservation reports
    /// [`SignatureError::BudgetExceeded`] so the caller can rebuild with
    /// a larger budget.
    pub(crate) fn replace_signature(&mut self) -> SignResult<()> {
        let signature = self.create_signature()?;
        let encoded = hex::encode(&signature);

        if encoded.len() > self.signature_max_length {
            return Err(SignatureError::BudgetExceeded {
                required: encoded.len(),
                reserved: self.signature_max_length,
            }
            .into());
        }

        // The hole still holds the placeholder zeros; overwriting the
        // prefix leaves the zero padding in place.
        let hole_start = self.byte_range_values[1] as usize + 1;
        self.output[hole_start..hole_start + encoded.len()]
            .copy_from_slice(encoded.as_bytes());

        Ok(())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

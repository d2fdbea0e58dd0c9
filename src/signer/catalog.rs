//! New catalog object for the signed revision.

use super::serialize::write_value;
use super::{SignContext, SignatureType};
use crate::error::SignResult;

impl SignContext<'_> {
    /// Builds the replacement `/Catalog`: every original root entry is
    /// copied except `/Type` and `/AcroForm`; a fresh AcroForm lists the
    /// prior signature fields followed by the new widget.
    pub(crate) fn create_catalog(&mut self) -> SignResult<Vec<u8>> {
        let root = self.reader.trailer().key("Root");
        let root_ptr = root.ptr();
        self.catalog_data.root_string = root_ptr.reference_string();

        let mut buf = Vec::new();
        buf.extend_from_slice(b"<<\n");
        buf.extend_from_slice(b"  /Type /Catalog\n");

        for key in root.keys() {
            if key == "Type" || key == "AcroForm" {
                continue;
            }
            buf.extend_from_slice(format!("  /{} ", key).as_bytes());
            write_value(&mut buf, root_ptr.number, &root.key(&key))?;
            buf.push(b'\n');
        }

        buf.extend_from_slice(b"  /AcroForm <<\n");
        buf.extend_from_slice(b"    /Fields [");
        for (i, sig_id) in self.existing_signatures.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(format!("{} 0 R", sig_id).as_bytes());
        }
        if !self.existing_signatures.is_empty() {
            buf.push(b' ');
        }
        buf.extend_from_slice(format!("{} 0 R", self.visual_sign_data.object_id).as_bytes());
        buf.extend_from_slice(b"]\n");

        // SignaturesExist | AppendOnly, except usage-rights signatures
        // which only assert SignaturesExist.
        let sig_flags = match self.sign_data.signature_type {
            SignatureType::Certification
            | SignatureType::Approval
            | SignatureType::Timestamp => 3,
            SignatureType::UsageRights => 1,
        };
        buf.extend_from_slice(format!("    /SigFlags {}\n", sig_flags).as_bytes());

        buf.extend_from_slice(b"  >>\n");
        buf.extend_from_slice(b">>\n");

        Ok(buf)
    }
}

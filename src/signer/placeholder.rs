//! Signature and document-timestamp placeholder dictionaries.
//!
//! The dictionaries are emitted with two fixed-width holes that later
//! passes patch in place: the `/ByteRange` literal and the zero-filled
//! `/Contents` hex string.

use super::{SignContext, SignatureType};

/// The 46-byte `/ByteRange` literal the patcher looks for.
pub(crate) const BYTE_RANGE_PLACEHOLDER: &[u8] =
    b"/ByteRange[0 ********** ********** **********]";

impl SignContext<'_> {
    /// Builds the `/Sig` dictionary with placeholders.
    pub(crate) fn create_signature_placeholder(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.signature_max_length + 512);

        buf.extend_from_slice(b"<<\n");
        buf.extend_from_slice(b" /Type /Sig\n");
        buf.extend_from_slice(b" /Filter /Adobe.PPKLite\n");
        buf.extend_from_slice(b" /SubFilter /adbe.pkcs7.detached\n");

        buf.extend_from_slice(&self.create_prop_build());

        buf.push(b' ');
        buf.extend_from_slice(BYTE_RANGE_PLACEHOLDER);
        buf.extend_from_slice(b" /Contents<");
        buf.resize(buf.len() + self.signature_max_length, b'0');
        buf.extend_from_slice(b">\n");

        self.write_reference_block(&mut buf);

        let info = &self.sign_data.info;
        if !info.name.is_empty() {
            buf.extend_from_slice(b" /Name ");
            buf.extend_from_slice(&super::utils::pdf_string(&info.name));
            buf.push(b'\n');
        }
        if !info.location.is_empty() {
            buf.extend_from_slice(b" /Location ");
            buf.extend_from_slice(&super::utils::pdf_string(&info.location));
            buf.push(b'\n');
        }
        if !info.reason.is_empty() {
            buf.extend_from_slice(b" /Reason ");
            buf.extend_from_slice(&super::utils::pdf_string(&info.reason));
            buf.push(b'\n');
        }
        if !info.contact_info.is_empty() {
            buf.extend_from_slice(b" /ContactInfo ");
            buf.extend_from_slice(&super::utils::pdf_string(&info.contact_info));
            buf.push(b'\n');
        }

        // A timestamped signature gets its time from the TSA token; the
        // /M entry would only contradict it.
        if self.sign_data.tsa.is_none() {
            if let Some(date) = &info.date {
                buf.extend_from_slice(b" /M ");
                buf.extend_from_slice(&super::utils::pdf_date_time(date));
                buf.push(b'\n');
            }
        }

        buf.extend_from_slice(b">>\n");
        buf
    }

    /// Builds the `/DocTimeStamp` dictionary with placeholders.
    pub(crate) fn create_timestamp_placeholder(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.signature_max_length + 256);

        buf.extend_from_slice(b"<<\n");
        buf.extend_from_slice(b" /Type /DocTimeStamp\n");
        buf.extend_from_slice(b" /Filter /Adobe.PPKLite\n");
        buf.extend_from_slice(b" /SubFilter /ETSI.RFC3161\n");

        buf.extend_from_slice(&self.create_prop_build());

        buf.push(b' ');
        buf.extend_from_slice(BYTE_RANGE_PLACEHOLDER);
        buf.extend_from_slice(b" /Contents<");
        buf.resize(buf.len() + self.signature_max_length, b'0');
        buf.extend_from_slice(b">\n");
        buf.extend_from_slice(b">>\n");
        buf
    }

    /// The `/Reference` SigRef block describing the transform this
    /// signature applies to the document.
    fn write_reference_block(&self, buf: &mut Vec<u8>) {
        let cert_type = self.sign_data.signature_type;
        if cert_type == SignatureType::Timestamp {
            return;
        }

        buf.extend_from_slice(b" /Reference [\n");
        buf.extend_from_slice(b" << /Type /SigRef\n");

        match cert_type {
            SignatureType::Certification => {
                buf.extend_from_slice(b"   /TransformMethod /DocMDP\n");
                buf.extend_from_slice(b"   /TransformParams <<\n");
                buf.extend_from_slice(b"     /Type /TransformParams\n");
                buf.extend_from_slice(
                    format!("     /P {}\n", self.sign_data.doc_mdp_perm.as_int()).as_bytes(),
                );
                buf.extend_from_slice(b"     /V /1.2\n");
                buf.extend_from_slice(b"   >>\n");
            }
            SignatureType::UsageRights => {
                buf.extend_from_slice(b"   /TransformMethod /UR3\n");
                buf.extend_from_slice(b"   /TransformParams <<\n");
                buf.extend_from_slice(b"     /Type /TransformParams\n");
                buf.extend_from_slice(b"     /V /2.2\n");
                buf.extend_from_slice(b"   >>\n");
            }
            SignatureType::Approval => {
                buf.extend_from_slice(b"   /TransformMethod /FieldMDP\n");
                buf.extend_from_slice(b"   /TransformParams <<\n");
                buf.extend_from_slice(b"     /Type /TransformParams\n");
                buf.extend_from_slice(b"     /Action /All\n");
                buf.extend_from_slice(b"     /V /1.2\n");
                buf.extend_from_slice(b"   >>\n");
            }
            SignatureType::Timestamp => unreachable!(),
        }

        buf.extend_from_slice(
            format!(
                "   /DigestMethod /{}\n",
                self.sign_data.digest_algorithm.pdf_name()
            )
            .as_bytes(),
        );
        buf.extend_from_slice(b" >> ]\n");
    }

    /// The `/Prop_Build` entry identifying the producing application.
    pub(crate) fn create_prop_build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b" /Prop_Build <<\n");
        buf.extend_from_slice(b"   /App << /Name /pdf-sign >>\n");
        buf.extend_from_slice(b" >>\n");
        buf
    }
}

//! CMS signature construction over the patched byte ranges.

use super::asn1::{build_octet_string, build_oid, build_sequence};
use super::pkcs7::{self, Attribute, SignerParams};
use super::{oids, timestamp, SignContext, SignatureType};
use crate::error::{SignResult, TimestampError};
use crate::signer::keys::Certificate;
use crate::signer::DigestAlgorithm;

impl SignContext<'_> {
    /// Produces the DER that goes into the `/Contents` hole: the raw TSA
    /// token for bare timestamp signatures, otherwise a detached PKCS#7
    /// SignedData over the two byte ranges.
    pub(crate) fn create_signature(&self) -> SignResult<Vec<u8>> {
        let [a, b, c, d] = self.byte_range_values;
        let mut sign_content = Vec::with_capacity((b + d) as usize);
        sign_content.extend_from_slice(&self.output[a as usize..(a + b) as usize]);
        sign_content.extend_from_slice(&self.output[c as usize..(c + d) as usize]);

        if self.sign_data.signature_type == SignatureType::Timestamp {
            let tsa = self
                .sign_data
                .tsa
                .as_ref()
                .ok_or(TimestampError::NotConfigured)?;
            return timestamp::get_token(tsa, self.sign_data.digest_algorithm, &sign_content);
        }

        let extra_signed_attributes = vec![
            Attribute {
                oid: oids::OID_REVOCATION_INFO_ARCHIVAL,
                value: self.sign_data.revocation_data.to_der(),
            },
            self.create_signing_certificate_attribute(),
        ];

        let chain: &[Certificate] = match self.sign_data.certificate_chains.first() {
            Some(chain) if chain.len() > 1 => &chain[1..],
            _ => &[],
        };

        let params = SignerParams {
            digest: self.sign_data.digest_algorithm,
            certificate: &self.sign_data.certificate,
            chain,
            signer: self.sign_data.signer.as_ref(),
            extra_signed_attributes,
            signing_time: self.sign_data.info.date,
        };

        pkcs7::build_signed_data(&sign_content, &params, |encrypted_digest| {
            match &self.sign_data.tsa {
                Some(tsa) => {
                    timestamp::get_token(tsa, self.sign_data.digest_algorithm, encrypted_digest)
                        .map(Some)
                }
                None => Ok(None),
            }
        })
    }

    /// The ESS signing-certificate attribute binding the certificate hash
    /// into the signed attributes. SHA-1 selects the v1 attribute; the
    /// hash algorithm prefix is spelled out only for digests other than
    /// SHA-1 and SHA-256, matching what mainstream readers expect.
    pub(crate) fn create_signing_certificate_attribute(&self) -> Attribute {
        let digest = self.sign_data.digest_algorithm;
        let hash = digest.hash(self.sign_data.certificate.der());

        let mut cert_entry = Vec::new();
        if digest != DigestAlgorithm::Sha1 && digest != DigestAlgorithm::Sha256 {
            cert_entry.extend_from_slice(&build_sequence(&build_oid(digest.oid())));
        }
        cert_entry.extend_from_slice(&build_octet_string(&hash));

        let value = build_sequence(&build_sequence(&build_sequence(&cert_entry)));

        let oid = if digest == DigestAlgorithm::Sha1 {
            oids::OID_SIGNING_CERTIFICATE
        } else {
            oids::OID_SIGNING_CERTIFICATE_V2
        };

        Attribute { oid, value }
    }
}

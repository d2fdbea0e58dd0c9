//! PKCS#7 (CMS) SignedData construction.
//!
//! The structures are assembled with explicit DER builders rather than a
//! schema-derived encoder: the shapes are fixed and small, and the byte
//! output must stay predictable for the signature length budget.

use super::asn1::{
    build_context_specific, build_integer, build_octet_string, build_oid, build_sequence,
    build_set, build_utc_time, NULL,
};
use super::digest::DigestAlgorithm;
use super::keys::{Certificate, KeyType, Signer};
use super::oids;
use crate::error::{SignResult, SignatureError};
use chrono::{DateTime, FixedOffset, Utc};

/// A CMS attribute: an OID plus the DER of a single attribute value.
pub(crate) struct Attribute {
    /// DER body of the attribute type OID.
    pub oid: &'static [u8],
    /// Full DER encoding of the attribute value.
    pub value: Vec<u8>,
}

impl Attribute {
    /// Encodes `SEQUENCE { type, SET { value } }`.
    fn to_der(&self) -> Vec<u8> {
        let mut content = build_oid(self.oid);
        content.extend_from_slice(&build_set(&self.value));
        build_sequence(&content)
    }
}

/// Everything needed to produce one SignerInfo.
pub(crate) struct SignerParams<'a> {
    /// Message digest algorithm.
    pub digest: DigestAlgorithm,
    /// The signer's certificate.
    pub certificate: &'a Certificate,
    /// Remaining chain certificates added to the certificate bag.
    pub chain: &'a [Certificate],
    /// The signing key.
    pub signer: &'a dyn Signer,
    /// Additional signed attributes (ESS signing certificate, revocation
    /// archival).
    pub extra_signed_attributes: Vec<Attribute>,
    /// Optional signingTime attribute value.
    pub signing_time: Option<DateTime<FixedOffset>>,
}

/// Builds a detached SignedData over `content`.
///
/// `timestamp_fetch` is called with the raw signature value; returning a
/// token DER adds it as the `id-aa-timeStampToken` unsigned attribute of
/// the SignerInfo.
pub(crate) fn build_signed_data<F>(
    content: &[u8],
    params: &SignerParams<'_>,
    timestamp_fetch: F,
) -> SignResult<Vec<u8>>
where
    F: FnOnce(&[u8]) -> SignResult<Option<Vec<u8>>>,
{
    let message_digest = params.digest.hash(content);

    let mut attributes = vec![
        Attribute {
            oid: oids::OID_CONTENT_TYPE,
            value: build_oid(oids::OID_DATA),
        },
        Attribute {
            oid: oids::OID_MESSAGE_DIGEST,
            value: build_octet_string(&message_digest),
        },
    ];
    if let Some(time) = params.signing_time {
        let formatted = time
            .with_timezone(&Utc)
            .format("%y%m%d%H%M%SZ")
            .to_string();
        attributes.push(Attribute {
            oid: oids::OID_SIGNING_TIME,
            value: build_utc_time(&formatted),
        });
    }
    attributes.extend(params.extra_signed_attributes.iter().map(|a| Attribute {
        oid: a.oid,
        value: a.value.clone(),
    }));

    // DER SET OF orders elements by their encoding.
    let mut encoded: Vec<Vec<u8>> = attributes.iter().map(Attribute::to_der).collect();
    encoded.sort();
    let attrs_content: Vec<u8> = encoded.concat();

    // The signature is computed over the SET OF form; the SignerInfo
    // embeds the same content under an implicit [0].
    let signed_attrs_set = build_set(&attrs_content);
    let signature = params
        .signer
        .sign(params.digest, &signed_attrs_set)?;

    let unsigned_token = timestamp_fetch(&signature)?;

    let digest_alg = digest_algorithm_identifier(params.digest);
    let signature_alg = signature_algorithm_identifier(params.signer.key_type(), params.digest)?;

    // SignerInfo
    let mut signer_info = build_integer(1);
    signer_info.extend_from_slice(&issuer_and_serial(params.certificate));
    signer_info.extend_from_slice(&digest_alg);
    signer_info.extend_from_slice(&build_context_specific(0, &attrs_content));
    signer_info.extend_from_slice(&signature_alg);
    signer_info.extend_from_slice(&build_octet_string(&signature));
    if let Some(token) = unsigned_token {
        let ts_attr = Attribute {
            oid: oids::OID_TIMESTAMP_TOKEN,
            value: token,
        };
        signer_info.extend_from_slice(&build_context_specific(1, &ts_attr.to_der()));
    }
    let signer_info = build_sequence(&signer_info);

    // Certificate bag: signer first, then the rest of the chain.
    let mut certificates = params.certificate.der().to_vec();
    for cert in params.chain {
        certificates.extend_from_slice(cert.der());
    }

    // SignedData, detached: encapContentInfo carries no content.
    let mut signed_data = build_integer(1);
    signed_data.extend_from_slice(&build_set(&digest_alg));
    signed_data.extend_from_slice(&build_sequence(&build_oid(oids::OID_DATA)));
    signed_data.extend_from_slice(&build_context_specific(0, &certificates));
    signed_data.extend_from_slice(&build_set(&signer_info));
    let signed_data = build_sequence(&signed_data);

    // Outer ContentInfo.
    let mut content_info = build_oid(oids::OID_SIGNED_DATA);
    content_info.extend_from_slice(&build_context_specific(0, &signed_data));
    Ok(build_sequence(&content_info))
}

/// Wraps a certificate as a minimal SignedData carrying no signer infos
/// and no content. Used for the signature length budget.
pub(crate) fn degenerate_certificate(cert_der: &[u8]) -> Vec<u8> {
    let mut signed_data = build_integer(1);
    signed_data.extend_from_slice(&build_set(&[]));
    signed_data.extend_from_slice(&build_sequence(&build_oid(oids::OID_DATA)));
    signed_data.extend_from_slice(&build_context_specific(0, cert_der));
    signed_data.extend_from_slice(&build_set(&[]));
    let signed_data = build_sequence(&signed_data);

    let mut content_info = build_oid(oids::OID_SIGNED_DATA);
    content_info.extend_from_slice(&build_context_specific(0, &signed_data));
    build_sequence(&content_info)
}

/// `SEQUENCE { digestOid, NULL }`
fn digest_algorithm_identifier(digest: DigestAlgorithm) -> Vec<u8> {
    let mut alg = build_oid(digest.oid());
    alg.extend_from_slice(NULL);
    build_sequence(&alg)
}

/// The SignerInfo signature algorithm identifier: `rsaEncryption` for RSA
/// keys, `ecdsa-with-SHAxxx` for ECDSA keys.
fn signature_algorithm_identifier(
    key_type: KeyType,
    digest: DigestAlgorithm,
) -> SignResult<Vec<u8>> {
    match key_type {
        KeyType::Rsa => {
            let mut alg = build_oid(oids::OID_RSA_ENCRYPTION);
            alg.extend_from_slice(NULL);
            Ok(build_sequence(&alg))
        }
        KeyType::Ecdsa => {
            let oid = match digest {
                DigestAlgorithm::Sha1 => oids::OID_ECDSA_WITH_SHA1,
                DigestAlgorithm::Sha256 => oids::OID_ECDSA_WITH_SHA256,
                DigestAlgorithm::Sha384 => oids::OID_ECDSA_WITH_SHA384,
                DigestAlgorithm::Sha512 => oids::OID_ECDSA_WITH_SHA512,
                other => {
                    return Err(SignatureError::Pkcs7(format!(
                        "no ECDSA signature algorithm for {:?}",
                        other
                    ))
                    .into())
                }
            };
            Ok(build_sequence(&build_oid(oid)))
        }
    }
}

/// `SEQUENCE { issuer Name, serialNumber INTEGER }`
fn issuer_and_serial(cert: &Certificate) -> Vec<u8> {
    let mut content = cert.raw_issuer().to_vec();
    content.extend_from_slice(cert.serial_der());
    build_sequence(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::asn1::DerReader;

    #[test]
    fn test_degenerate_certificate_shape() {
        let fake_cert = build_sequence(&build_integer(7));
        let degenerated = degenerate_certificate(&fake_cert);

        let mut reader = DerReader::new(&degenerated);
        let outer = reader.read_expect(0x30).unwrap();
        assert!(reader.is_empty());

        let mut inner = DerReader::new(outer.content);
        let oid = inner.read_expect(0x06).unwrap();
        assert_eq!(oid.content, oids::OID_SIGNED_DATA);

        let wrapped = inner.read_expect(0xA0).unwrap();
        let mut sd = DerReader::new(wrapped.content);
        let sd_seq = sd.read_expect(0x30).unwrap();

        let mut fields = DerReader::new(sd_seq.content);
        fields.read_expect(0x02).unwrap(); // version
        let digest_algs = fields.read_expect(0x31).unwrap();
        assert!(digest_algs.content.is_empty());
        fields.read_expect(0x30).unwrap(); // encapContentInfo
        let certs = fields.read_expect(0xA0).unwrap();
        assert_eq!(certs.content, &fake_cert[..]);
        let signer_infos = fields.read_expect(0x31).unwrap();
        assert!(signer_infos.content.is_empty());
    }

    #[test]
    fn test_attribute_encoding() {
        let attr = Attribute {
            oid: oids::OID_CONTENT_TYPE,
            value: build_oid(oids::OID_DATA),
        };
        let der = attr.to_der();

        let mut reader = DerReader::new(&der);
        let seq = reader.read_expect(0x30).unwrap();
        let mut inner = DerReader::new(seq.content);
        assert_eq!(inner.read_expect(0x06).unwrap().content, oids::OID_CONTENT_TYPE);
        let set = inner.read_expect(0x31).unwrap();
        let mut values = DerReader::new(set.content);
        assert_eq!(values.read_expect(0x06).unwrap().content, oids::OID_DATA);
    }

    #[test]
    fn test_digest_algorithm_identifier_has_null_params() {
        let alg = digest_algorithm_identifier(DigestAlgorithm::Sha256);
        let mut reader = DerReader::new(&alg);
        let seq = reader.read_expect(0x30).unwrap();
        let mut inner = DerReader::new(seq.content);
        assert_eq!(inner.read_expect(0x06).unwrap().content, oids::OID_SHA256);
        inner.read_expect(0x05).unwrap();
        assert!(inner.is_empty());
    }

    #[test]
    fn test_ecdsa_rejects_legacy_digests() {
        assert!(signature_algorithm_identifier(KeyType::Ecdsa, DigestAlgorithm::Md5).is_err());
        assert!(signature_algorithm_identifier(KeyType::Ecdsa, DigestAlgorithm::Sha256).is_ok());
    }
}

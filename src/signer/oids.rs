//! DER-encoded object identifier bodies used in CMS assembly.
//!
//! These are the content bytes of the OBJECT IDENTIFIER encodings, without
//! the tag and length prefix.

/// data: 1.2.840.113549.1.7.1
pub(crate) const OID_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01];

/// signedData: 1.2.840.113549.1.7.2
pub(crate) const OID_SIGNED_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];

/// contentType: 1.2.840.113549.1.9.3
pub(crate) const OID_CONTENT_TYPE: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x03];

/// messageDigest: 1.2.840.113549.1.9.4
pub(crate) const OID_MESSAGE_DIGEST: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x04];

/// signingTime: 1.2.840.113549.1.9.5
pub(crate) const OID_SIGNING_TIME: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x05];

/// signingCertificate (ESS, SHA-1): 1.2.840.113549.1.9.16.2.12
pub(crate) const OID_SIGNING_CERTIFICATE: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x02, 0x0C];

/// signingCertificateV2 (ESS): 1.2.840.113549.1.9.16.2.47
pub(crate) const OID_SIGNING_CERTIFICATE_V2: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x02, 0x2F];

/// id-aa-timeStampToken: 1.2.840.113549.1.9.16.2.14
pub(crate) const OID_TIMESTAMP_TOKEN: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x10, 0x02, 0x0E];

/// adbe-revocationInfoArchival: 1.2.840.113583.1.1.8
pub(crate) const OID_REVOCATION_INFO_ARCHIVAL: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x2F, 0x01, 0x01, 0x08];

/// rsaEncryption: 1.2.840.113549.1.1.1
pub(crate) const OID_RSA_ENCRYPTION: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];

/// ecdsa-with-SHA1: 1.2.840.10045.4.1
pub(crate) const OID_ECDSA_WITH_SHA1: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x01];

/// ecdsa-with-SHA256: 1.2.840.10045.4.3.2
pub(crate) const OID_ECDSA_WITH_SHA256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02];

/// ecdsa-with-SHA384: 1.2.840.10045.4.3.3
pub(crate) const OID_ECDSA_WITH_SHA384: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x03];

/// ecdsa-with-SHA512: 1.2.840.10045.4.3.4
pub(crate) const OID_ECDSA_WITH_SHA512: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x04];

/// md5: 1.2.840.113549.2.5
pub(crate) const OID_MD5: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x02, 0x05];

/// ripemd160: 1.3.36.3.2.1
pub(crate) const OID_RIPEMD160: &[u8] = &[0x2B, 0x24, 0x03, 0x02, 0x01];

/// sha1: 1.3.14.3.2.26
pub(crate) const OID_SHA1: &[u8] = &[0x2B, 0x0E, 0x03, 0x02, 0x1A];

/// sha256: 2.16.840.1.101.3.4.2.1
pub(crate) const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

/// sha384: 2.16.840.1.101.3.4.2.2
pub(crate) const OID_SHA384: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02];

/// sha512: 2.16.840.1.101.3.4.2.3
pub(crate) const OID_SHA512: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03];

/// id-pkix-ocsp-basic: 1.3.6.1.5.5.7.48.1.1
pub(crate) const OID_OCSP_BASIC: &[u8] = &[0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];

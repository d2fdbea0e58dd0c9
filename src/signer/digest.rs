//! Digest algorithm selection for signatures.

use super::oids;
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// The hash algorithm used for the message digest and the ESS
/// signing-certificate attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5 (legacy).
    Md5,
    /// RIPEMD-160 (legacy).
    Ripemd160,
    /// SHA-1 (legacy).
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Digest output size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Ripemd160 | DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// DER body of the algorithm OID.
    pub(crate) fn oid(self) -> &'static [u8] {
        match self {
            DigestAlgorithm::Md5 => oids::OID_MD5,
            DigestAlgorithm::Ripemd160 => oids::OID_RIPEMD160,
            DigestAlgorithm::Sha1 => oids::OID_SHA1,
            DigestAlgorithm::Sha256 => oids::OID_SHA256,
            DigestAlgorithm::Sha384 => oids::OID_SHA384,
            DigestAlgorithm::Sha512 => oids::OID_SHA512,
        }
    }

    /// The `/DigestMethod` name used in SigRef transform dictionaries.
    pub(crate) fn pdf_name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Ripemd160 => "RIPEMD160",
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    /// One-shot hash of `data`.
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
            DigestAlgorithm::Ripemd160 => Ripemd160::digest(data).to_vec(),
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl Default for DigestAlgorithm {
    fn default() -> Self {
        DigestAlgorithm::Sha256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_sizes() {
        assert_eq!(DigestAlgorithm::Md5.output_size(), 16);
        assert_eq!(DigestAlgorithm::Sha1.output_size(), 20);
        assert_eq!(DigestAlgorithm::Sha256.output_size(), 32);
        assert_eq!(DigestAlgorithm::Sha512.output_size(), 64);
    }

    #[test]
    fn test_hash_lengths_match_output_size() {
        for alg in [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Ripemd160,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(alg.hash(b"abc").len(), alg.output_size());
        }
    }

    #[test]
    fn test_sha256_vector() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(DigestAlgorithm::Sha256.hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_default_is_sha256() {
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
    }
}

//! # pdf-sign
//!
//! Digital signing for existing PDF documents via incremental updates.
//!
//! The crate parses a finished PDF, appends a signed revision (signature
//! dictionary, widget annotation, catalog, cross-reference and trailer in
//! the same form the input uses), and embeds a detached PKCS#7/CMS
//! signature with ESS signing-certificate and Adobe revocation-info
//! attributes — optionally timestamped by an RFC 3161 authority — so the
//! output verifies in standard readers per ISO 32000 and PAdES
//! conventions.
//!
//! ## Features
//!
//! - Certification, approval, usage-rights and document-timestamp
//!   signatures
//! - Table and stream cross-reference forms, matched to the input
//! - Visible approval signatures with a generated appearance stream
//! - OCSP and CRL collection embedded as revocation-info-archival
//! - RSA and ECDSA (P-256) keys from PKCS#8, including encrypted PEM
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_sign::{sign, Certificate, PdfReader, SignData};
//!
//! let certificate = Certificate::from_pem_file("cert.pem")?;
//! let signer = pdf_sign::load_private_key_file("key.pem", None)?;
//!
//! let reader = PdfReader::from_file("input.pdf")?;
//! let mut sign_data = SignData::new(certificate, signer);
//! sign_data.info.name = "Jane Doe".to_string();
//! sign_data.info.reason = "Document approval".to_string();
//!
//! let mut output = Vec::new();
//! sign(&reader, &mut output, sign_data)?;
//! std::fs::write("signed.pdf", &output)?;
//! ```

pub mod error;
pub mod object;
pub mod parser;
pub mod signer;
pub mod types;

pub use error::{
    CredentialError, ParseError, RevocationError, SignError, SignResult, SignatureError,
    TimestampError,
};
pub use object::{Object, PdfArray, PdfDictionary, PdfName, PdfStream, PdfString};
pub use parser::{
    ObjectLocation, PdfReader, Trailer, Value, ValueKind, XrefInformation, XrefKind, XrefTable,
};
pub use signer::{
    embed_revocation_status, load_private_key_file, load_private_key_pem, sign,
    signer_from_pkcs8_der, Appearance, Certificate, DigestAlgorithm, DocMdpPerm, EcdsaSigner,
    InfoArchival, KeyType, OtherRevInfo, RevocationFunction, RsaSigner, SignContext, SignData,
    SignatureInfo, SignatureType, Signer, TsaConfig,
};
pub use types::{ObjectId, Rectangle};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{SignError, SignResult};
    pub use crate::parser::PdfReader;
    pub use crate::signer::{
        sign, Appearance, Certificate, DigestAlgorithm, DocMdpPerm, SignData, SignatureInfo,
        SignatureType, Signer, TsaConfig,
    };
    pub use crate::types::{ObjectId, Rectangle};
}

//! PDF signing core.
//!
//! Signing appends an incremental update to the input document: a
//! signature dictionary with two fixed-width holes, the widget annotation
//! and (for visible signatures) its appearance, a replacement catalog, a
//! cross-reference section matching the input's form, and a trailer. The
//! `/ByteRange` hole is then patched with the file's real geometry and a
//! detached PKCS#7 signature over everything outside the `/Contents` hole
//! is hex-encoded into it.
//!
//! The one recoverable failure is a signature larger than its reserved
//! hole; the operation then rebuilds from scratch with a larger
//! reservation, and the caller's sink is written only after a build
//! succeeds.

mod appearance;
mod asn1;
mod byterange;
mod catalog;
mod cms;
mod digest;
mod keys;
mod objects;
mod oids;
mod pkcs7;
mod placeholder;
mod revocation;
mod serialize;
mod timestamp;
mod trailer;
mod utils;
mod xref;

pub use digest::DigestAlgorithm;
pub use keys::{
    load_private_key_file, load_private_key_pem, signer_from_pkcs8_der, Certificate, EcdsaSigner,
    KeyType, RsaSigner, Signer,
};
pub use revocation::{embed_revocation_status, InfoArchival, OtherRevInfo, RevocationFunction};

use crate::error::{SignError, SignResult, SignatureError};
use crate::parser::PdfReader;
use crate::types::Rectangle;
use chrono::{DateTime, FixedOffset};
use log::warn;
use std::io::Write;
use std::time::Duration;

/// The kind of signature being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureType {
    /// A certification (author) signature with a DocMDP transform.
    #[default]
    Certification,
    /// An approval (recipient) signature.
    Approval,
    /// A usage-rights signature.
    UsageRights,
    /// A bare RFC 3161 document timestamp.
    Timestamp,
}

/// DocMDP permissions for certification signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocMdpPerm {
    /// No changes are permitted after certification.
    #[default]
    NoChanges,
    /// Form filling and signing are permitted.
    FillFormsAndSign,
    /// Form filling, signing and annotation changes are permitted.
    FillFormsSignAndAnnotate,
}

impl DocMdpPerm {
    /// The integer written as the DocMDP transform's `/P` parameter.
    pub fn as_int(self) -> u8 {
        match self {
            DocMdpPerm::NoChanges => 1,
            DocMdpPerm::FillFormsAndSign => 2,
            DocMdpPerm::FillFormsSignAndAnnotate => 3,
        }
    }
}

/// Human-readable signature metadata written into the signature
/// dictionary.
#[derive(Debug, Clone, Default)]
pub struct SignatureInfo {
    /// Signer name. Non-ASCII names are emitted as UTF-16BE literals.
    pub name: String,
    /// Signing location.
    pub location: String,
    /// Signing reason.
    pub reason: String,
    /// Contact information.
    pub contact_info: String,
    /// Signing date; also used as the CMS signingTime attribute. The `/M`
    /// entry is suppressed when a TSA supplies the time instead.
    pub date: Option<DateTime<FixedOffset>>,
}

/// Timestamp authority configuration.
#[derive(Debug, Clone)]
pub struct TsaConfig {
    /// Endpoint accepting `application/timestamp-query` POSTs.
    pub url: String,
    /// Basic-auth username; empty disables authentication.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Request deadline.
    pub timeout: Duration,
}

impl TsaConfig {
    /// Configuration for an unauthenticated TSA with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Where (and whether) the signature is visibly placed.
#[derive(Debug, Clone, Copy)]
pub struct Appearance {
    /// Render a visible widget. Only approval signatures may be visible.
    pub visible: bool,
    /// 1-based page number carrying the widget.
    pub page: u32,
    /// Widget rectangle in user space.
    pub rect: Rectangle,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            visible: false,
            page: 1,
            rect: Rectangle::default(),
        }
    }
}

/// Everything needed for one signing operation.
pub struct SignData {
    /// The signing key.
    pub signer: Box<dyn Signer>,
    /// The signer's certificate.
    pub certificate: Certificate,
    /// Certificate chains, each ordered from the signer upwards. The
    /// first chain feeds the CMS certificate bag and revocation lookups.
    pub certificate_chains: Vec<Vec<Certificate>>,
    /// Message digest algorithm.
    pub digest_algorithm: DigestAlgorithm,
    /// Signature kind.
    pub signature_type: SignatureType,
    /// DocMDP permission for certification signatures.
    pub doc_mdp_perm: DocMdpPerm,
    /// Human-readable metadata.
    pub info: SignatureInfo,
    /// Optional timestamp authority.
    pub tsa: Option<TsaConfig>,
    /// Pre-collected revocation evidence; the revocation function appends
    /// to it.
    pub revocation_data: InfoArchival,
    /// Per-certificate revocation embedding callback.
    pub revocation_function: Option<RevocationFunction>,
    /// Visible-signature placement.
    pub appearance: Appearance,
}

impl SignData {
    /// Builds sign data with defaults: an invisible SHA-256 certification
    /// signature that allows no further changes, the certificate alone as
    /// its chain, and no TSA or revocation collection.
    pub fn new(certificate: Certificate, signer: Box<dyn Signer>) -> Self {
        let chain = vec![certificate.clone()];
        Self {
            signer,
            certificate,
            certificate_chains: vec![chain],
            digest_algorithm: DigestAlgorithm::default(),
            signature_type: SignatureType::default(),
            doc_mdp_perm: DocMdpPerm::default(),
            info: SignatureInfo::default(),
            tsa: None,
            revocation_data: InfoArchival::new(),
            revocation_function: None,
            appearance: Appearance::default(),
        }
    }
}

/// A pending cross-reference record for the incremental section.
#[derive(Debug, Clone, Copy)]
pub(crate) struct XrefRecord {
    pub(crate) id: u32,
    pub(crate) offset: u64,
}

#[derive(Debug, Default)]
pub(crate) struct CatalogData {
    pub(crate) object_id: u32,
    pub(crate) root_string: String,
}

#[derive(Debug, Default)]
pub(crate) struct VisualSignData {
    pub(crate) page_object_id: u32,
    pub(crate) object_id: u32,
}

/// Initial `/Contents` reservation: 512 bytes, hex-encoded.
const SIGNATURE_MAX_LENGTH_BASE: usize = hex_encoded_len(512);

/// Safety margin for a TSA token, hex-encoded.
const TSA_LENGTH_MARGIN: usize = hex_encoded_len(9000);

/// The hex-encoded length of `n` raw bytes.
pub(crate) const fn hex_encoded_len(n: usize) -> usize {
    n * 2
}

/// The mutable state of one signing operation.
pub struct SignContext<'a> {
    pub(crate) reader: &'a PdfReader,
    pub(crate) sign_data: SignData,
    pub(crate) output: Vec<u8>,
    pub(crate) byte_range_values: [i64; 4],
    pub(crate) signature_max_length: usize,
    pub(crate) signature_max_length_base: usize,
    pub(crate) existing_signatures: Vec<u32>,
    pub(crate) last_xref_id: u32,
    pub(crate) new_xref_entries: Vec<XrefRecord>,
    pub(crate) updated_xref_entries: Vec<XrefRecord>,
    pub(crate) visual_sign_data: VisualSignData,
    pub(crate) catalog_data: CatalogData,
    pub(crate) new_xref_start: u64,
    pub(crate) signature_object_id: u32,
    revocation_fetched: bool,
}

/// Signs the document held by `reader`, writing the complete signed PDF
/// to `output` exactly once.
pub fn sign<W: Write>(reader: &PdfReader, output: &mut W, sign_data: SignData) -> SignResult<()> {
    let mut context = SignContext::new(reader, sign_data);
    context.existing_signatures = context.fetch_existing_signatures();

    loop {
        match context.sign_pdf() {
            Ok(()) => break,
            Err(SignError::Signature(SignatureError::BudgetExceeded { required, reserved })) => {
                warn!(
                    "signature needs {} hex digits but {} were reserved; rebuilding with a larger reservation",
                    required, reserved
                );
                context.signature_max_length_base += required - reserved + 1;
            }
            Err(e) => return Err(e),
        }
    }

    output.write_all(&context.output)?;
    Ok(())
}

impl<'a> SignContext<'a> {
    pub(crate) fn new(reader: &'a PdfReader, mut sign_data: SignData) -> Self {
        if sign_data.appearance.page == 0 {
            sign_data.appearance.page = 1;
        }

        Self {
            reader,
            sign_data,
            output: Vec::new(),
            byte_range_values: [0; 4],
            signature_max_length: 0,
            signature_max_length_base: SIGNATURE_MAX_LENGTH_BASE,
            existing_signatures: Vec::new(),
            last_xref_id: 0,
            new_xref_entries: Vec::new(),
            updated_xref_entries: Vec::new(),
            visual_sign_data: VisualSignData::default(),
            catalog_data: CatalogData::default(),
            new_xref_start: 0,
            signature_object_id: 0,
            revocation_fetched: false,
        }
    }

    /// One full build-patch-sign pass over a fresh output buffer.
    fn sign_pdf(&mut self) -> SignResult<()> {
        self.reset_iteration();

        // The signed revision is appended after the input verbatim, with
        // one newline separating it from the original %%EOF.
        self.output.extend_from_slice(self.reader.data());
        self.output.push(b'\n');

        self.compute_signature_budget()?;

        let placeholder = match self.sign_data.signature_type {
            SignatureType::Timestamp => self.create_timestamp_placeholder(),
            _ => self.create_signature_placeholder(),
        };
        self.signature_object_id = self.add_object(&placeholder)?;

        let appearance = self.sign_data.appearance;
        let mut visible = false;
        let mut rect = Rectangle::default();
        if appearance.visible {
            if self.sign_data.signature_type != SignatureType::Approval {
                return Err(SignatureError::VisibleSignatureNotAllowed.into());
            }
            visible = true;
            rect = appearance.rect;
        }

        let visual_signature = self.create_visual_signature(visible, appearance.page, rect)?;
        self.visual_sign_data.object_id = self.add_object(&visual_signature)?;

        if visible {
            let page_update =
                self.create_inc_page_update(appearance.page, self.visual_sign_data.object_id)?;
            self.update_object(self.visual_sign_data.page_object_id, &page_update);
        }

        let catalog = self.create_catalog()?;
        self.catalog_data.object_id = self.add_object(&catalog)?;

        self.write_xref()?;
        self.write_trailer()?;
        self.update_byte_range()?;
        self.replace_signature()?;

        Ok(())
    }

    /// Clears the per-iteration state so a budget retry starts from a
    /// clean buffer. Collected revocation data survives retries.
    fn reset_iteration(&mut self) {
        self.output.clear();
        self.new_xref_entries.clear();
        self.updated_xref_entries.clear();
        self.byte_range_values = [0; 4];
        self.visual_sign_data = VisualSignData::default();
        self.catalog_data = CatalogData::default();
        self.new_xref_start = 0;
        self.signature_object_id = 0;
    }

    /// Conservative upper bound for the hex-encoded signature, derived
    /// from the certificate material and revocation artefacts. Everything
    /// in the `/Contents` hole is hex, so each term doubles.
    fn compute_signature_budget(&mut self) -> SignResult<()> {
        self.signature_max_length = self.signature_max_length_base;

        if self.sign_data.signature_type != SignatureType::Timestamp {
            self.signature_max_length +=
                hex_encoded_len(self.sign_data.certificate.signature_budget_bytes());
            self.signature_max_length +=
                hex_encoded_len(self.sign_data.digest_algorithm.output_size() * 2);

            let degenerated = pkcs7::degenerate_certificate(self.sign_data.certificate.der());
            self.signature_max_length += hex_encoded_len(degenerated.len());
            self.signature_max_length +=
                hex_encoded_len(self.sign_data.certificate.raw_issuer().len());

            if let Some(chain) = self.sign_data.certificate_chains.first() {
                for cert in chain.iter().skip(1) {
                    let degenerated = pkcs7::degenerate_certificate(cert.der());
                    self.signature_max_length += hex_encoded_len(degenerated.len());
                }
            }

            self.fetch_revocation_data()?;
        }

        if self.sign_data.tsa.is_some() {
            self.signature_max_length += TSA_LENGTH_MARGIN;
        }

        Ok(())
    }

    /// Object ids of signature fields already present in the input's
    /// AcroForm. They are carried into the new `/Fields` array ahead of
    /// the new widget.
    fn fetch_existing_signatures(&self) -> Vec<u32> {
        let acro_form = self.reader.trailer().key("Root").key("AcroForm");
        if acro_form.is_null() {
            return Vec::new();
        }

        let fields = acro_form.key("Fields");
        let mut signatures = Vec::new();
        for i in 0..fields.len() {
            let field = fields.index(i);
            if field.key("FT").name() == "Sig" {
                signatures.push(field.ptr().number);
            }
        }
        signatures
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Deterministic credentials for unit tests: a hand-assembled,
    //! syntactically valid certificate and a signer double with scripted
    //! output.

    use super::asn1::{
        build_context_specific, build_integer, build_sequence, build_tlv, NULL,
    };
    use super::keys::{Certificate, KeyType, Signer};
    use super::DigestAlgorithm;
    use crate::error::SignResult;
    use std::cell::Cell;

    /// sha256WithRSAEncryption: 1.2.840.113549.1.1.11
    const OID_SHA256_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
    /// rsaEncryption: 1.2.840.113549.1.1.1
    const OID_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];
    /// commonName: 2.5.4.3
    const OID_CN: &[u8] = &[0x55, 0x04, 0x03];

    /// Builds a self-contained certificate DER that `x509-cert` parses.
    /// The RSA public key and signature bits are synthetic.
    pub(crate) fn test_certificate_der() -> Vec<u8> {
        let oid = |body: &[u8]| build_tlv(0x06, body);
        let utf8 = |s: &str| build_tlv(0x0C, s.as_bytes());
        let utc = |s: &str| build_tlv(0x17, s.as_bytes());
        let bit_string = |content: &[u8]| {
            let mut bits = vec![0u8];
            bits.extend_from_slice(content);
            build_tlv(0x03, &bits)
        };

        let algorithm = {
            let mut alg = oid(OID_SHA256_RSA);
            alg.extend_from_slice(NULL);
            build_sequence(&alg)
        };

        let name = {
            let mut atv = oid(OID_CN);
            atv.extend_from_slice(&utf8("pdf-sign unit test"));
            build_sequence(&build_tlv(0x31, &build_sequence(&atv)))
        };

        let validity = {
            let mut v = utc("240101000000Z");
            v.extend_from_slice(&utc("341231235959Z"));
            build_sequence(&v)
        };

        let spki = {
            let mut alg = oid(OID_RSA);
            alg.extend_from_slice(NULL);

            let mut modulus_content = vec![0x00, 0xC3];
            modulus_content.extend_from_slice(&[0x7E; 254]);
            let modulus = build_tlv(0x02, &modulus_content);

            let mut rsa_key = modulus;
            rsa_key.extend_from_slice(&build_integer(65537));

            let mut content = build_sequence(&alg);
            content.extend_from_slice(&bit_string(&build_sequence(&rsa_key)));
            build_sequence(&content)
        };

        let tbs = {
            let mut tbs = build_context_specific(0, &build_integer(2));
            tbs.extend_from_slice(&build_integer(1));
            tbs.extend_from_slice(&algorithm);
            tbs.extend_from_slice(&name);
            tbs.extend_from_slice(&validity);
            tbs.extend_from_slice(&name);
            tbs.extend_from_slice(&spki);
            build_sequence(&tbs)
        };

        let mut cert = tbs;
        cert.extend_from_slice(&algorithm);
        cert.extend_from_slice(&bit_string(&[0xA5; 64]));
        build_sequence(&cert)
    }

    pub(crate) fn test_certificate() -> Certificate {
        Certificate::from_der(test_certificate_der()).expect("test certificate must parse")
    }

    /// A signer double returning fixed bytes and counting invocations.
    pub(crate) struct StubSigner {
        pub(crate) output: Vec<u8>,
        pub(crate) calls: Cell<usize>,
    }

    impl StubSigner {
        pub(crate) fn new(output: Vec<u8>) -> Self {
            Self {
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl Signer for StubSigner {
        fn key_type(&self) -> KeyType {
            KeyType::Rsa
        }

        fn sign(&self, _digest: DigestAlgorithm, _message: &[u8]) -> SignResult<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.clone())
        }
    }

    /// Minimal table-xref document with accurate offsets.
    pub(crate) fn minimal_pdf() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::new();
        offsets.push(out.len());
        out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        offsets.push(out.len());
        out.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
        offsets.push(out.len());
        out.extend_from_slice(
            b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n",
        );

        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
        for off in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        out.extend_from_slice(b"trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n%%EOF\n", xref_start).as_bytes());
        out
    }

    /// Sign data wired to the scripted signer.
    pub(crate) fn test_sign_data(signature: Vec<u8>) -> super::SignData {
        let mut data =
            super::SignData::new(test_certificate(), Box::new(StubSigner::new(signature)));
        data.info.name = "Unit Test".to_string();
        data
    }

    #[test]
    fn test_certificate_parses() {
        let cert = test_certificate();
        assert!(!cert.raw_issuer().is_empty());
        assert_eq!(cert.serial_der(), &[0x02, 0x01, 0x01]);
        assert_eq!(cert.signature_budget_bytes(), 256);
    }
}

//! Revocation evidence collection: OCSP responses and CRLs, accumulated
//! into the Adobe `RevocationInfoArchival` structure referenced from the
//! signed attributes.

use super::asn1::{build_context_specific, build_octet_string, build_oid, build_sequence, DerReader, NULL};
use super::keys::Certificate;
use super::{hex_encoded_len, oids, DigestAlgorithm, SignContext};
use crate::error::{RevocationError, SignResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-certificate revocation embedding callback. Invoked with each chain
/// certificate, its issuer (None for the root), and the archival
/// accumulator.
pub type RevocationFunction = Box<
    dyn Fn(&Certificate, Option<&Certificate>, &mut InfoArchival) -> Result<(), RevocationError>
        + Send
        + Sync,
>;

/// The `adbe-revocationInfoArchival` ASN.1 structure
/// (OID 1.2.840.113583.1.1.8): opaque DER CRLs under explicit tag 0,
/// OCSP responses under tag 1, other evidence under tag 2.
#[derive(Debug, Default, Clone)]
pub struct InfoArchival {
    crl: Vec<Vec<u8>>,
    ocsp: Vec<Vec<u8>>,
    other: Option<OtherRevInfo>,
}

/// Arbitrary extra revocation evidence.
#[derive(Debug, Clone)]
pub struct OtherRevInfo {
    /// DER body of the evidence type OID.
    pub oid: Vec<u8>,
    /// Raw evidence bytes.
    pub value: Vec<u8>,
}

impl InfoArchival {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a DER-encoded CRL.
    pub fn add_crl(&mut self, der: Vec<u8>) {
        self.crl.push(der);
    }

    /// Appends a DER-encoded OCSP response.
    pub fn add_ocsp(&mut self, der: Vec<u8>) {
        self.ocsp.push(der);
    }

    /// Sets the `other` evidence slot.
    pub fn set_other(&mut self, other: OtherRevInfo) {
        self.other = Some(other);
    }

    /// True when no evidence has been collected.
    pub fn is_empty(&self) -> bool {
        self.crl.is_empty() && self.ocsp.is_empty() && self.other.is_none()
    }

    pub(crate) fn crl_entries(&self) -> &[Vec<u8>] {
        &self.crl
    }

    pub(crate) fn ocsp_entries(&self) -> &[Vec<u8>] {
        &self.ocsp
    }

    /// DER-encodes the structure. Empty optional members are omitted.
    pub(crate) fn to_der(&self) -> Vec<u8> {
        let mut content = Vec::new();

        if !self.crl.is_empty() {
            let crls: Vec<u8> = self.crl.concat();
            content.extend_from_slice(&build_context_specific(0, &build_sequence(&crls)));
        }
        if !self.ocsp.is_empty() {
            let ocsps: Vec<u8> = self.ocsp.concat();
            content.extend_from_slice(&build_context_specific(1, &build_sequence(&ocsps)));
        }
        if let Some(other) = &self.other {
            let mut inner = build_oid(&other.oid);
            inner.extend_from_slice(&build_octet_string(&other.value));
            content.extend_from_slice(&build_context_specific(2, &build_sequence(&inner)));
        }

        build_sequence(&content)
    }
}

impl SignContext<'_> {
    /// Runs the revocation callback over the first chain (once per
    /// operation; a budget retry reuses the collected data) and charges
    /// every artefact to the signature length budget.
    pub(crate) fn fetch_revocation_data(&mut self) -> SignResult<()> {
        if !self.revocation_fetched {
            if let Some(function) = &self.sign_data.revocation_function {
                if let Some(chain) = self.sign_data.certificate_chains.first() {
                    let mut archival = std::mem::take(&mut self.sign_data.revocation_data);
                    for (i, certificate) in chain.iter().enumerate() {
                        function(certificate, chain.get(i + 1), &mut archival)?;
                    }
                    self.sign_data.revocation_data = archival;
                }
            }
            self.revocation_fetched = true;
        }

        for crl in self.sign_data.revocation_data.crl_entries() {
            self.signature_max_length += hex_encoded_len(crl.len());
        }
        for ocsp in self.sign_data.revocation_data.ocsp_entries() {
            self.signature_max_length += hex_encoded_len(ocsp.len());
        }

        Ok(())
    }
}

/// The default revocation embedder: queries the certificate's first OCSP
/// responder (when an issuer is known) and fetches its first CRL
/// distribution point. Failures abort the signing operation; callers
/// wanting a lenient policy supply their own [`RevocationFunction`].
pub fn embed_revocation_status(
    cert: &Certificate,
    issuer: Option<&Certificate>,
    archival: &mut InfoArchival,
) -> Result<(), RevocationError> {
    if let Some(issuer) = issuer {
        if let Some(server) = cert.ocsp_servers().first() {
            embed_ocsp_status(cert, issuer, server, archival)?;
        }
    }

    if let Some(url) = cert.crl_distribution_points().first() {
        let body = http_get(url)?;
        archival.add_crl(body);
    }

    Ok(())
}

fn embed_ocsp_status(
    cert: &Certificate,
    issuer: &Certificate,
    server: &str,
    archival: &mut InfoArchival,
) -> Result<(), RevocationError> {
    let request = build_ocsp_request(cert, issuer);
    let url = format!(
        "{}/{}",
        server.trim_end_matches('/'),
        url_escape(&BASE64.encode(&request))
    );

    let body = http_get(&url)?;
    validate_ocsp_response(&body, cert)?;
    archival.add_ocsp(body);
    Ok(())
}

/// Builds an unsigned OCSPRequest with a single SHA-1 CertID, the shape
/// every responder accepts.
fn build_ocsp_request(cert: &Certificate, issuer: &Certificate) -> Vec<u8> {
    let issuer_name_hash = DigestAlgorithm::Sha1.hash(cert.raw_issuer());
    let issuer_key_hash = DigestAlgorithm::Sha1.hash(&issuer.public_key_bits());

    let mut alg = build_oid(oids::OID_SHA1);
    alg.extend_from_slice(NULL);

    let mut cert_id = build_sequence(&alg);
    cert_id.extend_from_slice(&build_octet_string(&issuer_name_hash));
    cert_id.extend_from_slice(&build_octet_string(&issuer_key_hash));
    cert_id.extend_from_slice(cert.serial_der());

    let request = build_sequence(&build_sequence(&cert_id));
    let request_list = build_sequence(&request);
    let tbs_request = build_sequence(&request_list);
    build_sequence(&tbs_request)
}

/// Checks that the responder answered successfully with a basic response
/// that mentions the certificate's serial number.
fn validate_ocsp_response(body: &[u8], cert: &Certificate) -> Result<(), RevocationError> {
    let malformed = || RevocationError::OcspResponse("malformed response".to_string());

    let mut reader = DerReader::new(body);
    let outer = reader.read_expect(0x30).ok_or_else(malformed)?;
    let mut fields = DerReader::new(outer.content);

    let status = fields.read_expect(0x0A).ok_or_else(malformed)?;
    if status.content != [0] {
        return Err(RevocationError::OcspResponse(format!(
            "responder status {:?}",
            status.content
        )));
    }

    let response_bytes = fields.read_expect(0xA0).ok_or_else(malformed)?;
    let mut rb = DerReader::new(response_bytes.content);
    let seq = rb.read_expect(0x30).ok_or_else(malformed)?;
    let mut inner = DerReader::new(seq.content);

    let response_type = inner.read_expect(0x06).ok_or_else(malformed)?;
    if response_type.content != oids::OID_OCSP_BASIC {
        return Err(RevocationError::OcspResponse(
            "unexpected response type".to_string(),
        ));
    }

    let basic = inner.read_expect(0x04).ok_or_else(malformed)?;
    let serial = cert.serial_der();
    let mentions_serial = basic
        .content
        .windows(serial.len())
        .any(|w| w == serial);
    if !mentions_serial {
        return Err(RevocationError::OcspResponse(
            "response does not match certificate".to_string(),
        ));
    }

    Ok(())
}

fn http_get(url: &str) -> Result<Vec<u8>, RevocationError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| RevocationError::Http(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| RevocationError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RevocationError::Http(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| RevocationError::Http(e.to_string()))
}

/// Percent-encodes the base64 characters that collide with URL syntax.
fn url_escape(base64: &str) -> String {
    let mut out = String::with_capacity(base64.len());
    for c in base64.chars() {
        match c {
            '+' => out.push_str("%2B"),
            '/' => out.push_str("%2F"),
            '=' => out.push_str("%3D"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_archival_empty() {
        let archival = InfoArchival::new();
        assert!(archival.is_empty());
        // An empty structure is still a valid (empty) SEQUENCE.
        assert_eq!(archival.to_der(), vec![0x30, 0x00]);
    }

    #[test]
    fn test_info_archival_tags() {
        let mut archival = InfoArchival::new();
        archival.add_crl(vec![0x30, 0x01, 0x00]);
        archival.add_ocsp(vec![0x30, 0x01, 0x01]);
        let der = archival.to_der();

        let mut reader = DerReader::new(&der);
        let outer = reader.read_expect(0x30).unwrap();
        let mut fields = DerReader::new(outer.content);

        let crls = fields.read_expect(0xA0).unwrap();
        let mut crl_seq = DerReader::new(crls.content);
        let seq = crl_seq.read_expect(0x30).unwrap();
        assert_eq!(seq.content, &[0x30, 0x01, 0x00]);

        let ocsps = fields.read_expect(0xA1).unwrap();
        let mut ocsp_seq = DerReader::new(ocsps.content);
        let seq = ocsp_seq.read_expect(0x30).unwrap();
        assert_eq!(seq.content, &[0x30, 0x01, 0x01]);

        assert!(fields.is_empty());
    }

    #[test]
    fn test_url_escape() {
        assert_eq!(url_escape("a+b/c="), "a%2Bb%2Fc%3D");
        assert_eq!(url_escape("plain"), "plain");
    }

    #[test]
    fn test_validate_ocsp_response_rejects_garbage() {
        let cert_err = validate_ocsp_response(b"not der", &fake_cert());
        assert!(cert_err.is_err());
    }

    #[test]
    fn test_validate_ocsp_response_accepts_matching() {
        let cert = fake_cert();

        // OCSPResponse { status 0, [0] { SEQ { id-pkix-ocsp-basic, OCTET { ...serial... } } } }
        let mut basic_content = b"prefix".to_vec();
        basic_content.extend_from_slice(cert.serial_der());

        let mut inner = build_oid(oids::OID_OCSP_BASIC);
        inner.extend_from_slice(&build_octet_string(&basic_content));
        let response_bytes = build_context_specific(0, &build_sequence(&inner));

        let mut outer = vec![0x0A, 0x01, 0x00];
        outer.extend_from_slice(&response_bytes);
        let response = build_sequence(&outer);

        assert!(validate_ocsp_response(&response, &cert).is_ok());
    }

    fn fake_cert() -> Certificate {
        crate::signer::test_support::test_certificate()
    }
}

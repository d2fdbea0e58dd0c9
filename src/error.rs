//! Error types for the pdf-sign library.

use thiserror::Error;

/// The main error type for PDF signing operations.
#[derive(Debug, Error)]
pub enum SignError {
    /// Error while parsing the input PDF.
    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),

    /// Error while building or embedding the signature.
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Error while loading signing credentials.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Error while collecting revocation information.
    #[error("Revocation error: {0}")]
    Revocation(#[from] RevocationError),

    /// Error while obtaining an RFC 3161 timestamp.
    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to parsing the input PDF structure.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to find PDF header.
    #[error("Invalid PDF: missing or invalid header")]
    InvalidHeader,

    /// Failed to find or parse the trailer.
    #[error("Invalid PDF: missing or invalid trailer")]
    InvalidTrailer,

    /// Failed to parse the cross-reference table.
    #[error("Invalid PDF: failed to parse xref table")]
    InvalidXref,

    /// Failed to parse a cross-reference stream.
    #[error("Invalid cross-reference stream")]
    InvalidXrefStream,

    /// The cross-reference section contains no entries.
    #[error("No xref entries found")]
    EmptyXref,

    /// Failed to parse an object.
    #[error("Failed to parse object at offset {0}: {1}")]
    ParseFailed(u64, String),

    /// Invalid object stream.
    #[error("Invalid object stream: {0}")]
    InvalidObjectStream(String),

    /// The requested page does not exist.
    #[error("Page number {0} not found")]
    PageNotFound(u32),

    /// The catalog has no page tree.
    #[error("Document catalog has no Pages tree")]
    NoPagesTree,

    /// Encrypted PDFs cannot be signed.
    #[error("Encrypted PDF is not supported")]
    EncryptedPdf,

    /// Failed to decompress a stream.
    #[error("Decompression failed: {0}")]
    Decompression(String),
}

/// Errors related to signature construction and embedding.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Visible signatures require an approval signature type.
    #[error("Visible signatures are only allowed for approval signatures")]
    VisibleSignatureNotAllowed,

    /// The appearance rectangle is degenerate.
    #[error("Invalid rectangle dimensions: width {width:.2} and height {height:.2} must be greater than 0")]
    InvalidRectangle {
        /// Rectangle width.
        width: f64,
        /// Rectangle height.
        height: f64,
    },

    /// The hex-encoded signature exceeded the reserved hole. This is the
    /// one error the signing loop recovers from, by enlarging the budget
    /// and rebuilding the output.
    #[error("Signature needs {required} hex digits but only {reserved} are reserved")]
    BudgetExceeded {
        /// Hex digits the signature actually needs.
        required: usize,
        /// Hex digits currently reserved.
        reserved: usize,
    },

    /// A placeholder could not be located in the output buffer.
    #[error("Failed to find {0} placeholder")]
    PlaceholderNotFound(&'static str),

    /// The formatted byte range does not fit the reserved placeholder.
    #[error("Byte range string ({actual} bytes) exceeds placeholder ({placeholder} bytes)")]
    ByteRangeOverflow {
        /// Length of the formatted byte range string.
        actual: usize,
        /// Length of the placeholder.
        placeholder: usize,
    },

    /// A value that cannot appear as a direct object was encountered
    /// while serialising the catalog or a page update.
    #[error("Cannot serialize value as a direct object: {0}")]
    UnsupportedDirectObject(&'static str),

    /// The private key refused to produce a signature.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// PKCS#7 / CMS construction failed.
    #[error("PKCS#7 encoding error: {0}")]
    Pkcs7(String),
}

/// Errors related to loading certificates and private keys.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to load or parse a certificate.
    #[error("Failed to load certificate: {0}")]
    CertificateLoad(String),

    /// Failed to load or parse a private key.
    #[error("Failed to load private key: {0}")]
    PrivateKeyLoad(String),

    /// Only RSA and ECDSA keys are accepted.
    #[error("Unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),
}

/// Errors related to OCSP and CRL collection.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// HTTP transport failure.
    #[error("Revocation endpoint request failed: {0}")]
    Http(String),

    /// Failed to build the OCSP request.
    #[error("Failed to build OCSP request: {0}")]
    OcspRequest(String),

    /// The OCSP responder returned an unusable response.
    #[error("Invalid OCSP response: {0}")]
    OcspResponse(String),
}

/// Errors related to RFC 3161 timestamping.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// A bare timestamp signature requires a TSA configuration.
    #[error("No timestamp authority configured")]
    NotConfigured,

    /// HTTP transport failure.
    #[error("Timestamp request failed: {0}")]
    Transport(String),

    /// The TSA answered with a non-success HTTP status.
    #[error("Non success response ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },

    /// The TSA response could not be parsed or was not granted.
    #[error("Invalid timestamp response: {0}")]
    Response(String),
}

/// A specialized Result type for signing operations.
pub type SignResult<T> = Result<T, SignError>;

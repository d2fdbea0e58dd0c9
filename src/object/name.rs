//! PDF Name object.

/// A PDF name object, written with a leading slash (e.g. `/Type`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfName(String);

impl PdfName {
    /// Creates a name without validating the characters.
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name without the leading slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Serializes the name to PDF format, escaping delimiter and
    /// non-printable bytes with `#xx`.
    pub fn to_pdf_string(&self) -> String {
        let mut result = String::with_capacity(self.0.len() + 1);
        result.push('/');
        for byte in self.0.bytes() {
            if Self::needs_escape(byte) {
                result.push('#');
                result.push_str(&format!("{:02X}", byte));
            } else {
                result.push(byte as char);
            }
        }
        result
    }

    fn needs_escape(byte: u8) -> bool {
        !(33..=126).contains(&byte)
            || matches!(
                byte,
                b'#' | b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}'
            )
    }
}

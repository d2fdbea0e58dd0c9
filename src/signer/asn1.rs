//! Minimal DER encoding and decoding helpers.
//!
//! CMS assembly writes DER with explicit builder functions; parsing of
//! responses (OCSP, RFC 3161) only needs a tag-length-value walker.

/// Encodes a length in DER form.
pub(crate) fn encode_length(len: usize) -> Vec<u8> {
    if len < 128 {
        vec![len as u8]
    } else if len < 256 {
        vec![0x81, len as u8]
    } else if len < 65536 {
        vec![0x82, (len >> 8) as u8, (len & 0xFF) as u8]
    } else if len < 16777216 {
        vec![
            0x83,
            (len >> 16) as u8,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ]
    } else {
        vec![
            0x84,
            (len >> 24) as u8,
            ((len >> 16) & 0xFF) as u8,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ]
    }
}

/// Builds an arbitrary tag-length-value triple.
pub(crate) fn build_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 5);
    out.push(tag);
    out.extend_from_slice(&encode_length(content.len()));
    out.extend_from_slice(content);
    out
}

/// Builds a DER SEQUENCE.
pub(crate) fn build_sequence(content: &[u8]) -> Vec<u8> {
    build_tlv(0x30, content)
}

/// Builds a DER SET.
pub(crate) fn build_set(content: &[u8]) -> Vec<u8> {
    build_tlv(0x31, content)
}

/// Builds a DER OCTET STRING.
pub(crate) fn build_octet_string(content: &[u8]) -> Vec<u8> {
    build_tlv(0x04, content)
}

/// Builds a DER OBJECT IDENTIFIER from its content bytes.
pub(crate) fn build_oid(body: &[u8]) -> Vec<u8> {
    build_tlv(0x06, body)
}

/// Builds a DER BOOLEAN.
pub(crate) fn build_boolean(value: bool) -> Vec<u8> {
    vec![0x01, 0x01, if value { 0xFF } else { 0x00 }]
}

/// Builds a DER INTEGER from a non-negative value.
pub(crate) fn build_integer(value: i64) -> Vec<u8> {
    let mut bytes = vec![0x02];
    if value == 0 {
        bytes.push(0x01);
        bytes.push(0x00);
        return bytes;
    }

    let mut val = value;
    let mut int_bytes = Vec::new();
    while val != 0 {
        int_bytes.push((val & 0xFF) as u8);
        val >>= 8;
    }
    // Leading zero keeps the value positive.
    if int_bytes.last().map(|&b| b & 0x80 != 0).unwrap_or(false) {
        int_bytes.push(0x00);
    }
    int_bytes.reverse();

    bytes.extend_from_slice(&encode_length(int_bytes.len()));
    bytes.extend_from_slice(&int_bytes);
    bytes
}

/// Builds a constructed context-specific value `[n] { content }`.
pub(crate) fn build_context_specific(tag_num: u8, content: &[u8]) -> Vec<u8> {
    build_tlv(0xA0 | tag_num, content)
}

/// Builds a DER UTCTime from a pre-formatted `YYMMDDHHMMSSZ` string.
pub(crate) fn build_utc_time(formatted: &str) -> Vec<u8> {
    build_tlv(0x17, formatted.as_bytes())
}

/// NULL value.
pub(crate) const NULL: &[u8] = &[0x05, 0x00];

/// A decoded tag-length-value triple.
pub(crate) struct Tlv<'a> {
    /// The tag byte.
    pub tag: u8,
    /// The content bytes.
    pub content: &'a [u8],
    /// The full encoding, including tag and length.
    pub raw: &'a [u8],
}

/// A forward-only DER reader.
pub(crate) struct DerReader<'a> {
    data: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// True when no bytes remain.
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the next TLV, advancing past it.
    pub(crate) fn read(&mut self) -> Option<Tlv<'a>> {
        let data = self.data;
        if data.len() < 2 {
            return None;
        }

        let tag = data[0];
        let first = data[1];
        let (len, header) = if first < 0x80 {
            (first as usize, 2)
        } else {
            let num_bytes = (first & 0x7F) as usize;
            if num_bytes == 0 || num_bytes > 4 || data.len() < 2 + num_bytes {
                return None;
            }
            let mut len = 0usize;
            for &b in &data[2..2 + num_bytes] {
                len = (len << 8) | b as usize;
            }
            (len, 2 + num_bytes)
        };

        if data.len() < header + len {
            return None;
        }

        let tlv = Tlv {
            tag,
            content: &data[header..header + len],
            raw: &data[..header + len],
        };
        self.data = &data[header + len..];
        Some(tlv)
    }

    /// Reads the next TLV and checks its tag.
    pub(crate) fn read_expect(&mut self, tag: u8) -> Option<Tlv<'a>> {
        let tlv = self.read()?;
        if tlv.tag != tag {
            return None;
        }
        Some(tlv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_length() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(127), vec![0x7F]);
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(256), vec![0x82, 0x01, 0x00]);
    }

    #[test]
    fn test_build_integer() {
        assert_eq!(build_integer(0), vec![0x02, 0x01, 0x00]);
        assert_eq!(build_integer(1), vec![0x02, 0x01, 0x01]);
        assert_eq!(build_integer(127), vec![0x02, 0x01, 0x7F]);
        // 128 needs a leading zero to stay positive.
        assert_eq!(build_integer(128), vec![0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn test_build_sequence() {
        assert_eq!(
            build_sequence(&[0x02, 0x01, 0x01]),
            vec![0x30, 0x03, 0x02, 0x01, 0x01]
        );
    }

    #[test]
    fn test_build_octet_string() {
        assert_eq!(
            build_octet_string(&[0x01, 0x02, 0x03]),
            vec![0x04, 0x03, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn test_build_boolean() {
        assert_eq!(build_boolean(true), vec![0x01, 0x01, 0xFF]);
    }

    #[test]
    fn test_reader_roundtrip() {
        let der = build_sequence(&[&build_integer(5)[..], &build_boolean(true)[..]].concat());
        let mut reader = DerReader::new(&der);
        let seq = reader.read_expect(0x30).unwrap();
        assert!(reader.is_empty());

        let mut inner = DerReader::new(seq.content);
        let int = inner.read_expect(0x02).unwrap();
        assert_eq!(int.content, &[0x05]);
        let boolean = inner.read_expect(0x01).unwrap();
        assert_eq!(boolean.content, &[0xFF]);
        assert!(inner.is_empty());
    }

    #[test]
    fn test_reader_long_form_length() {
        let content = vec![0xAA; 200];
        let der = build_octet_string(&content);
        let mut reader = DerReader::new(&der);
        let tlv = reader.read_expect(0x04).unwrap();
        assert_eq!(tlv.content.len(), 200);
        assert_eq!(tlv.raw.len(), 203);
    }
}

//! PDF Stream object.

use super::{Object, PdfDictionary};
use crate::error::ParseError;

/// A PDF stream: a dictionary followed by raw binary data.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    /// The stream dictionary.
    pub dictionary: PdfDictionary,
    data: Vec<u8>,
}

impl PdfStream {
    /// Creates a stream from a dictionary and raw data.
    pub fn with_dictionary(dictionary: PdfDictionary, data: Vec<u8>) -> Self {
        Self { dictionary, data }
    }

    /// Returns the raw (possibly compressed) stream data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true if the stream is Flate-compressed.
    pub fn is_flate(&self) -> bool {
        match self.dictionary.get("Filter") {
            Some(Object::Name(name)) => name.as_str() == "FlateDecode",
            Some(Object::Array(arr)) => arr
                .iter()
                .any(|o| matches!(o, Object::Name(n) if n.as_str() == "FlateDecode")),
            _ => false,
        }
    }

    /// Returns the decoded stream data, inflating if necessary.
    pub fn decoded_data(&self) -> Result<Vec<u8>, ParseError> {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        if !self.is_flate() {
            return Ok(self.data.clone());
        }

        let mut decoder = ZlibDecoder::new(&self.data[..]);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| ParseError::Decompression(e.to_string()))?;
        Ok(decompressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PdfName;

    fn flate(data: &[u8]) -> Vec<u8> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decoded_data_plain() {
        let stream = PdfStream::with_dictionary(PdfDictionary::new(), b"abc".to_vec());
        assert!(!stream.is_flate());
        assert_eq!(stream.decoded_data().unwrap(), b"abc");
    }

    #[test]
    fn test_decoded_data_flate() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", Object::Name(PdfName::new_unchecked("FlateDecode")));
        let stream = PdfStream::with_dictionary(dict, flate(b"hello stream"));
        assert!(stream.is_flate());
        assert_eq!(stream.decoded_data().unwrap(), b"hello stream");
    }
}

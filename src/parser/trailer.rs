//! PDF trailer parsing.

use crate::error::ParseError;
use crate::object::{Object, PdfDictionary};
use crate::parser::lexer::{parse_trailer_keyword, skip_whitespace};
use crate::parser::objects::parse_object;
use crate::types::ObjectId;
use nom::IResult;

/// Parsed PDF trailer information.
#[derive(Debug)]
pub struct Trailer {
    /// The trailer dictionary (or the xref stream dictionary).
    pub dict: PdfDictionary,
    /// Reference to the catalog (root) object.
    pub root: ObjectId,
    /// Reference to the encryption dictionary (optional).
    pub encrypt: Option<ObjectId>,
    /// Previous xref offset (for incremental updates).
    pub prev: Option<u64>,
    /// Value of the `/Size` entry.
    pub size: i64,
}

impl Trailer {
    /// Creates a Trailer from a dictionary.
    pub fn from_dictionary(dict: PdfDictionary) -> Result<Self, ParseError> {
        let root = match dict.get("Root") {
            Some(Object::Reference(id)) => *id,
            _ => return Err(ParseError::InvalidTrailer),
        };

        let size = match dict.get("Size") {
            Some(Object::Integer(n)) => *n,
            _ => return Err(ParseError::InvalidTrailer),
        };

        let encrypt = match dict.get("Encrypt") {
            Some(Object::Reference(id)) => Some(*id),
            Some(Object::Dictionary(_)) => Some(ObjectId::new(0)),
            _ => None,
        };

        let prev = match dict.get("Prev") {
            Some(Object::Integer(n)) => Some(*n as u64),
            _ => None,
        };

        Ok(Self {
            dict,
            root,
            encrypt,
            prev,
            size,
        })
    }
}

/// Parse the trailer section (`trailer << ... >>`).
pub fn parse_trailer(input: &[u8]) -> IResult<&[u8], PdfDictionary> {
    let (input, _) = parse_trailer_keyword(input)?;
    let (input, _) = skip_whitespace(input)?;

    let (input, obj) = parse_object(input)?;

    match obj {
        Object::Dictionary(dict) => Ok((input, dict)),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailer() {
        let input = b"trailer\n<< /Root 1 0 R /Size 10 >>\nstartxref";
        let (remaining, dict) = parse_trailer(input).unwrap();
        assert!(remaining.starts_with(b"\nstartxref"));
        assert!(dict.get("Root").is_some());
        assert!(dict.get("Size").is_some());
    }

    #[test]
    fn test_trailer_from_dictionary() {
        let mut dict = PdfDictionary::new();
        dict.set("Root", Object::Reference((1, 0).into()));
        dict.set("Size", Object::Integer(10));
        dict.set("Prev", Object::Integer(1234));

        let trailer = Trailer::from_dictionary(dict).unwrap();
        assert_eq!(trailer.root.number, 1);
        assert_eq!(trailer.size, 10);
        assert_eq!(trailer.prev, Some(1234));
    }

    #[test]
    fn test_trailer_missing_root() {
        let mut dict = PdfDictionary::new();
        dict.set("Size", Object::Integer(10));
        assert!(Trailer::from_dictionary(dict).is_err());
    }
}

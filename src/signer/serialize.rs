//! Generic PDF value serialisation for incremental updates.
//!
//! Copying the original catalog (and, for visible signatures, the page
//! dictionary) back out requires re-serialising parsed values. Traversal
//! uses an explicit work stack so pathological nesting depth cannot
//! overflow the call stack.

use crate::error::{SignResult, SignatureError};
use crate::object::Object;
use crate::parser::{Value, ValueKind};

enum Frame<'r> {
    Start(Value<'r>),
    Dict {
        value: Value<'r>,
        keys: Vec<String>,
        index: usize,
    },
    Array {
        value: Value<'r>,
        index: usize,
    },
}

/// Serialises `value` into `out`.
///
/// Values resolved through an indirect reference are written as `n g R`;
/// direct children of object `owner` are written inline.
pub(crate) fn write_value(out: &mut Vec<u8>, owner: u32, value: &Value<'_>) -> SignResult<()> {
    let mut stack = vec![Frame::Start(value.clone())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Start(v) => {
                if v.ptr().number != owner {
                    out.extend_from_slice(v.ptr().reference_string().as_bytes());
                    continue;
                }

                match v.kind() {
                    ValueKind::Null => out.extend_from_slice(b"null"),
                    ValueKind::Boolean => {
                        out.extend_from_slice(if v.boolean() { b"true" } else { b"false" })
                    }
                    ValueKind::Integer => out.extend_from_slice(v.int64().to_string().as_bytes()),
                    ValueKind::Real => out.extend_from_slice(
                        crate::object::format_real(v.float64()).as_bytes(),
                    ),
                    ValueKind::Name => match v.object() {
                        Object::Name(n) => out.extend_from_slice(n.to_pdf_string().as_bytes()),
                        _ => unreachable!(),
                    },
                    ValueKind::String => match v.object() {
                        Object::String(s) => out.extend_from_slice(s.to_pdf_string().as_bytes()),
                        _ => unreachable!(),
                    },
                    ValueKind::Dict => {
                        out.extend_from_slice(b"<<");
                        stack.push(Frame::Dict {
                            keys: v.keys(),
                            value: v,
                            index: 0,
                        });
                    }
                    ValueKind::Array => {
                        out.extend_from_slice(b"[");
                        stack.push(Frame::Array { value: v, index: 0 });
                    }
                    ValueKind::Stream => {
                        return Err(SignatureError::UnsupportedDirectObject("stream").into())
                    }
                }
            }

            Frame::Dict { value, keys, index } => {
                if index >= keys.len() {
                    out.extend_from_slice(b">>");
                } else {
                    if index > 0 {
                        out.push(b' ');
                    }
                    let key = keys[index].clone();
                    out.push(b'/');
                    out.extend_from_slice(key.as_bytes());
                    out.push(b' ');
                    let child = value.key(&key);
                    stack.push(Frame::Dict {
                        value,
                        keys,
                        index: index + 1,
                    });
                    stack.push(Frame::Start(child));
                }
            }

            Frame::Array { value, index } => {
                if index >= value.len() {
                    out.extend_from_slice(b"]");
                } else {
                    if index > 0 {
                        out.push(b' ');
                    }
                    let child = value.index(index);
                    stack.push(Frame::Array {
                        value,
                        index: index + 1,
                    });
                    stack.push(Frame::Start(child));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PdfReader;

    fn sample_pdf() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::new();
        offsets.push(out.len());
        out.extend_from_slice(
            b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R /Lang (en-US) /Extra << /Deep [1 2.5 /N true null] >> >>\nendobj\n",
        );
        offsets.push(out.len());
        out.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
        offsets.push(out.len());
        out.extend_from_slice(b"3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n");

        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
        for off in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        out.extend_from_slice(b"trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n%%EOF\n", xref_start).as_bytes());
        out
    }

    #[test]
    fn test_reference_written_as_indirect() {
        let reader = PdfReader::from_bytes(sample_pdf()).unwrap();
        let root = reader.trailer().key("Root");
        let mut out = Vec::new();
        write_value(&mut out, root.ptr().number, &root.key("Pages")).unwrap();
        assert_eq!(out, b"2 0 R");
    }

    #[test]
    fn test_direct_values_written_inline() {
        let reader = PdfReader::from_bytes(sample_pdf()).unwrap();
        let root = reader.trailer().key("Root");

        let mut out = Vec::new();
        write_value(&mut out, root.ptr().number, &root.key("Lang")).unwrap();
        assert_eq!(out, b"(en-US)");

        let mut out = Vec::new();
        write_value(&mut out, root.ptr().number, &root.key("Extra")).unwrap();
        assert_eq!(out, b"<</Deep [1 2.5 /N true null]>>");
    }
}

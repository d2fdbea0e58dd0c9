//! PDF text formatting and page tree lookup.

use crate::error::{ParseError, SignResult};
use crate::parser::Value;
use chrono::{DateTime, FixedOffset};

/// Formats text as a PDF string literal.
///
/// ASCII text gets backslash, parenthesis and CR escapes. Anything else is
/// emitted as UTF-16BE with a byte order mark, which is how readers expect
/// non-Latin signer names.
pub(crate) fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');

    if text.is_ascii() {
        for b in text.bytes() {
            match b {
                b'\\' => out.extend_from_slice(b"\\\\"),
                b'(' => out.extend_from_slice(b"\\("),
                b')' => out.extend_from_slice(b"\\)"),
                b'\r' => out.extend_from_slice(b"\\r"),
                _ => out.push(b),
            }
        }
    } else {
        out.extend_from_slice(&[0xFE, 0xFF]);
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
    }

    out.push(b')');
    out
}

/// Formats a date as `D:YYYYMMDDHHMMSS±HH'MM'` wrapped as a PDF string.
pub(crate) fn pdf_date_time(date: &DateTime<FixedOffset>) -> Vec<u8> {
    let offset_seconds = date.offset().local_minus_utc();
    let abs = offset_seconds.unsigned_abs();
    let hours = abs / 3600;
    let minutes = (abs % 3600) / 60;
    let sign = if offset_seconds < 0 { '-' } else { '+' };

    let formatted = format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        hours,
        minutes
    );
    pdf_string(&formatted)
}

/// Walks the page tree iteratively and returns the page with the given
/// 1-based number.
pub(crate) fn find_page_by_number<'r>(pages: Value<'r>, target: u32) -> SignResult<Value<'r>> {
    let mut stack = vec![pages];
    let mut current = 0u32;

    while let Some(node) = stack.pop() {
        match node.key("Type").name() {
            "Pages" => {
                let kids = node.key("Kids");
                // Reverse push keeps document order when popping.
                for i in (0..kids.len()).rev() {
                    stack.push(kids.index(i));
                }
            }
            "Page" => {
                current += 1;
                if current == target {
                    return Ok(node);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::PageNotFound(target).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pdf_string_ascii() {
        assert_eq!(pdf_string("Hello"), b"(Hello)");
        assert_eq!(pdf_string("a(b)c"), b"(a\\(b\\)c)");
        assert_eq!(pdf_string("back\\slash"), b"(back\\\\slash)");
    }

    #[test]
    fn test_pdf_string_utf16() {
        let out = pdf_string("Zoë");
        assert_eq!(out[0], b'(');
        assert_eq!(&out[1..3], &[0xFE, 0xFF]);
        assert_eq!(&out[3..9], &[0x00, b'Z', 0x00, b'o', 0x00, 0xEB]);
        assert_eq!(out[9], b')');
    }

    #[test]
    fn test_pdf_date_time_positive_offset() {
        let tz = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let date = tz.with_ymd_and_hms(2024, 3, 7, 14, 30, 5).unwrap();
        assert_eq!(pdf_date_time(&date), b"(D:20240307143005+05'30')");
    }

    #[test]
    fn test_pdf_date_time_negative_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let date = tz.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(pdf_date_time(&date), b"(D:20241231235959-05'00')");
    }
}

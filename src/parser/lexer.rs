//! PDF lexer - low-level token parsers.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, one_of},
    combinator::{map_res, opt, recognize, value},
    multi::many0,
    sequence::pair,
    IResult,
};

/// Skip whitespace and comments.
pub fn skip_whitespace(input: &[u8]) -> IResult<&[u8], ()> {
    let (input, _) = many0(alt((value((), whitespace1), value((), comment))))(input)?;
    Ok((input, ()))
}

/// One or more PDF whitespace bytes (including NUL and form feed).
fn whitespace1(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let end = input
        .iter()
        .position(|c| !is_whitespace(*c))
        .unwrap_or(input.len());
    if end == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeWhile1,
        )));
    }
    Ok((&input[end..], &input[..end]))
}

/// Check if a byte is PDF whitespace.
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0')
}

/// Parse a PDF comment (% to end of line).
fn comment(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = char('%')(input)?;
    let (input, content) = take_while(|c| c != b'\n' && c != b'\r')(input)?;
    let (input, _) = opt(alt((tag(b"\r\n"), tag(b"\n"), tag(b"\r"))))(input)?;
    Ok((input, content))
}

/// Parse a boolean value.
pub fn parse_boolean(input: &[u8]) -> IResult<&[u8], bool> {
    alt((value(true, tag(b"true")), value(false, tag(b"false"))))(input)
}

/// Parse an integer.
pub fn parse_integer(input: &[u8]) -> IResult<&[u8], i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &[u8]| {
        std::str::from_utf8(s)
            .map_err(|_| "invalid utf8")
            .and_then(|s| s.parse::<i64>().map_err(|_| "invalid integer"))
    })(input)
}

/// Parse a PDF name (starts with /).
pub fn parse_name(input: &[u8]) -> IResult<&[u8], String> {
    let (input, _) = char('/')(input)?;
    let (input, name_bytes) = take_while(is_name_char)(input)?;

    // Decode #xx escapes.
    let mut name = String::with_capacity(name_bytes.len());
    let mut i = 0;
    while i < name_bytes.len() {
        let c = name_bytes[i];
        if c == b'#' && i + 2 < name_bytes.len() {
            let hex = std::str::from_utf8(&name_bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                name.push(byte as char);
                i += 3;
                continue;
            }
        }
        name.push(c as char);
        i += 1;
    }
    Ok((input, name))
}

/// Check if a character is valid in a PDF name.
fn is_name_char(c: u8) -> bool {
    !matches!(c,
        b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0' | // whitespace
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' // delimiters
    )
}

/// Parse a literal string (delimited by parentheses).
pub fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (mut input, _) = char('(')(input)?;
    let mut result = Vec::new();
    let mut paren_depth = 1;

    while paren_depth > 0 {
        if input.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Eof,
            )));
        }

        let c = input[0];
        input = &input[1..];

        match c {
            b'(' => {
                paren_depth += 1;
                result.push(c);
            }
            b')' => {
                paren_depth -= 1;
                if paren_depth > 0 {
                    result.push(c);
                }
            }
            b'\\' => {
                if input.is_empty() {
                    return Err(nom::Err::Error(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Eof,
                    )));
                }
                let escaped = input[0];
                input = &input[1..];
                match escaped {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(0x08),
                    b'f' => result.push(0x0c),
                    b'(' => result.push(b'('),
                    b')' => result.push(b')'),
                    b'\\' => result.push(b'\\'),
                    b'\r' | b'\n' => {
                        // Line continuation
                        if escaped == b'\r' && !input.is_empty() && input[0] == b'\n' {
                            input = &input[1..];
                        }
                    }
                    b'0'..=b'7' => {
                        let mut octal_val = escaped - b'0';
                        for _ in 0..2 {
                            if !input.is_empty() && (b'0'..=b'7').contains(&input[0]) {
                                octal_val = octal_val.wrapping_mul(8) + (input[0] - b'0');
                                input = &input[1..];
                            } else {
                                break;
                            }
                        }
                        result.push(octal_val);
                    }
                    _ => result.push(escaped),
                }
            }
            _ => result.push(c),
        }
    }

    Ok((input, result))
}

/// Parse a hexadecimal string (delimited by angle brackets).
pub fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (input, _) = char('<')(input)?;
    let (input, hex_chars) =
        take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c))(input)?;
    let (input, _) = char('>')(input)?;

    let digits: Vec<u8> = hex_chars
        .iter()
        .copied()
        .filter(|c| c.is_ascii_hexdigit())
        .collect();

    let mut bytes = Vec::with_capacity(digits.len() / 2 + 1);
    for chunk in digits.chunks(2) {
        let hi = (chunk[0] as char).to_digit(16).unwrap_or(0) as u8;
        let lo = if chunk.len() == 2 {
            (chunk[1] as char).to_digit(16).unwrap_or(0) as u8
        } else {
            0 // odd digit count: pad with zero
        };
        bytes.push((hi << 4) | lo);
    }

    Ok((input, bytes))
}

/// Parse null.
pub fn parse_null(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"null"))(input)
}

/// Parse array start.
pub fn parse_array_start(input: &[u8]) -> IResult<&[u8], ()> {
    value((), char('['))(input)
}

/// Parse array end.
pub fn parse_array_end(input: &[u8]) -> IResult<&[u8], ()> {
    value((), char(']'))(input)
}

/// Parse dictionary start.
pub fn parse_dict_start(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"<<"))(input)
}

/// Parse dictionary end.
pub fn parse_dict_end(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b">>"))(input)
}

/// Parse the stream keyword and its mandatory EOL.
pub fn parse_stream(input: &[u8]) -> IResult<&[u8], ()> {
    let (input, _) = tag(b"stream")(input)?;
    let (input, _) = alt((tag(b"\r\n"), tag(b"\n"), tag(b"\r")))(input)?;
    Ok((input, ()))
}

/// Parse endstream keyword.
pub fn parse_endstream(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"endstream"))(input)
}

/// Parse xref keyword.
pub fn parse_xref(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"xref"))(input)
}

/// Parse trailer keyword.
pub fn parse_trailer_keyword(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"trailer"))(input)
}

/// Parse obj keyword.
pub fn parse_obj(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"obj"))(input)
}

/// Parse endobj keyword.
pub fn parse_endobj(input: &[u8]) -> IResult<&[u8], ()> {
    value((), tag(b"endobj"))(input)
}

/// Parse R keyword (reference).
pub fn parse_r(input: &[u8]) -> IResult<&[u8], ()> {
    value((), char('R'))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean(b"true"), Ok((&b""[..], true)));
        assert_eq!(parse_boolean(b"false"), Ok((&b""[..], false)));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(b"123"), Ok((&b""[..], 123)));
        assert_eq!(parse_integer(b"-456"), Ok((&b""[..], -456)));
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse_name(b"/Type"), Ok((&b""[..], "Type".to_string())));
        assert_eq!(parse_name(b"/A#20B"), Ok((&b""[..], "A B".to_string())));
    }

    #[test]
    fn test_parse_literal_string() {
        assert_eq!(
            parse_literal_string(b"(Hello)"),
            Ok((&b""[..], b"Hello".to_vec()))
        );
        assert_eq!(
            parse_literal_string(b"(Nested (parens) here)"),
            Ok((&b""[..], b"Nested (parens) here".to_vec()))
        );
        assert_eq!(
            parse_literal_string(b"(a\\(b)"),
            Ok((&b""[..], b"a(b".to_vec()))
        );
    }

    #[test]
    fn test_parse_hex_string() {
        assert_eq!(
            parse_hex_string(b"<48656C6C6F>"),
            Ok((&b""[..], b"Hello".to_vec()))
        );
        assert_eq!(
            parse_hex_string(b"<48 65 6C 6C 6F>"),
            Ok((&b""[..], b"Hello".to_vec()))
        );
        // Odd digit count pads with zero.
        assert_eq!(parse_hex_string(b"<ABC>"), Ok((&b""[..], vec![0xAB, 0xC0])));
    }
}

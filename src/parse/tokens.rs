//! Line and token splitting for kernel virtual files.
//!
//! Virtual files are small, so everything here borrows from the content
//! read by [`crate::fsutil::read_virtual_file`] instead of streaming.

use super::{Arity, EscapeError, ParseError};

/// Returns the non-empty lines of `content`, split on `\n`.
pub fn lines(content: &str) -> Vec<&str> {
    content.split('\n').filter(|line| !line.is_empty()).collect()
}

/// Splits a line on runs of ASCII spaces.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split(' ').filter(|tok| !tok.is_empty()).collect()
}

/// Returns the only line of `content`.
///
/// # Errors
///
/// [`ParseError::LineCount`] unless there is exactly one non-empty line.
pub fn single_line(content: &str) -> Result<&str, ParseError> {
    let lines = lines(content);
    match lines.as_slice() {
        [line] => Ok(line),
        _ => Err(ParseError::LineCount {
            expected: Arity::Exactly(1),
            actual: lines.len(),
        }),
    }
}

/// One line of a nested keyed file: `<group> <subkey>=<value> ...`.
#[derive(Debug, PartialEq, Eq)]
pub struct KvPairs<'a> {
    pub group: &'a str,
    pub pairs: Vec<(&'a str, &'a str)>,
}

impl KvPairs<'_> {
    /// Number of fields on the line, group key included.
    pub fn field_count(&self) -> usize {
        self.pairs.len() + 1
    }
}

/// Parses a nested keyed line.
///
/// The first token is the group key, every following token must be a
/// `subkey=value` pair with both sides present.
pub fn parse_nested_keyed_line(line: &str, lineno: usize) -> Result<KvPairs<'_>, ParseError> {
    let mut toks = tokens(line).into_iter();
    let group = toks.next().ok_or(ParseError::TokenCount {
        line: lineno,
        expected: Arity::AtLeast(1),
        actual: 0,
    })?;

    let pairs = toks
        .map(|tok| match tok.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok((key, value)),
            _ => Err(ParseError::MalformedPair {
                line: lineno,
                token: tok.to_owned(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KvPairs { group, pairs })
}

/// Parses a Downward API line of the form `key="quoted value"`.
pub fn parse_keqv_line(line: &str, lineno: usize) -> Result<(String, String), ParseError> {
    let (key, rest) = line.split_once('=').ok_or(ParseError::MissingDelimiter {
        line: lineno,
        delimiter: '=',
    })?;
    if key.is_empty() {
        return Err(ParseError::TokenCount {
            line: lineno,
            expected: Arity::Exactly(2),
            actual: 1,
        });
    }

    let value = decode_quoted(rest).map_err(|source| ParseError::Escape {
        line: lineno,
        source,
    })?;
    Ok((key.to_owned(), value))
}

/// Decodes a double-quoted string with C-style escapes.
///
/// A leading `"` is skipped, as is a `"` that ends the input. Unknown escapes
/// are kept verbatim including the backslash. `\xHH` emits a raw byte, and
/// `\uHHHH`/`\UHHHHHHHH` emit the UTF-8 encoding of the code point.
///
/// # Errors
///
/// - [`EscapeError::ShortHex`] if a `\x`, `\u` or `\U` escape is truncated.
/// - [`EscapeError::InvalidCodePoint`] for surrogates and values above U+10FFFF.
/// - [`EscapeError::InvalidUtf8`] if the raw `\xHH` bytes do not form valid UTF-8.
pub fn decode_quoted(input: &str) -> Result<String, EscapeError> {
    let src = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(src.len());
    let mut i = usize::from(src.first() == Some(&b'"'));

    while i < src.len() {
        let c = src[i];
        if c == b'"' && i + 1 == src.len() {
            break;
        }
        if c != b'\\' {
            out.push(c);
            i += 1;
            continue;
        }

        // A lone trailing backslash is dropped.
        let Some(&esc) = src.get(i + 1) else {
            break;
        };
        i += 2;
        match esc {
            b'\\' => out.push(b'\\'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'"' => out.push(b'"'),
            b'x' => {
                let byte = hex_value(src, i, 2).ok_or(EscapeError::ShortHex {
                    escape: 'x',
                    needed: 2,
                })?;
                out.push(byte as u8);
                i += 2;
            }
            b'u' | b'U' => {
                let needed = if esc == b'u' { 4 } else { 8 };
                let cp = hex_value(src, i, needed).ok_or(EscapeError::ShortHex {
                    escape: esc as char,
                    needed,
                })?;
                let ch = char::from_u32(cp).ok_or(EscapeError::InvalidCodePoint(cp))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += needed;
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }

    String::from_utf8(out).map_err(|err| EscapeError::InvalidUtf8 {
        offset: err.utf8_error().valid_up_to(),
    })
}

fn hex_value(src: &[u8], start: usize, len: usize) -> Option<u32> {
    let digits = src.get(start..start + len)?;
    digits.iter().try_fold(0u32, |acc, &d| {
        let v = (d as char).to_digit(16)?;
        Some((acc << 4) | v)
    })
}

//! Character and entity references.
//!
//! Only the five references XML predefines are recognized by name;
//! numeric references cover the rest of Unicode. Decoding is lenient: an
//! unrecognized or unterminated reference stays in the output verbatim
//! instead of failing the parse.

use memchr::{memchr, memchr2, memchr3};
use std::borrow::Cow;

/// Decode entity references in text or attribute content.
///
/// Borrows the input when it contains no ampersand at all.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    match memchr(b'&', input) {
        None => Cow::Borrowed(input),
        Some(first) => Cow::Owned(decode_from(input, first)),
    }
}

fn decode_from(input: &[u8], first: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    out.extend_from_slice(&input[..first]);
    // rest always starts at an ampersand here
    let mut rest = &input[first..];
    while !rest.is_empty() {
        match reference_at(rest) {
            Some((ch, len)) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                rest = &rest[len..];
            }
            None => {
                out.push(b'&');
                rest = &rest[1..];
            }
        }
        match memchr(b'&', rest) {
            Some(next) => {
                out.extend_from_slice(&rest[..next]);
                rest = &rest[next..];
            }
            None => {
                out.extend_from_slice(rest);
                break;
            }
        }
    }
    out
}

/// The character a reference starting at `rest[0] == b'&'` stands for,
/// with the reference's full byte length.
fn reference_at(rest: &[u8]) -> Option<(char, usize)> {
    let semi = memchr(b';', rest)?;
    let ch = match &rest[1..semi] {
        b"amp" => '&',
        b"lt" => '<',
        b"gt" => '>',
        b"apos" => '\'',
        b"quot" => '"',
        [b'#', b'x' | b'X', digits @ ..] => char_from_radix(digits, 16)?,
        [b'#', digits @ ..] => char_from_radix(digits, 10)?,
        _ => return None,
    };
    Some((ch, semi + 1))
}

fn char_from_radix(digits: &[u8], radix: u32) -> Option<char> {
    let digits = std::str::from_utf8(digits).ok()?;
    char::from_u32(u32::from_str_radix(digits, radix).ok()?)
}

/// Escape the five reserved characters for serialized output.
pub fn encode_text(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr2(b'"', b'\'', bytes).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

//! Attribute lexing inside a raw tag.
//!
//! Input is the byte span between the element name and the closing `>`.
//! Lexing is lenient: single, double, and missing quotes are all
//! accepted, a name without `=` becomes an attribute with an empty value,
//! and bytes that cannot start a name are skipped.

use super::entities::decode_text;
use memchr::memchr;
use std::borrow::Cow;

/// One attribute lexed from a tag.
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Name as written, prefix included
    pub name: Cow<'a, [u8]>,
    /// Value with entity references decoded
    pub value: Cow<'a, [u8]>,
    /// Name with any namespace prefix stripped
    pub local_name: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute {
            name: Cow::Borrowed(name),
            value,
            local_name: Cow::Borrowed(split_name(name).1),
        }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    pub fn local_name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.local_name).ok()
    }
}

/// Split `prefix:local` at the first colon.
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match memchr(b':', name) {
        Some(colon) => (Some(&name[..colon]), &name[colon + 1..]),
        None => (None, name),
    }
}

/// Lex every attribute out of a raw tag body.
pub fn parse_attributes(input: &[u8]) -> Vec<Attribute<'_>> {
    let mut attrs = Vec::new();
    let mut scan = Scan { input, pos: 0 };

    loop {
        scan.skip_space();
        let Some(name) = scan.take_name() else { break };
        scan.skip_space();
        if scan.eat(b'=') {
            scan.skip_space();
            attrs.push(Attribute::new(name, scan.take_value()));
        } else {
            // name with no value, HTML-style
            attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
        }
    }
    attrs
}

struct Scan<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scan<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Advance to the next name start and lex the name. `None` once the
    /// input (or the tag body, at `/` or `>`) runs out.
    fn take_name(&mut self) -> Option<&'a [u8]> {
        loop {
            match self.peek()? {
                b'/' | b'>' => return None,
                b if starts_name(b) => break,
                _ => self.pos += 1,
            }
        }
        let start = self.pos;
        while self.peek().is_some_and(in_name) {
            self.pos += 1;
        }
        Some(&self.input[start..self.pos])
    }

    fn take_value(&mut self) -> Cow<'a, [u8]> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            // unquoted value, runs to whitespace or the tag end
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !b.is_ascii_whitespace() && b != b'/' && b != b'>')
                {
                    self.pos += 1;
                }
                return decode_text(&self.input[start..self.pos]);
            }
        };
        self.pos += 1;
        let start = self.pos;
        match memchr(quote, &self.input[start..]) {
            Some(len) => {
                self.pos = start + len + 1;
                decode_text(&self.input[start..start + len])
            }
            None => {
                // unterminated quote, take the rest
                self.pos = self.input.len();
                decode_text(&self.input[start..])
            }
        }
    }
}

fn starts_name(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

fn in_name(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') || b >= 0x80
}

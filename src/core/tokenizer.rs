//! XML Tokenizer - pull-style token extraction
//!
//! Lenient tokenizer that extracts XML tokens one at a time:
//! - Element start/end/empty tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments, processing instructions, DOCTYPE (recognized, skipped upstream)
//!
//! Position is kept in a [`Cursor`] that can be saved and resumed, which is
//! what makes incremental (lazy) parsing restartable without re-reading
//! already-consumed input.

use crate::error::ParsingError;
use memchr::memchr;
use std::borrow::Cow;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: `<element>`
    StartTag,
    /// Element end tag: `</element>`
    EndTag,
    /// Empty element: `<element/>`
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: `<![CDATA[...]]>`
    CData,
    /// Comment: `<!--...-->`
    Comment,
    /// Processing instruction or XML declaration: `<?...?>`
    ProcessingInstruction,
    /// DOCTYPE declaration
    DocType,
    /// End of input
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags: the element name
    pub name: Option<Cow<'a, [u8]>>,
    /// For text/cdata: the content (owned if entities were decoded)
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(Cow::Borrowed(name));
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Resumable position within the input: byte offset plus 1-based line/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub pos: usize,
    pub line: u32,
    pub column: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            pos: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Lenient pull tokenizer over a byte slice.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    cursor: Cursor,
    error: Option<ParsingError>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer at the start of the input.
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer::resume(input, Cursor::default())
    }

    /// Resume tokenizing from a previously saved cursor.
    pub fn resume(input: &'a [u8], cursor: Cursor) -> Self {
        Tokenizer {
            input,
            cursor,
            error: None,
            done: cursor.pos >= input.len(),
        }
    }

    /// Current position, suitable for a later [`Tokenizer::resume`].
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// First malformed construct seen, if any.
    pub fn error(&self) -> Option<&ParsingError> {
        self.error.as_ref()
    }

    fn set_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(ParsingError::new(
                message,
                self.cursor.line,
                self.cursor.column,
            ));
        }
    }

    /// Advance the cursor over `n` bytes, tracking line/column.
    fn bump(&mut self, n: usize) {
        let end = (self.cursor.pos + n).min(self.input.len());
        for &b in &self.input[self.cursor.pos..end] {
            if b == b'\n' {
                self.cursor.line += 1;
                self.cursor.column = 1;
            } else {
                self.cursor.column += 1;
            }
        }
        self.cursor.pos = end;
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.cursor.pos..]
    }

    /// Get the next token, or None once Eof has been returned.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        if self.cursor.pos >= self.input.len() {
            self.done = true;
            let p = self.cursor.pos;
            return Some(Token::new(TokenKind::Eof, (p, p)));
        }

        if self.input[self.cursor.pos] == b'<' {
            self.next_markup()
        } else {
            self.next_text()
        }
    }

    /// A run of character data up to the next `<` (or end of input).
    fn next_text(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        let end = match memchr(b'<', self.rest()) {
            Some(off) => start + off,
            None => self.input.len(),
        };
        let raw = &self.input[start..end];
        self.bump(end - start);
        Some(Token::new(TokenKind::Text, (start, end)).with_content(super::entities::decode_text(raw)))
    }

    /// Markup starting with `<`.
    fn next_markup(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        if rest.starts_with(b"<!--") {
            return self.next_comment();
        }
        if rest.starts_with(b"<![CDATA[") {
            return self.next_cdata();
        }
        if rest.starts_with(b"<!") {
            return self.next_doctype();
        }
        if rest.starts_with(b"<?") {
            return self.next_pi();
        }
        if rest.starts_with(b"</") {
            return self.next_end_tag();
        }
        self.next_start_tag()
    }

    fn next_comment(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        let body = &self.input[start + 4..];
        match find_subslice(body, b"-->") {
            Some(off) => {
                let content = &body[..off];
                self.bump(4 + off + 3);
                Some(
                    Token::new(TokenKind::Comment, (start, self.cursor.pos))
                        .with_content(Cow::Borrowed(content)),
                )
            }
            None => {
                self.set_error("unterminated comment");
                self.finish_at_eof(start)
            }
        }
    }

    fn next_cdata(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        let body = &self.input[start + 9..];
        match find_subslice(body, b"]]>") {
            Some(off) => {
                let content = &body[..off];
                self.bump(9 + off + 3);
                Some(
                    Token::new(TokenKind::CData, (start, self.cursor.pos))
                        .with_content(Cow::Borrowed(content)),
                )
            }
            None => {
                self.set_error("unterminated CDATA section");
                self.finish_at_eof(start)
            }
        }
    }

    /// `<!DOCTYPE ...>` including an optional internal subset in brackets.
    fn next_doctype(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        let mut depth = 0usize;
        let mut i = start;
        while i < self.input.len() {
            match self.input[i] {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.bump(i + 1 - start);
                    return Some(Token::new(TokenKind::DocType, (start, self.cursor.pos)));
                }
                _ => {}
            }
            i += 1;
        }
        self.set_error("unterminated DOCTYPE declaration");
        self.finish_at_eof(start)
    }

    fn next_pi(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        let body = &self.input[start + 2..];
        match find_subslice(body, b"?>") {
            Some(off) => {
                self.bump(2 + off + 2);
                Some(Token::new(
                    TokenKind::ProcessingInstruction,
                    (start, self.cursor.pos),
                ))
            }
            None => {
                self.set_error("unterminated processing instruction");
                self.finish_at_eof(start)
            }
        }
    }

    fn next_end_tag(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        match memchr(b'>', self.rest()) {
            Some(off) => {
                let inner = &self.input[start + 2..start + off];
                let name_end = inner
                    .iter()
                    .position(|&b| is_whitespace(b))
                    .unwrap_or(inner.len());
                let name = &inner[..name_end];
                self.bump(off + 1);
                Some(
                    Token::new(TokenKind::EndTag, (start, self.cursor.pos)).with_name(name),
                )
            }
            None => {
                self.set_error("unterminated end tag");
                self.finish_at_eof(start)
            }
        }
    }

    fn next_start_tag(&mut self) -> Option<Token<'a>> {
        let start = self.cursor.pos;
        // Find the closing '>' outside of quoted attribute values.
        let mut in_single = false;
        let mut in_double = false;
        let mut close = None;
        let mut i = start + 1;
        while i < self.input.len() {
            match self.input[i] {
                b'"' if !in_single => in_double = !in_double,
                b'\'' if !in_double => in_single = !in_single,
                b'>' if !in_single && !in_double => {
                    close = Some(i);
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        let Some(close) = close else {
            self.set_error("unterminated start tag");
            return self.finish_at_eof(start);
        };

        let empty = self.input[start..close].ends_with(b"/");
        let inner = &self.input[start + 1..close];
        let name_end = inner
            .iter()
            .position(|&b| is_whitespace(b) || b == b'/')
            .unwrap_or(inner.len());
        let name = &inner[..name_end];

        if name.is_empty() {
            // "< foo>" and friends: recover by skipping the bogus tag.
            self.set_error("missing element name");
            self.bump(close + 1 - start);
            return self.next_token();
        }

        self.bump(close + 1 - start);
        let kind = if empty {
            TokenKind::EmptyTag
        } else {
            TokenKind::StartTag
        };
        Some(Token::new(kind, (start, self.cursor.pos)).with_name(name))
    }

    /// Consume the rest of the input after an unterminated construct.
    fn finish_at_eof(&mut self, start: usize) -> Option<Token<'a>> {
        self.bump(self.input.len() - self.cursor.pos);
        self.done = true;
        Some(Token::new(TokenKind::Eof, (start, self.input.len())))
    }
}

/// Find `needle` in `haystack`, memchr-anchored on its first byte.
fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let first = *needle.first()?;
    let mut offset = 0;
    while let Some(pos) = memchr(first, &haystack[offset..]) {
        let at = offset + pos;
        if haystack[at..].starts_with(needle) {
            return Some(at);
        }
        offset = at + 1;
    }
    None
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        let mut tok = Tokenizer::new(input);
        let mut out = Vec::new();
        while let Some(t) = tok.next_token() {
            out.push(t.kind);
        }
        out
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds(b"<root>hello</root>"),
            vec![
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::EndTag,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_empty_tag() {
        let mut tok = Tokenizer::new(b"<br/>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::EmptyTag);
        assert_eq!(t.name.unwrap().as_ref(), b"br");
    }

    #[test]
    fn test_empty_tag_with_attributes() {
        let mut tok = Tokenizer::new(b"<item price=\"5\" />");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::EmptyTag);
        assert_eq!(t.name.unwrap().as_ref(), b"item");
    }

    #[test]
    fn test_text_entities_decoded() {
        let mut tok = Tokenizer::new(b"<a>x &amp; y</a>");
        tok.next_token();
        let t = tok.next_token().unwrap();
        assert_eq!(t.content.unwrap().as_ref(), b"x & y");
    }

    #[test]
    fn test_cdata() {
        let mut tok = Tokenizer::new(b"<s><![CDATA[a < b]]></s>");
        tok.next_token();
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::CData);
        assert_eq!(t.content.unwrap().as_ref(), b"a < b");
    }

    #[test]
    fn test_comment_and_pi_skippable() {
        assert_eq!(
            kinds(b"<?xml version=\"1.0\"?><!-- c --><r/>"),
            vec![
                TokenKind::ProcessingInstruction,
                TokenKind::Comment,
                TokenKind::EmptyTag,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        assert_eq!(
            kinds(b"<!DOCTYPE r [<!ENTITY a \"b\">]><r/>"),
            vec![TokenKind::DocType, TokenKind::EmptyTag, TokenKind::Eof]
        );
    }

    #[test]
    fn test_gt_inside_quoted_attribute() {
        let mut tok = Tokenizer::new(b"<a title=\"x > y\">t</a>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::StartTag);
        assert_eq!(t.name.unwrap().as_ref(), b"a");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::Text);
    }

    #[test]
    fn test_unterminated_tag_reports_error() {
        let mut tok = Tokenizer::new(b"<root><a");
        tok.next_token();
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Eof);
        assert!(tok.error().is_some());
    }

    #[test]
    fn test_cursor_resume() {
        let input = b"<a>one</a><b>two</b>";
        let mut tok = Tokenizer::new(input);
        tok.next_token(); // <a>
        tok.next_token(); // one
        tok.next_token(); // </a>
        let saved = tok.cursor();
        drop(tok);

        let mut resumed = Tokenizer::resume(input, saved);
        let t = resumed.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::StartTag);
        assert_eq!(t.name.unwrap().as_ref(), b"b");
    }

    #[test]
    fn test_line_column_tracking() {
        let mut tok = Tokenizer::new(b"<a>\n  text\n</a><bad");
        while tok.next_token().is_some() {}
        let err = tok.error().unwrap();
        assert_eq!(err.line, 3);
        assert!(err.column > 1);
    }
}

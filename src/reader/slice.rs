//! Zero-Copy Slice Reader
//!
//! Turns the tokenizer's raw tokens into structural [`XmlEvent`]s. Prolog
//! noise (the XML declaration, processing instructions, DOCTYPE) is consumed
//! here and never surfaced. The reader can be suspended at any event boundary
//! and resumed later from a saved cursor, which is how lazy parsing picks up
//! where it left off.

use super::events::{EndElement, StartElement, XmlEvent};
use crate::core::attributes::parse_attributes;
use crate::core::tokenizer::{Cursor, Token, TokenKind, Tokenizer};
use crate::error::ParsingError;

/// Zero-copy XML reader from a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
}

impl<'a> SliceReader<'a> {
    /// Create a new slice reader at the start of the input
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
        }
    }

    /// Resume reading from a previously saved cursor
    pub fn resume(input: &'a [u8], cursor: Cursor) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::resume(input, cursor),
        }
    }

    /// Current position, suitable for a later [`SliceReader::resume`]
    pub fn cursor(&self) -> Cursor {
        self.tokenizer.cursor()
    }

    /// First malformed construct seen, if any
    pub fn error(&self) -> Option<&ParsingError> {
        self.tokenizer.error()
    }

    /// Get the next XML event
    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        loop {
            let token = self.tokenizer.next_token()?;

            match token.kind {
                TokenKind::Eof => return Some(XmlEvent::EndDocument),

                TokenKind::StartTag => {
                    let attrs = self.parse_tag_attributes(&token);
                    let name = token.name?;
                    return Some(XmlEvent::StartElement(StartElement::new(name, attrs)));
                }

                TokenKind::EndTag => {
                    let name = token.name?;
                    return Some(XmlEvent::EndElement(EndElement::new(name)));
                }

                TokenKind::EmptyTag => {
                    let attrs = self.parse_tag_attributes(&token);
                    let name = token.name?;
                    return Some(XmlEvent::EmptyElement(StartElement::new(name, attrs)));
                }

                TokenKind::Text => {
                    if let Some(content) = token.content {
                        // Preserve all text including whitespace-only for XML compliance
                        if !content.is_empty() {
                            return Some(XmlEvent::Text(content));
                        }
                    }
                }

                TokenKind::CData => {
                    if let Some(content) = token.content {
                        return Some(XmlEvent::CData(content));
                    }
                }

                TokenKind::Comment => {
                    if let Some(content) = token.content {
                        return Some(XmlEvent::Comment(content));
                    }
                }

                // Prolog constructs carry no structure for the tree
                TokenKind::ProcessingInstruction | TokenKind::DocType => {}
            }
        }
    }

    /// Parse attributes from a tag token
    fn parse_tag_attributes(&mut self, token: &Token<'a>) -> Vec<crate::core::attributes::Attribute<'a>> {
        let (start, end) = token.span;
        let tag_content = &self.input[start..end];

        // Find where the tag name ends (first whitespace after '<' and optional '/')
        let mut pos = 1; // Skip '<'
        if tag_content.get(1) == Some(&b'/') {
            pos = 2; // Skip '</'
        }

        // Skip the tag name
        while pos < tag_content.len() {
            let b = tag_content[pos];
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'>' || b == b'/' {
                break;
            }
            pos += 1;
        }

        // Find end of attributes (before '>' or '/>')
        let mut attr_end = tag_content.len();
        if tag_content.ends_with(b"/>") {
            attr_end -= 2;
        } else if tag_content.ends_with(b">") {
            attr_end -= 1;
        }

        if pos >= attr_end {
            return Vec::new();
        }

        parse_attributes(&tag_content[pos..attr_end])
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.next_event()?;
        if matches!(event, XmlEvent::EndDocument) {
            None
        } else {
            Some(event)
        }
    }
}

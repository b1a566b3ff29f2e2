//! xmlhash - XML indexing and typed deserialization
//!
//! Parse once, navigate by key, convert subtrees into your own types:
//!
//! ```
//! use xmlhash::XmlHash;
//!
//! let xml = "<catalog><book id=\"1\"><title>Dune</title></book></catalog>";
//! let indexer = XmlHash::new().parse(xml);
//! let title: String = indexer.key("catalog").key("book").key("title").value()?;
//! assert_eq!(title, "Dune");
//! # Ok::<(), xmlhash::XmlDeserializationError>(())
//! ```
//!
//! Navigation never panics and never forces intermediate error handling:
//! each step returns an [`XmlIndexer`] that either holds elements or holds
//! the first failure as a value, and the error only surfaces at the typed
//! `value()` boundary.
//!
//! Lazy mode ([`XmlHash::lazy`] or the `lazy` option) defers tree
//! construction: the parser consumes input only as far as navigation
//! demands, and repeated access never reparses.
//!
//! Custom types opt into deserialization through
//! [`XmlElementDeserializable`] (or [`XmlAttributeDeserializable`] for
//! attribute values), including an optional `validate` hook that runs
//! after every successful conversion.

pub mod core;
pub mod de;
pub mod error;
pub mod index;
pub mod options;
pub mod reader;
pub mod tree;

pub use de::{XmlAttributeDeserializable, XmlElementDeserializable, XmlIndexerDeserializable};
pub use error::{IndexingError, IndexingErrorKind, ParsingError, XmlDeserializationError};
pub use index::XmlIndexer;
pub use options::{Encoding, UserInfo, XmlHashOptions};
pub use tree::{XmlAttribute, XmlChild, XmlElement};

use tree::{parse_eager, parse_lazy};

/// Entry point: a configured parser factory.
///
/// Each call to [`parse`](XmlHash::parse) (or a sibling) starts an
/// independent session carrying a snapshot of this configuration.
#[derive(Debug, Clone, Default)]
pub struct XmlHash {
    options: XmlHashOptions,
}

impl XmlHash {
    /// A parser with default options.
    pub fn new() -> Self {
        XmlHash::default()
    }

    /// Build a parser, mutating the default options in the closure.
    ///
    /// ```
    /// use xmlhash::XmlHash;
    /// let parser = XmlHash::config(|opts| {
    ///     opts.case_insensitive = true;
    ///     opts.detect_parsing_errors = true;
    /// });
    /// # let _ = parser;
    /// ```
    pub fn config(configure: impl FnOnce(&mut XmlHashOptions)) -> Self {
        let mut options = XmlHashOptions::default();
        configure(&mut options);
        XmlHash { options }
    }

    /// The configuration this parser will hand to its sessions.
    pub fn options(&self) -> &XmlHashOptions {
        &self.options
    }

    /// Parse a UTF-8 string into an indexer rooted above the document
    /// element.
    ///
    /// Honors the `lazy` option. With `detect_parsing_errors` set, a
    /// malformed document comes back as a terminal
    /// [`XmlIndexer::ParsingError`].
    pub fn parse(&self, xml: &str) -> XmlIndexer {
        if self.options.lazy {
            return self.lazy(xml);
        }
        self.parse_session(xml.as_bytes())
    }

    /// Parse raw bytes, converting from the configured [`Encoding`] first.
    pub fn parse_bytes(&self, bytes: &[u8]) -> XmlIndexer {
        let converted = match crate::core::encoding::convert_to_utf8(bytes.to_vec(), self.options.encoding)
        {
            Ok(utf8) => utf8,
            Err(message) => {
                return XmlIndexer::ParsingError(ParsingError::new(message, 1, 1));
            }
        };
        if self.options.lazy {
            let tree = parse_lazy(converted, self.options.clone());
            return XmlIndexer::Stream(XmlElement::new(tree, 0));
        }
        self.parse_session(&converted)
    }

    /// Start a lazy session regardless of the `lazy` option.
    ///
    /// Returns immediately; input is consumed as navigation demands.
    /// Parse errors past the point navigation reached stay undetected.
    pub fn lazy(&self, xml: &str) -> XmlIndexer {
        let tree = parse_lazy(xml.as_bytes().to_vec(), self.options.clone());
        XmlIndexer::Stream(XmlElement::new(tree, 0))
    }

    fn parse_session(&self, input: &[u8]) -> XmlIndexer {
        let tree = parse_eager(input, self.options.clone());
        let error = tree.borrow().error.clone();
        match error {
            Some(err) => XmlIndexer::ParsingError(err),
            None => XmlIndexer::Element(XmlElement::new(tree, 0)),
        }
    }
}

/// Parse with default options. Shorthand for `XmlHash::new().parse(xml)`.
pub fn parse(xml: &str) -> XmlIndexer {
    XmlHash::new().parse(xml)
}

/// Start a lazy session with default options.
pub fn lazy(xml: &str) -> XmlIndexer {
    XmlHash::new().lazy(xml)
}

//! Error types for parsing, navigation and typed deserialization.
//!
//! Navigation failures stay *values*: they ride along inside an
//! [`XmlIndexer`](crate::XmlIndexer) chain so that deep lookups like
//! `idx.key("a").key("b").at(3)` collapse into a single terminal error
//! instead of aborting the chain. They only become `Err` at the typed
//! `value()` boundary.

use std::error::Error;
use std::fmt;

/// Malformed XML reported by the tokenizer or the tree builder.
///
/// Only surfaced when `detect_parsing_errors` is enabled; otherwise the
/// lenient tokenizer recovers silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
    /// Human-readable description of the problem.
    pub message: String,
    /// 1-based line where the error was detected.
    pub line: u32,
    /// 1-based column where the error was detected.
    pub column: u32,
}

impl ParsingError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParsingError {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl Error for ParsingError {}

/// What went wrong during a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingErrorKind {
    /// No child element with the requested name.
    KeyNotFound { key: String },
    /// Positional lookup outside the sibling group.
    IndexOutOfRange { index: usize, count: usize },
    /// No sibling carries the requested attribute/value pair.
    AttributeNotMatched { name: String, value: String },
    /// A filter removed every element.
    FilteredToEmpty,
    /// The operation is not meaningful on this indexer variant.
    WrongVariant { operation: &'static str },
}

/// Navigation failure: a mismatched key, an out-of-range index, or an
/// operation applied to the wrong indexer variant.
///
/// Carries the chain of element names traversed so far, so the rendered
/// form reads like `root > catalog > book > nomatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingError {
    pub kind: IndexingErrorKind,
    /// Names from the document root down to the element the failing
    /// operation was applied to.
    pub path: Vec<String>,
}

impl IndexingError {
    pub fn new(kind: IndexingErrorKind, path: Vec<String>) -> Self {
        IndexingError { kind, path }
    }

    /// Error for an operation applied to a variant that cannot answer it,
    /// with no element context available.
    pub fn wrong_variant(operation: &'static str) -> Self {
        IndexingError {
            kind: IndexingErrorKind::WrongVariant { operation },
            path: Vec::new(),
        }
    }
}

impl fmt::Display for IndexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain = String::new();
        for name in &self.path {
            if !chain.is_empty() {
                chain.push_str(" > ");
            }
            chain.push_str(name);
        }
        match &self.kind {
            IndexingErrorKind::KeyNotFound { key } => {
                write!(f, "no child element \"{key}\" under {chain}")
            }
            IndexingErrorKind::IndexOutOfRange { index, count } => {
                write!(f, "index {index} out of range ({count} elements) under {chain}")
            }
            IndexingErrorKind::AttributeNotMatched { name, value } => {
                write!(f, "no element with attribute {name}=\"{value}\" under {chain}")
            }
            IndexingErrorKind::FilteredToEmpty => {
                write!(f, "filter matched no elements under {chain}")
            }
            IndexingErrorKind::WrongVariant { operation } => {
                if chain.is_empty() {
                    write!(f, "operation \"{operation}\" is invalid on this indexer")
                } else {
                    write!(f, "operation \"{operation}\" is invalid under {chain}")
                }
            }
        }
    }
}

impl Error for IndexingError {}

/// Failure while converting an indexed node or attribute into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlDeserializationError {
    /// A type declared a deserialization capability but never implemented
    /// the hook. Programmer error, always loud.
    ImplementationIsMissing { method: String },
    /// The indexer variant cannot produce the requested shape
    /// (e.g. a plural `List` asked for a single `T`, or an error variant).
    NodeIsInvalid { node: String },
    /// Empty element text where a non-string scalar was required.
    NodeHasNoValue,
    /// Text was present but did not parse as the target scalar.
    TypeConversionFailed { target: &'static str, text: String },
    /// The element has no attribute with the requested name.
    AttributeDoesNotExist { element: String, attribute: String },
    /// An attribute's text did not parse as the target scalar.
    AttributeDeserializationFailed { target: &'static str, attribute: String },
    /// A user `validate()` hook rejected an otherwise well-formed value.
    Validation { reason: String },
}

impl XmlDeserializationError {
    /// Convenience constructor for user `validate()` failures.
    pub fn validation(reason: impl Into<String>) -> Self {
        XmlDeserializationError::Validation {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for XmlDeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlDeserializationError::ImplementationIsMissing { method } => {
                write!(f, "deserialization method not implemented: {method}")
            }
            XmlDeserializationError::NodeIsInvalid { node } => {
                write!(f, "node is invalid: {node}")
            }
            XmlDeserializationError::NodeHasNoValue => write!(f, "node has no value"),
            XmlDeserializationError::TypeConversionFailed { target, text } => {
                write!(f, "cannot convert \"{text}\" to {target}")
            }
            XmlDeserializationError::AttributeDoesNotExist { element, attribute } => {
                write!(f, "element <{element}> has no attribute \"{attribute}\"")
            }
            XmlDeserializationError::AttributeDeserializationFailed { target, attribute } => {
                write!(f, "cannot convert attribute {attribute} to {target}")
            }
            XmlDeserializationError::Validation { reason } => {
                write!(f, "validation failed: {reason}")
            }
        }
    }
}

impl Error for XmlDeserializationError {}

impl From<IndexingError> for XmlDeserializationError {
    fn from(err: IndexingError) -> Self {
        XmlDeserializationError::NodeIsInvalid {
            node: err.to_string(),
        }
    }
}

impl From<ParsingError> for XmlDeserializationError {
    fn from(err: ParsingError) -> Self {
        XmlDeserializationError::NodeIsInvalid {
            node: err.to_string(),
        }
    }
}

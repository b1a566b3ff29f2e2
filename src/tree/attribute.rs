//! Owned attribute storage for tree nodes.

use crate::core::entities::encode_text;
use std::fmt;

/// An attribute as stored on a tree element, fully owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name. When namespace processing is on this is the local
    /// name, otherwise the verbatim name including any prefix.
    pub name: String,
    /// Attribute value, entities decoded.
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        XmlAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for XmlAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, encode_text(&self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_escapes_value() {
        let attr = XmlAttribute::new("title", "a & b");
        assert_eq!(attr.to_string(), "title=\"a &amp; b\"");
    }
}

//! Parser events.
//!
//! What the tree builder consumes: element boundaries, character data,
//! CDATA, and comments. Name and content bytes borrow from the input
//! wherever the tokenizer did not have to decode entities.

use crate::core::attributes::{split_name, Attribute};
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub enum XmlEvent<'a> {
    StartElement(StartElement<'a>),
    EndElement(EndElement<'a>),
    /// `<name/>`, opened and closed in one token
    EmptyElement(StartElement<'a>),
    Text(Cow<'a, [u8]>),
    CData(Cow<'a, [u8]>),
    Comment(Cow<'a, [u8]>),
    EndDocument,
}

/// An element opening, shared with [`XmlEvent::EmptyElement`].
#[derive(Debug, Clone)]
pub struct StartElement<'a> {
    /// Name as written, prefix included
    pub name: Cow<'a, [u8]>,
    /// Name with any namespace prefix stripped
    pub local_name: Cow<'a, [u8]>,
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    pub fn new(name: impl Into<Cow<'a, [u8]>>, attributes: Vec<Attribute<'a>>) -> Self {
        let name = name.into();
        let local_name = local_part(&name);
        StartElement {
            name,
            local_name,
            attributes,
        }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn local_name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.local_name).ok()
    }

    /// Value of the named attribute, when present and valid UTF-8.
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name_str() == Some(name))
            .and_then(|a| a.value_str())
    }
}

#[derive(Debug, Clone)]
pub struct EndElement<'a> {
    /// Name as written, prefix included
    pub name: Cow<'a, [u8]>,
    /// Name with any namespace prefix stripped
    pub local_name: Cow<'a, [u8]>,
}

impl<'a> EndElement<'a> {
    pub fn new(name: impl Into<Cow<'a, [u8]>>) -> Self {
        let name = name.into();
        let local_name = local_part(&name);
        EndElement { name, local_name }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn local_name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.local_name).ok()
    }
}

/// The part after `prefix:`, borrowing whenever the full name borrows.
fn local_part<'a>(name: &Cow<'a, [u8]>) -> Cow<'a, [u8]> {
    match name {
        Cow::Borrowed(bytes) => Cow::Borrowed(split_name(bytes).1),
        Cow::Owned(bytes) => Cow::Owned(split_name(bytes).1.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_its_own_local_name() {
        let open = StartElement::new(&b"title"[..], Vec::new());
        assert_eq!(open.name_str(), Some("title"));
        assert_eq!(open.local_name_str(), Some("title"));
    }

    #[test]
    fn prefixed_name_splits_at_the_colon() {
        let close = EndElement::new(&b"xsl:template"[..]);
        assert_eq!(close.name_str(), Some("xsl:template"));
        assert_eq!(close.local_name_str(), Some("template"));
    }

    #[test]
    fn owned_names_split_too() {
        let open = StartElement::new(b"a:b".to_vec(), Vec::new());
        assert_eq!(open.local_name_str(), Some("b"));
    }
}

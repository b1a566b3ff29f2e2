//! Arena node storage.
//!
//! Elements live in a flat `Vec` and refer to each other by `NodeId` (u32)
//! for compact, cache-friendly references. Child order is preserved in a
//! content list that interleaves element references with text segments, and
//! a per-node index accelerates lookups by element name.

use super::attribute::XmlAttribute;
use std::collections::HashMap;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// One ordered piece of an element's content.
#[derive(Debug, Clone)]
pub enum XmlContent {
    /// A child element, by arena id
    Element(NodeId),
    /// A run of character data (entities already decoded, coalesced)
    Text(String),
    /// A CDATA section, kept distinct from plain text
    CData(String),
}

/// An element in the arena.
///
/// `closed` tracks whether the end tag has been consumed; during lazy
/// parsing a node may exist with only its start tag read.
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Element name (local name if namespace processing is on)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<XmlAttribute>,
    /// Ordered content: child elements interleaved with text segments
    pub children: Vec<XmlContent>,
    /// Child element ids grouped by (case-folded) name, in document order
    pub child_index: HashMap<String, Vec<NodeId>>,
    /// Parent element, None only for the synthetic root
    pub parent: Option<NodeId>,
    /// Whether the end tag has been seen
    pub closed: bool,
}

impl ElementNode {
    pub fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        ElementNode {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            child_index: HashMap::new(),
            parent,
            closed: false,
        }
    }

    /// Ids of child elements, in document order.
    pub fn element_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(id) => Some(*id),
            _ => None,
        })
    }

    /// Concatenated character data of this element's direct content,
    /// text and CDATA segments in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                XmlContent::Text(t) | XmlContent::CData(t) => out.push_str(t),
                XmlContent::Element(_) => {}
            }
        }
        out
    }

    /// Look up an attribute value. Case folding is the caller's concern;
    /// this compares with the given closure.
    pub fn attribute_value(&self, matches: impl Fn(&str) -> bool) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| matches(&a.name))
            .map(|a| a.value.as_str())
    }
}

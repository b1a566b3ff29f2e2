//! Document tree and element handles.
//!
//! A parse session owns one [`TreeInner`] behind `Rc<RefCell<..>>`. Public
//! [`XmlElement`] handles are (tree, id) pairs: cheap to clone, comparable
//! by node identity, and safe to hold across user callbacks because every
//! accessor takes only a transient borrow of the tree.
//!
//! In lazy mode the tree also carries a suspended parse ([`LazySession`]).
//! Accessors that need an element's full content call [`ensure_sealed`]
//! first, which pulls events from the saved cursor until that element's end
//! tag has been consumed. An element's subtree closes strictly before the
//! element itself, so a sealed node is always fully realized.

pub mod attribute;
pub mod builder;
pub mod node;

pub use attribute::XmlAttribute;

use crate::core::entities::encode_text;
use crate::core::tokenizer::Cursor;
use crate::error::ParsingError;
use crate::options::{UserInfo, XmlHashOptions};
use crate::reader::events::XmlEvent;
use crate::reader::slice::SliceReader;
use builder::TreeBuilder;
use node::{ElementNode, NodeId, XmlContent};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Suspended incremental parse.
pub struct LazySession {
    /// Full input, owned by the session
    pub input: Vec<u8>,
    /// Where the next event burst resumes
    pub cursor: Cursor,
    /// Builder with its open-element stack intact
    pub builder: TreeBuilder,
    /// Whether the input has been fully consumed
    pub done: bool,
}

/// The state shared by every handle of one parse session.
pub struct TreeInner {
    pub nodes: Vec<ElementNode>,
    pub options: XmlHashOptions,
    pub lazy: Option<LazySession>,
    /// First parse error, populated only when `detect_parsing_errors` is set
    pub error: Option<ParsingError>,
}

pub type SharedTree = Rc<RefCell<TreeInner>>;

/// Parse the whole input up front.
pub fn parse_eager(input: &[u8], options: XmlHashOptions) -> SharedTree {
    let (mut builder, mut nodes) = TreeBuilder::new(options.clone());
    let mut reader = SliceReader::new(input);
    loop {
        match reader.next_event() {
            Some(XmlEvent::EndDocument) | None => {
                builder.finish(&mut nodes, reader.cursor());
                break;
            }
            Some(ev) => builder.handle_event(&mut nodes, &ev, reader.cursor()),
        }
    }
    let error = if options.detect_parsing_errors {
        reader.error().cloned().or_else(|| builder.error().cloned())
    } else {
        None
    };
    Rc::new(RefCell::new(TreeInner {
        nodes,
        options,
        lazy: None,
        error,
    }))
}

/// Set up a lazy parse. No events are consumed until navigation demands it.
pub fn parse_lazy(input: Vec<u8>, options: XmlHashOptions) -> SharedTree {
    let (builder, nodes) = TreeBuilder::new(options.clone());
    Rc::new(RefCell::new(TreeInner {
        nodes,
        options,
        lazy: Some(LazySession {
            input,
            cursor: Cursor::default(),
            builder,
            done: false,
        }),
        error: None,
    }))
}

/// Pull events until the given node is closed (or input runs out).
///
/// No-op on eager trees and on already-sealed nodes, so repeated
/// navigation never reparses.
pub fn ensure_sealed(tree: &SharedTree, id: NodeId) {
    let mut inner = tree.borrow_mut();
    let TreeInner {
        nodes,
        options,
        lazy,
        error,
    } = &mut *inner;
    let Some(sess) = lazy.as_mut() else { return };
    if sess.done || nodes[id as usize].closed {
        return;
    }

    let LazySession {
        input,
        cursor,
        builder,
        done,
    } = sess;
    let mut reader = SliceReader::resume(input.as_slice(), *cursor);
    while !nodes[id as usize].closed {
        match reader.next_event() {
            Some(XmlEvent::EndDocument) | None => {
                builder.finish(nodes, reader.cursor());
                *done = true;
                break;
            }
            Some(ev) => builder.handle_event(nodes, &ev, reader.cursor()),
        }
    }
    *cursor = reader.cursor();
    if options.detect_parsing_errors && error.is_none() {
        *error = reader.error().cloned().or_else(|| builder.error().cloned());
    }
}

/// A handle to one element of a parse session.
///
/// Cloning is cheap (an `Rc` bump). Equality is node identity within the
/// same session, not structural comparison.
#[derive(Clone)]
pub struct XmlElement {
    pub(crate) tree: SharedTree,
    pub(crate) id: NodeId,
}

/// One ordered piece of an element's mixed content, as surfaced to users.
/// CDATA appears as [`XmlChild::Text`].
#[derive(Clone)]
pub enum XmlChild {
    Element(XmlElement),
    Text(String),
}

impl PartialEq for XmlElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl XmlElement {
    pub(crate) fn new(tree: SharedTree, id: NodeId) -> Self {
        XmlElement { tree, id }
    }

    fn seal(&self) {
        ensure_sealed(&self.tree, self.id);
    }

    /// Whether this is the synthetic document root.
    pub fn is_root(&self) -> bool {
        self.id == 0
    }

    /// Element name. The local name if namespace processing is on,
    /// otherwise the verbatim name including any prefix.
    pub fn name(&self) -> String {
        self.tree.borrow().nodes[self.id as usize].name.clone()
    }

    /// Concatenated character data of this element's direct content, text
    /// and CDATA segments in document order. Nested element text is not
    /// included.
    pub fn text(&self) -> String {
        self.seal();
        self.tree.borrow().nodes[self.id as usize].text()
    }

    /// Attribute value by name, honoring the session's case sensitivity.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let inner = self.tree.borrow();
        let node = &inner.nodes[self.id as usize];
        node.attribute_value(|n| inner.options.keys_match(n, name))
            .map(String::from)
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> Vec<XmlAttribute> {
        self.tree.borrow().nodes[self.id as usize].attributes.clone()
    }

    /// Child elements in document order, text segments skipped.
    pub fn children(&self) -> Vec<XmlElement> {
        self.seal();
        self.tree.borrow().nodes[self.id as usize]
            .element_children()
            .map(|id| XmlElement::new(Rc::clone(&self.tree), id))
            .collect()
    }

    /// Full ordered content: child elements interleaved with text segments.
    pub fn contents(&self) -> Vec<XmlChild> {
        self.seal();
        self.tree.borrow().nodes[self.id as usize]
            .children
            .iter()
            .map(|c| match c {
                XmlContent::Element(id) => {
                    XmlChild::Element(XmlElement::new(Rc::clone(&self.tree), *id))
                }
                XmlContent::Text(t) | XmlContent::CData(t) => XmlChild::Text(t.clone()),
            })
            .collect()
    }

    /// Child elements with the given name, honoring case sensitivity.
    pub(crate) fn children_by_key(&self, key: &str) -> Vec<XmlElement> {
        self.seal();
        let inner = self.tree.borrow();
        let folded = inner.options.fold_key(key);
        inner.nodes[self.id as usize]
            .child_index
            .get(&folded)
            .map(|ids| {
                ids.iter()
                    .map(|id| XmlElement::new(Rc::clone(&self.tree), *id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Enclosing element, None at the synthetic root.
    pub fn parent(&self) -> Option<XmlElement> {
        let parent = self.tree.borrow().nodes[self.id as usize].parent?;
        Some(XmlElement::new(Rc::clone(&self.tree), parent))
    }

    /// Names from the document root down to this element.
    pub(crate) fn path(&self) -> Vec<String> {
        let inner = self.tree.borrow();
        path_of(&inner.nodes, self.id)
    }

    /// The session's caller-supplied context.
    pub fn user_info(&self) -> UserInfo {
        Rc::clone(&self.tree.borrow().options.user_info)
    }

    /// Serialized content of this element, tags and entities re-encoded,
    /// without the element's own tags.
    pub fn inner_xml(&self) -> String {
        self.seal();
        let inner = self.tree.borrow();
        let mut out = String::new();
        render_children(&inner.nodes, self.id, &mut out);
        out
    }

    /// Serialized form of this element. The synthetic root serializes as
    /// its content, which is the whole document.
    pub fn description(&self) -> String {
        self.seal();
        let inner = self.tree.borrow();
        let mut out = String::new();
        if self.id == 0 {
            render_children(&inner.nodes, 0, &mut out);
        } else {
            render(&inner.nodes, self.id, &mut out);
        }
        out
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl fmt::Debug for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlElement")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Names from the document root down to `id`.
pub(crate) fn path_of(nodes: &[ElementNode], id: NodeId) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(cid) = current {
        path.push(nodes[cid as usize].name.clone());
        current = nodes[cid as usize].parent;
    }
    path.reverse();
    path
}

fn render(nodes: &[ElementNode], id: NodeId, out: &mut String) {
    let node = &nodes[id as usize];
    out.push('<');
    out.push_str(&node.name);
    for attr in &node.attributes {
        out.push(' ');
        out.push_str(&attr.to_string());
    }
    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    render_children(nodes, id, out);
    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

fn render_children(nodes: &[ElementNode], id: NodeId, out: &mut String) {
    for child in &nodes[id as usize].children {
        match child {
            XmlContent::Element(cid) => render(nodes, *cid, out),
            XmlContent::Text(t) => out.push_str(&encode_text(t)),
            XmlContent::CData(t) => {
                out.push_str("<![CDATA[");
                out.push_str(t);
                out.push_str("]]>");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(input: &str) -> XmlElement {
        let tree = parse_eager(input.as_bytes(), XmlHashOptions::default());
        XmlElement::new(tree, 0)
    }

    #[test]
    fn test_navigation_and_text() {
        let doc = root("<catalog><book id=\"1\">First</book><book id=\"2\">Second</book></catalog>");
        let catalog = &doc.children()[0];
        assert_eq!(catalog.name(), "catalog");
        let books = catalog.children_by_key("book");
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].text(), "First");
        assert_eq!(books[1].attribute("id"), Some("2".to_string()));
    }

    #[test]
    fn test_contents_preserves_interleaving() {
        let doc = root("<p>A<b>bold</b>X</p>");
        let p = &doc.children()[0];
        let contents = p.contents();
        assert_eq!(contents.len(), 3);
        assert!(matches!(&contents[0], XmlChild::Text(t) if t == "A"));
        assert!(matches!(&contents[1], XmlChild::Element(e) if e.name() == "b"));
        assert!(matches!(&contents[2], XmlChild::Text(t) if t == "X"));
    }

    #[test]
    fn test_handle_identity() {
        let doc = root("<a><b/></a>");
        let first = doc.children()[0].children()[0].clone();
        let second = doc.children()[0].children()[0].clone();
        assert_eq!(first, second);

        let other = root("<a><b/></a>");
        assert!(first != other.children()[0].children()[0]);
    }

    #[test]
    fn test_description_round_trip() {
        let doc = root("<a x=\"1\"><b/>text &amp; more</a>");
        assert_eq!(doc.description(), "<a x=\"1\"><b/>text &amp; more</a>");
    }

    #[test]
    fn test_lazy_seals_on_demand() {
        let input = b"<catalog><book>one</book><book>two</book></catalog>".to_vec();
        let tree = parse_lazy(input, XmlHashOptions::default());
        assert_eq!(tree.borrow().nodes.len(), 1);

        let doc = XmlElement::new(Rc::clone(&tree), 0);
        let catalog = &doc.children()[0];
        let books = catalog.children_by_key("book");
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].text(), "two");
    }

    #[test]
    fn test_lazy_access_is_idempotent() {
        let input = b"<a><b>x</b></a>".to_vec();
        let tree = parse_lazy(input, XmlHashOptions::default());
        let doc = XmlElement::new(Rc::clone(&tree), 0);
        let b1 = doc.children()[0].children()[0].clone();
        let b2 = doc.children()[0].children()[0].clone();
        // Same arena node both times, not a reparse
        assert_eq!(b1, b2);
        assert_eq!(tree.borrow().nodes.len(), 3);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut opts = XmlHashOptions::default();
        opts.case_insensitive = true;
        let tree = parse_eager(b"<Catalog><Book ID=\"9\"/></Catalog>", opts);
        let doc = XmlElement::new(tree, 0);
        let catalog = &doc.children_by_key("catalog")[0];
        let book = &catalog.children_by_key("BOOK")[0];
        assert_eq!(book.attribute("id"), Some("9".to_string()));
    }
}

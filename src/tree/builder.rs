//! Event-to-tree construction.
//!
//! The builder consumes reader events one at a time and grows the node
//! arena. It is deliberately resumable: lazy parsing feeds it events in
//! bursts, stopping as soon as the node being navigated to is closed, and
//! picks the builder back up later with its open-element stack intact.
//!
//! Character data is buffered and committed as one coalesced text segment
//! when the next structural event arrives, so `A<b/>X` yields the segments
//! `Text("A"), Element(b), Text("X")` in order. CDATA commits immediately
//! as its own segment.

use super::node::{ElementNode, NodeId, XmlContent};
use crate::core::tokenizer::Cursor;
use crate::error::ParsingError;
use crate::options::XmlHashOptions;
use crate::reader::events::{StartElement, XmlEvent};

/// Name of the synthetic element holding the document's top-level content.
pub const ROOT_NAME: &str = "root";

/// Incremental tree builder over reader events.
pub struct TreeBuilder {
    options: XmlHashOptions,
    /// Open elements, bottom is always the synthetic root (id 0)
    stack: Vec<NodeId>,
    /// Character data awaiting the next structural event
    pending_text: String,
    /// First structural problem seen, recorded only when
    /// `detect_parsing_errors` is set
    error: Option<ParsingError>,
    finished: bool,
}

impl TreeBuilder {
    /// Create a builder and the arena it will grow, seeded with the
    /// synthetic root at id 0.
    pub fn new(options: XmlHashOptions) -> (Self, Vec<ElementNode>) {
        let nodes = vec![ElementNode::new(ROOT_NAME, None)];
        let builder = TreeBuilder {
            options,
            stack: vec![0],
            pending_text: String::new(),
            error: None,
            finished: false,
        };
        (builder, nodes)
    }

    /// First structural error recorded, if any.
    pub fn error(&self) -> Option<&ParsingError> {
        self.error.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one event into the tree. `cursor` is the reader position just
    /// after the event, used for error locations.
    pub fn handle_event(&mut self, nodes: &mut Vec<ElementNode>, event: &XmlEvent<'_>, cursor: Cursor) {
        match event {
            XmlEvent::StartElement(e) => {
                let id = self.open_element(nodes, e);
                self.stack.push(id);
            }
            XmlEvent::EmptyElement(e) => {
                let id = self.open_element(nodes, e);
                nodes[id as usize].closed = true;
            }
            XmlEvent::EndElement(e) => {
                self.flush_text(nodes);
                let top = *self.stack.last().unwrap_or(&0);
                if top == 0 {
                    self.record_error(
                        format!("unexpected end tag </{}>", String::from_utf8_lossy(&e.name)),
                        cursor,
                    );
                    return;
                }
                let expected = &nodes[top as usize].name;
                let found = self.element_name(&e.name, &e.local_name);
                if !self.options.keys_match(expected, &found) {
                    self.record_error(
                        format!("mismatched end tag: expected </{expected}>, found </{found}>"),
                        cursor,
                    );
                }
                nodes[top as usize].closed = true;
                self.stack.pop();
            }
            XmlEvent::Text(t) => {
                self.pending_text.push_str(&String::from_utf8_lossy(t));
            }
            XmlEvent::CData(t) => {
                self.flush_text(nodes);
                let top = *self.stack.last().unwrap_or(&0);
                nodes[top as usize]
                    .children
                    .push(XmlContent::CData(String::from_utf8_lossy(t).into_owned()));
            }
            XmlEvent::Comment(_) => {}
            XmlEvent::EndDocument => self.finish(nodes, cursor),
        }
    }

    /// Close out the document: commit trailing text, report unclosed
    /// elements, and auto-close everything still on the stack.
    pub fn finish(&mut self, nodes: &mut Vec<ElementNode>, cursor: Cursor) {
        if self.finished {
            return;
        }
        self.flush_text(nodes);
        if self.stack.len() > 1 {
            let top = *self.stack.last().unwrap();
            self.record_error(
                format!("unclosed element <{}>", nodes[top as usize].name),
                cursor,
            );
        }
        for id in self.stack.drain(..) {
            nodes[id as usize].closed = true;
        }
        self.finished = true;
    }

    fn open_element(&mut self, nodes: &mut Vec<ElementNode>, event: &StartElement<'_>) -> NodeId {
        self.flush_text(nodes);
        let parent = *self.stack.last().unwrap_or(&0);
        let name = self.element_name(&event.name, &event.local_name);

        let id = nodes.len() as NodeId;
        let mut node = ElementNode::new(name.clone(), Some(parent));
        for attr in &event.attributes {
            let attr_name = if self.options.process_namespaces {
                String::from_utf8_lossy(&attr.local_name).into_owned()
            } else {
                String::from_utf8_lossy(&attr.name).into_owned()
            };
            node.attributes.push(super::attribute::XmlAttribute::new(
                attr_name,
                String::from_utf8_lossy(&attr.value).into_owned(),
            ));
        }
        nodes.push(node);

        let parent_node = &mut nodes[parent as usize];
        parent_node.children.push(XmlContent::Element(id));
        parent_node
            .child_index
            .entry(self.options.fold_key(&name))
            .or_default()
            .push(id);
        id
    }

    /// Commit buffered character data as one text segment on the current
    /// element.
    fn flush_text(&mut self, nodes: &mut [ElementNode]) {
        if self.pending_text.is_empty() {
            return;
        }
        let top = *self.stack.last().unwrap_or(&0);
        let text = std::mem::take(&mut self.pending_text);
        nodes[top as usize].children.push(XmlContent::Text(text));
    }

    fn element_name(&self, name: &[u8], local_name: &[u8]) -> String {
        if self.options.process_namespaces {
            String::from_utf8_lossy(local_name).into_owned()
        } else {
            String::from_utf8_lossy(name).into_owned()
        }
    }

    fn record_error(&mut self, message: String, cursor: Cursor) {
        if self.options.detect_parsing_errors && self.error.is_none() {
            self.error = Some(ParsingError::new(message, cursor.line, cursor.column));
        }
    }
}

//! Navigation over the document tree.
//!
//! An [`XmlIndexer`] is the result of every navigation step. Successful
//! steps hold elements; failed steps hold the error as a value, so a deep
//! chain like `idx.key("a").key("b").at(3)` never panics and never needs
//! intermediate `?`. The first failure becomes a terminal indexer that all
//! later steps pass through unchanged. Errors only turn into `Err` at the
//! fallible entry points (`by_key`, `by_index`) or at the typed
//! deserialization boundary.
//!
//! Cardinality is normalized everywhere: zero matches is an error, one
//! match is `Element`, two or more are `List`. A `List` therefore never
//! holds fewer than two elements.

use crate::error::{IndexingError, IndexingErrorKind, ParsingError};
use crate::tree::XmlElement;

/// The result of a navigation step.
#[derive(Debug, Clone)]
pub enum XmlIndexer {
    /// Exactly one element
    Element(XmlElement),
    /// Two or more sibling elements, document order
    List(Vec<XmlElement>),
    /// Root of a lazy session; navigation realizes it on demand
    Stream(XmlElement),
    /// Terminal: the input was malformed
    ParsingError(ParsingError),
    /// Terminal: an earlier navigation step failed
    IndexingError(IndexingError),
}

impl XmlIndexer {
    /// Normalize a match set: zero is an error, one is `Element`, more is
    /// `List`.
    fn collapse(
        mut matches: Vec<XmlElement>,
        on_empty: impl FnOnce() -> IndexingError,
    ) -> Result<XmlIndexer, IndexingError> {
        match matches.len() {
            0 => Err(on_empty()),
            1 => Ok(XmlIndexer::Element(matches.remove(0))),
            _ => Ok(XmlIndexer::List(matches)),
        }
    }

    /// The single element behind this indexer, if there is exactly one.
    pub fn element(&self) -> Option<XmlElement> {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// The navigation error, if this indexer is terminal.
    pub fn indexing_error(&self) -> Option<&IndexingError> {
        match self {
            XmlIndexer::IndexingError(e) => Some(e),
            _ => None,
        }
    }

    /// The parse error, if the session surfaced one.
    pub fn parsing_error(&self) -> Option<&ParsingError> {
        match self {
            XmlIndexer::ParsingError(e) => Some(e),
            _ => None,
        }
    }

    /// Every element behind this indexer as its own indexer. Empty for
    /// terminal errors.
    pub fn all(&self) -> Vec<XmlIndexer> {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => {
                vec![XmlIndexer::Element(e.clone())]
            }
            XmlIndexer::List(items) => items
                .iter()
                .map(|e| XmlIndexer::Element(e.clone()))
                .collect(),
            XmlIndexer::ParsingError(_) | XmlIndexer::IndexingError(_) => Vec::new(),
        }
    }

    /// Child elements of every element behind this indexer, in document
    /// order.
    pub fn children(&self) -> Vec<XmlIndexer> {
        let mut out = Vec::new();
        for idx in self.all() {
            if let Some(elem) = idx.element() {
                for child in elem.children() {
                    out.push(XmlIndexer::Element(child));
                }
            }
        }
        out
    }

    /// Child elements with the given name.
    ///
    /// Fails with `KeyNotFound` when no child matches; the error carries
    /// the path from the root to the element searched.
    pub fn by_key(&self, key: &str) -> Result<XmlIndexer, IndexingError> {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => {
                let matches = e.children_by_key(key);
                Self::collapse(matches, || {
                    IndexingError::new(
                        IndexingErrorKind::KeyNotFound {
                            key: key.to_string(),
                        },
                        e.path(),
                    )
                })
            }
            XmlIndexer::List(_) => Err(IndexingError::wrong_variant("by_key")),
            XmlIndexer::IndexingError(err) => Err(err.clone()),
            XmlIndexer::ParsingError(_) => Err(IndexingError::wrong_variant("by_key")),
        }
    }

    /// Position within a sibling group.
    ///
    /// A singleton behaves as a group of one: index 0 is the element
    /// itself, anything else is out of range.
    pub fn by_index(&self, index: usize) -> Result<XmlIndexer, IndexingError> {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => {
                if index == 0 {
                    Ok(XmlIndexer::Element(e.clone()))
                } else {
                    Err(IndexingError::new(
                        IndexingErrorKind::IndexOutOfRange { index, count: 1 },
                        e.path(),
                    ))
                }
            }
            XmlIndexer::List(items) => match items.get(index) {
                Some(e) => Ok(XmlIndexer::Element(e.clone())),
                None => Err(IndexingError::new(
                    IndexingErrorKind::IndexOutOfRange {
                        index,
                        count: items.len(),
                    },
                    items[0].path(),
                )),
            },
            XmlIndexer::IndexingError(err) => Err(err.clone()),
            XmlIndexer::ParsingError(_) => Err(IndexingError::wrong_variant("by_index")),
        }
    }

    /// Folding form of [`by_key`](Self::by_key): failures become terminal
    /// indexers instead of `Err`, so chains read fluently.
    pub fn key(&self, key: &str) -> XmlIndexer {
        match self.by_key(key) {
            Ok(idx) => idx,
            Err(err) => XmlIndexer::IndexingError(err),
        }
    }

    /// Folding form of [`by_index`](Self::by_index).
    pub fn at(&self, index: usize) -> XmlIndexer {
        match self.by_index(index) {
            Ok(idx) => idx,
            Err(err) => XmlIndexer::IndexingError(err),
        }
    }

    /// Keep the elements carrying the given attribute/value pair. Name and
    /// value comparison honor the session's case sensitivity.
    pub fn with_attribute(&self, name: &str, value: &str) -> XmlIndexer {
        let candidates: Vec<XmlElement> = match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => vec![e.clone()],
            XmlIndexer::List(items) => items.clone(),
            XmlIndexer::ParsingError(_) | XmlIndexer::IndexingError(_) => return self.clone(),
        };
        let path = candidates[0].path();
        let matches: Vec<XmlElement> = candidates
            .into_iter()
            .filter(|e| {
                let case_insensitive = e.tree.borrow().options.case_insensitive;
                match e.attribute(name) {
                    Some(v) if case_insensitive => v.eq_ignore_ascii_case(value),
                    Some(v) => v == value,
                    None => false,
                }
            })
            .collect();
        match Self::collapse(matches, || {
            IndexingError::new(
                IndexingErrorKind::AttributeNotMatched {
                    name: name.to_string(),
                    value: value.to_string(),
                },
                path,
            )
        }) {
            Ok(idx) => idx,
            Err(err) => XmlIndexer::IndexingError(err),
        }
    }

    /// Keep the direct child elements the predicate accepts. On a plural
    /// group the members' children are pooled in document order, and the
    /// position runs across the whole pool.
    pub fn filter_children(&self, predicate: impl Fn(&XmlElement, usize) -> bool) -> XmlIndexer {
        self.filter(FilterScope::Children, predicate)
    }

    /// Keep the sibling elements the predicate accepts, preserving
    /// document order. The predicate sees each element and its position
    /// in the group; a singleton counts as a group of one.
    pub fn filter_all(&self, predicate: impl Fn(&XmlElement, usize) -> bool) -> XmlIndexer {
        self.filter(FilterScope::Siblings, predicate)
    }

    fn filter(
        &self,
        scope: FilterScope,
        predicate: impl Fn(&XmlElement, usize) -> bool,
    ) -> XmlIndexer {
        let group: Vec<XmlElement> = match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => vec![e.clone()],
            XmlIndexer::List(items) => items.clone(),
            XmlIndexer::ParsingError(_) | XmlIndexer::IndexingError(_) => return self.clone(),
        };
        let path = group[0].path();
        let candidates: Vec<XmlElement> = match scope {
            FilterScope::Siblings => group,
            FilterScope::Children => group.iter().flat_map(|e| e.children()).collect(),
        };
        let matches: Vec<XmlElement> = candidates
            .into_iter()
            .enumerate()
            .filter(|(i, e)| predicate(e, *i))
            .map(|(_, e)| e)
            .collect();
        match Self::collapse(matches, || {
            IndexingError::new(IndexingErrorKind::FilteredToEmpty, path)
        }) {
            Ok(idx) => idx,
            Err(err) => XmlIndexer::IndexingError(err),
        }
    }
}

/// Which elements a filter inspects.
enum FilterScope {
    /// The sibling group itself
    Siblings,
    /// Direct children of every group member, pooled in order
    Children,
}

impl std::fmt::Display for XmlIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => f.write_str(&e.description()),
            XmlIndexer::List(items) => {
                for item in items {
                    f.write_str(&item.description())?;
                }
                Ok(())
            }
            XmlIndexer::ParsingError(err) => write!(f, "{err}"),
            XmlIndexer::IndexingError(err) => write!(f, "{err}"),
        }
    }
}

impl<'a> IntoIterator for &'a XmlIndexer {
    type Item = XmlIndexer;
    type IntoIter = std::vec::IntoIter<XmlIndexer>;

    fn into_iter(self) -> Self::IntoIter {
        self.all().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::XmlHashOptions;
    use crate::tree::{parse_eager, XmlElement};

    fn index(input: &str) -> XmlIndexer {
        let tree = parse_eager(input.as_bytes(), XmlHashOptions::default());
        XmlIndexer::Element(XmlElement::new(tree, 0))
    }

    const CATALOG: &str = "<catalog>\
        <book id=\"1\"><title>First</title></book>\
        <book id=\"2\"><title>Second</title></book>\
        <book id=\"3\"><title>Third</title></book>\
        </catalog>";

    #[test]
    fn test_key_then_index() {
        let idx = index(CATALOG);
        let second = idx.key("catalog").key("book").at(1);
        assert_eq!(second.key("title").element().unwrap().text(), "Second");
    }

    #[test]
    fn test_singleton_collapse() {
        let idx = index("<a><b>only</b></a>");
        let b = idx.key("a").key("b");
        assert!(matches!(b, XmlIndexer::Element(_)));
        // Index 0 on a singleton is the element itself
        assert!(matches!(b.at(0), XmlIndexer::Element(_)));
        assert!(b.at(1).indexing_error().is_some());
    }

    #[test]
    fn test_plural_becomes_list() {
        let idx = index(CATALOG);
        let books = idx.key("catalog").key("book");
        match &books {
            XmlIndexer::List(items) => assert_eq!(items.len(), 3),
            other => panic!("expected List, got {other:?}"),
        }
        assert_eq!(books.all().len(), 3);
    }

    #[test]
    fn test_missing_key_carries_path() {
        let idx = index(CATALOG);
        let err = idx.key("catalog").key("book").at(0).key("nomatch");
        let err = err.indexing_error().expect("should be terminal");
        assert_eq!(
            err.to_string(),
            "no child element \"nomatch\" under root > catalog > book"
        );
    }

    #[test]
    fn test_error_is_terminal_through_chain() {
        let idx = index(CATALOG);
        let err = idx.key("nope").key("deeper").at(7).with_attribute("x", "y");
        assert!(matches!(
            err.indexing_error().map(|e| &e.kind),
            Some(IndexingErrorKind::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_with_attribute_selects_match() {
        let idx = index(CATALOG);
        let second = idx.key("catalog").key("book").with_attribute("id", "2");
        assert_eq!(second.key("title").element().unwrap().text(), "Second");
    }

    #[test]
    fn test_with_attribute_no_match() {
        let idx = index(CATALOG);
        let err = idx.key("catalog").key("book").with_attribute("id", "9");
        assert!(matches!(
            err.indexing_error().map(|e| &e.kind),
            Some(IndexingErrorKind::AttributeNotMatched { .. })
        ));
    }

    #[test]
    fn test_filter_children_by_position() {
        let idx = index(CATALOG);
        let kept = idx.key("catalog").filter_children(|_, i| i > 0);
        assert_eq!(kept.all().len(), 2);
    }

    #[test]
    fn test_filter_all_narrows_sibling_group() {
        let idx = index(CATALOG);
        let books = idx.key("catalog").key("book");
        let kept = books.filter_all(|e, _| e.attribute("id").as_deref() != Some("2"));
        assert_eq!(kept.all().len(), 2);
    }

    #[test]
    fn test_filter_all_positions_are_group_positions() {
        let idx = index(CATALOG);
        let kept = idx.key("catalog").key("book").filter_all(|_, i| i != 1);
        let ids: Vec<String> = kept
            .all()
            .iter()
            .map(|b| b.element().unwrap().attribute("id").unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_all_on_singleton() {
        let idx = index("<a><b>only</b></a>");
        let b = idx.key("a").key("b");
        let kept = b.filter_all(|e, _| e.name() == "b");
        assert!(matches!(kept, XmlIndexer::Element(_)));
        assert!(matches!(
            b.filter_all(|_, _| false).indexing_error().map(|e| &e.kind),
            Some(IndexingErrorKind::FilteredToEmpty)
        ));
    }

    #[test]
    fn test_filter_children_pools_plural_group() {
        let idx = index(CATALOG);
        let titles = idx
            .key("catalog")
            .key("book")
            .filter_children(|e, _| e.name() == "title");
        assert_eq!(titles.all().len(), 3);
    }

    #[test]
    fn test_iteration_yields_each_element() {
        let idx = index(CATALOG);
        let books = idx.key("catalog").key("book");
        let ids: Vec<String> = (&books)
            .into_iter()
            .map(|b| b.element().unwrap().attribute("id").unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_children_spans_all_elements() {
        let idx = index(CATALOG);
        let grandchildren = idx.key("catalog").key("book").children();
        assert_eq!(grandchildren.len(), 3);
        assert!(grandchildren
            .iter()
            .all(|c| c.element().unwrap().name() == "title"));
    }
}

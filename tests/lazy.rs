//! Lazy sessions: deferred construction, idempotent access.

use xmlhash::{XmlHash, XmlIndexer};

const CATALOG: &str = "<catalog>\
    <book id=\"1\"><title>First</title></book>\
    <book id=\"2\"><title>Second</title></book>\
    <book id=\"3\"><title>Third</title></book>\
    </catalog>";

#[test]
fn lazy_entry_is_a_stream() {
    let idx = xmlhash::lazy(CATALOG);
    assert!(matches!(idx, XmlIndexer::Stream(_)));
}

#[test]
fn navigation_realizes_on_demand() {
    let idx = xmlhash::lazy(CATALOG);
    let books = idx.key("catalog").key("book");
    assert_eq!(books.all().len(), 3);
    assert_eq!(
        books.at(1).key("title").element().unwrap().text(),
        "Second"
    );
}

#[test]
fn lazy_and_eager_agree() {
    let eager = XmlHash::new().parse(CATALOG);
    let lazy = XmlHash::new().lazy(CATALOG);
    for path in [&eager, &lazy] {
        let titles: Vec<String> = path
            .key("catalog")
            .key("book")
            .all()
            .iter()
            .map(|b| b.key("title").element().unwrap().text())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }
}

#[test]
fn repeated_access_hits_the_same_nodes() {
    let idx = xmlhash::lazy(CATALOG);
    let first = idx.key("catalog").key("book").at(0).element().unwrap();
    let again = idx.key("catalog").key("book").at(0).element().unwrap();
    // Node identity, not structural equality: no reparse happened
    assert_eq!(first, again);
}

#[test]
fn handles_from_different_sessions_differ() {
    let a = xmlhash::lazy(CATALOG).key("catalog").element().unwrap();
    let b = xmlhash::lazy(CATALOG).key("catalog").element().unwrap();
    assert!(a != b);
}

#[test]
fn text_access_seals_the_element() {
    let idx = xmlhash::lazy("<a>start<b>inner</b>end</a>");
    let a = idx.key("a").element().unwrap();
    assert_eq!(a.text(), "startend");
    assert_eq!(a.children()[0].text(), "inner");
}

#[test]
fn lazy_option_applies_to_parse() {
    let idx = XmlHash::config(|o| o.lazy = true).parse(CATALOG);
    assert!(matches!(idx, XmlIndexer::Stream(_)));
    assert_eq!(idx.key("catalog").key("book").all().len(), 3);
}

#[test]
fn lazy_session_with_namespaces() {
    let idx = XmlHash::config(|o| {
        o.lazy = true;
        o.process_namespaces = true;
    })
    .parse("<x:r><x:c>v</x:c></x:r>");
    assert_eq!(idx.key("r").key("c").element().unwrap().text(), "v");
}

#[test]
fn truncated_input_still_navigable() {
    // End tags missing: lenient mode auto-closes at end of input
    let idx = xmlhash::lazy("<a><b>text");
    assert_eq!(idx.key("a").key("b").element().unwrap().text(), "text");
}

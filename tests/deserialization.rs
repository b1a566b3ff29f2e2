//! Typed conversion of indexed subtrees into user types.

use xmlhash::{
    XmlDeserializationError, XmlElement, XmlElementDeserializable, XmlIndexer,
};

#[derive(Debug, PartialEq)]
struct Book {
    title: String,
    price: i32,
    isbn: Option<String>,
}

impl XmlElementDeserializable for Book {
    fn deserialize(element: &XmlElement) -> Result<Self, XmlDeserializationError> {
        let idx = XmlIndexer::Element(element.clone());
        Ok(Book {
            title: idx.key("title").value()?,
            price: idx.key("price").value()?,
            isbn: idx.key("isbn").value_opt()?,
        })
    }

    fn validate(&self) -> Result<(), XmlDeserializationError> {
        if self.price < 0 {
            return Err(XmlDeserializationError::validation(format!(
                "price is negative: {}",
                self.price
            )));
        }
        Ok(())
    }
}

const CATALOG: &str = "<catalog>\
    <book><title>First</title><price>10</price><isbn>111</isbn></book>\
    <book><title>Second</title><price>20</price></book>\
    </catalog>";

#[test]
fn nested_struct_from_subtree() {
    let idx = xmlhash::parse(CATALOG);
    let book: Book = idx.key("catalog").key("book").at(1).value().unwrap();
    assert_eq!(
        book,
        Book {
            title: "Second".to_string(),
            price: 20,
            isbn: None,
        }
    );
}

#[test]
fn vec_of_structs_from_siblings() {
    let idx = xmlhash::parse(CATALOG);
    let books: Vec<Book> = idx.key("catalog").key("book").value_vec().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].isbn.as_deref(), Some("111"));
}

#[test]
fn scalar_list_from_siblings() {
    let idx = xmlhash::parse("<r><a>1</a><a>2</a><a>3</a></r>");
    let values: Vec<i32> = idx.key("r").key("a").value_vec().unwrap();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn singular_from_plural_is_ambiguous() {
    let idx = xmlhash::parse("<r><a>1</a><a>2</a></r>");
    let err = idx.key("r").key("a").value::<i32>().unwrap_err();
    assert!(matches!(err, XmlDeserializationError::NodeIsInvalid { .. }));
}

#[test]
fn plural_reads_as_absent_for_optionals() {
    let idx = xmlhash::parse("<r><a id=\"1\">1</a><a id=\"2\">2</a></r>");
    let group = idx.key("r").key("a");
    assert_eq!(group.value_opt::<i32>().unwrap(), None);
    assert_eq!(group.value_of_attr_opt::<i32>("id").unwrap(), None);
}

#[test]
fn missing_element_per_shape() {
    let idx = xmlhash::parse("<r><a>1</a></r>");
    let missing = idx.key("r").key("zzz");

    assert!(missing.value::<i32>().is_err());
    assert_eq!(missing.value_opt::<i32>().unwrap(), None);
    assert_eq!(missing.value_vec::<i32>().unwrap(), Vec::<i32>::new());
    assert_eq!(missing.value_vec_opt::<i32>().unwrap(), None);
    assert_eq!(
        missing.value_vec_of_opt::<i32>().unwrap(),
        Vec::<Option<i32>>::new()
    );
}

#[test]
fn present_optional_still_propagates_conversion_failures() {
    let idx = xmlhash::parse("<r><n>abc</n></r>");
    let err = idx.key("r").key("n").value_opt::<i32>().unwrap_err();
    assert!(matches!(
        err,
        XmlDeserializationError::TypeConversionFailed { .. }
    ));
}

#[test]
fn vec_of_opt_absorbs_bad_slots() {
    let idx = xmlhash::parse("<r><a>1</a><a>x</a><a>3</a></r>");
    let values: Vec<Option<i32>> = idx.key("r").key("a").value_vec_of_opt().unwrap();
    assert_eq!(values, vec![Some(1), None, Some(3)]);
}

#[test]
fn validation_failure_carries_the_value() {
    let xml = "<book><title>Broken</title><price>-5</price></book>";
    let idx = xmlhash::parse(xml);
    match idx.key("book").value::<Book>().unwrap_err() {
        XmlDeserializationError::Validation { reason } => {
            assert!(reason.contains("-5"), "reason was: {reason}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn attribute_quintet() {
    let idx = xmlhash::parse("<r><a id=\"1\"/><a id=\"2\"/><a/></r>");
    let group = idx.key("r").key("a");

    let first: i32 = group.at(0).value_of_attr("id").unwrap();
    assert_eq!(first, 1);

    let absent: Option<i32> = group.at(2).value_of_attr_opt("id").unwrap();
    assert_eq!(absent, None);

    // Plain vec requires every element to carry the attribute
    assert!(group.value_of_attr_vec::<i32>("id").is_err());

    let per_slot: Vec<Option<i32>> = group.value_of_attr_vec_of_opt("id").unwrap();
    assert_eq!(per_slot, vec![Some(1), Some(2), None]);

    let missing_group = idx.key("r").key("zzz");
    assert_eq!(
        missing_group.value_of_attr_vec::<i32>("id").unwrap(),
        Vec::<i32>::new()
    );
    assert_eq!(
        missing_group.value_of_attr_vec_opt::<i32>("id").unwrap(),
        None
    );
}

#[test]
fn element_level_attribute_access() {
    let idx = xmlhash::parse("<item price=\"9\"/>");
    let item = idx.key("item").element().unwrap();
    assert_eq!(item.attr_value::<i32>("price").unwrap(), 9);
    assert_eq!(item.attr_value_opt::<i32>("weight").unwrap(), None);
    assert!(matches!(
        item.attr_value::<i32>("weight").unwrap_err(),
        XmlDeserializationError::AttributeDoesNotExist { .. }
    ));
}

#[test]
fn parse_error_poisons_value_extraction() {
    let idx = xmlhash::XmlHash::config(|o| o.detect_parsing_errors = true).parse("<a><b></a>");
    let err = idx.key("a").value::<String>().unwrap_err();
    assert!(matches!(err, XmlDeserializationError::NodeIsInvalid { .. }));
}

#[test]
fn entities_decoded_before_conversion() {
    let idx = xmlhash::parse("<s>a &amp; b &#x41;</s>");
    let s: String = idx.key("s").value().unwrap();
    assert_eq!(s, "a & b A");
}

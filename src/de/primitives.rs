//! Scalar implementations of the deserialization traits.
//!
//! `String` takes element text (or an attribute value) verbatim, empty
//! included. Numeric scalars require non-empty text that parses fully.
//! `bool` accepts case-insensitive `true`/`false` plus the numeric
//! convention: zero is false, any other integer is true.

use super::{XmlAttributeDeserializable, XmlElementDeserializable};
use crate::error::XmlDeserializationError;
use crate::tree::{XmlAttribute, XmlElement};

impl XmlElementDeserializable for String {
    fn deserialize(element: &XmlElement) -> Result<Self, XmlDeserializationError> {
        Ok(element.text())
    }
}

impl XmlAttributeDeserializable for String {
    fn deserialize(attribute: &XmlAttribute) -> Result<Self, XmlDeserializationError> {
        Ok(attribute.value.clone())
    }
}

macro_rules! numeric_deserializable {
    ($($t:ty),* $(,)?) => {$(
        impl XmlElementDeserializable for $t {
            fn deserialize(element: &XmlElement) -> Result<Self, XmlDeserializationError> {
                let text = element.text();
                if text.is_empty() {
                    return Err(XmlDeserializationError::NodeHasNoValue);
                }
                text.trim().parse::<$t>().map_err(|_| {
                    XmlDeserializationError::TypeConversionFailed {
                        target: stringify!($t),
                        text,
                    }
                })
            }
        }

        impl XmlAttributeDeserializable for $t {
            fn deserialize(attribute: &XmlAttribute) -> Result<Self, XmlDeserializationError> {
                attribute.value.trim().parse::<$t>().map_err(|_| {
                    XmlDeserializationError::AttributeDeserializationFailed {
                        target: stringify!($t),
                        attribute: attribute.name.clone(),
                    }
                })
            }
        }
    )*};
}

numeric_deserializable!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

fn parse_bool(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    trimmed.parse::<i64>().ok().map(|n| n != 0)
}

impl XmlElementDeserializable for bool {
    fn deserialize(element: &XmlElement) -> Result<Self, XmlDeserializationError> {
        let text = element.text();
        if text.is_empty() {
            return Err(XmlDeserializationError::NodeHasNoValue);
        }
        parse_bool(&text).ok_or(XmlDeserializationError::TypeConversionFailed {
            target: "bool",
            text,
        })
    }
}

impl XmlAttributeDeserializable for bool {
    fn deserialize(attribute: &XmlAttribute) -> Result<Self, XmlDeserializationError> {
        parse_bool(&attribute.value).ok_or_else(|| {
            XmlDeserializationError::AttributeDeserializationFailed {
                target: "bool",
                attribute: attribute.name.clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::XmlIndexer;
    use crate::options::XmlHashOptions;
    use crate::tree::parse_eager;

    fn index(input: &str) -> XmlIndexer {
        let tree = parse_eager(input.as_bytes(), XmlHashOptions::default());
        XmlIndexer::Element(XmlElement::new(tree, 0))
    }

    #[test]
    fn test_string_identity() {
        let idx = index("<s>  spaced  </s>");
        let s: String = idx.key("s").value().unwrap();
        assert_eq!(s, "  spaced  ");
    }

    #[test]
    fn test_empty_string_is_fine() {
        let idx = index("<s></s>");
        let s: String = idx.key("s").value().unwrap();
        assert_eq!(s, "");
    }

    #[test]
    fn test_numeric_widths() {
        let idx = index("<r><a>-3</a><b>250</b><c>1.5</c></r>");
        assert_eq!(idx.key("r").key("a").value::<i8>().unwrap(), -3);
        assert_eq!(idx.key("r").key("b").value::<u64>().unwrap(), 250);
        assert_eq!(idx.key("r").key("c").value::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn test_empty_numeric_has_no_value() {
        let idx = index("<n></n>");
        assert!(matches!(
            idx.key("n").value::<i32>().unwrap_err(),
            XmlDeserializationError::NodeHasNoValue
        ));
    }

    #[test]
    fn test_conversion_failure_keeps_text() {
        let idx = index("<n>twelve</n>");
        match idx.key("n").value::<i32>().unwrap_err() {
            XmlDeserializationError::TypeConversionFailed { target, text } => {
                assert_eq!(target, "i32");
                assert_eq!(text, "twelve");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bool_forms() {
        let idx = index("<r><a>true</a><b>FALSE</b><c>1</c><d>0</d></r>");
        assert!(idx.key("r").key("a").value::<bool>().unwrap());
        assert!(!idx.key("r").key("b").value::<bool>().unwrap());
        assert!(idx.key("r").key("c").value::<bool>().unwrap());
        assert!(!idx.key("r").key("d").value::<bool>().unwrap());
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let idx = index("<b>maybe</b>");
        assert!(matches!(
            idx.key("b").value::<bool>().unwrap_err(),
            XmlDeserializationError::TypeConversionFailed { .. }
        ));
    }

    #[test]
    fn test_attribute_scalars() {
        let idx = index("<a n=\"42\" f=\"2.5\" ok=\"true\"/>");
        let a = idx.key("a");
        assert_eq!(a.value_of_attr::<i32>("n").unwrap(), 42);
        assert_eq!(a.value_of_attr::<f32>("f").unwrap(), 2.5);
        assert!(a.value_of_attr::<bool>("ok").unwrap());
    }

    #[test]
    fn test_attribute_failure_names_attribute() {
        let idx = index("<a n=\"x\"/>");
        match idx.key("a").value_of_attr::<i32>("n").unwrap_err() {
            XmlDeserializationError::AttributeDeserializationFailed { attribute, .. } => {
                assert_eq!(attribute, "n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

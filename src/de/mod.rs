//! Typed deserialization.
//!
//! Types opt in by implementing one of three traits:
//! - [`XmlElementDeserializable`]: built from a single element
//! - [`XmlIndexerDeserializable`]: built from a whole indexer, for types
//!   that need navigation context
//! - [`XmlAttributeDeserializable`]: built from an attribute value
//!
//! Each trait ships a default `deserialize` that fails with
//! `ImplementationIsMissing`: a type can declare the capability and the
//! omission stays a loud runtime error rather than a silent fallback.
//! `validate` defaults to accepting everything and runs after every
//! successful conversion.
//!
//! The conversion surface on [`XmlIndexer`] covers five cardinality shapes
//! per source. The rules for absent data differ by shape: a missing
//! element is an error for `T`, `None` for `Option<T>`, an empty vec for
//! `Vec<T>`, and `None` for `Option<Vec<T>>`. `Vec<Option<T>>` instead
//! absorbs per-slot conversion failures into `None` slots. A plural `List`
//! asked for a single `T` is ambiguous and refuses; asked for `Option<T>`
//! it reads as absent, as does a failed parse for every optional shape.

pub mod primitives;

use crate::error::XmlDeserializationError;
use crate::index::XmlIndexer;
use crate::tree::{XmlAttribute, XmlElement};

/// Build `Self` from a single element.
pub trait XmlElementDeserializable: Sized {
    fn deserialize(element: &XmlElement) -> Result<Self, XmlDeserializationError> {
        let _ = element;
        Err(XmlDeserializationError::ImplementationIsMissing {
            method: format!("{}::deserialize(&XmlElement)", std::any::type_name::<Self>()),
        })
    }

    /// Reject an otherwise well-formed value. Runs after every successful
    /// `deserialize`.
    fn validate(&self) -> Result<(), XmlDeserializationError> {
        Ok(())
    }
}

/// Build `Self` from an indexer, for types that need navigation context.
///
/// Every [`XmlElementDeserializable`] type gets this for free through a
/// blanket implementation.
pub trait XmlIndexerDeserializable: Sized {
    fn deserialize(indexer: &XmlIndexer) -> Result<Self, XmlDeserializationError> {
        let _ = indexer;
        Err(XmlDeserializationError::ImplementationIsMissing {
            method: format!("{}::deserialize(&XmlIndexer)", std::any::type_name::<Self>()),
        })
    }

    fn validate(&self) -> Result<(), XmlDeserializationError> {
        Ok(())
    }
}

/// Build `Self` from an attribute value.
pub trait XmlAttributeDeserializable: Sized {
    fn deserialize(attribute: &XmlAttribute) -> Result<Self, XmlDeserializationError> {
        let _ = attribute;
        Err(XmlDeserializationError::ImplementationIsMissing {
            method: format!("{}::deserialize(&XmlAttribute)", std::any::type_name::<Self>()),
        })
    }

    fn validate(&self) -> Result<(), XmlDeserializationError> {
        Ok(())
    }
}

impl<T: XmlElementDeserializable> XmlIndexerDeserializable for T {
    fn deserialize(indexer: &XmlIndexer) -> Result<Self, XmlDeserializationError> {
        match indexer.element() {
            Some(element) => T::deserialize(&element),
            None => Err(ambiguous_or_invalid(indexer)),
        }
    }

    fn validate(&self) -> Result<(), XmlDeserializationError> {
        XmlElementDeserializable::validate(self)
    }
}

fn ambiguous_or_invalid(indexer: &XmlIndexer) -> XmlDeserializationError {
    match indexer {
        XmlIndexer::List(items) => XmlDeserializationError::NodeIsInvalid {
            node: format!("ambiguous: {} sibling elements where one was expected", items.len()),
        },
        XmlIndexer::IndexingError(err) => err.clone().into(),
        XmlIndexer::ParsingError(err) => err.clone().into(),
        _ => XmlDeserializationError::NodeIsInvalid {
            node: "not a single element".to_string(),
        },
    }
}

/// Deserialize and then validate, as one step.
fn convert<T: XmlIndexerDeserializable>(
    indexer: &XmlIndexer,
) -> Result<T, XmlDeserializationError> {
    let value = T::deserialize(indexer)?;
    value.validate()?;
    Ok(value)
}

fn convert_attribute<T: XmlAttributeDeserializable>(
    attribute: &XmlAttribute,
) -> Result<T, XmlDeserializationError> {
    let value = T::deserialize(attribute)?;
    value.validate()?;
    Ok(value)
}

impl XmlIndexer {
    /// Convert this indexer into exactly one `T`.
    ///
    /// Fails on missing elements, on plural matches, and on conversion or
    /// validation failures.
    pub fn value<T: XmlIndexerDeserializable>(&self) -> Result<T, XmlDeserializationError> {
        match self {
            XmlIndexer::Element(_) => convert(self),
            XmlIndexer::Stream(e) => XmlIndexer::Element(e.clone()).value(),
            _ => Err(ambiguous_or_invalid(self)),
        }
    }

    /// Convert into `Option<T>`: a missing element, a plural group, or a
    /// failed parse is `None`. A genuine conversion failure on a single
    /// element still propagates.
    pub fn value_opt<T: XmlIndexerDeserializable>(
        &self,
    ) -> Result<Option<T>, XmlDeserializationError> {
        match self {
            XmlIndexer::Element(_) => convert(self).map(Some),
            XmlIndexer::Stream(e) => XmlIndexer::Element(e.clone()).value_opt(),
            XmlIndexer::List(_) | XmlIndexer::IndexingError(_) | XmlIndexer::ParsingError(_) => {
                Ok(None)
            }
        }
    }

    /// Convert every matched element into a `T`. A missing group is an
    /// empty vec; the first failing slot aborts.
    pub fn value_vec<T: XmlIndexerDeserializable>(
        &self,
    ) -> Result<Vec<T>, XmlDeserializationError> {
        match self {
            XmlIndexer::Element(_) => Ok(vec![convert(self)?]),
            XmlIndexer::Stream(e) => XmlIndexer::Element(e.clone()).value_vec(),
            XmlIndexer::List(_) => self.all().iter().map(convert).collect(),
            XmlIndexer::IndexingError(_) => Ok(Vec::new()),
            XmlIndexer::ParsingError(_) => Err(ambiguous_or_invalid(self)),
        }
    }

    /// Convert into `Option<Vec<T>>`: a missing group or a failed parse
    /// is `None` rather than an empty vec.
    pub fn value_vec_opt<T: XmlIndexerDeserializable>(
        &self,
    ) -> Result<Option<Vec<T>>, XmlDeserializationError> {
        match self {
            XmlIndexer::IndexingError(_) | XmlIndexer::ParsingError(_) => Ok(None),
            _ => self.value_vec().map(Some),
        }
    }

    /// Convert every matched element, absorbing per-slot failures into
    /// `None` slots instead of aborting.
    pub fn value_vec_of_opt<T: XmlIndexerDeserializable>(
        &self,
    ) -> Result<Vec<Option<T>>, XmlDeserializationError> {
        match self {
            XmlIndexer::ParsingError(_) => Err(ambiguous_or_invalid(self)),
            XmlIndexer::IndexingError(_) => Ok(Vec::new()),
            _ => Ok(self.all().iter().map(|idx| convert(idx).ok()).collect()),
        }
    }

    fn singular_element(&self) -> Result<XmlElement, XmlDeserializationError> {
        match self {
            XmlIndexer::Element(e) | XmlIndexer::Stream(e) => Ok(e.clone()),
            _ => Err(ambiguous_or_invalid(self)),
        }
    }

    /// Convert the named attribute of the single matched element.
    pub fn value_of_attr<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<T, XmlDeserializationError> {
        self.singular_element()?.attr_value(name)
    }

    /// Optional form: a missing element, a plural group, a failed parse,
    /// or a missing attribute is `None`.
    pub fn value_of_attr_opt<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<Option<T>, XmlDeserializationError> {
        match self {
            XmlIndexer::List(_) | XmlIndexer::IndexingError(_) | XmlIndexer::ParsingError(_) => {
                Ok(None)
            }
            _ => self.singular_element()?.attr_value_opt(name),
        }
    }

    /// The named attribute of every matched element. Each element must
    /// carry it.
    pub fn value_of_attr_vec<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<Vec<T>, XmlDeserializationError> {
        match self {
            XmlIndexer::IndexingError(_) => Ok(Vec::new()),
            XmlIndexer::ParsingError(_) => Err(ambiguous_or_invalid(self)),
            _ => self
                .all()
                .iter()
                .map(|idx| idx.value_of_attr(name))
                .collect(),
        }
    }

    /// Optional group form of [`value_of_attr_vec`](Self::value_of_attr_vec).
    pub fn value_of_attr_vec_opt<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<Option<Vec<T>>, XmlDeserializationError> {
        match self {
            XmlIndexer::IndexingError(_) | XmlIndexer::ParsingError(_) => Ok(None),
            _ => self.value_of_attr_vec(name).map(Some),
        }
    }

    /// Per-slot optional form: elements without the attribute (or with an
    /// unconvertible one) become `None` slots.
    pub fn value_of_attr_vec_of_opt<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<Vec<Option<T>>, XmlDeserializationError> {
        match self {
            XmlIndexer::IndexingError(_) => Ok(Vec::new()),
            XmlIndexer::ParsingError(_) => Err(ambiguous_or_invalid(self)),
            _ => Ok(self
                .all()
                .iter()
                .map(|idx| idx.value_of_attr(name).ok())
                .collect()),
        }
    }
}

impl XmlElement {
    /// Convert the named attribute into a `T`. Missing attributes fail
    /// with `AttributeDoesNotExist`.
    pub fn attr_value<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<T, XmlDeserializationError> {
        match self.attribute_object(name) {
            Some(attr) => convert_attribute(&attr),
            None => Err(XmlDeserializationError::AttributeDoesNotExist {
                element: self.name(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Optional form: a missing attribute is `None`, a conversion failure
    /// still propagates.
    pub fn attr_value_opt<T: XmlAttributeDeserializable>(
        &self,
        name: &str,
    ) -> Result<Option<T>, XmlDeserializationError> {
        match self.attribute_object(name) {
            Some(attr) => convert_attribute(&attr).map(Some),
            None => Ok(None),
        }
    }

    fn attribute_object(&self, name: &str) -> Option<XmlAttribute> {
        let value = self.attribute(name)?;
        Some(XmlAttribute::new(name, value))
    }
}

//! Core XML lexing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Tokenizer: lenient pull tokenizer with a resumable cursor
//! - Entities: XML entity decoding with Cow (zero-copy when possible)
//! - Attributes: attribute parsing and extraction from raw tag bytes
//! - Encoding: UTF-16 detection and conversion to UTF-8
//!
//! Nothing in here knows about trees or indexers; it turns bytes into
//! tokens and decoded strings.

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod tokenizer;

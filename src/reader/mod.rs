//! XML Reader Module
//!
//! Provides pull-style event reading over a byte slice:
//! - SliceReader: zero-copy, resumable event reader
//! - Events: XML event types for pull parsing

pub mod events;
pub mod slice;

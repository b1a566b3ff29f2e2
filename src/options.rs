//! Parse-session configuration.
//!
//! One options value is captured when a session is created and shared,
//! read-only, by the tree, every indexer and every deserialization call made
//! against that session. Flags are never threaded through individual call
//! signatures.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Character encoding of the raw input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8, with an optional BOM. The default.
    #[default]
    Utf8,
    /// UTF-16; endianness taken from the BOM, big-endian when absent.
    Utf16,
    /// UTF-16 little-endian, no BOM required.
    Utf16Le,
    /// UTF-16 big-endian, no BOM required.
    Utf16Be,
}

/// Opaque, read-only payload threaded through a parse session and visible
/// to every deserialization call made during it.
pub type UserInfo = Rc<HashMap<String, Rc<dyn Any>>>;

/// Configuration for a parse session.
#[derive(Clone)]
pub struct XmlHashOptions {
    /// Encoding of input handed to [`XmlHash::parse_bytes`](crate::XmlHash::parse_bytes).
    pub encoding: Encoding,
    /// Strip namespace prefixes, indexing elements and attributes by their
    /// local names. Off by default: names are taken verbatim, prefix included.
    pub process_namespaces: bool,
    /// Defer tree construction until navigation demands it.
    pub lazy: bool,
    /// Compare element and attribute names (and attribute filter values)
    /// without regard to ASCII case.
    pub case_insensitive: bool,
    /// Surface malformed XML as a terminal parsing-error indexer instead of
    /// trusting the tokenizer's best-effort recovery.
    pub detect_parsing_errors: bool,
    /// Caller-supplied context, readable from every element during the
    /// session. Never touched by the library itself.
    pub user_info: UserInfo,
}

impl Default for XmlHashOptions {
    fn default() -> Self {
        XmlHashOptions {
            encoding: Encoding::Utf8,
            process_namespaces: false,
            lazy: false,
            case_insensitive: false,
            detect_parsing_errors: false,
            user_info: Rc::new(HashMap::new()),
        }
    }
}

impl fmt::Debug for XmlHashOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlHashOptions")
            .field("encoding", &self.encoding)
            .field("process_namespaces", &self.process_namespaces)
            .field("lazy", &self.lazy)
            .field("case_insensitive", &self.case_insensitive)
            .field("detect_parsing_errors", &self.detect_parsing_errors)
            .field("user_info_keys", &self.user_info.len())
            .finish()
    }
}

impl XmlHashOptions {
    /// Normalize a name for key comparison under the current options.
    pub(crate) fn fold_key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Compare two names under the current options.
    pub(crate) fn keys_match(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = XmlHashOptions::default();
        assert_eq!(opts.encoding, Encoding::Utf8);
        assert!(!opts.process_namespaces);
        assert!(!opts.lazy);
        assert!(!opts.case_insensitive);
        assert!(!opts.detect_parsing_errors);
        assert!(opts.user_info.is_empty());
    }

    #[test]
    fn test_key_folding() {
        let mut opts = XmlHashOptions::default();
        assert!(!opts.keys_match("Book", "book"));
        opts.case_insensitive = true;
        assert!(opts.keys_match("Book", "book"));
        assert_eq!(opts.fold_key("CaTaLoG"), "catalog");
    }
}

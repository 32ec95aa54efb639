//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

use std::borrow::Cow;

use encoding_rs::UTF_8;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Strictly decode UTF-8 bytes, returning `None` on malformed input
///
/// A leading BOM is kept as part of the text rather than silently stripped.
pub fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_utf8("señal".as_bytes()).unwrap(), "señal");
        assert!(decode_utf8(&[0x61, 0xff]).is_none());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hola   mundo  "), "hola mundo");
        assert_eq!(normalize_whitespace("hola\n\nmundo"), "hola mundo");
        assert_eq!(normalize_whitespace("\thola\t \r\nmundo"), "hola mundo");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("corto", 10), "corto");
        assert_eq!(truncate_text("año electoral muy largo", 10), "año ele...");
    }
}

//! Free-text sanitization for vendor export cells.
//!
//! Lead exports are produced by several upstream tools and regularly contain
//! stray control bytes and half-encoded JSON escapes (`\u00e9`, `\U0001F600`)
//! inside remarks and insight columns. PostgreSQL rejects NUL bytes in text
//! columns and downstream JSON consumers choke on lone backslashes, so every
//! free-text value passes through [`sanitize_text`] before persistence.

use regex::{Captures, Regex};
use std::sync::OnceLock;

static SHORT_ESCAPE: OnceLock<Regex> = OnceLock::new();
static LONG_ESCAPE: OnceLock<Regex> = OnceLock::new();

fn short_escape_regex() -> &'static Regex {
    SHORT_ESCAPE.get_or_init(|| {
        Regex::new(r"\\u([0-9A-Fa-f]{4})").expect("Invalid short escape regex")
    })
}

fn long_escape_regex() -> &'static Regex {
    LONG_ESCAPE.get_or_init(|| {
        Regex::new(r"\\U[0-9A-Fa-f]{8}").expect("Invalid long escape regex")
    })
}

/// Make arbitrary text safe for storage and display.
///
/// The passes run in a fixed order:
///
/// 1. Remove ASCII control characters (`0x00`-`0x1F`, `0x7F`).
/// 2. Decode literal `\uXXXX` escapes. Code point zero, surrogate halves and
///    anything that decodes to a control character are dropped.
/// 3. Drop literal `\UXXXXXXXX` escapes entirely.
/// 4. Replace every remaining backslash with `/`.
///
/// Backslash replacement has to come last, otherwise the escapes decoded in
/// pass 2 would already be gone.
pub fn sanitize_text(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !c.is_ascii_control()).collect();

    let decoded = short_escape_regex().replace_all(&stripped, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .filter(|c| *c != '\0' && !c.is_control())
            .map(String::from)
            .unwrap_or_default()
    });

    let without_long = long_escape_regex().replace_all(&decoded, "");

    without_long.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_control_characters() {
        assert_eq!(sanitize_text("a\0b\u{7}c\u{7f}d\r\ne"), "abcde");
    }

    #[test]
    fn decodes_short_escapes() {
        assert_eq!(sanitize_text(r"caf\u00e9 \u0041"), "café A");
    }

    #[test]
    fn drops_null_and_control_escapes() {
        assert_eq!(sanitize_text(r"a\u0000b\u0007c"), "abc");
    }

    #[test]
    fn drops_surrogate_escapes() {
        assert_eq!(sanitize_text(r"x\ud83dy"), "xy");
    }

    #[test]
    fn drops_long_escapes() {
        assert_eq!(sanitize_text(r"smile\U0001F600!"), "smile!");
    }

    #[test]
    fn replaces_remaining_backslashes() {
        assert_eq!(sanitize_text(r"C:\temp\notes"), "C:/temp/notes");
        assert_eq!(sanitize_text(r"bad \uZZZZ escape"), "bad /uZZZZ escape");
    }

    #[test]
    fn mixed_input_has_no_control_characters() {
        let result = sanitize_text("start\0 \\u0041 lone\\slash");
        assert!(!result.chars().any(|c| c.is_control()));
        assert_eq!(result, "start A lone/slash");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(sanitize_text("Motivated seller, 3/2 ranch"), "Motivated seller, 3/2 ranch");
    }
}

//! Free-text sanitization
//!
//! Product bodies are authored in the WordPress editor and carry HTML,
//! entities and shortcodes. Shopping feeds want a short plain-text
//! description, so the body is unescaped, stripped and truncated.
//!
//! Whitespace left behind by removed markup is kept as-is, so
//! `"Great [x] for all"` becomes `"Great  for all"` with two spaces.

use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Default maximum description length, in characters
pub const DEFAULT_DESCRIPTION_MAX_LENGTH: usize = 350;

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\f <&#;]{1,32};?)")
        .expect("entity pattern is valid")
});

/// Entity names HTML5 still resolves without a trailing `;`
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 readings of the C1 range, indexed from 0x80
const CP1252_C1: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("tag pattern is valid"));

static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("shortcode pattern is valid"));

/// Sanitizes a free-text body
///
/// 1. Trims surrounding whitespace and resolves HTML entities.
/// 2. Removes `<...>` tags, then `[...]` shortcodes, both non-greedy.
/// 3. When longer than `max_length` characters, keeps the first
///    `max_length - 3` characters and appends `...`.
///
/// Truncation counts characters, not bytes, and ignores word boundaries.
///
/// # Examples
///
/// ```
/// use novazen_feed::core::transform::sanitize::sanitize;
///
/// assert_eq!(sanitize("<p>Fish &amp; Chips</p>", 350), "Fish & Chips");
/// assert_eq!(sanitize("abcdefgh", 6), "abc...");
/// ```
pub fn sanitize(text: &str, max_length: usize) -> String {
    let unescaped = unescape_html(text.trim());
    let without_tags = TAG.replace_all(&unescaped, "");
    let cleaned = SHORTCODE.replace_all(&without_tags, "");
    truncate(&cleaned, max_length)
}

/// Resolves HTML character references
///
/// Follows the HTML5 parsing rules: the trailing `;` is optional, numeric
/// references in the C1 range are read as Windows-1252, references to
/// surrogates or out-of-range values become U+FFFD and references to
/// noncharacters or control characters are dropped. A name without `;`
/// resolves to its longest legacy prefix (`&copy2024` becomes `©2024`).
/// Unknown names are kept.
pub fn unescape_html(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            match body.strip_prefix('#') {
                Some(numeric) => decode_numeric(numeric.trim_end_matches(';')),
                None => decode_named(body).unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

fn decode_numeric(numeric: &str) -> String {
    let code = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => numeric.parse::<u32>(),
    };
    let Ok(code) = code else {
        return char::REPLACEMENT_CHARACTER.to_string();
    };
    match code {
        0 => char::REPLACEMENT_CHARACTER.to_string(),
        0x0D => "\r".to_string(),
        0x80..=0x9F => CP1252_C1[(code - 0x80) as usize].to_string(),
        0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF => String::new(),
        _ if code & 0xFFFE == 0xFFFE && code <= 0x10FFFF => String::new(),
        _ => char::from_u32(code)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string(),
    }
}

fn decode_named(body: &str) -> Option<String> {
    match body.strip_suffix(';') {
        Some(name) => {
            if let Some(resolved) = resolve_html5_entity(name) {
                return Some(resolved.to_string());
            }
        }
        None => {
            if let Some(resolved) = resolve_legacy(body) {
                return Some(resolved.to_string());
            }
        }
    }

    // Longest legacy prefix, keeping whatever follows it
    let mut ends: Vec<usize> = body.char_indices().map(|(i, _)| i).skip(2).collect();
    ends.reverse();
    ends.into_iter().find_map(|end| {
        resolve_legacy(&body[..end]).map(|resolved| format!("{resolved}{}", &body[end..]))
    })
}

fn resolve_legacy(name: &str) -> Option<&'static str> {
    LEGACY_ENTITIES
        .contains(&name)
        .then(|| resolve_html5_entity(name))
        .flatten()
}

/// Hard character-count truncation with an ellipsis marker
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("<p>Hello</p>", "Hello" ; "paragraph")]
    #[test_case("  padded  ", "padded" ; "trims")]
    #[test_case("a <b>bold</b> move", "a bold move" ; "inline tag")]
    #[test_case("Great [shortcode] for all", "Great  for all" ; "shortcode leaves double space")]
    #[test_case("[gallery ids=\"1,2\"]Photos", "Photos" ; "shortcode with attributes")]
    #[test_case("1 < 2 and 3 > 2", "1  2" ; "stray brackets are consumed non-greedily")]
    #[test_case("Tom &amp; Jerry", "Tom & Jerry" ; "named entity")]
    #[test_case("&lt;b&gt;x&lt;/b&gt;", "x" ; "escaped markup is stripped after unescape")]
    #[test_case("&#8220;quoted&#x201D;", "\u{201C}quoted\u{201D}" ; "numeric entities")]
    #[test_case("&bogus; stays", "&bogus; stays" ; "unknown entity kept")]
    fn test_sanitize(input: &str, expected: &str) {
        assert_eq!(sanitize(input, DEFAULT_DESCRIPTION_MAX_LENGTH), expected);
    }

    #[test]
    fn test_nested_shortcode_pairs() {
        // The opening tag and the closing tag are separate matches
        assert_eq!(
            sanitize("<p>Great [shortcode]widget[/shortcode] for all</p>", 350),
            "Great widget for all"
        );
    }

    #[test]
    fn test_truncation_length_is_exact() {
        let long = "x".repeat(400);
        let out = sanitize(&long, 350);
        assert_eq!(out.chars().count(), 350);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..347], &long[..347]);
    }

    #[test]
    fn test_text_at_limit_is_unchanged() {
        let exact = "y".repeat(350);
        assert_eq!(sanitize(&exact, 350), exact);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let out = truncate(&text, 5);
        assert_eq!(out, "éé...");
    }

    #[test]
    fn test_invalid_numeric_entity() {
        assert_eq!(unescape_html("&#0;"), "\u{FFFD}");
        assert_eq!(unescape_html("&#xD800;"), "\u{FFFD}");
        assert_eq!(unescape_html("&#x110000;"), "\u{FFFD}");
        assert_eq!(unescape_html("&#99999999999;"), "\u{FFFD}");
    }

    #[test_case("&#128;", "\u{20AC}" ; "euro")]
    #[test_case("&#150;", "\u{2013}" ; "en dash")]
    #[test_case("&#x93;quoted&#x94;", "\u{201C}quoted\u{201D}" ; "hex curly quotes")]
    #[test_case("&#129;", "\u{81}" ; "unassigned slot kept")]
    fn test_c1_references_read_as_windows_1252(input: &str, expected: &str) {
        assert_eq!(unescape_html(input), expected);
    }

    #[test_case("&copy 2024", "\u{A9} 2024" ; "legacy name before space")]
    #[test_case("&copy2024", "\u{A9}2024" ; "legacy prefix")]
    #[test_case("Fish &amp Chips", "Fish & Chips" ; "amp without semicolon")]
    #[test_case("&#38 done", "& done" ; "numeric without semicolon")]
    #[test_case("&hellip", "&hellip" ; "modern name needs semicolon")]
    #[test_case("&hellip;", "\u{2026}" ; "modern name with semicolon")]
    #[test_case("a & b", "a & b" ; "bare ampersand")]
    fn test_entities_without_semicolon(input: &str, expected: &str) {
        assert_eq!(unescape_html(input), expected);
    }

    #[test]
    fn test_control_references_are_dropped() {
        assert_eq!(unescape_html("a&#1;b&#xFFFF;c"), "abc");
        assert_eq!(unescape_html("&#13;"), "\r");
    }
}

//! Integration tests for free-text sanitization

use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::Fake;
use novazen_feed::core::transform::sanitize::{sanitize, truncate, ELLIPSIS};
use novazen_feed::core::transform::DEFAULT_DESCRIPTION_MAX_LENGTH;
use test_case::test_case;

#[test_case("<p>Great [shortcode]widget[/shortcode] for all</p>", "Great widget for all" ; "paired shortcode tags")]
#[test_case("<p>Great [shortcode] for all</p>", "Great  for all" ; "single shortcode keeps spacing")]
#[test_case("<div class=\"desc\"><p>Soft</p>\n<ul><li>Cotton</li></ul></div>", "Soft\nCotton" ; "nested markup")]
#[test_case("Caf&eacute; &amp; Bar", "Café & Bar" ; "named entities")]
#[test_case("&#169; 2024", "© 2024" ; "decimal reference")]
#[test_case("&#0; zero", "\u{FFFD} zero" ; "nul reference replaced")]
#[test_case("", "" ; "empty body")]
fn test_sanitize_cases(input: &str, expected: &str) {
    assert_eq!(sanitize(input, DEFAULT_DESCRIPTION_MAX_LENGTH), expected);
}

#[test_case(10, "abcdefghijklmnop", "abcdefg..." ; "cut to limit")]
#[test_case(16, "abcdefghijklmnop", "abcdefghijklmnop" ; "exact length untouched")]
#[test_case(5, "ééééééé", "éé..." ; "counts characters not bytes")]
fn test_truncate_cases(max: usize, input: &str, expected: &str) {
    assert_eq!(truncate(input, max), expected);
}

#[test]
fn test_markup_free_text_only_trimmed() {
    for _ in 0..50 {
        let text: String = Sentence(3..12).fake();
        assert_eq!(sanitize(&format!("  {text}\n"), 10_000), text);
    }
}

#[test]
fn test_wrapping_tags_removed() {
    for _ in 0..50 {
        let text: String = Paragraph(1..4).fake();
        let tag: String = Word().fake();
        let wrapped = format!("<{tag}>{text}</{tag}>");
        assert_eq!(sanitize(&wrapped, 10_000), text);
    }
}

#[test]
fn test_output_never_exceeds_limit() {
    for max in [4usize, 20, 80, DEFAULT_DESCRIPTION_MAX_LENGTH] {
        for _ in 0..20 {
            let text: String = Paragraph(5..15).fake();
            let out = sanitize(&format!("<p>{text}</p>"), max);
            let len = out.chars().count();
            assert!(len <= max, "{len} > {max}");
            if text.chars().count() > max {
                assert!(out.ends_with(ELLIPSIS));
                assert_eq!(len, max);
            }
        }
    }
}

#[test]
fn test_sanitize_is_idempotent_for_short_text() {
    for _ in 0..50 {
        let text: String = Paragraph(1..3).fake();
        let once = sanitize(&format!("<p>{text}</p>"), DEFAULT_DESCRIPTION_MAX_LENGTH);
        assert_eq!(sanitize(&once, DEFAULT_DESCRIPTION_MAX_LENGTH), once);
    }
}

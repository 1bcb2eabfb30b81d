//! Content Normalizer — flattens resume HTML into line-oriented plain text.
//!
//! Block-level closes become line breaks, list items keep a `•` marker so the
//! list-item strategies can still see them, every other tag is dropped. Tag
//! matching is permissive: a stray `<` with no closing `>` is left as text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker inserted at each `<li>` so flattened lists remain recognisable.
pub const LIST_MARKER: &str = "• ";

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("valid regex")
});
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</(p|div|h[1-6]|li|ul|ol|tr|table|section|article|header|footer|blockquote)\s*>",
    )
    .expect("valid regex")
});
static LIST_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("valid regex"));
static CELL_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</t[dh]\s*>").expect("valid regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]{1,6}|[0-9]{1,7});").expect("valid regex"));
static LIST_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t\u{00A0}]*\n)+([ \t]*• )").expect("valid regex"));
static INLINE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200B}\u{3000}]+").expect("valid regex"));

/// Flattens HTML (or already-plain text) into normalized plain text.
///
/// Output has no leading/trailing blank lines, single spaces within lines and
/// at most one blank line between blocks. Never fails.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let text = html.replace("\r\n", "\n").replace('\r', "\n");
    let text = SCRIPT_STYLE.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = LIST_OPEN.replace_all(&text, format!("\n{LIST_MARKER}").as_str());
    let text = BLOCK_CLOSE.replace_all(&text, "\n");
    let text = CELL_CLOSE.replace_all(&text, " ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = LIST_GAP.replace_all(&text, "\n${1}");
    let text = decode_entities(&text);

    collapse_whitespace(&text)
}

/// Decodes the named entities resumes actually contain plus numeric references.
/// `&amp;` is decoded last so `&amp;lt;` stays a literal `&lt;`.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let text = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&ndash;", "–")
        .replace("&mdash;", "—")
        .replace("&bull;", "•")
        .replace("&middot;", "·")
        .replace("&amp;", "&")
}

/// Collapses inline whitespace and keeps at most one blank line between blocks.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in text.lines() {
        let line = INLINE_SPACE.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push(String::new());
            pending_blank = false;
        }
        out.push(line.to_string());
    }

    out.join("\n")
}

/// Non-empty, trimmed lines of normalized text.
pub fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("   \n\t "), "");
    }

    #[test]
    fn test_block_tags_become_line_breaks() {
        let html = "<h2>Experience</h2><p>Line one</p><div>Line two<br>Line three</div>";
        assert_eq!(
            html_to_text(html),
            "Experience\nLine one\nLine two\nLine three"
        );
    }

    #[test]
    fn test_list_items_keep_marker() {
        let html = "<ul><li>Shipped X</li><li>Fixed <b>Y</b></li></ul>";
        assert_eq!(html_to_text(html), "• Shipped X\n• Fixed Y");
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = "<p>R&amp;D&nbsp;&nbsp;team &lt;core&gt; &#8211; &#x41;</p>";
        assert_eq!(html_to_text(html), "R&D team <core> – A");
    }

    #[test]
    fn test_double_escaped_entity_stays_literal() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_at_most_one_blank_line_between_blocks() {
        let text = "Alpha\n\n\n\nBeta\n   \n\nGamma\n\n";
        assert_eq!(collapse_whitespace(text), "Alpha\n\nBeta\n\nGamma");
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = "<div><p>Unclosed <b>bold <i>text <span class=\"x\"";
        let text = html_to_text(html);
        assert!(text.contains("Unclosed"));
        assert!(text.contains("bold"));
    }

    #[test]
    fn test_script_and_style_are_dropped() {
        let html = "<style>.a{color:red}</style><p>Visible</p><script>alert(1)</script>";
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = "Jane Doe\n  jane@example.com  \n\n\nEXPERIENCE";
        assert_eq!(html_to_text(text), "Jane Doe\njane@example.com\n\nEXPERIENCE");
    }
}

//! Text cleanup for news and disclosure snippets.

use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid numeric entity regex"));
static LEFTOVER_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").expect("valid entity regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t]+").expect("valid line break regex"));
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid space regex"));
static NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n( ?\n)*").expect("valid newline regex"));

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
    ("&middot;", "·"),
    ("&lsquo;", "‘"),
    ("&rsquo;", "’"),
    ("&ldquo;", "“"),
    ("&rdquo;", "”"),
    ("&hellip;", "…"),
    ("&amp;", "&"),
];

/// Decode common HTML entities.
///
/// `&amp;` is decoded last so `&amp;lt;` becomes `&lt;` rather than `<`.
pub fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let body = &caps[1];
        let code = match body.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => body.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    NAMED_ENTITIES
        .iter()
        .fold(decoded.into_owned(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

/// Clean news text returned by search APIs.
///
/// Decodes entities, drops any entity left over, strips markup tags and
/// collapses whitespace so that every line holds content.
///
/// # Example
/// ```
/// use dartlens_data::text::clean_news_text;
///
/// let raw = "<b>삼성전자</b>, &quot;실적 개선&quot;\n\n 전망";
/// assert_eq!(clean_news_text(raw), "삼성전자, \"실적 개선\"\n 전망");
/// ```
pub fn clean_news_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = decode_entities(text);
    let text = LEFTOVER_ENTITY_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = LINE_BREAK_RE.replace_all(&text, "\n");
    let text = SPACES_RE.replace_all(&text, " ");
    let text = NEWLINES_RE.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("&lt;b&gt;주가&lt;/b&gt; 하락", "주가 하락")]
    #[case("A&amp;B", "A&B")]
    #[case("가격&#8200;인상", "가격\u{2008}인상")]
    #[case("&#x41;BC", "ABC")]
    #[case("unknown&zwj;entity", "unknownentity")]
    #[case("  a   b  ", "a b")]
    #[case("line1\r\n\t\nline2", "line1\nline2")]
    #[case("", "")]
    fn test_clean_news_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_news_text(input), expected);
    }

    #[test]
    fn test_amp_decoded_last() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("삼성전자주식회사", 4), "삼성전자");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}

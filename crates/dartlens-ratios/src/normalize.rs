//! Account name normalization.

/// Normalize an account or statement name for comparison.
///
/// Parenthesized segments are dropped (ASCII and full-width brackets, with
/// nesting), all whitespace is removed and the remainder is lower-cased.
/// An unclosed `(` drops the rest of the name; a stray `)` is ignored.
///
/// # Example
/// ```
/// use dartlens_ratios::normalize;
///
/// assert_eq!(normalize("당기순이익(손실)"), "당기순이익");
/// assert_eq!(normalize(" Total  Assets "), "totalassets");
/// ```
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;

    for ch in name.chars() {
        match ch {
            '(' | '（' => depth += 1,
            ')' | '）' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_whitespace() => {}
            c => out.extend(c.to_lowercase()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("유동자산", "유동자산")]
    #[case("유동 자산", "유동자산")]
    #[case("당기순이익(손실)", "당기순이익")]
    #[case("영업이익（손실）", "영업이익")]
    #[case("수익(매출액)", "수익")]
    #[case("TotalAssets", "totalassets")]
    #[case("Total\u{3000}Assets", "totalassets")]
    #[case("자산 (주석 (3)) 총계", "자산총계")]
    #[case("이익(미완결", "이익")]
    #[case("이익)잉여금", "이익잉여금")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_normalize_empty_forms() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("(주석)"), "");
    }
}

//! Chunk sizing, selection and layout for summaries.

/// Words that mark a summary as risk-related.
pub const RISK_KEYWORDS: &[&str] = &[
    "리스크", "위험", "부정", "손실", "소송", "규제", "부실", "우려", "사고", "불법", "하락", "적자",
];

/// Fewest chunks a summary should be split into.
pub const MIN_CHUNKS: usize = 7;

/// Most news chunks kept in a summary.
pub const MAX_NEWS_CHUNKS: usize = 10;

/// Chunk size for `n` news items, aiming at 7 to 10 chunks.
pub const fn news_chunk_size(n: usize) -> usize {
    if n < MIN_CHUNKS {
        1
    } else {
        let size = n / MAX_NEWS_CHUNKS;
        if size == 0 { 1 } else { size }
    }
}

/// Chunk size for `n` filings, giving at most [`MIN_CHUNKS`] chunks.
pub const fn filings_chunk_size(n: usize) -> usize {
    let size = n.div_ceil(MIN_CHUNKS);
    if size == 0 { 1 } else { size }
}

/// Split `texts` into groups of `size` joined by newlines.
pub fn join_chunks(texts: &[String], size: usize) -> Vec<String> {
    texts
        .chunks(size.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

fn is_risk_related(chunk: &str, keywords: &[&str]) -> bool {
    let lower = chunk.to_lowercase();
    keywords
        .iter()
        .map(|kw| kw.trim())
        .filter(|kw| !kw.is_empty())
        .any(|kw| lower.contains(&kw.to_lowercase()))
}

/// Pick up to `max` chunks, risk-related ones first.
///
/// Relative order is kept within both groups.
pub fn select_risk_chunks(chunks: &[String], keywords: &[&str], max: usize) -> Vec<String> {
    let (risk, rest): (Vec<&String>, Vec<&String>) = chunks
        .iter()
        .partition(|chunk| is_risk_related(chunk, keywords));
    risk.into_iter()
        .chain(rest)
        .take(max)
        .cloned()
        .collect()
}

/// Label chunks `A.`, `B.`, ... separated by blank lines.
pub fn format_alpha_chunks(chunks: &[String]) -> String {
    chunks
        .iter()
        .zip((b'A'..=b'Z').cycle())
        .map(|(chunk, letter)| format!("{}. {chunk}", letter as char))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Greedy word wrap to `width` characters per line.
///
/// Existing line breaks are kept, blank lines included. Words longer than
/// `width` are split.
pub fn wrap_lines(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out: Vec<String> = Vec::new();

    for line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let needed = if current_len == 0 {
                    word.len()
                } else {
                    current_len + 1 + word.len()
                };
                if needed <= width {
                    if current_len > 0 {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.extend(word.iter());
                    current_len += word.len();
                    break;
                }
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                    continue;
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
        }

        if current_len > 0 || line.trim().is_empty() {
            out.push(current);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(0, 1)]
    #[case(6, 1)]
    #[case(7, 1)]
    #[case(25, 2)]
    #[case(40, 4)]
    fn test_news_chunk_size(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(news_chunk_size(n), expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(7, 1)]
    #[case(8, 2)]
    #[case(45, 7)]
    fn test_filings_chunk_size(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(filings_chunk_size(n), expected);
    }

    #[test]
    fn test_join_chunks() {
        let texts = strings(&["a", "b", "c"]);
        assert_eq!(join_chunks(&texts, 2), vec!["a\nb", "c"]);
        assert_eq!(join_chunks(&texts, 0).len(), 3);
    }

    #[test]
    fn test_select_risk_chunks_prefers_risk() {
        let chunks = strings(&["신제품 출시", "소송 제기", "실적 호조", "적자 전환"]);
        let picked = select_risk_chunks(&chunks, RISK_KEYWORDS, 3);
        assert_eq!(picked, strings(&["소송 제기", "적자 전환", "신제품 출시"]));
    }

    #[test]
    fn test_select_risk_chunks_case_insensitive() {
        let chunks = strings(&["plain", "Litigation RISK rising"]);
        let picked = select_risk_chunks(&chunks, &["risk", " "], 10);
        assert_eq!(picked[0], "Litigation RISK rising");
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_format_alpha_chunks() {
        let chunks = strings(&["첫째", "둘째"]);
        assert_eq!(format_alpha_chunks(&chunks), "A. 첫째\n\nB. 둘째");

        let many: Vec<String> = (0..27).map(|i| i.to_string()).collect();
        assert!(format_alpha_chunks(&many).ends_with("A. 26"));
    }

    #[test]
    fn test_wrap_lines() {
        assert_eq!(wrap_lines("aa bb cc", 5), "aa bb\ncc");
        assert_eq!(wrap_lines("abcdefgh", 3), "abc\ndef\ngh");
        assert_eq!(wrap_lines("one\n\ntwo", 10), "one\n\ntwo");
        assert_eq!(wrap_lines("가나다 라마바", 4), "가나다\n라마바");
    }
}

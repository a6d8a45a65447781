//! Key audit matters from audit report text.

use crate::llm::{TextGenerator, ask};

/// Phrases that open a key-audit-matters section.
pub const AUDIT_KEYWORDS: &[&str] = &[
    "핵심감사사항",
    "핵심 감사사항",
    "key audit matter",
    "kam",
    "중요한 감사사항",
];

/// Lines captured from a section heading onwards.
pub const SECTION_LINES: usize = 20;

/// Shortest section worth keeping, in characters.
pub const MIN_SECTION_CHARS: usize = 100;

/// Longest section kept, in characters.
pub const MAX_SECTION_CHARS: usize = 1000;

/// Sections checked per industry.
pub const MAX_SECTIONS: usize = 3;

/// Answer meaning the section has nothing to do with the industry.
pub const NOT_RELATED: &str = "연관없음";

const RELEVANCE_TEMPERATURE: f32 = 0.3;

fn mentions_audit_matter(text: &str) -> bool {
    let lower = text.to_lowercase();
    AUDIT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Find key-audit-matter sections in filing texts.
///
/// Each heading line starts a window of [`SECTION_LINES`] lines. Windows
/// shorter than [`MIN_SECTION_CHARS`] are skipped; the rest are cut to
/// [`MAX_SECTION_CHARS`]. At most [`MAX_SECTIONS`] are returned.
pub fn key_audit_sections(filings: &[String]) -> Vec<String> {
    filings
        .iter()
        .filter(|filing| mentions_audit_matter(filing))
        .flat_map(|filing| {
            let lines: Vec<&str> = filing.lines().collect();
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| mentions_audit_matter(line))
                .map(|(i, _)| {
                    let end = (i + SECTION_LINES).min(lines.len());
                    lines[i..end].join("\n").trim().to_string()
                })
                .collect::<Vec<_>>()
        })
        .filter(|section| section.chars().count() > MIN_SECTION_CHARS)
        .map(|section| section.chars().take(MAX_SECTION_CHARS).collect())
        .take(MAX_SECTIONS)
        .collect()
}

/// Prompt asking whether `section` concerns `industry`.
pub fn relevance_prompt(section: &str, industry: &str) -> String {
    format!(
        "다음은 감사보고서의 핵심감사사항 내용입니다:\n\n{section}\n\n\
         이 내용이 '{industry}' 산업과 연관이 있는지 판단해주세요.\n\n\
         만약 연관이 있다면, 해당 핵심감사사항의 핵심 내용만 간단히 요약해주세요.\n\
         만약 연관이 없다면 '{NOT_RELATED}'이라고 답해주세요."
    )
}

/// Summaries of the sections the model judges relevant to `industry`.
pub async fn audit_matters_for(
    generator: &dyn TextGenerator,
    sections: &[String],
    industry: &str,
) -> Vec<String> {
    let mut matters = Vec::new();
    for section in sections.iter().take(MAX_SECTIONS) {
        let answer = ask(
            generator,
            &relevance_prompt(section, industry),
            RELEVANCE_TEMPERATURE,
        )
        .await;
        if let Some(answer) = answer.filter(|answer| !answer.contains(NOT_RELATED)) {
            matters.push(answer);
        }
    }
    matters
}

/// One-line form of a matter for the report, cut to 200 characters.
pub fn format_matter(matter: &str) -> String {
    let flat: String = matter.replace('\n', " ").trim().chars().take(200).collect();
    format!("{flat}...")
}

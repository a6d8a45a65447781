//! Industry identification for a company.
//!
//! The model is asked for a short list of industries; when that fails the
//! company name itself is checked for telltale keywords, and as a last
//! resort the model gets a simpler one-line question.

pub mod category;

pub use category::IndustryCategory;

use crate::llm::{TextGenerator, ask};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most industries kept per company.
pub const MAX_INDUSTRIES: usize = 4;

/// Industry used when nothing else can be determined.
pub const UNKNOWN_INDUSTRY: &str = "기타";

const INDUSTRY_TEMPERATURE: f32 = 0.3;
const FALLBACK_TEMPERATURE: f32 = 0.5;
const CLASSIFY_TEMPERATURE: f32 = 0.8;

/// Company-name keywords and the industry they suggest.
const NAME_HINTS: &[(&[&str], &str)] = &[
    (&["에너지", "전지", "battery", "배터리"], "에너지저장장치"),
    (&["전자", "electronics", "반도체", "semiconductor"], "전자부품"),
    (&["제약", "pharma", "바이오", "bio"], "제약업"),
];

/// An industry with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// Industry name
    pub name: String,
    /// Coarse category
    pub category: IndustryCategory,
}

/// Prompt asking for a company's industries, one per line.
pub fn industry_prompt(company: &str) -> String {
    format!(
        "{company}의 주요 산업 분야를 2-3개 나열해주세요.\n\
         다음 규칙을 따라주세요:\n\
         1. 회사명이 아닌 실제 산업 분야만 나열해주세요\n\
         2. 각 산업명은 한 줄에 하나씩 나열해주세요\n\
         3. 불필요한 설명이나 부연 설명 없이 산업명만 간단히 나열해주세요\n\n\
         예시:\n배터리\n에너지저장\n전기차"
    )
}

fn fallback_prompt(company: &str) -> String {
    format!(
        "'{company}'은 어떤 산업에 속하는 회사인가요? 산업명 1-2개만 간단히 답해주세요. 예: 전자, 에너지, 제조, 금융 등"
    )
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0
        && let Some(rest) = line[digits..].strip_prefix(['.', ')'])
    {
        return rest.trim_start();
    }
    line
}

/// Industry names from a line-per-industry answer.
///
/// List markers are stripped; names outside 2 to 20 characters are dropped.
pub fn parse_industry_lines(answer: &str) -> Vec<String> {
    answer
        .lines()
        .map(strip_list_marker)
        .filter(|line| (2..=20).contains(&line.chars().count()))
        .map(str::to_string)
        .collect()
}

/// Guess an industry from keywords in the company name.
pub fn guess_from_company_name(company: &str) -> Option<&'static str> {
    let lower = company.to_lowercase();
    NAME_HINTS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(_, industry)| *industry)
}

/// Drop names contained in (or containing) an earlier one, keeping at most
/// `max`.
pub fn dedup_similar(names: &[String], max: usize) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for name in names {
        if kept.len() >= max {
            break;
        }
        if !kept
            .iter()
            .any(|existing| existing.contains(name.as_str()) || name.contains(existing.as_str()))
        {
            kept.push(name.clone());
        }
    }
    kept
}

/// Determine up to [`MAX_INDUSTRIES`] industry names for `company`.
///
/// Never empty: falls back to [`UNKNOWN_INDUSTRY`].
pub async fn identify_industries(generator: &dyn TextGenerator, company: &str) -> Vec<String> {
    let mut names = ask(generator, &industry_prompt(company), INDUSTRY_TEMPERATURE)
        .await
        .map(|answer| parse_industry_lines(&answer))
        .unwrap_or_default();

    if names.is_empty() {
        if let Some(guess) = guess_from_company_name(company) {
            debug!(company, guess, "industry guessed from company name");
            names.push(guess.to_string());
        } else if let Some(answer) =
            ask(generator, &fallback_prompt(company), FALLBACK_TEMPERATURE).await
            && answer.chars().count() > 2
        {
            names.push(answer);
        }
    }

    if names.is_empty() {
        names.push(UNKNOWN_INDUSTRY.to_string());
    }
    dedup_similar(&names, MAX_INDUSTRIES)
}

/// Attach a category to `name`, asking the model for unknown names.
pub async fn classify(generator: &dyn TextGenerator, name: &str) -> Industry {
    let category = match IndustryCategory::from_industry_name(name) {
        Some(category) => category,
        None => ask(
            generator,
            &IndustryCategory::classification_prompt(name),
            CLASSIFY_TEMPERATURE,
        )
        .await
        .map_or(IndustryCategory::Other, |answer| {
            IndustryCategory::from_llm_answer(&answer)
        }),
    };
    Industry {
        name: name.to_string(),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, RiskError};
    use async_trait::async_trait;
    use rstest::rstest;

    struct Scripted(fn(&str) -> Result<String>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
            (self.0)(prompt)
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_industry_lines() {
        let answer = "1. 반도체\n- 디스플레이\n2차전지\n\n가\n전자부품 및 통신장비 제조업이라는 매우 긴 이름\n  IT  ";
        assert_eq!(parse_industry_lines(answer), strings(&["반도체", "디스플레이", "2차전지", "IT"]));
    }

    #[rstest]
    #[case("LG에너지솔루션", Some("에너지저장장치"))]
    #[case("삼성전자", Some("전자부품"))]
    #[case("Celltrion Pharma", Some("제약업"))]
    #[case("현대건설", None)]
    fn test_guess_from_company_name(#[case] company: &str, #[case] expected: Option<&str>) {
        assert_eq!(guess_from_company_name(company), expected);
    }

    #[test]
    fn test_dedup_similar() {
        let names = strings(&["배터리", "배터리 소재", "전기차", "에너지", "화학", "철강"]);
        assert_eq!(
            dedup_similar(&names, MAX_INDUSTRIES),
            strings(&["배터리", "전기차", "에너지", "화학"])
        );
    }

    #[tokio::test]
    async fn test_identify_from_answer() {
        let generator = Scripted(|_| Ok("배터리\n에너지저장\n전기차".to_string()));
        assert_eq!(
            identify_industries(&generator, "LG에너지솔루션").await,
            strings(&["배터리", "에너지저장", "전기차"])
        );
    }

    #[tokio::test]
    async fn test_identify_falls_back_to_name_then_unknown() {
        let failing = Scripted(|_| Err(RiskError::Generator("down".to_string())));
        assert_eq!(
            identify_industries(&failing, "삼성전자").await,
            strings(&["전자부품"])
        );
        assert_eq!(
            identify_industries(&failing, "현대건설").await,
            strings(&[UNKNOWN_INDUSTRY])
        );
    }

    #[tokio::test]
    async fn test_identify_uses_fallback_prompt() {
        let generator = Scripted(|prompt| {
            if prompt.contains("어떤 산업에 속하는") {
                Ok("건설업".to_string())
            } else {
                Ok(String::new())
            }
        });
        assert_eq!(
            identify_industries(&generator, "현대건설").await,
            strings(&["건설업"])
        );
    }

    #[tokio::test]
    async fn test_classify() {
        let generator = Scripted(|_| Ok("화학".to_string()));
        let known = classify(&generator, "은행업").await;
        assert_eq!(known.category, IndustryCategory::Finance);
        let asked = classify(&generator, "2차전지 소재").await;
        assert_eq!(asked.category, IndustryCategory::Chemicals);
    }
}

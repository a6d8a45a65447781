//! Coarse industry categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category an industry name is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndustryCategory {
    /// 에너지
    Energy,

    /// 철강
    Steel,

    /// 바이오
    Bio,

    /// 제조
    Manufacturing,

    /// 금융
    Finance,

    /// IT
    InformationTechnology,

    /// 전자
    Electronics,

    /// 화학
    Chemicals,

    /// 반도체
    Semiconductor,

    /// 기타
    Other,
}

/// Known industry names and their categories.
const INDUSTRY_CATEGORY_MAP: &[(&str, IndustryCategory)] = &[
    ("반도체 제조업", IndustryCategory::Semiconductor),
    ("자동차 부품 제조업", IndustryCategory::Manufacturing),
    ("디스플레이 제조업", IndustryCategory::Electronics),
    ("은행업", IndustryCategory::Finance),
    ("제약업", IndustryCategory::Bio),
    ("석유화학", IndustryCategory::Chemicals),
    ("화학의 전지사업", IndustryCategory::Chemicals),
    ("배터리업", IndustryCategory::Energy),
    ("태양광 사업", IndustryCategory::Energy),
    ("바이오산업", IndustryCategory::Bio),
    ("철강 제조업", IndustryCategory::Steel),
    ("전자부품 제조업", IndustryCategory::Electronics),
    ("정보통신업", IndustryCategory::InformationTechnology),
];

impl IndustryCategory {
    /// Categories an LLM answer may name, in matching order.
    pub const CLASSIFIABLE: [Self; 9] = [
        Self::Energy,
        Self::Steel,
        Self::Bio,
        Self::Manufacturing,
        Self::Finance,
        Self::InformationTechnology,
        Self::Electronics,
        Self::Chemicals,
        Self::Semiconductor,
    ];

    /// Returns all categories.
    pub fn all() -> Vec<Self> {
        Self::CLASSIFIABLE
            .into_iter()
            .chain(std::iter::once(Self::Other))
            .collect()
    }

    /// Korean category name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Energy => "에너지",
            Self::Steel => "철강",
            Self::Bio => "바이오",
            Self::Manufacturing => "제조",
            Self::Finance => "금융",
            Self::InformationTechnology => "IT",
            Self::Electronics => "전자",
            Self::Chemicals => "화학",
            Self::Semiconductor => "반도체",
            Self::Other => "기타",
        }
    }

    /// Look up a known industry name.
    pub fn from_industry_name(industry: &str) -> Option<Self> {
        let industry = industry.trim();
        INDUSTRY_CATEGORY_MAP
            .iter()
            .find(|(name, _)| *name == industry)
            .map(|(_, category)| *category)
    }

    /// Read a category out of a free-text answer.
    ///
    /// The first category (in [`Self::CLASSIFIABLE`] order) whose name
    /// appears in the answer wins; anything else is [`Self::Other`].
    pub fn from_llm_answer(answer: &str) -> Self {
        Self::CLASSIFIABLE
            .into_iter()
            .find(|category| answer.contains(category.name()))
            .unwrap_or(Self::Other)
    }

    /// Prompt asking for the category of `industry`.
    pub fn classification_prompt(industry: &str) -> String {
        let names: Vec<&str> = Self::CLASSIFIABLE.iter().map(Self::name).collect();
        format!(
            "'{industry}'을(를) 아래 카테고리 중 가장 적합한 하나로 분류해줘. 반드시 한 단어만 반환.\n카테고리 후보: {}",
            names.join(", ")
        )
    }
}

impl fmt::Display for IndustryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

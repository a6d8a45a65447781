//! End-to-end risk summary for one company.

use crate::audit::{audit_matters_for, format_matter, key_audit_sections};
use crate::chunking::{
    MAX_NEWS_CHUNKS, MIN_CHUNKS, RISK_KEYWORDS, filings_chunk_size, format_alpha_chunks,
    join_chunks, news_chunk_size, select_risk_chunks, wrap_lines,
};
use crate::industry::{Industry, classify, identify_industries};
use crate::llm::{TextGenerator, ask};
use crate::summarize::summarize_chunks;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

const NO_SUMMARY: &str = "(요약 없음)";
const NO_RATIOS: &str = "(재무비율 데이터 없음)";
const NO_COMMENTARY: &str = "(LLM 해설 없음)";
const NO_INTEGRATED: &str = "(LLM 통합분석 없음)";
const NO_AUDIT_MATTERS: &str = "- 해당 내용 관련 핵심감사사항이 표기되지 않았습니다.";
const NO_ACCOUNTING_RISKS: &str = "- 회계리스크 이슈 생성에 실패했습니다.";
const EXCERPT_PREFIX: &str = "(원문 일부)";
const EXCERPT_CHARS: usize = 200;

const ACCOUNTING_TEMPERATURE: f32 = 0.7;
const COMMENTARY_TEMPERATURE: f32 = 0.7;
const INTEGRATED_TEMPERATURE: f32 = 0.7;

/// Tunables for [`RiskAnalyst`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Line width for wrapped sections
    pub wrap_width: usize,
    /// Characters kept per filing or article
    pub max_item_chars: usize,
    /// Recent filings fed to the filings summary
    pub max_filings: usize,
    /// Yearly key reports fed to the filings summary
    pub max_key_reports: usize,
    /// Articles fed to the news summary
    pub max_news: usize,
    /// Characters per summarization prompt
    pub max_chunk_chars: usize,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            wrap_width: 45,
            max_item_chars: 1000,
            max_filings: 40,
            max_key_reports: 5,
            max_news: 40,
            max_chunk_chars: crate::summarize::DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

/// Everything the analyst reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskInputs {
    /// Company name
    pub company: String,
    /// Recent filing lines, newest first
    pub filings: Vec<String>,
    /// Yearly key report texts
    pub key_reports: Vec<String>,
    /// Cleaned news texts, newest first
    pub news: Vec<String>,
    /// Rendered ratio table, if ratios were computed
    pub ratio_table: Option<String>,
}

/// The seven sections of a risk report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Industries with categories
    pub industries: Vec<Industry>,
    /// Per-industry audit matters and accounting risks
    pub industry_risks: String,
    /// Filings-based summary
    pub filings_summary: String,
    /// News-based summary
    pub news_summary: String,
    /// Ratio table as given
    pub ratio_table: String,
    /// Commentary on the ratio table
    pub ratio_commentary: String,
    /// Combined analysis
    pub integrated_analysis: String,
}

impl RiskSummary {
    /// Render as report text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[산업/카테고리]")?;
        for industry in &self.industries {
            writeln!(f, "- {} ({})", industry.name, industry.category)?;
        }
        let sections = [
            ("산업별 리스크 키워드/이슈", &self.industry_risks),
            ("공시/보고서 기반 리스크 요약", &self.filings_summary),
            ("뉴스 기반 리스크 요약", &self.news_summary),
            ("재무비율 표", &self.ratio_table),
            ("재무비율 해설", &self.ratio_commentary),
            ("통합 LLM 분석", &self.integrated_analysis),
        ];
        for (title, body) in sections {
            write!(f, "\n[{title}]\n{body}\n")?;
        }
        Ok(())
    }
}

fn excerpt(text: &str) -> String {
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{EXCERPT_PREFIX} {head}")
}

fn accounting_risk_prompt(industry: &str) -> String {
    format!(
        "{industry} 산업의 주요 회계리스크 이슈를 4-5개 나열해줘.\n\
         각 항목은 다음과 같은 형식으로 작성해줘:\n\
         - (구체적인 회계리스크 이슈 설명)\n\n\
         실제 {industry} 산업의 특성을 반영하여 구체적이고 전문적으로 작성해줘.\n\
         예시: 매출 인식, 재고 평가, 자산 손상, 충당부채, 관계사 거래 등과 관련된 리스크"
    )
}

/// Bullet lines from an accounting-risk answer, dropping headings.
fn accounting_risk_lines(answer: &str, industry: &str) -> Vec<String> {
    answer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(industry) && !line.starts_with("주요"))
        .map(|line| {
            if line.starts_with('-') {
                line.to_string()
            } else {
                format!("- {line}")
            }
        })
        .collect()
}

/// Builds a [`RiskSummary`] from filings, news and ratios.
///
/// Every model call may fail; each section then falls back to placeholder
/// text or raw excerpts, so [`RiskAnalyst::analyze`] always returns.
#[derive(Clone)]
pub struct RiskAnalyst {
    generator: Arc<dyn TextGenerator>,
    config: AnalystConfig,
}

impl RiskAnalyst {
    /// Create an analyst with default settings.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            config: AnalystConfig::default(),
        }
    }

    /// Override the settings.
    pub fn with_config(mut self, config: AnalystConfig) -> Self {
        self.config = config;
        self
    }

    /// Current settings.
    pub const fn config(&self) -> &AnalystConfig {
        &self.config
    }

    fn truncated(&self, items: &[String], limit: usize) -> Vec<String> {
        items
            .iter()
            .filter(|item| !item.trim().is_empty())
            .take(limit)
            .map(|item| item.chars().take(self.config.max_item_chars).collect())
            .collect()
    }

    /// Produce the full summary.
    pub async fn analyze(&self, inputs: &RiskInputs) -> RiskSummary {
        let generator = self.generator.as_ref();
        info!(company = %inputs.company, "starting risk analysis");

        let names = identify_industries(generator, &inputs.company).await;
        let mut industries = Vec::with_capacity(names.len());
        for name in &names {
            industries.push(classify(generator, name).await);
        }

        let mut filings = self.truncated(&inputs.filings, self.config.max_filings);
        filings.extend(self.truncated(&inputs.key_reports, self.config.max_key_reports));
        let news = self.truncated(&inputs.news, self.config.max_news);

        let industry_risks = self.industry_risks(&names, &filings).await;
        let filings_summary = self.filings_summary(&filings).await;
        let news_summary = self.news_summary(&news).await;

        let ratio_table = inputs
            .ratio_table
            .as_deref()
            .map(str::trim)
            .filter(|table| !table.is_empty())
            .unwrap_or(NO_RATIOS)
            .to_string();
        let ratio_commentary = self.ratio_commentary(&ratio_table).await;

        let integrated_analysis = self
            .integrated_analysis(&names, &filings_summary, &news_summary, &ratio_table)
            .await;

        let width = self.config.wrap_width;
        RiskSummary {
            industries,
            industry_risks,
            filings_summary: wrap_lines(&filings_summary, width),
            news_summary: wrap_lines(&news_summary, width),
            ratio_table,
            ratio_commentary: wrap_lines(&ratio_commentary, width),
            integrated_analysis: wrap_lines(&integrated_analysis, width),
        }
    }

    async fn industry_risks(&self, industries: &[String], filings: &[String]) -> String {
        let generator = self.generator.as_ref();
        let sections = key_audit_sections(filings);
        debug!(sections = sections.len(), "audit sections found");

        let mut blocks = Vec::with_capacity(industries.len());
        for industry in industries {
            let mut block = vec![format!("[{industry}]"), "핵심감사사항:".to_string()];

            let matters = audit_matters_for(generator, &sections, industry).await;
            if matters.is_empty() {
                block.push(NO_AUDIT_MATTERS.to_string());
            } else {
                block.extend(matters.iter().map(|m| format!("- {}", format_matter(m))));
            }

            block.push(String::new());
            block.push("주요 회계리스크 이슈:".to_string());
            let lines = ask(
                generator,
                &accounting_risk_prompt(industry),
                ACCOUNTING_TEMPERATURE,
            )
            .await
            .map(|answer| accounting_risk_lines(&answer, industry))
            .unwrap_or_default();
            if lines.is_empty() {
                block.push(NO_ACCOUNTING_RISKS.to_string());
            } else {
                block.extend(lines);
            }

            blocks.push(block.join("\n"));
        }
        blocks.join("\n\n")
    }

    /// Summaries of `chunks`, with failed chunks replaced by an excerpt of
    /// their source text.
    async fn summarize_or_excerpt(&self, chunks: &[String]) -> Vec<String> {
        summarize_chunks(self.generator.as_ref(), chunks, self.config.max_chunk_chars)
            .await
            .into_iter()
            .zip(chunks)
            .map(|(summary, chunk)| summary.unwrap_or_else(|| excerpt(chunk)))
            .collect()
    }

    async fn filings_summary(&self, filings: &[String]) -> String {
        if filings.is_empty() {
            return NO_SUMMARY.to_string();
        }

        let mut chunks = join_chunks(filings, filings_chunk_size(filings.len()));
        if chunks.len() < MIN_CHUNKS {
            chunks = join_chunks(filings, 1);
        }
        chunks.truncate(MAX_NEWS_CHUNKS);
        let summaries = self.summarize_or_excerpt(&chunks).await;
        format_alpha_chunks(&summaries)
    }

    async fn news_summary(&self, news: &[String]) -> String {
        if news.is_empty() {
            return NO_SUMMARY.to_string();
        }

        let mut chunks = join_chunks(news, news_chunk_size(news.len()));
        if chunks.len() < MIN_CHUNKS {
            chunks = join_chunks(news, 1);
        }
        chunks.truncate(MAX_NEWS_CHUNKS);
        let summaries = self.summarize_or_excerpt(&chunks).await;
        let selected = select_risk_chunks(&summaries, RISK_KEYWORDS, MAX_NEWS_CHUNKS);
        format_alpha_chunks(&selected)
    }

    async fn ratio_commentary(&self, ratio_table: &str) -> String {
        if ratio_table == NO_RATIOS {
            return NO_RATIOS.to_string();
        }
        let prompt = format!(
            "아래는 주요 재무비율 표입니다. 표를 참고하여 최근 5개년의 재무 건전성, 성장성, 수익성, 위험성, 주요 리스크 신호를 5문장 이내로 요약해줘:\n{ratio_table}"
        );
        ask(self.generator.as_ref(), &prompt, COMMENTARY_TEMPERATURE)
            .await
            .unwrap_or_else(|| NO_COMMENTARY.to_string())
    }

    async fn integrated_analysis(
        &self,
        industries: &[String],
        filings_summary: &str,
        news_summary: &str,
        ratio_table: &str,
    ) -> String {
        let prompt = format!(
            "산업/카테고리: {}\n공시/보고서 요약: {filings_summary}\n뉴스 요약: {news_summary}\n주요 재무비율: {ratio_table}\n\n\
             위 정보를 참고하여, 해당 기업의 최근 5년간 주요 리스크 요인과 시사점, 향후 주의해야 할 점을 5문장 이내로 종합 요약해줘.",
            industries.join(", ")
        );
        ask(self.generator.as_ref(), &prompt, INTEGRATED_TEMPERATURE)
            .await
            .unwrap_or_else(|| NO_INTEGRATED.to_string())
    }
}

impl fmt::Debug for RiskAnalyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskAnalyst")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

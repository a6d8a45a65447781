//! Risk summary stage: gather filings and news, then run the analyst.
//!
//! Every source is optional. A failed fetch leaves its input empty and the
//! analyst fills the section with a placeholder.

use chrono::NaiveDate;
use dartlens_data::dart::{DartClient, KeyReport};
use dartlens_data::naver::{NaverConfig, NaverNewsClient};
use dartlens_output::{Report, ReportBuilder};
use dartlens_risk::{ChatClient, LlmConfig, RiskAnalyst, RiskInputs, RiskSummary, TextGenerator};
use std::sync::Arc;
use tracing::{info, warn};

/// Recent filings requested.
const FILING_COUNT: usize = 40;
/// Characters kept per filing line.
const FILING_MAX_CHARS: usize = 600;
/// Characters kept per key report.
const KEY_REPORT_MAX_CHARS: usize = 1000;
/// Characters of a key report passed to the analyst.
const KEY_REPORT_EXCERPT_CHARS: usize = 800;
/// Articles requested.
const NEWS_COUNT: usize = 40;
/// Search windows tried before giving up on reaching [`NEWS_COUNT`].
const NEWS_ATTEMPTS: u32 = 5;
/// Characters kept per article.
const NEWS_MAX_CHARS: usize = 1000;

/// Where the risk stage reads from.
pub(crate) struct RiskSources<'a> {
    pub dart: &'a DartClient,
    pub corp_code: &'a str,
    pub company: &'a str,
    pub years: &'a [i32],
    pub since: NaiveDate,
    pub naver: Option<NaverConfig>,
}

fn key_report_text(report: &KeyReport) -> String {
    let excerpt: String = report.text.chars().take(KEY_REPORT_EXCERPT_CHARS).collect();
    format!("[{}] {}\n{}", report.year, report.report_name, excerpt)
}

async fn collect_filings(sources: &RiskSources<'_>) -> Vec<String> {
    match sources
        .dart
        .recent_filings(sources.corp_code, sources.since, FILING_COUNT, FILING_MAX_CHARS)
        .await
    {
        Ok(filings) => {
            info!(count = filings.count(), "collected recent filings");
            filings.lines
        }
        Err(e) => {
            warn!(error = %e, "recent filings unavailable");
            Vec::new()
        }
    }
}

async fn collect_key_reports(sources: &RiskSources<'_>) -> Vec<String> {
    let mut years = sources.years.to_vec();
    years.sort_unstable_by(|a, b| b.cmp(a));
    match sources
        .dart
        .yearly_key_reports(sources.corp_code, &years, KEY_REPORT_MAX_CHARS)
        .await
    {
        Ok(reports) => reports
            .iter()
            .filter(|report| !report.text.trim().is_empty())
            .map(key_report_text)
            .collect(),
        Err(e) => {
            warn!(error = %e, "key reports unavailable");
            Vec::new()
        }
    }
}

async fn collect_news(sources: &RiskSources<'_>) -> Vec<String> {
    let Some(config) = sources.naver.clone() else {
        warn!("Naver credentials not set, skipping news");
        return Vec::new();
    };
    let client = match NaverNewsClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "news client unavailable");
            return Vec::new();
        }
    };
    match client
        .collect_recent(
            sources.company,
            sources.since,
            NEWS_COUNT,
            NEWS_ATTEMPTS,
            NEWS_MAX_CHARS,
        )
        .await
    {
        Ok(collection) => collection.texts,
        Err(e) => {
            warn!(error = %e, "news search failed");
            Vec::new()
        }
    }
}

/// Gather the analyst's inputs. Filings, key reports and news are fetched
/// concurrently.
pub(crate) async fn gather_inputs(
    sources: &RiskSources<'_>,
    ratio_table: Option<String>,
) -> RiskInputs {
    let (filings, key_reports, news) = tokio::join!(
        collect_filings(sources),
        collect_key_reports(sources),
        collect_news(sources),
    );

    RiskInputs {
        company: sources.company.to_string(),
        filings,
        key_reports,
        news,
        ratio_table,
    }
}

/// Build the analyst for an LLM configuration.
pub(crate) fn analyst(config: LlmConfig) -> Result<RiskAnalyst, dartlens_risk::RiskError> {
    let generator: Arc<dyn TextGenerator> = Arc::new(ChatClient::new(config)?);
    Ok(RiskAnalyst::new(generator))
}

/// Wrap a summary in a dated report.
pub(crate) fn to_report(company: &str, years: &[i32], summary: &RiskSummary) -> Report {
    ReportBuilder::new()
        .company(company)
        .years(years.to_vec())
        .body(summary.render())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartlens_risk::Industry;

    #[test]
    fn test_key_report_text() {
        let report = KeyReport {
            year: 2023,
            report_name: "사업보고서 (2023.12)".to_string(),
            text: "가".repeat(900),
        };
        let text = key_report_text(&report);
        assert!(text.starts_with("[2023] 사업보고서 (2023.12)\n"));
        assert_eq!(text.lines().nth(1).unwrap().chars().count(), KEY_REPORT_EXCERPT_CHARS);
    }

    #[test]
    fn test_to_report_carries_summary() {
        let summary = RiskSummary {
            industries: vec![Industry {
                name: "반도체".to_string(),
                category: dartlens_risk::IndustryCategory::Semiconductor,
            }],
            industry_risks: "위험".to_string(),
            filings_summary: "A. 요약".to_string(),
            news_summary: "A. 뉴스".to_string(),
            ratio_table: "표".to_string(),
            ratio_commentary: "해설".to_string(),
            integrated_analysis: "통합".to_string(),
        };
        let report = to_report("삼성전자", &[2022, 2023], &summary);
        let text = report.to_text();
        assert!(text.contains("분석 기간: 2022~2023"));
        assert!(text.contains("- 반도체 (반도체)"));
        assert!(text.contains("[통합 LLM 분석]\n통합"));
    }
}

//! Company overview and disclosure listings.

use super::client::{DartClient, StatusEnvelope};
use crate::error::{DataError, Result};
use crate::text::truncate_chars;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Report names that carry audit and financial content.
pub const KEY_REPORT_KINDS: [&str; 3] = ["사업보고서", "감사보고서", "재무제표"];

/// Largest page DART serves for `list.json`.
pub const MAX_PAGE_COUNT: u32 = 100;

const DATE_FORMAT: &str = "%Y%m%d";

/// Company overview from `company.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    /// Registered name
    pub corp_name: String,
    /// English name
    pub corp_name_eng: String,
    /// Name on the exchange
    pub stock_name: String,
    /// KRX stock code
    pub stock_code: String,
    /// CEO name
    pub ceo_nm: String,
    /// Market class (Y: KOSPI, K: KOSDAQ, N: KONEX, E: other)
    pub corp_cls: String,
    /// Korean standard industry classification code
    pub induty_code: String,
    /// Establishment date (YYYYMMDD)
    pub est_dt: String,
    /// Fiscal year-end month
    pub acc_mt: String,
    /// Homepage
    pub hm_url: String,
    /// Address
    pub adres: String,
}

#[derive(Debug, Deserialize)]
struct CompanyEnvelope {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(flatten)]
    info: CompanyInfo,
}

/// Parse a `company.json` body.
///
/// Returns `Ok(None)` for DART's "no data" status.
///
/// # Errors
/// Returns `DataError::DartApi` for any other non-success status and
/// `DataError::Serialization` for malformed JSON.
pub fn parse_company_info(body: &str) -> Result<Option<CompanyInfo>> {
    let envelope: CompanyEnvelope = serde_json::from_str(body)?;
    envelope.into_info()
}

impl CompanyEnvelope {
    fn into_info(self) -> Result<Option<CompanyInfo>> {
        Ok(self.status.check()?.then_some(self.info))
    }
}

impl CompanyInfo {
    /// Market name for [`corp_cls`](Self::corp_cls).
    pub fn market(&self) -> &'static str {
        match self.corp_cls.as_str() {
            "Y" => "KOSPI",
            "K" => "KOSDAQ",
            "N" => "KONEX",
            _ => "기타",
        }
    }
}

/// One disclosure from `list.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disclosure {
    /// Filer corp code
    pub corp_code: String,
    /// Filer name
    pub corp_name: String,
    /// KRX stock code
    pub stock_code: String,
    /// Market class
    pub corp_cls: String,
    /// Report title
    pub report_nm: String,
    /// Receipt number
    pub rcept_no: String,
    /// Submitter
    pub flr_nm: String,
    /// Receipt date (YYYYMMDD)
    pub rcept_dt: String,
    /// Remarks
    pub rm: String,
}

impl Disclosure {
    /// Year of the receipt date.
    pub fn year(&self) -> Option<i32> {
        self.rcept_dt.get(..4)?.parse().ok()
    }

    /// Whether this is a business report, audit report or financial statement.
    pub fn is_key_report(&self) -> bool {
        KEY_REPORT_KINDS
            .iter()
            .any(|kind| self.report_nm.contains(kind))
    }

    /// `[date] title`, truncated to `max_length` characters.
    pub fn summary_line(&self, max_length: usize) -> String {
        truncate_chars(
            &format!("[{}] {}", self.rcept_dt, self.report_nm.trim()),
            max_length,
        )
    }
}

/// Parameters for a `list.json` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureQuery {
    /// Earliest receipt date
    pub since: Option<NaiveDate>,
    /// Latest receipt date
    pub until: Option<NaiveDate>,
    /// 1-based page number
    pub page_no: u32,
    /// Page size, at most [`MAX_PAGE_COUNT`]
    pub page_count: u32,
}

impl DisclosureQuery {
    /// First page of the largest size.
    pub const fn new() -> Self {
        Self {
            since: None,
            until: None,
            page_no: 1,
            page_count: MAX_PAGE_COUNT,
        }
    }

    /// Restrict to filings on or after a date.
    pub const fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    /// Restrict to filings on or before a date.
    pub const fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    /// Restrict to one calendar year.
    pub fn year(self, year: i32) -> Self {
        let mut query = self;
        query.since = NaiveDate::from_ymd_opt(year, 1, 1);
        query.until = NaiveDate::from_ymd_opt(year, 12, 31);
        query
    }

    /// Select a page.
    pub const fn page(mut self, page_no: u32) -> Self {
        self.page_no = page_no;
        self
    }

    fn params(&self, corp_code: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("corp_code", corp_code.to_string()),
            ("page_no", self.page_no.max(1).to_string()),
            (
                "page_count",
                self.page_count.clamp(1, MAX_PAGE_COUNT).to_string(),
            ),
        ];
        if let Some(since) = self.since {
            params.push(("bgn_de", since.format(DATE_FORMAT).to_string()));
        }
        if let Some(until) = self.until {
            params.push(("end_de", until.format(DATE_FORMAT).to_string()));
        }
        params
    }
}

impl Default for DisclosureQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of disclosures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosurePage {
    /// Page number
    pub page_no: u32,
    /// Page size
    pub page_count: u32,
    /// Total matching disclosures
    pub total_count: u32,
    /// Total pages
    pub total_page: u32,
    /// Disclosures, newest first
    pub list: Vec<Disclosure>,
}

impl DisclosurePage {
    /// Whether more pages follow this one.
    pub const fn has_next(&self) -> bool {
        self.page_no < self.total_page
    }
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(flatten)]
    page: DisclosurePage,
}

/// Most recent filings rendered as `[date] title` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFilings {
    /// One line per filing, newest first
    pub lines: Vec<String>,
    /// How many filings were asked for
    pub requested: usize,
}

impl RecentFilings {
    /// Number of filings collected.
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Warning text when fewer filings than requested were found.
    pub fn warning(&self) -> Option<String> {
        (self.lines.len() < self.requested).then(|| {
            format!(
                "[경고] 최근 공시가 {}건으로 {}건 미만입니다.",
                self.lines.len(),
                self.requested
            )
        })
    }

    /// Lines joined by newlines, preceded by the warning if any.
    pub fn to_text(&self) -> String {
        let body = self.lines.join("\n");
        match self.warning() {
            Some(warning) => format!("{warning}\n{body}"),
            None => body,
        }
    }
}

/// A key report picked for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyReport {
    /// Year the report was filed
    pub year: i32,
    /// Report title
    pub report_name: String,
    /// `[date] title` line
    pub text: String,
}

/// Pick disclosures for the given years.
///
/// Key reports come first in listing order, then any other disclosure of
/// those years, up to `max_count` in total.
pub fn filter_disclosures(list: &[Disclosure], years: &[i32], max_count: usize) -> Vec<Disclosure> {
    let years: HashSet<i32> = years.iter().copied().collect();
    let in_years = |d: &&Disclosure| d.year().is_some_and(|y| years.contains(&y));

    let mut picked: Vec<&Disclosure> = list
        .iter()
        .filter(in_years)
        .filter(|d| d.is_key_report())
        .take(max_count)
        .collect();

    if picked.len() < max_count {
        let rest: Vec<&Disclosure> = list
            .iter()
            .filter(in_years)
            .filter(|d| !d.is_key_report())
            .take(max_count - picked.len())
            .collect();
        picked.extend(rest);
    }

    picked.into_iter().cloned().collect()
}

/// At most one report of each key kind from a year's listing.
pub fn key_reports_for_year(year: i32, list: &[Disclosure], max_length: usize) -> Vec<KeyReport> {
    KEY_REPORT_KINDS
        .iter()
        .filter_map(|kind| list.iter().find(|d| d.report_nm.contains(kind)))
        .map(|d| KeyReport {
            year,
            report_name: d.report_nm.trim().to_string(),
            text: d.summary_line(max_length),
        })
        .collect()
}

/// Append unseen `(date, title)` filings until `count` lines are held.
fn push_unique(
    lines: &mut Vec<String>,
    seen: &mut HashSet<(String, String)>,
    list: &[Disclosure],
    count: usize,
    max_length: usize,
) {
    for disclosure in list {
        if lines.len() >= count {
            break;
        }
        let key = (disclosure.rcept_dt.clone(), disclosure.report_nm.clone());
        if seen.insert(key) {
            lines.push(disclosure.summary_line(max_length));
        }
    }
}

impl DartClient {
    /// Fetch the company overview.
    ///
    /// # Errors
    /// Returns `DataError::CorpNotFound` if DART has no data for the code.
    pub async fn company_info(&self, corp_code: &str) -> Result<CompanyInfo> {
        let envelope: CompanyEnvelope = self
            .get_json("company.json", &[("corp_code", corp_code.to_string())])
            .await?;
        let info = envelope
            .into_info()?
            .ok_or_else(|| DataError::CorpNotFound(corp_code.to_string()))?;
        debug!(corp_code, corp_name = %info.corp_name, "fetched company info");
        Ok(info)
    }

    /// Fetch one page of disclosures.
    ///
    /// DART's "no data" status yields an empty page.
    ///
    /// # Errors
    /// Returns an error for network failures and other non-success statuses.
    pub async fn disclosures(&self, corp_code: &str, query: &DisclosureQuery) -> Result<DisclosurePage> {
        let envelope: PageEnvelope = self.get_json("list.json", &query.params(corp_code)).await?;
        if !envelope.status.check()? {
            return Ok(DisclosurePage::default());
        }
        Ok(envelope.page)
    }

    /// Collect the `count` most recent filings since a date, of any kind.
    ///
    /// # Errors
    /// Returns an error if a page request fails.
    pub async fn recent_filings(
        &self,
        corp_code: &str,
        since: NaiveDate,
        count: usize,
        max_length: usize,
    ) -> Result<RecentFilings> {
        let mut lines = Vec::with_capacity(count);
        let mut seen = HashSet::new();
        let mut query = DisclosureQuery::new().since(since);

        loop {
            let page = self.disclosures(corp_code, &query).await?;
            push_unique(&mut lines, &mut seen, &page.list, count, max_length);
            if lines.len() >= count || !page.has_next() {
                break;
            }
            query = query.page(page.page_no + 1);
        }

        let filings = RecentFilings {
            lines,
            requested: count,
        };
        if let Some(warning) = filings.warning() {
            warn!(corp_code, "{warning}");
        }
        Ok(filings)
    }

    /// One business report, audit report and financial statement per year.
    ///
    /// # Errors
    /// Returns an error if a listing request fails.
    pub async fn yearly_key_reports(
        &self,
        corp_code: &str,
        years: &[i32],
        max_length: usize,
    ) -> Result<Vec<KeyReport>> {
        let mut reports = Vec::new();
        for &year in years {
            let page = self
                .disclosures(corp_code, &DisclosureQuery::new().year(year))
                .await?;
            let found = key_reports_for_year(year, &page.list, max_length);
            debug!(corp_code, year, found = found.len(), "key reports");
            reports.extend(found);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disclosure(date: &str, title: &str) -> Disclosure {
        Disclosure {
            rcept_dt: date.to_string(),
            report_nm: title.to_string(),
            ..Default::default()
        }
    }

    fn listing() -> Vec<Disclosure> {
        vec![
            disclosure("20240315", "사업보고서 (2023.12)"),
            disclosure("20240301", "임원ㆍ주요주주특정증권등소유상황보고서"),
            disclosure("20240220", "감사보고서제출"),
            disclosure("20230314", "사업보고서 (2022.12)"),
            disclosure("20230101", "주요사항보고서"),
            disclosure("20220314", "연결재무제표기준영업(잠정)실적"),
        ]
    }

    #[test]
    fn test_filter_key_reports_first() {
        let picked = filter_disclosures(&listing(), &[2024, 2023], 20);
        let titles: Vec<_> = picked.iter().map(|d| d.report_nm.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "사업보고서 (2023.12)",
                "감사보고서제출",
                "사업보고서 (2022.12)",
                "임원ㆍ주요주주특정증권등소유상황보고서",
                "주요사항보고서",
            ]
        );
    }

    #[test]
    fn test_filter_caps_count() {
        assert_eq!(filter_disclosures(&listing(), &[2024, 2023, 2022], 2).len(), 2);
        assert!(filter_disclosures(&listing(), &[2010], 5).is_empty());
    }

    #[test]
    fn test_key_reports_one_per_kind() {
        let list = vec![
            disclosure("20240315", "사업보고서 (2023.12)"),
            disclosure("20240310", "[기재정정]사업보고서 (2023.12)"),
            disclosure("20240220", "감사보고서제출"),
        ];
        let reports = key_reports_for_year(2024, &list, 1000);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].text, "[20240315] 사업보고서 (2023.12)");
        assert_eq!(reports[1].report_name, "감사보고서제출");
    }

    #[test]
    fn test_push_unique_dedupes_and_caps() {
        let mut lines = Vec::new();
        let mut seen = HashSet::new();
        let list = vec![
            disclosure("20240315", "사업보고서"),
            disclosure("20240315", "사업보고서"),
            disclosure("20240301", "주요사항보고서"),
            disclosure("20240201", "기타"),
        ];
        push_unique(&mut lines, &mut seen, &list, 2, 600);
        assert_eq!(lines, vec!["[20240315] 사업보고서", "[20240301] 주요사항보고서"]);
    }

    #[test]
    fn test_recent_filings_warning() {
        let filings = RecentFilings {
            lines: vec!["[20240101] a".to_string()],
            requested: 40,
        };
        assert_eq!(
            filings.warning().as_deref(),
            Some("[경고] 최근 공시가 1건으로 40건 미만입니다.")
        );
        assert!(filings.to_text().ends_with("[20240101] a"));
    }

    #[test]
    fn test_summary_line_truncates() {
        let d = disclosure("20240101", "아주 긴 보고서 제목");
        assert_eq!(d.summary_line(12), "[20240101] 아");
    }

    #[test]
    fn test_query_params() {
        let query = DisclosureQuery::new().year(2023).page(2);
        let params = query.params("00126380");
        assert!(params.contains(&("bgn_de", "20230101".to_string())));
        assert!(params.contains(&("end_de", "20231231".to_string())));
        assert!(params.contains(&("page_no", "2".to_string())));
    }

    #[test]
    fn test_parse_company_info() {
        let body = r#"{"status":"000","message":"정상","corp_code":"00126380",
            "corp_name":"삼성전자(주)","corp_name_eng":"SAMSUNG ELECTRONICS CO,.LTD",
            "stock_name":"삼성전자","stock_code":"005930","ceo_nm":"한종희","corp_cls":"Y",
            "jurir_no":"1301110006246","induty_code":"264","est_dt":"19690113","acc_mt":"12"}"#;
        let info = parse_company_info(body).unwrap().unwrap();
        assert_eq!(info.stock_name, "삼성전자");
        assert_eq!(info.induty_code, "264");
        assert_eq!(info.market(), "KOSPI");
        assert_eq!(info.hm_url, "");
    }

    #[test]
    fn test_parse_company_info_statuses() {
        let no_data = r#"{"status":"013","message":"조회된 데이타가 없습니다."}"#;
        assert_eq!(parse_company_info(no_data).unwrap(), None);

        let bad_key = r#"{"status":"010","message":"등록되지 않은 키입니다."}"#;
        assert!(matches!(
            parse_company_info(bad_key),
            Err(DataError::DartApi { status, .. }) if status == "010"
        ));
    }

    #[test]
    fn test_page_envelope() {
        let body = r#"{"status":"000","message":"정상","page_no":1,"page_count":100,
            "total_count":2,"total_page":1,"list":[
            {"corp_code":"00126380","corp_name":"삼성전자","stock_code":"005930","corp_cls":"Y",
             "report_nm":"사업보고서 (2023.12)","rcept_no":"20240312000736","flr_nm":"삼성전자",
             "rcept_dt":"20240312","rm":"연"}]}"#;
        let envelope: PageEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.status.check().unwrap());
        assert_eq!(envelope.page.list[0].year(), Some(2024));
        assert!(!envelope.page.has_next());
    }
}

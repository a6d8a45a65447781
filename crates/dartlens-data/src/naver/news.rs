//! Naver news search.

use crate::error::{DataError, Result};
use crate::text::{clean_news_text, truncate_chars};
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Naver Open API base URL
pub const NAVER_BASE_URL: &str = "https://openapi.naver.com/v1/search";

/// Largest page the news endpoint serves
const MAX_DISPLAY: u32 = 100;

/// Highest `start` offset the news endpoint accepts
const MAX_START: u32 = 1000;

/// Days the search window grows by on each retry
pub const WINDOW_STEP_DAYS: i64 = 180;

/// Credentials and endpoint for [`NaverNewsClient`].
#[derive(Clone)]
pub struct NaverConfig {
    /// `X-Naver-Client-Id`
    pub client_id: String,
    /// `X-Naver-Client-Secret`
    pub client_secret: String,
    /// Base URL, overridable for testing
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl NaverConfig {
    /// Settings for the public API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: NAVER_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for NaverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverConfig")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Title with markup
    pub title: String,
    /// Publisher URL
    #[serde(rename = "originallink", default)]
    pub original_link: String,
    /// Naver URL
    #[serde(default)]
    pub link: String,
    /// Snippet with markup
    #[serde(default)]
    pub description: String,
    /// RFC 2822 publication time
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

impl NewsItem {
    /// Parsed publication time.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(self.pub_date.trim()).ok()
    }

    /// Cleaned `title description`, truncated to `max_length` characters.
    pub fn text(&self, max_length: usize) -> String {
        let raw = format!("{} {}", self.title, self.description);
        truncate_chars(&clean_news_text(&raw), max_length)
    }

    /// Whether the item was published on or after `since`. Items without a
    /// parsable date are kept.
    pub fn is_since(&self, since: NaiveDate) -> bool {
        self.published()
            .is_none_or(|published| published.date_naive() >= since)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<NewsItem>,
}

/// News gathered for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCollection {
    /// Cleaned article texts, newest first
    pub texts: Vec<String>,
    /// Earliest date searched
    pub window_start: Option<NaiveDate>,
    /// How many articles were asked for
    pub requested: usize,
}

impl NewsCollection {
    /// Number of articles gathered.
    pub fn count(&self) -> usize {
        self.texts.len()
    }

    /// Warning text when fewer articles than requested were found.
    pub fn warning(&self) -> Option<String> {
        (self.texts.len() < self.requested).then(|| {
            format!(
                "[경고] 최근 뉴스가 {}건으로 {}건 미만입니다.",
                self.texts.len(),
                self.requested
            )
        })
    }
}

/// Pick up to `target` items published on or after `since`.
pub fn select_since(items: &[NewsItem], since: NaiveDate, target: usize) -> Vec<&NewsItem> {
    items
        .iter()
        .filter(|item| item.is_since(since))
        .take(target)
        .collect()
}

/// Naver news search client.
#[derive(Clone)]
pub struct NaverNewsClient {
    client: reqwest::Client,
    config: NaverConfig,
}

impl NaverNewsClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `DataError::MissingCredential` if either credential is blank.
    pub fn new(config: NaverConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(DataError::MissingCredential("NAVER_CLIENT_ID"));
        }
        if config.client_secret.trim().is_empty() {
            return Err(DataError::MissingCredential("NAVER_CLIENT_SECRET"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client, config })
    }

    /// Search news sorted newest first.
    ///
    /// # Arguments
    /// * `query` - Search terms, usually the company name
    /// * `display` - Page size (clamped to 1..=100)
    /// * `start` - 1-based offset (clamped to 1..=1000)
    ///
    /// # Errors
    /// Returns `DataError::NaverApi` for non-success HTTP statuses.
    pub async fn search(&self, query: &str, display: u32, start: u32) -> Result<Vec<NewsItem>> {
        let url = format!("{}/news.json", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.config.client_id)
            .header("X-Naver-Client-Secret", &self.config.client_secret)
            .query(&[
                ("query", query.to_string()),
                ("sort", "date".to_string()),
                ("display", display.clamp(1, MAX_DISPLAY).to_string()),
                ("start", start.clamp(1, MAX_START).to_string()),
            ])
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::NaverApi(format!(
                "news search returned HTTP {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        debug!(query, start, items = body.items.len(), "news page");
        Ok(body.items)
    }

    /// Gather up to `target` recent articles.
    ///
    /// Starts with articles published since `since`; while fewer than
    /// `target` are found the window is widened by 180 days, up to
    /// `max_attempts` windows in total.
    ///
    /// # Errors
    /// Returns an error if a search request fails.
    pub async fn collect_recent(
        &self,
        query: &str,
        since: NaiveDate,
        target: usize,
        max_attempts: u32,
        max_length: usize,
    ) -> Result<NewsCollection> {
        let mut fetched: Vec<NewsItem> = Vec::new();
        let mut exhausted = false;
        let mut start = 1;
        let mut window = since;

        for attempt in 0..max_attempts.max(1) {
            window = since - ChronoDuration::days(WINDOW_STEP_DAYS * i64::from(attempt));

            while !exhausted
                && select_since(&fetched, window, target).len() < target
                && fetched.last().is_none_or(|item| item.is_since(window))
            {
                let page = self.search(query, MAX_DISPLAY, start).await?;
                exhausted = page.len() < MAX_DISPLAY as usize;
                fetched.extend(page);
                start += MAX_DISPLAY;
                if start > MAX_START {
                    exhausted = true;
                }
            }

            if select_since(&fetched, window, target).len() >= target {
                break;
            }
        }

        let collection = NewsCollection {
            texts: select_since(&fetched, window, target)
                .into_iter()
                .map(|item| item.text(max_length))
                .filter(|text| !text.is_empty())
                .collect(),
            window_start: Some(window),
            requested: target,
        };
        if let Some(warning) = collection.warning() {
            warn!(query, "{warning}");
        }
        Ok(collection)
    }
}

impl std::fmt::Debug for NaverNewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverNewsClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, pub_date: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            original_link: String::new(),
            link: String::new(),
            description: "설명 &quot;인용&quot;".to_string(),
            pub_date: pub_date.to_string(),
        }
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"lastBuildDate":"Mon, 21 Oct 2024 10:00:00 +0900","total":2,"start":1,"display":2,
            "items":[{"title":"<b>삼성전자</b> 실적","originallink":"https://a","link":"https://b",
            "description":"3분기 &quot;어닝쇼크&quot;","pubDate":"Mon, 21 Oct 2024 09:30:00 +0900"}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].text(600), "삼성전자 실적 3분기 \"어닝쇼크\"");
        assert_eq!(
            response.items[0].published().unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 10, 21).unwrap()
        );
    }

    #[test]
    fn test_select_since() {
        let items = vec![
            item("a", "Mon, 21 Oct 2024 09:30:00 +0900"),
            item("b", "not a date"),
            item("c", "Fri, 01 Mar 2024 09:30:00 +0900"),
        ];
        let since = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let picked = select_since(&items, since, 10);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[1].title, "b");
        assert_eq!(select_since(&items, since, 1).len(), 1);
    }

    #[test]
    fn test_text_truncates() {
        assert_eq!(item("제목", "").text(4), "제목 설");
    }

    #[test]
    fn test_missing_credentials() {
        let result = NaverNewsClient::new(NaverConfig::new("id", ""));
        assert!(matches!(
            result,
            Err(DataError::MissingCredential("NAVER_CLIENT_SECRET"))
        ));
    }

    #[test]
    fn test_collection_warning() {
        let collection = NewsCollection {
            texts: vec!["a".to_string(); 3],
            window_start: None,
            requested: 40,
        };
        assert_eq!(
            collection.warning().as_deref(),
            Some("[경고] 최근 뉴스가 3건으로 40건 미만입니다.")
        );
    }
}

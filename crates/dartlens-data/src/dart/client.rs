//! DART Open API client with rate limiting.

use crate::error::{DataError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// DART Open API base URL
pub const DART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Default spacing between requests (10 req/sec)
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("dartlens/", env!("CARGO_PKG_VERSION"));

/// Status code for a successful response
pub const STATUS_OK: &str = "000";

/// Status code for "no data found"
pub const STATUS_NO_DATA: &str = "013";

/// Connection settings for [`DartClient`].
#[derive(Clone)]
pub struct DartConfig {
    /// API key (`crtfc_key`)
    pub api_key: String,
    /// Base URL, overridable for testing
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between requests
    pub min_interval: Duration,
}

impl DartConfig {
    /// Settings for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DART_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    /// Override the minimum spacing between requests.
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for DartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

/// Status envelope shared by every DART JSON response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusEnvelope {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) message: String,
}

impl StatusEnvelope {
    /// `Ok(true)` for data, `Ok(false)` for "no data", error otherwise.
    pub(crate) fn check(&self) -> Result<bool> {
        match self.status.as_str() {
            STATUS_OK => Ok(true),
            STATUS_NO_DATA => Ok(false),
            _ => Err(DataError::DartApi {
                status: self.status.clone(),
                message: self.message.clone(),
            }),
        }
    }
}

struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Rate-limited client for the DART Open API.
///
/// Cloning is cheap and clones share the same rate limiter.
#[derive(Clone)]
pub struct DartClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    config: DartConfig,
}

impl DartClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `DataError::MissingCredential` if the API key is blank.
    ///
    /// # Example
    /// ```no_run
    /// use dartlens_data::dart::{DartClient, DartConfig};
    ///
    /// # async fn example() -> dartlens_data::Result<()> {
    /// let client = DartClient::new(DartConfig::new("my-dart-key"))?;
    /// let registry = client.fetch_corp_codes().await?;
    /// println!("{} companies", registry.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: DartConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DataError::MissingCredential("DART_API_KEY"));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_interval))),
            config,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn send(&self, endpoint: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!(%endpoint, "DART request");

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "DART {} returned HTTP {}",
                endpoint,
                response.status()
            )));
        }

        Ok(response)
    }

    /// GET a JSON endpoint.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let body = self.send(endpoint, params).await?.text().await?;
        serde_json::from_str(&body).map_err(DataError::Serialization)
    }

    /// GET a binary endpoint.
    pub(crate) async fn get_bytes(&self, endpoint: &str) -> Result<Vec<u8>> {
        let bytes = self.send(endpoint, &[]).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl std::fmt::Debug for DartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

//! Credentials and service settings from the environment.

use dartlens_data::dart::DartConfig;
use dartlens_data::error::DataError;
use dartlens_data::naver::NaverConfig;
use dartlens_risk::LlmConfig;
use std::env;

pub(crate) const DART_API_KEY: &str = "DART_API_KEY";
pub(crate) const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub(crate) const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub(crate) const NAVER_CLIENT_ID: &str = "NAVER_CLIENT_ID";
pub(crate) const NAVER_CLIENT_SECRET: &str = "NAVER_CLIENT_SECRET";

/// Settings read once at startup.
#[derive(Default)]
pub(crate) struct AppConfig {
    dart_api_key: Option<String>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    naver_client_id: Option<String>,
    naver_client_secret: Option<String>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub(crate) fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            dart_api_key: get(DART_API_KEY),
            openai_api_key: get(OPENAI_API_KEY),
            openai_model: get(OPENAI_MODEL),
            naver_client_id: get(NAVER_CLIENT_ID),
            naver_client_secret: get(NAVER_CLIENT_SECRET),
        }
    }

    /// DART settings; the key is required for every command that fetches.
    pub(crate) fn dart(&self) -> Result<DartConfig, DataError> {
        self.dart_api_key
            .as_deref()
            .map(DartConfig::new)
            .ok_or(DataError::MissingCredential(DART_API_KEY))
    }

    /// LLM settings, if a key is configured.
    pub(crate) fn llm(&self) -> Option<LlmConfig> {
        let config = LlmConfig::new(self.openai_api_key.as_deref()?);
        Some(match &self.openai_model {
            Some(model) => config.with_model(model),
            None => config,
        })
    }

    /// Naver search settings, if both credentials are configured.
    pub(crate) fn naver(&self) -> Option<NaverConfig> {
        Some(NaverConfig::new(
            self.naver_client_id.as_deref()?,
            self.naver_client_secret.as_deref()?,
        ))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("dart", &self.dart_api_key.is_some())
            .field("openai", &self.openai_api_key.is_some())
            .field("openai_model", &self.openai_model)
            .field("naver", &self.naver().is_some())
            .finish()
    }
}

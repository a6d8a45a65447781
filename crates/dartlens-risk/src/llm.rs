//! Text generation backends.
//!
//! Everything in this crate talks to a language model through the
//! [`TextGenerator`] trait. [`ChatClient`] implements it against an
//! OpenAI-compatible chat completions endpoint; tests substitute scripted
//! generators.

use crate::error::{Result, RiskError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default completion endpoint root
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default completion length cap
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Characters of an error body kept in [`RiskError::Api`]
const ERROR_BODY_CHARS: usize = 200;

/// A source of completions for single-turn prompts.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt` at the given sampling temperature.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// Ask `generator` and collapse failures and blank answers to `None`.
///
/// Failures are logged; callers substitute placeholder text.
pub async fn ask(generator: &dyn TextGenerator, prompt: &str, temperature: f32) -> Option<String> {
    match generator.complete(prompt, temperature).await {
        Ok(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Err(e) => {
            warn!(error = %e, "LLM call failed");
            None
        }
    }
}

/// Settings for [`ChatClient`].
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer token
    pub api_key: String,
    /// Model name
    pub model: String,
    /// API root, overridable for compatible gateways
    pub base_url: String,
    /// Completion length cap
    pub max_tokens: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl LlmConfig {
    /// Default settings with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `RiskError::MissingApiKey` for a blank key.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RiskError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RiskError::Api {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(RiskError::EmptyResponse)?;
        debug!(chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<String>);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(RiskError::Generator("scripted failure".to_string())),
            }
        }
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: [ChatMessage {
                role: "user",
                content: "요약해줘",
            }],
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "요약해줘");
        assert_eq!(value["max_tokens"], 1024);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"답변"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("답변"));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            ChatClient::new(LlmConfig::new("  ")),
            Err(RiskError::MissingApiKey)
        ));
    }

    #[test]
    fn test_config_debug_hides_key() {
        let rendered = format!("{:?}", LlmConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_ask_collapses_failures() {
        assert_eq!(
            ask(&Fixed(Ok("  답변 \n".to_string())), "q", 0.7).await,
            Some("답변".to_string())
        );
        assert_eq!(ask(&Fixed(Ok("   ".to_string())), "q", 0.7).await, None);
        assert_eq!(ask(&Fixed(Err(RiskError::EmptyResponse)), "q", 0.7).await, None);
    }
}

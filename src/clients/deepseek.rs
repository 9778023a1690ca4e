use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, DeepSeekError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// DeepSeek model selection. Anything unrecognised is sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeepSeekModel {
    #[default]
    Chat,
    Reasoner,
    Override(String),
}

impl DeepSeekModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Chat => "deepseek-chat",
            Self::Reasoner => "deepseek-reasoner",
            Self::Override(s) => s.as_str(),
        }
    }

    /// Accepts short names (`chat`, `reasoner`) or full model ids.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" | "deepseek-chat" => Self::Chat,
            "reasoner" | "r1" | "deepseek-reasoner" => Self::Reasoner,
            _ => Self::Override(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeepSeekRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekResponseMessage,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Configuration for DeepSeek client
#[derive(Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: DeepSeekModel,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl KeyFromEnv for DeepSeekConfig {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl std::fmt::Debug for DeepSeekConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: Self::find_key().unwrap_or_default(),
            model: DeepSeekModel::default(),
            base_url: DEEPSEEK_BASE_URL.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl DeepSeekConfig {
    #[must_use]
    pub fn with_model(mut self, model: DeepSeekModel) -> Self {
        self.model = model;
        self
    }
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl DeepSeekClient {
    /// Fails with `Authentication` when the config carries no API key.
    pub fn new(config: DeepSeekConfig) -> Result<Self, AIError> {
        if config.api_key.trim().is_empty() {
            error!("DEEPSEEK_API_KEY is not set");
            return Err(AIError::DeepSeek(DeepSeekError::Authentication));
        }
        info!(model = %config.model.id(), "Creating new DeepSeek client");
        Ok(Self { config, client: Client::new() })
    }
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = DeepSeekRequest {
            model: self.config.model.id().to_string(),
            messages: vec![DeepSeekMessage { role: "user".to_string(), content: prompt }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: ResponseFormat { format_type: "json_object".to_string() },
        };

        debug!("Sending request to DeepSeek API");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                AIError::DeepSeek(DeepSeekError::Http(e.to_string()))
            })?;

        let response = super::check_status("deepseek", response)
            .await
            .map_err(|failure| AIError::DeepSeek(failure.into()))?;

        let deepseek_response: DeepSeekResponse = response
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to parse DeepSeek response JSON");
                AIError::DeepSeek(DeepSeekError::Http(e.to_string()))
            })?;

        let text = deepseek_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        info!(response_len = text.len(), "Received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("DeepSeek ({})", self.config.model.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names() {
        assert_eq!(DeepSeekModel::parse("Reasoner"), DeepSeekModel::Reasoner);
        assert_eq!(DeepSeekModel::parse("deepseek-chat").id(), "deepseek-chat");
        assert_eq!(DeepSeekModel::parse(" v4-preview ").id(), "v4-preview");
    }

    #[test]
    fn debug_hides_api_key() {
        let config = DeepSeekConfig { api_key: "sk-secret".to_string(), ..DeepSeekConfig::default() };
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}

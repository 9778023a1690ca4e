pub mod config;
pub mod models;

pub use config::*;
pub use models::*;

use crate::core::LowLevelClient;
use crate::error::{AIError, ClaudeError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic messages API client.
#[derive(Clone, Debug)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl ClaudeClient {
    /// Fails with `Authentication` when the config carries no API key.
    pub fn new(config: ClaudeConfig) -> Result<Self, AIError> {
        if !config.has_credential() {
            error!("ANTHROPIC_API_KEY is not set");
            return Err(AIError::Claude(ClaudeError::Authentication));
        }
        info!(model = %config.model.id(), "Creating new Claude client");
        Ok(Self { config, client: Client::new() })
    }
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = ClaudeRequest {
            model: self.config.model.id().to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![ClaudeMessage { role: "user".to_string(), content: prompt }],
        };

        debug!("Sending request to Anthropic API");
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                AIError::Claude(ClaudeError::Http(e.to_string()))
            })?;

        let response = super::check_status("anthropic", response)
            .await
            .map_err(|failure| AIError::Claude(failure.into()))?;

        let claude_response: ClaudeResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Anthropic response JSON");
            AIError::Claude(ClaudeError::Http(e.to_string()))
        })?;

        let text: String = claude_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();

        info!(response_len = text.len(), "Received Anthropic response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("Claude ({})", self.config.model.id())
    }
}

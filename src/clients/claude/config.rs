use crate::config::KeyFromEnv;

use super::models::ClaudeModel;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

#[allow(clippy::module_name_repetitions)]
#[derive(Clone)]
pub struct ClaudeConfig {
    pub model: ClaudeModel,
    pub api_key: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl KeyFromEnv for ClaudeConfig {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            model: ClaudeModel::default(),
            api_key: Self::find_key().unwrap_or_default(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl ClaudeConfig {
    #[must_use]
    pub fn anthropic(api_key: String, model: ClaudeModel) -> Self {
        Self {
            model,
            api_key,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        self.model = model;
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

use crate::clients::claude::{ClaudeClient, ClaudeConfig, ClaudeModel};
use crate::clients::deepseek::{DeepSeekClient, DeepSeekConfig, DeepSeekModel};
use crate::clients::mock::{MockClient, MockHandle, MockResponse};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::AIError;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Which analysis provider to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Claude,
    DeepSeek,
    Mock,
}

impl ClientType {
    /// Provider whose API key is available, Claude first. The offline mock is
    /// never picked here; it has to be asked for by name.
    pub fn detect() -> Option<Self> {
        if ClaudeConfig::has_key() {
            Some(Self::Claude)
        } else if DeepSeekConfig::has_key() {
            Some(Self::DeepSeek)
        } else {
            None
        }
    }
}

impl FromStr for ClientType {
    type Err = String;

    /// Parse client type from string (case insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "deepseek" => Ok(Self::DeepSeek),
            "mock" | "offline" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: claude, deepseek, mock", s)),
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientType::Claude => write!(f, "Claude"),
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Flexible client that wraps any LowLevelClient and provides factory functions
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<Mutex<Box<dyn LowLevelClient>>>,
}

impl FlexibleClient {
    /// Create a new FlexibleClient wrapping the given client
    pub fn new(client: Box<dyn LowLevelClient>) -> Self {
        Self { inner: Arc::new(Mutex::new(client)) }
    }

    /// Build the provider named by `client_type`, optionally overriding its model.
    ///
    /// Fails with an authentication error when the provider's API key is missing.
    pub fn from_type(client_type: ClientType, model: Option<&str>) -> Result<Self, AIError> {
        info!(client = %client_type, model = ?model, "Creating analysis client");
        match client_type {
            ClientType::Claude => {
                let mut config = ClaudeConfig::default();
                if let Some(model) = model {
                    config = config.with_model(ClaudeModel::parse(model));
                }
                Ok(Self::new(Box::new(ClaudeClient::new(config)?)))
            }
            ClientType::DeepSeek => {
                let mut config = DeepSeekConfig::default();
                if let Some(model) = model {
                    config = config.with_model(DeepSeekModel::parse(model));
                }
                Ok(Self::new(Box::new(DeepSeekClient::new(config)?)))
            }
            ClientType::Mock => Ok(Self::new(Box::new(MockClient::offline().0))),
        }
    }

    /// Like [`FlexibleClient::from_type`], but no selection at all is a missing
    /// credential rather than a silent fallback.
    pub fn from_selection(client_type: Option<ClientType>, model: Option<&str>) -> Result<Self, AIError> {
        match client_type {
            Some(client_type) => Self::from_type(client_type, model),
            None => {
                warn!("No analysis provider configured");
                Err(AIError::MissingCredential)
            }
        }
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::new();
        (Self::new(Box::new(mock_client)), handle)
    }

    /// Create a FlexibleClient mock with predefined responses
    pub fn new_mock_with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::with_responses(responses);
        (Self::new(Box::new(mock_client)), handle)
    }

    /// Swap the wrapped client; clones of this FlexibleClient see the change.
    pub fn replace(&self, client: Box<dyn LowLevelClient>) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = client;
    }

    fn current(&self) -> Box<dyn LowLevelClient> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone_box()
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        // Clone the client to avoid holding the mutex across await
        let client = self.current();
        client.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        self.current().describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_names() {
        assert_eq!("Claude".parse::<ClientType>().unwrap(), ClientType::Claude);
        assert_eq!("deepseek".parse::<ClientType>().unwrap(), ClientType::DeepSeek);
        assert_eq!("offline".parse::<ClientType>().unwrap(), ClientType::Mock);
        assert!("gpt".parse::<ClientType>().is_err());
    }

    #[test]
    fn no_selection_is_a_missing_credential() {
        let err = FlexibleClient::from_selection(None, None).unwrap_err();
        assert!(matches!(err, AIError::MissingCredential));
        assert!(err.is_authentication());
        assert!(FlexibleClient::from_selection(Some(ClientType::Mock), None).is_ok());
    }

    #[tokio::test]
    async fn replace_is_visible_through_clones() {
        let (client, first) = FlexibleClient::mock();
        let clone = client.clone();
        let (second_mock, second) = MockClient::new();
        second.push_success("from second");
        client.replace(Box::new(second_mock));

        assert_eq!(clone.ask_raw("hi".to_string()).await.unwrap(), "from second");
        assert_eq!(first.call_count(), 0);
        assert_eq!(second.prompts(), vec!["hi".to_string()]);
    }
}

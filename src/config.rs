use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::AnalysisClient;
use crate::clients::{ClientType, FlexibleClient};
use crate::error::AnalysisError;

/// Environment variable overriding the default data directory.
pub const DATA_DIR_ENV: &str = "STRENGTHS_DATA_DIR";

/// Storage key under which the result history is persisted.
pub const HISTORY_KEY: &str = "strengths_history";

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|key| !key.trim().is_empty())
    }

    /// True when a key can be found without prompting anyone
    fn has_key() -> bool {
        Self::find_key().is_some()
    }
}

/// Runtime configuration for the quiz application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the persisted history document
    pub data_dir: PathBuf,
    /// Key of the history document inside the data directory
    pub history_key: String,
    /// Which analysis provider to use; `None` when no API key was found
    pub client_type: Option<ClientType>,
    /// Provider model override
    pub model: Option<String>,
    /// Upper bound on a single analysis call
    pub analysis_timeout: Duration,
    /// How often the analyzing screen rotates its status message
    pub status_interval: Duration,
    /// Optional JSON file replacing the built-in question bank
    pub questions_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let _ = dotenvy::dotenv();
        let data_dir = env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".strengths"));

        Self {
            data_dir,
            history_key: HISTORY_KEY.to_string(),
            client_type: ClientType::detect(),
            model: None,
            analysis_timeout: Duration::from_secs(120),
            status_interval: Duration::from_millis(2000),
            questions_file: None,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    #[must_use]
    pub fn with_client_type(mut self, client_type: impl Into<Option<ClientType>>) -> Self {
        self.client_type = client_type.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    #[must_use]
    pub fn with_questions_file(mut self, path: Option<PathBuf>) -> Self {
        self.questions_file = path;
        self
    }

    /// Analysis client for the configured provider, expecting `expected_answers`
    /// answers per run. A missing key is a `Configuration` error.
    pub fn analysis_client(&self, expected_answers: usize) -> Result<AnalysisClient<FlexibleClient>, AnalysisError> {
        let client = FlexibleClient::from_selection(self.client_type, self.model.as_deref())?;
        Ok(AnalysisClient::new(client)
            .with_timeout(self.analysis_timeout)
            .with_expected_answers(expected_answers))
    }
}

use thiserror::Error;

use crate::app::View;
use crate::clients::HttpFailure;

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock client error: {0}")]
    Mock(String),
    #[error("No API key found; set ANTHROPIC_API_KEY or DEEPSEEK_API_KEY, or run with --client mock")]
    MissingCredential,
}

impl AIError {
    /// True when the provider rejected or never received a credential.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::Claude(ClaudeError::Authentication)
                | Self::DeepSeek(DeepSeekError::Authentication)
                | Self::MissingCredential
        )
    }
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

impl From<HttpFailure> for ClaudeError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::RateLimit => Self::RateLimit,
            HttpFailure::Authentication => Self::Authentication,
            HttpFailure::Api(message) => Self::Api(message),
        }
    }
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

impl From<HttpFailure> for DeepSeekError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::RateLimit => Self::RateLimit,
            HttpFailure::Authentication => Self::Authentication,
            HttpFailure::Api(message) => Self::Api(message),
        }
    }
}

/// Failures of a single strengths analysis.
///
/// The user only ever sees one generic message for all of these; the variants
/// exist so logs and tests can tell them apart.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No credential available for the analysis service: {0}")]
    Configuration(String),
    #[error("Analysis service error: {0}")]
    ExternalService(#[source] AIError),
    #[error("Analysis service did not answer within {0} seconds")]
    Timeout(u64),
    #[error("Analysis service returned an empty response")]
    EmptyResponse,
    #[error("Malformed analysis response: {reason}. Raw response: {raw}")]
    MalformedResponse { reason: String, raw: String },
    #[error("Expected {expected} answers, got {actual}")]
    IncompleteAnswers { expected: usize, actual: usize },
}

/// Coarse failure class of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    ExternalService,
    MalformedResponse,
    Precondition,
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::ExternalService(_) | Self::Timeout(_) | Self::EmptyResponse => FailureKind::ExternalService,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::IncompleteAnswers { .. } => FailureKind::Precondition,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedResponse { reason: reason.into(), raw: raw.to_string() }
    }
}

impl From<AIError> for AnalysisError {
    fn from(err: AIError) -> Self {
        if err.is_authentication() {
            Self::Configuration(err.to_string())
        } else {
            Self::ExternalService(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Question bank is invalid: {0}")]
    InvalidBank(String),
    #[error("Question cursor {cursor} is out of bounds for {len} questions")]
    CursorOutOfBounds { cursor: usize, len: usize },
    #[error("Failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot {action} while on the {from:?} screen")]
    InvalidTransition { from: View, action: &'static str },
    #[error("Analysis is unavailable: {0}")]
    AnalysisUnavailable(String),
    #[error("No history entry at index {0}")]
    NoSuchResult(usize),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub mod claude;
pub mod deepseek;
pub mod flexible;
pub mod mock;

pub use claude::{ClaudeClient, ClaudeConfig, ClaudeModel};
pub use deepseek::{DeepSeekClient, DeepSeekConfig, DeepSeekModel};
pub use flexible::{ClientType, FlexibleClient};
pub use mock::{MockClient, MockHandle, MockResponse};

use reqwest::{Response, StatusCode};
use tracing::{error, warn};

/// Non-success HTTP outcome of a provider call.
#[derive(Debug)]
pub enum HttpFailure {
    RateLimit,
    Authentication,
    Api(String),
}

/// Pass a successful response through; classify everything else.
pub(crate) async fn check_status(provider: &'static str, response: Response) -> Result<Response, HttpFailure> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(response),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!(provider, "Rate limit exceeded");
            Err(HttpFailure::RateLimit)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!(provider, %status, "Credential rejected");
            Err(HttpFailure::Authentication)
        }
        _ => {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(provider, %status, error = %body, "Provider returned an error");
            Err(HttpFailure::Api(format!("{status}: {body}")))
        }
    }
}

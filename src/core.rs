//! The seam between the quiz and whichever hosted model produces the report.

use crate::error::AIError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Prompt construction, JSON extraction and validation live in
/// [`crate::analysis::AnalysisClient`].
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;

    /// Provider/model label for logs and the landing screen
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

// Implement Clone for Box<dyn LowLevelClient>
impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }

    fn describe(&self) -> String {
        self.as_ref().describe()
    }
}

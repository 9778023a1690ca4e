use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::{core::LowLevelClient, error::AIError};

/// A canned reply for [`MockClient`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(String),
    /// Reply after sleeping for the given duration
    Delayed(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// Shared control surface of a [`MockClient`]: queue replies, inspect prompts.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: Mutex<Option<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(response);
    }

    pub fn push_success(&self, text: impl Into<String>) {
        self.push(MockResponse::success(text));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.push(MockResponse::error(message));
    }

    /// Reply used whenever the queue is empty.
    pub fn set_fallback(&self, response: MockResponse) {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(response);
    }

    /// Every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).push(prompt);
        let queued = self.responses.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        queued.or_else(|| self.fallback.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

/// Scriptable client for tests and offline runs.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let mut next = self.handle.next(prompt);
        loop {
            match next {
                Some(MockResponse::Success(text)) => return Ok(text),
                Some(MockResponse::Error(message)) => return Err(AIError::Mock(message)),
                Some(MockResponse::Delayed(delay, inner)) => {
                    debug!(delay_ms = delay.as_millis() as u64, "Mock client delaying reply");
                    tokio::time::sleep(delay).await;
                    next = Some(*inner);
                }
                None => return Err(AIError::Mock("no mock response queued".to_string())),
            }
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        "Mock".to_string()
    }
}

impl MockClient {
    /// A mock that always answers with a fixed, well-formed strengths report
    /// after a short pause. Used for offline runs of the binary.
    pub fn offline() -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.set_fallback(MockResponse::success(offline_report_json()).delayed(Duration::from_millis(1500)));
        (client, handle)
    }
}

fn offline_report_json() -> String {
    use crate::model::{AnalysisReport, Domain, DomainDistribution, StrengthItem};

    let item = |name: &str, domain: Domain| StrengthItem {
        name: name.to_string(),
        domain,
        description: format!("{name} shows up consistently in how you chose between the options."),
        advice: format!("Look for work where {name} is needed every day."),
    };
    let report = AnalysisReport {
        top_strengths: vec![
            item("Learner", Domain::StrategicThinking),
            item("Achiever", Domain::Executing),
            item("Empathy", Domain::RelationshipBuilding),
            item("Strategic", Domain::StrategicThinking),
            item("Communication", Domain::Influencing),
        ],
        domain_distribution: DomainDistribution::new(25.0, 15.0, 20.0, 40.0),
        summary: "Offline sample report: no analysis service was contacted.".to_string(),
    };
    serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
}

//! Durable, most-recent-first history of completed assessments.

use tracing::{info, instrument, warn};

use crate::error::StoreError;
use crate::model::AssessmentResult;
use crate::storage::Storage;

/// Prompt shown before history is wiped.
pub const CLEAR_PROMPT: &str = "確定要清除所有測驗記錄嗎？ (Clear all saved results?)";

/// A blocking yes/no question asked at the UI boundary.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// What [`ResultStore::clear`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Declined,
    AlreadyEmpty,
}

/// In-memory history mirrored to a single storage key.
///
/// Every mutation rewrites the whole persisted document before the in-memory
/// copy changes, so the two never diverge.
#[derive(Debug)]
pub struct ResultStore<S: Storage> {
    storage: S,
    key: String,
    history: Vec<AssessmentResult>,
}

impl<S: Storage> ResultStore<S> {
    /// Read the persisted history. Missing, unreadable or corrupt data yields
    /// an empty history; the problem is logged and otherwise ignored.
    #[instrument(target = "strengths_quiz::store", skip(storage, key), fields(key = %key.as_ref()))]
    pub async fn load(storage: S, key: impl AsRef<str>) -> Self {
        let key = key.as_ref().to_string();
        let history = match storage.read(&key).await {
            Ok(None) => Vec::new(),
            Ok(Some(text)) => match serde_json::from_str::<Vec<AssessmentResult>>(&text) {
                Ok(history) => history,
                Err(e) => {
                    warn!(error = %e, "Failed to parse history, starting empty");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read history, starting empty");
                Vec::new()
            }
        };
        info!(history_len = history.len(), "Loaded result history");
        Self { storage, key, history }
    }

    pub fn history(&self) -> &[AssessmentResult] {
        &self.history
    }

    pub fn get(&self, index: usize) -> Option<&AssessmentResult> {
        self.history.get(index)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Prepend `result` and persist. Not idempotent: saving twice stores two entries.
    #[instrument(target = "strengths_quiz::store", skip(self, result), fields(id = %result.id))]
    pub async fn save(&mut self, result: AssessmentResult) -> Result<(), StoreError> {
        let mut updated = Vec::with_capacity(self.history.len() + 1);
        updated.push(result);
        updated.extend(self.history.iter().cloned());

        let json = serde_json::to_string(&updated)?;
        self.storage.write(&self.key, &json).await?;
        self.history = updated;

        info!(history_len = self.history.len(), "Saved assessment result");
        Ok(())
    }

    /// Empty the history after confirmation. An empty history is left alone
    /// without asking.
    #[instrument(target = "strengths_quiz::store", skip(self, confirm))]
    pub async fn clear(&mut self, confirm: &dyn Confirm) -> Result<ClearOutcome, StoreError> {
        if self.history.is_empty() {
            return Ok(ClearOutcome::AlreadyEmpty);
        }
        if !confirm.confirm(CLEAR_PROMPT) {
            info!("History clear declined");
            return Ok(ClearOutcome::Declined);
        }

        self.storage.remove(&self.key).await?;
        let removed = self.history.len();
        self.history.clear();
        info!(removed, "Cleared result history");
        Ok(ClearOutcome::Cleared)
    }
}

//! Screen-level state machine driving one quiz session.
//!
//! ```text
//! Landing --start--> Quiz --answer--> Quiz ... --last answer--> Analyzing
//! Analyzing --success--> Result      Analyzing --failure/cancel--> Landing
//! Landing|Result --view_history--> History --select--> Result
//! Result|History --back--> Landing   History --clear--> History
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::analysis::AnalysisClient;
use crate::collector::{AnswerCollector, Progress};
use crate::core::LowLevelClient;
use crate::error::{AnalysisError, AppError, StoreError};
use crate::model::{AnalysisReport, Answer, AssessmentResult, Choice, Question};
use crate::questions::QuestionBank;
use crate::storage::Storage;
use crate::store::{ClearOutcome, Confirm, ResultStore};
use crate::ticker::{StatusTicker, DEFAULT_STATUS_MESSAGES};

/// Notice shown after any failed analysis.
pub const ANALYSIS_FAILED_NOTICE: &str = "分析過程中發生錯誤，請稍後再試。 (Something went wrong during the analysis, please try again later.)";
/// Notice shown after the user abandons a running analysis.
pub const ANALYSIS_CANCELLED_NOTICE: &str = "Analysis cancelled; your answers were discarded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Quiz,
    Analyzing,
    Result,
    History,
}

/// Exactly the data each screen is allowed to see.
#[derive(Debug)]
pub enum Screen<'a> {
    Landing { history_count: usize },
    Quiz { question: &'a Question, number: usize, total: usize, progress: f64 },
    Analyzing { status: String },
    Result { result: &'a AssessmentResult },
    History { history: &'a [AssessmentResult] },
}

/// Handle for one in-flight analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    answers: Vec<Answer>,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }
}

/// Result of [`App::answer`].
#[derive(Debug)]
pub enum AnswerStep {
    /// Moved on to the next question
    Next,
    /// Quiz complete; the app is now analyzing and the ticket must be resolved
    Analyze(AnalysisTicket),
}

/// How an analysis run ended.
#[derive(Debug)]
pub enum Resolution {
    /// Stored at history index 0 and shown on the result screen
    Completed(Uuid),
    /// The analysis failed; back on the landing screen
    AnalysisFailed(AnalysisError),
    /// The report arrived but could not be persisted; back on the landing screen
    SaveFailed(StoreError),
    /// The run had already been abandoned; nothing was written
    Stale,
}

pub struct App<S: Storage> {
    view: View,
    collector: AnswerCollector,
    store: ResultStore<S>,
    active: Option<AssessmentResult>,
    generation: u64,
    in_flight: Option<u64>,
    ticker: Option<StatusTicker>,
    status_messages: Vec<String>,
    status_interval: Duration,
    notice: Option<String>,
    unavailable: Option<String>,
}

impl<S: Storage> App<S> {
    pub fn new(bank: Arc<QuestionBank>, store: ResultStore<S>) -> Self {
        Self {
            view: View::Landing,
            collector: AnswerCollector::new(bank),
            store,
            active: None,
            generation: 0,
            in_flight: None,
            ticker: None,
            status_messages: DEFAULT_STATUS_MESSAGES.iter().map(|m| m.to_string()).collect(),
            status_interval: Duration::from_millis(2000),
            notice: None,
            unavailable: None,
        }
    }

    #[must_use]
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    #[must_use]
    pub fn with_status_messages(mut self, messages: Vec<String>) -> Self {
        self.status_messages = messages;
        self
    }

    /// Refuse to start quizzes, e.g. because no API key is configured.
    pub fn disable_analysis(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "Analysis disabled");
        self.unavailable = Some(reason);
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn history(&self) -> &[AssessmentResult] {
        self.store.history()
    }

    pub fn store(&self) -> &ResultStore<S> {
        &self.store
    }

    pub fn active_result(&self) -> Option<&AssessmentResult> {
        self.active.as_ref()
    }

    pub fn answers(&self) -> &[Answer] {
        self.collector.answers()
    }

    pub fn is_analysis_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Status updates for the analyzing screen, while it is active.
    pub fn status_updates(&self) -> Option<watch::Receiver<String>> {
        self.ticker.as_ref().map(StatusTicker::subscribe)
    }

    /// Pending user-facing message, cleared on read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn screen(&self) -> Screen<'_> {
        match self.view {
            View::Landing => Screen::Landing { history_count: self.store.len() },
            View::Quiz => match self.collector.current_question() {
                Some(question) => Screen::Quiz {
                    question,
                    number: self.collector.cursor() + 1,
                    total: self.collector.bank().len(),
                    progress: self.collector.progress(),
                },
                None => Screen::Landing { history_count: self.store.len() },
            },
            View::Analyzing => Screen::Analyzing {
                status: self.ticker.as_ref().map(StatusTicker::current).unwrap_or_default(),
            },
            View::Result => match &self.active {
                Some(result) => Screen::Result { result },
                None => Screen::Landing { history_count: self.store.len() },
            },
            View::History => Screen::History { history: self.store.history() },
        }
    }

    fn expect_view(&self, allowed: &[View], action: &'static str) -> Result<(), AppError> {
        if allowed.contains(&self.view) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition { from: self.view, action })
        }
    }

    /// Landing -> Quiz, starting from the first question with no answers.
    pub fn start(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Landing], "start a quiz")?;
        if let Some(reason) = &self.unavailable {
            return Err(AppError::AnalysisUnavailable(reason.clone()));
        }
        self.collector.reset();
        self.notice = None;
        self.view = View::Quiz;
        info!(questions = self.collector.bank().len(), "Quiz started");
        Ok(())
    }

    /// Record an answer for the current question. The last answer moves the
    /// app into Analyzing and hands back the ticket for the analysis run.
    pub fn answer(&mut self, choice: Choice) -> Result<AnswerStep, AppError> {
        self.expect_view(&[View::Quiz], "answer a question")?;
        match self.collector.record_answer(choice)? {
            Progress::Next { .. } => Ok(AnswerStep::Next),
            Progress::Complete(answers) => Ok(AnswerStep::Analyze(self.enter_analyzing(answers))),
        }
    }

    fn enter_analyzing(&mut self, answers: Vec<Answer>) -> AnalysisTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.ticker = Some(StatusTicker::start(self.status_messages.clone(), self.status_interval));
        self.view = View::Analyzing;
        info!(generation = self.generation, answers = answers.len(), "Quiz complete, analyzing");
        AnalysisTicket { generation: self.generation, answers }
    }

    fn leave_analyzing(&mut self, next: View) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.in_flight = None;
        self.view = next;
    }

    /// Apply the outcome of the run identified by `ticket`.
    ///
    /// Outcomes of abandoned or superseded runs are discarded as [`Resolution::Stale`].
    #[instrument(target = "strengths_quiz::app", skip(self, ticket, outcome), fields(generation = ticket.generation))]
    pub async fn resolve(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisReport, AnalysisError>,
    ) -> Resolution {
        if self.view != View::Analyzing || self.in_flight != Some(ticket.generation) {
            warn!(current = ?self.in_flight, "Discarding result of an abandoned analysis");
            return Resolution::Stale;
        }

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, kind = ?e.kind(), "Analysis failed");
                self.notice = Some(ANALYSIS_FAILED_NOTICE.to_string());
                self.leave_analyzing(View::Landing);
                return Resolution::AnalysisFailed(e);
            }
        };

        let result = AssessmentResult::from_report(report);
        let id = result.id;
        if let Err(e) = self.store.save(result.clone()).await {
            error!(error = %e, "Failed to persist assessment result");
            self.notice = Some(ANALYSIS_FAILED_NOTICE.to_string());
            self.leave_analyzing(View::Landing);
            return Resolution::SaveFailed(e);
        }

        self.active = Some(result);
        self.leave_analyzing(View::Result);
        info!(%id, "Assessment stored");
        Resolution::Completed(id)
    }

    /// Run the analysis for `ticket` and apply its outcome.
    pub async fn run_analysis<C: LowLevelClient>(
        &mut self,
        ticket: AnalysisTicket,
        client: &AnalysisClient<C>,
    ) -> Resolution {
        let outcome = client.analyze(ticket.answers()).await;
        self.resolve(ticket, outcome).await
    }

    /// Abandon the running analysis and return to Landing. A late outcome for
    /// the abandoned run will be treated as stale.
    pub fn cancel_analysis(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Analyzing], "cancel the analysis")?;
        info!(generation = ?self.in_flight, "Analysis cancelled");
        self.notice = Some(ANALYSIS_CANCELLED_NOTICE.to_string());
        self.leave_analyzing(View::Landing);
        Ok(())
    }

    /// Result -> Landing with a fresh answer sheet.
    pub fn restart(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Result], "restart")?;
        self.collector.reset();
        self.view = View::Landing;
        Ok(())
    }

    /// Result or History -> Landing.
    pub fn back(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Result, View::History], "go back")?;
        self.view = View::Landing;
        Ok(())
    }

    /// Landing or Result -> History.
    pub fn view_history(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Landing, View::Result], "view history")?;
        self.view = View::History;
        Ok(())
    }

    /// History -> Result, showing a stored result without re-running analysis.
    pub fn select_history(&mut self, index: usize) -> Result<&AssessmentResult, AppError> {
        self.expect_view(&[View::History], "select a result")?;
        let result = self.store.get(index).cloned().ok_or(AppError::NoSuchResult(index))?;
        self.view = View::Result;
        let active: &AssessmentResult = self.active.insert(result);
        Ok(active)
    }

    /// History -> History, wiping stored results after confirmation.
    pub async fn clear_history(&mut self, confirm: &dyn Confirm) -> Result<ClearOutcome, AppError> {
        self.expect_view(&[View::History], "clear history")?;
        Ok(self.store.clear(confirm).await?)
    }
}

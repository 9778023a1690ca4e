pub mod analysis;
pub mod app;
pub mod clients;
pub mod collector;
pub mod config;
pub mod core;
pub mod error;
pub mod json_utils;
pub mod model;
pub mod questions;
pub mod render;
pub mod storage;
pub mod store;
pub mod ticker;

// Convenient re-exports
pub use analysis::AnalysisClient;
pub use app::{App, Screen, View};
pub use model::{AnalysisReport, Answer, AssessmentResult, Choice, Domain, DomainDistribution, Question, StrengthItem};
pub use questions::QuestionBank;
pub use store::{ClearOutcome, Confirm, ResultStore};

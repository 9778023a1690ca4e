//! Turns a completed answer sheet into a strengths report via a hosted model.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::Duration;

use schemars::{schema_for, JsonSchema};
use tracing::{debug, error, info, instrument, warn};

use crate::core::LowLevelClient;
use crate::error::AnalysisError;
use crate::json_utils::{extract_first, ExtractError};
use crate::model::{AnalysisReport, Answer, Domain};

/// Number of strengths the model is asked for.
pub const EXPECTED_STRENGTHS: usize = 5;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Advisory findings about a structurally valid report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportWarnings {
    pub strength_count: Option<usize>,
    pub duplicate_names: Vec<String>,
    pub distribution_total: Option<f64>,
}

impl ReportWarnings {
    pub fn is_empty(&self) -> bool {
        self.strength_count.is_none() && self.duplicate_names.is_empty() && self.distribution_total.is_none()
    }
}

/// Reject reports that cannot be rendered; return soft findings for the rest.
///
/// Hard failures: no strengths, blank names, negative or non-finite weights.
/// Strength count, duplicate names and a distribution total other than 100
/// are only reported.
pub fn validate_report(report: &AnalysisReport, raw: &str) -> Result<ReportWarnings, AnalysisError> {
    if report.top_strengths.is_empty() {
        return Err(AnalysisError::malformed("topStrengths is empty", raw));
    }
    if let Some(item) = report.top_strengths.iter().find(|s| s.name.trim().is_empty()) {
        return Err(AnalysisError::malformed(
            format!("strength in domain {} has no name", item.domain),
            raw,
        ));
    }
    for (domain, weight) in report.domain_distribution.iter() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AnalysisError::malformed(
                format!("domain {} has invalid weight {}", domain.code(), weight),
                raw,
            ));
        }
    }

    let mut warnings = ReportWarnings::default();
    if report.top_strengths.len() != EXPECTED_STRENGTHS {
        warnings.strength_count = Some(report.top_strengths.len());
    }
    let mut seen = HashSet::new();
    for item in &report.top_strengths {
        if !seen.insert(item.name.trim()) {
            warnings.duplicate_names.push(item.name.clone());
        }
    }
    let total = report.domain_distribution.total();
    if (total - 100.0).abs() > 0.5 {
        warnings.distribution_total = Some(total);
    }
    Ok(warnings)
}

/// One line per answer, `Q{id}: {chosen text}`.
pub fn summarize_answers(answers: &[Answer]) -> String {
    answers
        .iter()
        .map(|a| format!("Q{}: {}", a.question_id, a.selected_text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The instruction handed to the model, without schema guidance.
pub fn build_prompt(answers: &[Answer]) -> String {
    let mut catalog = String::new();
    for (i, domain) in Domain::ALL.iter().enumerate() {
        let _ = writeln!(
            catalog,
            "{}. {} ({}): {}.",
            i + 1,
            domain.code(),
            domain.label(),
            domain.themes().join(", ")
        );
    }

    format!(
        "You are an expert psychometrician specializing in the CliftonStrengths (StrengthsFinder) methodology.\n\
         Based on the user's responses to a forced-choice assessment, analyze their personality and identify their top {n} likely strengths themes.\n\n\
         The 4 domains are:\n{catalog}\n\
         User Responses:\n{answers}\n\n\
         Task:\n\
         1. Identify the Top {n} distinct strengths for this user.\n\
         2. Calculate a percentage distribution (0-100) for each of the 4 domains based on the overall sentiment of answers.\n\
         3. Write a personalized summary.\n\
         4. Provide the output in Traditional Chinese (繁體中文).",
        n = EXPECTED_STRENGTHS,
        catalog = catalog,
        answers = summarize_answers(answers),
    )
}

/// Append the JSON schema of `T` to a prompt.
fn add_schema_guidance<T: JsonSchema>(prompt: String) -> String {
    let schema = schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n\n## Response Format\nRespond with a single JSON object matching this schema and nothing else. \
         Domain names must be used exactly as written in the schema:\n```json\n{}\n```",
        prompt, schema_json
    )
}

/// Analysis front-end over any [`LowLevelClient`].
#[derive(Debug, Clone)]
pub struct AnalysisClient<C: LowLevelClient> {
    client: C,
    timeout: Duration,
    expected_answers: Option<usize>,
}

impl<C: LowLevelClient> AnalysisClient<C> {
    pub fn new(client: C) -> Self {
        Self { client, timeout: DEFAULT_TIMEOUT, expected_answers: None }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Require exactly `count` answers before any call is made.
    #[must_use]
    pub fn with_expected_answers(mut self, count: usize) -> Self {
        self.expected_answers = Some(count);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one analysis. Exactly one outbound call; no local state is touched.
    #[instrument(target = "strengths_quiz::analysis", skip(self, answers), fields(answers = answers.len()))]
    pub async fn analyze(&self, answers: &[Answer]) -> Result<AnalysisReport, AnalysisError> {
        let expected = self.expected_answers.unwrap_or(answers.len()).max(1);
        if answers.len() != expected {
            return Err(AnalysisError::IncompleteAnswers { expected, actual: answers.len() });
        }

        let prompt = add_schema_guidance::<AnalysisReport>(build_prompt(answers));
        debug!(prompt_len = prompt.len(), "Sending analysis prompt");

        let raw = match tokio::time::timeout(self.timeout, self.client.ask_raw(prompt)).await {
            Ok(reply) => reply?,
            Err(_) => {
                error!(timeout_secs = self.timeout.as_secs(), "Analysis call timed out");
                return Err(AnalysisError::Timeout(self.timeout.as_secs()));
            }
        };

        if raw.trim().is_empty() {
            error!("Analysis service returned no payload");
            return Err(AnalysisError::EmptyResponse);
        }

        let report: AnalysisReport = extract_first(&raw).map_err(|e| {
            error!(error = %e, "Analysis response could not be parsed");
            match e {
                ExtractError::NoJson => AnalysisError::malformed("no JSON object in response", &raw),
                ExtractError::Invalid(err) => AnalysisError::malformed(err.to_string(), &raw),
            }
        })?;

        let warnings = validate_report(&report, &raw)?;
        if !warnings.is_empty() {
            warn!(
                strength_count = ?warnings.strength_count,
                duplicates = ?warnings.duplicate_names,
                distribution_total = ?warnings.distribution_total,
                "Analysis report deviates from the requested shape"
            );
        }

        info!(
            strengths = report.top_strengths.len(),
            dominant = %report.domain_distribution.dominant(),
            "Analysis completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, DomainDistribution, StrengthItem};

    fn report(names: &[&str], dist: DomainDistribution) -> AnalysisReport {
        AnalysisReport {
            top_strengths: names
                .iter()
                .map(|n| StrengthItem {
                    name: n.to_string(),
                    domain: Domain::Executing,
                    description: String::new(),
                    advice: String::new(),
                })
                .collect(),
            domain_distribution: dist,
            summary: "x".into(),
        }
    }

    #[test]
    fn prompt_lists_answers_and_catalog() {
        let answers = vec![
            Answer { question_id: 1, selected_option: Choice::A, selected_text: "alpha".into() },
            Answer { question_id: 2, selected_option: Choice::B, selected_text: "beta".into() },
        ];
        let prompt = build_prompt(&answers);
        assert!(prompt.contains("Q1: alpha\nQ2: beta"));
        assert!(prompt.contains("STRATEGIC_THINKING (戰略思維)"));
        assert!(prompt.contains("Self-Assurance"));
    }

    #[test]
    fn schema_guidance_names_report_fields() {
        let prompt = add_schema_guidance::<AnalysisReport>("base".into());
        assert!(prompt.starts_with("base"));
        assert!(prompt.contains("topStrengths"));
        assert!(prompt.contains("domainDistribution"));
        assert!(prompt.contains("執行力"));
    }

    #[test]
    fn soft_deviations_are_warnings() {
        let r = report(&["A", "A", "B"], DomainDistribution::new(10.0, 10.0, 10.0, 10.0));
        let w = validate_report(&r, "").unwrap();
        assert_eq!(w.strength_count, Some(3));
        assert_eq!(w.duplicate_names, vec!["A".to_string()]);
        assert_eq!(w.distribution_total, Some(40.0));
    }

    #[test]
    fn hard_violations_are_errors() {
        let empty = report(&[], DomainDistribution::new(25.0, 25.0, 25.0, 25.0));
        assert!(validate_report(&empty, "").is_err());
        let negative = report(&["A"], DomainDistribution::new(-1.0, 25.0, 25.0, 51.0));
        assert!(validate_report(&negative, "").is_err());
        let blank = report(&["  "], DomainDistribution::new(25.0, 25.0, 25.0, 25.0));
        assert!(validate_report(&blank, "").is_err());
    }

    #[test]
    fn conforming_report_has_no_warnings() {
        let r = report(&["A", "B", "C", "D", "E"], DomainDistribution::new(40.0, 30.0, 20.0, 10.0));
        assert!(validate_report(&r, "").unwrap().is_empty());
    }
}

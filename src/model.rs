//! Domain model shared by the quiz, the analysis client and the result store.
//!
//! JSON field names are camelCase so persisted history stays readable by older
//! builds of the application.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single forced-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub option_a: String,
    pub option_b: String,
}

impl Question {
    pub fn new(id: u32, option_a: impl Into<String>, option_b: impl Into<String>) -> Self {
        Self { id, option_a: option_a.into(), option_b: option_b.into() }
    }

    /// Text of the given option.
    pub fn option_text(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.option_a,
            Choice::B => &self.option_b,
        }
    }
}

/// Which side of a question the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::A => write!(f, "A"),
            Choice::B => write!(f, "B"),
        }
    }
}

/// One recorded answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: u32,
    pub selected_option: Choice,
    /// Copy of the chosen option's text
    pub selected_text: String,
}

/// The four fixed strengths domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "One of the four strengths domains")]
pub enum Domain {
    #[serde(rename = "執行力", alias = "EXECUTING", alias = "Executing")]
    Executing,
    #[serde(rename = "影響力", alias = "INFLUENCING", alias = "Influencing")]
    Influencing,
    #[serde(rename = "建立關係", alias = "RELATIONSHIP_BUILDING", alias = "RelationshipBuilding")]
    RelationshipBuilding,
    #[serde(rename = "戰略思維", alias = "STRATEGIC_THINKING", alias = "StrategicThinking")]
    StrategicThinking,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Executing,
        Domain::Influencing,
        Domain::RelationshipBuilding,
        Domain::StrategicThinking,
    ];

    /// Label used on the wire, in storage and on screen.
    pub const fn label(self) -> &'static str {
        match self {
            Domain::Executing => "執行力",
            Domain::Influencing => "影響力",
            Domain::RelationshipBuilding => "建立關係",
            Domain::StrategicThinking => "戰略思維",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Domain::Executing => "EXECUTING",
            Domain::Influencing => "INFLUENCING",
            Domain::RelationshipBuilding => "RELATIONSHIP_BUILDING",
            Domain::StrategicThinking => "STRATEGIC_THINKING",
        }
    }

    /// Theme names belonging to this domain.
    pub const fn themes(self) -> &'static [&'static str] {
        match self {
            Domain::Executing => &[
                "Achiever", "Arranger", "Belief", "Consistency", "Deliberative",
                "Discipline", "Focus", "Responsibility", "Restorative",
            ],
            Domain::Influencing => &[
                "Activator", "Command", "Communication", "Competition",
                "Maximizer", "Self-Assurance", "Significance", "Woo",
            ],
            Domain::RelationshipBuilding => &[
                "Adaptability", "Connectedness", "Developer", "Empathy", "Harmony",
                "Includer", "Individualization", "Positivity", "Relator",
            ],
            Domain::StrategicThinking => &[
                "Analytical", "Context", "Futuristic", "Ideation",
                "Input", "Intellection", "Learner", "Strategic",
            ],
        }
    }

    /// Display colour as an RGB triple.
    pub const fn color(self) -> (u8, u8, u8) {
        match self {
            Domain::Executing => (0x8b, 0x5c, 0xf6),
            Domain::Influencing => (0xf5, 0x9e, 0x0b),
            Domain::RelationshipBuilding => (0x3b, 0x82, 0xf6),
            Domain::StrategicThinking => (0x10, 0xb9, 0x81),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named strength theme produced by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Strength Item", description = "One of the user's top strength themes")]
pub struct StrengthItem {
    #[schemars(description = "Name of the strength theme in Traditional Chinese (e.g., 成就, 戰略)")]
    pub name: String,
    pub domain: Domain,
    #[schemars(description = "A brief description of this strength for the user.")]
    pub description: String,
    #[schemars(description = "Actionable advice on how to use this strength.")]
    pub advice: String,
}

/// Weight per domain, intended range 0-100. Not guaranteed to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Percentage (0-100) for each of the four domains")]
pub struct DomainDistribution {
    #[serde(rename = "執行力", alias = "EXECUTING", alias = "Executing")]
    pub executing: f64,
    #[serde(rename = "影響力", alias = "INFLUENCING", alias = "Influencing")]
    pub influencing: f64,
    #[serde(rename = "建立關係", alias = "RELATIONSHIP_BUILDING", alias = "RelationshipBuilding")]
    pub relationship_building: f64,
    #[serde(rename = "戰略思維", alias = "STRATEGIC_THINKING", alias = "StrategicThinking")]
    pub strategic_thinking: f64,
}

impl DomainDistribution {
    pub fn new(executing: f64, influencing: f64, relationship_building: f64, strategic_thinking: f64) -> Self {
        Self { executing, influencing, relationship_building, strategic_thinking }
    }

    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Executing => self.executing,
            Domain::Influencing => self.influencing,
            Domain::RelationshipBuilding => self.relationship_building,
            Domain::StrategicThinking => self.strategic_thinking,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Domain, f64)> + '_ {
        Domain::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    /// Weights rescaled to sum to 100. All zeros stay zeros.
    pub fn percentages(&self) -> [(Domain, f64); 4] {
        let total = self.total();
        Domain::ALL.map(|d| {
            let w = self.get(d);
            (d, if total > 0.0 { w / total * 100.0 } else { 0.0 })
        })
    }

    /// Domain with the largest weight; ties go to the earlier domain.
    pub fn dominant(&self) -> Domain {
        let mut best = (Domain::Executing, self.executing);
        for (d, w) in self.iter().skip(1) {
            if w > best.1 {
                best = (d, w);
            }
        }
        best.0
    }
}

/// The three fields produced by the external analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Strengths Report", description = "Top strengths, domain distribution and summary for one assessment")]
pub struct AnalysisReport {
    #[schemars(description = "Exactly five distinct strength themes, strongest first")]
    pub top_strengths: Vec<StrengthItem>,
    pub domain_distribution: DomainDistribution,
    #[schemars(description = "Overall personality summary paragraph.")]
    pub summary: String,
}

/// A completed, persisted assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

impl AssessmentResult {
    /// Stamp a freshly produced report with a new id and the current time.
    pub fn from_report(report: AnalysisReport) -> Self {
        Self { id: Uuid::new_v4(), date: Utc::now(), report }
    }

    pub fn top_strengths(&self) -> &[StrengthItem] {
        &self.report.top_strengths
    }

    pub fn domain_distribution(&self) -> &DomainDistribution {
        &self.report.domain_distribution
    }

    pub fn summary(&self) -> &str {
        &self.report.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_accepts_label_and_code() {
        let a: Domain = serde_json::from_str("\"戰略思維\"").unwrap();
        let b: Domain = serde_json::from_str("\"STRATEGIC_THINKING\"").unwrap();
        assert_eq!(a, Domain::StrategicThinking);
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&Domain::Executing).unwrap(), "\"執行力\"");
    }

    #[test]
    fn distribution_keys_accept_every_domain_spelling() {
        let dist: DomainDistribution = serde_json::from_str(
            r#"{"Executing": 10, "INFLUENCING": 20, "建立關係": 30, "StrategicThinking": 40}"#,
        )
        .unwrap();
        assert_eq!(dist, DomainDistribution::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn percentages_normalize_uneven_weights() {
        let dist = DomainDistribution::new(50.0, 50.0, 50.0, 50.0);
        for (_, p) in dist.percentages() {
            assert!((p - 25.0).abs() < 1e-9);
        }
        let zero = DomainDistribution::default();
        assert!(zero.percentages().iter().all(|(_, p)| *p == 0.0));
    }

    #[test]
    fn dominant_picks_largest_weight() {
        let dist = DomainDistribution::new(10.0, 20.0, 40.0, 30.0);
        assert_eq!(dist.dominant(), Domain::RelationshipBuilding);
    }

    #[test]
    fn result_serializes_flat_camel_case() {
        let result = AssessmentResult::from_report(AnalysisReport {
            top_strengths: vec![],
            domain_distribution: DomainDistribution::new(1.0, 2.0, 3.0, 4.0),
            summary: "s".into(),
        });
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("topStrengths").is_some());
        assert_eq!(value["domainDistribution"]["建立關係"], 3.0);
        assert_eq!(value["id"], result.id.to_string());
    }

    #[test]
    fn every_theme_belongs_to_one_domain() {
        let total: usize = Domain::ALL.iter().map(|d| d.themes().len()).sum();
        assert_eq!(total, 34);
    }
}

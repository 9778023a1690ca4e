//! Plain-text rendering of each screen. No decisions are made here.

use std::fmt::Write as _;

use crate::app::Screen;
use crate::model::{AssessmentResult, DomainDistribution, Question};

const BAR_WIDTH: usize = 30;

pub fn render_screen(screen: &Screen<'_>) -> String {
    match screen {
        Screen::Landing { history_count } => render_landing(*history_count),
        Screen::Quiz { question, number, total, progress } => render_quiz(question, *number, *total, *progress),
        Screen::Analyzing { status } => render_analyzing(status),
        Screen::Result { result } => render_result(result),
        Screen::History { history } => render_history(history),
    }
}

fn bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn render_landing(history_count: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "探索你的天賦優勢 / Discover your strengths");
    let _ = writeln!(out);
    let _ = writeln!(out, "Answer each forced-choice question by instinct. There are no right answers.");
    let _ = writeln!(out);
    let _ = writeln!(out, "  [s] Start the assessment");
    if history_count > 0 {
        let _ = writeln!(out, "  [h] View history ({history_count})");
    }
    let _ = writeln!(out, "  [q] Quit");
    out
}

pub fn render_quiz(question: &Question, number: usize, total: usize, progress: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Question {number} / {total}   {:>3.0}% complete", progress * 100.0);
    let _ = writeln!(out, "{}", bar(progress, BAR_WIDTH));
    let _ = writeln!(out);
    let _ = writeln!(out, "Which of these is closer to your natural reaction?");
    let _ = writeln!(out);
    let _ = writeln!(out, "  [a] {}", question.option_a);
    let _ = writeln!(out, "  [b] {}", question.option_b);
    out
}

pub fn render_analyzing(status: &str) -> String {
    format!("Analyzing your strengths...\n\n  {status}\n\nThis can take up to a minute. [Ctrl-C] cancels.\n")
}

pub fn render_distribution(distribution: &DomainDistribution) -> String {
    let mut out = String::new();
    for (domain, pct) in distribution.percentages() {
        let _ = writeln!(out, "  {:<6} {} {:>5.1}%", domain.label(), bar(pct / 100.0, BAR_WIDTH), pct);
    }
    out
}

pub fn render_result(result: &AssessmentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "您的天賦優勢報告 / Your strengths report ({})", result.date.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Domain distribution");
    out.push_str(&render_distribution(result.domain_distribution()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "  {}", result.summary());
    let _ = writeln!(out);
    let _ = writeln!(out, "Top strengths");
    for (i, strength) in result.top_strengths().iter().enumerate() {
        let _ = writeln!(out, "  {}. {} [{}]", i + 1, strength.name, strength.domain);
        let _ = writeln!(out, "     {}", strength.description);
        let _ = writeln!(out, "     → {}", strength.advice);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  [r] Take it again   [b] Back to start   [h] View history");
    out
}

pub fn render_history(history: &[AssessmentResult]) -> String {
    let mut out = String::new();
    if history.is_empty() {
        let _ = writeln!(out, "尚未有測驗記錄 / No saved results yet.");
        let _ = writeln!(out);
        let _ = writeln!(out, "  [b] Back");
        return out;
    }

    let _ = writeln!(out, "歷史記錄 / History");
    let _ = writeln!(out);
    for (i, result) in history.iter().enumerate() {
        let names: Vec<&str> = result.top_strengths().iter().take(3).map(|s| s.name.as_str()).collect();
        let _ = write!(out, "  [{:>2}] {}  {}", i + 1, result.date.format("%Y-%m-%d"), names.join(", "));
        let rest = result.top_strengths().len().saturating_sub(3);
        if rest > 0 {
            let _ = write!(out, "  + 其他 {rest} 項優勢 (+{rest} more)");
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  [number + Enter] Open   [c] Clear history   [b] Back");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisReport, Domain, StrengthItem};

    fn result() -> AssessmentResult {
        let item = |name: &str| StrengthItem {
            name: name.into(),
            domain: Domain::Influencing,
            description: "desc".into(),
            advice: "advice".into(),
        };
        AssessmentResult::from_report(AnalysisReport {
            top_strengths: vec![item("Woo"), item("Command"), item("Activator"), item("Maximizer")],
            domain_distribution: DomainDistribution::new(10.0, 60.0, 10.0, 20.0),
            summary: "A persuasive person.".into(),
        })
    }

    #[test]
    fn landing_hides_history_when_empty() {
        assert!(!render_landing(0).contains("View history"));
        assert!(render_landing(2).contains("View history (2)"));
    }

    #[test]
    fn quiz_shows_both_options_and_progress() {
        let q = Question::new(3, "left", "right");
        let text = render_quiz(&q, 2, 4, 0.5);
        assert!(text.contains("Question 2 / 4"));
        assert!(text.contains(" 50% complete"));
        assert!(text.contains("[a] left") && text.contains("[b] right"));
    }

    #[test]
    fn result_lists_strengths_and_distribution() {
        let text = render_result(&result());
        assert!(text.contains("1. Woo [影響力]"));
        assert!(text.contains("60.0%"));
        assert!(text.contains("A persuasive person."));
    }

    #[test]
    fn history_shows_first_three_strengths() {
        let text = render_history(&[result()]);
        assert!(text.contains("Woo, Command, Activator  + 其他 1 項優勢 (+1 more)"));
        assert!(!text.contains("Maximizer"));
        assert!(render_history(&[]).contains("No saved results"));
    }

    #[test]
    fn history_numbers_every_entry_past_nine() {
        let history: Vec<AssessmentResult> = (0..12).map(|_| result()).collect();
        let text = render_history(&history);
        assert!(text.contains("[ 9]"));
        assert!(text.contains("[10]"));
        assert!(text.contains("[12]"));
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(bar(2.0, 4), "████");
        assert_eq!(bar(-1.0, 4), "░░░░");
    }
}

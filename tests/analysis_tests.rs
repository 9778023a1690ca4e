
use std::time::Duration;

use serde_json::json;
use strengths_quiz::analysis::AnalysisClient;
use strengths_quiz::clients::{FlexibleClient, MockClient, MockResponse};
use strengths_quiz::error::{AnalysisError, FailureKind};
use strengths_quiz::{Answer, Choice, Domain};

use crate::test_utils::{mock_analysis, report, report_json};

fn answers(n: u32) -> Vec<Answer> {
    (1..=n)
        .map(|id| Answer {
            question_id: id,
            selected_option: if id % 2 == 0 { Choice::B } else { Choice::A },
            selected_text: format!("answer {id}"),
        })
        .collect()
}

#[tokio::test]
async fn parses_bare_json_reply() {
    let (analysis, handle) = mock_analysis(3);
    handle.push_success(report_json().to_string());

    let parsed = analysis.analyze(&answers(3)).await.unwrap();
    assert_eq!(parsed, report());
    assert_eq!(parsed.top_strengths[0].domain, Domain::StrategicThinking);
    assert_eq!(handle.call_count(), 1);

    let prompt = &handle.prompts()[0];
    assert!(prompt.contains("Q1: answer 1\nQ2: answer 2\nQ3: answer 3"));
    assert!(prompt.contains("## Response Format"));
}

#[tokio::test]
async fn parses_reply_wrapped_in_prose_and_fence() {
    let (analysis, handle) = mock_analysis(3);
    handle.push_success(format!(
        "Here is the analysis you asked for:\n```json\n{}\n```\nLet me know if you need more.",
        serde_json::to_string_pretty(&report_json()).unwrap()
    ));
    assert_eq!(analysis.analyze(&answers(3)).await.unwrap(), report());
}

#[tokio::test]
async fn english_domain_codes_are_accepted() {
    let (analysis, handle) = mock_analysis(1);
    let mut reply = report_json();
    reply["topStrengths"][0]["domain"] = json!("EXECUTING");
    reply["domainDistribution"] = json!({
        "EXECUTING": 10, "INFLUENCING": 20, "RELATIONSHIP_BUILDING": 30, "STRATEGIC_THINKING": 40
    });
    handle.push_success(reply.to_string());

    let parsed = analysis.analyze(&answers(1)).await.unwrap();
    assert_eq!(parsed.top_strengths[0].domain, Domain::Executing);
    assert_eq!(parsed.domain_distribution.strategic_thinking, 40.0);
}

#[tokio::test]
async fn shape_mismatches_are_malformed() {
    let mut bad_domain = report_json();
    bad_domain["topStrengths"][1]["domain"] = json!("Charisma");
    let mut missing_entry = report_json();
    missing_entry["domainDistribution"] = json!({"執行力": 50, "影響力": 50, "建立關係": 0});
    let mut no_strengths = report_json();
    no_strengths["topStrengths"] = json!([]);

    for reply in [
        bad_domain.to_string(),
        missing_entry.to_string(),
        no_strengths.to_string(),
        "I could not produce a report.".to_string(),
    ] {
        let (analysis, handle) = mock_analysis(2);
        handle.push_success(reply.clone());
        let err = analysis.analyze(&answers(2)).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse, "reply: {reply}");
    }
}

#[tokio::test]
async fn advisory_deviations_still_succeed() {
    let (analysis, handle) = mock_analysis(2);
    let mut reply = report_json();
    reply["topStrengths"] = json!([
        {"name": "溝通", "domain": "影響力", "description": "d", "advice": "a"},
        {"name": "溝通", "domain": "影響力", "description": "d", "advice": "a"}
    ]);
    reply["domainDistribution"] = json!({"執行力": 90, "影響力": 90, "建立關係": 90, "戰略思維": 90});
    handle.push_success(reply.to_string());

    let parsed = analysis.analyze(&answers(2)).await.unwrap();
    assert_eq!(parsed.top_strengths.len(), 2);
    assert_eq!(parsed.domain_distribution.total(), 360.0);
}

#[tokio::test]
async fn service_errors_and_empty_payloads() {
    let (analysis, handle) = mock_analysis(1);
    handle.push_error("503 from upstream");
    handle.push_success("   ");

    let err = analysis.analyze(&answers(1)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ExternalService(_)));
    let err = analysis.analyze(&answers(1)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyResponse));
    assert_eq!(err.kind(), FailureKind::ExternalService);
}

#[tokio::test]
async fn slow_service_times_out() {
    let (client, handle) = MockClient::new();
    handle.push(MockResponse::success(report_json().to_string()).delayed(Duration::from_secs(5)));
    let analysis = AnalysisClient::new(client).with_timeout(Duration::from_millis(50));

    let err = analysis.analyze(&answers(2)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Timeout(_)));
    assert_eq!(err.kind(), FailureKind::ExternalService);
}

#[tokio::test]
async fn incomplete_answers_never_reach_the_service() {
    let (analysis, handle) = mock_analysis(3);
    handle.push_success(report_json().to_string());

    let err = analysis.analyze(&answers(2)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::IncompleteAnswers { expected: 3, actual: 2 }));
    let err = analysis.analyze(&[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Precondition);
    assert_eq!(handle.call_count(), 0);
    assert_eq!(handle.pending(), 1);
}

#[tokio::test]
async fn missing_credentials_are_configuration_errors() {
    use strengths_quiz::clients::{ClaudeClient, ClaudeConfig, ClaudeModel, DeepSeekClient, DeepSeekConfig};

    let claude = ClaudeClient::new(ClaudeConfig::anthropic(String::new(), ClaudeModel::default()));
    let err = AnalysisError::from(claude.unwrap_err());
    assert_eq!(err.kind(), FailureKind::Configuration);

    let config = DeepSeekConfig { api_key: "  ".to_string(), ..DeepSeekConfig::default() };
    let err = AnalysisError::from(DeepSeekClient::new(config).unwrap_err());
    assert_eq!(err.kind(), FailureKind::Configuration);
}

#[tokio::test]
async fn works_through_flexible_client() {
    let (client, handle) = FlexibleClient::new_mock_with_responses(vec![MockResponse::success(
        report_json().to_string(),
    )]);
    let analysis = AnalysisClient::new(client);
    assert_eq!(analysis.analyze(&answers(4)).await.unwrap(), report());
    assert_eq!(handle.pending(), 0);
}

#[tokio::test]
async fn offline_mock_produces_a_valid_report() {
    let analysis = AnalysisClient::new(FlexibleClient::from_type(
        strengths_quiz::clients::ClientType::Mock,
        None,
    )
    .unwrap());
    let parsed = analysis.analyze(&answers(2)).await.unwrap();
    assert_eq!(parsed.top_strengths.len(), 5);
    assert_eq!(parsed.domain_distribution.total(), 100.0);
}

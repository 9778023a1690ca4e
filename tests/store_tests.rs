
use std::sync::Arc;

use strengths_quiz::config::HISTORY_KEY;
use strengths_quiz::storage::{FileStorage, MemoryStorage, Storage};
use strengths_quiz::{ClearOutcome, ResultStore};

use crate::test_utils::{report, result_named};
use strengths_quiz::AssessmentResult;

#[tokio::test]
async fn save_prepends_and_grows_by_one() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = ResultStore::load(storage.clone(), HISTORY_KEY).await;
    assert!(store.is_empty());

    let first = result_named("first");
    let second = result_named("second");
    store.save(first.clone()).await.unwrap();
    store.save(second.clone()).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(0), Some(&second));
    assert_eq!(store.get(1), Some(&first));

    // Same result twice is two entries.
    store.save(second.clone()).await.unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.history()[0].id, store.history()[1].id);
}

#[tokio::test]
async fn reload_from_disk_reproduces_saved_result() {
    let dir = tempfile::tempdir().unwrap();
    let result = AssessmentResult::from_report(report());

    {
        let mut store = ResultStore::load(FileStorage::new(dir.path()), HISTORY_KEY).await;
        store.save(result_named("older")).await.unwrap();
        store.save(result.clone()).await.unwrap();
    }

    let reloaded = ResultStore::load(FileStorage::new(dir.path()), HISTORY_KEY).await;
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.history()[0], result);
    assert_eq!(reloaded.history()[1].summary(), "summary for older");
}

#[tokio::test]
async fn clear_then_load_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ResultStore::load(FileStorage::new(dir.path()), HISTORY_KEY).await;
    store.save(result_named("gone")).await.unwrap();

    let outcome = store.clear(&|_: &str| true).await.unwrap();
    assert_eq!(outcome, ClearOutcome::Cleared);
    assert!(store.is_empty());

    let reloaded = ResultStore::load(FileStorage::new(dir.path()), HISTORY_KEY).await;
    assert!(reloaded.is_empty());
    assert!(!FileStorage::new(dir.path()).path_for(HISTORY_KEY).exists());
}

#[tokio::test]
async fn declined_clear_keeps_everything() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = ResultStore::load(storage.clone(), HISTORY_KEY).await;
    store.save(result_named("kept")).await.unwrap();

    let outcome = store.clear(&|_: &str| false).await.unwrap();
    assert_eq!(outcome, ClearOutcome::Declined);
    assert_eq!(store.len(), 1);
    assert!(storage.get(HISTORY_KEY).is_some());
}

#[tokio::test]
async fn clearing_empty_history_does_not_prompt() {
    let mut store = ResultStore::load(MemoryStorage::new(), HISTORY_KEY).await;
    let outcome = store
        .clear(&|_: &str| -> bool { panic!("should not ask") })
        .await
        .unwrap();
    assert_eq!(outcome, ClearOutcome::AlreadyEmpty);
}

#[tokio::test]
async fn corrupt_history_loads_empty_and_is_replaced_on_save() {
    let storage = Arc::new(MemoryStorage::with_entry(HISTORY_KEY, "{not json"));
    let mut store = ResultStore::load(storage.clone(), HISTORY_KEY).await;
    assert!(store.is_empty());

    store.save(result_named("fresh")).await.unwrap();
    let text = storage.read(HISTORY_KEY).await.unwrap().unwrap();
    let parsed: Vec<AssessmentResult> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[tokio::test]
async fn old_format_history_is_readable() {
    let legacy = r#"[{
        "id": "6f1c2f7e-9d4b-4b8e-a1a6-0c7b0f2f6d11",
        "date": "2024-05-01T08:30:00.000Z",
        "topStrengths": [{"name": "成就", "domain": "執行力", "description": "d", "advice": "a"}],
        "domainDistribution": {"執行力": 40, "影響力": 20, "建立關係": 20, "戰略思維": 20},
        "summary": "legacy"
    }]"#;
    let store = ResultStore::load(MemoryStorage::with_entry(HISTORY_KEY, legacy), HISTORY_KEY).await;
    assert_eq!(store.len(), 1);
    assert_eq!(store.history()[0].summary(), "legacy");
    assert_eq!(store.history()[0].domain_distribution().executing, 40.0);
}

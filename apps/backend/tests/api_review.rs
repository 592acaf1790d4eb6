//! Review API tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_start_with_nothing_due_returns_message() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/review/start").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["state"], "not_started");
    assert!(body["data"]["message"].as_str().is_some());
}

#[tokio::test]
async fn test_due_lists_unscheduled_items() {
    let ctx = TestContext::with_items(fixtures::sample_items());
    let server = ctx.server();

    let response = server.get("/api/review/due").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_full_review_pass() {
    let ctx = TestContext::with_items(vec![
        fixtures::item("dog", "pes"),
        fixtures::item("cat", "kočka"),
    ]);
    let server = ctx.server();

    let response = server.post("/api/review/start").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["state"], "active");
    assert_eq!(body["data"]["remaining"], 2);
    assert_eq!(body["data"]["revealed"], false);
    let first = body["data"]["current_item"]["id"].clone();

    let response = server.post("/api/review/reveal").await;
    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["data"]["revealed"], true);

    let response = server
        .post("/api/review/answer")
        .json(&json!({ "item_id": first, "was_correct": true }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["card"]["item"]["repetition_level"], 1);
    assert_eq!(body["data"]["card"]["item"]["correct_count"], 1);
    assert!(body["data"]["card"]["item"]["next_review_date"].is_string());
    assert_eq!(body["data"]["review"]["state"], "active");
    assert_eq!(body["data"]["review"]["revealed"], false);
    assert_eq!(body["data"]["review"]["daily_goal"]["completed_today"], 1);
    let second = body["data"]["review"]["current_item"]["id"].clone();
    assert_ne!(first, second);

    let response = server
        .post("/api/review/answer")
        .json(&json!({ "item_id": second, "was_correct": false }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // A wrong answer schedules the item again in a day
    assert_eq!(body["data"]["card"]["item"]["repetition_level"], 0);
    assert_eq!(body["data"]["card"]["item"]["incorrect_count"], 1);
    assert_eq!(body["data"]["review"]["state"], "complete");
    assert_eq!(body["data"]["review"]["stats"]["correct"], 1);
    assert_eq!(body["data"]["review"]["stats"]["incorrect"], 1);
    // 10 - 3 + 1 * 5
    assert_eq!(body["data"]["review"]["points"], 12);

    let stored = ctx.memory.snapshot();
    assert_eq!(stored.daily_stats.len(), 1);
    assert_eq!(stored.daily_stats[0].words_reviewed, 2);
    assert_eq!(stored.daily_stats[0].correct, 1);

    // Both items are now scheduled in the future.
    let response = server.get("/api/review/due").await;
    assert_eq!(response.json::<serde_json::Value>()["count"], 0);
}

#[tokio::test]
async fn test_answer_for_other_item_is_rejected() {
    let items = vec![fixtures::item("dog", "pes"), fixtures::item("cat", "kočka")];
    let ctx = TestContext::with_items(items);
    let server = ctx.server();

    let response = server.post("/api/review/start").await;
    let body: serde_json::Value = response.json();
    let current = body["data"]["current_item"]["id"].as_str().unwrap().to_string();
    let other = ctx
        .memory
        .snapshot()
        .items
        .unwrap()
        .into_iter()
        .map(|i| i.id.to_string())
        .find(|id| *id != current)
        .unwrap();

    let response = server
        .post("/api/review/answer")
        .json(&json!({ "item_id": other, "was_correct": true }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<serde_json::Value>()["error"],
        "invalid_answer_target"
    );
    let stored = ctx.memory.snapshot().items.unwrap();
    assert!(stored.iter().all(|i| i.repetition_level == 0 && i.correct_count == 0));
}

#[tokio::test]
async fn test_answer_without_session_conflicts() {
    let ctx = TestContext::with_items(vec![fixtures::item("dog", "pes")]);
    let server = ctx.server();

    let response = server.post("/api/review/reveal").await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<serde_json::Value>()["error"], "session_not_active");
}

#[tokio::test]
async fn test_skip_and_reset() {
    let ctx = TestContext::with_items(vec![
        fixtures::item("dog", "pes"),
        fixtures::item("cat", "kočka"),
    ]);
    let server = ctx.server();

    server.post("/api/review/start").await.assert_status_ok();

    let response = server.post("/api/review/skip").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["remaining"], 1);
    // Skipping leaves the schedule alone.
    assert!(ctx
        .memory
        .snapshot()
        .items
        .unwrap()
        .iter()
        .all(|i| i.next_review_date.is_none()));

    let response = server.post("/api/review/reset").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["state"], "not_started");
    assert!(body["data"]["current_item"].is_null());
}

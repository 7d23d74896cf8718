//! HTTP-level integration tests for the task and chat hooks.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use collab_api::notifications::NotificationRouter;
use collab_db::repositories::{NotificationRepo, ProjectRepo};
use collab_events::event_types;
use collab_events::{ChatMessagePayload, TaskCreatedPayload};
use common::{body_json, build_test_app, create_project, post_json_auth, token_for, TestApp};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Poll `user_id`'s notifications until `expected` exist or a second passes.
async fn wait_for_notifications(test: &TestApp, user_id: &str, expected: usize) -> usize {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        let count = NotificationRepo::list_for_user(test.store(), user_id)
            .await
            .unwrap()
            .len();
        if count >= expected || tokio::time::Instant::now() >= deadline {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_created_hook_publishes_event_with_caller_as_creator() {
    let test = build_test_app();
    let mut rx = test.state.event_bus.subscribe();

    let response = post_json_auth(
        test.app(),
        "/api/v1/hooks/task-created",
        json!({ "projectId": "P1", "taskId": "T1" }),
        &token_for("U2", "Bob"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["data"]["accepted"], true);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type, event_types::TASK_CREATED);
    let payload: TaskCreatedPayload = event.decode_payload().unwrap();
    assert_eq!(payload.project_id, "P1");
    assert_eq!(payload.task_id.as_deref(), Some("T1"));
    assert_eq!(payload.creator_id, "U2");
    assert_eq!(payload.creator_name, "Bob");
}

#[tokio::test]
async fn chat_message_hook_defaults_authored_at_to_now() {
    let test = build_test_app();
    let mut rx = test.state.event_bus.subscribe();
    let before = Utc::now();

    let response = post_json_auth(
        test.app(),
        "/api/v1/hooks/chat-message",
        json!({ "projectId": "P1" }),
        &token_for("U1", "Alice"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type, event_types::CHAT_MESSAGE);
    let payload: ChatMessagePayload = event.decode_payload().unwrap();
    assert_eq!(payload.author_id, "U1");
    assert!(payload.authored_at >= before);
}

#[tokio::test]
async fn hook_without_project_returns_400() {
    let test = build_test_app();

    let response = post_json_auth(
        test.app(),
        "/api/v1/hooks/task-created",
        json!({ "projectId": "" }),
        &token_for("U2", "Bob"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// End to end through the notification router
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_by_collaborator_notifies_owner_through_router() {
    let test = build_test_app();
    let project = create_project(&test, "U1", "Website Redesign").await;
    ProjectRepo::add_collaborator(test.store(), &project.project_id, "U2")
        .await
        .unwrap();

    let router = NotificationRouter::new(test.state.triggers.clone());
    let handle = tokio::spawn(router.run(test.state.event_bus.subscribe()));

    let response = post_json_auth(
        test.app(),
        "/api/v1/hooks/task-created",
        json!({ "projectId": project.project_id }),
        &token_for("U2", "Bob"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert_eq!(wait_for_notifications(&test, "U1", 1).await, 1);
    let notifications = NotificationRepo::list_for_user(test.store(), "U1").await.unwrap();
    assert_eq!(notifications[0].kind.type_name(), "task_created");
    assert_eq!(notifications[0].extra["creatorId"], "U2");

    handle.abort();
}

#[tokio::test]
async fn chat_burst_notifies_each_other_member_once() {
    let test = build_test_app();
    let project = create_project(&test, "U1", "Website Redesign").await;
    for member in ["U2", "U3"] {
        ProjectRepo::add_collaborator(test.store(), &project.project_id, member)
            .await
            .unwrap();
    }

    let router = NotificationRouter::new(test.state.triggers.clone());
    let handle = tokio::spawn(router.run(test.state.event_bus.subscribe()));

    let bob = token_for("U2", "Bob");
    for _ in 0..3 {
        let response = post_json_auth(
            test.app(),
            "/api/v1/hooks/chat-message",
            json!({ "projectId": project.project_id }),
            &bob,
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    assert_eq!(wait_for_notifications(&test, "U1", 1).await, 1);
    assert_eq!(wait_for_notifications(&test, "U3", 1).await, 1);
    // Give any stray deliveries a moment before checking none arrived.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        NotificationRepo::list_for_user(test.store(), "U1").await.unwrap().len(),
        1
    );
    assert!(NotificationRepo::list_for_user(test.store(), "U2")
        .await
        .unwrap()
        .is_empty());

    handle.abort();
}

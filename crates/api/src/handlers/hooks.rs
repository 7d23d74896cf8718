//! Hooks called by the task and chat flows after their own write succeeds.
//!
//! Each hook only publishes an event and answers 202; the notification
//! router does the rest in the background, so a trigger failure can never
//! fail the caller's task creation or message send.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use collab_core::types::Timestamp;
use collab_events::{ChatMessagePayload, TaskCreatedPayload};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreatedHook {
    #[validate(length(min = 1, max = 128))]
    pub project_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageHook {
    #[validate(length(min = 1, max = 128))]
    pub project_id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    /// When the message was written; defaults to now.
    #[serde(default)]
    pub authored_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct Accepted {
    pub accepted: bool,
}

fn accepted() -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: Accepted { accepted: true },
        }),
    )
}

/// POST /api/v1/hooks/task-created
///
/// The authenticated user is the task creator.
pub async fn task_created(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<TaskCreatedHook>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let event = TaskCreatedPayload {
        project_id: body.project_id,
        task_id: body.task_id,
        creator_id: auth.user_id,
        creator_name: auth.display_name,
    }
    .into_event();
    state.event_bus.publish(event);
    Ok(accepted())
}

/// POST /api/v1/hooks/chat-message
///
/// The authenticated user is the message author.
pub async fn chat_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ChatMessageHook>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let event = ChatMessagePayload {
        project_id: body.project_id,
        message_id: body.message_id,
        author_id: auth.user_id,
        author_name: auth.display_name,
        authored_at: body.authored_at.unwrap_or_else(Utc::now),
    }
    .into_event();
    state.event_bus.publish(event);
    Ok(accepted())
}

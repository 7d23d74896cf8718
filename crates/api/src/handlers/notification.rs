//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use collab_core::error::CoreError;
use collab_core::notification::{notification_types, NewNotification, Notification};
use collab_core::types::Timestamp;
use collab_core::visibility::ActorRole;
use collab_db::models::notification::NotificationRecord;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::notifications::{Inbox, InboxEntry};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A notification in the flat shape the UI renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    #[serde(flatten)]
    pub record: NotificationRecord,
    pub created_at: Timestamp,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            record: NotificationRecord::from_notification(n),
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InboxItemView {
    pub role: ActorRole,
    #[serde(flatten)]
    pub notification: NotificationView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxView {
    pub actionable: Vec<InboxItemView>,
    pub informational: Vec<InboxItemView>,
    pub unread_count: usize,
}

impl From<Inbox> for InboxView {
    fn from(inbox: Inbox) -> Self {
        let items = |entries: Vec<InboxEntry>| {
            entries
                .iter()
                .map(|e| InboxItemView {
                    role: e.role,
                    notification: NotificationView::from(&e.notification),
                })
                .collect()
        };
        Self {
            actionable: items(inbox.actionable),
            informational: items(inbox.informational),
            unread_count: inbox.unread_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// Everything the user may see, newest first. Never fails on store
/// errors; the list is empty instead.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<NotificationView>>> {
    let items = state.notifications.list_for_user(&auth.user_id).await;
    Json(DataResponse {
        data: items.iter().map(NotificationView::from).collect(),
    })
}

/// GET /api/v1/notifications/inbox
pub async fn inbox(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<InboxView>> {
    let inbox = state.notifications.inbox(&auth.user_id).await;
    Json(DataResponse { data: inbox.into() })
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<UnreadCount>> {
    let count = state.notifications.unread_count(&auth.user_id).await;
    Json(DataResponse {
        data: UnreadCount { count },
    })
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<NotificationView>>> {
    let notification = state.notifications.get(&auth.user_id, &id).await?;
    Ok(Json(DataResponse {
        data: NotificationView::from(&notification),
    }))
}

/// POST /api/v1/notifications
///
/// Create a single-recipient notification. Collaboration requests go
/// through `POST /projects/{id}/collaboration-requests` instead.
pub async fn create_notification(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NewNotification>,
) -> AppResult<impl IntoResponse> {
    if payload.notification_type.trim() == notification_types::COLLABORATION_REQUEST {
        return Err(CoreError::Validation(
            "Collaboration requests must be submitted through the project endpoint".into(),
        )
        .into());
    }

    let notification = state.notifications.create(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: NotificationView::from(&notification),
        }),
    ))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark a notification read. Only its recipient may do this; repeating
/// the call is a no-op. Returns 204 No Content.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.notifications.mark_read_by(&auth.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = state.notifications.mark_all_read(&auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

pub mod health;
pub mod hooks;
pub mod notification;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notifications                                    list, create
/// /notifications/inbox                              actionable + informational split
/// /notifications/unread-count                       unread badge count
/// /notifications/read-all                           mark every received notification read
/// /notifications/{id}                               get
/// /notifications/{id}/read                          mark read (recipient only)
/// /notifications/{id}/accept                        accept collaboration request (owner only)
/// /notifications/{id}/reject                        reject collaboration request (owner only)
///
/// /projects/{id}/collaboration-requests             request to join (POST)
/// /projects/{id}/collaborators/{user_id}            remove collaborator (DELETE)
///
/// /hooks/task-created                               task creation trigger (POST, 202)
/// /hooks/chat-message                               chat message trigger (POST, 202)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Notifications and collaboration decisions.
        .nest("/notifications", notification::router())
        // Project membership.
        .nest("/projects", project::router())
        // Task and chat triggers.
        .nest("/hooks", hooks::router())
}

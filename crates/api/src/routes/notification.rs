//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{collaboration, notification};
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                          -> list_notifications
/// POST   /                          -> create_notification
/// GET    /inbox                     -> inbox
/// GET    /unread-count              -> unread_count
/// POST   /read-all                  -> mark_all_read
/// GET    /{id}                      -> get_notification
/// POST   /{id}/read                 -> mark_read
/// POST   /{id}/accept               -> accept
/// POST   /{id}/reject               -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notification::list_notifications).post(notification::create_notification),
        )
        .route("/inbox", get(notification::inbox))
        .route("/unread-count", get(notification::unread_count))
        .route("/read-all", post(notification::mark_all_read))
        .route("/{id}", get(notification::get_notification))
        .route("/{id}/read", post(notification::mark_read))
        // Collaboration request decisions
        .route("/{id}/accept", post(collaboration::accept))
        .route("/{id}/reject", post(collaboration::reject))
}

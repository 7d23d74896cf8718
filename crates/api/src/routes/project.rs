//! Route definitions for project membership under `/projects`.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::collaboration;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// POST   /{id}/collaboration-requests        -> request_collaboration
/// DELETE /{id}/collaborators/{user_id}       -> remove_collaborator
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/collaboration-requests",
            post(collaboration::request_collaboration),
        )
        .route(
            "/{id}/collaborators/{user_id}",
            delete(collaboration::remove_collaborator),
        )
}

use axum::routing::post;
use axum::Router;

use crate::handlers::hooks;
use crate::state::AppState;

/// Routes mounted at `/hooks`.
///
/// ```text
/// POST   /task-created              -> task_created
/// POST   /chat-message              -> chat_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task-created", post(hooks::task_created))
        .route("/chat-message", post(hooks::chat_message))
}

//! Handlers for collaboration requests and project membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::notification::NotificationView;
use crate::middleware::auth::AuthUser;
use crate::notifications::CollaborationRequestInput;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /projects/{id}/collaboration-requests`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequestBody {
    #[validate(length(min = 1, max = 128))]
    pub owner_id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub project_title: Option<String>,
    /// Defaults to the display name in the access token.
    #[serde(default)]
    #[validate(length(max = 120))]
    pub requester_name: Option<String>,
}

/// POST /api/v1/projects/{id}/collaboration-requests
///
/// The authenticated user asks to join the project.
pub async fn request_collaboration(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<CollaborationRequestBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;

    let input = CollaborationRequestInput {
        project_id,
        project_title: body.project_title.unwrap_or_default(),
        owner_id: body.owner_id,
        requester_name: body
            .requester_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| auth.display_name.clone()),
        requester_id: auth.user_id,
    };
    let notification = state.collaboration.request(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: NotificationView::from(&notification),
        }),
    ))
}

/// POST /api/v1/notifications/{id}/accept
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<NotificationView>>> {
    let notification = state.collaboration.accept(&auth.user_id, &id).await?;
    Ok(Json(DataResponse {
        data: NotificationView::from(&notification),
    }))
}

/// POST /api/v1/notifications/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<NotificationView>>> {
    let notification = state.collaboration.reject(&auth.user_id, &id).await?;
    Ok(Json(DataResponse {
        data: NotificationView::from(&notification),
    }))
}

/// DELETE /api/v1/projects/{id}/collaborators/{user_id}
pub async fn remove_collaborator(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .collaboration
        .remove_collaborator(&auth.user_id, &project_id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

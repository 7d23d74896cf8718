//! Notification model: a tagged sum type with per-variant required fields.
//!
//! Callers submit a loosely-shaped [`NewNotification`] (the same field set
//! the UI and the store speak) and get back a [`NotificationKind`] from
//! [`NewNotification::validate`]. Once validated, a notification can only
//! carry the identification scheme that matches its type:
//! `user_id` for chat/task/generic notifications, `owner_id` + `requester_id`
//! for collaboration requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Type names
// ---------------------------------------------------------------------------

/// Well-known values of the persisted `type` field.
pub mod notification_types {
    pub const COLLABORATION_REQUEST: &str = "collaboration_request";
    pub const CHAT_MESSAGE: &str = "chat_message";
    pub const TASK_CREATED: &str = "task_created";
}

// ---------------------------------------------------------------------------
// Collaboration status
// ---------------------------------------------------------------------------

/// Lifecycle state of a collaboration request.
///
/// `Pending` is the only non-terminal state. The only legal transitions are
/// `Pending -> Accepted` and `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollabStatus {
    Pending,
    Accepted,
    Rejected,
}

impl CollabStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns `true` if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: CollabStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for CollabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollabStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown collaboration status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// A request by `requester_id` to join `project_id`, addressed to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborationRequest {
    pub owner_id: UserId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub project_id: DocId,
    pub project_title: String,
    pub status: CollabStatus,
}

/// A project-scoped message addressed to a single user (chat and task
/// notifications share this shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMessage {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub project_id: DocId,
    pub project_title: String,
}

/// Free-form notification with a caller-chosen type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericNotification {
    pub user_id: UserId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub project_id: Option<DocId>,
    pub project_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    CollaborationRequest(CollaborationRequest),
    ChatMessage(ProjectMessage),
    TaskCreated(ProjectMessage),
    Generic(GenericNotification),
}

impl NotificationKind {
    /// The persisted `type` value for this variant.
    pub fn type_name(&self) -> &str {
        match self {
            Self::CollaborationRequest(_) => notification_types::COLLABORATION_REQUEST,
            Self::ChatMessage(_) => notification_types::CHAT_MESSAGE,
            Self::TaskCreated(_) => notification_types::TASK_CREATED,
            Self::Generic(g) => g.notification_type.as_str(),
        }
    }

    /// The actor allowed to mark this notification read and act on it.
    pub fn recipient(&self) -> &str {
        match self {
            Self::CollaborationRequest(r) => &r.owner_id,
            Self::ChatMessage(m) | Self::TaskCreated(m) => &m.user_id,
            Self::Generic(g) => &g.user_id,
        }
    }

    /// The actor that triggered the notification, when it is visible to them.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::CollaborationRequest(r) => Some(r.requester_id.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<CollabStatus> {
        match self {
            Self::CollaborationRequest(r) => Some(r.status),
            _ => None,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::CollaborationRequest(r) => Some(r.project_id.as_str()),
            Self::ChatMessage(m) | Self::TaskCreated(m) => Some(m.project_id.as_str()),
            Self::Generic(g) => g.project_id.as_deref(),
        }
    }

    pub fn as_collaboration_request(&self) -> Option<&CollaborationRequest> {
        match self {
            Self::CollaborationRequest(r) => Some(r),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A persisted notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: DocId,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: Timestamp,
    /// Type-specific auxiliary fields; never interpreted here.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Notification {
    pub fn is_pending_request(&self) -> bool {
        self.kind.status() == Some(CollabStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// Creation payload
// ---------------------------------------------------------------------------

/// Unvalidated creation payload.
///
/// Mirrors the persisted record shape so that it can be deserialized
/// directly from a request body. Call [`validate`](Self::validate) to obtain
/// a well-formed [`NotificationKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub user_id: Option<String>,
    pub owner_id: Option<String>,
    pub requester_id: Option<String>,
    pub requester_name: Option<String>,
    pub project_id: Option<String>,
    pub project_title: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NewNotification {
    /// Build a collaboration request payload.
    pub fn collaboration_request(
        project_id: impl Into<String>,
        project_title: impl Into<String>,
        owner_id: impl Into<String>,
        requester_id: impl Into<String>,
        requester_name: impl Into<String>,
    ) -> Self {
        Self {
            notification_type: notification_types::COLLABORATION_REQUEST.to_string(),
            owner_id: Some(owner_id.into()),
            requester_id: Some(requester_id.into()),
            requester_name: Some(requester_name.into()),
            project_id: Some(project_id.into()),
            project_title: Some(project_title.into()),
            ..Default::default()
        }
    }

    /// Build a single-recipient payload of any non-collaboration type.
    pub fn for_user(
        notification_type: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let notification_type: String = notification_type.into();
        Self {
            notification_type: notification_type.trim().to_string(),
            user_id: Some(user_id.into()),
            title: Some(title.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>, title: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self.project_title = Some(title.into());
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Map<String, serde_json::Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Check that the identification fields match the declared type and
    /// produce the typed variant.
    ///
    /// New collaboration requests always start out `Pending`.
    pub fn validate(&self) -> Result<NotificationKind, CoreError> {
        let ty = self.notification_type.trim();
        match ty {
            "" => Err(CoreError::Validation(
                "Notification type is required".into(),
            )),
            notification_types::COLLABORATION_REQUEST => {
                reject_present(&self.user_id, "userId", ty)?;
                let owner_id = required(&self.owner_id, "ownerId", ty)?;
                let requester_id = required(&self.requester_id, "requesterId", ty)?;
                if owner_id == requester_id {
                    return Err(CoreError::Validation(
                        "ownerId and requesterId must differ".into(),
                    ));
                }
                Ok(NotificationKind::CollaborationRequest(CollaborationRequest {
                    owner_id,
                    requester_id,
                    requester_name: self.requester_name.clone().unwrap_or_default(),
                    project_id: required(&self.project_id, "projectId", ty)?,
                    project_title: self.project_title.clone().unwrap_or_default(),
                    status: CollabStatus::Pending,
                }))
            }
            notification_types::CHAT_MESSAGE | notification_types::TASK_CREATED => {
                self.reject_collaboration_fields(ty)?;
                let message = ProjectMessage {
                    user_id: required(&self.user_id, "userId", ty)?,
                    title: self.title.clone().unwrap_or_default(),
                    message: self.message.clone().unwrap_or_default(),
                    project_id: required(&self.project_id, "projectId", ty)?,
                    project_title: self.project_title.clone().unwrap_or_default(),
                };
                if ty == notification_types::CHAT_MESSAGE {
                    Ok(NotificationKind::ChatMessage(message))
                } else {
                    Ok(NotificationKind::TaskCreated(message))
                }
            }
            _ => {
                self.reject_collaboration_fields(ty)?;
                Ok(NotificationKind::Generic(GenericNotification {
                    user_id: required(&self.user_id, "userId", ty)?,
                    notification_type: ty.to_string(),
                    title: self.title.clone().unwrap_or_default(),
                    message: self.message.clone().unwrap_or_default(),
                    project_id: non_blank(&self.project_id),
                    project_title: self.project_title.clone(),
                }))
            }
        }
    }

    fn reject_collaboration_fields(&self, ty: &str) -> Result<(), CoreError> {
        reject_present(&self.owner_id, "ownerId", ty)?;
        reject_present(&self.requester_id, "requesterId", ty)
    }
}

/// The value as given, unless it is missing or only whitespace.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, field: &str, ty: &str) -> Result<String, CoreError> {
    non_blank(value)
        .ok_or_else(|| CoreError::Validation(format!("{field} is required for '{ty}'")))
}

fn reject_present(value: &Option<String>, field: &str, ty: &str) -> Result<(), CoreError> {
    match non_blank(value) {
        Some(_) => Err(CoreError::Validation(format!(
            "{field} is not allowed for '{ty}'"
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

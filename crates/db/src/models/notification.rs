//! Notification document model.
//!
//! The persisted shape keeps the flat camelCase field set the UI reads;
//! decoding re-validates it into the typed [`NotificationKind`] so that a
//! record with a mismatched identification scheme never reaches callers.

use collab_core::error::CoreError;
use collab_core::notification::{
    CollabStatus, NewNotification, Notification, NotificationKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{encode, Body, Document, StoreError};

/// Field names used in filters and updates.
pub mod fields {
    pub const TYPE: &str = "type";
    pub const USER_ID: &str = "userId";
    pub const OWNER_ID: &str = "ownerId";
    pub const REQUESTER_ID: &str = "requesterId";
    pub const PROJECT_ID: &str = "projectId";
    pub const STATUS: &str = "status";
    pub const READ: &str = "read";
}

/// A notification document body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CollabStatus>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl NotificationRecord {
    /// Flatten a typed notification into its persisted shape.
    pub fn from_kind(kind: &NotificationKind, read: bool, extra: Map<String, Value>) -> Self {
        let mut record = Self {
            notification_type: kind.type_name().to_string(),
            read,
            extra,
            ..Default::default()
        };
        match kind {
            NotificationKind::CollaborationRequest(r) => {
                record.owner_id = Some(r.owner_id.clone());
                record.requester_id = Some(r.requester_id.clone());
                record.requester_name = Some(r.requester_name.clone());
                record.project_id = Some(r.project_id.clone());
                record.project_title = Some(r.project_title.clone());
                record.status = Some(r.status);
            }
            NotificationKind::ChatMessage(m) | NotificationKind::TaskCreated(m) => {
                record.user_id = Some(m.user_id.clone());
                record.title = Some(m.title.clone());
                record.message = Some(m.message.clone());
                record.project_id = Some(m.project_id.clone());
                record.project_title = Some(m.project_title.clone());
            }
            NotificationKind::Generic(g) => {
                record.user_id = Some(g.user_id.clone());
                record.title = Some(g.title.clone());
                record.message = Some(g.message.clone());
                record.project_id = g.project_id.clone();
                record.project_title = g.project_title.clone();
            }
        }
        record
    }

    pub fn from_notification(notification: &Notification) -> Self {
        Self::from_kind(&notification.kind, notification.read, notification.extra.clone())
    }

    pub fn to_body(&self) -> Result<Body, StoreError> {
        encode(self)
    }

    /// Rebuild the typed notification, enforcing the status invariant:
    /// `status` is present exactly for collaboration requests.
    pub fn into_domain(self, doc: &Document) -> Result<Notification, CoreError> {
        let payload = NewNotification {
            notification_type: self.notification_type,
            user_id: self.user_id,
            owner_id: self.owner_id,
            requester_id: self.requester_id,
            requester_name: self.requester_name,
            project_id: self.project_id,
            project_title: self.project_title,
            title: self.title,
            message: self.message,
            extra: Map::new(),
        };
        let mut kind = payload.validate().map_err(|e| malformed(doc, e))?;

        match (&mut kind, self.status) {
            (NotificationKind::CollaborationRequest(r), Some(status)) => r.status = status,
            (NotificationKind::CollaborationRequest(_), None) => {
                return Err(malformed(doc, "collaboration request without status"));
            }
            (_, Some(_)) => {
                return Err(malformed(doc, "status on a non-collaboration notification"));
            }
            (_, None) => {}
        }

        Ok(Notification {
            id: doc.id.clone(),
            kind,
            read: self.read,
            created_at: doc.created_at,
            extra: self.extra,
        })
    }
}

/// Decode a stored document into a typed notification.
pub fn decode(doc: &Document) -> Result<Notification, CoreError> {
    let record: NotificationRecord = doc.decode().map_err(|e| malformed(doc, e))?;
    record.into_domain(doc)
}

fn malformed(doc: &Document, reason: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("Malformed notification record {}: {reason}", doc.id))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn doc(body: Value) -> Document {
        Document {
            id: "N1".into(),
            created_at: Utc::now(),
            body: match body {
                Value::Object(map) => map,
                _ => panic!("expected object"),
            },
        }
    }

    #[test]
    fn collaboration_request_persists_flat_camel_case() {
        let kind = NewNotification::collaboration_request("P1", "Website Redesign", "U1", "U2", "Bob")
            .validate()
            .unwrap();
        let body = NotificationRecord::from_kind(&kind, false, Map::new())
            .to_body()
            .unwrap();
        assert_eq!(
            Value::Object(body),
            json!({
                "type": "collaboration_request",
                "ownerId": "U1",
                "requesterId": "U2",
                "requesterName": "Bob",
                "projectId": "P1",
                "projectTitle": "Website Redesign",
                "status": "pending",
                "read": false
            })
        );
    }

    #[test]
    fn decode_restores_typed_variant() {
        let n = decode(&doc(json!({
            "type": "task_created",
            "userId": "U1",
            "title": "New task in \"Site\"",
            "message": "Carol created a task in the project.",
            "projectId": "P1",
            "projectTitle": "Site",
            "read": true,
            "extra": { "taskId": "T1" }
        })))
        .unwrap();
        assert_matches!(n.kind, NotificationKind::TaskCreated(ref m) if m.user_id == "U1");
        assert!(n.read);
        assert_eq!(n.extra["taskId"], "T1");
    }

    #[test]
    fn decode_keeps_decided_status() {
        let n = decode(&doc(json!({
            "type": "collaboration_request",
            "ownerId": "U1",
            "requesterId": "U2",
            "projectId": "P1",
            "status": "accepted",
            "read": true
        })))
        .unwrap();
        assert_eq!(n.kind.status(), Some(CollabStatus::Accepted));
    }

    #[test]
    fn decode_rejects_records_breaking_invariants() {
        // status on a chat notification
        let err = decode(&doc(json!({
            "type": "chat_message", "userId": "U1", "projectId": "P1", "status": "pending"
        })));
        assert_matches!(err, Err(CoreError::Internal(_)));

        // collaboration request with no status
        let err = decode(&doc(json!({
            "type": "collaboration_request", "ownerId": "U1", "requesterId": "U2", "projectId": "P1"
        })));
        assert_matches!(err, Err(CoreError::Internal(_)));

        // both identification schemes
        let err = decode(&doc(json!({
            "type": "deadline", "userId": "U1", "ownerId": "U2"
        })));
        assert_matches!(err, Err(CoreError::Internal(_)));
    }

    #[test]
    fn missing_read_defaults_to_false() {
        let n = decode(&doc(json!({ "type": "deadline", "userId": "U1" }))).unwrap();
        assert!(!n.read);
    }
}

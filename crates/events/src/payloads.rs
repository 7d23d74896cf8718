//! Typed payloads carried by [`PlatformEvent`](crate::PlatformEvent).

use chrono::{DateTime, Utc};
use collab_core::types::{DocId, UserId};
use serde::{Deserialize, Serialize};

use crate::bus::PlatformEvent;
use crate::event_types;

/// Published by the task flow after a task is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreatedPayload {
    pub project_id: DocId,
    #[serde(default)]
    pub task_id: Option<DocId>,
    pub creator_id: UserId,
    #[serde(default)]
    pub creator_name: String,
}

impl TaskCreatedPayload {
    pub fn into_event(self) -> PlatformEvent {
        let project_id = self.project_id.clone();
        let actor = self.creator_id.clone();
        PlatformEvent::new(event_types::TASK_CREATED)
            .with_project(project_id)
            .with_actor(actor)
            .with_payload(serde_json::to_value(self).unwrap_or_default())
    }
}

/// Published by the chat flow after a message is appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub project_id: DocId,
    #[serde(default)]
    pub message_id: Option<DocId>,
    pub author_id: UserId,
    #[serde(default)]
    pub author_name: String,
    /// When the message was written; used for the freshness check.
    pub authored_at: DateTime<Utc>,
}

impl ChatMessagePayload {
    pub fn into_event(self) -> PlatformEvent {
        let project_id = self.project_id.clone();
        let actor = self.author_id.clone();
        PlatformEvent::new(event_types::CHAT_MESSAGE)
            .with_project(project_id)
            .with_actor(actor)
            .with_payload(serde_json::to_value(self).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_payload_travels_in_event() {
        let payload = ChatMessagePayload {
            project_id: "P1".into(),
            message_id: Some("M1".into()),
            author_id: "U2".into(),
            author_name: "Bob".into(),
            authored_at: Utc::now(),
        };
        let event = payload.clone().into_event();
        assert_eq!(event.event_type, event_types::CHAT_MESSAGE);
        assert_eq!(event.project_id.as_deref(), Some("P1"));
        assert_eq!(event.payload["authorId"], "U2");
        assert_eq!(event.decode_payload::<ChatMessagePayload>().unwrap(), payload);
    }

    #[test]
    fn task_payload_accepts_missing_optional_fields() {
        let event = PlatformEvent::new(event_types::TASK_CREATED).with_payload(serde_json::json!({
            "projectId": "P1",
            "creatorId": "U3"
        }));
        let payload: TaskCreatedPayload = event.decode_payload().unwrap();
        assert_eq!(payload.creator_name, "");
        assert!(payload.task_id.is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let event = PlatformEvent::new(event_types::CHAT_MESSAGE)
            .with_payload(serde_json::json!({ "projectId": "P1" }));
        assert!(event.decode_payload::<ChatMessagePayload>().is_err());
    }
}

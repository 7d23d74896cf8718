//! Notifications emitted as side effects of task creation and chat
//! messages.
//!
//! Trigger failures are logged and swallowed. Each recipient gets an
//! independent write, so one failed write does not stop the others.

use std::sync::Arc;

use chrono::{Duration, Utc};
use collab_core::notification::{notification_types, NewNotification};
use collab_core::project::ProjectMembership;
use collab_core::triggers::{self, ChatDebouncer};
use collab_core::types::Timestamp;
use collab_db::repositories::ProjectRepo;
use collab_db::DocumentStore;
use collab_events::{ChatMessagePayload, TaskCreatedPayload};
use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::notifications::service::NotificationService;

pub struct NotificationTriggers {
    store: Arc<dyn DocumentStore>,
    notifications: NotificationService,
    debouncer: Mutex<ChatDebouncer>,
    freshness: Duration,
}

impl NotificationTriggers {
    pub fn new(store: Arc<dyn DocumentStore>, debounce: Duration, freshness: Duration) -> Self {
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            debouncer: Mutex::new(ChatDebouncer::new(debounce)),
            freshness,
        }
    }

    /// Notify the project owner about a task created by someone else.
    ///
    /// Returns the number of notifications written.
    pub async fn on_task_created(&self, event: &TaskCreatedPayload) -> usize {
        let Some(project) = self.load_project(&event.project_id).await else {
            return 0;
        };
        let Some(owner) = triggers::task_created_recipient(&project, &event.creator_id) else {
            tracing::debug!(project_id = %project.project_id, "Task created by owner, no notification");
            return 0;
        };

        let (title, message) = triggers::task_created_content(&event.creator_name, &project.title);
        let mut extra = Map::new();
        extra.insert("creatorId".into(), Value::String(event.creator_id.clone()));
        if let Some(task_id) = &event.task_id {
            extra.insert("taskId".into(), Value::String(task_id.clone()));
        }

        let payload = NewNotification::for_user(notification_types::TASK_CREATED, owner, title, message)
            .with_project(project.project_id.as_str(), project.title.as_str())
            .with_extra(extra);
        self.deliver(&project, vec![payload]).await
    }

    pub async fn on_chat_message(&self, event: &ChatMessagePayload) -> usize {
        self.on_chat_message_at(event, Utc::now()).await
    }

    /// Notify every project member except the author, at most once per
    /// debounce window per project, and only for fresh messages.
    pub async fn on_chat_message_at(&self, event: &ChatMessagePayload, now: Timestamp) -> usize {
        if !triggers::is_fresh(event.authored_at, now, self.freshness) {
            tracing::debug!(
                project_id = %event.project_id,
                authored_at = %event.authored_at,
                "Chat message is stale, no notification"
            );
            return 0;
        }

        let Some(project) = self.load_project(&event.project_id).await else {
            return 0;
        };
        let recipients = triggers::chat_recipients(&project, &event.author_id);
        if recipients.is_empty() {
            return 0;
        }

        if !self.debouncer.lock().await.try_acquire(&project.project_id, now) {
            tracing::debug!(project_id = %project.project_id, "Chat notifications debounced");
            return 0;
        }

        let (title, message) = triggers::chat_message_content(&event.author_name, &project.title);
        let mut extra = Map::new();
        extra.insert("originalAuthor".into(), Value::String(event.author_id.clone()));
        extra.insert("debugTime".into(), Value::String(now.to_rfc3339()));

        let payloads = recipients
            .into_iter()
            .map(|user_id| {
                NewNotification::for_user(
                    notification_types::CHAT_MESSAGE,
                    user_id,
                    title.as_str(),
                    message.as_str(),
                )
                .with_project(project.project_id.as_str(), project.title.as_str())
                .with_extra(extra.clone())
            })
            .collect();
        self.deliver(&project, payloads).await
    }

    async fn load_project(&self, project_id: &str) -> Option<ProjectMembership> {
        match ProjectRepo::find_by_id(self.store.as_ref(), project_id).await {
            Ok(Some(project)) => Some(project),
            Ok(None) => {
                tracing::warn!(project_id, "Trigger skipped: project not found");
                None
            }
            Err(e) => {
                tracing::warn!(project_id, error = %e, "Trigger skipped: failed to load project");
                None
            }
        }
    }

    async fn deliver(&self, project: &ProjectMembership, payloads: Vec<NewNotification>) -> usize {
        let writes = payloads.iter().map(|payload| self.notifications.create(payload));
        let results = join_all(writes).await;

        let mut delivered = 0;
        for (payload, result) in payloads.iter().zip(results) {
            match result {
                Ok(_) => delivered += 1,
                Err(e) => tracing::error!(
                    project_id = %project.project_id,
                    user_id = payload.user_id.as_deref().unwrap_or_default(),
                    notification_type = %payload.notification_type,
                    error = %e,
                    "Failed to create trigger notification"
                ),
            }
        }
        delivered
    }
}

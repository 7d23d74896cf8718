//! Creation, retrieval and read-state changes for notifications.

use std::sync::Arc;

use collab_core::error::CoreError;
use collab_core::notification::{NewNotification, Notification};
use collab_core::visibility::{self, ActorRole, Presentation};
use collab_db::repositories::NotificationRepo;
use collab_db::DocumentStore;

/// A visible notification together with the actor's relation to it.
#[derive(Debug, Clone)]
pub struct InboxEntry {
    pub notification: Notification,
    pub role: ActorRole,
}

/// The listed set split the way the notification dropdown renders it.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    /// Pending collaboration requests awaiting this actor's decision.
    pub actionable: Vec<InboxEntry>,
    /// Everything else the actor may see.
    pub informational: Vec<InboxEntry>,
    /// Recipient-only unread count.
    pub unread_count: usize,
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn DocumentStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a notification of any type.
    pub async fn create(&self, payload: &NewNotification) -> Result<Notification, CoreError> {
        let kind = payload.validate()?;
        let notification =
            NotificationRepo::create(self.store.as_ref(), &kind, payload.extra.clone()).await?;
        tracing::debug!(
            notification_id = %notification.id,
            notification_type = %notification.kind.type_name(),
            recipient = %notification.kind.recipient(),
            "Notification created"
        );
        Ok(notification)
    }

    /// Every notification `user_id` may see, newest first.
    ///
    /// Store failures degrade to an empty list.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        match NotificationRepo::list_for_user(self.store.as_ref(), user_id).await {
            Ok(items) => items
                .into_iter()
                .filter(|n| visibility::is_visible(n, user_id))
                .collect(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to fetch notifications, returning none");
                Vec::new()
            }
        }
    }

    pub async fn inbox(&self, user_id: &str) -> Inbox {
        let items = self.list_for_user(user_id).await;
        let unread_count = visibility::unread_count(&items, user_id);

        let mut inbox = Inbox {
            unread_count,
            ..Default::default()
        };
        for notification in items {
            let Some(role) = visibility::role_of(&notification, user_id) else {
                continue;
            };
            let presentation = visibility::classify(&notification, user_id);
            let entry = InboxEntry { notification, role };
            match presentation {
                Some(Presentation::Actionable) => inbox.actionable.push(entry),
                Some(Presentation::Informational) => inbox.informational.push(entry),
                None => {}
            }
        }
        inbox
    }

    pub async fn unread_count(&self, user_id: &str) -> usize {
        visibility::unread_count(&self.list_for_user(user_id).await, user_id)
    }

    /// A single notification, if `user_id` may see it.
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Notification, CoreError> {
        let notification = NotificationRepo::find_by_id(self.store.as_ref(), id)
            .await?
            .ok_or_else(|| CoreError::not_found("Notification", id))?;
        if !visibility::is_visible(&notification, user_id) {
            return Err(CoreError::Forbidden(
                "You cannot view this notification".into(),
            ));
        }
        Ok(notification)
    }

    /// Set `read = true`. Idempotent; `NotFound` if the record is gone.
    pub async fn mark_read(&self, id: &str) -> Result<(), CoreError> {
        NotificationRepo::mark_read(self.store.as_ref(), id).await
    }

    /// [`mark_read`](Self::mark_read) on behalf of `actor`, who must be the
    /// recipient.
    pub async fn mark_read_by(&self, actor: &str, id: &str) -> Result<(), CoreError> {
        let notification = NotificationRepo::find_by_id(self.store.as_ref(), id)
            .await?
            .ok_or_else(|| CoreError::not_found("Notification", id))?;
        if !visibility::is_recipient(&notification, actor) {
            return Err(CoreError::Forbidden(
                "Only the recipient can mark this notification as read".into(),
            ));
        }
        if notification.read {
            return Ok(());
        }
        self.mark_read(id).await
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<usize, CoreError> {
        NotificationRepo::mark_all_read(self.store.as_ref(), user_id).await
    }
}

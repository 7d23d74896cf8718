//! Repository for the `notifications` collection.

use std::collections::HashMap;

use collab_core::error::CoreError;
use collab_core::notification::{notification_types, CollabStatus, Notification, NotificationKind};
use serde_json::{Map, Value};

use crate::collections::NOTIFICATIONS;
use crate::models::notification::{self as model, fields, NotificationRecord};
use crate::store::{Document, DocumentStore, FieldUpdate, Filter, Query};

/// Provides persistence operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Persist a validated notification with `read = false`.
    pub async fn create(
        store: &dyn DocumentStore,
        kind: &NotificationKind,
        extra: Map<String, Value>,
    ) -> Result<Notification, CoreError> {
        let body = NotificationRecord::from_kind(kind, false, extra).to_body()?;
        let doc = store.insert(NOTIFICATIONS, body).await?;
        model::decode(&doc)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<Notification>, CoreError> {
        store
            .get(NOTIFICATIONS, id)
            .await?
            .as_ref()
            .map(model::decode)
            .transpose()
    }

    /// Every notification where `user_id` is the direct recipient, the
    /// owner, or the requester, newest first.
    ///
    /// Records that fail to decode are skipped and logged.
    pub async fn list_for_user(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Vec<Notification>, CoreError> {
        let mut by_id: HashMap<String, Document> = HashMap::new();
        for field in [fields::USER_ID, fields::OWNER_ID, fields::REQUESTER_ID] {
            let query = Query::new().filter(Filter::eq(field, user_id));
            for doc in store.query(NOTIFICATIONS, &query).await? {
                by_id.insert(doc.id.clone(), doc);
            }
        }

        let mut docs: Vec<Document> = by_id.into_values().collect();
        Query::new().newest_first().finish(&mut docs);

        Ok(docs
            .iter()
            .filter_map(|doc| match model::decode(doc) {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(notification_id = %doc.id, error = %e, "Skipping malformed notification");
                    None
                }
            })
            .collect())
    }

    /// Set `read = true`. Idempotent; fails with `NotFound` if missing.
    pub async fn mark_read(store: &dyn DocumentStore, id: &str) -> Result<(), CoreError> {
        store
            .update(NOTIFICATIONS, id, &[FieldUpdate::set(fields::READ, true)])
            .await?;
        Ok(())
    }

    /// Mark every unread notification whose recipient is `user_id` as read.
    ///
    /// Returns the number of notifications changed.
    pub async fn mark_all_read(store: &dyn DocumentStore, user_id: &str) -> Result<usize, CoreError> {
        let recipient_queries = [
            Query::new()
                .filter(Filter::eq(fields::USER_ID, user_id))
                .filter(Filter::eq(fields::READ, false)),
            Query::new()
                .filter(Filter::eq(fields::TYPE, notification_types::COLLABORATION_REQUEST))
                .filter(Filter::eq(fields::OWNER_ID, user_id))
                .filter(Filter::eq(fields::READ, false)),
        ];

        let mut changed = 0;
        for query in &recipient_queries {
            for doc in store.query(NOTIFICATIONS, query).await? {
                let applied = store
                    .update_where(
                        NOTIFICATIONS,
                        &doc.id,
                        &[Filter::eq(fields::READ, false)],
                        &[FieldUpdate::set(fields::READ, true)],
                    )
                    .await?;
                if applied {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Move a collaboration request from `from` to `to` and mark it read,
    /// only if it is still in `from`.
    ///
    /// Returns `false` if another writer changed the status first.
    pub async fn transition_status(
        store: &dyn DocumentStore,
        id: &str,
        from: CollabStatus,
        to: CollabStatus,
    ) -> Result<bool, CoreError> {
        Ok(store
            .update_where(
                NOTIFICATIONS,
                id,
                &[Filter::eq(fields::STATUS, from.as_str())],
                &[
                    FieldUpdate::set(fields::STATUS, to.as_str()),
                    FieldUpdate::set(fields::READ, true),
                ],
            )
            .await?)
    }

    /// Undo a claimed transition: restore `status = to` and the previous
    /// read flag, only if the record is still in `from`.
    pub async fn revert_status(
        store: &dyn DocumentStore,
        id: &str,
        from: CollabStatus,
        to: CollabStatus,
        read: bool,
    ) -> Result<bool, CoreError> {
        Ok(store
            .update_where(
                NOTIFICATIONS,
                id,
                &[Filter::eq(fields::STATUS, from.as_str())],
                &[
                    FieldUpdate::set(fields::STATUS, to.as_str()),
                    FieldUpdate::set(fields::READ, read),
                ],
            )
            .await?)
    }

    /// A still-pending collaboration request from `requester_id` for
    /// `project_id`, if any.
    pub async fn find_pending_request(
        store: &dyn DocumentStore,
        project_id: &str,
        requester_id: &str,
    ) -> Result<Option<Notification>, CoreError> {
        let query = Query::new()
            .filter(Filter::eq(fields::TYPE, notification_types::COLLABORATION_REQUEST))
            .filter(Filter::eq(fields::PROJECT_ID, project_id))
            .filter(Filter::eq(fields::REQUESTER_ID, requester_id))
            .filter(Filter::eq(fields::STATUS, CollabStatus::Pending.as_str()))
            .limit(1);
        store
            .query(NOTIFICATIONS, &query)
            .await?
            .first()
            .map(model::decode)
            .transpose()
    }
}

//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and runs the task and
//! chat triggers for each event in its own task, so a slow or failing
//! trigger never holds up the publisher or later events.

use std::sync::Arc;

use collab_events::{event_types, ChatMessagePayload, PlatformEvent, TaskCreatedPayload};
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::notifications::triggers::NotificationTriggers;

pub struct NotificationRouter {
    triggers: Arc<NotificationTriggers>,
}

impl NotificationRouter {
    pub fn new(triggers: Arc<NotificationTriggers>) -> Self {
        Self { triggers }
    }

    /// Run the routing loop until the [`EventBus`](collab_events::EventBus)
    /// is dropped, then wait for in-flight triggers to finish.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        let mut in_flight = JoinSet::new();
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let triggers = Arc::clone(&self.triggers);
                    in_flight.spawn(async move { route_event(&triggers, &event).await });
                    while in_flight.try_join_next().is_some() {}
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
        while in_flight.join_next().await.is_some() {}
    }
}

/// Run the trigger matching `event`. Returns the number of notifications
/// written.
pub async fn route_event(triggers: &NotificationTriggers, event: &PlatformEvent) -> usize {
    match event.event_type.as_str() {
        event_types::TASK_CREATED => match event.decode_payload::<TaskCreatedPayload>() {
            Ok(payload) => triggers.on_task_created(&payload).await,
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Malformed event payload");
                0
            }
        },
        event_types::CHAT_MESSAGE => match event.decode_payload::<ChatMessagePayload>() {
            Ok(payload) => triggers.on_chat_message(&payload).await,
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Malformed event payload");
                0
            }
        },
        other => {
            tracing::trace!(event_type = other, "No notification rule for event");
            0
        }
    }
}

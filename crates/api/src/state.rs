use std::sync::Arc;

use chrono::Duration;
use collab_db::DocumentStore;
use collab_events::EventBus;

use crate::config::ServerConfig;
use crate::notifications::{CollaborationService, NotificationService, NotificationTriggers};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or is a thin
/// service handle over the shared store.
#[derive(Clone)]
pub struct AppState {
    /// Document store backing notifications and projects.
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<ServerConfig>,
    /// Event bus the task and chat hooks publish to.
    pub event_bus: Arc<EventBus>,
    pub notifications: NotificationService,
    pub collaboration: CollaborationService,
    /// Trigger rules, shared with the notification router.
    pub triggers: Arc<NotificationTriggers>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let triggers = Arc::new(NotificationTriggers::new(
            Arc::clone(&store),
            Duration::seconds(config.chat_debounce_secs),
            Duration::seconds(config.chat_freshness_secs),
        ));
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            collaboration: CollaborationService::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
            event_bus,
            triggers,
        }
    }
}

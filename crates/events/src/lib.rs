//! In-process event bus for the activity that drives notifications.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope.
//! - [`payloads`]: typed payloads for the `task.created` and
//!   `chat.message` events published by the task and chat flows.

pub mod bus;
pub mod payloads;

pub use bus::{EventBus, PlatformEvent};
pub use payloads::{ChatMessagePayload, TaskCreatedPayload};

/// Event type names.
pub mod event_types {
    pub const TASK_CREATED: &str = "task.created";
    pub const CHAT_MESSAGE: &str = "chat.message";
}

//! Notification services.
//!
//! - [`NotificationService`]: create, list, and mark notifications read.
//! - [`CollaborationService`]: the collaboration request lifecycle.
//! - [`NotificationTriggers`]: task and chat side-effect notifications.
//! - [`NotificationRouter`]: feeds bus events to the triggers.

pub mod collaboration;
pub mod router;
pub mod service;
pub mod triggers;

pub use collaboration::{CollaborationRequestInput, CollaborationService};
pub use router::NotificationRouter;
pub use service::{Inbox, InboxEntry, NotificationService};
pub use triggers::NotificationTriggers;

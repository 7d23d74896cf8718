//! Domain types and rules for project collaboration notifications.
//!
//! Everything in this crate is free of I/O so that the persistence layer,
//! the services, and the HTTP handlers share one definition of who may see
//! a notification, who may act on it, and how a collaboration request moves
//! between states.

pub mod collaboration;
pub mod error;
pub mod notification;
pub mod project;
pub mod triggers;
pub mod types;
pub mod visibility;

//! Repositories over the document store.
//!
//! Each repository is a zero-sized struct whose async methods take the
//! store as their first argument, so callers choose the backend.

pub mod notification_repo;
pub mod project_repo;

pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;

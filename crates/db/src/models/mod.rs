//! Persisted document shapes and their conversion to domain types.

pub mod notification;
pub mod project;

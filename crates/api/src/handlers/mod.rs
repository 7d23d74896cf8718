pub mod collaboration;
pub mod hooks;
pub mod notification;

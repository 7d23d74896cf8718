//! Rules for notifications emitted as side effects of task creation and
//! chat messages.
//!
//! The rules only decide *who* gets notified and *what* the notification
//! says. Writing the notifications is done by the trigger service, which
//! never lets a failure here reach the task or chat flow.

use std::collections::HashMap;

use chrono::Duration;

use crate::project::ProjectMembership;
use crate::types::{DocId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default quiet period after a chat notification burst, per project.
pub const DEFAULT_CHAT_DEBOUNCE_SECS: i64 = 120;

/// Messages older than this when the trigger runs are treated as backfill.
pub const DEFAULT_CHAT_FRESHNESS_SECS: i64 = 10;

const FALLBACK_PROJECT_TITLE: &str = "Project";
const FALLBACK_AUTHOR_NAME: &str = "Someone";

// ---------------------------------------------------------------------------
// Task-created rule
// ---------------------------------------------------------------------------

/// The owner is notified when someone else creates a task in their project.
pub fn task_created_recipient<'a>(
    project: &'a ProjectMembership,
    creator_id: &str,
) -> Option<&'a str> {
    if project.is_owner(creator_id) || project.owner_id.trim().is_empty() {
        None
    } else {
        Some(project.owner_id.as_str())
    }
}

pub fn task_created_content(creator_name: &str, project_title: &str) -> (String, String) {
    (
        format!("New task in \"{}\"", or_fallback(project_title, FALLBACK_PROJECT_TITLE)),
        format!(
            "{} created a task in the project.",
            or_fallback(creator_name, FALLBACK_AUTHOR_NAME)
        ),
    )
}

// ---------------------------------------------------------------------------
// Chat-message rule
// ---------------------------------------------------------------------------

/// Every project member except the author.
pub fn chat_recipients(project: &ProjectMembership, author_id: &str) -> Vec<UserId> {
    project
        .members()
        .into_iter()
        .filter(|id| id != author_id)
        .collect()
}

pub fn chat_message_content(author_name: &str, project_title: &str) -> (String, String) {
    (
        format!(
            "New message in \"{}\"",
            or_fallback(project_title, FALLBACK_PROJECT_TITLE)
        ),
        format!(
            "{} wrote in the project chat.",
            or_fallback(author_name, FALLBACK_AUTHOR_NAME)
        ),
    )
}

/// Returns `true` if a message authored at `authored_at` is recent enough
/// at `now` to notify about. Timestamps slightly in the future (clock skew)
/// count as fresh.
pub fn is_fresh(authored_at: Timestamp, now: Timestamp, max_age: Duration) -> bool {
    now.signed_duration_since(authored_at) < max_age
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Per-project suppression window for chat notifications.
///
/// Maps a project id to the instant until which further chat notifications
/// are suppressed. The window is fixed once opened: events inside it do not
/// extend it. State lives in memory and resets on restart.
#[derive(Debug)]
pub struct ChatDebouncer {
    window: Duration,
    suppressed_until: HashMap<DocId, Timestamp>,
}

impl ChatDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            suppressed_until: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_suppressed(&self, project_id: &str, now: Timestamp) -> bool {
        self.suppressed_until
            .get(project_id)
            .is_some_and(|until| now < *until)
    }

    /// Open a suppression window for `project_id` unless one is active.
    ///
    /// Returns `true` if the caller should emit notifications.
    pub fn try_acquire(&mut self, project_id: &str, now: Timestamp) -> bool {
        self.suppressed_until.retain(|_, until| now < *until);
        if self.suppressed_until.contains_key(project_id) {
            return false;
        }
        self.suppressed_until
            .insert(project_id.to_string(), now + self.window);
        true
    }

    /// Number of projects currently inside a suppression window.
    pub fn active_windows(&self, now: Timestamp) -> usize {
        self.suppressed_until.values().filter(|u| now < **u).count()
    }
}

impl Default for ChatDebouncer {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_CHAT_DEBOUNCE_SECS))
    }
}

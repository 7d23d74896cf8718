//! Who can see a notification, and how it should be presented to them.
//!
//! A collaboration request is visible to exactly two actors: the project
//! owner (recipient) and the requester (sender). Every other notification
//! is visible only to its single `user_id`. Only the recipient counts
//! towards the unread badge.

use serde::Serialize;

use crate::notification::Notification;

/// The relationship between an actor and a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Recipient,
    Sender,
}

/// How a visible notification is rendered for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// The recipient of a still-pending collaboration request.
    Actionable,
    /// Everything else the actor can see.
    Informational,
}

/// Returns the actor's role on `notification`, or `None` if it is invisible
/// to them.
pub fn role_of(notification: &Notification, actor: &str) -> Option<ActorRole> {
    let kind = &notification.kind;
    if kind.recipient() == actor {
        Some(ActorRole::Recipient)
    } else if kind.sender() == Some(actor) {
        Some(ActorRole::Sender)
    } else {
        None
    }
}

pub fn is_visible(notification: &Notification, actor: &str) -> bool {
    role_of(notification, actor).is_some()
}

pub fn is_recipient(notification: &Notification, actor: &str) -> bool {
    role_of(notification, actor) == Some(ActorRole::Recipient)
}

pub fn classify(notification: &Notification, actor: &str) -> Option<Presentation> {
    match role_of(notification, actor)? {
        ActorRole::Recipient if notification.is_pending_request() => Some(Presentation::Actionable),
        _ => Some(Presentation::Informational),
    }
}

/// Count of unread notifications where `actor` is the recipient.
pub fn unread_count<'a, I>(notifications: I, actor: &str) -> usize
where
    I: IntoIterator<Item = &'a Notification>,
{
    notifications
        .into_iter()
        .filter(|n| !n.read && is_recipient(n, actor))
        .count()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::notification::{CollabStatus, NewNotification, NotificationKind};

    fn build(payload: NewNotification) -> Notification {
        Notification {
            id: "N".into(),
            kind: payload.validate().unwrap(),
            read: false,
            created_at: Utc::now(),
            extra: Default::default(),
        }
    }

    fn request() -> Notification {
        build(NewNotification::collaboration_request(
            "P1",
            "Website Redesign",
            "U1",
            "U2",
            "Bob",
        ))
    }

    fn task_for(user: &str) -> Notification {
        build(
            NewNotification::for_user("task_created", user, "New task", "Carol created a task")
                .with_project("P1", "Website Redesign"),
        )
    }

    fn decide(mut n: Notification, status: CollabStatus) -> Notification {
        if let NotificationKind::CollaborationRequest(ref mut r) = n.kind {
            r.status = status;
        }
        n.read = true;
        n
    }

    #[test]
    fn collaboration_request_visible_to_owner_and_requester_only() {
        let n = request();
        assert_eq!(role_of(&n, "U1"), Some(ActorRole::Recipient));
        assert_eq!(role_of(&n, "U2"), Some(ActorRole::Sender));
        assert_eq!(role_of(&n, "U3"), None);
        assert!(!is_visible(&n, ""));
    }

    #[test]
    fn single_recipient_notification_visible_to_user_only() {
        let n = task_for("U1");
        assert!(is_visible(&n, "U1"));
        assert!(!is_visible(&n, "U2"));
        assert!(is_recipient(&n, "U1"));
    }

    #[test]
    fn no_third_actor_sees_a_record() {
        let actors = ["U1", "U2", "U3", "U4"];
        for n in [request(), task_for("U3")] {
            let seen: Vec<_> = actors.iter().filter(|a| is_visible(&n, a)).collect();
            let mut expected = vec![n.kind.recipient()];
            expected.extend(n.kind.sender());
            assert_eq!(seen.len(), expected.len());
            assert!(seen.iter().all(|a| expected.contains(a)));
        }
    }

    #[test]
    fn pending_request_is_actionable_only_for_recipient() {
        let n = request();
        assert_eq!(classify(&n, "U1"), Some(Presentation::Actionable));
        assert_eq!(classify(&n, "U2"), Some(Presentation::Informational));
        assert_eq!(classify(&n, "U3"), None);

        let decided = decide(request(), CollabStatus::Accepted);
        assert_eq!(classify(&decided, "U1"), Some(Presentation::Informational));
    }

    #[test]
    fn unread_count_ignores_sender_side() {
        let read_task = {
            let mut t = task_for("U2");
            t.read = true;
            t
        };
        let all = vec![request(), request(), task_for("U2"), read_task, task_for("U1")];

        // U1 receives both pending requests plus one task.
        assert_eq!(unread_count(&all, "U1"), 3);
        // U2 only counts the unread task addressed to them, not the requests they sent.
        assert_eq!(unread_count(&all, "U2"), 1);
        assert_eq!(unread_count(&all, "U3"), 0);
    }
}

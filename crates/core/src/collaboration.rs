//! Collaboration request state machine rules.
//!
//! These checks decide whether a request may be created and whether a
//! decision may be applied. Persisting the outcome (and keeping project
//! membership consistent with it) is the service layer's job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::notification::{CollabStatus, CollaborationRequest, Notification};
use crate::project::ProjectMembership;

/// The owner's answer to a pending collaboration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> CollabStatus {
        match self {
            Self::Accept => CollabStatus::Accepted,
            Self::Reject => CollabStatus::Rejected,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

/// Check that `actor` may apply `decision` to `notification` right now.
///
/// Order matters: a non-request is rejected first, then a non-owner, then a
/// request that already left `Pending`.
pub fn authorize_decision<'a>(
    notification: &'a Notification,
    actor: &str,
    decision: Decision,
) -> Result<&'a CollaborationRequest, CoreError> {
    let request = notification.kind.as_collaboration_request().ok_or_else(|| {
        CoreError::Validation(format!(
            "Notification {} is not a collaboration request",
            notification.id
        ))
    })?;

    if request.owner_id != actor {
        return Err(CoreError::Forbidden(
            "Only the project owner can answer a collaboration request".into(),
        ));
    }

    if !request.status.can_transition_to(decision.target_status()) {
        return Err(CoreError::InvalidState(format!(
            "Cannot {} a collaboration request that is already {}",
            decision.as_str(),
            request.status
        )));
    }

    Ok(request)
}

/// Outcome of checking whether a requester can be added to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// The requester is not yet a member and will be added.
    Add,
    /// The requester already collaborates; the union is a no-op.
    AlreadyCollaborator,
}

/// Check the ownership invariant guarded on accept.
///
/// The owner can never be added as their own collaborator. An existing
/// collaborator is not an error: the membership union is idempotent.
pub fn check_membership_change(
    project: &ProjectMembership,
    requester_id: &str,
) -> Result<MembershipChange, CoreError> {
    if project.is_owner(requester_id) {
        return Err(CoreError::Conflict(
            "The project owner cannot be added as a collaborator".into(),
        ));
    }
    if project.is_collaborator(requester_id) {
        return Ok(MembershipChange::AlreadyCollaborator);
    }
    Ok(MembershipChange::Add)
}

/// Check that a new collaboration request for `project` from `requester_id`
/// is allowed.
///
/// `has_pending` is whether the requester already has a pending request
/// for the same project.
pub fn check_new_request(
    project: &ProjectMembership,
    owner_id: &str,
    requester_id: &str,
    has_pending: bool,
) -> Result<(), CoreError> {
    if !project.is_owner(owner_id) {
        return Err(CoreError::Validation(format!(
            "User {owner_id} does not own project {}",
            project.project_id
        )));
    }
    if project.is_owner(requester_id) {
        return Err(CoreError::Conflict(
            "You already own this project".into(),
        ));
    }
    if project.is_collaborator(requester_id) {
        return Err(CoreError::Conflict(
            "You already collaborate on this project".into(),
        ));
    }
    if has_pending {
        return Err(CoreError::Conflict(
            "A collaboration request for this project is already pending".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::notification::{NewNotification, NotificationKind};

    fn request_with(status: CollabStatus) -> Notification {
        let mut kind = NewNotification::collaboration_request("P1", "Website Redesign", "U1", "U2", "Bob")
            .validate()
            .unwrap();
        if let NotificationKind::CollaborationRequest(ref mut r) = kind {
            r.status = status;
        }
        Notification {
            id: "N1".into(),
            kind,
            read: status.is_terminal(),
            created_at: Utc::now(),
            extra: Default::default(),
        }
    }

    fn project(collaborators: &[&str]) -> ProjectMembership {
        ProjectMembership {
            project_id: "P1".into(),
            owner_id: "U1".into(),
            title: "Website Redesign".into(),
            collaborators: collaborators.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn owner_may_decide_pending_request() {
        let n = request_with(CollabStatus::Pending);
        for decision in [Decision::Accept, Decision::Reject] {
            let r = authorize_decision(&n, "U1", decision).unwrap();
            assert_eq!(r.requester_id, "U2");
        }
    }

    #[test]
    fn requester_and_strangers_are_forbidden() {
        let n = request_with(CollabStatus::Pending);
        assert_matches!(
            authorize_decision(&n, "U2", Decision::Accept),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            authorize_decision(&n, "U3", Decision::Reject),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn decided_request_cannot_be_decided_again() {
        for status in [CollabStatus::Accepted, CollabStatus::Rejected] {
            let n = request_with(status);
            for decision in [Decision::Accept, Decision::Reject] {
                assert_matches!(
                    authorize_decision(&n, "U1", decision),
                    Err(CoreError::InvalidState(_))
                );
            }
        }
    }

    #[test]
    fn only_collaboration_requests_take_decisions() {
        let n = Notification {
            id: "N2".into(),
            kind: NewNotification::for_user("task_created", "U1", "t", "m")
                .with_project("P1", "Site")
                .validate()
                .unwrap(),
            read: false,
            created_at: Utc::now(),
            extra: Default::default(),
        };
        assert_matches!(
            authorize_decision(&n, "U1", Decision::Accept),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn membership_change_guards_owner() {
        assert_matches!(
            check_membership_change(&project(&[]), "U1"),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(
            check_membership_change(&project(&["U2"]), "U2").unwrap(),
            MembershipChange::AlreadyCollaborator
        );
        assert_eq!(
            check_membership_change(&project(&["U3"]), "U2").unwrap(),
            MembershipChange::Add
        );
    }

    #[test]
    fn new_request_rules() {
        assert!(check_new_request(&project(&[]), "U1", "U2", false).is_ok());
        assert_matches!(
            check_new_request(&project(&[]), "U9", "U2", false),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            check_new_request(&project(&[]), "U1", "U1", false),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            check_new_request(&project(&["U2"]), "U1", "U2", false),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            check_new_request(&project(&[]), "U1", "U2", true),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn decisions_map_to_terminal_states() {
        assert_eq!(Decision::Accept.target_status(), CollabStatus::Accepted);
        assert_eq!(Decision::Reject.target_status(), CollabStatus::Rejected);
    }
}

//! Read-only view of a project's membership.
//!
//! Projects are owned by the project/task CRUD layer; this crate only needs
//! to know who owns a project and who collaborates on it.

use crate::types::{DocId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMembership {
    pub project_id: DocId,
    pub owner_id: UserId,
    pub title: String,
    pub collaborators: Vec<UserId>,
}

impl ProjectMembership {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.iter().any(|c| c == user_id)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.is_owner(user_id) || self.is_collaborator(user_id)
    }

    /// Owner first, then collaborators in stored order, without duplicates
    /// or blank ids.
    pub fn members(&self) -> Vec<UserId> {
        let mut members: Vec<UserId> = Vec::with_capacity(self.collaborators.len() + 1);
        for id in std::iter::once(&self.owner_id).chain(self.collaborators.iter()) {
            if !id.trim().is_empty() && !members.contains(id) {
                members.push(id.clone());
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectMembership {
        ProjectMembership {
            project_id: "P1".into(),
            owner_id: "U1".into(),
            title: "Website Redesign".into(),
            collaborators: vec!["U2".into(), "".into(), "U3".into(), "U2".into(), "U1".into()],
        }
    }

    #[test]
    fn members_are_deduplicated_owner_first() {
        assert_eq!(project().members(), vec!["U1", "U2", "U3"]);
    }

    #[test]
    fn membership_checks() {
        let p = project();
        assert!(p.is_owner("U1"));
        assert!(!p.is_owner("U2"));
        assert!(p.is_collaborator("U3"));
        assert!(p.is_member("U1"));
        assert!(!p.is_member("U9"));
    }
}

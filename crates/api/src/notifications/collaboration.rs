//! Collaboration request lifecycle: submit, accept, reject, and removal of
//! collaborators.
//!
//! Accept touches two documents. The notification's status change is
//! claimed first with a compare-and-set on `status == pending`; only the
//! winner of that claim adds the requester to the project. If the union
//! fails, the claim is reverted so the request is visibly pending again.

use std::sync::Arc;

use collab_core::collaboration::{self, Decision, MembershipChange};
use collab_core::error::CoreError;
use collab_core::notification::{CollabStatus, NewNotification, Notification};
use collab_db::repositories::{NotificationRepo, ProjectRepo};
use collab_db::DocumentStore;

/// Input of a new collaboration request.
#[derive(Debug, Clone)]
pub struct CollaborationRequestInput {
    pub project_id: String,
    /// Falls back to the stored project title when blank.
    pub project_title: String,
    pub owner_id: String,
    pub requester_id: String,
    pub requester_name: String,
}

#[derive(Clone)]
pub struct CollaborationService {
    store: Arc<dyn DocumentStore>,
}

impl CollaborationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Submit a pending collaboration request to the project owner.
    ///
    /// Fails with `Conflict` if the requester already owns or collaborates
    /// on the project or already has a pending request for it.
    pub async fn request(&self, input: CollaborationRequestInput) -> Result<Notification, CoreError> {
        let mut payload = NewNotification::collaboration_request(
            input.project_id.as_str(),
            input.project_title.as_str(),
            input.owner_id.as_str(),
            input.requester_id.as_str(),
            input.requester_name.as_str(),
        );
        let kind = payload.validate()?;

        let project = ProjectRepo::find_by_id(self.store(), &input.project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", input.project_id.as_str()))?;

        let has_pending =
            NotificationRepo::find_pending_request(self.store(), &project.project_id, &input.requester_id)
                .await?
                .is_some();
        collaboration::check_new_request(&project, &input.owner_id, &input.requester_id, has_pending)?;

        let kind = if input.project_title.trim().is_empty() {
            payload.project_title = Some(project.title.clone());
            payload.validate()?
        } else {
            kind
        };

        let notification = NotificationRepo::create(self.store(), &kind, Default::default()).await?;
        tracing::info!(
            notification_id = %notification.id,
            project_id = %project.project_id,
            requester_id = %input.requester_id,
            "Collaboration request submitted"
        );
        Ok(notification)
    }

    /// Accept a pending request: the requester joins the project and the
    /// request becomes `accepted` and read.
    pub async fn accept(&self, actor: &str, notification_id: &str) -> Result<Notification, CoreError> {
        let notification = self.load(notification_id).await?;
        let request = collaboration::authorize_decision(&notification, actor, Decision::Accept)?;

        let project = ProjectRepo::find_by_id(self.store(), &request.project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", request.project_id.as_str()))?;
        let change = collaboration::check_membership_change(&project, &request.requester_id)?;

        self.claim(&notification, Decision::Accept).await?;

        if let Err(e) =
            ProjectRepo::add_collaborator(self.store(), &project.project_id, &request.requester_id)
                .await
        {
            tracing::error!(
                notification_id = %notification.id,
                project_id = %project.project_id,
                user_id = %request.requester_id,
                error = %e,
                "Adding collaborator failed, reverting accept"
            );
            self.revert(&notification, Decision::Accept).await;
            return Err(e);
        }

        tracing::info!(
            notification_id = %notification.id,
            project_id = %project.project_id,
            user_id = %request.requester_id,
            already_member = change == MembershipChange::AlreadyCollaborator,
            "Collaboration request accepted"
        );
        self.load(notification_id).await
    }

    /// Reject a pending request. Project membership is untouched.
    pub async fn reject(&self, actor: &str, notification_id: &str) -> Result<Notification, CoreError> {
        let notification = self.load(notification_id).await?;
        collaboration::authorize_decision(&notification, actor, Decision::Reject)?;
        self.claim(&notification, Decision::Reject).await?;

        tracing::info!(notification_id = %notification.id, "Collaboration request rejected");
        self.load(notification_id).await
    }

    /// Remove `user_id` from the project's collaborators. Allowed for the
    /// owner and for a collaborator leaving on their own.
    pub async fn remove_collaborator(
        &self,
        actor: &str,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), CoreError> {
        let project = ProjectRepo::find_by_id(self.store(), project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;

        if !project.is_owner(actor) && actor != user_id {
            return Err(CoreError::Forbidden(
                "Only the project owner can remove collaborators".into(),
            ));
        }
        if project.is_owner(user_id) {
            return Err(CoreError::Validation(
                "The project owner cannot be removed".into(),
            ));
        }

        ProjectRepo::remove_collaborator(self.store(), project_id, user_id).await?;
        tracing::info!(project_id, user_id, actor, "Collaborator removed");
        Ok(())
    }

    async fn load(&self, notification_id: &str) -> Result<Notification, CoreError> {
        NotificationRepo::find_by_id(self.store(), notification_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Notification", notification_id))
    }

    /// Compare-and-set `pending -> target`. Losing the race to a concurrent
    /// decision is reported as `InvalidState`.
    async fn claim(&self, notification: &Notification, decision: Decision) -> Result<(), CoreError> {
        let target = decision.target_status();
        let claimed = NotificationRepo::transition_status(
            self.store(),
            &notification.id,
            CollabStatus::Pending,
            target,
        )
        .await?;
        if !claimed {
            return Err(CoreError::InvalidState(format!(
                "Cannot {} a collaboration request that is no longer pending",
                decision.as_str()
            )));
        }
        Ok(())
    }

    async fn revert(&self, notification: &Notification, decision: Decision) {
        let result = NotificationRepo::revert_status(
            self.store(),
            &notification.id,
            decision.target_status(),
            CollabStatus::Pending,
            notification.read,
        )
        .await;
        if let Err(e) = result {
            tracing::error!(
                notification_id = %notification.id,
                error = %e,
                "Failed to revert collaboration request to pending"
            );
        }
    }
}

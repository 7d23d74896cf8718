//! Repository for the `projects` collection.
//!
//! Membership changes go through the store's atomic array union/remove;
//! the `collaborators` array is never rewritten wholesale.

use collab_core::error::CoreError;
use collab_core::project::ProjectMembership;

use crate::collections::PROJECTS;
use crate::models::project::{self as model, fields, ProjectRecord};
use crate::store::{encode, DocumentStore, FieldUpdate};

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        store: &dyn DocumentStore,
        record: &ProjectRecord,
    ) -> Result<ProjectMembership, CoreError> {
        let doc = store.insert(PROJECTS, encode(record)?).await?;
        Ok(model::decode(&doc)?)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<ProjectMembership>, CoreError> {
        match store.get(PROJECTS, id).await? {
            Some(doc) => Ok(Some(model::decode(&doc)?)),
            None => Ok(None),
        }
    }

    /// Add `user_id` to the collaborators set. Adding an existing member is
    /// a no-op. Fails with `NotFound` if the project is gone.
    pub async fn add_collaborator(
        store: &dyn DocumentStore,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), CoreError> {
        store
            .update(
                PROJECTS,
                project_id,
                &[
                    FieldUpdate::array_union(fields::COLLABORATORS, user_id),
                    FieldUpdate::server_timestamp(fields::UPDATED_AT),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn remove_collaborator(
        store: &dyn DocumentStore,
        project_id: &str,
        user_id: &str,
    ) -> Result<(), CoreError> {
        store
            .update(
                PROJECTS,
                project_id,
                &[
                    FieldUpdate::array_remove(fields::COLLABORATORS, user_id),
                    FieldUpdate::server_timestamp(fields::UPDATED_AT),
                ],
            )
            .await?;
        Ok(())
    }
}

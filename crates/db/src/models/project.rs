//! Project document model. Projects are owned by the project CRUD flow;
//! this crate only reads them and changes their `collaborators` array.

use collab_core::project::ProjectMembership;
use serde::{Deserialize, Serialize};

use crate::store::Document;

pub mod fields {
    pub const OWNER_ID: &str = "ownerId";
    pub const COLLABORATORS: &str = "collaborators";
    pub const UPDATED_AT: &str = "updatedAt";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub owner_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ProjectRecord {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn into_membership(self, project_id: impl Into<String>) -> ProjectMembership {
        ProjectMembership {
            project_id: project_id.into(),
            owner_id: self.owner_id,
            title: self.title,
            collaborators: self.collaborators,
        }
    }
}

/// Decode a stored project document into its membership view.
pub fn decode(doc: &Document) -> Result<ProjectMembership, crate::StoreError> {
    let record: ProjectRecord = doc.decode()?;
    Ok(record.into_membership(doc.id.clone()))
}

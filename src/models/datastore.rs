//! Datastore snapshot model.

use serde::{Deserialize, Serialize};

use super::{CreateMemberRequest, CreateTaskRequest, Task, TeamMember};

/// Full snapshot of the state store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub members: Vec<TeamMember>,
    pub tasks: Vec<Task>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// Roster seed file loaded into an empty database at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub members: Vec<CreateMemberRequest>,
    #[serde(default)]
    pub tasks: Vec<CreateTaskRequest>,
}

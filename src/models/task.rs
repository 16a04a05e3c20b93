//! At-risk task model and its status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    P0,
    P1,
    P2,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "P0" => Some(Priority::P0),
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            _ => None,
        }
    }
}

/// Coverage status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    AtRisk,
    Unassigned,
    Covered,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::AtRisk => "at-risk",
            TaskStatus::Unassigned => "unassigned",
            TaskStatus::Covered => "covered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "at-risk" => Some(TaskStatus::AtRisk),
            "unassigned" => Some(TaskStatus::Unassigned),
            "covered" => Some(TaskStatus::Covered),
            _ => None,
        }
    }

    /// Transitions accepted by a plain status write.
    ///
    /// `covered -> at-risk` is never engine-driven. Reaching `covered` through a
    /// status write additionally requires an assignee, which the caller checks.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Unassigned, AtRisk) | (AtRisk, Covered) | (AtRisk, Unassigned) | (Covered, Unassigned)
        ) || self == next
    }
}

/// A work item that may need coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    pub assignee_id: Option<String>,
    pub status: TaskStatus,
    /// Set on unassign; cleared once skill scores are written or the task is reassigned.
    pub needs_rescoring: bool,
    /// Derived on request, never stored.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

/// Request body for creating a task (upstream task source).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default = "default_task_status")]
    pub status: TaskStatus,
}

fn default_task_status() -> TaskStatus {
    TaskStatus::AtRisk
}

/// Request body for a task status write. Parsed by the handler so that an
/// unknown value surfaces as `INVALID_STATUS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusRequest {
    pub status: String,
}

/// Request body for reassigning a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignRequest {
    pub member_id: String,
}

/// One externally computed skill score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScore {
    pub member_id: String,
    pub skill_match_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_reason: Option<String>,
}

/// Request body for writing skill scores for a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScoresRequest {
    pub scores: Vec<SkillScore>,
}

/// A ranked coverage candidate. Recomputed on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub member_id: String,
    pub member_name: String,
    pub skill_match_pct: f64,
    pub calendar_free_pct: f64,
    pub combined_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_reason: Option<String>,
}

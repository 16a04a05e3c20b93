//! Task status state machine.

use crate::errors::AppError;
use crate::models::{Task, TaskStatus};

/// Apply a plain status write. Returns `false` when the task already had `next`.
pub fn set_status(task: &mut Task, next: TaskStatus) -> Result<bool, AppError> {
    if task.status == next {
        return Ok(false);
    }
    if !task.status.can_transition_to(next) {
        return Err(AppError::InvalidStatus(format!(
            "Task {} cannot move from {} to {}",
            task.id,
            task.status.as_str(),
            next.as_str()
        )));
    }
    match next {
        TaskStatus::Unassigned => unassign(task),
        TaskStatus::Covered if task.assignee_id.is_none() => {
            return Err(AppError::InvalidStatus(format!(
                "Task {} has no assignee; reassign it instead",
                task.id
            )));
        }
        TaskStatus::Covered => {
            task.status = next;
            task.needs_rescoring = false;
        }
        TaskStatus::AtRisk => task.status = next,
    }
    Ok(true)
}

/// Hand the task to `member_id`; the task is resolved and needs no scoring.
pub fn reassign(task: &mut Task, member_id: &str) {
    task.assignee_id = Some(member_id.to_string());
    task.status = TaskStatus::Covered;
    task.needs_rescoring = false;
}

/// Re-open the task; its candidates must be scored again.
pub fn unassign(task: &mut Task) {
    task.assignee_id = None;
    task.status = TaskStatus::Unassigned;
    task.needs_rescoring = true;
}

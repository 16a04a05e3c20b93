//! Task API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateTaskRequest, ReassignRequest, SkillScoresRequest, Suggestion, Task, TaskStatus,
    TaskStatusRequest,
};
use crate::AppState;

/// GET /api/tasks - List all tasks ordered by deadline.
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_tasks().await {
        Ok(tasks) => success(tasks, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/tasks/:id - Get a task with its current coverage suggestions.
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut task = match state.repo.get_task(&id).await {
        Ok(Some(task)) => task,
        Ok(None) => return error(AppError::task_not_found(&id), revision_id),
        Err(e) => return error(e, revision_id),
    };

    match state.engine.ranked_suggestions(&id).await {
        Ok(suggestions) => {
            task.suggestions = suggestions;
            success(task, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/tasks - Create a task from the upstream task source.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Task title is required".to_string()),
            revision_id,
        );
    }
    if request.status == TaskStatus::Covered && request.assignee_id.is_none() {
        return error(
            AppError::Validation("A covered task needs an assignee".to_string()),
            revision_id,
        );
    }

    match state.repo.create_task(&request).await {
        Ok(task) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(task, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/tasks/:id/status - Move a task through its lifecycle.
pub async fn set_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TaskStatusRequest>,
) -> ApiResult<Task> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.set_task_status(&id, &request.status).await {
        Ok(task) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(task, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/tasks/:id/unassign - Drop the assignee and flag for re-scoring.
pub async fn unassign_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.unassign_task(&id).await {
        Ok(task) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(task, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/tasks/:id/reassign - Hand the task to another member.
pub async fn reassign_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReassignRequest>,
) -> ApiResult<Task> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.reassign_task(&id, &request.member_id).await {
        Ok(task) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(task, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/tasks/:id/suggestions - Ranked coverage candidates.
pub async fn get_suggestions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Suggestion>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.ranked_suggestions(&id).await {
        Ok(suggestions) => success(suggestions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/tasks/:id/scores - Record skill scores from the external scorer.
pub async fn put_skill_scores(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SkillScoresRequest>,
) -> ApiResult<Vec<Suggestion>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(bad) = request
        .scores
        .iter()
        .find(|s| !(0.0..=100.0).contains(&s.skill_match_pct))
    {
        return error(
            AppError::Validation(format!(
                "skillMatchPct for {} must be between 0 and 100",
                bad.member_id
            )),
            revision_id,
        );
    }

    if let Err(e) = state.repo.upsert_skill_scores(&id, &request.scores).await {
        return error(e, revision_id);
    }

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    match state.engine.ranked_suggestions(&id).await {
        Ok(suggestions) => success(suggestions, new_revision),
        Err(e) => error(e, new_revision),
    }
}

//! Member API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    valid_calendar_pct, CalendarBatchRequest, CalendarUpdateRequest, CreateMemberRequest,
    OverrideRequest, TeamMember,
};
use crate::AppState;

/// GET /api/members - List all members, sweeping expired windows first.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    // Read the revision after the sweep, which may have written
    let members = state.engine.members(Utc::now()).await;
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match members {
        Ok(members) => success(members, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_member(&id).await {
        Ok(Some(member)) => success(member, revision_id),
        Ok(None) => error(AppError::member_not_found(&id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/members - Add a member to the roster.
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Member name is required".to_string()),
            revision_id,
        );
    }
    if !valid_calendar_pct(request.calendar_free_pct) {
        return error(
            AppError::Validation("calendarFreePct must be between 0 and 100".to_string()),
            revision_id,
        );
    }

    match state.repo.create_member(&request).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/members/:id/override - Pin availability by hand.
pub async fn set_override(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.set_override(&id, &request.status).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/members/:id/override - Release a manual override.
pub async fn clear_override(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.clear_override(&id).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/members/:id/calendar - Store one member's calendar free percentage.
pub async fn set_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CalendarUpdateRequest>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if !valid_calendar_pct(request.calendar_free_pct) {
        return error(
            AppError::Validation("calendarFreePct must be between 0 and 100".to_string()),
            revision_id,
        );
    }

    match state
        .repo
        .set_calendar_free_pct(&id, request.calendar_free_pct)
        .await
    {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/calendar - Batch calendar import.
pub async fn batch_calendar(
    State(state): State<AppState>,
    Json(request): Json<CalendarBatchRequest>,
) -> ApiResult<Vec<TeamMember>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(bad) = request
        .entries
        .iter()
        .find(|e| !valid_calendar_pct(e.calendar_free_pct))
    {
        return error(
            AppError::Validation(format!(
                "calendarFreePct for {} must be between 0 and 100",
                bad.member_id
            )),
            revision_id,
        );
    }

    if request.entries.is_empty() {
        return success(Vec::new(), revision_id);
    }

    match state.repo.batch_set_calendar(&request.entries).await {
        Ok(members) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            tracing::info!("Calendar import updated {} members", members.len());
            success(members, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

//! Reconciliation API endpoints: chat sync, direct announcements and sweeps.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::ingest::announcement_from_request;
use crate::models::{ApplyAnnouncementsRequest, StructuredAnnouncement, SweepReport, SyncResult};
use crate::AppState;

/// Sync query parameters.
#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    /// Lookback window in hours (default: 24).
    #[serde(default = "default_hours")]
    pub hours: u32,
    /// Maximum number of messages to fetch (default: 100).
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_hours() -> u32 {
    24
}

fn default_limit() -> u32 {
    100
}

/// Longest lookback a sync accepts: 30 days.
const MAX_LOOKBACK_HOURS: u32 = 720;

/// Most messages a single sync fetches.
const MAX_SYNC_LIMIT: u32 = 999;

/// POST /api/sync - Pull recent chat messages and reconcile availability.
pub async fn sync_now(
    State(state): State<AppState>,
    Query(params): Query<SyncQuery>,
) -> ApiResult<SyncResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if !(1..=MAX_LOOKBACK_HOURS).contains(&params.hours) {
        return error(
            AppError::Validation(format!(
                "hours must be between 1 and {}",
                MAX_LOOKBACK_HOURS
            )),
            revision_id,
        );
    }
    if !(1..=MAX_SYNC_LIMIT).contains(&params.limit) {
        return error(
            AppError::Validation(format!("limit must be between 1 and {}", MAX_SYNC_LIMIT)),
            revision_id,
        );
    }

    let pass = state.engine.sync_now(
        state.source.as_ref(),
        state.classifier.as_ref(),
        params.hours,
        params.limit,
    );

    match tokio::time::timeout(state.config.sync_timeout, pass).await {
        Ok(Ok(result)) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(result, new_revision)
        }
        Ok(Err(e)) => error(e, revision_id),
        Err(_) => {
            tracing::warn!(
                "Sync exceeded {:?}, pass abandoned before commit",
                state.config.sync_timeout
            );
            error(
                AppError::Timeout(format!(
                    "Sync did not finish within {}s",
                    state.config.sync_timeout.as_secs()
                )),
                revision_id,
            )
        }
    }
}

/// POST /api/announcements - Reconcile already-structured announcements.
pub async fn apply_announcements(
    State(state): State<AppState>,
    Json(request): Json<ApplyAnnouncementsRequest>,
) -> ApiResult<SyncResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let announcements: Vec<StructuredAnnouncement> = match request
        .announcements
        .iter()
        .map(announcement_from_request)
        .collect::<Result<_, _>>()
    {
        Ok(announcements) => announcements,
        Err(e) => return error(e, revision_id),
    };

    match state
        .engine
        .apply_announcements(&announcements, Utc::now())
        .await
    {
        Ok(result) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(result, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sweep - Run the expiry and activation sweep now.
pub async fn run_sweep(State(state): State<AppState>) -> ApiResult<SweepReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.engine.sweep(Utc::now()).await {
        Ok(report) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(report, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

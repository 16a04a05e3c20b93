//! Availability reconciliation and coverage ranking.
//!
//! The pure rules live in the submodules; [`Engine`] runs them against the
//! repository. Reconciliation passes and sweeps are serialized through one
//! async mutex, while reads go straight to the database and never wait on it.

pub mod matcher;
pub mod normalizer;
pub mod reconcile;
pub mod scorer;
pub mod tasks;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::db::Repository;
use crate::errors::AppError;
use crate::ingest::{Classifier, MessageSource};
use crate::models::{
    Availability, StructuredAnnouncement, Suggestion, SweepReport, SyncResult, Task, TaskStatus,
    TeamMember,
};

/// Orchestrates reconciliation, sweeps, ranking and task lifecycle writes.
pub struct Engine {
    repo: Arc<Repository>,
    sync_lock: Mutex<()>,
}

impl Engine {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            sync_lock: Mutex::new(()),
        }
    }

    /// Fetch recent messages, classify them and apply the resulting announcements.
    ///
    /// A message the classifier cannot handle is logged and dropped; it counts
    /// as scanned but not detected. The pass clock is read once classification
    /// is done.
    pub async fn sync_now(
        &self,
        source: &dyn MessageSource,
        classifier: &dyn Classifier,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<SyncResult, AppError> {
        let messages = source.fetch_raw_messages(lookback_hours, limit).await?;
        tracing::info!(
            "Fetched {} messages from the last {}h",
            messages.len(),
            lookback_hours
        );

        let mut announcements = Vec::new();
        for message in &messages {
            if message.text.trim().is_empty() {
                continue;
            }
            match classifier.classify(message).await {
                Ok(Some(announcement)) => announcements.push(announcement),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    "Skipping message from {} sent at {}: {}",
                    message.sender,
                    message.sent_at,
                    e
                ),
            }
        }

        self.reconcile(&announcements, messages.len(), Utc::now()).await
    }

    /// Apply structured announcements as one atomic pass, sweeping first.
    pub async fn apply_announcements(
        &self,
        announcements: &[StructuredAnnouncement],
        now: DateTime<Utc>,
    ) -> Result<SyncResult, AppError> {
        self.reconcile(announcements, announcements.len(), now).await
    }

    async fn reconcile(
        &self,
        announcements: &[StructuredAnnouncement],
        scanned: usize,
        now: DateTime<Utc>,
    ) -> Result<SyncResult, AppError> {
        let _guard = self.sync_lock.lock().await;

        let mut roster = self.repo.list_members().await?;
        let before = roster.clone();

        let mut sweep = reconcile::sweep(&mut roster, now);
        let mut result = reconcile::apply_announcements(announcements, &mut roster, now);
        result.scanned = scanned;

        let touched: HashSet<&str> = sweep
            .restored
            .iter()
            .chain(sweep.activated.iter())
            .chain(result.changes.iter().map(|c| &c.member_id))
            .map(String::as_str)
            .collect();
        let dirty = changed_members(&before, &roster, &touched);

        let refused = self.repo.commit_automated_updates(&dirty).await?;
        drop_refused(&mut sweep, &refused);
        demote_refused(&mut result, &refused);

        log_sweep(&sweep, &refused);
        tracing::info!(
            "Reconciliation pass: scanned={} detected={} applied={} skipped={}",
            result.scanned,
            result.detected,
            result.applied,
            result.skipped
        );
        Ok(result)
    }

    /// Restore expired Slack windows and activate pending ones.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let _guard = self.sync_lock.lock().await;
        self.sweep_locked(now).await
    }

    /// Sweep unless a pass is already running; that pass sweeps on its own.
    pub async fn try_sweep(&self, now: DateTime<Utc>) -> Result<Option<SweepReport>, AppError> {
        let Ok(_guard) = self.sync_lock.try_lock() else {
            tracing::debug!("Reconciliation in progress, skipping read-time sweep");
            return Ok(None);
        };
        self.sweep_locked(now).await.map(Some)
    }

    async fn sweep_locked(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let mut roster = self.repo.list_members().await?;
        let before = roster.clone();

        let mut report = reconcile::sweep(&mut roster, now);
        if report.is_empty() {
            return Ok(report);
        }

        let touched: HashSet<&str> = report
            .restored
            .iter()
            .chain(report.activated.iter())
            .map(String::as_str)
            .collect();
        let dirty = changed_members(&before, &roster, &touched);
        let refused = self.repo.commit_automated_updates(&dirty).await?;

        drop_refused(&mut report, &refused);
        log_sweep(&report, &refused);
        Ok(report)
    }

    /// Members with expiry already reconciled.
    pub async fn members(&self, now: DateTime<Utc>) -> Result<Vec<TeamMember>, AppError> {
        self.try_sweep(now).await?;
        self.repo.list_members().await
    }

    /// Ranked coverage suggestions for a task, computed from current state.
    pub async fn ranked_suggestions(&self, task_id: &str) -> Result<Vec<Suggestion>, AppError> {
        let task = self
            .repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::task_not_found(task_id))?;
        let roster = self.repo.list_members().await?;
        let scores = self.repo.list_skill_scores(task_id).await?;

        let candidates = scorer::candidates_for(&task, &roster);
        Ok(scorer::rank(&candidates, &scores))
    }

    /// Set a manual override from a raw status value.
    pub async fn set_override(&self, member_id: &str, status: &str) -> Result<TeamMember, AppError> {
        let availability = Availability::from_str(status).ok_or_else(|| {
            AppError::InvalidStatus(format!(
                "Unknown availability {:?}; expected available, partial or ooo",
                status
            ))
        })?;
        let member = self.repo.set_override(member_id, availability).await?;
        tracing::info!("Manual override on {}: {}", member_id, availability.as_str());
        Ok(member)
    }

    pub async fn clear_override(&self, member_id: &str) -> Result<TeamMember, AppError> {
        let member = self.repo.clear_override(member_id).await?;
        tracing::info!("Manual override cleared on {}", member_id);
        Ok(member)
    }

    /// Write a task status from a raw value, enforcing the lifecycle.
    pub async fn set_task_status(&self, task_id: &str, status: &str) -> Result<Task, AppError> {
        let next = TaskStatus::from_str(status).ok_or_else(|| {
            AppError::InvalidStatus(format!(
                "Unknown task status {:?}; expected at-risk, unassigned or covered",
                status
            ))
        })?;
        let mut task = self.load_task(task_id).await?;
        if !tasks::set_status(&mut task, next)? {
            return Ok(task);
        }
        self.repo.save_task_state(&task).await
    }

    pub async fn reassign_task(&self, task_id: &str, member_id: &str) -> Result<Task, AppError> {
        let mut task = self.load_task(task_id).await?;
        if self.repo.get_member(member_id).await?.is_none() {
            return Err(AppError::member_not_found(member_id));
        }
        tasks::reassign(&mut task, member_id);
        let saved = self.repo.save_task_state(&task).await?;
        tracing::info!("Task {} reassigned to {}", task_id, member_id);
        Ok(saved)
    }

    pub async fn unassign_task(&self, task_id: &str) -> Result<Task, AppError> {
        let mut task = self.load_task(task_id).await?;
        tasks::unassign(&mut task);
        let saved = self.repo.save_task_state(&task).await?;
        tracing::info!("Task {} unassigned, awaiting re-scoring", task_id);
        Ok(saved)
    }

    async fn load_task(&self, task_id: &str) -> Result<Task, AppError> {
        self.repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::task_not_found(task_id))
    }
}

/// Members in `touched` whose state differs from the snapshot.
fn changed_members(
    before: &[TeamMember],
    after: &[TeamMember],
    touched: &HashSet<&str>,
) -> Vec<TeamMember> {
    let previous: HashMap<&str, &TeamMember> =
        before.iter().map(|m| (m.id.as_str(), m)).collect();
    after
        .iter()
        .filter(|m| touched.contains(m.id.as_str()))
        .filter(|m| previous.get(m.id.as_str()).map_or(true, |p| *p != *m))
        .cloned()
        .collect()
}

/// Move changes refused at commit time from `applied` to `skipped`.
fn demote_refused(result: &mut SyncResult, refused: &[String]) {
    let before = result.changes.len();
    result
        .changes
        .retain(|change| !refused.contains(&change.member_id));
    let demoted = before - result.changes.len();
    if demoted == 0 {
        return;
    }
    result.applied -= demoted;
    result.skipped += demoted;
    tracing::info!(
        "{} change(s) refused: manual override set during the pass",
        demoted
    );
}

/// Forget sweep entries whose write was refused at commit time.
fn drop_refused(report: &mut SweepReport, refused: &[String]) {
    report.restored.retain(|id| !refused.contains(id));
    report.activated.retain(|id| !refused.contains(id));
}

fn log_sweep(report: &SweepReport, refused: &[String]) {
    for id in &report.restored {
        tracing::info!("Slack window expired, {} is available again", id);
    }
    for id in &report.activated {
        tracing::info!("Pending Slack window started, {} is now OOO", id);
    }
    if !refused.is_empty() {
        tracing::debug!("Sweep skipped overridden members: {:?}", refused);
    }
}

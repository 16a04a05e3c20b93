//! Precedence and expiry rules applied to an in-memory roster.
//!
//! These functions only mutate the slice they are given. The engine loads the
//! roster, runs them, and commits the touched records in one transaction.

use chrono::{DateTime, Utc};

use super::matcher::{self, IdentityMatch};
use super::normalizer::{self, NormalizedAnnouncement, TemporalState};
use crate::models::{
    Availability, AvailabilitySource, MemberOooChange, StructuredAnnouncement, SweepReport,
    SyncResult, TeamMember,
};

/// Apply announcements to `roster` under the override and temporal rules.
///
/// `scanned` and `detected` both count every input entry; an entry is `applied`
/// only when it changed a member record, otherwise it is `skipped`.
pub fn apply_announcements(
    announcements: &[StructuredAnnouncement],
    roster: &mut [TeamMember],
    now: DateTime<Utc>,
) -> SyncResult {
    let mut result = SyncResult {
        scanned: announcements.len(),
        detected: announcements.len(),
        ..Default::default()
    };

    for announcement in announcements {
        let normalized = match normalizer::normalize(announcement, now) {
            Ok(n) => n,
            Err(reason) => {
                tracing::debug!(
                    "Skipping announcement for {:?}: {:?}",
                    announcement.person_reference,
                    reason
                );
                result.skipped += 1;
                continue;
            }
        };

        let Some(found) = resolve(&normalized.person_reference, roster) else {
            tracing::debug!(
                "No roster member matches {:?}",
                normalized.person_reference
            );
            result.skipped += 1;
            continue;
        };

        if !roster[found.index].accepts_automated_updates() {
            tracing::info!(
                "Manual override active for {}, leaving Slack announcement unapplied",
                roster[found.index].id
            );
            result.skipped += 1;
            continue;
        }

        let coverage_by = normalized
            .coverage_reference
            .as_deref()
            .map(|reference| coverage_name(reference, roster));

        let member = &mut roster[found.index];
        apply_window(member, &normalized);

        result.applied += 1;
        result.changes.push(MemberOooChange {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            matched_reference: normalized.person_reference.clone(),
            start_date: announcement.start_date,
            end_date: normalized.end,
            reason: normalized.reason.clone(),
            coverage_by,
            pending: normalized.is_pending(),
        });
    }

    result
}

/// Restore members whose active Slack window ended before `now`.
///
/// A queued window survives the restore. Members under a manual override are
/// left alone even if a stale window is set.
pub fn restore_expired(roster: &mut [TeamMember], now: DateTime<Utc>) -> Vec<String> {
    let mut restored = Vec::new();
    for member in roster.iter_mut() {
        if !member.accepts_automated_updates() {
            continue;
        }
        if member.slack_ooo_until.is_some_and(|until| until < now) {
            member.set_availability(Availability::Available);
            member.slack_ooo_until = None;
            restored.push(member.id.clone());
        }
    }
    restored
}

/// Turn queued Slack windows that have started into active OOO.
pub fn activate_pending(roster: &mut [TeamMember], now: DateTime<Utc>) -> Vec<String> {
    let mut activated = Vec::new();
    for member in roster.iter_mut() {
        if !member.accepts_automated_updates() {
            continue;
        }
        if member.slack_ooo_from.is_some_and(|from| from <= now) {
            member.set_availability(Availability::Ooo);
            member.slack_ooo_until = member.slack_pending_until.take();
            member.slack_ooo_from = None;
            activated.push(member.id.clone());
        }
    }
    activated
}

/// Full sweep: expire, activate, then expire windows that started and ended
/// between two sweeps. Idempotent for a fixed `now`.
pub fn sweep(roster: &mut [TeamMember], now: DateTime<Utc>) -> SweepReport {
    let mut restored = restore_expired(roster, now);
    let mut activated = activate_pending(roster, now);

    let lapsed = restore_expired(roster, now);
    activated.retain(|id| !lapsed.contains(id));
    for id in lapsed {
        if !restored.contains(&id) {
            restored.push(id);
        }
    }

    SweepReport {
        restored,
        activated,
    }
}

fn resolve(reference: &str, roster: &[TeamMember]) -> Option<IdentityMatch> {
    let found = matcher::best_match(reference, roster)?;
    if found.ambiguous {
        tracing::warn!(
            "Ambiguous match for {:?}: several members score {:.3}, picked {}",
            reference,
            found.ratio,
            roster[found.index].id
        );
    }
    Some(found)
}

fn coverage_name(reference: &str, roster: &[TeamMember]) -> String {
    match matcher::match_member(reference, roster) {
        Some(member) => member.name.clone(),
        None => reference.trim_start_matches('@').to_string(),
    }
}

/// Install the announced window. An active window replaces whatever is stored;
/// a future one is queued beside the current active window, if any.
fn apply_window(member: &mut TeamMember, announcement: &NormalizedAnnouncement) {
    member.source = AvailabilitySource::Slack;
    match announcement.state {
        TemporalState::Active => {
            member.set_availability(Availability::Ooo);
            member.slack_ooo_until = announcement.end;
            member.slack_ooo_from = None;
            member.slack_pending_until = None;
        }
        TemporalState::Pending => {
            member.slack_ooo_from = Some(announcement.start);
            member.slack_pending_until = announcement.end;
        }
    }
}

//! Validation and temporal classification of structured announcements.

use chrono::{DateTime, Utc};

use crate::models::StructuredAnnouncement;

/// Where an announcement's window sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalState {
    /// Started and not yet ended.
    Active,
    /// Starts in the future.
    Pending,
}

/// Why an announcement produced no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The whole window lies before now.
    Stale,
    /// End precedes start.
    InvertedWindow,
    /// No person reference to resolve.
    MissingPerson,
}

/// An announcement that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnnouncement {
    pub person_reference: String,
    /// Missing start dates are taken as "now".
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub coverage_reference: Option<String>,
    pub state: TemporalState,
}

impl NormalizedAnnouncement {
    pub fn is_pending(&self) -> bool {
        self.state == TemporalState::Pending
    }
}

/// Validate `announcement` and classify it against `now`.
pub fn normalize(
    announcement: &StructuredAnnouncement,
    now: DateTime<Utc>,
) -> Result<NormalizedAnnouncement, SkipReason> {
    let person_reference = announcement.person_reference.trim();
    if person_reference.trim_start_matches('@').trim().is_empty() {
        return Err(SkipReason::MissingPerson);
    }

    let start = announcement.start_date.unwrap_or(now);
    let end = announcement.end_date;

    if let Some(end) = end {
        if end < now && start <= now {
            return Err(SkipReason::Stale);
        }
        if end < start {
            return Err(SkipReason::InvertedWindow);
        }
    }

    let state = if start > now {
        TemporalState::Pending
    } else {
        TemporalState::Active
    };

    Ok(NormalizedAnnouncement {
        person_reference: person_reference.to_string(),
        start,
        end,
        reason: clean(announcement.reason.as_deref()),
        coverage_reference: clean(announcement.coverage_reference.as_deref()),
        state,
    })
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

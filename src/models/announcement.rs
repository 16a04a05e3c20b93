//! Time-off announcements and the records a reconciliation pass produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub sent_at: DateTime<Utc>,
    pub sender: String,
    pub text: String,
}

/// Classifier output for one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnnouncement {
    pub person_reference: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub coverage_reference: Option<String>,
}

/// An announcement as posted to the API, with dates still in text form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    pub person_reference: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub coverage_reference: Option<String>,
}

/// Request body for applying structured announcements directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAnnouncementsRequest {
    pub announcements: Vec<AnnouncementRequest>,
}

/// Audit record of one applied announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberOooChange {
    pub member_id: String,
    pub member_name: String,
    pub matched_reference: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub coverage_by: Option<String>,
    /// The window starts in the future; availability is untouched until it does.
    pub pending: bool,
}

/// Aggregate outcome of a reconciliation pass.
///
/// Counters satisfy `scanned >= detected >= applied` and
/// `applied + skipped == detected`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub scanned: usize,
    pub detected: usize,
    pub applied: usize,
    pub skipped: usize,
    pub changes: Vec<MemberOooChange>,
}

/// Member ids touched by an expiry sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub restored: Vec<String>,
    pub activated: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.restored.is_empty() && self.activated.is_empty()
    }
}

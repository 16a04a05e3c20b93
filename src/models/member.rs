//! Team member model with reconciled availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Availability as shown to managers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Partial,
    Ooo,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Partial => "partial",
            Availability::Ooo => "ooo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Availability::Available),
            "partial" => Some(Availability::Partial),
            "ooo" => Some(Availability::Ooo),
            _ => None,
        }
    }
}

/// Who last wrote a member's availability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilitySource {
    #[default]
    Default,
    Slack,
    Manual,
}

impl AvailabilitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilitySource::Default => "default",
            AvailabilitySource::Slack => "slack",
            AvailabilitySource::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(AvailabilitySource::Default),
            "slack" => Some(AvailabilitySource::Slack),
            "manual" => Some(AvailabilitySource::Manual),
            _ => None,
        }
    }
}

/// A roster member who can cover tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub availability: Availability,
    /// Mirrors `availability == ooo`; never written independently.
    pub is_out_of_office: bool,
    pub source: AvailabilitySource,
    pub manual_override_active: bool,
    /// Start of a queued Slack window that has not begun yet.
    pub slack_ooo_from: Option<DateTime<Utc>>,
    /// End of the active Slack window; `None` is either "not Slack-controlled" or open-ended.
    pub slack_ooo_until: Option<DateTime<Utc>>,
    /// End of the queued window; only meaningful while `slack_ooo_from` is set.
    #[serde(default)]
    pub slack_pending_until: Option<DateTime<Utc>>,
    pub calendar_free_pct: f64,
    pub updated_at: String,
    /// Internal write counter
    #[serde(default)]
    pub version: i64,
}

impl TeamMember {
    /// Set availability and keep the OOO flag consistent with it.
    pub fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
        self.is_out_of_office = availability == Availability::Ooo;
    }

    /// Whether automated reconciliation may touch this record.
    pub fn accepts_automated_updates(&self) -> bool {
        !self.manual_override_active
    }
}

/// Request body for creating a member (roster load).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_calendar_free_pct")]
    pub calendar_free_pct: f64,
}

fn default_calendar_free_pct() -> f64 {
    100.0
}

/// Request body for a manual availability override.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub status: String,
}

/// Calendar import result for one member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUpdateRequest {
    pub calendar_free_pct: f64,
}

/// One entry of a batch calendar import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub member_id: String,
    pub calendar_free_pct: f64,
}

/// Request body for a batch calendar import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarBatchRequest {
    pub entries: Vec<CalendarEntry>,
}

/// Whether a calendar free percentage lies in 0..=100.
pub fn valid_calendar_pct(pct: f64) -> bool {
    (0.0..=100.0).contains(&pct)
}

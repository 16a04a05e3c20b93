//! Date parsing at the ingestion boundary.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::errors::AppError;
use crate::models::{AnnouncementRequest, StructuredAnnouncement};

/// Which edge of a day a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    /// 00:00:00 UTC
    Start,
    /// 23:59:59 UTC; the last day off is inclusive
    End,
}

/// Parse an RFC 3339 timestamp, `YYYY-MM-DD`, or `M/D/YYYY`.
pub fn parse_announcement_date(value: &str, edge: DayEdge) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()?;
    let time = match edge {
        DayEdge::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        DayEdge::End => NaiveTime::from_hms_opt(23, 59, 59)?,
    };
    Some(date.and_time(time).and_utc())
}

/// Parse an optional field; blank counts as absent, garbage is an error.
pub fn parse_optional_date(
    value: Option<&str>,
    edge: DayEdge,
) -> Result<Option<DateTime<Utc>>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_announcement_date(v, edge)
            .map(Some)
            .ok_or_else(|| format!("Unrecognized date {:?}", v)),
    }
}

/// Convert an API announcement, rejecting unparseable dates.
pub fn announcement_from_request(
    request: &AnnouncementRequest,
) -> Result<StructuredAnnouncement, AppError> {
    let start_date = parse_optional_date(request.start_date.as_deref(), DayEdge::Start)
        .map_err(AppError::Validation)?;
    let end_date = parse_optional_date(request.end_date.as_deref(), DayEdge::End)
        .map_err(AppError::Validation)?;

    Ok(StructuredAnnouncement {
        person_reference: request.person_reference.clone(),
        start_date,
        end_date,
        reason: request.reason.clone(),
        coverage_reference: request.coverage_reference.clone(),
    })
}

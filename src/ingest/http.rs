//! HTTP adapters for the message feed and the classification service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::{parse_optional_date, DayEdge};
use super::{Classifier, MessageSource};
use crate::errors::{AppError, ClassificationError};
use crate::models::{RawMessage, StructuredAnnouncement};

/// Pulls raw messages from `GET {url}?hours=N&limit=M`.
pub struct HttpMessageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpMessageSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build feed client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn fetch_raw_messages(
        &self,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RawMessage>, AppError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("hours", lookback_hours), ("limit", limit)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Message feed unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Message feed returned {}",
                response.status()
            )));
        }

        let mut messages: Vec<RawMessage> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed message feed payload: {}", e)))?;
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }
}

/// Request sent to the classification service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationRequest<'a> {
    sender: &'a str,
    sent_at: DateTime<Utc>,
    text: &'a str,
}

/// Structured output of the classification service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffDetails {
    pub is_time_off_request: bool,
    #[serde(default)]
    pub person_username: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub coverage_username: Option<String>,
}

impl TimeOffDetails {
    /// Convert to an announcement; the sender is the person unless another is named.
    pub fn into_announcement(
        self,
        sender: &str,
    ) -> Result<Option<StructuredAnnouncement>, ClassificationError> {
        if !self.is_time_off_request {
            return Ok(None);
        }

        let start_date =
            parse_optional_date(self.start_date.as_deref(), DayEdge::Start).map_err(ClassificationError)?;
        let end_date =
            parse_optional_date(self.end_date.as_deref(), DayEdge::End).map_err(ClassificationError)?;

        let person = self
            .person_username
            .as_deref()
            .map(|p| p.trim().trim_start_matches('@'))
            .filter(|p| !p.is_empty())
            .unwrap_or(sender);
        let coverage = self
            .coverage_username
            .as_deref()
            .map(|c| c.trim().trim_start_matches('@').to_string())
            .filter(|c| !c.is_empty());

        Ok(Some(StructuredAnnouncement {
            person_reference: person.to_string(),
            start_date,
            end_date,
            reason: self.reason,
            coverage_reference: coverage,
        }))
    }
}

/// Posts each message to a classification endpoint.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build classifier client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        message: &RawMessage,
    ) -> Result<Option<StructuredAnnouncement>, ClassificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassificationRequest {
                sender: &message.sender,
                sent_at: message.sent_at,
                text: &message.text,
            })
            .send()
            .await?
            .error_for_status()?;

        let details: TimeOffDetails = response.json().await?;
        details.into_announcement(&message.sender)
    }
}

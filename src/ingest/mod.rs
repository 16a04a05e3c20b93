//! Collaborator seams for message transport and classification.
//!
//! The engine never talks to chat or model APIs itself; it receives their
//! output through these traits.

mod dates;
mod http;

pub use dates::*;
pub use http::*;

use async_trait::async_trait;

use crate::errors::{AppError, ClassificationError};
use crate::models::{RawMessage, StructuredAnnouncement};

/// Source of recent raw chat messages.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages sent within the last `lookback_hours`, oldest first, at most `limit`.
    async fn fetch_raw_messages(
        &self,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RawMessage>, AppError>;
}

/// Turns one raw message into a structured announcement.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// `Ok(None)` when the message is not about time off.
    async fn classify(
        &self,
        message: &RawMessage,
    ) -> Result<Option<StructuredAnnouncement>, ClassificationError>;
}

/// Stand-in used when no feed URL is configured.
pub struct UnconfiguredSource;

#[async_trait]
impl MessageSource for UnconfiguredSource {
    async fn fetch_raw_messages(
        &self,
        _lookback_hours: u32,
        _limit: u32,
    ) -> Result<Vec<RawMessage>, AppError> {
        Err(AppError::Upstream(
            "No message feed configured (COVERAGE_FEED_URL)".to_string(),
        ))
    }
}

/// Stand-in used when no classifier URL is configured.
pub struct UnconfiguredClassifier;

#[async_trait]
impl Classifier for UnconfiguredClassifier {
    async fn classify(
        &self,
        _message: &RawMessage,
    ) -> Result<Option<StructuredAnnouncement>, ClassificationError> {
        Err(ClassificationError(
            "no classifier configured (COVERAGE_CLASSIFIER_URL)".to_string(),
        ))
    }
}

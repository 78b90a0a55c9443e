//! # Errors
//!
//! A single error type covers the library. Failures are meant to stay local:
//! a malformed timeline affects one contributor, a failed fetch one panel.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Errors produced while loading campaigns, fetching insights, aggregating
/// engagement and rendering charts.
#[derive(Debug, Error)]
pub enum InsightError {
    /// A contributor's serialized timeline could not be parsed.
    #[error("malformed timeline for contributor '{contributor}': {reason}")]
    MalformedTimeline {
        /// Display name of the contributor whose timeline failed.
        contributor: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A date string did not match `YYYY-MM-DD`.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A request to the campaign server failed or returned a non-success status.
    #[error("fetching {target} failed: {reason}")]
    Fetch {
        /// Insight function id or endpoint that was requested.
        target: String,
        /// Transport error or HTTP status.
        reason: String,
    },

    /// No campaign document exists for the uuid.
    #[error("campaign '{0}' doesn't exist")]
    CampaignNotFound(String),

    /// A required attribute is missing from a campaign document.
    #[error("campaign attribute '{0}' is missing")]
    MissingAttribute(&'static str),

    /// The uuid inside a campaign document differs from the requested one.
    #[error("campaign uuid mismatch: expected '{expected}', found '{found}'")]
    UuidMismatch {
        /// Requested uuid.
        expected: String,
        /// Uuid stored in the document.
        found: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chart drawing failed.
    #[error("plotting error: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl InsightError {
    /// Build a [`InsightError::Fetch`] from any displayable failure.
    pub fn fetch(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

//! Top-level error and retry-policy types for the schedule domain.
//!
//! [`PublishError`] covers conditions that stop a day or a room from being
//! published. Component-level errors (session source failures, spreadsheet
//! service failures) are defined in [`crate::ports`].
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::{SessionSourceError, SpreadsheetError};
use crate::{SheetTitle, SpreadsheetId};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let the adapters decide whether
/// to re-issue a request.
///
/// - `Retryable` errors: timeouts, rate-limit responses, server errors.
/// - `NonRetryable` errors: authentication failures, malformed requests,
///   missing sheets, invalid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. from a
        /// `Retry-After` header). `None` means apply the caller's schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Publish-level errors
// ---------------------------------------------------------------------------

/// Errors that stop a day or a room from being published.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A room tab could not be found after it was duplicated from the template.
    #[error("Sheet '{title}' missing from spreadsheet {spreadsheet}")]
    SheetMissing {
        /// Spreadsheet that was searched.
        spreadsheet: SpreadsheetId,
        /// Title of the tab that was expected.
        title: SheetTitle,
    },

    /// Fetching sessions failed.
    #[error(transparent)]
    Source(#[from] SessionSourceError),

    /// A spreadsheet call failed.
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    /// The runtime configuration is invalid.
    ///
    /// Produced at load time; publishing never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl PublishError {
    /// Returns the retry policy of the underlying failure.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Source(e) => e.retry_policy(),
            Self::Spreadsheet(e) => e.retry_policy(),
            _ => RetryPolicy::NonRetryable,
        }
    }
}

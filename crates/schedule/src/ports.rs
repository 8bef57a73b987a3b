//! Port traits implemented by infrastructure crates.
//!
//! - [`SessionSource`]: where sessions come from (`devcon-api`).
//! - [`SpreadsheetService`]: where schedules are written (`sheets`).
//!
//! Each port has its own error type carrying enough classification for the
//! adapters to decide on retries via [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RetryPolicy, Schedule, SheetId, SheetRequest, SheetTitle, SpreadsheetId, ValueRange};

// ---------------------------------------------------------------------------
// Session source
// ---------------------------------------------------------------------------

/// Errors returned by a [`SessionSource`].
#[derive(Debug, Error)]
pub enum SessionSourceError {
    /// The request could not be sent or timed out.
    #[error("Sessions API unreachable: {message}")]
    Network { message: String },

    /// The API answered with a non-success status.
    #[error("Sessions API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Sessions API response could not be parsed: {message}")]
    Parse { message: String },
}

impl SessionSourceError {
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Network { .. } => RetryPolicy::Retryable { after: None },
            Self::Http { status, .. } if *status == 429 || *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// Supplies the conference's sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Fetches every session of the event in one call.
    async fn fetch_sessions(&self) -> Result<Schedule, SessionSourceError>;
}

// ---------------------------------------------------------------------------
// Spreadsheet service
// ---------------------------------------------------------------------------

/// Errors returned by a [`SpreadsheetService`].
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    /// No usable credentials, or the token exchange was rejected.
    #[error("Spreadsheet authentication failed: {message}")]
    Auth { message: String },

    /// The request could not be sent or timed out.
    #[error("Spreadsheet service unreachable: {message}")]
    Network { message: String },

    /// The service is rate limiting this client.
    #[error("Spreadsheet service rate limit hit: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The service answered with a non-success status.
    #[error("Spreadsheet service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Spreadsheet response could not be parsed: {message}")]
    Parse { message: String },
}

impl SpreadsheetError {
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Network { .. } => RetryPolicy::Retryable { after: None },
            Self::RateLimited { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Api { status, .. } if *status >= 500 => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// Identity of a tab as reported by the spreadsheet service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetProperties {
    pub sheet_id: SheetId,
    pub title: String,
}

/// The subset of a spreadsheet API needed to publish schedules.
///
/// Every call is scoped to one spreadsheet. Value writes use user-entered
/// semantics, so numbers and times typed as text are parsed by the service.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    /// Lists the tabs of a spreadsheet.
    async fn list_sheets(
        &self,
        spreadsheet: &SpreadsheetId,
    ) -> Result<Vec<SheetProperties>, SpreadsheetError>;

    /// Adds an empty tab and returns its id.
    async fn add_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        title: &SheetTitle,
    ) -> Result<SheetId, SpreadsheetError>;

    /// Copies tab `sheet` into `destination` and returns the new tab.
    async fn copy_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        sheet: SheetId,
        destination: &SpreadsheetId,
    ) -> Result<SheetProperties, SpreadsheetError>;

    /// Clears every value in `range`, keeping formatting.
    async fn clear_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<(), SpreadsheetError>;

    /// Writes one block of values.
    async fn update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        values: ValueRange,
    ) -> Result<(), SpreadsheetError>;

    /// Writes several blocks of values in one call.
    async fn batch_update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        data: Vec<ValueRange>,
    ) -> Result<(), SpreadsheetError>;

    /// Reads the formatted values of `range`. Trailing empty cells and rows
    /// are omitted by the service.
    async fn get_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SpreadsheetError>;

    /// Applies formatting and structural requests atomically.
    async fn batch_update(
        &self,
        spreadsheet: &SpreadsheetId,
        requests: Vec<SheetRequest>,
    ) -> Result<(), SpreadsheetError>;

    /// Finds a tab by title.
    async fn find_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        title: &SheetTitle,
    ) -> Result<Option<SheetId>, SpreadsheetError> {
        Ok(self
            .list_sheets(spreadsheet)
            .await?
            .into_iter()
            .find(|s| s.title == title.as_str())
            .map(|s| s.sheet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_server_errors_are_retryable() {
        let limited = SpreadsheetError::RateLimited {
            message: "quota".into(),
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(
            limited.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(3))
            }
        );
        let server = SpreadsheetError::Api {
            status: 503,
            body: String::new(),
        };
        assert!(server.retry_policy().is_retryable());

        let bad_request = SpreadsheetError::Api {
            status: 400,
            body: "Invalid requests[0]".into(),
        };
        assert_eq!(bad_request.retry_policy(), RetryPolicy::NonRetryable);
        let auth = SpreadsheetError::Auth {
            message: "invalid_grant".into(),
        };
        assert!(!auth.retry_policy().is_retryable());
    }

    #[test]
    fn session_source_http_errors() {
        let e = SessionSourceError::Http {
            status: 502,
            body: String::new(),
        };
        assert!(e.retry_policy().is_retryable());
        let e = SessionSourceError::Http {
            status: 404,
            body: String::new(),
        };
        assert!(!e.retry_policy().is_retryable());
    }
}

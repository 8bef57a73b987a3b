//! [`SpreadsheetService`] over the Sheets v4 REST API, with retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use schedule::{
    SheetId, SheetProperties, SheetRequest, SheetTitle, SpreadsheetError, SpreadsheetId,
    SpreadsheetService, ValueRange,
};

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::wire;

/// Sheets v4 spreadsheets collection.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const SHEET_LIST_FIELDS: &str = "sheets.properties(sheetId,title)";

/// Retry behaviour for transient Sheets failures (rate limits, 5xx, network).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one.
    pub initial_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Connection settings for [`SheetsClient`].
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// [`SpreadsheetService`] over the Google Sheets REST API.
pub struct SheetsClient {
    http: Client,
    tokens: TokenProvider,
    config: SheetsConfig,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey, config: SheetsConfig) -> Result<Self, SpreadsheetError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SpreadsheetError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        debug!(client_email = %key.client_email, "sheets client created");
        Ok(Self {
            tokens: TokenProvider::new(http.clone(), key),
            http,
            config,
        })
    }

    fn spreadsheet_url(&self, spreadsheet: &SpreadsheetId) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            spreadsheet.as_str()
        )
    }

    fn values_url(&self, spreadsheet: &SpreadsheetId, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet),
            urlencoding::encode(range)
        )
    }

    /// Sends a request, retrying transient failures per [`RetryConfig`].
    async fn send_json(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        kind: CallKind,
    ) -> Result<Value, SpreadsheetError> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, body).await {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    attempt += 1;
                    if !failure.may_retry(kind) || attempt >= self.config.retry.max_attempts {
                        return Err(failure.error);
                    }
                    let error = failure.error;
                    let policy = error.retry_policy();
                    let delay = match policy {
                        schedule::RetryPolicy::Retryable { after: Some(after) } => after,
                        _ => self.config.retry.backoff(attempt - 1),
                    };
                    warn!(
                        %method,
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "sheets request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, Failure> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(Failure::before_sending)?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                return Failure::before_sending(SpreadsheetError::Network {
                    message: format!("Connection failed: {e}"),
                });
            }
            let message = if e.is_timeout() {
                format!("Request timeout: {e}")
            } else {
                format!("Request failed: {e}")
            };
            Failure::after_sending(SpreadsheetError::Network { message })
        })?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        classify_response(status.as_u16(), retry_after, &text).map_err(Failure::after_sending)
    }
}

/// Whether repeating a call can change the spreadsheet twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// Reads, value writes and formatting: repeating them is harmless.
    Idempotent,
    /// Calls that create tabs. A repeat after a lost response would create a
    /// second tab or fail on the duplicate title.
    Creating,
}

/// A failed attempt and whether the request may have reached the service.
#[derive(Debug)]
struct Failure {
    error: SpreadsheetError,
    sent: bool,
}

impl Failure {
    fn before_sending(error: SpreadsheetError) -> Self {
        Self { error, sent: false }
    }

    fn after_sending(error: SpreadsheetError) -> Self {
        Self { error, sent: true }
    }

    fn may_retry(&self, kind: CallKind) -> bool {
        if !self.error.retry_policy().is_retryable() {
            return false;
        }
        match kind {
            CallKind::Idempotent => true,
            // A 429 is rejected before it is applied; anything else may have been.
            CallKind::Creating => {
                !self.sent || matches!(self.error, SpreadsheetError::RateLimited { .. })
            }
        }
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Maps a raw response to a JSON body or a classified error.
fn classify_response(
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> Result<Value, SpreadsheetError> {
    match status {
        429 => Err(SpreadsheetError::RateLimited {
            message: body.to_string(),
            retry_after,
        }),
        200..=299 if body.trim().is_empty() => Ok(Value::Null),
        200..=299 => serde_json::from_str(body).map_err(|e| SpreadsheetError::Parse {
            message: format!("Failed to parse response: {e}"),
        }),
        _ => Err(SpreadsheetError::Api {
            status,
            body: body.to_string(),
        }),
    }
}

fn parse_error(e: serde_json::Error) -> SpreadsheetError {
    SpreadsheetError::Parse {
        message: e.to_string(),
    }
}

#[async_trait]
impl SpreadsheetService for SheetsClient {
    async fn list_sheets(
        &self,
        spreadsheet: &SpreadsheetId,
    ) -> Result<Vec<SheetProperties>, SpreadsheetError> {
        let url = format!(
            "{}?fields={}",
            self.spreadsheet_url(spreadsheet),
            urlencoding::encode(SHEET_LIST_FIELDS)
        );
        let body = self.send_json(Method::GET, &url, None, CallKind::Idempotent).await?;
        wire::parse_sheet_list(body).map_err(parse_error)
    }

    async fn add_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        title: &SheetTitle,
    ) -> Result<SheetId, SpreadsheetError> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet));
        let request = json!({
            "requests": [{ "addSheet": { "properties": { "title": title.as_str() } } }]
        });
        let body = self
            .send_json(Method::POST, &url, Some(&request), CallKind::Creating)
            .await?;
        let sheet_id = wire::parse_added_sheet(&body).ok_or_else(|| SpreadsheetError::Parse {
            message: "addSheet reply missing sheet properties".to_string(),
        })?;
        debug!(spreadsheet = %spreadsheet, title = %title, sheet_id = sheet_id.as_u64(), "sheet added");
        Ok(sheet_id)
    }

    async fn copy_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        sheet: SheetId,
        destination: &SpreadsheetId,
    ) -> Result<SheetProperties, SpreadsheetError> {
        let url = format!(
            "{}/sheets/{}:copyTo",
            self.spreadsheet_url(spreadsheet),
            sheet.as_u64()
        );
        let request = json!({ "destinationSpreadsheetId": destination.as_str() });
        let body = self
            .send_json(Method::POST, &url, Some(&request), CallKind::Creating)
            .await?;
        wire::parse_sheet_properties(body).map_err(parse_error)
    }

    async fn clear_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<(), SpreadsheetError> {
        let url = format!("{}:clear", self.values_url(spreadsheet, range));
        self.send_json(Method::POST, &url, Some(&json!({})), CallKind::Idempotent)
            .await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        values: ValueRange,
    ) -> Result<(), SpreadsheetError> {
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(spreadsheet, &values.range)
        );
        let body = wire::value_range_json(&values);
        self.send_json(Method::PUT, &url, Some(&body), CallKind::Idempotent)
            .await?;
        Ok(())
    }

    async fn batch_update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        data: Vec<ValueRange>,
    ) -> Result<(), SpreadsheetError> {
        if data.is_empty() {
            return Ok(());
        }
        let url = format!("{}/values:batchUpdate", self.spreadsheet_url(spreadsheet));
        let body = wire::batch_values_body(&data);
        self.send_json(Method::POST, &url, Some(&body), CallKind::Idempotent)
            .await?;
        Ok(())
    }

    async fn get_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SpreadsheetError> {
        let url = self.values_url(spreadsheet, range);
        let body = self.send_json(Method::GET, &url, None, CallKind::Idempotent).await?;
        wire::parse_values(body).map_err(parse_error)
    }

    async fn batch_update(
        &self,
        spreadsheet: &SpreadsheetId,
        requests: Vec<SheetRequest>,
    ) -> Result<(), SpreadsheetError> {
        if requests.is_empty() {
            return Ok(());
        }
        let url = format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet));
        let body = wire::batch_update_body(&requests);
        self.send_json(Method::POST, &url, Some(&body), CallKind::Idempotent)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> SheetsClient {
        let key = ServiceAccountKey::from_json(r#"{"client_email": "a@b", "private_key": "pem"}"#)
            .unwrap();
        SheetsClient::new(
            key,
            SheetsConfig {
                base_url: base_url.to_string(),
                ..SheetsConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn value_ranges_are_percent_encoded() {
        let client = client("https://sheets.example.test/v4/spreadsheets/");
        let id = SpreadsheetId::new("abc123").unwrap();
        assert_eq!(
            client.values_url(&id, "'STAGE 1'!A1:T9"),
            "https://sheets.example.test/v4/spreadsheets/abc123/values/%27STAGE%201%27%21A1%3AT9"
        );
    }

    #[test]
    fn rate_limits_carry_retry_after() {
        let err = classify_response(429, Some(Duration::from_secs(7)), "quota").unwrap_err();
        assert_eq!(
            err.retry_policy(),
            schedule::RetryPolicy::Retryable {
                after: Some(Duration::from_secs(7))
            }
        );
    }

    #[test]
    fn client_errors_are_not_retried() {
        let err = classify_response(400, None, "bad range").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Api { status: 400, .. }));
        assert!(!err.retry_policy().is_retryable());

        let err = classify_response(503, None, "").unwrap_err();
        assert!(err.retry_policy().is_retryable());
    }

    #[test]
    fn successful_bodies_are_parsed() {
        assert_eq!(
            classify_response(200, None, r#"{"spreadsheetId": "x"}"#).unwrap()["spreadsheetId"],
            "x"
        );
        assert_eq!(classify_response(200, None, "").unwrap(), Value::Null);
        assert!(matches!(
            classify_response(200, None, "<html>"),
            Err(SpreadsheetError::Parse { .. })
        ));
    }

    #[test]
    fn tab_creation_is_not_repeated_after_a_lost_response() {
        let timeout = Failure::after_sending(SpreadsheetError::Network {
            message: "Request timeout".into(),
        });
        assert!(!timeout.may_retry(CallKind::Creating));
        assert!(timeout.may_retry(CallKind::Idempotent));

        let server = Failure::after_sending(SpreadsheetError::Api {
            status: 503,
            body: String::new(),
        });
        assert!(!server.may_retry(CallKind::Creating));

        let refused = Failure::before_sending(SpreadsheetError::Network {
            message: "Connection failed".into(),
        });
        assert!(refused.may_retry(CallKind::Creating));

        let limited = Failure::after_sending(SpreadsheetError::RateLimited {
            message: "quota".into(),
            retry_after: None,
        });
        assert!(limited.may_retry(CallKind::Creating));

        let rejected = Failure::after_sending(SpreadsheetError::Api {
            status: 400,
            body: String::new(),
        });
        assert!(!rejected.may_retry(CallKind::Idempotent));
    }

    #[test]
    fn backoff_doubles() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(0), Duration::from_millis(500));
        assert_eq!(retry.backoff(2), Duration::from_secs(2));
    }
}

//! Devcon sessions API client adapter.
//!
//! Implements the [`schedule::SessionSource`] trait over the public sessions
//! endpoint (`GET /sessions?size=…&event=…`).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, query construction, and response
//! parsing live here. The [`schedule`] crate sees only
//! [`schedule::SessionSource`] and [`schedule::Schedule`].
//!
//! ## Response shape
//!
//! ```json
//! { "data": { "items": [ {
//!     "sourceId": "XJ8ZPL",
//!     "title": "…",
//!     "slot_start": "2024-11-12T02:00:00.000Z",
//!     "slot_end": "2024-11-12T02:30:00.000Z",
//!     "slot_roomId": "main-stage",
//!     "speakers": [ { "name": "…" } ]
//! } ] } }
//! ```
//!
//! Slot fields are null for unscheduled sessions. Timestamps are accepted as
//! RFC 3339 strings or epoch milliseconds.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use schedule::{
    EventSlug, RoomId, Schedule, Session, SessionCode, SessionSource, SessionSourceError, Speaker,
};

/// Public Devcon API.
pub const DEFAULT_BASE_URL: &str = "https://api.devcon.org";
/// Devcon SEA.
pub const DEFAULT_EVENT: &str = "devcon-7";
/// Large enough to fetch every session of one event in a single page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Connection settings for [`DevconClient`].
#[derive(Debug, Clone)]
pub struct DevconConfig {
    pub base_url: String,
    pub event: EventSlug,
    pub page_size: u32,
    pub timeout: Duration,
}

impl DevconConfig {
    /// Settings for `event` against the public API.
    pub fn new(event: EventSlug) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            event,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sessions API client.
pub struct DevconClient {
    client: Client,
    config: DevconConfig,
}

impl DevconClient {
    pub fn new(config: DevconConfig) -> Result<Self, SessionSourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SessionSourceError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetches one page of sessions as a raw body. `size = None` leaves the
    /// page size to the API default.
    async fn get_sessions(&self, size: Option<u32>) -> Result<String, SessionSourceError> {
        let mut query = Vec::with_capacity(2);
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }
        query.push(("event", self.config.event.to_string()));

        let response = self
            .client
            .get(self.sessions_url())
            .header("accept", "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("Request timeout: {e}")
                } else if e.is_connect() {
                    format!("Connection failed: {e}")
                } else {
                    format!("Request failed: {e}")
                };
                SessionSourceError::Network { message }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SessionSourceError::Network {
            message: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(SessionSourceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "sessions response received");
        Ok(body)
    }

    /// Unique room identifiers referenced by the event's sessions, sorted.
    ///
    /// Uses the API's default page size.
    pub async fn fetch_room_ids(&self) -> Result<Vec<RoomId>, SessionSourceError> {
        parse_room_ids(&self.get_sessions(None).await?)
    }
}

#[async_trait]
impl SessionSource for DevconClient {
    async fn fetch_sessions(&self) -> Result<Schedule, SessionSourceError> {
        let schedule = parse_sessions(&self.get_sessions(Some(self.config.page_size)).await?)?;
        info!(
            sessions = schedule.len(),
            event = %self.config.event,
            "sessions fetched"
        );
        Ok(schedule)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SessionsEnvelope {
    data: SessionsPage,
}

#[derive(Debug, Deserialize)]
struct SessionsPage {
    #[serde(default)]
    items: Vec<ApiSession>,
}

#[derive(Debug, Deserialize)]
struct ApiSession {
    #[serde(rename = "sourceId", default)]
    source_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slot_start: Option<serde_json::Value>,
    #[serde(default)]
    slot_end: Option<serde_json::Value>,
    #[serde(rename = "slot_roomId", default)]
    slot_room_id: Option<String>,
    #[serde(default)]
    speakers: Option<Vec<ApiSpeaker>>,
}

#[derive(Debug, Deserialize)]
struct ApiSpeaker {
    #[serde(default)]
    name: Option<String>,
}

/// Parses a sessions API response body.
///
/// Items without any code are dropped with a warning; every other field is
/// optional.
pub fn parse_sessions(body: &str) -> Result<Schedule, SessionSourceError> {
    let sessions = parse_items(body)?
        .into_iter()
        .filter_map(|item| {
            let Some(code) = item
                .source_id
                .or(item.id)
                .and_then(SessionCode::new)
            else {
                warn!(title = ?item.title, "session without code skipped");
                return None;
            };
            Some(Session {
                code,
                title: item.title.unwrap_or_default(),
                start: item.slot_start.as_ref().and_then(timestamp),
                end: item.slot_end.as_ref().and_then(timestamp),
                room: item.slot_room_id.and_then(RoomId::new),
                speakers: item
                    .speakers
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|s| s.name)
                    .map(|name| Speaker { name })
                    .collect(),
            })
        })
        .collect();

    Ok(Schedule::new(sessions))
}

/// Unique room ids of every item in a sessions response, sorted.
///
/// Unlike [`parse_sessions`], items without a code still contribute their
/// room.
pub fn parse_room_ids(body: &str) -> Result<Vec<RoomId>, SessionSourceError> {
    Ok(parse_items(body)?
        .into_iter()
        .filter_map(|item| item.slot_room_id.and_then(RoomId::new))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}

fn parse_items(body: &str) -> Result<Vec<ApiSession>, SessionSourceError> {
    let envelope: SessionsEnvelope =
        serde_json::from_str(body).map_err(|e| SessionSourceError::Parse {
            message: e.to_string(),
        })?;
    Ok(envelope.data.items)
}

fn timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

//! Shared value types for the schedule domain.
//!
//! Sessions arrive from the sessions API in UTC. Everything that is shown in
//! a sheet (which day a session belongs to, which overview row it starts on,
//! the clock times in a room sheet) is computed in venue-local time through
//! an [`EventClock`].

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{RoomId, SessionCode, SpreadsheetId};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A person presenting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Display name.
    pub name: String,
}

/// One session record as fetched from the sessions API.
///
/// Slot fields are optional: unscheduled sessions have no start, end or room
/// and never appear on any day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Source code of the session; keys the row in a room sheet.
    pub code: SessionCode,
    /// Session title.
    pub title: String,
    /// Slot start (UTC).
    pub start: Option<DateTime<Utc>>,
    /// Slot end (UTC).
    pub end: Option<DateTime<Utc>>,
    /// Room the slot is in.
    pub room: Option<RoomId>,
    /// Speakers in API order.
    pub speakers: Vec<Speaker>,
}

impl Session {
    /// Speaker names joined with `", "`. Empty when there are no speakers.
    pub fn speaker_names(&self) -> String {
        self.speakers
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Slot length, when both ends of the slot are known.
    pub fn duration(&self) -> Option<TimeDelta> {
        Some(self.end? - self.start?)
    }

    /// A session is on `day` only when its slot has both ends and starts on
    /// that venue-local date.
    fn starts_on(&self, day: NaiveDate, clock: &EventClock) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(_)) => clock.local(start).date() == day,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------

/// All sessions of one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Sessions in API order.
    pub sessions: Vec<Session>,
}

impl Schedule {
    /// Creates a schedule from fetched sessions.
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    /// Number of sessions fetched.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nothing was fetched.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions starting on `day` (venue-local), in API order.
    pub fn on_day(
        &self,
        day: NaiveDate,
        clock: &EventClock,
    ) -> impl Iterator<Item = &Session> + '_ {
        let clock = *clock;
        self.sessions
            .iter()
            .filter(move |s| s.starts_on(day, &clock))
    }

    /// Sessions in `room` starting on `day`, ordered by start time.
    pub fn in_room_on_day(
        &self,
        room: &RoomId,
        day: NaiveDate,
        clock: &EventClock,
    ) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self
            .on_day(day, clock)
            .filter(|s| s.room.as_ref() == Some(room))
            .collect();
        sessions.sort_by_key(|s| s.start);
        sessions
    }

    /// Unique room identifiers referenced by any session, sorted ascending.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.sessions
            .iter()
            .filter_map(|s| s.room.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// UTC offset of the venue, used to render session times.
///
/// Defaults to `+07:00` (Bangkok).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventClock {
    offset: FixedOffset,
}

impl EventClock {
    /// Offset of the Devcon SEA venue, in seconds east of UTC.
    pub const DEFAULT_OFFSET_SECS: i32 = 7 * 3600;

    /// Creates a clock for the given venue offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Returns the venue offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Converts a UTC timestamp to venue-local wall-clock time.
    pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }

    /// 12-hour clock time as shown in room sheets, e.g. `9:05 AM`.
    pub fn clock_time(&self, at: DateTime<Utc>) -> String {
        self.local(at).format("%-I:%M %p").to_string()
    }

    /// 24-hour overview row label, e.g. `09:10`.
    pub fn overview_label(hour: u32, minute: u32) -> String {
        format!("{hour:02}:{minute:02}")
    }
}

impl Default for EventClock {
    fn default() -> Self {
        let offset =
            FixedOffset::east_opt(Self::DEFAULT_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// One conference day and the spreadsheet its schedule is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySheet {
    /// Venue-local date.
    pub day: NaiveDate,
    /// Spreadsheet holding the day's overview and room tabs.
    pub spreadsheet: SpreadsheetId,
}

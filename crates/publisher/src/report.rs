//! Outcome of a publish run, per day and per room.

use chrono::NaiveDate;
use serde::Serialize;

use schedule::{RoomId, SheetTitle, SpreadsheetId};

/// What happened to a day's overview tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverviewOutcome {
    /// Grid written; `merges` multi-slot sessions merged.
    Published { sessions: usize, merges: usize },
    /// The overview failed; room tabs for the day were not attempted.
    Failed { error: String },
}

/// What happened to one room tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoomOutcome {
    /// `rows` session rows written, `merged` of them kept show-caller notes.
    Published { rows: usize, merged: usize },
    /// The room has no sessions on this day; nothing was written.
    NoSessions,
    /// A spreadsheet call failed; the run moved on to the next room.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomReport {
    pub room: RoomId,
    pub title: SheetTitle,
    /// Whether the tab was duplicated from the template during this run.
    pub created: bool,
    pub outcome: RoomOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub day: NaiveDate,
    pub spreadsheet: SpreadsheetId,
    pub overview: OverviewOutcome,
    pub rooms: Vec<RoomReport>,
}

impl DayReport {
    /// Rooms whose tab could not be published.
    pub fn failed_rooms(&self) -> impl Iterator<Item = &RoomReport> {
        self.rooms
            .iter()
            .filter(|r| matches!(r.outcome, RoomOutcome::Failed { .. }))
    }

    /// `true` when the overview and every room tab were published.
    pub fn is_complete(&self) -> bool {
        matches!(self.overview, OverviewOutcome::Published { .. })
            && self.failed_rooms().next().is_none()
    }
}

/// Every day processed by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub days: Vec<DayReport>,
}

impl PublishReport {
    /// `true` when every day is complete.
    pub fn is_complete(&self) -> bool {
        self.days.iter().all(DayReport::is_complete)
    }

    /// Total session rows written across all room tabs.
    pub fn rows_written(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| &d.rooms)
            .map(|r| match r.outcome {
                RoomOutcome::Published { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }
}

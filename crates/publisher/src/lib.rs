//! Publishes a fetched schedule into per-day spreadsheets.
//!
//! [`SchedulePublisher`] drives the whole run: for each configured day it
//! rebuilds the `overview` tab, then walks the room directory, duplicating the
//! template tab for rooms that have none yet and writing one row per session.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The publisher sequences calls between the layout
//! logic in the [`schedule`] crate and the [`schedule::SpreadsheetService`]
//! port. It contains no layout rules of its own.
//!
//! ## Failure handling
//!
//! A failing room is logged and recorded in the [`DayReport`]; the run moves
//! on to the next room. A failing overview stops that day only. Nothing is
//! retried here; adapters retry transient failures themselves.

mod report;

use std::sync::Arc;

use schedule::{
    a1, room_sheet, DaySheet, EventClock, OverviewGrid, PublishError, Room, RoomDirectory,
    RoomSheetPlan, Schedule, SheetId, SheetTitle, SpreadsheetService,
};
use tracing::{debug, error, info, instrument};

pub use report::{DayReport, OverviewOutcome, PublishReport, RoomOutcome, RoomReport};

/// Id of the Devcon SEA room template tab.
pub const DEFAULT_TEMPLATE_SHEET_ID: u64 = 688_800_800;

/// Layout settings that vary per event.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Tab duplicated for every new room sheet.
    pub template_sheet_id: SheetId,
    /// Prefix of the presentation link written in column H.
    pub presentation_base: String,
    /// Venue clock used to assign days and render times.
    pub clock: EventClock,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            template_sheet_id: SheetId::new(DEFAULT_TEMPLATE_SHEET_ID),
            presentation_base: room_sheet::DEFAULT_PRESENTATION_BASE.to_string(),
            clock: EventClock::default(),
        }
    }
}

/// Writes schedules through a [`SpreadsheetService`].
pub struct SchedulePublisher {
    sheets: Arc<dyn SpreadsheetService>,
    rooms: RoomDirectory,
    settings: PublishSettings,
}

impl SchedulePublisher {
    pub fn new(
        sheets: Arc<dyn SpreadsheetService>,
        rooms: RoomDirectory,
        settings: PublishSettings,
    ) -> Self {
        Self {
            sheets,
            rooms,
            settings,
        }
    }

    /// Publishes every day in order. Failures are collected, never returned.
    pub async fn publish(&self, schedule: &Schedule, days: &[DaySheet]) -> PublishReport {
        let mut report = PublishReport::default();
        for day in days {
            info!(day = %day.day, spreadsheet = %day.spreadsheet, "processing day");
            let day_report = self.publish_day(schedule, day).await;
            if day_report.is_complete() {
                info!(day = %day.day, "completed day");
            }
            report.days.push(day_report);
        }
        report
    }

    /// Publishes the overview and every room tab of one day.
    #[instrument(skip_all, fields(day = %day.day, spreadsheet = %day.spreadsheet))]
    pub async fn publish_day(&self, schedule: &Schedule, day: &DaySheet) -> DayReport {
        let overview = match self.publish_overview(schedule, day).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "overview failed; skipping day");
                return DayReport {
                    day: day.day,
                    spreadsheet: day.spreadsheet.clone(),
                    overview: OverviewOutcome::Failed {
                        error: e.to_string(),
                    },
                    rooms: Vec::new(),
                };
            }
        };

        let mut rooms = Vec::with_capacity(self.rooms.len());
        for room in self.rooms.iter() {
            rooms.push(self.publish_room(schedule, day, room).await);
        }

        DayReport {
            day: day.day,
            spreadsheet: day.spreadsheet.clone(),
            overview,
            rooms,
        }
    }

    /// Creates or clears the overview tab, then writes and formats the grid.
    pub async fn publish_overview(
        &self,
        schedule: &Schedule,
        day: &DaySheet,
    ) -> Result<OverviewOutcome, PublishError> {
        let spreadsheet = &day.spreadsheet;
        let title = SheetTitle::overview();

        let sheet_id = match self.sheets.find_sheet(spreadsheet, &title).await? {
            Some(id) => {
                self.sheets
                    .clear_values(spreadsheet, &a1::whole_sheet(&title))
                    .await?;
                id
            }
            None => {
                info!("adding overview sheet");
                self.sheets.add_sheet(spreadsheet, &title).await?
            }
        };

        let grid = OverviewGrid::build(
            schedule,
            &self.rooms,
            day.day,
            &self.settings.clock,
            sheet_id,
        );
        let sessions = schedule.on_day(day.day, &self.settings.clock).count();

        self.sheets
            .batch_update(spreadsheet, grid.format_requests())
            .await?;
        self.sheets
            .update_values(spreadsheet, grid.value_range())
            .await?;

        let merges = grid.merges.len();
        if merges > 0 {
            self.sheets.batch_update(spreadsheet, grid.merges).await?;
        }

        info!(sessions, merges, "overview published");
        Ok(OverviewOutcome::Published { sessions, merges })
    }

    async fn publish_room(&self, schedule: &Schedule, day: &DaySheet, room: &Room) -> RoomReport {
        let (created, outcome) = match self.ensure_room_sheet(day, room).await {
            Ok(created) => match self.populate_room(schedule, day, room).await {
                Ok(outcome) => (created, outcome),
                Err(e) => (created, failed(room, e)),
            },
            Err(e) => (false, failed(room, e)),
        };

        if let RoomOutcome::Published { rows, merged } = outcome {
            info!(room = %room.name, rows, merged, "room published");
        }

        RoomReport {
            room: room.id.clone(),
            title: room.name.clone(),
            created,
            outcome,
        }
    }

    /// Duplicates the template tab for `room` unless a tab with its name
    /// exists. Returns `true` when a tab was created.
    #[instrument(skip_all, fields(room = %room.name))]
    pub async fn ensure_room_sheet(&self, day: &DaySheet, room: &Room) -> Result<bool, PublishError> {
        let spreadsheet = &day.spreadsheet;
        if self.sheets.find_sheet(spreadsheet, &room.name).await?.is_some() {
            debug!("sheet already exists, skipping creation");
            return Ok(false);
        }

        let copy = self
            .sheets
            .copy_sheet(spreadsheet, self.settings.template_sheet_id, spreadsheet)
            .await?;
        self.sheets
            .batch_update(
                spreadsheet,
                room_sheet::template_setup_requests(copy.sheet_id, &room.name),
            )
            .await?;

        info!(sheet_id = %copy.sheet_id, "template duplicated");
        Ok(true)
    }

    /// Writes one row per session of `room`, keeping show-caller columns
    /// from rows already on the tab.
    #[instrument(skip_all, fields(room = %room.name))]
    pub async fn populate_room(
        &self,
        schedule: &Schedule,
        day: &DaySheet,
        room: &Room,
    ) -> Result<RoomOutcome, PublishError> {
        let spreadsheet = &day.spreadsheet;
        let sessions = schedule.in_room_on_day(&room.id, day.day, &self.settings.clock);
        if sessions.is_empty() {
            info!("no sessions for room");
            return Ok(RoomOutcome::NoSessions);
        }

        let existing = self
            .sheets
            .get_values(spreadsheet, &room_sheet::read_range(&room.name, sessions.len()))
            .await?;
        let plan = RoomSheetPlan::build(
            &room.name,
            &sessions,
            &existing,
            &self.settings.clock,
            &self.settings.presentation_base,
        );
        let rows = plan.len();
        let merged = plan.merged;

        self.sheets
            .batch_update_values(spreadsheet, plan.updates)
            .await?;

        let sheet_id = self
            .sheets
            .find_sheet(spreadsheet, &room.name)
            .await?
            .ok_or_else(|| PublishError::SheetMissing {
                spreadsheet: spreadsheet.clone(),
                title: room.name.clone(),
            })?;
        self.sheets
            .batch_update(spreadsheet, room_sheet::format_requests(sheet_id, rows))
            .await?;

        Ok(RoomOutcome::Published { rows, merged })
    }
}

fn failed(room: &Room, e: PublishError) -> RoomOutcome {
    error!(room = %room.name, error = %e, "room failed");
    RoomOutcome::Failed {
        error: e.to_string(),
    }
}

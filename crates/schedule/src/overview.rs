//! The overview tab: a time × room grid of one conference day.
//!
//! Column 0 holds time labels at 10-minute resolution from 09:00 to 23:50;
//! every other column is a room in [`RoomDirectory`] order. Row 0 holds the
//! room names, row 1 is left blank for the room's show caller, and session
//! rows start at row 2. A session fills every slot it overlaps and is merged
//! into a single cell when it covers more than one slot.

use chrono::{NaiveDate, Timelike};
use tracing::{debug, warn};

use crate::a1;
use crate::{
    CellFormat, EventClock, GridRange, RoomDirectory, Schedule, Session, SheetId, SheetRequest,
    SheetTitle, ValueRange,
};

/// Title of the overview tab.
pub const OVERVIEW_SHEET: &str = "overview";

/// First hour shown in the grid.
pub const FIRST_HOUR: u32 = 9;
/// Hour at which the grid ends (exclusive).
pub const END_HOUR: u32 = 24;
/// Minutes per grid row.
pub const SLOT_MINUTES: u32 = 10;
/// Room-name row plus show-caller row.
pub const HEADER_ROWS: usize = 2;

const COLUMN_WIDTH_PX: u32 = 250;
const ROW_HEIGHT_PX: u32 = 40;

/// Label of the show-caller row.
pub const SHOW_CALLER_LABEL: &str = "Room IC/Show Caller";

/// A fully laid-out overview tab for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewGrid {
    sheet_id: SheetId,
    /// Cell values, row-major, starting at A1.
    pub values: Vec<Vec<String>>,
    /// One `MergeCells` per multi-slot session.
    pub merges: Vec<SheetRequest>,
}

impl OverviewGrid {
    /// Lays out the sessions of `day` on the overview tab `sheet_id`.
    pub fn build(
        schedule: &Schedule,
        rooms: &RoomDirectory,
        day: NaiveDate,
        clock: &EventClock,
        sheet_id: SheetId,
    ) -> Self {
        let mut values = empty_grid(rooms);
        let mut merge_ranges: Vec<GridRange> = Vec::new();

        for session in schedule.on_day(day, clock) {
            let Some(column) = session.room.as_ref().and_then(|r| rooms.column_of(r)) else {
                debug!(code = %session.code, room = ?session.room, "session room not in directory");
                continue;
            };
            let Some((start_row, slots)) = slot_span(session, clock) else {
                continue;
            };

            let text = cell_text(session);
            let first = start_row.max(HEADER_ROWS as i64);
            let last = (start_row + slots).min(values.len() as i64);
            for row in first..last {
                values[row as usize][column] = text.clone();
            }

            if last - first > 1 {
                let range = GridRange::new(
                    sheet_id,
                    (first as u32, last as u32),
                    (column as u32, column as u32 + 1),
                );
                if merge_ranges.contains(&range) {
                    continue;
                }
                if merge_ranges.iter().any(|r| r.overlaps(&range)) {
                    warn!(
                        code = %session.code,
                        room = ?session.room,
                        "session overlaps an earlier session; not merging"
                    );
                    continue;
                }
                merge_ranges.push(range);
            }
        }

        Self {
            sheet_id,
            values,
            merges: merge_ranges
                .into_iter()
                .map(|range| SheetRequest::MergeCells { range })
                .collect(),
        }
    }

    /// Number of rows in the grid, headers included.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Number of columns in the grid, the time column included.
    pub fn column_count(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Values to write, anchored at `overview!A1`.
    pub fn value_range(&self) -> ValueRange {
        ValueRange {
            range: a1::sheet_range(&SheetTitle::overview(), "A1"),
            values: self.values.clone(),
        }
    }

    /// Clears old merges, then applies the grid's fixed formatting.
    pub fn format_requests(&self) -> Vec<SheetRequest> {
        let rows = self.row_count() as u32;
        let columns = self.column_count() as u32;
        let sheet_id = self.sheet_id;
        let whole = GridRange::new(sheet_id, (0, rows), (0, columns));

        vec![
            SheetRequest::UnmergeCells { range: whole },
            SheetRequest::FreezePanes {
                sheet_id,
                rows: HEADER_ROWS as u32,
                columns: 1,
            },
            SheetRequest::FormatCells {
                range: GridRange::new(sheet_id, (0, HEADER_ROWS as u32), (0, columns)),
                format: CellFormat::header(),
            },
            SheetRequest::FormatCells {
                range: GridRange::new(sheet_id, (0, rows), (0, 1)),
                format: CellFormat::header(),
            },
            SheetRequest::ResizeColumns {
                sheet_id,
                start: 0,
                end: Some(columns),
                pixel_size: COLUMN_WIDTH_PX,
            },
            SheetRequest::ResizeRows {
                sheet_id,
                start: 0,
                end: Some(rows),
                pixel_size: ROW_HEIGHT_PX,
            },
            SheetRequest::FormatCells {
                range: whole,
                format: CellFormat::centered_wrapped(),
            },
        ]
    }
}

fn empty_grid(rooms: &RoomDirectory) -> Vec<Vec<String>> {
    let width = rooms.len() + 1;
    let mut values = Vec::with_capacity(HEADER_ROWS + slot_count());

    let mut header = Vec::with_capacity(width);
    header.push("Time".to_string());
    header.extend(rooms.iter().map(|r| r.name.to_string()));
    values.push(header);

    let mut show_caller = vec![String::new(); width];
    show_caller[0] = SHOW_CALLER_LABEL.to_string();
    values.push(show_caller);

    for hour in FIRST_HOUR..END_HOUR {
        for minute in (0..60).step_by(SLOT_MINUTES as usize) {
            let mut row = vec![String::new(); width];
            row[0] = EventClock::overview_label(hour, minute);
            values.push(row);
        }
    }
    values
}

fn slot_count() -> usize {
    ((END_HOUR - FIRST_HOUR) * 60 / SLOT_MINUTES) as usize
}

/// Grid row of the session's first slot and the number of slots it covers.
///
/// The row may fall outside the grid (sessions before 09:00); callers clip.
fn slot_span(session: &Session, clock: &EventClock) -> Option<(i64, i64)> {
    let start = clock.local(session.start?);
    let duration = session.duration()?;

    let minutes_from_open =
        (i64::from(start.hour()) - i64::from(FIRST_HOUR)) * 60 + i64::from(start.minute());
    let start_row = minutes_from_open.div_euclid(i64::from(SLOT_MINUTES)) + HEADER_ROWS as i64;

    let slot_secs = i64::from(SLOT_MINUTES) * 60;
    let secs = duration.num_seconds();
    let slots = if secs <= 0 {
        0
    } else {
        (secs + slot_secs - 1) / slot_secs
    };
    Some((start_row, slots))
}

fn cell_text(session: &Session) -> String {
    format!("{}\n\n*{}*", session.title, session.speaker_names())
}

//! Per-room tabs: one row per session, merged with what is already on the sheet.
//!
//! Room tabs are duplicated from a template whose first seven rows are a
//! header; session rows start at sheet row 8 and span columns A–T. Columns
//! A–L are computed from the sessions API on every run. Column B (the running
//! order) and columns M–T belong to the show caller and are carried over from
//! the row the session occupied before.

use crate::a1;
use crate::{Color, EventClock, GridRange, Session, SheetId, SheetRequest, SheetTitle, ValueRange};

/// Columns A–T.
pub const ROW_WIDTH: usize = 20;
/// 1-based sheet row of the first session.
pub const FIRST_SESSION_ROW: usize = 8;
/// Trailing manual columns kept from the existing row (M–T).
pub const PRESERVED_TRAILING: usize = 8;
/// Column holding the running order.
pub const ROW_INDEX_COLUMN: usize = 1;

/// Default link prefix for the presentation page of a session.
pub const DEFAULT_PRESENTATION_BASE: &str = "https://devcon.org/sea/presentation/";

const TEMPLATE_ROW_HEIGHT_PX: u32 = 30;
const SESSION_ROW_HEIGHT_PX: u32 = 50;
/// 0-based row from which a freshly duplicated tab gets borders.
const TEMPLATE_BORDER_START_ROW: u32 = 7;
/// 0-based row from which rows are resized and bordered after populating.
const FORMAT_START_ROW: u32 = 4;

/// Builds the computed row for the `index`-th session (0-based) of a room.
pub fn session_row(
    session: &Session,
    index: usize,
    clock: &EventClock,
    presentation_base: &str,
) -> Vec<String> {
    let start = session.start.map(|t| clock.clock_time(t)).unwrap_or_default();
    let end = session.end.map(|t| clock.clock_time(t)).unwrap_or_default();
    let duration = session
        .duration()
        .map(|d| format_minutes(d.num_seconds()))
        .unwrap_or_default();

    let mut row = vec![
        session.code.to_string(),
        (index + 1).to_string(),
        start,
        duration,
        end,
        session.title.clone(),
        session.speaker_names(),
        format!("{presentation_base}{}", session.code),
        "-".to_string(),
        "-".to_string(),
        "-".to_string(),
        "-".to_string(),
    ];
    row.resize(ROW_WIDTH, String::new());
    row
}

fn format_minutes(secs: i64) -> String {
    if secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} minutes", secs as f64 / 60.0)
    }
}

/// Merges a freshly computed row with the row the session occupied before.
///
/// The result has the computed columns of `new` (truncated to A–T), the
/// running order of `existing` when it has one, and the trailing manual
/// columns M–T of `existing`, padded with `""` where `existing` is short.
pub fn merge_rows(new: &[String], existing: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = new.iter().take(ROW_WIDTH).cloned().collect();
    let existing = &existing[..existing.len().min(ROW_WIDTH)];

    if existing.len() > ROW_INDEX_COLUMN && merged.len() > ROW_INDEX_COLUMN {
        merged[ROW_INDEX_COLUMN] = existing[ROW_INDEX_COLUMN].clone();
    }

    let trailing_start = merged.len().saturating_sub(PRESERVED_TRAILING);
    for (i, cell) in merged.iter_mut().enumerate().skip(trailing_start) {
        *cell = existing.get(i).cloned().unwrap_or_default();
    }
    merged
}

/// Range read back before writing, covering the template header and one row
/// per session.
pub fn read_range(title: &SheetTitle, session_count: usize) -> String {
    let last_row = session_count + FIRST_SESSION_ROW;
    let last_column = a1::column_letter(ROW_WIDTH - 1);
    a1::sheet_range(title, &format!("A1:{last_column}{last_row}"))
}

/// Renames a freshly duplicated template tab and applies its base formatting.
pub fn template_setup_requests(sheet_id: SheetId, title: &SheetTitle) -> Vec<SheetRequest> {
    vec![
        SheetRequest::RenameSheet {
            sheet_id,
            title: title.to_string(),
        },
        SheetRequest::ResizeRows {
            sheet_id,
            start: 0,
            end: None,
            pixel_size: TEMPLATE_ROW_HEIGHT_PX,
        },
        SheetRequest::SolidBorders {
            range: GridRange::rows_from(sheet_id, TEMPLATE_BORDER_START_ROW, (0, ROW_WIDTH as u32)),
            color: Color::BLACK,
        },
    ]
}

/// Row heights and borders for a populated room tab.
pub fn format_requests(sheet_id: SheetId, session_count: usize) -> Vec<SheetRequest> {
    let end = (session_count + FIRST_SESSION_ROW) as u32;
    vec![
        SheetRequest::ResizeRows {
            sheet_id,
            start: FORMAT_START_ROW,
            end: Some(end),
            pixel_size: SESSION_ROW_HEIGHT_PX,
        },
        SheetRequest::SolidBorders {
            range: GridRange::new(sheet_id, (FORMAT_START_ROW, end), (0, ROW_WIDTH as u32)),
            color: Color::BLACK,
        },
    ]
}

/// The value writes for one room tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSheetPlan {
    /// One single-row write per session, in running order.
    pub updates: Vec<ValueRange>,
    /// Number of sessions whose row was found on the sheet and merged.
    pub merged: usize,
}

impl RoomSheetPlan {
    /// Lays out `sessions` (already in running order) against the rows
    /// currently on the tab.
    ///
    /// A session's previous row is the first existing row whose column A
    /// equals the session code.
    pub fn build(
        title: &SheetTitle,
        sessions: &[&Session],
        existing_rows: &[Vec<String>],
        clock: &EventClock,
        presentation_base: &str,
    ) -> Self {
        let mut merged = 0;
        let updates = sessions
            .iter()
            .enumerate()
            .map(|(index, session)| {
                let row = session_row(session, index, clock, presentation_base);
                let previous = existing_rows
                    .iter()
                    .find(|r| r.first().map(String::as_str) == Some(session.code.as_str()));
                let values = match previous {
                    Some(existing) => {
                        merged += 1;
                        merge_rows(&row, existing)
                    }
                    None => row,
                };
                ValueRange {
                    range: a1::row_range(title, index + FIRST_SESSION_ROW, ROW_WIDTH),
                    values: vec![values],
                }
            })
            .collect();
        Self { updates, merged }
    }

    /// Number of session rows written.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns `true` if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

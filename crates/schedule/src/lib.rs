//! Conference schedule domain for devcon-sheets.
//!
//! This crate contains every domain concept used to turn a list of conference
//! sessions into schedule spreadsheets: newtype identifiers, session and room
//! types, the overview grid and per-room sheet layouts, the row-merge rules
//! that keep show-caller notes, and the port traits that infrastructure crates
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is written where; infrastructure crates define *how* it
//! reaches the sessions API and the spreadsheet service.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RoomId`, `SessionCode`, `SheetId`, etc.) |
//! | [`types`] | Sessions, speakers, the event clock, day/spreadsheet pairs |
//! | [`rooms`] | The room directory and its built-in Devcon SEA table |
//! | [`a1`] | A1-notation range helpers |
//! | [`requests`] | Spreadsheet formatting operations and value ranges |
//! | [`overview`] | The time × room overview grid |
//! | [`room_sheet`] | Per-room session rows and the row-merge helper |
//! | [`ports`] | `SessionSource` and `SpreadsheetService` traits and their errors |
//! | [`errors`] | Top-level error and retry-policy types |

pub mod a1;
pub mod errors;
pub mod identifiers;
pub mod overview;
pub mod ports;
pub mod requests;
pub mod room_sheet;
pub mod rooms;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PublishError, RetryPolicy};
pub use identifiers::{
    EventSlug, PublishRunId, RoomId, SessionCode, SheetId, SheetTitle, SpreadsheetId,
};
pub use overview::{OverviewGrid, OVERVIEW_SHEET};
pub use ports::{
    SessionSource, SessionSourceError, SheetProperties, SpreadsheetError, SpreadsheetService,
};
pub use requests::{
    CellFormat, Color, GridRange, HorizontalAlignment, SheetRequest, ValueRange,
    VerticalAlignment, WrapStrategy,
};
pub use room_sheet::{merge_rows, RoomSheetPlan};
pub use rooms::{Room, RoomDirectory};
pub use types::{DaySheet, EventClock, Schedule, Session, Speaker};

//! Drives `SchedulePublisher` against an in-memory spreadsheet service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use publisher::{OverviewOutcome, PublishSettings, RoomOutcome, SchedulePublisher};
use schedule::{
    DaySheet, RoomDirectory, RoomId, Schedule, Session, SessionCode, SheetId, SheetProperties,
    SheetRequest, SheetTitle, Speaker, SpreadsheetError, SpreadsheetId, SpreadsheetService,
    ValueRange,
};

// ---------------------------------------------------------------------------
// In-memory spreadsheet
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Book {
    sheets: Vec<SheetProperties>,
    /// Values keyed by the exact A1 range they were written to or are read from.
    values: HashMap<String, Vec<Vec<String>>>,
    requests: Vec<SheetRequest>,
    cleared: Vec<String>,
    copies: usize,
}

#[derive(Default)]
struct FakeSheets {
    books: Mutex<HashMap<String, Book>>,
    /// Value writes touching a range containing this text fail.
    fail_writes_to: Option<String>,
    /// Every call against this spreadsheet fails.
    broken_spreadsheet: Option<String>,
    next_id: Mutex<u64>,
}

impl FakeSheets {
    fn with_book(self, spreadsheet: &str, book: Book) -> Self {
        self.books
            .lock()
            .unwrap()
            .insert(spreadsheet.to_string(), book);
        self
    }

    fn check(&self, spreadsheet: &SpreadsheetId) -> Result<(), SpreadsheetError> {
        if self.broken_spreadsheet.as_deref() == Some(spreadsheet.as_str()) {
            return Err(SpreadsheetError::Api {
                status: 403,
                body: "The caller does not have permission".into(),
            });
        }
        Ok(())
    }

    fn with<R>(&self, spreadsheet: &SpreadsheetId, f: impl FnOnce(&mut Book) -> R) -> R {
        let mut books = self.books.lock().unwrap();
        f(books.entry(spreadsheet.to_string()).or_default())
    }

    fn fresh_id(&self) -> SheetId {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        SheetId::new(1000 + *next)
    }
}

#[async_trait]
impl SpreadsheetService for FakeSheets {
    async fn list_sheets(
        &self,
        spreadsheet: &SpreadsheetId,
    ) -> Result<Vec<SheetProperties>, SpreadsheetError> {
        self.check(spreadsheet)?;
        Ok(self.with(spreadsheet, |b| b.sheets.clone()))
    }

    async fn add_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        title: &SheetTitle,
    ) -> Result<SheetId, SpreadsheetError> {
        self.check(spreadsheet)?;
        let id = self.fresh_id();
        self.with(spreadsheet, |b| {
            b.sheets.push(SheetProperties {
                sheet_id: id,
                title: title.to_string(),
            })
        });
        Ok(id)
    }

    async fn copy_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        _sheet: SheetId,
        _destination: &SpreadsheetId,
    ) -> Result<SheetProperties, SpreadsheetError> {
        self.check(spreadsheet)?;
        let id = self.fresh_id();
        let props = SheetProperties {
            sheet_id: id,
            title: format!("Copy of Template {id}"),
        };
        self.with(spreadsheet, |b| {
            b.copies += 1;
            b.sheets.push(props.clone());
        });
        Ok(props)
    }

    async fn clear_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<(), SpreadsheetError> {
        self.check(spreadsheet)?;
        self.with(spreadsheet, |b| b.cleared.push(range.to_string()));
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        values: ValueRange,
    ) -> Result<(), SpreadsheetError> {
        self.batch_update_values(spreadsheet, vec![values]).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet: &SpreadsheetId,
        data: Vec<ValueRange>,
    ) -> Result<(), SpreadsheetError> {
        self.check(spreadsheet)?;
        if let Some(needle) = &self.fail_writes_to {
            if data.iter().any(|d| d.range.contains(needle.as_str())) {
                return Err(SpreadsheetError::Api {
                    status: 400,
                    body: "Unable to parse range".into(),
                });
            }
        }
        self.with(spreadsheet, |b| {
            for d in data {
                b.values.insert(d.range, d.values);
            }
        });
        Ok(())
    }

    async fn get_values(
        &self,
        spreadsheet: &SpreadsheetId,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SpreadsheetError> {
        self.check(spreadsheet)?;
        Ok(self.with(spreadsheet, |b| {
            b.values.get(range).cloned().unwrap_or_default()
        }))
    }

    async fn batch_update(
        &self,
        spreadsheet: &SpreadsheetId,
        requests: Vec<SheetRequest>,
    ) -> Result<(), SpreadsheetError> {
        self.check(spreadsheet)?;
        self.with(spreadsheet, |b| {
            for request in &requests {
                if let SheetRequest::RenameSheet { sheet_id, title } = request {
                    if let Some(s) = b.sheets.iter_mut().find(|s| s.sheet_id == *sheet_id) {
                        s.title = title.clone();
                    }
                }
            }
            b.requests.extend(requests);
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const DAY_ONE: &str = "sheet-day-one";
const DAY_TWO: &str = "sheet-day-two";

/// Bangkok local time on 2024-11-`day`.
fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, day, hour - 7, minute, 0)
        .single()
        .unwrap()
}

fn session(code: &str, room: &str, start: DateTime<Utc>, minutes: i64) -> Session {
    Session {
        code: SessionCode::new(code).unwrap(),
        title: format!("Talk {code}"),
        start: Some(start),
        end: Some(start + TimeDelta::minutes(minutes)),
        room: RoomId::new(room),
        speakers: vec![Speaker {
            name: "Speaker".into(),
        }],
    }
}

fn schedule() -> Schedule {
    Schedule::new(vec![
        session("MS2", "main-stage", at(12, 11, 0), 30),
        session("MS1", "main-stage", at(12, 10, 0), 60),
        session("CA1", "classroom-a", at(12, 14, 0), 90),
        session("D2", "main-stage", at(13, 10, 0), 20),
    ])
}

fn days() -> Vec<DaySheet> {
    vec![
        DaySheet {
            day: NaiveDate::from_ymd_opt(2024, 11, 12).unwrap(),
            spreadsheet: SpreadsheetId::new(DAY_ONE).unwrap(),
        },
        DaySheet {
            day: NaiveDate::from_ymd_opt(2024, 11, 13).unwrap(),
            spreadsheet: SpreadsheetId::new(DAY_TWO).unwrap(),
        },
    ]
}

fn publisher(sheets: Arc<FakeSheets>) -> SchedulePublisher {
    SchedulePublisher::new(sheets, RoomDirectory::devcon_sea(), PublishSettings::default())
}

fn outcome<'a>(report: &'a publisher::DayReport, room: &str) -> &'a RoomOutcome {
    &report
        .rooms
        .iter()
        .find(|r| r.room.as_str() == room)
        .unwrap()
        .outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_spreadsheets_get_overview_and_room_tabs() {
    let sheets = Arc::new(FakeSheets::default());
    let report = publisher(sheets.clone()).publish(&schedule(), &days()).await;

    assert!(report.is_complete());
    assert_eq!(report.days.len(), 2);

    let day_one = &report.days[0];
    assert_eq!(
        day_one.overview,
        OverviewOutcome::Published {
            sessions: 3,
            merges: 3
        }
    );
    assert_eq!(
        outcome(day_one, "main-stage"),
        &RoomOutcome::Published { rows: 2, merged: 0 }
    );
    assert_eq!(
        outcome(day_one, "classroom-a"),
        &RoomOutcome::Published { rows: 1, merged: 0 }
    );
    assert_eq!(outcome(day_one, "stage-1"), &RoomOutcome::NoSessions);
    assert!(day_one.rooms.iter().all(|r| r.created));
    assert_eq!(report.rows_written(), 4);

    let books = sheets.books.lock().unwrap();
    let book = &books[DAY_ONE];
    assert_eq!(book.copies, 15);
    assert!(book.sheets.iter().any(|s| s.title == "overview"));
    assert!(book.sheets.iter().any(|s| s.title == "CLASSROOM A"));

    // Rows are in running order regardless of API order.
    let first = &book.values["'MAINSTAGE / Masks'!A8:T8"][0];
    assert_eq!(first[0], "MS1");
    assert_eq!(first[1], "1");
    assert_eq!(first[2], "10:00 AM");
    let second = &book.values["'MAINSTAGE / Masks'!A9:T9"][0];
    assert_eq!(second[0], "MS2");

    let grid = &book.values["'overview'!A1"];
    assert_eq!(grid[8][1], "Talk MS1\n\n*Speaker*");
}

#[tokio::test]
async fn existing_tabs_are_reused_and_notes_kept() {
    let mut book = Book::default();
    book.sheets.push(SheetProperties {
        sheet_id: SheetId::new(1),
        title: "overview".into(),
    });
    book.sheets.push(SheetProperties {
        sheet_id: SheetId::new(2),
        title: "MAINSTAGE / Masks".into(),
    });
    let mut noted = vec![String::new(); 20];
    noted[0] = "MS1".into();
    noted[1] = "4".into();
    noted[12] = "walk-in music".into();
    book.values.insert(
        "'MAINSTAGE / Masks'!A1:T10".into(),
        vec![vec!["Room".into()], noted],
    );

    let sheets = Arc::new(FakeSheets::default().with_book(DAY_ONE, book));
    let report = publisher(sheets.clone()).publish(&schedule(), &days()[..1]).await;

    let day = &report.days[0];
    assert_eq!(
        outcome(day, "main-stage"),
        &RoomOutcome::Published { rows: 2, merged: 1 }
    );
    let main_stage = day.rooms.iter().find(|r| r.room.as_str() == "main-stage").unwrap();
    assert!(!main_stage.created);

    let books = sheets.books.lock().unwrap();
    let book = &books[DAY_ONE];
    assert_eq!(book.cleared, vec!["'overview'".to_string()]);
    assert_eq!(book.copies, 14);

    let row = &book.values["'MAINSTAGE / Masks'!A8:T8"][0];
    assert_eq!(row[1], "4");
    assert_eq!(row[12], "walk-in music");
    assert_eq!(row[5], "Talk MS1");
}

#[tokio::test]
async fn a_failing_room_does_not_stop_the_day() {
    let sheets = Arc::new(FakeSheets {
        fail_writes_to: Some("CLASSROOM A".into()),
        ..FakeSheets::default()
    });
    let report = publisher(sheets).publish(&schedule(), &days()[..1]).await;

    let day = &report.days[0];
    assert!(!day.is_complete());
    assert!(matches!(
        outcome(day, "classroom-a"),
        RoomOutcome::Failed { error } if error.contains("400")
    ));
    assert_eq!(
        outcome(day, "main-stage"),
        &RoomOutcome::Published { rows: 2, merged: 0 }
    );
    assert_eq!(day.failed_rooms().count(), 1);
}

#[tokio::test]
async fn a_failing_overview_skips_only_that_day() {
    let sheets = Arc::new(FakeSheets {
        broken_spreadsheet: Some(DAY_ONE.into()),
        ..FakeSheets::default()
    });
    let report = publisher(sheets).publish(&schedule(), &days()).await;

    assert!(matches!(report.days[0].overview, OverviewOutcome::Failed { .. }));
    assert!(report.days[0].rooms.is_empty());

    let day_two = &report.days[1];
    assert!(day_two.is_complete());
    assert_eq!(
        outcome(day_two, "main-stage"),
        &RoomOutcome::Published { rows: 1, merged: 0 }
    );
}

#[tokio::test]
async fn overview_merges_are_sent_after_values() {
    let sheets = Arc::new(FakeSheets::default());
    publisher(sheets.clone()).publish(&schedule(), &days()[..1]).await;

    let books = sheets.books.lock().unwrap();
    let requests = &books[DAY_ONE].requests;
    let first_unmerge = requests
        .iter()
        .position(|r| matches!(r, SheetRequest::UnmergeCells { .. }))
        .unwrap();
    let first_merge = requests
        .iter()
        .position(|r| matches!(r, SheetRequest::MergeCells { .. }))
        .unwrap();
    assert!(first_unmerge < first_merge);
}

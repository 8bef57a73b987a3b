use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use devcon_api::DevconClient;
use publisher::{OverviewOutcome, PublishReport, RoomOutcome, SchedulePublisher};
use schedule::{DaySheet, RoomId, SessionSource};
use sheets::{ServiceAccountKey, SheetsClient, SheetsConfig};

use crate::config::Config;

/// Fetches the schedule once and publishes it to every day in `days`.
pub async fn sync(config: &Config, days: Vec<DaySheet>) -> Result<PublishReport> {
    let key = ServiceAccountKey::from_env().context("failed to load Google credentials")?;
    let sheets = SheetsClient::new(
        key,
        SheetsConfig {
            base_url: config.sheets_base_url.clone(),
            ..SheetsConfig::default()
        },
    )?;
    let source = DevconClient::new(config.api.clone())?;

    let schedule = source
        .fetch_sessions()
        .await
        .context("failed to fetch sessions")?;

    let publisher = SchedulePublisher::new(
        Arc::new(sheets),
        config.rooms.clone(),
        config.publish.clone(),
    );
    let report = publisher.publish(&schedule, &days).await;
    info!(
        days = report.days.len(),
        rows = report.rows_written(),
        complete = report.is_complete(),
        "sync finished"
    );
    Ok(report)
}

/// Human-readable summary of a sync run.
pub fn render_summary(report: &PublishReport) -> String {
    let mut out = String::new();
    for day in &report.days {
        let _ = write!(out, "{} ({}): ", day.day, day.spreadsheet);
        match &day.overview {
            OverviewOutcome::Published { sessions, merges } => {
                let _ = writeln!(out, "overview {sessions} sessions, {merges} merges");
            }
            OverviewOutcome::Failed { error } => {
                let _ = writeln!(out, "overview FAILED: {error}");
                continue;
            }
        }
        for room in &day.rooms {
            let created = if room.created { " (new tab)" } else { "" };
            let _ = match &room.outcome {
                RoomOutcome::Published { rows, merged } => writeln!(
                    out,
                    "  {}{created}: {rows} rows, {merged} with notes kept",
                    room.title
                ),
                RoomOutcome::NoSessions => writeln!(out, "  {}{created}: no sessions", room.title),
                RoomOutcome::Failed { error } => {
                    writeln!(out, "  {}{created}: FAILED: {error}", room.title)
                }
            };
        }
    }
    let _ = writeln!(
        out,
        "{} rows written across {} days{}",
        report.rows_written(),
        report.days.len(),
        if report.is_complete() {
            ""
        } else {
            " (with failures)"
        }
    );
    out
}

/// Fetches the unique room ids referenced by the event's sessions.
pub async fn rooms(config: &Config) -> Result<Vec<RoomId>> {
    let source = DevconClient::new(config.api.clone())?;
    source
        .fetch_room_ids()
        .await
        .context("failed to fetch sessions")
}

/// Prints `ids` to `out` and saves them to `path` as a JSON array.
pub fn write_rooms(ids: &[RoomId], path: &Path, out: &mut impl Write) -> Result<()> {
    writeln!(out, "All unique room ids:")?;
    for id in ids {
        writeln!(out, "{id}")?;
    }
    writeln!(out, "\nTotal unique rooms: {}", ids.len())?;

    let json = serde_json::to_string_pretty(ids)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    writeln!(out, "\nResults have been saved to {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use publisher::{DayReport, RoomReport};
    use schedule::{SheetTitle, SpreadsheetId};

    use super::*;

    #[test]
    fn rooms_are_printed_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot-rooms.json");
        let ids = vec![
            RoomId::new("classroom-a").unwrap(),
            RoomId::new("main-stage").unwrap(),
        ];
        let mut out = Vec::new();

        write_rooms(&ids, &path, &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("classroom-a\nmain-stage\n"));
        assert!(printed.contains("Total unique rooms: 2"));
        let saved: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, vec!["classroom-a", "main-stage"]);
    }

    #[test]
    fn summary_lists_each_room_outcome() {
        let report = PublishReport {
            days: vec![DayReport {
                day: NaiveDate::from_ymd_opt(2024, 11, 12).unwrap(),
                spreadsheet: SpreadsheetId::new("sheet-a").unwrap(),
                overview: OverviewOutcome::Published {
                    sessions: 3,
                    merges: 2,
                },
                rooms: vec![
                    RoomReport {
                        room: RoomId::new("main-stage").unwrap(),
                        title: SheetTitle::new("MAINSTAGE / Masks").unwrap(),
                        created: true,
                        outcome: RoomOutcome::Published { rows: 3, merged: 0 },
                    },
                    RoomReport {
                        room: RoomId::new("stage-1").unwrap(),
                        title: SheetTitle::new("STAGE 1 / Fans").unwrap(),
                        created: false,
                        outcome: RoomOutcome::Failed {
                            error: "quota".into(),
                        },
                    },
                ],
            }],
        };

        let summary = render_summary(&report);
        assert!(summary.contains("2024-11-12 (sheet-a): overview 3 sessions, 2 merges"));
        assert!(summary.contains("MAINSTAGE / Masks (new tab): 3 rows"));
        assert!(summary.contains("STAGE 1 / Fans: FAILED: quota"));
        assert!(summary.ends_with("3 rows written across 1 days (with failures)\n"));
    }
}

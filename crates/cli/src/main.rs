//! devcon-sheets entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `devcon-sheets.toml` (or `--config`) and
//!    validate it. Built-in Devcon SEA defaults apply when no file exists.
//! 2. **Wire observability**: configure `tracing-subscriber` with a text or
//!    JSON layer and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: create the `DevconClient` and
//!    `SheetsClient` and inject them into `SchedulePublisher`.
//! 4. **Run a command**:
//!    - `sync`: fetch sessions once and publish every configured day.
//!    - `rooms`: list the room ids the sessions API references.
//!
//! Exits non-zero when configuration is invalid or the sessions fetch fails.
//! Spreadsheet failures are reported in the summary instead.

mod commands;
mod config;
mod observability;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Instrument};

use schedule::PublishRunId;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "devcon-sheets", version)]
#[command(about = "Publishes the Devcon session schedule to Google Sheets")]
struct Cli {
    /// Configuration file. Defaults to ./devcon-sheets.toml when present.
    #[arg(long, global = true, env = "DEVCON_SHEETS_CONFIG")]
    config: Option<PathBuf>,

    /// Console log format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild the overview and room tabs for the configured days.
    Sync {
        /// Only publish this day (YYYY-MM-DD). May be repeated.
        #[arg(long = "day")]
        days: Vec<NaiveDate>,
    },
    /// List the room ids used by the event's sessions.
    Rooms {
        /// Where to save the JSON array of room ids.
        #[arg(long, default_value = "slot-rooms.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = observability::init(cli.log_format)?;

    let config = match &cli.config {
        Some(path) => Config::load(path, true)?,
        None => Config::load(Path::new(DEFAULT_CONFIG_PATH), false)?,
    };

    let run_id = PublishRunId::new_random();
    let span = tracing::info_span!("run", run_id = %run_id.as_uuid(), event = %config.api.event);

    async move {
        match cli.command {
            Command::Sync { days } => {
                let days = config.days_matching(&days)?;
                info!(days = days.len(), rooms = config.rooms.len(), "sync started");
                let report = commands::sync(&config, days).await?;
                print!("{}", commands::render_summary(&report));
            }
            Command::Rooms { output } => {
                let ids = commands::rooms(&config).await?;
                commands::write_rooms(&ids, &output, &mut std::io::stdout().lock())?;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_accepts_repeated_days() {
        let cli = Cli::try_parse_from([
            "devcon-sheets",
            "--log-format",
            "json",
            "sync",
            "--day",
            "2024-11-12",
            "--day",
            "2024-11-13",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Sync { days } => assert_eq!(days.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rooms_output_defaults_to_slot_rooms_json() {
        let cli = Cli::try_parse_from(["devcon-sheets", "rooms"]).unwrap();
        match cli.command {
            Command::Rooms { output } => assert_eq!(output, PathBuf::from("slot-rooms.json")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

//! Runtime configuration.
//!
//! Settings come from an optional TOML file. Every key has a built-in Devcon
//! SEA default, so an empty or absent file is a complete configuration:
//!
//! ```toml
//! [api]
//! base_url = "https://api.devcon.org"
//! event = "devcon-7"
//! page_size = 500
//!
//! [sheets]
//! template_sheet_id = 688800800
//! presentation_base = "https://devcon.org/sea/presentation/"
//! utc_offset = "+07:00"
//!
//! [[days]]
//! date = "2024-11-12"
//! spreadsheet_id = "1gWrSwjgfclJp0-VCW6GHjMOqbTfCn-Y0OGHYhZ5KpIU"
//!
//! [[rooms]]
//! id = "main-stage"
//! name = "MAINSTAGE / Masks"
//! ```
//!
//! Listing any `[[days]]` or `[[rooms]]` replaces the whole built-in table.
//! Credentials are never read from this file.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate};
use serde::Deserialize;

use devcon_api::DevconConfig;
use publisher::{PublishSettings, DEFAULT_TEMPLATE_SHEET_ID};
use schedule::{
    room_sheet, DaySheet, EventClock, EventSlug, PublishError, Room, RoomDirectory, RoomId,
    SheetId, SheetTitle, SpreadsheetId,
};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "devcon-sheets.toml";

const DEVCON_SEA_DAYS: &[(&str, &str)] = &[
    ("2024-11-12", "1gWrSwjgfclJp0-VCW6GHjMOqbTfCn-Y0OGHYhZ5KpIU"),
    ("2024-11-13", "1shFpvIMJqEUMzeUcG8dL3EfdivDff5By1WgL_Ic-RqI"),
    ("2024-11-14", "1ag1-f51C7-40yBn5EDeamRnm5yw-ugIcvDvure32GEI"),
    ("2024-11-15", "1a58SeeQvXKfi_bTuymRcrmhm7nQ9w9K0gRqjp2Z6nMo"),
];

// ---------------------------------------------------------------------------
// File shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api: ApiSection,
    pub sheets: SheetsSection,
    pub days: Vec<DayEntry>,
    pub rooms: Vec<RoomEntry>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api: ApiSection::default(),
            sheets: SheetsSection::default(),
            days: DEVCON_SEA_DAYS
                .iter()
                .map(|(date, id)| DayEntry {
                    date: date.to_string(),
                    spreadsheet_id: id.to_string(),
                })
                .collect(),
            rooms: RoomDirectory::devcon_sea()
                .iter()
                .map(|room| RoomEntry {
                    id: room.id.to_string(),
                    name: room.name.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: String,
    pub event: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: devcon_api::DEFAULT_BASE_URL.to_string(),
            event: devcon_api::DEFAULT_EVENT.to_string(),
            page_size: devcon_api::DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsSection {
    pub template_sheet_id: u64,
    pub presentation_base: String,
    pub utc_offset: String,
    pub base_url: String,
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            template_sheet_id: DEFAULT_TEMPLATE_SHEET_ID,
            presentation_base: room_sheet::DEFAULT_PRESENTATION_BASE.to_string(),
            utc_offset: "+07:00".to_string(),
            base_url: sheets::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayEntry {
    /// `YYYY-MM-DD`, quoted.
    pub date: String,
    pub spreadsheet_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomEntry {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Everything the commands need, validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: DevconConfig,
    pub sheets_base_url: String,
    pub publish: PublishSettings,
    pub days: Vec<DaySheet>,
    pub rooms: RoomDirectory,
}

impl Config {
    /// Loads `path`. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, PublishError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                FileConfig::default().validate()
            }
            Err(e) => Err(invalid(format!("cannot read {}: {e}", path.display()))),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, PublishError> {
        let file: FileConfig =
            toml::from_str(contents).map_err(|e| invalid(format!("invalid TOML: {e}")))?;
        file.validate()
    }

    /// The configured days, restricted to `selected` when it is non-empty.
    pub fn days_matching(&self, selected: &[NaiveDate]) -> Result<Vec<DaySheet>, PublishError> {
        if selected.is_empty() {
            return Ok(self.days.clone());
        }
        if let Some(unknown) = selected
            .iter()
            .find(|d| !self.days.iter().any(|day| day.day == **d))
        {
            return Err(invalid(format!("day {unknown} is not configured")));
        }
        Ok(self
            .days
            .iter()
            .filter(|day| selected.contains(&day.day))
            .cloned()
            .collect())
    }
}

impl FileConfig {
    pub fn validate(self) -> Result<Config, PublishError> {
        let event = EventSlug::new(self.api.event).ok_or_else(|| invalid("api.event is empty"))?;
        if self.api.page_size == 0 {
            return Err(invalid("api.page_size must be positive"));
        }
        let api = DevconConfig {
            base_url: self.api.base_url,
            page_size: self.api.page_size,
            timeout: Duration::from_secs(self.api.timeout_secs),
            ..DevconConfig::new(event)
        };

        let offset = parse_offset(&self.sheets.utc_offset).ok_or_else(|| {
            invalid(format!(
                "sheets.utc_offset '{}' is not of the form +HH:MM",
                self.sheets.utc_offset
            ))
        })?;
        let publish = PublishSettings {
            template_sheet_id: SheetId::new(self.sheets.template_sheet_id),
            presentation_base: self.sheets.presentation_base,
            clock: EventClock::new(offset),
        };

        let mut seen_days = HashSet::new();
        let mut days = Vec::with_capacity(self.days.len());
        for entry in self.days {
            let day = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .map_err(|e| invalid(format!("day '{}': {e}", entry.date)))?;
            if !seen_days.insert(day) {
                return Err(invalid(format!("day {day} is listed twice")));
            }
            let spreadsheet = SpreadsheetId::new(entry.spreadsheet_id)
                .ok_or_else(|| invalid(format!("day {day} has an empty spreadsheet_id")))?;
            days.push(DaySheet { day, spreadsheet });
        }

        let mut seen_rooms = HashSet::new();
        let mut rooms = Vec::with_capacity(self.rooms.len());
        for entry in self.rooms {
            let id = RoomId::new(entry.id).ok_or_else(|| invalid("room with empty id"))?;
            let name = SheetTitle::new(entry.name)
                .ok_or_else(|| invalid(format!("room {id} has an empty name")))?;
            if !seen_rooms.insert(id.clone()) {
                return Err(invalid(format!("room {id} is listed twice")));
            }
            rooms.push(Room { id, name });
        }

        Ok(Config {
            api,
            sheets_base_url: self.sheets.base_url,
            publish,
            days,
            rooms: RoomDirectory::new(rooms),
        })
    }
}

fn invalid(message: impl Into<String>) -> PublishError {
    PublishError::Configuration {
        message: message.into(),
    }
}

/// Parses `+HH:MM` / `-HH:MM`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

//! Identifier newtypes for rooms, sessions, spreadsheets and runs.
//!
//! Room ids, session codes, spreadsheet ids and tab titles are all strings on
//! the wire; giving each its own type keeps a [`RoomId`] from being passed
//! where a [`SheetTitle`] is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Non-empty string newtypes: new() -> Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Tab ids
// ---------------------------------------------------------------------------

/// Identifies a tab inside a spreadsheet.
///
/// Assigned by the spreadsheet service when a tab is added or copied; stable
/// across renames, unlike the tab title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetId(u64);

impl SheetId {
    /// Creates a new identifier from a raw integer.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Run identity
// ---------------------------------------------------------------------------

/// Identifies a single publish run (one invocation of the CLI).
///
/// Generated fresh for every invocation and attached to the root span so all
/// spreadsheet calls from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishRunId(Uuid);

impl PublishRunId {
    /// A fresh v4 id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The UUID recorded on the run span.
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PublishRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a room as the sessions API names it (e.g. `"main-stage"`).
    RoomId
}

string_id! {
    /// The source code of a session (e.g. `"XJ8ZPL"`).
    ///
    /// Stored in column A of a room sheet and used to find the row a session
    /// occupied on a previous run.
    SessionCode
}

string_id! {
    /// Identifies a spreadsheet document (the long id in its URL).
    SpreadsheetId
}

string_id! {
    /// The title of a tab inside a spreadsheet.
    SheetTitle
}

impl SheetTitle {
    /// Title of the time × room grid tab.
    pub fn overview() -> Self {
        Self(crate::OVERVIEW_SHEET.to_string())
    }
}

string_id! {
    /// Identifies a conference edition in the sessions API (e.g. `"devcon-7"`).
    EventSlug
}

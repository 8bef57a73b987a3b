//! The room directory.
//!
//! Maps the sessions API's room identifiers to the human-readable names used
//! as overview column headers and as room sheet titles. Directory order is the
//! overview column order and the per-room processing order.

use serde::{Deserialize, Serialize};

use crate::{RoomId, SheetTitle};

/// A room known to the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Identifier used by the sessions API.
    pub id: RoomId,
    /// Display name, also used as the room's sheet title.
    pub name: SheetTitle,
}

/// Ordered list of rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDirectory {
    rooms: Vec<Room>,
}

const DEVCON_SEA_ROOMS: &[(&str, &str)] = &[
    ("main-stage", "MAINSTAGE / Masks"),
    ("stage-5", "STAGE 5 / Hats"),
    ("stage-6", "STAGE 6 / Kites"),
    ("stage-1", "STAGE 1 / Fans"),
    ("stage-2", "STAGE 2 / Lantern"),
    ("stage-3", "STAGE 3 / Fabrics"),
    ("stage-4", "STAGE 4 / Leafs"),
    ("classroom-a", "CLASSROOM A"),
    ("classroom-b", "CLASSROOM B"),
    ("classroom-c", "CLASSROOM C"),
    ("classroom-d", "CLASSROOM D"),
    ("classroom-e", "CLASSROOM E"),
    ("breakout-1", "BREAKOUT 1"),
    ("breakout-2", "BREAKOUT 2"),
    ("breakout-3", "BREAKOUT 3"),
];

impl RoomDirectory {
    /// Creates a directory from rooms in display order.
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// The Devcon SEA (devcon-7) room table.
    pub fn devcon_sea() -> Self {
        let rooms = DEVCON_SEA_ROOMS
            .iter()
            .filter_map(|(id, name)| {
                Some(Room {
                    id: RoomId::new(*id)?,
                    name: SheetTitle::new(*name)?,
                })
            })
            .collect();
        Self { rooms }
    }

    /// Rooms in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if the directory has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Looks up a room by its API identifier.
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == id)
    }

    /// Overview column of a room. Column 0 holds the time labels, so the
    /// first room is column 1.
    pub fn column_of(&self, id: &RoomId) -> Option<usize> {
        self.rooms.iter().position(|r| &r.id == id).map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devcon_sea_table_is_complete_and_ordered() {
        let rooms = RoomDirectory::devcon_sea();
        assert_eq!(rooms.len(), 15);
        let first = rooms.iter().next().unwrap();
        assert_eq!(first.id.as_str(), "main-stage");
        assert_eq!(first.name.as_str(), "MAINSTAGE / Masks");
    }

    #[test]
    fn columns_are_offset_by_the_time_column() {
        let rooms = RoomDirectory::devcon_sea();
        assert_eq!(rooms.column_of(&RoomId::new("main-stage").unwrap()), Some(1));
        assert_eq!(rooms.column_of(&RoomId::new("breakout-3").unwrap()), Some(15));
        assert_eq!(rooms.column_of(&RoomId::new("lobby").unwrap()), None);
    }
}

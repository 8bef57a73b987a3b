//! Spreadsheet operations expressed in domain terms.
//!
//! Layout code produces [`SheetRequest`]s and [`ValueRange`]s; the `sheets`
//! crate translates them to the spreadsheet service's wire format. All row
//! and column indices are 0-based and end bounds are exclusive.

use serde::{Deserialize, Serialize};

use crate::SheetId;

// ---------------------------------------------------------------------------
// Ranges and colours
// ---------------------------------------------------------------------------

/// A rectangular cell range on one tab. A `None` bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRange {
    pub sheet_id: SheetId,
    pub start_row: Option<u32>,
    pub end_row: Option<u32>,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
}

impl GridRange {
    /// Rows `rows.0..rows.1` by columns `columns.0..columns.1`.
    pub fn new(sheet_id: SheetId, rows: (u32, u32), columns: (u32, u32)) -> Self {
        Self {
            sheet_id,
            start_row: Some(rows.0),
            end_row: Some(rows.1),
            start_column: Some(columns.0),
            end_column: Some(columns.1),
        }
    }

    /// Every row from `start_row` down, columns `columns.0..columns.1`.
    pub fn rows_from(sheet_id: SheetId, start_row: u32, columns: (u32, u32)) -> Self {
        Self {
            sheet_id,
            start_row: Some(start_row),
            end_row: None,
            start_column: Some(columns.0),
            end_column: Some(columns.1),
        }
    }

    /// Returns `true` if both ranges are on the same tab and share a cell.
    pub fn overlaps(&self, other: &GridRange) -> bool {
        fn spans(a: (Option<u32>, Option<u32>), b: (Option<u32>, Option<u32>)) -> bool {
            let a_start = a.0.unwrap_or(0);
            let b_start = b.0.unwrap_or(0);
            let a_end = a.1.unwrap_or(u32::MAX);
            let b_end = b.1.unwrap_or(u32::MAX);
            a_start < b_end && b_start < a_end
        }
        self.sheet_id == other.sheet_id
            && spans(
                (self.start_row, self.end_row),
                (other.start_row, other.end_row),
            )
            && spans(
                (self.start_column, self.end_column),
                (other.start_column, other.end_column),
            )
    }
}

/// An RGB colour with channels in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    /// Header shading.
    pub const LIGHT_GREY: Color = Color {
        red: 0.9,
        green: 0.9,
        blue: 0.9,
    };
}

// ---------------------------------------------------------------------------
// Cell formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WrapStrategy {
    OverflowCell,
    Clip,
    Wrap,
}

/// Cell format applied to every cell of a range.
///
/// Only the fields that are `Some` are written; the others keep whatever the
/// cell already had.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormat {
    pub background: Option<Color>,
    pub bold: Option<bool>,
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub wrap: Option<WrapStrategy>,
}

impl CellFormat {
    /// Grey background with bold text, used for header rows and columns.
    pub fn header() -> Self {
        Self {
            background: Some(Color::LIGHT_GREY),
            bold: Some(true),
            ..Self::default()
        }
    }

    /// Centred horizontally and vertically, with wrapped text.
    pub fn centered_wrapped() -> Self {
        Self {
            horizontal: Some(HorizontalAlignment::Center),
            vertical: Some(VerticalAlignment::Middle),
            wrap: Some(WrapStrategy::Wrap),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One formatting or structural change to a spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetRequest {
    /// Change a tab's title.
    RenameSheet { sheet_id: SheetId, title: String },

    /// Freeze the first `rows` rows and `columns` columns.
    FreezePanes {
        sheet_id: SheetId,
        rows: u32,
        columns: u32,
    },

    /// Apply a cell format to every cell in a range.
    FormatCells { range: GridRange, format: CellFormat },

    /// Set the height of rows `start..end` (`end = None` means to the last row).
    ResizeRows {
        sheet_id: SheetId,
        start: u32,
        end: Option<u32>,
        pixel_size: u32,
    },

    /// Set the width of columns `start..end`.
    ResizeColumns {
        sheet_id: SheetId,
        start: u32,
        end: Option<u32>,
        pixel_size: u32,
    },

    /// Break up every merge intersecting a range.
    UnmergeCells { range: GridRange },

    /// Merge a range into a single cell.
    MergeCells { range: GridRange },

    /// Draw solid borders of `color` on every edge of every cell in a range.
    SolidBorders { range: GridRange, color: Color },
}

/// Values for one A1 range, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub range: String,
    pub values: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_overlap_only_when_sharing_cells() {
        let sheet = SheetId::new(1);
        let a = GridRange::new(sheet, (2, 5), (1, 2));
        let below = GridRange::new(sheet, (5, 8), (1, 2));
        let inside = GridRange::new(sheet, (3, 4), (1, 2));
        let next_column = GridRange::new(sheet, (2, 5), (2, 3));
        let other_tab = GridRange::new(SheetId::new(2), (2, 5), (1, 2));

        assert!(a.overlaps(&inside));
        assert!(!a.overlaps(&below));
        assert!(!a.overlaps(&next_column));
        assert!(!a.overlaps(&other_tab));
        assert!(GridRange::rows_from(sheet, 0, (0, 20)).overlaps(&below));
    }
}

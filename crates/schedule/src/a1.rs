//! A1-notation range helpers.

use crate::SheetTitle;

/// Spreadsheet column letter for a 0-based column index (`0` → `A`, `26` → `AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// A range on a named tab, e.g. `'STAGE 1 / Fans'!A1:T12`.
///
/// The title is always quoted; single quotes inside it are doubled.
pub fn sheet_range(title: &SheetTitle, cells: &str) -> String {
    format!("'{}'!{cells}", title.as_str().replace('\'', "''"))
}

/// The whole of a tab, e.g. `'overview'`.
pub fn whole_sheet(title: &SheetTitle) -> String {
    format!("'{}'", title.as_str().replace('\'', "''"))
}

/// A single row spanning `columns` columns from A, with `row` 1-based.
pub fn row_range(title: &SheetTitle, row: usize, columns: usize) -> String {
    let last = column_letter(columns.saturating_sub(1));
    sheet_range(title, &format!("A{row}:{last}{row}"))
}

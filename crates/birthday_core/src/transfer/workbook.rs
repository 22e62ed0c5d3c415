//! Excel and OpenDocument workbook reading.
//!
//! # Responsibility
//! - Read the first sheet of a workbook into import rows.
//!
//! # Invariants
//! - Numeric and date-typed cells become `Cell::Number` so serial dates
//!   go through the same conversion as CSV serials.
//! - Error cells read as empty.

use crate::model::person::Person;
use crate::transfer::import::{people_from_rows, Cell, ImportError};
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{info, warn};
use std::path::Path;

/// File extensions read through the workbook path.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Converts one worksheet cell.
pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            Cell::from(value.as_str())
        }
    }
}

/// All rows of `range`, top to bottom.
pub fn rows_from_range(range: &Range<Data>) -> Vec<Vec<Cell>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect()
}

/// Reads the first sheet of the workbook at `path`.
pub fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(sheet) = workbook.sheet_names().into_iter().next() else {
        warn!(
            "event=import_workbook module=transfer status=empty path={}",
            path.display()
        );
        return Err(ImportError::Empty);
    };
    let range = workbook.worksheet_range(&sheet)?;
    info!(
        "event=import_workbook module=transfer status=ok sheet={sheet} rows={}",
        range.height()
    );
    Ok(rows_from_range(&range))
}

/// Reads a workbook and builds people from its first sheet.
pub fn import_workbook(path: &Path) -> Result<Vec<Person>, ImportError> {
    let rows = read_workbook_rows(path)?;
    people_from_rows(&rows)
}

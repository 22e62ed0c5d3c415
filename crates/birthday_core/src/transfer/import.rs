//! Spreadsheet row import.
//!
//! # Responsibility
//! - Map rows of cells to people with fresh ids.
//! - Normalize serial and free-text dates to `YYYY-MM-DD`.
//! - Pick the CSV or workbook reader from the file extension.
//!
//! # Invariants
//! - The first row is a header and is never imported.
//! - Rows without a name or a date are dropped silently.
//! - A present but unreadable date aborts the whole import.

use crate::model::person::{Person, PersonDraft, PersonValidationError, DEFAULT_ROLE_OR_GROUP};
use crate::occurrence::calculator::BirthDate;
use crate::transfer::workbook::{import_workbook, WORKBOOK_EXTENSIONS};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

static SERIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid serial regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal regex"));

const TEXT_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Serial 60 is the fictitious 1900-02-29 of the 1900 date system.
const FICTITIOUS_LEAP_SERIAL: i64 = 60;

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Trimmed text; `None` for empty or blank cells.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(value) if value.fract() == 0.0 => Some(format!("{value:.0}")),
            Self::Number(value) => Some(value.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

/// Import failures, worded for direct display.
#[derive(Debug)]
pub enum ImportError {
    Csv(csv::Error),
    Workbook(calamine::Error),
    Io(std::io::Error),
    /// The file extension is neither CSV nor a known workbook type.
    UnsupportedFormat(String),
    /// No data rows after the header.
    Empty,
    /// Data rows exist but none carries a name and a date.
    NoValidRows,
    /// `row` is 1-based and counts the header.
    InvalidDate { row: usize, value: String },
    InvalidRow {
        row: usize,
        source: PersonValidationError,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "Failed to parse file: {err}"),
            Self::Workbook(err) => write!(f, "Failed to read workbook: {err}"),
            Self::Io(err) => write!(f, "Failed to open file: {err}"),
            Self::UnsupportedFormat(extension) => write!(
                f,
                "Unsupported file type `{extension}`; use CSV or an Excel workbook"
            ),
            Self::Empty => write!(f, "The file contains no data rows"),
            Self::NoValidRows => write!(f, "No valid data found in the file"),
            Self::InvalidDate { row, value } => {
                write!(f, "Row {row}: `{value}` is not a recognizable date")
            }
            Self::InvalidRow { row, source } => write!(f, "Row {row}: {source}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Workbook(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidRow { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<calamine::Error> for ImportError {
    fn from(value: calamine::Error) -> Self {
        Self::Workbook(value)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds people from spreadsheet rows, header first.
pub fn people_from_rows(rows: &[Vec<Cell>]) -> Result<Vec<Person>, ImportError> {
    let data_rows = rows.get(1..).unwrap_or_default();
    if data_rows.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut people = Vec::new();
    let mut dropped = 0usize;
    for (index, row) in data_rows.iter().enumerate() {
        let row_number = index + 2;
        let cell = |column: usize| row.get(column).and_then(Cell::text);

        let (Some(full_name), Some(raw_date)) = (cell(0), cell(1)) else {
            dropped += 1;
            continue;
        };
        let date_of_birth = row
            .get(1)
            .and_then(normalize_date)
            .ok_or_else(|| ImportError::InvalidDate {
                row: row_number,
                value: raw_date,
            })?;

        let draft = PersonDraft {
            full_name,
            date_of_birth,
            phone_number: cell(2),
            role_or_group: cell(3).unwrap_or_else(|| DEFAULT_ROLE_OR_GROUP.to_string()),
            photo: None,
            celebrated: Some(false),
        };
        let person = Person::new(draft).map_err(|source| ImportError::InvalidRow {
            row: row_number,
            source,
        })?;
        people.push(person);
    }

    if people.is_empty() {
        return Err(ImportError::NoValidRows);
    }

    info!(
        "event=import_rows module=transfer status=ok imported={} dropped={}",
        people.len(),
        dropped
    );
    Ok(people)
}

/// Reads CSV text into rows of text cells.
pub fn read_csv_rows(reader: impl Read) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(rows)
}

/// Reads a CSV export or template and builds people from it.
pub fn import_csv(reader: impl Read) -> Result<Vec<Person>, ImportError> {
    let rows = read_csv_rows(reader)?;
    people_from_rows(&rows)
}

/// Imports a `.csv` file or a workbook, chosen by extension.
pub fn import_file(path: &Path) -> Result<Vec<Person>, ImportError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if extension == "csv" {
        let file = File::open(path)?;
        return import_csv(BufReader::new(file));
    }
    if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        return import_workbook(path);
    }
    Err(ImportError::UnsupportedFormat(extension))
}

/// Normalizes a date cell to `YYYY-MM-DD`.
pub fn normalize_date(cell: &Cell) -> Option<String> {
    let date = match cell {
        Cell::Empty => None,
        Cell::Number(serial) => date_from_serial(*serial),
        Cell::Text(text) => parse_text_date(text.trim()),
    }?;
    Some(BirthDate::from_date(date).to_iso_string())
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if YEAR_RE.is_match(text) {
        return text
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }
    if SERIAL_RE.is_match(text) && !text.starts_with('0') {
        return text.parse::<f64>().ok().and_then(date_from_serial);
    }
    if let Ok(birth) = BirthDate::parse(text) {
        return Some(birth.date());
    }

    let cleaned = ORDINAL_RE.replace_all(text, "$1");
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// Converts a 1900-system spreadsheet serial, ignoring the time fraction.
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let epoch = match days.cmp(&FICTITIOUS_LEAP_SERIAL) {
        std::cmp::Ordering::Less => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        std::cmp::Ordering::Equal => return None,
        std::cmp::Ordering::Greater => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_signed(Duration::days(days))
}

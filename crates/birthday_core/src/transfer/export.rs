//! CSV export and import template.
//!
//! # Responsibility
//! - Serialize people as a quoted CSV document.
//! - Produce the blank import template with sample rows.
//!
//! # Invariants
//! - Every field is quoted; embedded quotes are doubled.
//! - The export header is the import columns followed by `Celebrated`.

use crate::model::person::Person;
use crate::transfer::BASE_COLUMNS;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

pub const CELEBRATED_COLUMN: &str = "Celebrated";
pub const TEMPLATE_FILE_NAME: &str = "birthday-template.csv";

const TEMPLATE_ROWS: [[&str; 4]; 3] = [
    ["John Doe", "1990-01-15", "+1234567890", "Family"],
    ["Jane Smith", "1985-06-22", "+0987654321", "Friends"],
    ["Bob Johnson", "1992-12-03", "", "Colleagues"],
];

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "Failed to write CSV: {err}"),
            Self::Io(err) => write!(f, "Failed to write file: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// `birthdays-YYYY-MM-DD.csv` for the given day.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("birthdays-{}.csv", today.format("%Y-%m-%d"))
}

/// Writes `people` with the five-column export header.
pub fn write_csv<W: Write>(people: &[Person], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = quoted_writer(writer);

    let mut header = BASE_COLUMNS.to_vec();
    header.push(CELEBRATED_COLUMN);
    csv_writer.write_record(&header)?;

    for person in people {
        csv_writer.write_record([
            person.full_name.as_str(),
            person.date_of_birth.as_str(),
            person.phone_number.as_deref().unwrap_or_default(),
            person.role_or_group.as_str(),
            if person.is_celebrated() { "Yes" } else { "No" },
        ])?;
    }
    csv_writer.flush()?;

    info!(
        "event=export_csv module=transfer status=ok rows={}",
        people.len()
    );
    Ok(())
}

/// Writes the four-column import template with three sample rows.
pub fn write_template<W: Write>(writer: W) -> Result<(), ExportError> {
    let mut csv_writer = quoted_writer(writer);
    csv_writer.write_record(BASE_COLUMNS)?;
    for row in TEMPLATE_ROWS {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn quoted_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

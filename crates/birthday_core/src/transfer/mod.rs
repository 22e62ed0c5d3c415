//! Spreadsheet import and export.
//!
//! # Responsibility
//! - Turn tabular rows into validated people (`import`).
//! - Read the first sheet of Excel and OpenDocument files (`workbook`).
//! - Write people and the import template as CSV (`export`).
//!
//! # Invariants
//! - Column order is fixed: Full Name, Date of Birth, Phone Number,
//!   Role or Group (+ Celebrated on export).
//! - An import either yields every valid row or fails as a whole.

pub mod export;
pub mod import;
pub mod workbook;

/// Columns shared by the template and the export.
pub const BASE_COLUMNS: [&str; 4] = ["Full Name", "Date of Birth", "Phone Number", "Role or Group"];

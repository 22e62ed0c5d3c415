//! Human-readable date rendering.

use crate::occurrence::calculator::BirthDate;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name for `month` in 1-12; empty otherwise.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("")
}

/// `Jun 15, 1990`; malformed input is returned unchanged.
pub fn format_date(date_of_birth: &str) -> String {
    match BirthDate::parse(date_of_birth) {
        Ok(birth) => birth.date().format("%b %d, %Y").to_string(),
        Err(_) => date_of_birth.to_string(),
    }
}

/// `Jun 15`; malformed input is returned unchanged.
pub fn format_birthday(date_of_birth: &str) -> String {
    match BirthDate::parse(date_of_birth) {
        Ok(birth) => birth.date().format("%b %d").to_string(),
        Err(_) => date_of_birth.to_string(),
    }
}

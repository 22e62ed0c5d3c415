//! Yearly occurrence arithmetic.
//!
//! # Responsibility
//! - Turn a stored birth date into its next yearly occurrence.
//! - Compute day offsets and ages on calendar-day granularity.
//!
//! # Invariants
//! - `next_occurrence >= today` and `0 <= days_until <= 365`.
//! - A Feb-29 birthday recurs on Feb-28 in non-leap years; age follows the
//!   same date.
//! - Malformed input resolves to `Resolved::Unknown`, never to a zero value.

use chrono::{Datelike, Duration, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of a date computation that may lack a usable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<T> {
    Known(T),
    Unknown,
}

impl<T> Resolved<T> {
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for Resolved<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Unknown,
        }
    }
}

/// Birth date text that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDateError {
    pub input: String,
}

impl Display for BirthDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a valid YYYY-MM-DD date", self.input)
    }
}

impl Error for BirthDateError {}

/// Parsed birth date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Parses `YYYY-MM-DD`, ignoring any `T...` time suffix.
    pub fn parse(text: &str) -> Result<Self, BirthDateError> {
        let trimmed = text.trim();
        let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);
        NaiveDate::parse_from_str(date_part, ISO_DATE_FORMAT)
            .map(Self)
            .map_err(|_| BirthDateError {
                input: trimmed.to_string(),
            })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Canonical `YYYY-MM-DD` rendering.
    pub fn to_iso_string(&self) -> String {
        self.0.format(ISO_DATE_FORMAT).to_string()
    }

    /// The occurrence observed in `year`.
    ///
    /// `None` only when `year` is outside the supported calendar range.
    pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.0.month(), self.0.day()).or_else(|| {
            // Only Feb-29 can be missing from a valid year.
            NaiveDate::from_ymd_opt(year, 2, 28)
        })
    }

    /// Earliest occurrence on or after `today`.
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        let this_year = self.occurrence_in(today.year())?;
        if this_year >= today {
            return Some(this_year);
        }
        self.occurrence_in(today.year() + 1)
    }

    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.next_occurrence(today)
            .map(|next| next.signed_duration_since(today).num_days())
    }

    /// Whole years elapsed; zero for dates after `today`.
    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        let this_year = self.occurrence_in(today.year())?;
        let mut years = today.year() - self.0.year();
        if today < this_year {
            years -= 1;
        }
        Some(u32::try_from(years).unwrap_or(0))
    }
}

/// Next occurrence of the stored `birth_date` text on or after `today`.
pub fn next_occurrence(birth_date: &str, today: NaiveDate) -> Resolved<NaiveDate> {
    parse_resolved(birth_date)
        .known()
        .and_then(|birth| birth.next_occurrence(today))
        .into()
}

/// Days from `today` to the next occurrence.
pub fn days_until(birth_date: &str, today: NaiveDate) -> Resolved<i64> {
    parse_resolved(birth_date)
        .known()
        .and_then(|birth| birth.days_until(today))
        .into()
}

/// Age in whole years on `today`.
pub fn age(birth_date: &str, today: NaiveDate) -> Resolved<u32> {
    parse_resolved(birth_date)
        .known()
        .and_then(|birth| birth.age(today))
        .into()
}

/// `today + 1 day`, saturating at the calendar end.
pub(crate) fn tomorrow_of(today: NaiveDate) -> NaiveDate {
    today.checked_add_signed(Duration::days(1)).unwrap_or(today)
}

fn parse_resolved(birth_date: &str) -> Resolved<BirthDate> {
    BirthDate::parse(birth_date).ok().into()
}

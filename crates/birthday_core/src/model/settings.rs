//! Reminder notification settings.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_DAYS_BEFORE: u32 = 3;
pub const MAX_DAYS_BEFORE: u32 = 365;

/// Process-wide reminder settings, replaced wholesale on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Master switch for every alert.
    pub enabled: bool,
    /// Lead time in days for the single "upcoming" reminder.
    pub days_before: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            days_before: DEFAULT_DAYS_BEFORE,
        }
    }
}

impl NotificationSettings {
    pub fn validate(&self) -> Result<(), SettingsValidationError> {
        if self.days_before == 0 || self.days_before > MAX_DAYS_BEFORE {
            return Err(SettingsValidationError::DaysBeforeOutOfRange(
                self.days_before,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsValidationError {
    DaysBeforeOutOfRange(u32),
}

impl Display for SettingsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DaysBeforeOutOfRange(value) => write!(
                f,
                "days before must be between 1 and {MAX_DAYS_BEFORE}, got {value}"
            ),
        }
    }
}

impl Error for SettingsValidationError {}

//! Person domain model.
//!
//! # Responsibility
//! - Define the tracked person record and its editable draft shape.
//! - Validate drafts before they become persisted people.
//!
//! # Invariants
//! - `id` is generated once and never changes across edits.
//! - Validated people carry a non-empty name, a non-empty role and a
//!   parseable `date_of_birth`.
//! - `celebrated` only has meaning on the occurrence day.

use crate::occurrence::calculator::BirthDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Role assigned when an imported row leaves the group column blank.
pub const DEFAULT_ROLE_OR_GROUP: &str = "General";

const PHOTO_DATA_URL_PREFIX: &str = "data:image/";

/// Opaque person identity.
///
/// Generated from a v4 UUID, but stored data may carry any string id, so the
/// value is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Generates a fresh identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracked person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub full_name: String,
    /// ISO `YYYY-MM-DD`. Kept as text so malformed stored values survive a
    /// load/save cycle untouched.
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role_or_group: String,
    /// Image data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celebrated: Option<bool>,
}

impl Person {
    /// Builds a person from a validated draft with a generated id.
    pub fn new(draft: PersonDraft) -> Result<Self, PersonValidationError> {
        Self::with_id(PersonId::generate(), draft)
    }

    /// Builds a person with a caller-provided id.
    ///
    /// Used by edits, where identity must survive replacement of all fields.
    pub fn with_id(id: PersonId, draft: PersonDraft) -> Result<Self, PersonValidationError> {
        let draft = draft.normalized();
        draft.validate()?;
        Ok(Self {
            id,
            full_name: draft.full_name,
            date_of_birth: draft.date_of_birth,
            phone_number: draft.phone_number,
            role_or_group: draft.role_or_group,
            photo: draft.photo,
            celebrated: draft.celebrated,
        })
    }

    /// Parses the stored birth date.
    pub fn birth_date(&self) -> Option<BirthDate> {
        BirthDate::parse(&self.date_of_birth).ok()
    }

    pub fn is_celebrated(&self) -> bool {
        self.celebrated.unwrap_or(false)
    }

    /// Returns the editable projection of this person.
    pub fn to_draft(&self) -> PersonDraft {
        PersonDraft {
            full_name: self.full_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            phone_number: self.phone_number.clone(),
            role_or_group: self.role_or_group.clone(),
            photo: self.photo.clone(),
            celebrated: self.celebrated,
        }
    }
}

/// Person fields as entered in a form, before identity is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: Option<String>,
    pub role_or_group: String,
    pub photo: Option<String>,
    pub celebrated: Option<bool>,
}

impl PersonDraft {
    /// Trims text fields; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            phone_number: blank_to_none(self.phone_number),
            role_or_group: self.role_or_group.trim().to_string(),
            photo: blank_to_none(self.photo),
            celebrated: self.celebrated,
        }
    }

    /// Checks required fields and formats.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(PersonValidationError::MissingFullName);
        }
        if self.date_of_birth.trim().is_empty() {
            return Err(PersonValidationError::MissingDateOfBirth);
        }
        if BirthDate::parse(&self.date_of_birth).is_err() {
            return Err(PersonValidationError::InvalidDateOfBirth(
                self.date_of_birth.clone(),
            ));
        }
        if self.role_or_group.trim().is_empty() {
            return Err(PersonValidationError::MissingRoleOrGroup);
        }
        if let Some(photo) = &self.photo {
            if !photo.starts_with(PHOTO_DATA_URL_PREFIX) {
                return Err(PersonValidationError::InvalidPhoto);
            }
        }
        Ok(())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Draft validation failures, worded for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    MissingFullName,
    MissingDateOfBirth,
    InvalidDateOfBirth(String),
    MissingRoleOrGroup,
    InvalidPhoto,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFullName => write!(f, "Full name is required"),
            Self::MissingDateOfBirth => write!(f, "Date of birth is required"),
            Self::InvalidDateOfBirth(value) => {
                write!(f, "Date of birth `{value}` is not a valid YYYY-MM-DD date")
            }
            Self::MissingRoleOrGroup => write!(f, "Role or group is required"),
            Self::InvalidPhoto => write!(f, "Photo must be an image data URL"),
        }
    }
}

impl Error for PersonValidationError {}

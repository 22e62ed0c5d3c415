//! Alert requests and the host alert facility contract.
//!
//! # Responsibility
//! - Describe one user-visible alert (title, body, dedupe tag).
//! - Deliver alerts through a facility, swallowing permission and delivery
//!   failures.
//!
//! # Invariants
//! - Dedupe tags are stable per person and alert kind.
//! - Delivery never returns an error to the caller; failures are logged.

use crate::model::person::{Person, PersonId};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    /// The occurrence is today.
    Today,
    /// The occurrence is exactly the configured lead time away.
    Reminder,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Reminder => "reminder",
        }
    }
}

/// One alert request for the host facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub person_id: PersonId,
    pub title: String,
    pub body: String,
    /// Repeats with the same tag replace each other at the host.
    pub tag: String,
    pub require_interaction: bool,
}

impl Alert {
    pub fn today(person: &Person) -> Self {
        Self {
            kind: AlertKind::Today,
            person_id: person.id.clone(),
            title: format!("🎉 Today is {}'s Birthday!", person.full_name),
            body: "Don't forget to wish them a happy birthday!".to_string(),
            tag: dedupe_tag(AlertKind::Today, &person.id),
            require_interaction: true,
        }
    }

    pub fn reminder(person: &Person, days_until: i64) -> Self {
        let unit = if days_until == 1 { "day" } else { "days" };
        Self {
            kind: AlertKind::Reminder,
            person_id: person.id.clone(),
            title: "🎂 Birthday Reminder".to_string(),
            body: format!(
                "{}'s birthday is in {days_until} {unit}!",
                person.full_name
            ),
            tag: dedupe_tag(AlertKind::Reminder, &person.id),
            require_interaction: false,
        }
    }
}

/// `birthday-{kind}-{person id}`.
pub fn dedupe_tag(kind: AlertKind, person_id: &PersonId) -> String {
    format!("birthday-{}-{}", kind.as_str(), person_id)
}

/// Host permission state for showing alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Undetermined,
}

/// Failure reported by a facility while showing an alert.
#[derive(Debug)]
pub enum AlertError {
    Unavailable(String),
    Io(std::io::Error),
}

impl Display for AlertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "alert facility unavailable: {message}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AlertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for AlertError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Host notification facility.
pub trait AlertFacility: Send + Sync {
    /// Current permission, without prompting.
    fn permission(&self) -> Permission;
    /// Prompts for permission when undetermined.
    fn request_permission(&self) -> Permission;
    fn show(&self, alert: &Alert) -> Result<(), AlertError>;
}

/// Facility that records alerts in the application log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertFacility;

impl AlertFacility for LogAlertFacility {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, alert: &Alert) -> Result<(), AlertError> {
        info!(
            "event=alert_shown module=reminder status=ok kind={} tag={}",
            alert.kind.as_str(),
            alert.tag
        );
        Ok(())
    }
}

/// Prompts only while permission is undetermined; a settled answer is kept.
pub fn ensure_permission(facility: &dyn AlertFacility) -> Permission {
    let current = facility.permission();
    if current != Permission::Undetermined {
        return current;
    }
    let answer = facility.request_permission();
    info!("event=alert_permission module=reminder status=ok permission={answer:?}");
    answer
}

/// Shows `alerts` through `facility`; returns the alerts actually shown.
///
/// Without granted permission this is a logged no-op.
pub fn deliver<'a>(facility: &dyn AlertFacility, alerts: &'a [Alert]) -> Vec<&'a Alert> {
    if alerts.is_empty() {
        return Vec::new();
    }

    let permission = facility.permission();
    if permission != Permission::Granted {
        info!(
            "event=alerts_suppressed module=reminder status=skipped permission={:?} count={}",
            permission,
            alerts.len()
        );
        return Vec::new();
    }

    let mut shown = Vec::new();
    for alert in alerts {
        match facility.show(alert) {
            Ok(()) => {
                debug!(
                    "event=alert_delivered module=reminder status=ok tag={}",
                    alert.tag
                );
                shown.push(alert);
            }
            Err(err) => warn!(
                "event=alert_delivered module=reminder status=error tag={} error={}",
                alert.tag, err
            ),
        }
    }
    shown
}

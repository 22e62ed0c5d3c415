//! Console rendering and the terminal alert facility.

use birthday_core::occurrence::calculator::{self, Resolved};
use birthday_core::occurrence::format::format_birthday;
use birthday_core::reminder::scheduler::PassReport;
use birthday_core::{Alert, AlertError, AlertFacility, Permission, Person};
use chrono::NaiveDate;
use std::io::Write;

/// Prints alerts to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAlertFacility;

impl AlertFacility for ConsoleAlertFacility {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, alert: &Alert) -> Result<(), AlertError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", alert.title)?;
        writeln!(out, "  {}", alert.body)?;
        out.flush()?;
        Ok(())
    }
}

/// One line per person: id, name, birthday, age, countdown, group.
pub fn person_line(person: &Person, today: NaiveDate) -> String {
    let age = match calculator::age(&person.date_of_birth, today) {
        Resolved::Known(years) => years.to_string(),
        Resolved::Unknown => "?".to_string(),
    };
    let countdown = match calculator::days_until(&person.date_of_birth, today) {
        Resolved::Known(0) => "today".to_string(),
        Resolved::Known(1) => "tomorrow".to_string(),
        Resolved::Known(days) => format!("in {days} days"),
        Resolved::Unknown => "unknown date".to_string(),
    };
    let celebrated = if person.is_celebrated() { " [celebrated]" } else { "" };
    format!(
        "{}  {}  {}  age {}  {}  ({}){}",
        person.id,
        person.full_name,
        format_birthday(&person.date_of_birth),
        age,
        countdown,
        person.role_or_group,
        celebrated
    )
}

pub fn print_section(title: &str, people: &[&Person], today: NaiveDate) {
    if people.is_empty() {
        return;
    }
    println!("{title}");
    for person in people {
        println!("  {}", person_line(person, today));
    }
}

pub fn print_report(report: &PassReport) {
    println!(
        "{}: {} due, {} delivered, {} already sent today",
        report.day,
        report.due.len(),
        report.delivered,
        report.repeats_skipped
    );
}

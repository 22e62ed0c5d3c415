//! Evaluation pass: who gets an alert today.

use crate::model::person::Person;
use crate::model::settings::NotificationSettings;
use crate::occurrence::calculator::{self, Resolved};
use crate::reminder::alert::Alert;
use chrono::NaiveDate;
use log::debug;

/// Builds the alerts due on `today`, in input order.
///
/// A person gets a today alert on the occurrence day, or a reminder alert
/// when the occurrence is exactly `days_before` away. Nothing fires while
/// settings are disabled.
pub fn evaluate(
    people: &[Person],
    settings: &NotificationSettings,
    today: NaiveDate,
) -> Vec<Alert> {
    if !settings.enabled {
        return Vec::new();
    }

    let lead_time = i64::from(settings.days_before);
    let mut alerts = Vec::new();
    for person in people {
        match calculator::days_until(&person.date_of_birth, today) {
            Resolved::Known(0) => alerts.push(Alert::today(person)),
            Resolved::Known(days) if days == lead_time => {
                alerts.push(Alert::reminder(person, days));
            }
            Resolved::Known(_) => {}
            Resolved::Unknown => debug!(
                "event=evaluate_skip module=reminder status=skipped reason=unknown_date person_id={}",
                person.id
            ),
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use crate::model::person::{Person, PersonId};
    use crate::model::settings::NotificationSettings;
    use crate::reminder::alert::AlertKind;
    use chrono::NaiveDate;

    fn person(id: &str, birth: &str) -> Person {
        Person {
            id: PersonId::from(id),
            full_name: id.to_uppercase(),
            date_of_birth: birth.to_string(),
            phone_number: None,
            role_or_group: "General".to_string(),
            photo: None,
            celebrated: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn reminder_fires_only_on_exact_lead_time() {
        let people = vec![
            person("two", "1990-06-14"),
            person("three", "1990-06-15"),
            person("four", "1990-06-16"),
        ];
        let alerts = evaluate(&people, &NotificationSettings::default(), today());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Reminder);
        assert_eq!(alerts[0].tag, "birthday-reminder-three");
    }

    #[test]
    fn today_wins_over_reminder_and_unknown_dates_are_skipped() {
        let people = vec![person("bad", "20xx-01-01"), person("now", "1980-06-12")];
        let alerts = evaluate(&people, &NotificationSettings::default(), today());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Today);
        assert_eq!(alerts[0].tag, "birthday-today-now");
    }

    #[test]
    fn disabled_settings_emit_nothing() {
        let settings = NotificationSettings {
            enabled: false,
            days_before: 3,
        };
        let people = vec![person("now", "1980-06-12"), person("three", "1990-06-15")];
        assert!(evaluate(&people, &settings, today()).is_empty());
    }
}

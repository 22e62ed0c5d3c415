//! Once-per-day reminder scheduler.
//!
//! # Responsibility
//! - Run one evaluation pass immediately on `schedule()`.
//! - Re-run the pass at the next daily check time, then every 24 hours.
//! - Own the single timer chain and cancel it on re-schedule or drop.
//!
//! # Invariants
//! - At most one timer chain is armed; `schedule()` cancels before arming.
//! - People and settings are re-read from the `ReminderSource` on every pass.
//! - A dedupe tag is delivered at most once per calendar day.
//! - Delivery failures never stop the timer chain.

use crate::model::person::Person;
use crate::model::settings::NotificationSettings;
use crate::reminder::alert::{deliver, ensure_permission, Alert, AlertFacility, Permission};
use crate::reminder::clock::Clock;
use crate::reminder::evaluation::evaluate;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Local hour of the daily check.
pub const DEFAULT_CHECK_HOUR: u32 = 9;
const DAILY_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Live view of the data a pass evaluates.
pub trait ReminderSource: Send + Sync {
    fn people(&self) -> Vec<Person>;
    fn settings(&self) -> NotificationSettings;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed.
    Idle,
    /// A timer chain is pending.
    Armed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// `schedule()` was called outside a tokio runtime.
    NoRuntime,
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "reminder scheduler requires a running tokio runtime"),
        }
    }
}

impl Error for SchedulerError {}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub day: NaiveDate,
    /// Alerts the evaluation produced.
    pub due: Vec<Alert>,
    /// Due alerts already delivered earlier the same day.
    pub repeats_skipped: usize,
    /// Alerts the facility accepted.
    pub delivered: usize,
}

struct DeliveryLog {
    day: Option<NaiveDate>,
    tags: HashSet<String>,
}

impl DeliveryLog {
    fn roll_to(&mut self, day: NaiveDate) {
        if self.day != Some(day) {
            self.day = Some(day);
            self.tags.clear();
        }
    }
}

struct Engine {
    source: Arc<dyn ReminderSource>,
    facility: Arc<dyn AlertFacility>,
    clock: Arc<dyn Clock>,
    delivery_log: Mutex<DeliveryLog>,
    passes: AtomicU64,
}

impl Engine {
    fn run_pass(&self) -> PassReport {
        let day = self.clock.now().date();
        let settings = self.source.settings();
        let people = self.source.people();
        let due = evaluate(&people, &settings, day);

        let mut log = lock(&self.delivery_log);
        log.roll_to(day);
        let fresh: Vec<Alert> = due
            .iter()
            .filter(|alert| !log.tags.contains(&alert.tag))
            .cloned()
            .collect();
        let shown = deliver(self.facility.as_ref(), &fresh);
        for alert in &shown {
            log.tags.insert(alert.tag.clone());
        }
        drop(log);

        self.passes.fetch_add(1, Ordering::Relaxed);
        let report = PassReport {
            day,
            repeats_skipped: due.len() - fresh.len(),
            delivered: shown.len(),
            due,
        };
        info!(
            "event=reminder_pass module=reminder status=ok day={} people={} due={} delivered={} repeats_skipped={}",
            report.day,
            people.len(),
            report.due.len(),
            report.delivered,
            report.repeats_skipped
        );
        report
    }
}

/// Daily reminder scheduler.
pub struct ReminderScheduler {
    engine: Arc<Engine>,
    check_time: NaiveTime,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(
        source: Arc<dyn ReminderSource>,
        facility: Arc<dyn AlertFacility>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine: Arc::new(Engine {
                source,
                facility,
                clock,
                delivery_log: Mutex::new(DeliveryLog {
                    day: None,
                    tags: HashSet::new(),
                }),
                passes: AtomicU64::new(0),
            }),
            check_time: NaiveTime::from_hms_opt(DEFAULT_CHECK_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            timer: Mutex::new(None),
        }
    }

    /// Overrides the local time of the daily check.
    pub fn with_check_time(mut self, check_time: NaiveTime) -> Self {
        self.check_time = check_time;
        self
    }

    /// Evaluates now and (re-)arms the daily timer chain.
    ///
    /// # Errors
    /// - `NoRuntime` when called outside a tokio runtime; nothing is
    ///   evaluated or armed in that case.
    pub fn schedule(&self) -> Result<PassReport, SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let mut timer = lock(&self.timer);
        if let Some(previous) = timer.take() {
            previous.abort();
            debug!("event=scheduler_rearm module=reminder status=ok");
        }

        let report = self.engine.run_pass();

        let first_delay = next_check_delay(self.engine.clock.now(), self.check_time);
        let engine = Arc::clone(&self.engine);
        *timer = Some(runtime.spawn(run_daily(engine, first_delay)));
        info!(
            "event=scheduler_armed module=reminder status=ok first_delay_secs={}",
            first_delay.as_secs()
        );

        Ok(report)
    }

    /// Asks the alert facility for permission if it has not been settled.
    pub fn request_permission(&self) -> Permission {
        ensure_permission(self.engine.facility.as_ref())
    }

    /// Runs one pass without touching the timer.
    pub fn run_pass(&self) -> PassReport {
        self.engine.run_pass()
    }

    /// Cancels the armed chain. Returns whether one was armed.
    pub fn cancel(&self) -> bool {
        match lock(&self.timer).take() {
            Some(handle) => {
                let was_armed = !handle.is_finished();
                handle.abort();
                info!("event=scheduler_cancel module=reminder status=ok");
                was_armed
            }
            None => false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        match lock(&self.timer).as_ref() {
            Some(handle) if !handle.is_finished() => SchedulerState::Armed,
            _ => SchedulerState::Idle,
        }
    }

    /// Total evaluation passes run so far.
    pub fn passes_run(&self) -> u64 {
        self.engine.passes.load(Ordering::Relaxed)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

async fn run_daily(engine: Arc<Engine>, first_delay: Duration) {
    tokio::time::sleep(first_delay).await;

    // First tick completes immediately: that is the check-time pass.
    let mut ticker = tokio::time::interval(DAILY_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        engine.run_pass();
    }
}

/// Time from `now` until `check_time` on the following day.
pub fn next_check_delay(now: NaiveDateTime, check_time: NaiveTime) -> Duration {
    let next_day = now.date() + ChronoDuration::days(1);
    next_day
        .and_time(check_time)
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{next_check_delay, ReminderScheduler, ReminderSource, SchedulerError, SchedulerState};
    use crate::model::person::{Person, PersonId};
    use crate::model::settings::NotificationSettings;
    use crate::reminder::alert::{Alert, AlertError, AlertFacility, Permission};
    use crate::reminder::clock::{Clock, FixedClock};
    use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    const HOUR: u64 = 60 * 60;

    /// Local time that advances with tokio's (paused) clock.
    struct TokioClock {
        start: NaiveDateTime,
        origin: Instant,
    }

    impl TokioClock {
        fn starting_at(start: NaiveDateTime) -> Self {
            Self {
                start,
                origin: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> NaiveDateTime {
            let elapsed = ChronoDuration::from_std(self.origin.elapsed()).unwrap();
            self.start + elapsed
        }
    }

    struct SharedSource {
        people: Vec<Person>,
        settings: Mutex<NotificationSettings>,
    }

    impl ReminderSource for SharedSource {
        fn people(&self) -> Vec<Person> {
            self.people.clone()
        }

        fn settings(&self) -> NotificationSettings {
            *self.settings.lock().unwrap()
        }
    }

    struct RecordingFacility {
        permission: Permission,
        clock: Arc<dyn Clock>,
        shown: Mutex<Vec<(NaiveDate, String)>>,
    }

    impl AlertFacility for RecordingFacility {
        fn permission(&self) -> Permission {
            self.permission
        }

        fn request_permission(&self) -> Permission {
            self.permission
        }

        fn show(&self, alert: &Alert) -> Result<(), AlertError> {
            self.shown
                .lock()
                .unwrap()
                .push((self.clock.now().date(), alert.tag.clone()));
            Ok(())
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn person(id: &str, birth: &str) -> Person {
        Person {
            id: PersonId::from(id),
            full_name: id.to_string(),
            date_of_birth: birth.to_string(),
            phone_number: None,
            role_or_group: "General".to_string(),
            photo: None,
            celebrated: None,
        }
    }

    struct Fixture {
        source: Arc<SharedSource>,
        facility: Arc<RecordingFacility>,
        scheduler: ReminderScheduler,
    }

    fn fixture(permission: Permission) -> Fixture {
        // Evening of 2024-06-11.
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(
            date(6, 11).and_hms_opt(20, 0, 0).unwrap(),
        ));
        let source = Arc::new(SharedSource {
            people: vec![
                person("june14", "1990-06-14"),
                person("june12", "1985-06-12"),
                person("june16", "1970-06-16"),
                person("broken", "not-a-date"),
            ],
            settings: Mutex::new(NotificationSettings::default()),
        });
        let facility = Arc::new(RecordingFacility {
            permission,
            clock: Arc::clone(&clock),
            shown: Mutex::new(Vec::new()),
        });
        let scheduler = ReminderScheduler::new(
            Arc::clone(&source) as Arc<dyn ReminderSource>,
            Arc::clone(&facility) as Arc<dyn AlertFacility>,
            clock,
        );
        Fixture {
            source,
            facility,
            scheduler,
        }
    }

    fn shown(facility: &RecordingFacility) -> Vec<(NaiveDate, String)> {
        facility.shown.lock().unwrap().clone()
    }

    #[test]
    fn next_check_is_next_day_at_check_time() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let evening = date(6, 11).and_hms_opt(20, 0, 0).unwrap();
        let early = date(6, 11).and_hms_opt(8, 0, 0).unwrap();
        let new_year_eve = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();

        assert_eq!(next_check_delay(evening, nine), Duration::from_secs(13 * HOUR));
        assert_eq!(next_check_delay(early, nine), Duration::from_secs(25 * HOUR));
        assert_eq!(
            next_check_delay(new_year_eve, nine),
            Duration::from_secs(10 * HOUR)
        );
    }

    #[test]
    fn schedule_outside_runtime_is_rejected() {
        let source = Arc::new(SharedSource {
            people: Vec::new(),
            settings: Mutex::new(NotificationSettings::default()),
        });
        let clock = Arc::new(FixedClock(date(6, 11).and_hms_opt(9, 0, 0).unwrap()));
        let scheduler = ReminderScheduler::new(
            source,
            Arc::new(crate::reminder::alert::LogAlertFacility),
            clock,
        );
        assert_eq!(scheduler.schedule().unwrap_err(), SchedulerError::NoRuntime);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.passes_run(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_evaluates_now_then_daily_at_check_time() {
        let fx = fixture(Permission::Granted);

        let report = fx.scheduler.schedule().unwrap();
        assert_eq!(report.day, date(6, 11));
        assert_eq!(report.delivered, 1);
        assert_eq!(fx.scheduler.state(), SchedulerState::Armed);

        // 09:00:01 on June 12.
        tokio::time::sleep(Duration::from_secs(13 * HOUR + 1)).await;
        // 09:00:01 on June 13.
        tokio::time::sleep(Duration::from_secs(24 * HOUR)).await;

        assert_eq!(fx.scheduler.passes_run(), 3);
        assert_eq!(
            shown(&fx.facility),
            vec![
                (date(6, 11), "birthday-reminder-june14".to_string()),
                (date(6, 12), "birthday-today-june12".to_string()),
                (date(6, 13), "birthday-reminder-june16".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_returns_to_idle_and_stops_passes() {
        let fx = fixture(Permission::Granted);

        fx.scheduler.schedule().unwrap();
        assert!(fx.scheduler.cancel());
        assert_eq!(fx.scheduler.state(), SchedulerState::Idle);
        assert!(!fx.scheduler.cancel());

        tokio::time::sleep(Duration::from_secs(72 * HOUR)).await;
        assert_eq!(fx.scheduler.passes_run(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_keeps_a_single_chain_and_one_alert_per_day() {
        let fx = fixture(Permission::Granted);

        fx.scheduler.schedule().unwrap();
        let second = fx.scheduler.schedule().unwrap();
        assert_eq!(second.due.len(), 1);
        assert_eq!(second.repeats_skipped, 1);
        assert_eq!(second.delivered, 0);

        tokio::time::sleep(Duration::from_secs(13 * HOUR + 1)).await;

        assert_eq!(fx.scheduler.passes_run(), 3);
        assert_eq!(shown(&fx.facility).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_keeps_loop_running() {
        let fx = fixture(Permission::Denied);

        let report = fx.scheduler.schedule().unwrap();
        assert_eq!(report.due.len(), 1);
        assert_eq!(report.delivered, 0);

        tokio::time::sleep(Duration::from_secs(37 * HOUR + 1)).await;

        assert_eq!(fx.scheduler.passes_run(), 3);
        assert_eq!(fx.scheduler.state(), SchedulerState::Armed);
        assert!(shown(&fx.facility).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn passes_read_current_settings() {
        let fx = fixture(Permission::Granted);

        fx.scheduler.schedule().unwrap();
        fx.source.settings.lock().unwrap().enabled = false;

        tokio::time::sleep(Duration::from_secs(13 * HOUR + 1)).await;

        assert_eq!(fx.scheduler.passes_run(), 2);
        assert_eq!(shown(&fx.facility).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_check_time_moves_the_daily_pass() {
        let fx = fixture(Permission::Granted);
        let scheduler = fx
            .scheduler
            .with_check_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap());

        scheduler.schedule().unwrap();
        // 06:59:59 on June 12.
        tokio::time::sleep(Duration::from_secs(11 * HOUR - 1)).await;
        assert_eq!(scheduler.passes_run(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scheduler.passes_run(), 2);
        assert_eq!(
            shown(&fx.facility).last(),
            Some(&(date(6, 12), "birthday-today-june12".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn request_permission_goes_to_the_facility() {
        assert_eq!(
            fixture(Permission::Granted).scheduler.request_permission(),
            Permission::Granted
        );
        assert_eq!(
            fixture(Permission::Denied).scheduler.request_permission(),
            Permission::Denied
        );
    }
}

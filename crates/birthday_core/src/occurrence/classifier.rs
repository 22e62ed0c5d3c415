//! Occurrence classification and list views.
//!
//! # Responsibility
//! - Classify a birth date relative to today (today/tomorrow/within N days).
//! - Build ranked, filtered and bucketed views over a people list.
//!
//! # Invariants
//! - Unknown birth dates are never today, tomorrow or within any window.
//! - Every sort here is stable; ties keep input order.
//! - Dashboard buckets are mutually exclusive.

use crate::model::person::Person;
use crate::occurrence::calculator::{self, tomorrow_of, Resolved};
use crate::occurrence::format::month_name;
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// Window of the dashboard "this week" bucket, in days.
pub const WEEK_WINDOW_DAYS: i64 = 7;
/// Window of the dashboard "upcoming" counter, in days.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

pub fn is_today(birth_date: &str, today: NaiveDate) -> bool {
    calculator::next_occurrence(birth_date, today) == Resolved::Known(today)
}

pub fn is_tomorrow(birth_date: &str, today: NaiveDate) -> bool {
    calculator::next_occurrence(birth_date, today) == Resolved::Known(tomorrow_of(today))
}

/// `0 <= days_until <= window_days`, inclusive on both ends.
pub fn is_within(birth_date: &str, today: NaiveDate, window_days: i64) -> bool {
    match calculator::days_until(birth_date, today) {
        Resolved::Known(days) => (0..=window_days).contains(&days),
        Resolved::Unknown => false,
    }
}

/// Sorts people by days until their next occurrence.
///
/// Unknown birth dates go last. Re-ranking a ranked list is a no-op.
pub fn rank_by_upcoming(people: &[Person], today: NaiveDate) -> Vec<&Person> {
    let mut ranked: Vec<&Person> = people.iter().collect();
    ranked.sort_by_cached_key(|person| upcoming_key(person, today));
    ranked
}

fn upcoming_key(person: &Person, today: NaiveDate) -> (bool, i64) {
    match calculator::days_until(&person.date_of_birth, today) {
        Resolved::Known(days) => (false, days),
        Resolved::Unknown => (true, 0),
    }
}

/// Dashboard projection of a people list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard<'a> {
    pub today: Vec<&'a Person>,
    pub tomorrow: Vec<&'a Person>,
    /// Within the week window, excluding today and tomorrow; upcoming order.
    pub this_week: Vec<&'a Person>,
    pub total_count: usize,
    /// Inclusive of today and tomorrow.
    pub this_week_count: usize,
    pub upcoming_count: usize,
}

impl<'a> Dashboard<'a> {
    pub fn build(people: &'a [Person], today: NaiveDate) -> Self {
        let today_bucket: Vec<&Person> = people
            .iter()
            .filter(|person| is_today(&person.date_of_birth, today))
            .collect();
        let tomorrow_bucket: Vec<&Person> = people
            .iter()
            .filter(|person| is_tomorrow(&person.date_of_birth, today))
            .collect();
        let this_week = rank_by_upcoming(people, today)
            .into_iter()
            .filter(|person| {
                is_within(&person.date_of_birth, today, WEEK_WINDOW_DAYS)
                    && !is_today(&person.date_of_birth, today)
                    && !is_tomorrow(&person.date_of_birth, today)
            })
            .collect();

        Self {
            today: today_bucket,
            tomorrow: tomorrow_bucket,
            this_week,
            total_count: people.len(),
            this_week_count: count_within(people, today, WEEK_WINDOW_DAYS),
            upcoming_count: count_within(people, today, UPCOMING_WINDOW_DAYS),
        }
    }
}

fn count_within(people: &[Person], today: NaiveDate, window_days: i64) -> usize {
    people
        .iter()
        .filter(|person| is_within(&person.date_of_birth, today, window_days))
        .count()
}

/// List view ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Upcoming,
    /// Case-insensitive, ascending.
    Name,
    /// Oldest first; unknown ages last.
    Age,
}

/// List view filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleFilter {
    /// Case-insensitive substring of name or role.
    pub search: Option<String>,
    /// Exact role/group.
    pub group: Option<String>,
    /// Birth month, 1-12.
    pub month: Option<u32>,
}

impl PeopleFilter {
    pub fn matches(&self, person: &Person) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                person.full_name.to_lowercase().contains(&term)
                    || person.role_or_group.to_lowercase().contains(&term)
            }
            _ => true,
        };
        let matches_group = self
            .group
            .as_deref()
            .map_or(true, |group| person.role_or_group == group);
        let matches_month = self.month.map_or(true, |month| {
            person.birth_date().map(|birth| birth.month()) == Some(month)
        });

        matches_search && matches_group && matches_month
    }

    /// Matching people in their stored order.
    pub fn select<'a>(&self, people: &'a [Person]) -> Vec<&'a Person> {
        people.iter().filter(|person| self.matches(person)).collect()
    }
}

/// Filters, then sorts, a people list for display.
pub fn list_view<'a>(
    people: &'a [Person],
    filter: &PeopleFilter,
    order: SortOrder,
    today: NaiveDate,
) -> Vec<&'a Person> {
    let mut selected = filter.select(people);
    match order {
        SortOrder::Upcoming => {
            selected.sort_by_cached_key(|person| upcoming_key(person, today));
        }
        SortOrder::Name => {
            selected.sort_by_cached_key(|person| person.full_name.to_lowercase());
        }
        SortOrder::Age => {
            selected.sort_by_cached_key(|person| {
                Reverse(calculator::age(&person.date_of_birth, today).known())
            });
        }
    }
    selected
}

/// Sorted, de-duplicated role/group values.
pub fn distinct_groups(people: &[Person]) -> Vec<String> {
    people
        .iter()
        .map(|person| person.role_or_group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted birth months (1-12) present among known birth dates.
pub fn distinct_months(people: &[Person]) -> Vec<u32> {
    people
        .iter()
        .filter_map(|person| person.birth_date().map(|birth| birth.month()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// People sharing a birth month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayGroup<'a> {
    pub month: &'static str,
    pub people: Vec<&'a Person>,
}

/// Groups known birth dates by calendar month, January first.
pub fn group_by_month(people: &[Person]) -> Vec<BirthdayGroup<'_>> {
    group_refs_by_month(people.iter().collect())
}

/// [`list_view`] split into month groups; each group keeps the sort order.
pub fn grouped_list_view<'a>(
    people: &'a [Person],
    filter: &PeopleFilter,
    order: SortOrder,
    today: NaiveDate,
) -> Vec<BirthdayGroup<'a>> {
    group_refs_by_month(list_view(people, filter, order, today))
}

fn group_refs_by_month(people: Vec<&Person>) -> Vec<BirthdayGroup<'_>> {
    let mut by_month: BTreeMap<u32, Vec<&Person>> = BTreeMap::new();
    for person in people {
        if let Some(birth) = person.birth_date() {
            by_month.entry(birth.month()).or_default().push(person);
        }
    }
    by_month
        .into_iter()
        .map(|(month, people)| BirthdayGroup {
            month: month_name(month),
            people,
        })
        .collect()
}
